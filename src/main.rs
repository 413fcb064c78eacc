mod config;
mod worldgen;

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::Parser;
use tessel_blocks::{MeshTables, TerrainId};
use tessel_chunk::{ChunkCoord, ChunkMap, MAX_CHUNK_SIZE};
use tessel_mesh_cpu::{ChunkDescriptor, ChunkMesher, MeshError, RequestToken, TerrainGeometry};
use tessel_runtime::{MeshRuntime, RevisionTracker};

use crate::config::AppConfig;
use crate::worldgen::TerrainGen;

const CHUNKS_Y: usize = 2;

#[derive(Parser, Debug)]
#[command(author, version, about = "Greedy-mesh a noise terrain region and report geometry stats", long_about = None)]
struct Args {
    /// TOML config with optional [mesh] and [world] tables
    #[arg(long)]
    config: Option<PathBuf>,

    /// Voxel/material tables
    #[arg(long, default_value = "assets/tables.toml")]
    tables: PathBuf,

    /// Chunks generated on each side of the origin along X and Z
    #[arg(long, default_value_t = 2)]
    radius: i32,

    /// Chunk edge length in voxels
    #[arg(long, default_value_t = 32)]
    size: usize,

    #[arg(long, default_value_t = 1337)]
    seed: i32,

    /// Mesh worker threads for --threaded (0 = one per core)
    #[arg(long, default_value_t = 0)]
    workers: usize,

    /// Disable ambient occlusion
    #[arg(long)]
    no_ao: bool,

    /// Mesh on the worker runtime instead of the main thread
    #[arg(long)]
    threaded: bool,
}

#[derive(Default)]
struct Stats {
    chunks: usize,
    failed: usize,
    t_mesh_ms: u64,
    by_terrain: BTreeMap<TerrainId, (usize, usize)>,
}

impl Stats {
    fn record(
        &mut self,
        coord: ChunkCoord,
        result: Result<Vec<TerrainGeometry>, MeshError>,
        ms: u32,
    ) {
        self.chunks += 1;
        self.t_mesh_ms += u64::from(ms);
        match result {
            Ok(groups) => {
                log::debug!(
                    "chunk {:?}: {} groups, {} quads in {}ms",
                    coord,
                    groups.len(),
                    groups.iter().map(TerrainGeometry::quad_count).sum::<usize>(),
                    ms
                );
                for g in &groups {
                    let e = self.by_terrain.entry(g.terrain).or_default();
                    e.0 += g.quad_count();
                    e.1 += g.vertex_count();
                }
            }
            Err(e) => {
                self.failed += 1;
                log::warn!("chunk {:?} failed to mesh: {}", coord, e);
            }
        }
    }

    fn report(&self, tables: &MeshTables, wall: Duration) {
        log::info!(
            "meshed {} chunks ({} failed): {}ms mesh time, {}ms wall",
            self.chunks,
            self.failed,
            self.t_mesh_ms,
            wall.as_millis()
        );
        for (terrain, (quads, verts)) in &self.by_terrain {
            log::info!(
                "  terrain {:<10} quads={:<8} vertices={}",
                tables.terrain_name(*terrain).unwrap_or("?"),
                quads,
                verts
            );
        }
    }
}

fn generate_region(terrain: &mut TerrainGen, radius: i32) -> ChunkMap {
    let mut map = ChunkMap::new();
    for cx in -radius..=radius {
        for cz in -radius..=radius {
            for cy in 0..CHUNKS_Y as i32 {
                map.insert(terrain.generate(ChunkCoord::new(cx, cy, cz)));
            }
        }
    }
    map
}

fn mesh_local(
    map: &ChunkMap,
    tables: Arc<MeshTables>,
    cfg: &AppConfig,
) -> Result<Stats, MeshError> {
    let mut mesher = ChunkMesher::new(Arc::clone(&tables), cfg.mesh.clone())?;
    let mut stats = Stats::default();
    for (i, coord) in map.coords().into_iter().enumerate() {
        let Some(hood) = map.neighborhood(coord) else {
            continue;
        };
        let desc = ChunkDescriptor::from_chunk(hood.center(), &tables, RequestToken(i as u64));
        let t0 = Instant::now();
        let result = mesher.mesh_live(&hood, &desc);
        let ms = t0.elapsed().as_millis().min(u128::from(u32::MAX)) as u32;
        stats.record(coord, result, ms);
    }
    Ok(stats)
}

fn mesh_threaded(
    map: &ChunkMap,
    tables: Arc<MeshTables>,
    cfg: &AppConfig,
    workers: usize,
) -> Result<Stats, Box<dyn std::error::Error>> {
    let rt = MeshRuntime::new(Arc::clone(&tables), cfg.mesh.clone(), workers)?;
    let mut revs = RevisionTracker::new();
    let mut stats = Stats::default();
    let mut pending = 0usize;
    let wait = Duration::from_secs(30);

    for (i, coord) in map.coords().into_iter().enumerate() {
        let Some(hood) = map.neighborhood(coord) else {
            continue;
        };
        let desc = ChunkDescriptor::from_chunk(hood.center(), &tables, RequestToken(i as u64));
        let rev = revs.bump(coord);
        let job = loop {
            match rt.prepare(&hood, rev, desc.clone()) {
                Ok(job) => break job,
                // Every snapshot buffer is out; wait for a worker to hand some back.
                Err(MeshError::PoolExhausted { .. }) if pending > 0 => {
                    let out = rt.recv_result_timeout(wait).ok_or("mesh workers stalled")?;
                    pending -= 1;
                    if revs.accept(&out) {
                        stats.record(out.coord, out.result, out.t_mesh_ms);
                    }
                }
                Err(e) => return Err(e.into()),
            }
        };
        rt.submit(job);
        pending += 1;
        let (queued, inflight) = rt.queue_debug_counts();
        log::trace!("submitted {:?} rev={} queued={} inflight={}", coord, rev, queued, inflight);
    }

    while pending > 0 {
        let out = rt.recv_result_timeout(wait).ok_or("mesh workers stalled")?;
        pending -= 1;
        if revs.accept(&out) {
            stats.record(out.coord, out.result, out.t_mesh_ms);
        }
    }
    Ok(stats)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut cfg = match &args.config {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::default(),
    };
    if args.no_ao {
        cfg.mesh.enable_ao = false;
    }
    cfg.mesh.validate()?;
    if args.size == 0 || args.size > MAX_CHUNK_SIZE {
        return Err(MeshError::InvalidChunkSize(args.size).into());
    }
    if args.radius < 0 {
        return Err(format!("radius must be >= 0, got {}", args.radius).into());
    }

    let tables = Arc::new(MeshTables::load_from_path(&args.tables)?);
    log::info!(
        "loaded {} voxels, {} materials, {} terrain groups from {}",
        tables.voxel_count(),
        tables.material_count(),
        tables.terrain_count(),
        args.tables.display()
    );

    let t0 = Instant::now();
    let mut terrain = TerrainGen::new(cfg.world.clone(), args.seed, args.size, CHUNKS_Y, &tables);
    let map = generate_region(&mut terrain, args.radius);
    log::info!(
        "generated {} chunks of {}^3 in {}ms",
        map.len(),
        args.size,
        t0.elapsed().as_millis()
    );

    let t0 = Instant::now();
    let stats = if args.threaded {
        mesh_threaded(&map, Arc::clone(&tables), &cfg, args.workers)?
    } else {
        mesh_local(&map, Arc::clone(&tables), &cfg)?
    };
    stats.report(&tables, t0.elapsed());
    Ok(())
}
