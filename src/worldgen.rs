use fastnoise_lite::{FastNoiseLite, NoiseType};
use hashbrown::HashMap;
use tessel_blocks::{AIR, MeshTables, VoxelId};
use tessel_chunk::{Chunk, ChunkCoord};

use crate::config::WorldConfig;

#[derive(Clone, Copy, Debug)]
struct Palette {
    stone: VoxelId,
    dirt: VoxelId,
    grass: VoxelId,
    sand: VoxelId,
    snow: VoxelId,
    glass: VoxelId,
    leaves: VoxelId,
}

impl Palette {
    /// Names missing from the tables fall back to stone, then air.
    fn resolve(tables: &MeshTables) -> Self {
        let stone = tables.voxel_id("stone").unwrap_or(AIR);
        let get = |name: &str| tables.voxel_id(name).unwrap_or(stone);
        Self {
            stone,
            dirt: get("dirt"),
            grass: get("grass"),
            sand: get("sand"),
            snow: get("snow"),
            glass: get("glass"),
            leaves: get("leaves"),
        }
    }
}

/// Noise heightmap terrain for a region `chunks_y` chunks tall.
pub struct TerrainGen {
    cfg: WorldConfig,
    seed: i32,
    size: usize,
    world_height: i32,
    palette: Palette,
    terrain: FastNoiseLite,
    detail: FastNoiseLite,
    heights: HashMap<(i32, i32), Vec<i32>>,
}

impl TerrainGen {
    pub fn new(
        cfg: WorldConfig,
        seed: i32,
        size: usize,
        chunks_y: usize,
        tables: &MeshTables,
    ) -> Self {
        let mut terrain = FastNoiseLite::with_seed(seed);
        terrain.set_noise_type(Some(NoiseType::OpenSimplex2));
        terrain.set_frequency(Some(cfg.height_frequency));
        let mut detail = FastNoiseLite::with_seed(seed ^ 99_173);
        detail.set_noise_type(Some(NoiseType::OpenSimplex2));
        detail.set_frequency(Some(0.09));
        Self {
            cfg,
            seed,
            size,
            world_height: (size * chunks_y) as i32,
            palette: Palette::resolve(tables),
            terrain,
            detail,
            heights: HashMap::new(),
        }
    }

    fn surface_height(&self, wx: i32, wz: i32) -> i32 {
        let n = self.terrain.get_noise_2d(wx as f32, wz as f32) * 0.85
            + self.detail.get_noise_2d(wx as f32, wz as f32) * 0.15;
        let t = (n * 0.5 + 0.5).clamp(0.0, 1.0);
        let h = self.world_height as f32;
        let lo = self.cfg.min_height_ratio * h;
        let hi = self.cfg.max_height_ratio * h;
        (lo + t * (hi - lo)) as i32
    }

    /// Column heights are shared by every chunk stacked on `(cx, cz)`.
    fn column(&mut self, cx: i32, cz: i32) -> &[i32] {
        let s = self.size;
        if !self.heights.contains_key(&(cx, cz)) {
            let mut hs = Vec::with_capacity(s * s);
            for x in 0..s {
                for z in 0..s {
                    let wx = cx * s as i32 + x as i32;
                    let wz = cz * s as i32 + z as i32;
                    hs.push(self.surface_height(wx, wz));
                }
            }
            self.heights.insert((cx, cz), hs);
        }
        &self.heights[&(cx, cz)]
    }

    fn top_block(&self, h: i32) -> VoxelId {
        let t = h as f32 / self.world_height.max(1) as f32;
        if t >= self.cfg.snow_threshold {
            self.palette.snow
        } else if t <= self.cfg.sand_threshold {
            self.palette.sand
        } else {
            self.palette.grass
        }
    }

    fn hash01(&self, wx: i32, wz: i32) -> f32 {
        let mut h = (wx as u32).wrapping_mul(0x9E37_79B1)
            ^ (wz as u32).wrapping_mul(0x85EB_CA77)
            ^ (self.seed as u32);
        h ^= h >> 15;
        h = h.wrapping_mul(0x2C1B_3C6D);
        h ^= h >> 12;
        (h & 0xFFFF) as f32 / 65535.0
    }

    pub fn generate(&mut self, coord: ChunkCoord) -> Chunk {
        let s = self.size;
        let mut chunk = Chunk::new(coord, s);
        let base_y = coord.cy * s as i32;
        let heights = self.column(coord.cx, coord.cz).to_vec();
        let topsoil = self.cfg.topsoil_thickness;
        let p = self.palette;

        for x in 0..s {
            for z in 0..s {
                let h = heights[x * s + z];
                let top = self.top_block(h);
                let wx = coord.cx * s as i32 + x as i32;
                let wz = coord.cz * s as i32 + z as i32;
                for y in 0..s {
                    let wy = base_y + y as i32;
                    let id = if wy >= h {
                        AIR
                    } else if wy == h - 1 {
                        top
                    } else if wy >= h - 1 - topsoil {
                        if top == p.grass { p.dirt } else { top }
                    } else {
                        p.stone
                    };
                    if id != AIR {
                        chunk.set(x, y, z, id);
                    }
                }

                // Sparse glass pillars topped with a leaf cap, only on grass.
                if top == p.grass && self.hash01(wx, wz) < self.cfg.tree_chance {
                    for dy in 0..4 {
                        let ly = h + dy - base_y;
                        if (0..s as i32).contains(&ly) {
                            let id = if dy == 3 { p.leaves } else { p.glass };
                            chunk.set(x, ly as usize, z, id);
                        }
                    }
                }
            }
        }
        chunk
    }
}
