//! Mesh job queue and worker orchestration.
#![forbid(unsafe_code)]

mod revision;

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, unbounded};
use rayon::{ThreadPool, ThreadPoolBuildError, ThreadPoolBuilder};
use tessel_blocks::MeshTables;
use tessel_chunk::{ChunkCoord, Neighborhood};
use tessel_mesh_cpu::{
    ChunkDescriptor, ChunkMesher, ChunkSnapshot, MeshConfig, MeshError, NeighborCopier,
    TerrainGeometry,
};
use thiserror::Error;

pub use revision::RevisionTracker;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("failed to build mesh worker pool: {0}")]
    ThreadPool(#[from] ThreadPoolBuildError),
    #[error(transparent)]
    Mesh(#[from] MeshError),
}

/// One chunk to mesh, with its neighborhood already copied out.
#[derive(Debug)]
pub struct MeshJob {
    pub coord: ChunkCoord,
    pub rev: u64,
    pub job_id: u64,
    pub descriptor: ChunkDescriptor,
    pub snapshot: ChunkSnapshot,
}

#[derive(Debug)]
pub struct JobOut {
    pub coord: ChunkCoord,
    pub rev: u64,
    pub job_id: u64,
    pub result: Result<Vec<TerrainGeometry>, MeshError>,
    pub t_mesh_ms: u32,
}

fn process_mesh_job(job: MeshJob, mesher: &mut ChunkMesher, tx: &Sender<JobOut>) {
    let MeshJob {
        coord,
        rev,
        job_id,
        descriptor,
        snapshot,
    } = job;

    let t0 = Instant::now();
    let result = mesher.mesh_snapshot(&snapshot, &descriptor);
    let t_mesh_ms = t0.elapsed().as_millis().min(u128::from(u32::MAX)) as u32;
    // Hand the buffers back before the result becomes visible.
    drop(snapshot);

    match &result {
        Ok(groups) => log::debug!(
            target: "runtime",
            "meshed {:?} rev={} job={} groups={} in {}ms",
            coord,
            rev,
            job_id,
            groups.len(),
            t_mesh_ms
        ),
        Err(e) => log::warn!(
            target: "runtime",
            "mesh job {} for {:?} rev={} failed: {}",
            job_id,
            coord,
            rev,
            e
        ),
    }

    let _ = tx.send(JobOut {
        coord,
        rev,
        job_id,
        result,
        t_mesh_ms,
    });
}

pub struct MeshRuntime {
    job_tx: Sender<MeshJob>,
    res_rx: Receiver<JobOut>,
    _pool: Arc<ThreadPool>,
    copier: NeighborCopier,
    tables: Arc<MeshTables>,
    q_mesh: Arc<AtomicUsize>,
    inflight_mesh: Arc<AtomicUsize>,
    next_job_id: AtomicU64,
    pub workers: usize,
}

impl MeshRuntime {
    /// Spawns `workers` mesh threads, or one per core when `workers` is 0.
    pub fn new(
        tables: Arc<MeshTables>,
        config: MeshConfig,
        workers: usize,
    ) -> Result<Self, RuntimeError> {
        let workers = if workers == 0 {
            thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4)
        } else {
            workers
        };
        let (job_tx, job_rx) = unbounded::<MeshJob>();
        let (res_tx, res_rx) = unbounded::<JobOut>();
        let copier = NeighborCopier::for_snapshots(config.max_snapshots);

        // Build every mesher up front so a bad config fails here, not on a worker.
        let meshers = (0..workers)
            .map(|_| ChunkMesher::with_copier(Arc::clone(&tables), config.clone(), copier.clone()))
            .collect::<Result<Vec<_>, _>>()?;

        let q_mesh_ctr = Arc::new(AtomicUsize::new(0));
        let inflight_mesh_ctr = Arc::new(AtomicUsize::new(0));

        let pool = Arc::new(
            ThreadPoolBuilder::new()
                .num_threads(workers)
                .thread_name(|i| format!("tessel-mesh-{i}"))
                .build()?,
        );
        for mut mesher in meshers {
            let rx = job_rx.clone();
            let tx = res_tx.clone();
            let q_mesh = q_mesh_ctr.clone();
            let inflight_mesh = inflight_mesh_ctr.clone();
            pool.spawn(move || {
                while let Ok(job) = rx.recv() {
                    q_mesh.fetch_sub(1, Ordering::Relaxed);
                    inflight_mesh.fetch_add(1, Ordering::Relaxed);
                    process_mesh_job(job, &mut mesher, &tx);
                    inflight_mesh.fetch_sub(1, Ordering::Relaxed);
                }
            });
        }
        log::info!(target: "runtime", "mesh runtime started with {workers} workers");

        Ok(Self {
            job_tx,
            res_rx,
            _pool: pool,
            copier,
            tables,
            q_mesh: q_mesh_ctr,
            inflight_mesh: inflight_mesh_ctr,
            next_job_id: AtomicU64::new(1),
            workers,
        })
    }

    /// Copier shared with the workers; snapshots taken from it return there.
    pub fn copier(&self) -> &NeighborCopier {
        &self.copier
    }

    pub fn tables(&self) -> &Arc<MeshTables> {
        &self.tables
    }

    pub fn next_job_id(&self) -> u64 {
        self.next_job_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Copies `hood` and wraps it in a job for `rev`.
    pub fn prepare(
        &self,
        hood: &Neighborhood<'_>,
        rev: u64,
        descriptor: ChunkDescriptor,
    ) -> Result<MeshJob, MeshError> {
        let snapshot = self.copier.copy(hood)?;
        Ok(MeshJob {
            coord: hood.center().coord,
            rev,
            job_id: self.next_job_id(),
            descriptor,
            snapshot,
        })
    }

    pub fn submit(&self, job: MeshJob) {
        self.q_mesh.fetch_add(1, Ordering::Relaxed);
        if let Err(e) = self.job_tx.send(job) {
            self.q_mesh.fetch_sub(1, Ordering::Relaxed);
            log::warn!(target: "runtime", "mesh job {} rejected: workers gone", e.0.job_id);
        }
    }

    pub fn drain_worker_results(&self) -> Vec<JobOut> {
        self.res_rx.try_iter().collect()
    }

    pub fn recv_result_timeout(&self, timeout: Duration) -> Option<JobOut> {
        match self.res_rx.recv_timeout(timeout) {
            Ok(out) => Some(out),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    /// (queued, in flight)
    pub fn queue_debug_counts(&self) -> (usize, usize) {
        (
            self.q_mesh.load(Ordering::Relaxed),
            self.inflight_mesh.load(Ordering::Relaxed),
        )
    }
}
