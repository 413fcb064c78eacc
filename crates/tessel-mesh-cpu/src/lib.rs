//! CPU greedy mesher: neighbor snapshots, plane-sweep merging, AO and buffer building.
#![forbid(unsafe_code)]

pub mod ao;
mod config;
mod copier;
mod descriptor;
mod error;
mod face;
mod face_data;
mod field;
mod geometry;
mod greedy;
mod pool;

use std::sync::Arc;

use tessel_blocks::MeshTables;
use tessel_chunk::Neighborhood;

pub use ao::{AoCorners, FLAT_AO, decide_tri_dir};
pub use config::{MeshConfig, MissingNeighborPolicy};
pub use copier::{ChunkSnapshot, NeighborCopier};
pub use descriptor::{ChunkDescriptor, RequestToken};
pub use error::MeshError;
pub use face::{FaceDir, SweepAxis, SweepX, SweepY, SweepZ, plane_axes};
pub use face_data::{FaceDataSet, MeshedFaceData, Quad};
pub use field::{Solidity, VoxelField};
pub use geometry::{GeometryBuilder, MAX_QUADS_PER_GROUP, TerrainGeometry};
pub use greedy::{GreedyMesher, MaskRect, merge_mask};
pub use pool::{Pool, Pooled, Recycle};

/// Copier, mesher and geometry builder bundled for one thread.
pub struct ChunkMesher {
    copier: NeighborCopier,
    greedy: GreedyMesher,
    geometry: GeometryBuilder,
}

impl ChunkMesher {
    pub fn new(tables: Arc<MeshTables>, config: MeshConfig) -> Result<Self, MeshError> {
        let copier = NeighborCopier::for_snapshots(config.max_snapshots);
        Self::with_copier(tables, config, copier)
    }

    /// Mesher that draws snapshot buffers from a shared copier.
    pub fn with_copier(
        tables: Arc<MeshTables>,
        config: MeshConfig,
        copier: NeighborCopier,
    ) -> Result<Self, MeshError> {
        let greedy = GreedyMesher::new(Arc::clone(&tables), config.clone())?;
        let geometry = GeometryBuilder::new(tables, config);
        Ok(Self {
            copier,
            greedy,
            geometry,
        })
    }

    pub fn copier(&self) -> &NeighborCopier {
        &self.copier
    }

    pub fn config(&self) -> &MeshConfig {
        self.greedy.config()
    }

    pub fn tables(&self) -> &Arc<MeshTables> {
        self.greedy.tables()
    }

    pub fn snapshot(&self, hood: &Neighborhood<'_>) -> Result<ChunkSnapshot, MeshError> {
        self.copier.copy(hood)
    }

    /// Merged quads only, without expanding them into buffers.
    pub fn mesh_faces<F: VoxelField + ?Sized>(
        &mut self,
        field: &F,
        desc: &ChunkDescriptor,
    ) -> Result<FaceDataSet, MeshError> {
        self.greedy.mesh(field, desc)
    }

    pub fn mesh_snapshot(
        &mut self,
        snapshot: &ChunkSnapshot,
        desc: &ChunkDescriptor,
    ) -> Result<Vec<TerrainGeometry>, MeshError> {
        let faces = self.greedy.mesh(snapshot, desc)?;
        self.geometry.build(&faces, desc.request)
    }

    /// Meshes straight from live chunks on the owning thread.
    pub fn mesh_live(
        &mut self,
        hood: &Neighborhood<'_>,
        desc: &ChunkDescriptor,
    ) -> Result<Vec<TerrainGeometry>, MeshError> {
        let faces = self.greedy.mesh(hood, desc)?;
        self.geometry.build(&faces, desc.request)
    }
}
