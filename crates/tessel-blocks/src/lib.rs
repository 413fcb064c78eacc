//! Voxel and material lookup tables consumed by the mesher.
#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod tables;
pub mod types;

pub use error::TablesError;
pub use tables::{MeshTables, MeshTablesBuilder};
pub use types::{AIR, FACE_DIRS, MaterialId, TerrainId, VoxelId};
