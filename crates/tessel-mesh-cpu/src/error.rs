use thiserror::Error;

use crate::geometry::MAX_QUADS_PER_GROUP;
use tessel_chunk::MAX_CHUNK_SIZE;

/// Failures surfaced by the meshing entry points. A failed call never
/// returns partial geometry; callers retry or skip the chunk.
#[derive(Debug, Error)]
pub enum MeshError {
    #[error("{pool} pool exhausted ({max} items in use)")]
    PoolExhausted { pool: &'static str, max: usize },
    #[error("neighbor at offset {offset:?} has size {found}, expected {expected}")]
    SizeMismatch {
        offset: (i32, i32, i32),
        expected: usize,
        found: usize,
    },
    #[error("chunk size {0} is outside 1..={max}", max = MAX_CHUNK_SIZE)]
    InvalidChunkSize(usize),
    #[error("descriptor does not match voxel data: {0}")]
    DescriptorMismatch(String),
    #[error(
        "terrain group {terrain} has {quads} quads, at most {max} fit 16-bit indices",
        max = MAX_QUADS_PER_GROUP
    )]
    IndexOverflow { terrain: u16, quads: usize },
    #[error("invalid mesher config: {0}")]
    InvalidConfig(String),
}
