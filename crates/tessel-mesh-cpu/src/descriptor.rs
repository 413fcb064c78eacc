use tessel_blocks::{MeshTables, VoxelId};
use tessel_chunk::{Chunk, ChunkSummary, MAX_CHUNK_SIZE};

use crate::error::MeshError;

/// Caller-chosen identity carried through to the output geometry.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct RequestToken(pub u64);

/// Per-chunk facts handed to the mesher alongside the voxel data.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChunkDescriptor {
    pub size: usize,
    pub is_empty: bool,
    pub is_full: bool,
    /// Uniform voxel per y layer. Empty means no hints.
    pub whole_layer: Vec<Option<VoxelId>>,
    pub request: RequestToken,
}

impl ChunkDescriptor {
    /// Descriptor without any skip hints; always safe to mesh with.
    pub fn unhinted(size: usize, request: RequestToken) -> Self {
        Self {
            size,
            is_empty: false,
            is_full: false,
            whole_layer: Vec::new(),
            request,
        }
    }

    pub fn from_summary(size: usize, summary: ChunkSummary, request: RequestToken) -> Self {
        Self {
            size,
            is_empty: summary.is_empty,
            is_full: summary.is_full,
            whole_layer: summary.whole_layer,
            request,
        }
    }

    pub fn from_chunk(chunk: &Chunk, tables: &MeshTables, request: RequestToken) -> Self {
        Self::from_summary(chunk.size(), ChunkSummary::scan(chunk, tables), request)
    }

    #[inline]
    pub fn layer_hint(&self, y: usize) -> Option<VoxelId> {
        self.whole_layer.get(y).copied().flatten()
    }

    pub(crate) fn check(&self, field_size: usize) -> Result<(), MeshError> {
        if field_size == 0 || field_size > MAX_CHUNK_SIZE {
            return Err(MeshError::InvalidChunkSize(field_size));
        }
        if self.size != field_size {
            return Err(MeshError::DescriptorMismatch(format!(
                "descriptor size {} but voxel data size {}",
                self.size, field_size
            )));
        }
        if !self.whole_layer.is_empty() && self.whole_layer.len() != self.size {
            return Err(MeshError::DescriptorMismatch(format!(
                "{} layer hints for {} layers",
                self.whole_layer.len(),
                self.size
            )));
        }
        Ok(())
    }
}
