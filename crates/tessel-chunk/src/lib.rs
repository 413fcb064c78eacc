//! Chunk voxel grids, neighbor topology and chunk summaries.
#![forbid(unsafe_code)]

mod map;
mod neighbors;

pub use map::ChunkMap;
pub use neighbors::{NEIGHBOR_OFFSETS, NeighborKind, Neighborhood, slot_index};

use tessel_blocks::{AIR, MeshTables, VoxelId};

/// Largest supported chunk side length.
pub const MAX_CHUNK_SIZE: usize = 256;

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct ChunkCoord {
    pub cx: i32,
    pub cy: i32,
    pub cz: i32,
}

impl ChunkCoord {
    #[inline]
    pub const fn new(cx: i32, cy: i32, cz: i32) -> Self {
        Self { cx, cy, cz }
    }

    #[inline]
    pub fn offset(self, dx: i32, dy: i32, dz: i32) -> Self {
        Self::new(self.cx + dx, self.cy + dy, self.cz + dz)
    }
}

/// Cubic grid of voxel ids, `size` voxels per side, stored x-major.
#[derive(Clone, Debug)]
pub struct Chunk {
    pub coord: ChunkCoord,
    size: usize,
    voxels: Vec<VoxelId>,
}

impl Chunk {
    /// All-air chunk.
    pub fn new(coord: ChunkCoord, size: usize) -> Self {
        Self {
            coord,
            size,
            voxels: vec![AIR; size * size * size],
        }
    }

    /// Wraps an existing buffer; short buffers are padded with air, long ones truncated.
    pub fn from_voxels(coord: ChunkCoord, size: usize, voxels: Vec<VoxelId>) -> Self {
        let mut v = voxels;
        let expect = size * size * size;
        if v.len() != expect {
            v.resize(expect, AIR);
        }
        Self {
            coord,
            size,
            voxels: v,
        }
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn idx(&self, x: usize, y: usize, z: usize) -> usize {
        (x * self.size + y) * self.size + z
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize, z: usize) -> VoxelId {
        self.voxels[self.idx(x, y, z)]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, z: usize, id: VoxelId) {
        let i = self.idx(x, y, z);
        self.voxels[i] = id;
    }

    /// Fills the inclusive-exclusive box `[min, max)` with `id`, clamped to the chunk.
    pub fn fill(&mut self, min: [usize; 3], max: [usize; 3], id: VoxelId) {
        let s = self.size;
        for x in min[0]..max[0].min(s) {
            for y in min[1]..max[1].min(s) {
                for z in min[2]..max[2].min(s) {
                    self.set(x, y, z, id);
                }
            }
        }
    }

    #[inline]
    pub fn voxels(&self) -> &[VoxelId] {
        &self.voxels
    }

    #[inline]
    pub fn is_all_air(&self) -> bool {
        self.voxels.iter().all(|&v| v == AIR)
    }
}

/// Cheap facts about a chunk that let the mesher skip work.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChunkSummary {
    /// Every voxel is air.
    pub is_empty: bool,
    /// Every voxel is opaque.
    pub is_full: bool,
    /// Per y layer, the voxel id filling that whole layer, if uniform.
    pub whole_layer: Vec<Option<VoxelId>>,
}

impl ChunkSummary {
    pub fn scan(chunk: &Chunk, tables: &MeshTables) -> Self {
        let s = chunk.size();
        let mut is_empty = true;
        let mut is_full = true;
        for &v in chunk.voxels() {
            if v != AIR {
                is_empty = false;
            }
            if !tables.is_opaque(v) {
                is_full = false;
            }
            if !is_empty && !is_full {
                break;
            }
        }

        let mut whole_layer = Vec::with_capacity(s);
        for y in 0..s {
            let first = chunk.get(0, y, 0);
            let uniform = (0..s).all(|x| (0..s).all(|z| chunk.get(x, y, z) == first));
            whole_layer.push(uniform.then_some(first));
        }

        Self {
            is_empty,
            is_full,
            whole_layer,
        }
    }
}
