use hashbrown::HashMap;

use crate::neighbors::{NEIGHBOR_OFFSETS, Neighborhood};
use crate::{Chunk, ChunkCoord};

/// Loaded chunks keyed by coordinate.
#[derive(Default, Debug)]
pub struct ChunkMap {
    chunks: HashMap<ChunkCoord, Chunk>,
}

impl ChunkMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, chunk: Chunk) -> Option<Chunk> {
        self.chunks.insert(chunk.coord, chunk)
    }

    pub fn remove(&mut self, coord: ChunkCoord) -> Option<Chunk> {
        self.chunks.remove(&coord)
    }

    #[inline]
    pub fn get(&self, coord: ChunkCoord) -> Option<&Chunk> {
        self.chunks.get(&coord)
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Coordinates in sorted order, so callers iterate deterministically.
    pub fn coords(&self) -> Vec<ChunkCoord> {
        let mut v: Vec<ChunkCoord> = self.chunks.keys().copied().collect();
        v.sort_unstable();
        v
    }

    /// The chunk at `coord` with every loaded neighbor attached.
    pub fn neighborhood(&self, coord: ChunkCoord) -> Option<Neighborhood<'_>> {
        let center = self.chunks.get(&coord)?;
        let mut hood = Neighborhood::new(center);
        for &(dx, dy, dz) in NEIGHBOR_OFFSETS.iter() {
            if (dx, dy, dz) == (0, 0, 0) {
                continue;
            }
            hood.set(dx, dy, dz, self.chunks.get(&coord.offset(dx, dy, dz)));
        }
        Some(hood)
    }
}
