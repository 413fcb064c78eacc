use std::ops::Range;

use tessel_blocks::VoxelId;
use tessel_chunk::{Chunk, MAX_CHUNK_SIZE, NEIGHBOR_OFFSETS, Neighborhood, slot_index};

use crate::error::MeshError;
use crate::field::{VoxelField, split_coord};
use crate::pool::{Pool, Pooled};

/// Self-contained copy of a chunk and the slices of its neighbors the mesher
/// reads. Owns pooled buffers, which go back to the copier's pool on drop.
///
/// Slot `(dx,dy,dz)` stores `S` voxels along each axis where the offset is 0
/// and one voxel along the others, x-major.
pub struct ChunkSnapshot {
    size: usize,
    slots: [Option<Pooled<Vec<VoxelId>>>; 27],
}

impl ChunkSnapshot {
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Raw compact slice for a slot, if that neighbor was present.
    pub fn slot(&self, dx: i32, dy: i32, dz: i32) -> Option<&[VoxelId]> {
        self.slots[slot_index(dx, dy, dz)].as_deref().map(Vec::as_slice)
    }

    /// Present buffers in slot order.
    pub fn buffers(&self) -> impl Iterator<Item = &[VoxelId]> + '_ {
        self.slots.iter().flatten().map(|b| b.as_slice())
    }

    pub fn buffer_count(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    /// Voxel capacity held by the present buffers.
    pub fn retained_capacity(&self) -> usize {
        self.slots.iter().flatten().map(|b| b.capacity()).sum()
    }
}

impl std::fmt::Debug for ChunkSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChunkSnapshot")
            .field("size", &self.size)
            .field("buffers", &self.buffer_count())
            .finish()
    }
}

impl VoxelField for ChunkSnapshot {
    #[inline]
    fn size(&self) -> usize {
        self.size
    }

    #[inline]
    fn voxel(&self, x: i32, y: i32, z: i32) -> Option<VoxelId> {
        let s = self.size as i32;
        let (ox, lx) = split_coord(x, s)?;
        let (oy, ly) = split_coord(y, s)?;
        let (oz, lz) = split_coord(z, s)?;
        let buf = self.slots[slot_index(ox, oy, oz)].as_deref()?;
        // Collapsed axes hold a single voxel at index 0.
        let dim = |o: i32| if o == 0 { self.size } else { 1 };
        let at = |o: i32, l: i32| if o == 0 { l as usize } else { 0 };
        let ix = (at(ox, lx) * dim(oy) + at(oy, ly)) * dim(oz) + at(oz, lz);
        buf.get(ix).copied()
    }

    #[inline]
    fn has_neighbor(&self, dx: i32, dy: i32, dz: i32) -> bool {
        self.slots[slot_index(dx, dy, dz)].is_some()
    }
}

/// Copies the voxel shell around a chunk into pooled buffers. Cloning shares
/// the pool, so one copier can feed many worker threads.
#[derive(Clone)]
pub struct NeighborCopier {
    pool: Pool<Vec<VoxelId>>,
}

impl NeighborCopier {
    /// Copier whose pool holds at most `max_buffers` slot buffers.
    pub fn new(max_buffers: usize) -> Self {
        Self {
            pool: Pool::new("snapshot buffer", max_buffers.max(1)),
        }
    }

    /// Copier sized for `snapshots` fully surrounded chunks alive at once.
    pub fn for_snapshots(snapshots: usize) -> Self {
        Self::new(snapshots.max(1) * 27)
    }

    pub fn pool(&self) -> &Pool<Vec<VoxelId>> {
        &self.pool
    }

    pub fn copy(&self, hood: &Neighborhood<'_>) -> Result<ChunkSnapshot, MeshError> {
        let s = hood.center().size();
        if s == 0 || s > MAX_CHUNK_SIZE {
            return Err(MeshError::InvalidChunkSize(s));
        }
        let mut slots: [Option<Pooled<Vec<VoxelId>>>; 27] = std::array::from_fn(|_| None);
        for (slot, &(dx, dy, dz)) in NEIGHBOR_OFFSETS.iter().enumerate() {
            let Some(chunk) = hood.get(dx, dy, dz) else {
                continue;
            };
            if chunk.size() != s {
                return Err(MeshError::SizeMismatch {
                    offset: (dx, dy, dz),
                    expected: s,
                    found: chunk.size(),
                });
            }
            let mut buf = self.pool.try_acquire()?;
            copy_slice(chunk, (dx, dy, dz), &mut buf);
            slots[slot] = Some(buf);
        }
        log::trace!(
            target: "mesh",
            "snapshot {:?}: {} buffers",
            hood.center().coord,
            slots.iter().flatten().count()
        );
        Ok(ChunkSnapshot { size: s, slots })
    }
}

/// Cells of a neighbor that touch the center chunk along one axis.
#[inline]
fn touching(offset: i32, s: usize) -> Range<usize> {
    match offset {
        -1 => s - 1..s,
        1 => 0..1,
        _ => 0..s,
    }
}

fn copy_slice(chunk: &Chunk, (dx, dy, dz): (i32, i32, i32), out: &mut Vec<VoxelId>) {
    let s = chunk.size();
    let (xs, ys, zs) = (touching(dx, s), touching(dy, s), touching(dz, s));
    out.clear();
    // Pooled buffers move between slot kinds; a corner must not keep a center's S^3.
    out.shrink_to(xs.len() * ys.len() * zs.len());
    if (dx, dy, dz) == (0, 0, 0) {
        out.extend_from_slice(chunk.voxels());
        return;
    }
    for x in xs {
        for y in ys.clone() {
            for z in zs.clone() {
                out.push(chunk.get(x, y, z));
            }
        }
    }
}
