use tessel_blocks::{AIR, MeshTables, VoxelId};
use tessel_chunk::{NEIGHBOR_OFFSETS, Neighborhood, slot_index};

use crate::config::MissingNeighborPolicy;
use crate::error::MeshError;

/// Read-only voxel access over a chunk plus a one-voxel shell taken from its
/// neighbors. Coordinates are chunk-local and valid in `[-1, size]` on each axis.
pub trait VoxelField {
    fn size(&self) -> usize;

    /// Voxel at a chunk-local coordinate, or `None` when the neighbor that
    /// holds it is not loaded.
    fn voxel(&self, x: i32, y: i32, z: i32) -> Option<VoxelId>;

    fn has_neighbor(&self, dx: i32, dy: i32, dz: i32) -> bool;

    /// Fails if a present neighbor does not share the center's size.
    fn check_sizes(&self) -> Result<(), MeshError> {
        Ok(())
    }
}

/// Splits one coordinate into (neighbor offset, coordinate inside that neighbor).
#[inline]
pub(crate) fn split_coord(c: i32, s: i32) -> Option<(i32, i32)> {
    debug_assert!(c >= -1 && c <= s, "coordinate {c} outside shell of size {s}");
    if c < -1 || c > s {
        None
    } else if c < 0 {
        Some((-1, s - 1))
    } else if c >= s {
        Some((1, 0))
    } else {
        Some((0, c))
    }
}

impl VoxelField for Neighborhood<'_> {
    #[inline]
    fn size(&self) -> usize {
        self.center().size()
    }

    #[inline]
    fn voxel(&self, x: i32, y: i32, z: i32) -> Option<VoxelId> {
        let s = self.center().size() as i32;
        let (ox, lx) = split_coord(x, s)?;
        let (oy, ly) = split_coord(y, s)?;
        let (oz, lz) = split_coord(z, s)?;
        let chunk = self.get(ox, oy, oz)?;
        Some(chunk.get(lx as usize, ly as usize, lz as usize))
    }

    #[inline]
    fn has_neighbor(&self, dx: i32, dy: i32, dz: i32) -> bool {
        self.slots()[slot_index(dx, dy, dz)].is_some()
    }

    fn check_sizes(&self) -> Result<(), MeshError> {
        let s = self.center().size();
        for &(dx, dy, dz) in NEIGHBOR_OFFSETS.iter() {
            if let Some(c) = self.get(dx, dy, dz) {
                if c.size() != s {
                    return Err(MeshError::SizeMismatch {
                        offset: (dx, dy, dz),
                        expected: s,
                        found: c.size(),
                    });
                }
            }
        }
        Ok(())
    }
}

/// Solidity lookup over a field, resolving missing neighbors by policy.
pub struct Solidity<'a, F: ?Sized> {
    field: &'a F,
    tables: &'a MeshTables,
    policy: MissingNeighborPolicy,
    max: i32,
}

impl<'a, F: VoxelField + ?Sized> Solidity<'a, F> {
    pub fn new(field: &'a F, tables: &'a MeshTables, policy: MissingNeighborPolicy) -> Self {
        Self {
            field,
            tables,
            policy,
            max: field.size() as i32 - 1,
        }
    }

    #[inline]
    pub fn is_solid(&self, p: [i32; 3]) -> bool {
        if let Some(v) = self.field.voxel(p[0], p[1], p[2]) {
            return self.tables.is_solid(v);
        }
        match self.policy {
            MissingNeighborPolicy::TreatAsAir => false,
            MissingNeighborPolicy::SkipBoundary => {
                let c = p.map(|v| v.clamp(0, self.max));
                let v = self.field.voxel(c[0], c[1], c[2]).unwrap_or(AIR);
                self.tables.is_solid(v)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessel_blocks::config::VoxelDef;
    use tessel_chunk::{Chunk, ChunkCoord};

    #[test]
    fn split_covers_shell() {
        assert_eq!(split_coord(-1, 4), Some((-1, 3)));
        assert_eq!(split_coord(0, 4), Some((0, 0)));
        assert_eq!(split_coord(3, 4), Some((0, 3)));
        assert_eq!(split_coord(4, 4), Some((1, 0)));
    }

    #[test]
    fn live_lookup_crosses_into_neighbors() {
        let center = Chunk::new(ChunkCoord::new(0, 0, 0), 4);
        let mut west = Chunk::new(ChunkCoord::new(-1, 0, 0), 4);
        west.set(3, 2, 1, 5);
        let hood = Neighborhood::new(&center).with(-1, 0, 0, &west);
        assert_eq!(hood.voxel(-1, 2, 1), Some(5));
        assert_eq!(hood.voxel(-1, 2, 2), Some(AIR));
        assert_eq!(hood.voxel(4, 0, 0), None);
        assert!(hood.has_neighbor(-1, 0, 0));
        assert!(!hood.has_neighbor(1, 0, 0));
    }

    #[test]
    fn missing_neighbor_policies() {
        let tables = MeshTables::builder()
            .color_material("stone", [0.5; 3])
            .voxel(VoxelDef::cube("stone", "stone"))
            .build()
            .unwrap();
        let mut center = Chunk::new(ChunkCoord::new(0, 0, 0), 2);
        center.set(1, 0, 0, 1);
        let hood = Neighborhood::new(&center);

        let skip = Solidity::new(&hood, &tables, MissingNeighborPolicy::SkipBoundary);
        assert!(skip.is_solid([2, 0, 0]), "clamps to nearest center voxel");
        assert!(!skip.is_solid([2, 1, 0]));

        let air = Solidity::new(&hood, &tables, MissingNeighborPolicy::TreatAsAir);
        assert!(!air.is_solid([2, 0, 0]));
        assert!(air.is_solid([1, 0, 0]));
    }
}
