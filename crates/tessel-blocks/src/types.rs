/// Raw voxel identifier as stored in chunk grids.
pub type VoxelId = u16;

/// Voxel id 0 is always air.
pub const AIR: VoxelId = 0;

/// Number of face directions: +x, -x, +y, -y, +z, -z.
pub const FACE_DIRS: usize = 6;

/// Face material identifier. `MaterialId(0)` means "no material".
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct MaterialId(pub u16);

impl MaterialId {
    pub const NONE: MaterialId = MaterialId(0);

    #[inline]
    pub fn is_none(self) -> bool {
        self.0 == 0
    }
}

/// Terrain group: a bucket of materials that share one renderable mesh.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct TerrainId(pub u16);

impl TerrainId {
    pub const DEFAULT: TerrainId = TerrainId(0);
}
