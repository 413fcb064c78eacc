#![allow(dead_code)]

use std::sync::Arc;

use tessel_blocks::{MeshTables, VoxelId};

pub const AIR: VoxelId = 0;
pub const STONE: VoxelId = 1;
pub const DIRT: VoxelId = 2;
pub const GLASS: VoxelId = 3;
pub const LEAVES: VoxelId = 4;
pub const GRANITE: VoxelId = 5;
pub const TINTED_GLASS: VoxelId = 6;

/// Small palette covering the culling cases: opaque stone/dirt/granite
/// (granite shares stone's material), non-opaque glass (own terrain group)
/// and leaves, and tinted glass sharing glass's material.
pub fn tables() -> Arc<MeshTables> {
    let t = MeshTables::from_toml_str(
        r#"
        [materials.stone]
        color = [0.5, 0.5, 0.5]

        [materials.dirt]
        color = [0.6, 0.4, 0.2]
        atlas_index = 3

        [materials.glass]
        color = [0.8, 0.9, 1.0]
        terrain = "glass"

        [materials.leaf]
        color = [0.2, 0.7, 0.2]

        [[voxels]]
        name = "stone"
        id = 1
        material = "stone"

        [[voxels]]
        name = "dirt"
        id = 2
        material = "dirt"

        [[voxels]]
        name = "glass"
        id = 3
        opaque = false
        material = "glass"

        [[voxels]]
        name = "leaves"
        id = 4
        opaque = false
        material = "leaf"

        [[voxels]]
        name = "granite"
        id = 5
        material = "stone"

        [[voxels]]
        name = "tinted_glass"
        id = 6
        opaque = false
        material = "glass"
        "#,
    )
    .expect("test tables");
    Arc::new(t)
}
