use std::collections::HashSet;

use proptest::prelude::*;
use tessel_blocks::config::{MaterialDef, VoxelDef};
use tessel_blocks::{MeshTables, TablesError, TerrainId};

#[test]
fn unknown_material_is_rejected() {
    let err = MeshTables::from_toml_str(
        r#"
        [materials.stone]
        color = [0.5, 0.5, 0.5]

        [[voxels]]
        name = "stone"
        material = "granite"
        "#,
    )
    .unwrap_err();
    match err {
        TablesError::UnknownMaterial { voxel, material } => {
            assert_eq!(voxel, "stone");
            assert_eq!(material, "granite");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn explicit_air_id_is_rejected() {
    let err = MeshTables::from_toml_str(
        r#"
        [[voxels]]
        name = "void"
        id = 0
        "#,
    )
    .unwrap_err();
    assert!(matches!(err, TablesError::AirRedefined(name) if name == "void"));
}

#[test]
fn duplicate_ids_and_names_are_rejected() {
    let dup_id = MeshTables::from_toml_str(
        r#"
        [[voxels]]
        name = "a"
        id = 3
        [[voxels]]
        name = "b"
        id = 3
        "#,
    )
    .unwrap_err();
    assert!(matches!(dup_id, TablesError::DuplicateVoxelId { id: 3, .. }));

    let dup_name = MeshTables::builder()
        .voxel(VoxelDef {
            material: None,
            ..VoxelDef::cube("air", "unused")
        })
        .build()
        .unwrap_err();
    assert!(matches!(dup_name, TablesError::DuplicateName { kind: "voxel", .. }));
}

#[test]
fn out_of_range_id_is_rejected() {
    let err = MeshTables::from_toml_str(
        r#"
        [[voxels]]
        name = "huge"
        id = 70000
        "#,
    )
    .unwrap_err();
    assert!(matches!(err, TablesError::VoxelIdOutOfRange { id: 70000, .. }));
}

#[test]
fn malformed_toml_is_a_parse_error() {
    let err = MeshTables::from_toml_str("[[voxels]\nname = ").unwrap_err();
    assert!(matches!(err, TablesError::Parse(_)));
}

#[test]
fn defaults_are_solid_opaque_white() {
    let t = MeshTables::from_toml_str(
        r#"
        [materials.plain]

        [[voxels]]
        name = "block"
        material = "plain"
        "#,
    )
    .unwrap();
    let id = t.voxel_id("block").unwrap();
    let mat = t.material_id("plain").unwrap();
    assert!(t.is_solid(id));
    assert!(t.is_opaque(id));
    assert_eq!(t.base_color(mat), [1.0, 1.0, 1.0]);
    assert_eq!(t.terrain_of(mat), TerrainId::DEFAULT);
}

proptest! {
    // Every registered voxel gets a unique non-air id and resolves its material on all faces.
    #[test]
    fn ids_unique_and_faces_resolved(n_mats in 1usize..8, n_voxels in 1usize..24, explicit in proptest::collection::vec(any::<bool>(), 24)) {
        let mut b = MeshTables::builder();
        for m in 0..n_mats {
            b = b.material(format!("m{m}"), MaterialDef {
                color: [m as f32 / 8.0, 0.5, 0.5],
                atlas_index: if m % 2 == 0 { Some(m as u32) } else { None },
                terrain: if m % 3 == 0 { None } else { Some(format!("t{}", m % 3)) },
            });
        }
        for v in 0..n_voxels {
            let mut def = VoxelDef::cube(format!("v{v}"), format!("m{}", v % n_mats));
            if explicit[v] {
                def.id = Some(100 + v as u32);
            }
            b = b.voxel(def);
        }
        let t = b.build().unwrap();

        let mut seen = HashSet::new();
        for v in 0..n_voxels {
            let id = t.voxel_id(&format!("v{v}")).unwrap();
            prop_assert!(id != 0);
            prop_assert!(seen.insert(id));
            if explicit[v] {
                prop_assert_eq!(id as usize, 100 + v);
            }
            let want = t.material_id(&format!("m{}", v % n_mats)).unwrap();
            for dir in 0..6 {
                prop_assert_eq!(t.face_material(id, dir), want);
            }
            prop_assert!(t.is_solid(id) && t.is_opaque(id));
        }
        prop_assert!(t.terrain_count() <= 3);
    }
}
