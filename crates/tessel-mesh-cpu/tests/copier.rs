mod common;

use common::*;
use tessel_chunk::{Chunk, ChunkCoord, ChunkMap, NEIGHBOR_OFFSETS, NeighborKind, Neighborhood};
use tessel_mesh_cpu::{
    ChunkDescriptor, ChunkMesher, MeshConfig, MeshError, NeighborCopier, RequestToken, VoxelField,
};

/// Every chunk of a 3x3x3 block filled with a coordinate-dependent pattern.
fn patterned_map(s: usize) -> ChunkMap {
    let mut map = ChunkMap::new();
    for &(dx, dy, dz) in NEIGHBOR_OFFSETS.iter() {
        let coord = ChunkCoord::new(dx, dy, dz);
        let mut c = Chunk::new(coord, s);
        for x in 0..s {
            for y in 0..s {
                for z in 0..s {
                    let h = (x * 7 + y * 3 + z + (dx + 1) as usize * 5 + (dy + 2) as usize) % 7;
                    c.set(x, y, z, h as u16);
                }
            }
        }
        map.insert(c);
    }
    map
}

#[test]
fn slot_sizes_follow_neighbor_kind() {
    let s = 5;
    let map = patterned_map(s);
    let hood = map.neighborhood(ChunkCoord::default()).unwrap();
    let copier = NeighborCopier::for_snapshots(1);
    let snap = copier.copy(&hood).unwrap();
    assert_eq!(snap.buffer_count(), 27);
    for &(dx, dy, dz) in NEIGHBOR_OFFSETS.iter() {
        let want = s.pow(NeighborKind::of(dx, dy, dz).shared_axes());
        assert_eq!(snap.slot(dx, dy, dz).unwrap().len(), want, "slot {dx},{dy},{dz}");
    }
    let total: usize = snap.buffers().map(|b| b.len()).sum();
    assert_eq!(total, (s + 2).pow(3));
}

#[test]
fn snapshot_reads_match_live_reads() {
    let s = 4;
    let map = patterned_map(s);
    let hood = map.neighborhood(ChunkCoord::default()).unwrap();
    let snap = NeighborCopier::for_snapshots(1).copy(&hood).unwrap();
    let s = s as i32;
    for x in -1..=s {
        for y in -1..=s {
            for z in -1..=s {
                assert_eq!(snap.voxel(x, y, z), hood.voxel(x, y, z), "({x},{y},{z})");
            }
        }
    }
}

#[test]
fn absent_neighbors_copy_nothing() {
    let center = Chunk::new(ChunkCoord::default(), 4);
    let mut east = Chunk::new(ChunkCoord::new(1, 0, 0), 4);
    east.set(0, 3, 2, STONE);
    let hood = Neighborhood::new(&center).with(1, 0, 0, &east);
    let snap = NeighborCopier::for_snapshots(1).copy(&hood).unwrap();
    assert_eq!(snap.buffer_count(), 2);
    assert_eq!(snap.voxel(4, 3, 2), Some(STONE));
    assert_eq!(snap.voxel(-1, 0, 0), None);
    assert!(snap.has_neighbor(1, 0, 0));
    assert!(!snap.has_neighbor(0, 1, 0));
}

#[test]
fn exhausted_pool_fails_and_recovers() {
    let center = Chunk::new(ChunkCoord::default(), 4);
    let west = Chunk::new(ChunkCoord::new(-1, 0, 0), 4);
    let up = Chunk::new(ChunkCoord::new(0, 1, 0), 4);
    let copier = NeighborCopier::new(2);

    let first = copier.copy(&Neighborhood::new(&center).with(-1, 0, 0, &west)).unwrap();
    assert_eq!(copier.pool().in_use(), 2);
    let err = copier.copy(&Neighborhood::new(&center)).unwrap_err();
    assert!(matches!(err, MeshError::PoolExhausted { max: 2, .. }));

    drop(first);
    assert_eq!(copier.pool().in_use(), 0);

    // A copy that runs out halfway hands back what it took.
    let hood = Neighborhood::new(&center)
        .with(-1, 0, 0, &west)
        .with(0, 1, 0, &up);
    assert!(copier.copy(&hood).is_err());
    assert_eq!(copier.pool().in_use(), 0);
    assert!(copier.copy(&Neighborhood::new(&center)).is_ok());
}

#[test]
fn reused_buffers_drop_center_capacity() {
    let s = 8;
    let center = Chunk::new(ChunkCoord::default(), s);
    let east = Chunk::new(ChunkCoord::new(1, 0, 0), s);
    let west = Chunk::new(ChunkCoord::new(-1, 0, 0), s);
    let copier = NeighborCopier::new(2);

    let snap = copier.copy(&Neighborhood::new(&center).with(1, 0, 0, &east)).unwrap();
    assert!(snap.retained_capacity() >= s.pow(3) + s * s);
    drop(snap);

    // The west slot is copied before the center, so it takes whichever
    // buffer comes back first, possibly the old center one.
    let snap = copier.copy(&Neighborhood::new(&center).with(-1, 0, 0, &west)).unwrap();
    assert_eq!(copier.pool().in_use(), 2);
    assert!(snap.retained_capacity() <= s.pow(3) + s * s);
    assert_eq!(snap.slot(-1, 0, 0).unwrap().len(), s * s);
}

#[test]
fn mismatched_neighbor_size_is_rejected() {
    let center = Chunk::new(ChunkCoord::default(), 4);
    let odd = Chunk::new(ChunkCoord::new(0, 0, 1), 8);
    let hood = Neighborhood::new(&center).with(0, 0, 1, &odd);
    let copier = NeighborCopier::new(27);
    match copier.copy(&hood) {
        Err(MeshError::SizeMismatch {
            offset,
            expected,
            found,
        }) => {
            assert_eq!(offset, (0, 0, 1));
            assert_eq!((expected, found), (4, 8));
        }
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(copier.pool().in_use(), 0);

    let mut mesher = ChunkMesher::new(tables(), MeshConfig::default()).unwrap();
    let desc = ChunkDescriptor::unhinted(4, RequestToken(0));
    assert!(matches!(
        mesher.mesh_live(&hood, &desc),
        Err(MeshError::SizeMismatch { .. })
    ));
}

#[test]
fn snapshot_meshing_equals_live_meshing() {
    let s = 6;
    let map = patterned_map(s);
    let t = tables();
    let hood = map.neighborhood(ChunkCoord::default()).unwrap();
    let desc = ChunkDescriptor::from_chunk(hood.center(), &t, RequestToken(42));
    let mut mesher = ChunkMesher::new(t, MeshConfig::default()).unwrap();

    let live = mesher.mesh_live(&hood, &desc).unwrap();
    let snap = mesher.snapshot(&hood).unwrap();
    let copied = mesher.mesh_snapshot(&snap, &desc).unwrap();
    assert!(!live.is_empty());
    assert_eq!(live, copied);

    // Byte-identical on repeat, with pooled buffers reused in between.
    let again = mesher.mesh_snapshot(&snap, &desc).unwrap();
    let bits = |g: &[tessel_mesh_cpu::TerrainGeometry]| -> Vec<u32> {
        g.iter()
            .flat_map(|t| t.positions.iter().chain(&t.colors).chain(&t.uvs))
            .map(|f| f.to_bits())
            .collect()
    };
    assert_eq!(bits(&copied), bits(&again));
    assert!(again.iter().all(|g| g.request == RequestToken(42)));
}

#[test]
fn snapshot_moves_to_another_thread() {
    let s = 4;
    let map = patterned_map(s);
    let t = tables();
    let hood = map.neighborhood(ChunkCoord::default()).unwrap();
    let desc = ChunkDescriptor::from_chunk(hood.center(), &t, RequestToken(7));
    let mut local = ChunkMesher::new(t.clone(), MeshConfig::default()).unwrap();
    let expected = local.mesh_live(&hood, &desc).unwrap();

    let snap = local.snapshot(&hood).unwrap();
    let pool = local.copier().pool().clone();
    let handle = std::thread::spawn(move || {
        let mut mesher = ChunkMesher::new(t, MeshConfig::default()).unwrap();
        mesher.mesh_snapshot(&snap, &desc).unwrap()
    });
    let got = handle.join().unwrap();
    assert_eq!(got, expected);
    assert_eq!(pool.in_use(), 0);
}
