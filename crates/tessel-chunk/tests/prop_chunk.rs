use proptest::prelude::*;
use tessel_chunk::{
    Chunk, ChunkCoord, ChunkMap, NEIGHBOR_OFFSETS, NeighborKind, Neighborhood, slot_index,
};

#[test]
fn offsets_cover_every_neighbor_once() {
    let mut counts = [0usize; 4];
    for (i, &(dx, dy, dz)) in NEIGHBOR_OFFSETS.iter().enumerate() {
        assert_eq!(slot_index(dx, dy, dz), i);
        let k = match NeighborKind::of(dx, dy, dz) {
            NeighborKind::Center => 0,
            NeighborKind::Face => 1,
            NeighborKind::Edge => 2,
            NeighborKind::Corner => 3,
        };
        counts[k] += 1;
    }
    assert_eq!(counts, [1, 6, 12, 8]);
    assert_eq!(NEIGHBOR_OFFSETS[13], (0, 0, 0));
}

#[test]
fn neighborhood_from_map_links_loaded_chunks() {
    let mut map = ChunkMap::new();
    let origin = ChunkCoord::new(0, 0, 0);
    map.insert(Chunk::new(origin, 4));
    map.insert(Chunk::new(origin.offset(-1, 0, 0), 4));
    map.insert(Chunk::new(origin.offset(1, 1, 1), 4));
    map.insert(Chunk::new(origin.offset(3, 0, 0), 4));

    let hood = map.neighborhood(origin).unwrap();
    assert_eq!(hood.present(), 2);
    assert_eq!(hood.get(-1, 0, 0).unwrap().coord, origin.offset(-1, 0, 0));
    assert_eq!(hood.get(1, 1, 1).unwrap().coord, origin.offset(1, 1, 1));
    assert!(hood.get(0, -1, 0).is_none());
    assert_eq!(hood.get(0, 0, 0).unwrap().coord, origin);
    assert!(map.neighborhood(origin.offset(5, 5, 5)).is_none());
}

#[test]
fn center_slot_cannot_be_replaced() {
    let a = Chunk::new(ChunkCoord::new(0, 0, 0), 2);
    let b = Chunk::new(ChunkCoord::new(9, 9, 9), 2);
    let mut hood = Neighborhood::new(&a);
    hood.set(0, 0, 0, Some(&b));
    assert_eq!(hood.get(0, 0, 0).unwrap().coord, a.coord);
    assert_eq!(hood.present(), 0);
}

#[test]
fn from_voxels_pads_short_buffers() {
    let c = Chunk::from_voxels(ChunkCoord::default(), 3, vec![7; 5]);
    assert_eq!(c.voxels().len(), 27);
    assert_eq!(c.get(0, 1, 1), 7);
    assert_eq!(c.get(0, 1, 2), 0);
    assert_eq!(c.get(2, 2, 2), 0);
}

proptest! {
    // x-major layout: z is the fastest-moving axis and every cell has a distinct slot.
    #[test]
    fn index_is_x_major_bijection(s in 1usize..12, x in 0usize..12, y in 0usize..12, z in 0usize..12) {
        let (x, y, z) = (x % s, y % s, z % s);
        let c = Chunk::new(ChunkCoord::default(), s);
        let i = c.idx(x, y, z);
        prop_assert!(i < s * s * s);
        prop_assert_eq!(i % s, z);
        prop_assert_eq!((i / s) % s, y);
        prop_assert_eq!(i / (s * s), x);
    }

    #[test]
    fn set_then_get(s in 1usize..10, x in 0usize..10, y in 0usize..10, z in 0usize..10, id in 1u16..500) {
        let (x, y, z) = (x % s, y % s, z % s);
        let mut c = Chunk::new(ChunkCoord::default(), s);
        c.set(x, y, z, id);
        prop_assert_eq!(c.get(x, y, z), id);
        prop_assert_eq!(c.voxels().iter().filter(|&&v| v != 0).count(), 1);
        prop_assert!(!c.is_all_air());
    }
}
