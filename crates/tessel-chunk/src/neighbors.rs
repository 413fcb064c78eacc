use crate::Chunk;

/// Slot of offset `(dx,dy,dz)`, each in -1..=1, within a 3x3x3 neighborhood.
#[inline]
pub const fn slot_index(dx: i32, dy: i32, dz: i32) -> usize {
    ((dx + 1) * 9 + (dy + 1) * 3 + (dz + 1)) as usize
}

const fn build_offsets() -> [(i32, i32, i32); 27] {
    let mut out = [(0, 0, 0); 27];
    let mut i = 0;
    while i < 27 {
        out[i] = ((i / 9) as i32 - 1, ((i / 3) % 3) as i32 - 1, (i % 3) as i32 - 1);
        i += 1;
    }
    out
}

/// Offsets in slot order; entry 13 is the center.
pub const NEIGHBOR_OFFSETS: [(i32, i32, i32); 27] = build_offsets();

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum NeighborKind {
    Center,
    Face,
    Edge,
    Corner,
}

impl NeighborKind {
    pub fn of(dx: i32, dy: i32, dz: i32) -> NeighborKind {
        let nonzero = [dx, dy, dz].iter().filter(|&&d| d != 0).count();
        match nonzero {
            0 => NeighborKind::Center,
            1 => NeighborKind::Face,
            2 => NeighborKind::Edge,
            _ => NeighborKind::Corner,
        }
    }

    /// Number of axes the neighbor spans fully, i.e. the dimensionality of the
    /// slice it shares with the center.
    #[inline]
    pub fn shared_axes(self) -> u32 {
        match self {
            NeighborKind::Center => 3,
            NeighborKind::Face => 2,
            NeighborKind::Edge => 1,
            NeighborKind::Corner => 0,
        }
    }
}

/// Borrowed view of a chunk and whichever of its 26 neighbors are loaded.
#[derive(Copy, Clone, Debug)]
pub struct Neighborhood<'a> {
    center: &'a Chunk,
    slots: [Option<&'a Chunk>; 27],
}

impl<'a> Neighborhood<'a> {
    pub fn new(center: &'a Chunk) -> Self {
        let mut slots = [None; 27];
        slots[slot_index(0, 0, 0)] = Some(center);
        Self { center, slots }
    }

    #[inline]
    pub fn center(&self) -> &'a Chunk {
        self.center
    }

    #[inline]
    pub fn get(&self, dx: i32, dy: i32, dz: i32) -> Option<&'a Chunk> {
        self.slots[slot_index(dx, dy, dz)]
    }

    /// Sets a neighbor slot. The center slot is fixed and ignores updates.
    pub fn set(&mut self, dx: i32, dy: i32, dz: i32, chunk: Option<&'a Chunk>) {
        if (dx, dy, dz) == (0, 0, 0) {
            return;
        }
        self.slots[slot_index(dx, dy, dz)] = chunk;
    }

    pub fn with(mut self, dx: i32, dy: i32, dz: i32, chunk: &'a Chunk) -> Self {
        self.set(dx, dy, dz, Some(chunk));
        self
    }

    #[inline]
    pub fn slots(&self) -> &[Option<&'a Chunk>; 27] {
        &self.slots
    }

    /// Loaded neighbors, excluding the center.
    pub fn present(&self) -> usize {
        self.slots.iter().flatten().count() - 1
    }
}
