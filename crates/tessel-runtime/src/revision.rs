use hashbrown::HashMap;
use tessel_chunk::ChunkCoord;

use crate::JobOut;

/// Latest requested revision per chunk. Results carrying an older revision,
/// or for a chunk that has since been unloaded, are dropped on arrival.
///
/// Revisions come from one counter shared by all chunks, so a chunk that is
/// unloaded and loaded again never reuses a revision still in flight.
#[derive(Debug, Default)]
pub struct RevisionTracker {
    revs: HashMap<ChunkCoord, u64>,
    next: u64,
}

impl RevisionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new revision for `coord` and returns it.
    pub fn bump(&mut self, coord: ChunkCoord) -> u64 {
        self.next += 1;
        self.revs.insert(coord, self.next);
        self.next
    }

    pub fn current(&self, coord: ChunkCoord) -> Option<u64> {
        self.revs.get(&coord).copied()
    }

    /// Forgets `coord`; everything still in flight for it becomes stale.
    pub fn invalidate(&mut self, coord: ChunkCoord) -> Option<u64> {
        self.revs.remove(&coord)
    }

    pub fn is_current(&self, coord: ChunkCoord, rev: u64) -> bool {
        self.current(coord) == Some(rev)
    }

    pub fn accept(&self, out: &JobOut) -> bool {
        let ok = self.is_current(out.coord, out.rev);
        if !ok {
            log::debug!(
                target: "runtime",
                "discarding stale result for {:?} rev={} (current {:?})",
                out.coord,
                out.rev,
                self.current(out.coord)
            );
        }
        ok
    }

    pub fn len(&self) -> usize {
        self.revs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.revs.is_empty()
    }
}
