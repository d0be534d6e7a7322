//! Scoreboard id pool.
//!
//! A small fixed pool of hardware tokens. Ids come from a free list; when the
//! list runs dry the pool force-evicts an existing owner round-robin. The
//! eviction contract is the safety-critical part: the caller must clear the
//! evicted owner's dependency sets from every bucket before the id is reused,
//! otherwise a later consumer would wait on the wrong producer.

use std::collections::VecDeque;

use super::depset::DepSetId;
use crate::ir::SbId;

/// Fixed pool of scoreboard ids with forced round-robin reuse.
#[derive(Debug)]
pub struct SbidPool {
    free: VecDeque<SbId>,
    /// Per-id owner: the dependency-set pair of the out-of-order instruction
    /// currently holding the id.
    assigned: Vec<Option<(DepSetId, DepSetId)>>,
    /// Round-robin eviction cursor.
    cursor: usize,
}

impl SbidPool {
    /// Creates a pool of `count` ids, all free.
    pub fn new(count: usize) -> Self {
        Self {
            free: (0..count).map(|i| SbId(i as u8)).collect(),
            assigned: vec![None; count],
            cursor: 0,
        }
    }

    /// Pool size.
    pub fn len(&self) -> usize {
        self.assigned.len()
    }

    /// Returns `true` for a zero-sized pool.
    pub fn is_empty(&self) -> bool {
        self.assigned.is_empty()
    }

    /// Takes a free id, if any. The id stays unowned until [`Self::assign`].
    pub fn try_alloc(&mut self) -> Option<SbId> {
        self.free.pop_front()
    }

    /// Force-evicts the next owner round-robin, returning the reclaimed id
    /// and the owner's dependency-set pair. The caller must clear that pair
    /// from all buckets before reusing the id. Returns `None` if nothing is
    /// owned (only possible through misuse: allocate via [`Self::try_alloc`]
    /// first).
    pub fn evict(&mut self) -> Option<(SbId, (DepSetId, DepSetId))> {
        let n = self.assigned.len();
        for step in 0..n {
            let slot = (self.cursor + step) % n;
            if let Some(owner) = self.assigned[slot].take() {
                self.cursor = (slot + 1) % n;
                return Some((SbId(slot as u8), owner));
            }
        }
        None
    }

    /// Records the dependency-set pair now owning `id`.
    pub fn assign(&mut self, id: SbId, read: DepSetId, write: DepSetId) {
        self.assigned[usize::from(id.0)] = Some((read, write));
    }

    /// The dependency-set pair owning `id`, if any.
    pub fn owner(&self, id: SbId) -> Option<(DepSetId, DepSetId)> {
        self.assigned.get(usize::from(id.0)).copied().flatten()
    }

    /// Returns a fully-resolved id to the free list. Idempotent: releasing an
    /// unowned id is a no-op.
    pub fn release(&mut self, id: SbId) {
        if self.assigned[usize::from(id.0)].take().is_some() {
            self.free.push_back(id);
        }
    }

    /// Returns `true` while any id has an owner.
    pub fn has_outstanding(&self) -> bool {
        self.assigned.iter().any(Option::is_some)
    }

    /// Number of currently owned ids.
    pub fn outstanding(&self) -> usize {
        self.assigned.iter().filter(|o| o.is_some()).count()
    }

    /// Resets every id to free. Block flush only: the hardware drain makes
    /// all owners moot.
    pub fn reset(&mut self) {
        let n = self.assigned.len();
        self.free = (0..n).map(|i| SbId(i as u8)).collect();
        for slot in &mut self.assigned {
            *slot = None;
        }
        self.cursor = 0;
    }
}
