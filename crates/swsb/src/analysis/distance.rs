//! Decaying window of recent in-order producers.
//!
//! An in-order pipe retires instructions in issue order with a bounded
//! latency, so a dependency on a producer more than `latency_window`
//! in-order issues old is already resolved by the pipeline itself. This
//! tracker holds the dependency-set pair of each recent in-order instruction
//! and expires stale entries by clearing them out of the bucket table.

use std::collections::VecDeque;

use super::buckets::BucketTable;
use super::depset::{DepSetArena, DepSetId};

/// One tracked in-order instruction.
#[derive(Debug, Clone, Copy)]
struct Tracked {
    read: DepSetId,
    write: DepSetId,
    /// Pipe-local counter value at issue.
    seq: u64,
}

/// Sliding window over the in-order pipe, oldest entry at the front.
#[derive(Debug)]
pub struct DistanceTracker {
    window: VecDeque<Tracked>,
    latency_window: u64,
}

impl DistanceTracker {
    /// Creates a tracker with the pipe's latency window.
    pub fn new(latency_window: u64) -> Self {
        Self {
            window: VecDeque::new(),
            latency_window,
        }
    }

    /// Records a just-issued in-order instruction's dependency sets.
    pub fn record(&mut self, read: DepSetId, write: DepSetId, seq: u64) {
        self.window.push_back(Tracked { read, write, seq });
    }

    /// Expires entries older than the latency window, clearing their sets
    /// from the buckets. `current_seq` is the pipe-local counter after the
    /// latest issue.
    pub fn retire(
        &mut self,
        current_seq: u64,
        buckets: &mut BucketTable,
        arena: &mut DepSetArena,
    ) {
        while let Some(front) = self.window.front() {
            if current_seq - front.seq < self.latency_window {
                break;
            }
            let Tracked { read, write, .. } = *front;
            let _ = self.window.pop_front();
            buckets.clear(arena, read);
            buckets.clear(arena, write);
        }
    }

    /// Returns `true` if no producer is inside the window.
    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }

    /// Forgets every entry without touching the buckets. Used on block
    /// flush, where the whole bucket table is dropped wholesale.
    pub fn reset(&mut self) {
        self.window.clear();
    }
}
