//! Bucket table: the register-file-partitioned hazard index.
//!
//! Each bucket holds the dependency sets currently asserting a hazard over
//! one register row. Overlap queries scan only the buckets the probe itself
//! touches — never the whole table — and clearing removes a set from every
//! bucket it joined, idempotently.

use smallvec::SmallVec;

use super::depset::{DepSetArena, DepSetId};
use crate::common::error::PassError;
use crate::common::regs::TOTAL_BUCKETS;

/// Live dependency sets indexed by register bucket.
#[derive(Debug)]
pub struct BucketTable {
    buckets: Vec<SmallVec<[DepSetId; 4]>>,
}

impl Default for BucketTable {
    fn default() -> Self {
        Self::new()
    }
}

impl BucketTable {
    /// Creates an empty table covering every tracked bucket.
    pub fn new() -> Self {
        Self {
            buckets: vec![SmallVec::new(); TOTAL_BUCKETS],
        }
    }

    /// Registers a set in every bucket its footprint touches. A set with an
    /// empty footprint (e.g. the write side of a store-less instruction)
    /// joins nothing.
    pub fn add(&mut self, arena: &DepSetArena, id: DepSetId) {
        let set = arena.get(id);
        for &bucket in &set.buckets {
            let entries = &mut self.buckets[usize::from(bucket)];
            if !entries.contains(&id) {
                entries.push(id);
            }
        }
    }

    /// Finds every registered set whose footprint intersects the probe's,
    /// scanning only the probe's own buckets. Candidates are deduplicated
    /// (a pair may share several buckets). The probe itself and its
    /// companion are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`PassError::StaleBucketEntry`] if a bucket still references
    /// a set whose footprint was already cleared.
    pub fn find_overlapping(
        &self,
        arena: &DepSetArena,
        probe: DepSetId,
    ) -> Result<SmallVec<[DepSetId; 8]>, PassError> {
        let probe_set = arena.get(probe);
        let mut found: SmallVec<[DepSetId; 8]> = SmallVec::new();
        for &bucket in &probe_set.buckets {
            for &other in &self.buckets[usize::from(bucket)] {
                if other == probe || Some(other) == probe_set.companion {
                    continue;
                }
                let other_set = arena.get(other);
                if !other_set.is_live() {
                    return Err(PassError::StaleBucketEntry {
                        inst: probe_set.inst,
                        bucket: usize::from(bucket),
                    });
                }
                if found.contains(&other) {
                    continue;
                }
                if probe_set.bits.intersects(&other_set.bits) {
                    found.push(other);
                }
            }
        }
        Ok(found)
    }

    /// Removes a set from every bucket it joined and empties its footprint.
    /// Clearing an already-cleared set is a no-op. Two-phase: the membership
    /// list is detached first, then each bucket is swept, so a re-entrant
    /// observer never sees a half-cleared set in a bucket it left.
    pub fn clear(&mut self, arena: &mut DepSetArena, id: DepSetId) {
        let buckets = std::mem::take(&mut arena.get_mut(id).buckets);
        for bucket in buckets {
            self.buckets[usize::from(bucket)].retain(|&mut e| e != id);
        }
        arena.get_mut(id).bits.clear_all();
    }

    /// Drops every entry from every bucket without touching arena footprints.
    /// Used when a full pipeline drain makes all tracked hazards moot.
    pub fn reset(&mut self) {
        for bucket in &mut self.buckets {
            bucket.clear();
        }
    }

    /// Returns `true` if no bucket holds any entry.
    pub fn is_clear(&self) -> bool {
        self.buckets.iter().all(SmallVec::is_empty)
    }

    /// Number of entries in one bucket; diagnostics and tests.
    pub fn bucket_len(&self, bucket: usize) -> usize {
        self.buckets[bucket].len()
    }

    /// Whether `id` is still reachable from any bucket. Cleared sets must
    /// never be.
    pub fn contains(&self, id: DepSetId) -> bool {
        self.buckets.iter().any(|b| b.contains(&id))
    }
}
