//! Register-file geometry and dependency-bucket mapping.
//!
//! The hazard search partitions the tracked register space into fixed-size
//! buckets, one per physical register row:
//! 1. **GRF:** one bucket per general register (`r0..r127`).
//! 2. **ARF:** one bucket per accumulator, flag, and address register.
//! 3. **Sentinel:** one reserved bucket that only always-interfere footprints
//!    join, so unknown accesses conflict with everything without ordinary
//!    accesses paying for it.
//!
//! Footprint bits are one bit per byte per bucket row.

/// Number of general registers in the file.
pub const GRF_COUNT: usize = 128;

/// Bytes per register row (and bits per bucket).
pub const REG_BYTES: usize = 32;

/// Number of accumulator registers tracked for dependencies.
pub const ACC_COUNT: usize = 4;

/// Number of flag registers tracked for dependencies.
pub const FLAG_COUNT: usize = 2;

/// Bytes of one flag register that carry predication state.
pub const FLAG_BYTES: usize = 4;

/// First accumulator bucket.
pub const ACC_BASE: usize = GRF_COUNT;

/// First flag bucket.
pub const FLAG_BASE: usize = ACC_BASE + ACC_COUNT;

/// Address register bucket.
pub const ADDR_BUCKET: usize = FLAG_BASE + FLAG_COUNT;

/// Reserved always-interfere bucket; ordinary footprints never join it.
pub const ALL_BUCKET: usize = ADDR_BUCKET + 1;

/// Total bucket count, sentinel included.
pub const TOTAL_BUCKETS: usize = ALL_BUCKET + 1;

/// Total footprint bits across all buckets.
pub const TOTAL_BITS: usize = TOTAL_BUCKETS * REG_BYTES;

/// First footprint bit of the accumulator range.
pub const SPECIAL_RANGE_START: usize = ACC_BASE * REG_BYTES;

/// One past the last footprint bit of the flag range.
///
/// A same-pipe read-after-write confined to `[SPECIAL_RANGE_START,
/// SPECIAL_RANGE_END)` is forwarded inside the pipe and needs no explicit
/// synchronization.
pub const SPECIAL_RANGE_END: usize = (FLAG_BASE + FLAG_COUNT) * REG_BYTES;

/// Footprint bit offset of the first byte of a bucket.
pub fn bucket_base(bucket: usize) -> usize {
    bucket * REG_BYTES
}
