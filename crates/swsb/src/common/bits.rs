//! Fixed-capacity bit set used for register footprints.
//!
//! Every dependency set carries one of these, sized to cover every byte of
//! every tracked register file (see [`crate::common::regs`]). The hot
//! operations are range fills, whole-set intersection tests, and per-bucket
//! row queries, so the implementation is a plain `u64` word array with no
//! growth path.

/// Bits per storage word.
const WORD_BITS: usize = 64;

/// A fixed-capacity set of bits addressed `0..capacity`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BitSet {
    words: Vec<u64>,
    capacity: usize,
}

impl BitSet {
    /// Creates an empty set able to hold `capacity` bits.
    pub fn new(capacity: usize) -> Self {
        Self {
            words: vec![0; capacity.div_ceil(WORD_BITS)],
            capacity,
        }
    }

    /// Total number of addressable bits.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Sets a single bit. Out-of-range indices are ignored.
    pub fn set(&mut self, bit: usize) {
        if bit < self.capacity {
            self.words[bit / WORD_BITS] |= 1 << (bit % WORD_BITS);
        }
    }

    /// Tests a single bit. Out-of-range indices read as clear.
    pub fn get(&self, bit: usize) -> bool {
        bit < self.capacity && self.words[bit / WORD_BITS] & (1 << (bit % WORD_BITS)) != 0
    }

    /// Sets `len` consecutive bits starting at `start`, clamped to capacity.
    pub fn set_range(&mut self, start: usize, len: usize) {
        let end = (start + len).min(self.capacity);
        let mut bit = start.min(self.capacity);
        // Head partial word.
        while bit < end && bit % WORD_BITS != 0 {
            self.words[bit / WORD_BITS] |= 1 << (bit % WORD_BITS);
            bit += 1;
        }
        // Full words.
        while bit + WORD_BITS <= end {
            self.words[bit / WORD_BITS] = u64::MAX;
            bit += WORD_BITS;
        }
        // Tail partial word.
        while bit < end {
            self.words[bit / WORD_BITS] |= 1 << (bit % WORD_BITS);
            bit += 1;
        }
    }

    /// Sets every bit.
    pub fn set_all(&mut self) {
        self.set_range(0, self.capacity);
    }

    /// Clears every bit.
    pub fn clear_all(&mut self) {
        for w in &mut self.words {
            *w = 0;
        }
    }

    /// Returns `true` if no bit is set.
    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }

    /// Returns `true` if `self` and `other` share any set bit.
    pub fn intersects(&self, other: &Self) -> bool {
        self.words
            .iter()
            .zip(other.words.iter())
            .any(|(a, b)| a & b != 0)
    }

    /// Returns `true` if any bit in `[start, start + len)` is set.
    pub fn any_in_range(&self, start: usize, len: usize) -> bool {
        let end = (start + len).min(self.capacity);
        let mut bit = start.min(self.capacity);
        while bit < end {
            let word = bit / WORD_BITS;
            let lo = bit % WORD_BITS;
            let hi = (end - word * WORD_BITS).min(WORD_BITS);
            let mask = Self::range_mask(lo, hi);
            if self.words[word] & mask != 0 {
                return true;
            }
            bit = (word + 1) * WORD_BITS;
        }
        false
    }

    /// Returns `true` if every bit common to `self` and `other` lies inside
    /// `[start, end)`. Vacuously true when the sets do not intersect.
    pub fn intersection_within(&self, other: &Self, start: usize, end: usize) -> bool {
        for (i, (a, b)) in self.words.iter().zip(other.words.iter()).enumerate() {
            let common = a & b;
            if common == 0 {
                continue;
            }
            let word_lo = i * WORD_BITS;
            let word_hi = word_lo + WORD_BITS;
            let keep_lo = start.clamp(word_lo, word_hi) - word_lo;
            let keep_hi = end.clamp(word_lo, word_hi) - word_lo;
            let inside = Self::range_mask(keep_lo, keep_hi);
            if common & !inside != 0 {
                return false;
            }
        }
        true
    }

    /// Mask with bits `[lo, hi)` of a word set.
    fn range_mask(lo: usize, hi: usize) -> u64 {
        if lo >= hi {
            return 0;
        }
        let span = hi - lo;
        if span >= WORD_BITS {
            u64::MAX
        } else {
            ((1u64 << span) - 1) << lo
        }
    }
}
