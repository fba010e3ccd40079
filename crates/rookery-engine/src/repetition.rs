//! Repetition counting.
//!
//! A fixed-size table of counters indexed by the low bits of the position
//! hash. Every applied move increments the counter for the position it
//! reaches and every rollback decrements it again, so the table always holds
//! the visit counts of the positions on the current line. Distinct positions
//! whose hashes share the low bits share a counter.

/// Fixed-size, hash-indexed repetition counters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepetitionTable {
    counts: Box<[u16]>,
    mask: u64,
}

impl RepetitionTable {
    /// Default table size exponent (16384 counters).
    pub const DEFAULT_BITS: u8 = 14;

    /// Creates a table of `2^bits` counters.
    pub fn new(bits: u8) -> Self {
        let size = 1usize << bits;
        RepetitionTable {
            counts: vec![0u16; size].into_boxed_slice(),
            mask: (size as u64) - 1,
        }
    }

    /// Counter index for a position hash.
    #[inline]
    pub fn index(&self, position_hash: u64) -> usize {
        (position_hash & self.mask) as usize
    }

    #[inline]
    pub fn increment(&mut self, position_hash: u64) {
        let i = self.index(position_hash);
        self.counts[i] = self.counts[i].wrapping_add(1);
    }

    #[inline]
    pub fn decrement(&mut self, position_hash: u64) {
        let i = self.index(position_hash);
        self.counts[i] = self.counts[i].wrapping_sub(1);
    }

    #[inline]
    pub fn count(&self, position_hash: u64) -> u16 {
        self.counts[self.index(position_hash)]
    }

    pub fn clear(&mut self) {
        self.counts.fill(0);
    }

    /// Number of counters.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

impl Default for RepetitionTable {
    fn default() -> Self {
        Self::new(Self::DEFAULT_BITS)
    }
}
