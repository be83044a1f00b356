//! Random Source Port
//!
//! Loot rolls, quest targets and smuggler picks draw from this so tests
//! can seed them.

/// Source of uniform random draws
pub trait RandomSource: Send + Sync {
    /// Uniform integer in `[low, high]`
    fn range_inclusive(&self, low: i64, high: i64) -> i64;

    /// True with probability `p` (clamped to `[0, 1]`)
    fn chance(&self, p: f64) -> bool;

    /// Uniform index in `[0, len)`. `len` must be non-zero.
    fn pick_index(&self, len: usize) -> usize {
        self.range_inclusive(0, len as i64 - 1) as usize
    }

    /// Two distinct indices in `[0, len)`, or `None` if `len < 2`
    fn pick_two_distinct(&self, len: usize) -> Option<(usize, usize)> {
        if len < 2 {
            return None;
        }
        let first = self.pick_index(len);
        // Draw from the remaining len-1 slots and skip over `first`
        let mut second = self.pick_index(len - 1);
        if second >= first {
            second += 1;
        }
        Some((first, second))
    }
}
