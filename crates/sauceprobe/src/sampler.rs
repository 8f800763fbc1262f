//! Seeded index sampling for product selection.
//!
//! Selection must be random across runs but reproducible when a failure needs
//! replaying, so every actor carries a seeded sampler and logs its seed.

use std::time::{SystemTime, UNIX_EPOCH};

/// Deterministic seed for reproducible selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Seed(u64);

impl Seed {
    /// Create a seed from a u64 value
    #[must_use]
    pub const fn from_u64(value: u64) -> Self {
        Self(value)
    }

    /// Seed derived from the wall clock
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn from_clock() -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| d.as_nanos());
        Self(nanos as u64 ^ (nanos >> 64) as u64)
    }

    /// Get the raw seed value
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

/// xorshift64 PRNG
#[derive(Debug, Clone)]
struct Xorshift64 {
    state: u64,
}

impl Xorshift64 {
    const fn new(seed: Seed) -> Self {
        // Ensure non-zero state
        let state = if seed.0 == 0 { 1 } else { seed.0 };
        Self { state }
    }

    fn next(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    #[allow(clippy::cast_possible_truncation)]
    fn below(&mut self, bound: usize) -> usize {
        if bound == 0 {
            return 0;
        }
        (self.next() % bound as u64) as usize
    }
}

/// Picks distinct indexes without replacement
#[derive(Debug, Clone)]
pub struct IndexSampler {
    seed: Seed,
    rng: Xorshift64,
}

impl IndexSampler {
    /// Create a sampler with the given seed
    #[must_use]
    pub const fn new(seed: Seed) -> Self {
        Self {
            seed,
            rng: Xorshift64::new(seed),
        }
    }

    /// Seed this sampler was created with
    #[must_use]
    pub const fn seed(&self) -> Seed {
        self.seed
    }

    /// `min(k, n)` distinct indexes from `0..n`, in draw order
    pub fn sample_distinct(&mut self, k: usize, n: usize) -> Vec<usize> {
        let k = k.min(n);
        let mut pool: Vec<usize> = (0..n).collect();
        // Partial Fisher-Yates: the first k slots end up holding the draw
        for i in 0..k {
            let j = i + self.rng.below(n - i);
            pool.swap(i, j);
        }
        pool.truncate(k);
        pool
    }
}

impl Default for IndexSampler {
    fn default() -> Self {
        Self::new(Seed::from_clock())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_same_seed_same_draw() {
        let mut a = IndexSampler::new(Seed::from_u64(42));
        let mut b = IndexSampler::new(Seed::from_u64(42));
        assert_eq!(a.sample_distinct(4, 6), b.sample_distinct(4, 6));
    }

    #[test]
    fn test_zero_seed_is_usable() {
        let mut s = IndexSampler::new(Seed::from_u64(0));
        assert_eq!(s.sample_distinct(3, 3).len(), 3);
    }

    #[test]
    fn test_empty_population() {
        let mut s = IndexSampler::new(Seed::from_u64(1));
        assert!(s.sample_distinct(4, 0).is_empty());
    }

    #[test]
    fn test_seed_is_retained() {
        let s = IndexSampler::new(Seed::from_u64(1234));
        assert_eq!(s.seed().value(), 1234);
    }

    proptest! {
        #[test]
        fn prop_sample_is_distinct_and_in_range(seed in any::<u64>(), k in 0usize..10, n in 0usize..10) {
            let mut s = IndexSampler::new(Seed::from_u64(seed));
            let picked = s.sample_distinct(k, n);
            prop_assert_eq!(picked.len(), k.min(n));
            prop_assert!(picked.iter().all(|&i| i < n));
            let mut sorted = picked.clone();
            sorted.sort_unstable();
            sorted.dedup();
            prop_assert_eq!(sorted.len(), picked.len());
        }

        #[test]
        fn prop_full_draw_is_permutation(seed in any::<u64>(), n in 1usize..12) {
            let mut s = IndexSampler::new(Seed::from_u64(seed));
            let mut picked = s.sample_distinct(n, n);
            picked.sort_unstable();
            prop_assert_eq!(picked, (0..n).collect::<Vec<_>>());
        }
    }
}
