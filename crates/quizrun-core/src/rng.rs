//! Random number generator abstraction for determinism.
//!
//! Production code shuffles through [`SeededRng`]; tests inject a scripted
//! implementation so that a partition is reproducible.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Abstraction over random number generation.
pub trait DeterministicRng: Send + Sync {
    /// Generate a random `u32` in the range `[min, max]` inclusive.
    fn next_u32_range(&mut self, min: u32, max: u32) -> u32;
}

/// `DeterministicRng` backed by `rand`'s `StdRng`.
#[derive(Debug, Clone)]
pub struct SeededRng(StdRng);

impl SeededRng {
    /// Creates a generator that always yields the same sequence for `seed`.
    #[must_use]
    pub fn from_seed(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }

    /// Creates a generator seeded from the operating system.
    #[must_use]
    pub fn from_entropy() -> Self {
        Self(StdRng::from_os_rng())
    }
}

impl DeterministicRng for SeededRng {
    fn next_u32_range(&mut self, min: u32, max: u32) -> u32 {
        if min >= max {
            return min;
        }
        self.0.random_range(min..=max)
    }
}

/// Shuffles `items` in place with the Fisher–Yates algorithm.
///
/// Every swap index is drawn from `rng`, so the permutation is fully
/// determined by the generator's output.
///
/// # Panics
///
/// Panics if `items` has more than `u32::MAX` elements.
pub fn fisher_yates<T>(items: &mut [T], rng: &mut dyn DeterministicRng) {
    for i in (1..items.len()).rev() {
        let upper = u32::try_from(i).expect("shuffle length fits in u32");
        let j = rng.next_u32_range(0, upper) as usize;
        // A misbehaving generator must not index out of bounds.
        items.swap(i, j.min(i));
    }
}
