//! Test RNG: scripted `DeterministicRng` implementations for shuffles.

use quizrun_core::rng::DeterministicRng;

/// An RNG that always returns `min`. Under Fisher–Yates this swaps every
/// position with index 0, which rotates the slice left by one: `[a, b, c]`
/// becomes `[b, c, a]`.
#[derive(Debug)]
pub struct MockRng;

impl DeterministicRng for MockRng {
    fn next_u32_range(&mut self, min: u32, _max: u32) -> u32 {
        min
    }
}

/// An RNG that returns values from a predetermined sequence, wrapping around
/// when exhausted. Values above the requested `max` are clamped so a short
/// script can drive shuffles of any length.
#[derive(Debug)]
pub struct SequenceRng {
    values: Vec<u32>,
    index: usize,
}

impl SequenceRng {
    /// Create a new `SequenceRng` with the given values.
    ///
    /// # Panics
    ///
    /// Panics if `values` is empty.
    #[must_use]
    pub fn new(values: Vec<u32>) -> Self {
        assert!(!values.is_empty(), "SequenceRng needs at least one value");
        Self { values, index: 0 }
    }

    /// Identity shuffle: under Fisher–Yates, drawing `i` at step `i` leaves
    /// every element in place.
    #[must_use]
    pub fn identity_for(len: usize) -> Self {
        let steps: Vec<u32> = (1..len.max(2))
            .rev()
            .map(|i| u32::try_from(i).unwrap_or(u32::MAX))
            .collect();
        Self::new(steps)
    }
}

impl DeterministicRng for SequenceRng {
    fn next_u32_range(&mut self, min: u32, max: u32) -> u32 {
        let val = self.values[self.index % self.values.len()];
        self.index += 1;
        val.clamp(min, max.max(min))
    }
}
