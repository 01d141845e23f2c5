//! Injectable randomness for countdown durations and wheel spins.

use rand::rngs::{StdRng, ThreadRng};
use rand::Rng;

/// Source of uniformly distributed integers.
pub trait RandomSource {
    /// Uniform integer in the closed interval `[low, high]`. Requires `low <= high`.
    fn between(&mut self, low: i64, high: i64) -> i64;

    /// Uniform index in `[0, len)`. Requires `len > 0`.
    fn index(&mut self, len: usize) -> usize {
        self.between(0, len as i64 - 1) as usize
    }
}

impl RandomSource for ThreadRng {
    fn between(&mut self, low: i64, high: i64) -> i64 {
        self.random_range(low..=high)
    }
}

impl RandomSource for StdRng {
    fn between(&mut self, low: i64, high: i64) -> i64 {
        self.random_range(low..=high)
    }
}

/// Replays a fixed list of draws, clamped into each requested interval.
///
/// Once the script runs out every draw returns the low end of its interval.
#[derive(Debug, Clone, Default)]
pub struct Scripted {
    values: std::collections::VecDeque<i64>,
}

impl Scripted {
    pub fn new(values: impl IntoIterator<Item = i64>) -> Self {
        Self {
            values: values.into_iter().collect(),
        }
    }

    /// Draws still queued.
    pub fn remaining(&self) -> usize {
        self.values.len()
    }
}

impl RandomSource for Scripted {
    fn between(&mut self, low: i64, high: i64) -> i64 {
        self.values.pop_front().unwrap_or(low).clamp(low, high)
    }
}
