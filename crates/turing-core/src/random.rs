//! Injectable randomness
//!
//! Every probabilistic decision in a game (speaker draws, silence rolls,
//! typo injection, typing latency, color assignment) goes through
//! [`RandomSource`], so tests can replay an exact sequence of draws.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;

/// Source of uniform random draws
pub trait RandomSource: Send + std::fmt::Debug {
    /// Uniform integer in `[0, upper)`; returns 0 when `upper` is 0
    fn below(&mut self, upper: usize) -> usize;

    /// Uniform float in `[0, 1)`
    fn unit(&mut self) -> f64;

    /// Uniform float in `[low, high)`
    fn uniform(&mut self, low: f64, high: f64) -> f64 {
        low + (high - low) * self.unit()
    }

    /// True with probability `p`
    fn chance(&mut self, p: f64) -> bool {
        self.unit() < p
    }
}

/// Production source backed by a seedable [`StdRng`]
#[derive(Debug)]
pub struct StdRandom {
    rng: StdRng,
}

impl StdRandom {
    /// Seed from the operating system
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Reproducible source for replaying an experiment
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for StdRandom {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomSource for StdRandom {
    fn below(&mut self, upper: usize) -> usize {
        if upper == 0 {
            return 0;
        }
        self.rng.random_range(0..upper)
    }

    fn unit(&mut self) -> f64 {
        self.rng.random::<f64>()
    }
}

/// Deterministic source that replays a fixed list of unit draws
///
/// Each call consumes one value `v` in `[0, 1)`. Integer draws map to
/// `floor(v * upper)`. Once the script is exhausted every draw returns
/// `exhausted_value` (0.99 by default, which fails every low-probability
/// roll).
#[derive(Debug, Clone)]
pub struct ScriptedRandom {
    script: VecDeque<f64>,
    exhausted_value: f64,
    consumed: usize,
}

impl ScriptedRandom {
    /// Create a source replaying `values` in order
    pub fn new(values: impl IntoIterator<Item = f64>) -> Self {
        Self {
            script: values.into_iter().collect(),
            exhausted_value: 0.99,
            consumed: 0,
        }
    }

    /// Value returned after the script runs out
    pub fn with_exhausted_value(mut self, value: f64) -> Self {
        self.exhausted_value = value.clamp(0.0, 0.999_999);
        self
    }

    /// Append more draws to the end of the script
    pub fn extend(&mut self, values: impl IntoIterator<Item = f64>) {
        self.script.extend(values);
    }

    /// Number of draws consumed so far
    pub fn consumed(&self) -> usize {
        self.consumed
    }

    /// Draws left in the script
    pub fn remaining(&self) -> usize {
        self.script.len()
    }

    fn next_value(&mut self) -> f64 {
        self.consumed += 1;
        self.script
            .pop_front()
            .unwrap_or(self.exhausted_value)
            .clamp(0.0, 0.999_999)
    }
}

impl RandomSource for ScriptedRandom {
    fn below(&mut self, upper: usize) -> usize {
        let value = self.next_value();
        if upper == 0 {
            return 0;
        }
        ((value * upper as f64) as usize).min(upper - 1)
    }

    fn unit(&mut self) -> f64 {
        self.next_value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_integer_mapping() {
        let mut rng = ScriptedRandom::new([0.0, 0.49, 0.5, 0.99, 0.19, 0.2]);
        assert_eq!(rng.below(2), 0);
        assert_eq!(rng.below(2), 0);
        assert_eq!(rng.below(2), 1);
        assert_eq!(rng.below(2), 1);
        assert_eq!(rng.below(100), 19);
        assert_eq!(rng.below(100), 20);
        assert_eq!(rng.consumed(), 6);
    }

    #[test]
    fn test_scripted_exhaustion_fails_rolls() {
        let mut rng = ScriptedRandom::new([]);
        assert!(!rng.chance(0.5));
        assert_eq!(rng.below(100), 99);
    }

    #[test]
    fn test_std_random_ranges() {
        let mut rng = StdRandom::seeded(7);
        for _ in 0..1000 {
            assert!(rng.below(3) < 3);
            let u = rng.uniform(3.0, 5.0);
            assert!((3.0..5.0).contains(&u));
        }
        assert_eq!(rng.below(0), 0);
    }

    #[test]
    fn test_seeded_is_reproducible() {
        let mut a = StdRandom::seeded(42);
        let mut b = StdRandom::seeded(42);
        let xs: Vec<usize> = (0..16).map(|_| a.below(1000)).collect();
        let ys: Vec<usize> = (0..16).map(|_| b.below(1000)).collect();
        assert_eq!(xs, ys);
    }
}
