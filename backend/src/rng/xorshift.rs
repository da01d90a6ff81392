//! xorshift64* step function and the seed cursor used by the tick engine
//!
//! The generator is expressed as a pure function from seed to
//! `(value, next_seed)`. `RngManager` is a thin cursor over that function
//! so a phase can draw several samples without threading the seed by hand.
//!
//! # Determinism
//!
//! Same seed → same sequence of samples. The seed lives inside
//! `SimState`, so a state snapshot fully determines every future draw.

use super::sampler;
use serde::{Deserialize, Serialize};

const XORSHIFT_MULTIPLIER: u64 = 0x2545F4914F6CDD1D;

/// Advance a xorshift64* seed by one step
///
/// Returns `(value, next_seed)`. A zero seed is treated as 1, since
/// xorshift never leaves the all-zero state.
///
/// # Example
/// ```
/// use line_simulator_core_rs::rng::next_u64;
///
/// let (a, seed) = next_u64(12345);
/// let (b, _) = next_u64(seed);
/// assert_ne!(a, b);
/// assert_eq!(next_u64(12345).0, a);
/// ```
pub fn next_u64(seed: u64) -> (u64, u64) {
    let mut x = if seed == 0 { 1 } else { seed };
    x ^= x >> 12;
    x ^= x << 25;
    x ^= x >> 27;
    (x.wrapping_mul(XORSHIFT_MULTIPLIER), x)
}

/// Seed cursor over the pure sampler functions
///
/// # Example
/// ```
/// use line_simulator_core_rs::RngManager;
///
/// let mut rng = RngManager::new(12345);
/// let u = rng.next_float();
/// assert!((0.0..1.0).contains(&u));
/// let n = rng.next_int(1, 3);
/// assert!((1..=3).contains(&n));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RngManager {
    /// Current seed (64-bit)
    state: u64,
}

impl RngManager {
    /// Create a new cursor at the given seed
    pub fn new(seed: u64) -> Self {
        // Ensure seed is never zero (xorshift requirement)
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Get current seed (for fingerprinting/replay)
    pub fn get_state(&self) -> u64 {
        self.state
    }

    /// Uniform f64 in [0.0, 1.0)
    pub fn next_float(&mut self) -> f64 {
        let (value, seed) = sampler::next_float(self.state);
        self.state = seed;
        value
    }

    /// Uniform integer in [min, max] (inclusive)
    pub fn next_int(&mut self, min: i64, max: i64) -> i64 {
        let (value, seed) = sampler::next_int(self.state, min, max);
        self.state = seed;
        value
    }

    /// Normal sample via Box–Muller
    pub fn sample_normal_approx(&mut self, mean: f64, std_dev: f64) -> f64 {
        let (value, seed) = sampler::sample_normal_approx(self.state, mean, std_dev);
        self.state = seed;
        value
    }

    /// Work duration in milliseconds, floored at 10% of the mean
    pub fn sample_cycle_time(&mut self, mean_ms: f64, variance: f64) -> f64 {
        let (value, seed) = sampler::sample_cycle_time(self.state, mean_ms, variance);
        self.state = seed;
        value
    }

    /// Bernoulli draw
    pub fn chance(&mut self, probability: f64) -> bool {
        let (hit, seed) = sampler::chance(self.state, probability);
        self.state = seed;
        hit
    }
}
