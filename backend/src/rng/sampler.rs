//! Pure seed-in/seed-out sampling primitives
//!
//! Every function takes a seed and returns `(sample, next_seed)`. Nothing
//! here holds state; callers thread the returned seed into the next call.

use super::xorshift::next_u64;
use std::f64::consts::PI;

/// Uniform f64 in [0.0, 1.0)
///
/// # Example
/// ```
/// use line_simulator_core_rs::rng::next_float;
///
/// let (u, _next) = next_float(42);
/// assert!(u >= 0.0 && u < 1.0);
/// ```
pub fn next_float(seed: u64) -> (f64, u64) {
    let (value, next) = next_u64(seed);
    // Top 53 bits → [0.0, 1.0)
    let u = (value >> 11) as f64 * (1.0 / ((1u64 << 53) as f64));
    (u, next)
}

/// Uniform integer in [min, max], both ends inclusive
///
/// `max < min` collapses to `min`.
pub fn next_int(seed: u64, min: i64, max: i64) -> (i64, u64) {
    let (u, next) = next_float(seed);
    if max <= min {
        return (min, next);
    }
    let span = (max - min + 1) as f64;
    let n = (u * span).floor() as i64 + min;
    (n.min(max), next)
}

/// Approximate normal sample using Box–Muller over two uniform draws
pub fn sample_normal_approx(seed: u64, mean: f64, std_dev: f64) -> (f64, u64) {
    let (u1, s1) = next_float(seed);
    let (u2, s2) = next_float(s1);
    // ln(0) is -inf
    let u1 = u1.max(f64::MIN_POSITIVE);
    let z = (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos();
    (mean + std_dev * z, s2)
}

/// Work duration for one item
///
/// Normal around `mean_ms` with standard deviation `sqrt(variance)`,
/// floored at 10% of the mean so work never completes instantly.
pub fn sample_cycle_time(seed: u64, mean_ms: f64, variance: f64) -> (f64, u64) {
    let std_dev = variance.max(0.0).sqrt();
    let (sampled, next) = sample_normal_approx(seed, mean_ms, std_dev);
    (sampled.max(mean_ms * 0.1), next)
}

/// Bernoulli draw with the given success probability
///
/// Probabilities outside [0, 1] behave as clamped.
pub fn chance(seed: u64, probability: f64) -> (bool, u64) {
    let (u, next) = next_float(seed);
    (u < probability, next)
}
