//! Deterministic random number generation
//!
//! Uses xorshift64* expressed as pure seed-in/seed-out functions.
//! CRITICAL: All randomness in the simulator MUST go through this module,
//! and the seed is consumed strictly sequentially within a tick.

mod sampler;
mod xorshift;

pub use sampler::{chance, next_float, next_int, sample_cycle_time, sample_normal_approx};
pub use xorshift::{next_u64, RngManager};
