//! Cost Types and P&L Accumulation
//!
//! This module provides:
//! - Cost rate configuration (`CostRates`)
//! - Per-tick profit and loss (`TickPl`) computed from a state and the
//!   events of the tick that produced it
//! - The cumulative fold (`CumulativePl`), seeded by the initial investment
//!
//! All money is i64 minor units.

pub mod pl;
pub mod rates;

// Re-exports
pub use pl::{add_tick_pl_to_cumulative, compute_cumulative_pl, compute_tick_pl, CumulativePl, TickPl};
pub use rates::CostRates;
