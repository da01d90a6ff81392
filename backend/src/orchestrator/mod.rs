//! Orchestrator - owns a running line
//!
//! `SimRunner` holds the config/state pair, folds each tick's events into
//! the P&L history, and stops once the line is bust or out of time.
//! `checkpoint` fingerprints and validates states.
//!
//! See `runner.rs` for the step loop.

pub mod checkpoint;
pub mod runner;

use crate::config::ConfigError;
use thiserror::Error;

pub use checkpoint::{compute_config_hash, state_digest, validate_state, StateValidationError};
pub use runner::{SimRunner, StepMarker, StepOutcome};

/// Errors surfaced by the runner and checkpoint helpers
///
/// The tick engine itself never fails.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SimulationError {
    #[error("Invalid config: {0}")]
    InvalidConfig(#[from] ConfigError),

    #[error("State validation failed: {0}")]
    StateValidationError(#[from] StateValidationError),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}
