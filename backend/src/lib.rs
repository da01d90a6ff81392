//! Production Line Simulator Core - Rust Engine
//!
//! Discrete-time simulation of a multi-station production line with
//! deterministic execution.
//!
//! # Architecture
//!
//! - **rng**: Seed-in/seed-out sampler
//! - **core**: Tick and display-time conversions
//! - **config**: Line and station configuration, presets
//! - **models**: Domain types (Item, StationState, Transfer, SimState, Event)
//! - **engine**: The tick state machine, one sub-module per phase
//! - **metrics**: Read-only line metrics
//! - **costs**: Cost rates and P&L accumulation
//! - **orchestrator**: `SimRunner` plus state digests and validation
//!
//! # Critical Invariants
//!
//! 1. All money values are i64 minor units
//! 2. All randomness flows through the seed held in the state
//! 3. An item lives in exactly one place at a time
//! 4. No station exceeds its capacity or input limit

// Module declarations
pub mod config;
pub mod core;
pub mod costs;
pub mod engine;
pub mod metrics;
pub mod models;
pub mod orchestrator;
pub mod rng;

// Re-exports for convenience
pub use config::{
    presets::{get_initial_config, ScenarioId},
    ConfigError, FlowMode, LayoutMode, LineConfig, MarketChangeSchedule, PolicyDefaults, SimConfig,
    StationConfig, StationPolicy,
};
pub use core::time::SimClock;
pub use costs::{CostRates, CumulativePl, TickPl};
pub use engine::{create_initial_state, tick, tick_in_place, TickInputs, TickResult};
pub use models::{
    event::{Event, EventLog},
    item::{Item, ItemId, ItemStatus},
    state::SimState,
};
pub use orchestrator::{SimRunner, SimulationError, StateValidationError, StepOutcome};
pub use rng::RngManager;
