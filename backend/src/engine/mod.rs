//! Tick engine
//!
//! Advances a [`SimState`] by exactly one discrete step. Each step runs
//! a fixed sequence of phases:
//!
//! 1. Line-stop housekeeping (close an expired jidoka window)
//! 2. Market change
//! 3. Advance work and complete items
//! 4. Manager dispatch and andon resolution
//! 5. Red-bin quality gates
//! 6. Transfer advancement
//! 7. Routing: ship, bin, hand off, or dispatch transfers
//! 8. Start work
//! 9. Raw-material arrivals
//!
//! While a jidoka window is open only phases 2 and 4 run. A line stop
//! raised mid-tick (by the manager or the last station's red bin) skips the
//! remaining work phases of that tick.
//!
//! All randomness is drawn from the sampler seed carried inside the state,
//! so identical `(state, config, inputs)` always produce identical output.
//!
//! # Example
//!
//! ```rust
//! use line_simulator_core_rs::config::presets::get_initial_config;
//! use line_simulator_core_rs::engine::{create_initial_state, tick, TickInputs};
//!
//! let config = get_initial_config("step-2").unwrap();
//! let state = create_initial_state(&config);
//!
//! let result = tick(&state, &config, TickInputs::default());
//! assert_eq!(result.state.tick(), 1);
//! assert_eq!(state.tick(), 0);
//! ```

mod arrivals;
mod gates;
mod line_stop;
mod manager;
mod market;
mod routing;
mod transfers;
mod work;

pub use line_stop::MIN_LINE_STOP_TICKS;
pub use manager::MANAGER_TRAVEL_TICKS;

use crate::config::SimConfig;
use crate::models::{Event, SimState};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// External inputs for one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickInputs {
    /// Force a market change this tick regardless of the schedule
    pub market_change_requested: bool,
}

impl TickInputs {
    pub fn market_change() -> Self {
        Self {
            market_change_requested: true,
        }
    }
}

/// Result of a pure tick
#[derive(Debug, Clone)]
pub struct TickResult {
    pub state: SimState,
    pub events: Vec<Event>,
}

/// Fresh state for `config` at tick 0
///
/// The only sampler draw made here is the first jittered market-change
/// interval when the schedule is millisecond based.
pub fn create_initial_state(config: &SimConfig) -> SimState {
    let mut state = SimState::empty(config);
    state.next_market_change_tick = market::schedule_after(&mut state, config, 0);
    debug!(
        stations = config.station_count(),
        seed = config.seed(),
        next_market_change = ?state.next_market_change_tick,
        "initial state created"
    );
    state
}

/// Recompute the next scheduled market change counting from the current tick
pub(crate) fn reschedule_market_change(state: &mut SimState, config: &SimConfig) {
    let now = state.tick;
    state.next_market_change_tick = market::schedule_after(state, config, now);
    debug!(
        tick = now,
        next_market_change = ?state.next_market_change_tick,
        "market change rescheduled"
    );
}

/// Advance one tick without touching the input state
pub fn tick(state: &SimState, config: &SimConfig, inputs: TickInputs) -> TickResult {
    let mut next = state.clone();
    let events = tick_in_place(&mut next, config, inputs);
    TickResult {
        state: next,
        events,
    }
}

/// Advance one tick, mutating `state`
///
/// `state` must have been created from `config` (same station count).
pub fn tick_in_place(state: &mut SimState, config: &SimConfig, inputs: TickInputs) -> Vec<Event> {
    let mut events = Vec::new();
    state.tick += 1;

    line_stop::housekeeping(state, config);
    market::run(state, config, inputs, &mut events);

    if state.jidoka.is_none() {
        work::advance(state, config, &mut events);
    }

    manager::run(state, config, &mut events);

    if state.jidoka.is_none() {
        gates::inspect(state, config, &mut events);
        transfers::advance(state, config);
        routing::route(state, config, &mut events);
    }

    if state.jidoka.is_none() {
        work::start(state, config);
        arrivals::release(state, config, &mut events);
    }

    if !state.ended && config.end_tick().is_some_and(|end| state.tick >= end) {
        state.ended = true;
        info!(tick = state.tick, "display time cap reached, run ended");
    }

    debug!(tick = state.tick, events = events.len(), "tick complete");
    events
}
