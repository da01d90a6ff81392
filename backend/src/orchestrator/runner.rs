//! SimRunner - owns one running line
//!
//! Holds the config/state pair and everything derived from the event
//! stream: the tick P&L history, the cumulative series, and the event log.
//! Front ends drive it with `step`/`run` and edit it with `reset`,
//! `set_scenario` and `update_config`.
//!
//! # Example
//!
//! ```rust
//! use line_simulator_core_rs::config::presets::ScenarioId;
//! use line_simulator_core_rs::orchestrator::SimRunner;
//!
//! let mut runner = SimRunner::from_scenario(ScenarioId::Step2).unwrap();
//! let ran = runner.run(100);
//!
//! assert_eq!(ran, 100);
//! assert_eq!(runner.state().tick(), 100);
//! assert_eq!(runner.tick_pl_history().len(), 100);
//! ```

use crate::config::presets::ScenarioId;
use crate::config::{LineConfig, SimConfig};
use crate::costs::{add_tick_pl_to_cumulative, compute_tick_pl, CumulativePl, TickPl};
use crate::engine::{create_initial_state, reschedule_market_change, tick_in_place, TickInputs};
use crate::models::{Event, EventLog, SimState};
use crate::orchestrator::SimulationError;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Scenario switch recorded on the timeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepMarker {
    pub scenario: ScenarioId,
    pub tick: u64,
}

/// Everything one `step` produced
#[derive(Debug, Clone, PartialEq)]
pub struct StepOutcome {
    pub tick: u64,
    pub events: Vec<Event>,
    pub pl: TickPl,
    pub cumulative: CumulativePl,
}

/// Owner of a config, its state, and the derived P&L
#[derive(Debug, Clone)]
pub struct SimRunner {
    scenario: Option<ScenarioId>,
    config: SimConfig,
    state: SimState,
    tick_pl_history: Vec<TickPl>,
    cumulative: Vec<CumulativePl>,
    event_log: EventLog,
    step_markers: Vec<StepMarker>,
    market_change_pending: bool,
}

impl SimRunner {
    /// Runner for an arbitrary resolved config
    pub fn new(config: SimConfig) -> Self {
        let state = create_initial_state(&config);
        Self {
            scenario: None,
            config,
            state,
            tick_pl_history: Vec::new(),
            cumulative: Vec::new(),
            event_log: EventLog::new(),
            step_markers: Vec::new(),
            market_change_pending: false,
        }
    }

    /// Runner for a preset, with its step marker at tick 0
    pub fn from_scenario(scenario: ScenarioId) -> Result<Self, SimulationError> {
        let mut runner = Self::new(scenario.config()?);
        runner.scenario = Some(scenario);
        runner.step_markers.push(StepMarker { scenario, tick: 0 });
        Ok(runner)
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn scenario(&self) -> Option<ScenarioId> {
        self.scenario
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn state(&self) -> &SimState {
        &self.state
    }

    pub fn tick_pl_history(&self) -> &[TickPl] {
        &self.tick_pl_history
    }

    pub fn cumulative_pl(&self) -> &[CumulativePl] {
        &self.cumulative
    }

    /// Latest cumulative row, if any tick has run
    pub fn latest_cumulative(&self) -> Option<&CumulativePl> {
        self.cumulative.last()
    }

    /// Profit to date, starting from the initial investment
    pub fn cumulative_profit(&self) -> i64 {
        self.latest_cumulative()
            .map_or(self.config.cost_rates().initial_investment, |c| c.cumulative_profit)
    }

    pub fn event_log(&self) -> &EventLog {
        &self.event_log
    }

    pub fn step_markers(&self) -> &[StepMarker] {
        &self.step_markers
    }

    pub fn market_change_pending(&self) -> bool {
        self.market_change_pending
    }

    pub fn is_halted(&self) -> bool {
        self.state.is_halted()
    }

    // ========================================================================
    // Stepping
    // ========================================================================

    /// Ask for a market change on the next step
    pub fn request_market_change(&mut self) {
        self.market_change_pending = true;
    }

    /// Advance one tick
    ///
    /// Returns `None` without touching anything once the line is bust or
    /// its time is up. A pending market change request is folded into
    /// `inputs` and consumed.
    pub fn step(&mut self, mut inputs: TickInputs) -> Option<StepOutcome> {
        if self.state.is_halted() {
            return None;
        }

        if self.market_change_pending {
            inputs.market_change_requested = true;
            self.market_change_pending = false;
        }

        let completed_before = self.state.total_completed();
        let events = tick_in_place(&mut self.state, &self.config, inputs);

        let pl = compute_tick_pl(&self.state, &self.config, completed_before, &events);
        let cumulative = add_tick_pl_to_cumulative(
            self.cumulative.last(),
            &pl,
            self.config.cost_rates().initial_investment,
        );

        if cumulative.cumulative_profit <= 0 && !self.state.is_bust() {
            self.state.mark_bust();
            info!(
                tick = self.state.tick(),
                cumulative_profit = cumulative.cumulative_profit,
                "line bust"
            );
        }

        self.tick_pl_history.push(pl.clone());
        self.cumulative.push(cumulative.clone());
        self.event_log.extend(events.iter().cloned());

        Some(StepOutcome {
            tick: self.state.tick(),
            events,
            pl,
            cumulative,
        })
    }

    /// Step up to `ticks` times; returns how many ticks actually ran
    pub fn run(&mut self, ticks: u64) -> u64 {
        let mut ran = 0;
        while ran < ticks && self.step(TickInputs::default()).is_some() {
            ran += 1;
        }
        ran
    }

    // ========================================================================
    // Editing
    // ========================================================================

    /// Fresh state from the current config; history cleared
    pub fn reset(&mut self) {
        self.state = create_initial_state(&self.config);
        self.clear_history();
        debug!(seed = self.config.seed(), "runner reset");
    }

    /// Load a preset, keeping the current seed
    ///
    /// Records a step marker at the tick the switch happened, then starts
    /// the new scenario from tick 0.
    pub fn set_scenario(&mut self, scenario: ScenarioId) -> Result<(), SimulationError> {
        let mut line = scenario.line_config();
        line.seed = self.config.seed();
        let config = SimConfig::resolve(line)?;

        self.step_markers.push(StepMarker {
            scenario,
            tick: self.state.tick(),
        });
        self.scenario = Some(scenario);
        self.config = config;
        self.reset();
        info!(scenario = %scenario, "scenario loaded");
        Ok(())
    }

    /// Replace the config of a running line
    ///
    /// The state keeps running when the station list and seed are
    /// unchanged, with the market-change schedule recomputed from the
    /// current tick if it differs. A different station list or seed starts
    /// over from tick 0. The runner keeps its scenario only while the line
    /// still matches that preset apart from the seed.
    pub fn update_config(&mut self, line: LineConfig) -> Result<(), SimulationError> {
        let config = SimConfig::resolve(line)?;
        let same_stations = config
            .stations()
            .iter()
            .map(|p| p.id.as_str())
            .eq(self.config.stations().iter().map(|p| p.id.as_str()));
        let same_seed = config.seed() == self.config.seed();
        let schedule_changed = config.line().market_change != self.config.line().market_change;

        self.scenario = self.scenario.filter(|scenario| {
            let mut preset = scenario.line_config();
            preset.seed = config.seed();
            preset == *config.line()
        });
        self.config = config;

        if same_stations && same_seed {
            if schedule_changed {
                reschedule_market_change(&mut self.state, &self.config);
            }
            debug!(tick = self.state.tick(), "config updated in place");
        } else {
            self.reset();
        }
        Ok(())
    }

    fn clear_history(&mut self) {
        self.tick_pl_history.clear();
        self.cumulative.clear();
        self.event_log.clear();
        self.market_change_pending = false;
    }
}
