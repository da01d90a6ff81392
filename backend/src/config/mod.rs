//! Scenario configuration
//!
//! Two layers:
//! - [`LineConfig`] is the raw, serde-friendly description of a scenario:
//!   a list of [`StationConfig`] records whose policy fields are optional
//!   overrides, plus line-wide [`PolicyDefaults`] and economics.
//! - [`SimConfig`] is the resolved form the tick engine consumes. Each
//!   station's effective [`StationPolicy`] is computed once, stations are
//!   addressed by index, and a name→index table is built for lookups.
//!
//! Numeric policy values are clamped into their valid domains rather than
//! rejected. Only structural problems (no stations, duplicate ids, zero
//! capacity) fail resolution.

pub mod presets;

use crate::core::time::SimClock;
use crate::costs::CostRates;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Index of a station in line order
pub type StationIdx = usize;

/// Red-bin catch rate before line stop is available
pub const RED_BIN_CATCH_BASELINE: f64 = 0.6;

/// Red-bin catch rate once jidoka line stop is enabled
pub const RED_BIN_CATCH_WITH_JIDOKA: f64 = 0.95;

/// Errors raised while building a configuration
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Unknown scenario: {0}")]
    UnknownScenario(String),

    #[error("A line needs at least one station")]
    NoStations,

    #[error("Duplicate station id: {0}")]
    DuplicateStation(String),

    #[error("Invalid station {station}: {reason}")]
    InvalidStation { station: String, reason: String },

    #[error("Invalid line configuration: {0}")]
    InvalidLine(String),
}

/// Department a station belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Department {
    #[serde(rename = "dept-1")]
    Dept1,
    #[serde(rename = "dept-2")]
    Dept2,
    #[serde(rename = "dept-3")]
    Dept3,
}

/// Who initiates movement between stations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowMode {
    /// Upstream dispatches finished batches
    Push,
    /// Downstream fetches a ready batch when it has room
    Pull,
}

/// Physical arrangement of stations
///
/// In `Departments` layout, a transfer between stations of different
/// departments takes twice the configured travel time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutMode {
    Departments,
    Flow,
}

/// When market changes fire on their own
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum MarketChangeSchedule {
    /// Only on explicit request
    Never,

    /// Every `interval` ticks
    EveryTicks { interval: u64 },

    /// Every `interval_ms` simulated milliseconds, with ±30% jitter
    /// resampled after each trigger
    EveryMillis { interval_ms: f64 },
}

/// Line-level policy defaults, overridden per station
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyDefaults {
    pub defect_probability: f64,
    pub training_effectiveness: f64,
    /// `None` selects the tiered baseline/jidoka rate
    pub red_bin_catch_probability: Option<f64>,
    pub rework_sends_back: bool,
    pub travel_ticks: u64,
    pub andon_pause_ticks: u64,
}

impl Default for PolicyDefaults {
    fn default() -> Self {
        Self {
            defect_probability: 0.65,
            training_effectiveness: 0.5,
            red_bin_catch_probability: None,
            rework_sends_back: false,
            travel_ticks: 0,
            andon_pause_ticks: 1,
        }
    }
}

/// Static description of one station
///
/// `Option` policy fields fall back to the line's [`PolicyDefaults`].
/// Only `id` and `cycle_time_ms` are required when loading from JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationConfig {
    pub id: String,
    #[serde(default)]
    pub department: Option<Department>,
    /// Mean work time per item (simulated ms)
    pub cycle_time_ms: f64,
    #[serde(default)]
    pub cycle_variance: f64,
    /// Parallel work slots
    #[serde(default = "default_one")]
    pub capacity: usize,
    #[serde(default = "default_one")]
    pub batch_size: usize,
    /// Input queue limit; `None` is unbounded
    #[serde(default)]
    pub buffer_before: Option<usize>,
    #[serde(default)]
    pub red_bin: bool,
    #[serde(default)]
    pub andon_enabled: bool,
    #[serde(default)]
    pub defect_probability: Option<f64>,
    #[serde(default)]
    pub training_effectiveness: Option<f64>,
    #[serde(default)]
    pub red_bin_catch_probability: Option<f64>,
    #[serde(default)]
    pub rework_sends_back: Option<bool>,
    /// Ticks to walk to the next station
    #[serde(default)]
    pub travel_ticks: Option<u64>,
    #[serde(default)]
    pub andon_pause_ticks: Option<u64>,
}

fn default_one() -> usize {
    1
}

impl StationConfig {
    /// Station with a single slot, batch size one, and every policy field
    /// left to the line defaults
    pub fn new(id: impl Into<String>, cycle_time_ms: f64) -> Self {
        Self {
            id: id.into(),
            department: None,
            cycle_time_ms,
            cycle_variance: 0.0,
            capacity: 1,
            batch_size: 1,
            buffer_before: None,
            red_bin: false,
            andon_enabled: false,
            defect_probability: None,
            training_effectiveness: None,
            red_bin_catch_probability: None,
            rework_sends_back: None,
            travel_ticks: None,
            andon_pause_ticks: None,
        }
    }
}

/// Raw scenario description
///
/// Fields missing from JSON take their [`Default`] values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LineConfig {
    pub ticks_per_second: f64,
    pub seed: u64,
    pub stations: Vec<StationConfig>,
    pub flow_mode: FlowMode,
    pub layout_mode: LayoutMode,
    pub defaults: PolicyDefaults,
    pub cost_rates: CostRates,
    pub market_change: MarketChangeSchedule,
    pub jidoka_line_stop: bool,
    /// Probability the manager fixes an andon-held item
    pub manager_revert_probability: f64,
    /// Hold defects at red-bin stations for the manager even without andon
    pub manager_rework_at_red_bin: bool,
    /// Run ends once this many display months have elapsed
    pub display_months_cap: Option<f64>,
}

impl Default for LineConfig {
    fn default() -> Self {
        Self {
            ticks_per_second: 20.0,
            seed: 42,
            stations: Vec::new(),
            flow_mode: FlowMode::Push,
            layout_mode: LayoutMode::Departments,
            defaults: PolicyDefaults::default(),
            cost_rates: CostRates::default(),
            market_change: MarketChangeSchedule::Never,
            jidoka_line_stop: false,
            manager_revert_probability: 0.6,
            manager_rework_at_red_bin: false,
            display_months_cap: Some(24.0),
        }
    }
}

/// Effective per-station policy, resolved once from config layers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationPolicy {
    pub id: String,
    pub index: StationIdx,
    pub department: Option<Department>,
    pub cycle_time_ms: f64,
    pub cycle_variance: f64,
    pub capacity: usize,
    pub batch_size: usize,
    pub input_limit: Option<usize>,
    pub red_bin: bool,
    pub andon_enabled: bool,
    /// Base defect probability in [0, 1]
    pub defect_probability: f64,
    pub training_effectiveness: f64,
    /// Red-bin catch probability in [0, 1]
    pub catch_probability: f64,
    pub rework_sends_back: bool,
    /// Ticks for one leg to the next station, department doubling applied
    pub travel_ticks: u64,
    pub cross_department: bool,
    pub andon_pause_ticks: u64,
    /// Defects here are held for the manager
    pub holds_for_manager: bool,
}

impl StationPolicy {
    /// Defect probability before the learned quality multiplier
    pub fn trained_defect_probability(&self) -> f64 {
        clamp_probability(self.defect_probability * self.training_effectiveness)
    }

    /// Defect probability with a quality multiplier applied
    pub fn effective_defect_probability(&self, quality_multiplier: f64) -> f64 {
        clamp_probability(self.trained_defect_probability() * quality_multiplier)
    }
}

/// Resolved configuration consumed by the engine
///
/// # Example
/// ```
/// use line_simulator_core_rs::config::{LineConfig, SimConfig, StationConfig};
///
/// let line = LineConfig {
///     stations: vec![StationConfig::new("cut", 900.0), StationConfig::new("weld", 900.0)],
///     ..Default::default()
/// };
/// let config = SimConfig::resolve(line).unwrap();
/// assert_eq!(config.station_index("weld"), Some(1));
/// ```
#[derive(Debug, Clone)]
pub struct SimConfig {
    line: LineConfig,
    stations: Vec<StationPolicy>,
    index: HashMap<String, StationIdx>,
    clock: SimClock,
}

impl SimConfig {
    /// Validate a raw config and resolve every station policy
    pub fn resolve(line: LineConfig) -> Result<Self, ConfigError> {
        Self::validate(&line)?;

        let mut index = HashMap::with_capacity(line.stations.len());
        for (i, sc) in line.stations.iter().enumerate() {
            if index.insert(sc.id.clone(), i).is_some() {
                return Err(ConfigError::DuplicateStation(sc.id.clone()));
            }
        }

        let stations = line
            .stations
            .iter()
            .enumerate()
            .map(|(i, sc)| Self::resolve_station(&line, i, sc))
            .collect();

        let clock = SimClock::new(line.ticks_per_second);
        Ok(Self {
            line,
            stations,
            index,
            clock,
        })
    }

    fn validate(line: &LineConfig) -> Result<(), ConfigError> {
        if !(line.ticks_per_second > 0.0 && line.ticks_per_second.is_finite()) {
            return Err(ConfigError::InvalidLine(
                "ticks_per_second must be > 0".to_string(),
            ));
        }
        if line.stations.is_empty() {
            return Err(ConfigError::NoStations);
        }
        match line.market_change {
            MarketChangeSchedule::EveryTicks { interval: 0 } => {
                return Err(ConfigError::InvalidLine(
                    "market change interval must be > 0 ticks".to_string(),
                ));
            }
            MarketChangeSchedule::EveryMillis { interval_ms }
                if !(interval_ms > 0.0 && interval_ms.is_finite()) =>
            {
                return Err(ConfigError::InvalidLine(
                    "market change interval must be a finite number of ms > 0".to_string(),
                ));
            }
            _ => {}
        }

        let invalid = |sc: &StationConfig, reason: &str| ConfigError::InvalidStation {
            station: sc.id.clone(),
            reason: reason.to_string(),
        };

        for (i, sc) in line.stations.iter().enumerate() {
            if sc.capacity == 0 {
                return Err(invalid(sc, "capacity must be >= 1"));
            }
            if sc.batch_size == 0 {
                return Err(invalid(sc, "batch_size must be >= 1"));
            }
            if !(sc.cycle_time_ms > 0.0) {
                return Err(invalid(sc, "cycle_time_ms must be > 0"));
            }
            if let Some(limit) = sc.buffer_before {
                let needed = if i == 0 {
                    sc.batch_size
                } else {
                    line.stations[i - 1].batch_size
                };
                if limit < needed {
                    return Err(invalid(
                        sc,
                        "buffer_before must hold at least one incoming batch",
                    ));
                }
            }
        }
        Ok(())
    }

    fn resolve_station(line: &LineConfig, i: StationIdx, sc: &StationConfig) -> StationPolicy {
        let d = &line.defaults;
        let next_department = line.stations.get(i + 1).and_then(|n| n.department);
        let cross_department = line.layout_mode == LayoutMode::Departments
            && matches!((sc.department, next_department), (Some(a), Some(b)) if a != b);

        let base_travel = sc.travel_ticks.unwrap_or(d.travel_ticks);
        let travel_ticks = if cross_department {
            base_travel.saturating_mul(2)
        } else {
            base_travel
        };

        let catch_probability = sc
            .red_bin_catch_probability
            .or(d.red_bin_catch_probability)
            .unwrap_or(if line.jidoka_line_stop {
                RED_BIN_CATCH_WITH_JIDOKA
            } else {
                RED_BIN_CATCH_BASELINE
            });

        StationPolicy {
            id: sc.id.clone(),
            index: i,
            department: sc.department,
            cycle_time_ms: sc.cycle_time_ms,
            cycle_variance: sc.cycle_variance.max(0.0),
            capacity: sc.capacity,
            batch_size: sc.batch_size,
            input_limit: sc.buffer_before,
            red_bin: sc.red_bin,
            andon_enabled: sc.andon_enabled,
            defect_probability: clamp_probability(
                sc.defect_probability.unwrap_or(d.defect_probability),
            ),
            training_effectiveness: sc
                .training_effectiveness
                .unwrap_or(d.training_effectiveness)
                .max(0.0),
            catch_probability: clamp_probability(catch_probability),
            rework_sends_back: sc.rework_sends_back.unwrap_or(d.rework_sends_back),
            travel_ticks,
            cross_department,
            andon_pause_ticks: sc.andon_pause_ticks.unwrap_or(d.andon_pause_ticks),
            holds_for_manager: sc.andon_enabled || (sc.red_bin && line.manager_rework_at_red_bin),
        }
    }

    /// The raw config this was resolved from
    pub fn line(&self) -> &LineConfig {
        &self.line
    }

    /// Resolved policies in line order
    pub fn stations(&self) -> &[StationPolicy] {
        &self.stations
    }

    pub fn station(&self, idx: StationIdx) -> Option<&StationPolicy> {
        self.stations.get(idx)
    }

    pub fn station_index(&self, id: &str) -> Option<StationIdx> {
        self.index.get(id).copied()
    }

    pub fn station_count(&self) -> usize {
        self.stations.len()
    }

    pub fn last_station(&self) -> StationIdx {
        self.stations.len() - 1
    }

    pub fn clock(&self) -> SimClock {
        self.clock
    }

    pub fn ms_per_tick(&self) -> f64 {
        self.clock.ms_per_tick()
    }

    pub fn flow_mode(&self) -> FlowMode {
        self.line.flow_mode
    }

    pub fn cost_rates(&self) -> &CostRates {
        &self.line.cost_rates
    }

    pub fn seed(&self) -> u64 {
        self.line.seed
    }

    pub fn jidoka_line_stop(&self) -> bool {
        self.line.jidoka_line_stop
    }

    pub fn manager_revert_probability(&self) -> f64 {
        clamp_probability(self.line.manager_revert_probability)
    }

    /// Sum of work slots across the line (employees)
    pub fn total_capacity(&self) -> usize {
        self.stations.iter().map(|s| s.capacity).sum()
    }

    /// Longest single travel leg on the line
    pub fn max_travel_ticks(&self) -> u64 {
        self.stations
            .iter()
            .map(|s| s.travel_ticks)
            .max()
            .unwrap_or(0)
    }

    /// Tick at which the display-time cap is reached
    pub fn end_tick(&self) -> Option<u64> {
        self.line
            .display_months_cap
            .map(|months| self.clock.tick_for_display_months(months))
    }
}

/// Clamp a probability into [0, 1]; NaN maps to 0
pub fn clamp_probability(p: f64) -> f64 {
    if p.is_nan() {
        0.0
    } else {
        p.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_station_line() -> LineConfig {
        LineConfig {
            stations: vec![StationConfig::new("a", 900.0), StationConfig::new("b", 900.0)],
            ..Default::default()
        }
    }

    #[test]
    fn test_station_overrides_win_over_defaults() {
        let mut line = two_station_line();
        line.stations[1].defect_probability = Some(0.1);
        line.stations[1].travel_ticks = Some(4);
        line.defaults.travel_ticks = 2;

        let config = SimConfig::resolve(line).unwrap();
        assert_eq!(config.stations()[0].defect_probability, 0.65);
        assert_eq!(config.stations()[1].defect_probability, 0.1);
        assert_eq!(config.stations()[0].travel_ticks, 2);
        assert_eq!(config.stations()[1].travel_ticks, 4);
    }

    #[test]
    fn test_probabilities_clamped() {
        let mut line = two_station_line();
        line.stations[0].defect_probability = Some(3.0);
        line.stations[1].defect_probability = Some(-1.0);
        line.stations[0].training_effectiveness = Some(4.0);

        let config = SimConfig::resolve(line).unwrap();
        assert_eq!(config.stations()[0].defect_probability, 1.0);
        assert_eq!(config.stations()[1].defect_probability, 0.0);
        assert_eq!(config.stations()[0].effective_defect_probability(1.0), 1.0);
    }

    #[test]
    fn test_cross_department_doubles_travel() {
        let mut line = two_station_line();
        line.defaults.travel_ticks = 3;
        line.stations[0].department = Some(Department::Dept1);
        line.stations[1].department = Some(Department::Dept2);

        let config = SimConfig::resolve(line.clone()).unwrap();
        assert!(config.stations()[0].cross_department);
        assert_eq!(config.stations()[0].travel_ticks, 6);

        line.layout_mode = LayoutMode::Flow;
        let config = SimConfig::resolve(line).unwrap();
        assert!(!config.stations()[0].cross_department);
        assert_eq!(config.stations()[0].travel_ticks, 3);
    }

    #[test]
    fn test_catch_probability_tiers() {
        let mut line = two_station_line();
        let config = SimConfig::resolve(line.clone()).unwrap();
        assert_eq!(config.stations()[0].catch_probability, RED_BIN_CATCH_BASELINE);

        line.jidoka_line_stop = true;
        let config = SimConfig::resolve(line.clone()).unwrap();
        assert_eq!(config.stations()[0].catch_probability, RED_BIN_CATCH_WITH_JIDOKA);

        line.stations[0].red_bin_catch_probability = Some(0.3);
        let config = SimConfig::resolve(line).unwrap();
        assert_eq!(config.stations()[0].catch_probability, 0.3);
    }

    #[test]
    fn test_rejects_structural_errors() {
        let empty = LineConfig::default();
        assert_eq!(SimConfig::resolve(empty).unwrap_err(), ConfigError::NoStations);

        let mut dup = two_station_line();
        dup.stations[1].id = "a".to_string();
        assert_eq!(
            SimConfig::resolve(dup).unwrap_err(),
            ConfigError::DuplicateStation("a".to_string())
        );

        let mut zero = two_station_line();
        zero.stations[0].capacity = 0;
        assert!(matches!(
            SimConfig::resolve(zero),
            Err(ConfigError::InvalidStation { .. })
        ));

        let mut small_buffer = two_station_line();
        small_buffer.stations[0].batch_size = 4;
        small_buffer.stations[1].buffer_before = Some(2);
        assert!(matches!(
            SimConfig::resolve(small_buffer),
            Err(ConfigError::InvalidStation { .. })
        ));
    }

    #[test]
    fn test_rejects_unusable_market_intervals() {
        for interval_ms in [0.0, -5.0, f64::NAN, f64::INFINITY] {
            let mut line = two_station_line();
            line.market_change = MarketChangeSchedule::EveryMillis { interval_ms };
            assert!(matches!(
                SimConfig::resolve(line),
                Err(ConfigError::InvalidLine(_))
            ));
        }

        let mut line = two_station_line();
        line.market_change = MarketChangeSchedule::EveryTicks { interval: 0 };
        assert!(SimConfig::resolve(line).is_err());

        let mut line = two_station_line();
        line.market_change = MarketChangeSchedule::EveryMillis { interval_ms: 1e300 };
        assert!(SimConfig::resolve(line).is_ok());
    }

    #[test]
    fn test_cross_department_doubling_saturates() {
        let mut line = two_station_line();
        line.stations[0].travel_ticks = Some(u64::MAX - 1);
        line.stations[0].department = Some(Department::Dept1);
        line.stations[1].department = Some(Department::Dept2);
        let config = SimConfig::resolve(line).unwrap();
        assert_eq!(config.stations()[0].travel_ticks, u64::MAX);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let json = r#"{
            "seed": 7,
            "stations": [
                { "id": "cut", "cycle_time_ms": 900.0 },
                { "id": "weld", "cycle_time_ms": 600.0, "batch_size": 3, "red_bin": true }
            ],
            "defaults": { "travel_ticks": 2 },
            "cost_rates": { "revenue_per_item": 100 }
        }"#;
        let line: LineConfig = serde_json::from_str(json).unwrap();

        assert_eq!(line.seed, 7);
        assert_eq!(line.ticks_per_second, 20.0);
        assert_eq!(line.market_change, MarketChangeSchedule::Never);
        assert_eq!(line.stations[0], StationConfig::new("cut", 900.0));
        assert_eq!(line.stations[1].batch_size, 3);
        assert_eq!(line.stations[1].capacity, 1);
        assert_eq!(line.defaults.travel_ticks, 2);
        assert_eq!(line.defaults.defect_probability, 0.65);
        assert_eq!(line.cost_rates.revenue_per_item, 100);
        assert_eq!(line.cost_rates.initial_investment, 1_000_000);

        let config = SimConfig::resolve(line).unwrap();
        assert_eq!(config.stations()[1].travel_ticks, 2);
    }

    #[test]
    fn test_station_needs_id_and_cycle_time() {
        let missing = r#"{ "stations": [ { "id": "cut" } ] }"#;
        assert!(serde_json::from_str::<LineConfig>(missing).is_err());
    }

    #[test]
    fn test_manager_hold_policy() {
        let mut line = two_station_line();
        line.stations[0].red_bin = true;
        let config = SimConfig::resolve(line.clone()).unwrap();
        assert!(!config.stations()[0].holds_for_manager);

        line.manager_rework_at_red_bin = true;
        let config = SimConfig::resolve(line).unwrap();
        assert!(config.stations()[0].holds_for_manager);
        assert!(!config.stations()[1].holds_for_manager);
    }

    #[test]
    fn test_end_tick_from_display_cap() {
        let line = two_station_line();
        let config = SimConfig::resolve(line).unwrap();
        let end = config.end_tick().unwrap();
        assert!(config.clock().display_months(end) >= 24.0);
    }
}
