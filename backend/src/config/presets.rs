//! Scenario presets
//!
//! The tutorial walks through nine scenarios (`intro`, `step-1` …
//! `step-8`) plus a free-form `playground`. Each is the base line with
//! structural overrides applied: swapped station lists, per-station policy
//! fields rewritten by the `with_*` helpers, and line-level flags.
//!
//! # Example
//!
//! ```rust
//! use line_simulator_core_rs::config::presets::{get_initial_config, ScenarioId};
//!
//! let config = get_initial_config("step-7").unwrap();
//! assert_eq!(config.station_count(), 9);
//! assert!(config.station_index("s5b").is_some());
//!
//! let step: ScenarioId = "step-3".parse().unwrap();
//! assert_eq!(step.label(), "3. Andon");
//! assert_eq!(step.next(), Some(ScenarioId::Step4));
//! ```

use super::{
    ConfigError, Department, FlowMode, LayoutMode, LineConfig, MarketChangeSchedule, SimConfig,
    StationConfig,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Market-change cadence shared by every scenario
pub const MARKET_CHANGE_INTERVAL_TICKS: u64 = 600;

/// Named scenario
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScenarioId {
    #[serde(rename = "intro")]
    Intro,
    #[serde(rename = "step-1")]
    Step1,
    #[serde(rename = "step-2")]
    Step2,
    #[serde(rename = "step-3")]
    Step3,
    #[serde(rename = "step-4")]
    Step4,
    #[serde(rename = "step-5")]
    Step5,
    #[serde(rename = "step-6")]
    Step6,
    #[serde(rename = "step-7")]
    Step7,
    #[serde(rename = "step-8")]
    Step8,
    #[serde(rename = "playground")]
    Playground,
}

impl ScenarioId {
    /// Tutorial order; the playground sits outside it
    pub const STEPS: [ScenarioId; 9] = [
        ScenarioId::Intro,
        ScenarioId::Step1,
        ScenarioId::Step2,
        ScenarioId::Step3,
        ScenarioId::Step4,
        ScenarioId::Step5,
        ScenarioId::Step6,
        ScenarioId::Step7,
        ScenarioId::Step8,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ScenarioId::Intro => "intro",
            ScenarioId::Step1 => "step-1",
            ScenarioId::Step2 => "step-2",
            ScenarioId::Step3 => "step-3",
            ScenarioId::Step4 => "step-4",
            ScenarioId::Step5 => "step-5",
            ScenarioId::Step6 => "step-6",
            ScenarioId::Step7 => "step-7",
            ScenarioId::Step8 => "step-8",
            ScenarioId::Playground => "playground",
        }
    }

    /// Display label for front ends
    pub fn label(&self) -> &'static str {
        match self {
            ScenarioId::Intro => "Intro",
            ScenarioId::Step1 => "1. Customer Feedback",
            ScenarioId::Step2 => "2. Training",
            ScenarioId::Step3 => "3. Andon",
            ScenarioId::Step4 => "4. Jidoka",
            ScenarioId::Step5 => "5. Flow",
            ScenarioId::Step6 => "6. Pull & Blue Bins",
            ScenarioId::Step7 => "7. Bottleneck & Takt",
            ScenarioId::Step8 => "8. One-Piece Flow",
            ScenarioId::Playground => "Playground",
        }
    }

    fn step_position(&self) -> Option<usize> {
        Self::STEPS.iter().position(|s| s == self)
    }

    /// Previous tutorial step
    pub fn prev(&self) -> Option<ScenarioId> {
        match self.step_position() {
            Some(i) if i > 0 => Some(Self::STEPS[i - 1]),
            _ => None,
        }
    }

    /// Next tutorial step
    pub fn next(&self) -> Option<ScenarioId> {
        self.step_position()
            .and_then(|i| Self::STEPS.get(i + 1).copied())
    }

    /// Raw config for this scenario
    pub fn line_config(&self) -> LineConfig {
        let base = base_line();
        match self {
            ScenarioId::Intro => LineConfig {
                stations: with_rework_sends_back(default_stations(), false),
                ..base
            },
            ScenarioId::Step1 => LineConfig {
                stations: with_rework_sends_back(with_last_station_red_bin(default_stations()), false),
                ..base
            },
            ScenarioId::Step2 => LineConfig {
                stations: with_defect_probability(with_all_stations_red_bin(default_stations()), 0.2),
                ..base
            },
            ScenarioId::Step3 => LineConfig {
                stations: andon_line(default_stations()),
                ..base
            },
            ScenarioId::Step4 => LineConfig {
                stations: andon_line(default_stations()),
                jidoka_line_stop: true,
                ..base
            },
            ScenarioId::Step5 => LineConfig {
                stations: andon_line(with_travel_ticks(default_stations(), 0)),
                jidoka_line_stop: true,
                layout_mode: LayoutMode::Flow,
                ..base
            },
            ScenarioId::Step6 => LineConfig {
                stations: andon_line(with_travel_ticks(default_stations(), 6)),
                jidoka_line_stop: true,
                layout_mode: LayoutMode::Flow,
                flow_mode: FlowMode::Pull,
                ..base
            },
            ScenarioId::Step7 => LineConfig {
                stations: with_defect_probability(takt_stations(), 0.2),
                jidoka_line_stop: true,
                layout_mode: LayoutMode::Flow,
                flow_mode: FlowMode::Pull,
                ..base
            },
            ScenarioId::Step8 => {
                let stations = takt_stations()
                    .into_iter()
                    .map(|s| StationConfig {
                        batch_size: 1,
                        cycle_variance: (s.cycle_time_ms * 0.4).round(),
                        ..s
                    })
                    .collect();
                LineConfig {
                    stations: with_defect_probability(stations, 0.2),
                    jidoka_line_stop: true,
                    layout_mode: LayoutMode::Flow,
                    flow_mode: FlowMode::Pull,
                    ..base
                }
            }
            // Same line as the intro; only the front end unlocks more controls
            ScenarioId::Playground => base,
        }
    }

    /// Resolved config for this scenario
    pub fn config(&self) -> Result<SimConfig, ConfigError> {
        SimConfig::resolve(self.line_config())
    }
}

impl fmt::Display for ScenarioId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScenarioId {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::STEPS
            .iter()
            .chain(std::iter::once(&ScenarioId::Playground))
            .find(|id| id.as_str() == s)
            .copied()
            .ok_or_else(|| ConfigError::UnknownScenario(s.to_string()))
    }
}

/// Resolved config for a scenario id such as `"step-4"`
pub fn get_initial_config(id: &str) -> Result<SimConfig, ConfigError> {
    id.parse::<ScenarioId>()?.config()
}

// ============================================================================
// Station tables
// ============================================================================

fn station(id: &str, department: Department, cycle_time_ms: f64) -> StationConfig {
    StationConfig {
        department: Some(department),
        cycle_variance: (cycle_time_ms * 0.1).round(),
        batch_size: 6,
        defect_probability: Some(0.65),
        training_effectiveness: Some(0.5),
        rework_sends_back: Some(false),
        travel_ticks: Some(3),
        andon_pause_ticks: Some(1),
        ..StationConfig::new(id, cycle_time_ms)
    }
}

/// Departments repeat 1, 2, 3 down the line
fn department_for(position: usize) -> Department {
    match position % 3 {
        0 => Department::Dept1,
        1 => Department::Dept2,
        _ => Department::Dept3,
    }
}

/// The nine-station base line; `s5` is the bottleneck
pub fn default_stations() -> Vec<StationConfig> {
    (1..=9)
        .map(|n| {
            let cycle = if n == 5 { 2100.0 } else { 900.0 };
            station(&format!("s{}", n), department_for(n - 1), cycle)
        })
        .collect()
}

/// Takt-balanced line: the bottleneck is split into `s5a`/`s5b`, and every
/// station has a red bin and andon
pub fn takt_stations() -> Vec<StationConfig> {
    let layout = [
        ("s1", Department::Dept1, 900.0),
        ("s2", Department::Dept2, 900.0),
        ("s3", Department::Dept3, 900.0),
        ("s4", Department::Dept1, 900.0),
        ("s5a", Department::Dept2, 1050.0),
        ("s5b", Department::Dept2, 1050.0),
        ("s6", Department::Dept3, 900.0),
        ("s7", Department::Dept1, 900.0),
        ("s8", Department::Dept2, 900.0),
    ];
    layout
        .iter()
        .map(|&(id, department, cycle)| StationConfig {
            red_bin: true,
            andon_enabled: true,
            defect_probability: Some(0.2),
            travel_ticks: Some(6),
            ..station(id, department, cycle)
        })
        .collect()
}

/// Line-level settings shared by every scenario
pub fn base_line() -> LineConfig {
    LineConfig {
        stations: default_stations(),
        market_change: MarketChangeSchedule::EveryTicks {
            interval: MARKET_CHANGE_INTERVAL_TICKS,
        },
        ..Default::default()
    }
}

fn andon_line(stations: Vec<StationConfig>) -> Vec<StationConfig> {
    with_defect_probability(with_andon_enabled(with_all_stations_red_bin(stations), true), 0.2)
}

// ============================================================================
// Override helpers
// ============================================================================

/// Red bin on the last station only
pub fn with_last_station_red_bin(mut stations: Vec<StationConfig>) -> Vec<StationConfig> {
    let last = stations.len().saturating_sub(1);
    for (i, s) in stations.iter_mut().enumerate() {
        s.red_bin = i == last;
    }
    stations
}

pub fn with_all_stations_red_bin(mut stations: Vec<StationConfig>) -> Vec<StationConfig> {
    for s in &mut stations {
        s.red_bin = true;
    }
    stations
}

pub fn with_defect_probability(mut stations: Vec<StationConfig>, value: f64) -> Vec<StationConfig> {
    for s in &mut stations {
        s.defect_probability = Some(value);
    }
    stations
}

pub fn with_andon_enabled(mut stations: Vec<StationConfig>, value: bool) -> Vec<StationConfig> {
    for s in &mut stations {
        s.andon_enabled = value;
    }
    stations
}

pub fn with_travel_ticks(mut stations: Vec<StationConfig>, value: u64) -> Vec<StationConfig> {
    for s in &mut stations {
        s.travel_ticks = Some(value);
    }
    stations
}

pub fn with_rework_sends_back(mut stations: Vec<StationConfig>, value: bool) -> Vec<StationConfig> {
    for s in &mut stations {
        s.rework_sends_back = Some(value);
    }
    stations
}
