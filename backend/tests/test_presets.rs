//! Preset Library Tests
//!
//! Every scenario resolves, runs, and round-trips through JSON so front
//! ends and the CLI can load it from a file.

use line_simulator_core_rs::config::presets::{get_initial_config, ScenarioId};
use line_simulator_core_rs::config::{FlowMode, LayoutMode, LineConfig, SimConfig};
use line_simulator_core_rs::orchestrator::{compute_config_hash, validate_state, SimRunner};
use std::collections::HashSet;

fn all_scenarios() -> Vec<ScenarioId> {
    ScenarioId::STEPS
        .iter()
        .copied()
        .chain(std::iter::once(ScenarioId::Playground))
        .collect()
}

#[test]
fn test_ids_and_labels() {
    let ids: Vec<&str> = all_scenarios().iter().map(|s| s.as_str()).collect();
    assert_eq!(
        ids,
        vec!["intro", "step-1", "step-2", "step-3", "step-4", "step-5", "step-6", "step-7", "step-8", "playground"]
    );

    let labels: HashSet<&str> = all_scenarios().iter().map(|s| s.label()).collect();
    assert_eq!(labels.len(), ids.len());

    for id in ids {
        let parsed: ScenarioId = id.parse().unwrap();
        assert_eq!(parsed.to_string(), id);
        assert!(get_initial_config(id).is_ok());
    }
}

#[test]
fn test_steps_chain_in_order() {
    let steps = ScenarioId::STEPS;
    for pair in steps.windows(2) {
        assert_eq!(pair[0].next(), Some(pair[1]));
        assert_eq!(pair[1].prev(), Some(pair[0]));
    }
}

#[test]
fn test_scenario_id_wire_names() {
    let json = serde_json::to_string(&ScenarioId::Step3).unwrap();
    assert_eq!(json, "\"step-3\"");
    let back: ScenarioId = serde_json::from_str("\"playground\"").unwrap();
    assert_eq!(back, ScenarioId::Playground);
}

#[test]
fn test_line_config_loads_from_json() {
    for scenario in all_scenarios() {
        let line = scenario.line_config();
        let json = serde_json::to_string_pretty(&line).unwrap();
        let loaded: LineConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(loaded, line);
        assert_eq!(compute_config_hash(&loaded).unwrap(), compute_config_hash(&line).unwrap());
        assert!(SimConfig::resolve(loaded).is_ok());
    }
}

#[test]
fn test_steps_differ() {
    let hashes: HashSet<String> = ScenarioId::STEPS
        .iter()
        .map(|s| compute_config_hash(&s.line_config()).unwrap())
        .collect();
    assert_eq!(hashes.len(), ScenarioId::STEPS.len());

    // The playground starts from the intro line
    assert_eq!(ScenarioId::Playground.line_config(), ScenarioId::Intro.line_config());
}

#[test]
fn test_takt_line_splits_bottleneck() {
    for scenario in [ScenarioId::Step7, ScenarioId::Step8] {
        let config = scenario.config().unwrap();
        assert!(config.station_index("s5a").is_some());
        assert!(config.station_index("s5b").is_some());
        assert!(config.station_index("s5").is_none());
        assert_eq!(config.flow_mode(), FlowMode::Pull);
        assert_eq!(config.line().layout_mode, LayoutMode::Flow);
        assert!(config.stations().iter().all(|p| p.red_bin && p.andon_enabled));
    }
}

#[test]
fn test_every_scenario_runs_cleanly() {
    for scenario in all_scenarios() {
        let mut runner = SimRunner::from_scenario(scenario).unwrap();
        let ran = runner.run(600);
        assert_eq!(ran, 600, "{} halted early", scenario);
        assert!(runner.event_log().count_of_type("materialConsumed") > 0);
        validate_state(runner.state(), runner.config()).unwrap();
    }
}
