//! Quality Policy Tests
//!
//! Red bins, andon holds, the manager, jidoka line stops, learning, and
//! rework send-back, observed through the public engine surface.

use line_simulator_core_rs::config::presets::ScenarioId;
use line_simulator_core_rs::config::{LineConfig, MarketChangeSchedule, SimConfig, StationConfig};
use line_simulator_core_rs::engine::{create_initial_state, tick_in_place, TickInputs};
use line_simulator_core_rs::models::{Event, EventLog, SimState};

// ============================================================================
// Test Helpers
// ============================================================================

fn run(config: &SimConfig, ticks: u64) -> (SimState, EventLog) {
    let mut state = create_initial_state(config);
    let mut log = EventLog::new();
    for _ in 0..ticks {
        log.extend(tick_in_place(&mut state, config, TickInputs::default()));
    }
    (state, log)
}

/// Station with an exact defect probability (training disabled)
fn station(id: &str, defect_probability: f64) -> StationConfig {
    StationConfig {
        defect_probability: Some(defect_probability),
        training_effectiveness: Some(1.0),
        ..StationConfig::new(id, 100.0)
    }
}

fn line(stations: Vec<StationConfig>) -> SimConfig {
    SimConfig::resolve(LineConfig {
        stations,
        ..Default::default()
    })
    .unwrap()
}

// ============================================================================
// Red bins
// ============================================================================

#[test]
fn test_catch_probability_tiers() {
    let plain = ScenarioId::Step3.config().unwrap();
    let jidoka = ScenarioId::Step4.config().unwrap();
    assert!(plain.stations().iter().all(|p| p.catch_probability == 0.6));
    assert!(jidoka.stations().iter().all(|p| p.catch_probability == 0.95));
}

#[test]
fn test_certain_gate_catches_every_defect() {
    let mut gate = station("b", 0.0);
    gate.red_bin = true;
    gate.red_bin_catch_probability = Some(1.0);
    let config = line(vec![station("a", 1.0), gate, station("c", 0.0)]);

    let (state, log) = run(&config, 400);

    let caught = log.count_of_type("defectCaught");
    assert!(caught > 0);
    assert_eq!(caught as u64, state.total_rejected());
    assert_eq!(state.total_completed(), 0);
    assert_eq!(state.total_defective_shipped(), 0);
    assert!(log.events_for_station("b").iter().all(|e| e.event_type() == "defectCaught"));
}

#[test]
fn test_blind_gate_lets_defects_through() {
    let mut gate = station("b", 0.0);
    gate.red_bin = true;
    gate.red_bin_catch_probability = Some(0.0);
    let config = line(vec![station("a", 1.0), gate, station("c", 0.0)]);

    let (state, log) = run(&config, 400);

    assert_eq!(log.count_of_type("defectCaught"), 0);
    assert!(state.total_defective_shipped() > 0);
    assert_eq!(state.total_completed(), 0);
}

// ============================================================================
// Andon and manager
// ============================================================================

#[test]
fn test_every_andon_is_resolved_or_held() {
    let config = ScenarioId::Step3.config().unwrap();
    let (state, log) = run(&config, 4_000);

    let triggered = log.count_of_type("andonTriggered");
    let reverted = log.count_of_type("managerReverted");
    let rejected = log.count_of_type("managerRejected");
    let held = state.stations().iter().filter(|st| st.andon_hold.is_some()).count();

    assert!(triggered > 0);
    assert!(reverted > 0 && rejected > 0);
    assert_eq!(triggered, reverted + rejected + held);
    assert!(state.pending_andon().len() <= held);
}

#[test]
fn test_manager_decision_follows_walk_and_pause() {
    let mut andon = station("a", 1.0);
    andon.andon_enabled = true;
    andon.andon_pause_ticks = Some(3);
    let config = line(vec![andon, station("b", 0.0)]);

    let (_, log) = run(&config, 60);

    let held_at = log.events_of_type("andonTriggered")[0].tick();
    let decided_at = log
        .events()
        .iter()
        .find(|e| matches!(e, Event::ManagerReverted { .. } | Event::ManagerRejected { .. }))
        .map(|e| e.tick())
        .unwrap();
    // Dispatched on the hold tick, one tick of walking, then the pause
    assert!(decided_at >= held_at + 3);
    assert!(decided_at <= held_at + 6);
}

// ============================================================================
// Jidoka
// ============================================================================

#[test]
fn test_line_stop_freezes_work_and_teaches() {
    // Market changes would reset what the line learns
    let mut jidoka = ScenarioId::Step4.line_config();
    jidoka.market_change = MarketChangeSchedule::Never;
    let config = SimConfig::resolve(jidoka).unwrap();
    let mut state = create_initial_state(&config);
    let mut stops_seen = 0;

    for _ in 0..4_000 {
        let open_all_tick = state
            .line_stop()
            .is_some_and(|stop| stop.until_tick > state.tick() + 1);
        let events = tick_in_place(&mut state, &config, TickInputs::default());

        if open_all_tick {
            stops_seen += 1;
            assert!(
                events.iter().all(|e| matches!(
                    e,
                    Event::ManagerReverted { .. }
                        | Event::ManagerRejected { .. }
                        | Event::MarketChangeTriggered { .. }
                )),
                "work happened during a line stop at tick {}: {:?}",
                state.tick(),
                events
            );
        }
    }

    assert!(stops_seen > 0, "no line stop in 4000 ticks");
    assert!(state.quality().iter().any(|q| q.defect_multiplier < 1.0));
    assert!(state.quality().iter().all(|q| q.defect_multiplier >= 0.2));
}

#[test]
fn test_red_bin_at_end_stops_line() {
    let mut last = station("b", 1.0);
    last.red_bin = true;
    last.red_bin_catch_probability = Some(0.0);
    let config = SimConfig::resolve(LineConfig {
        stations: vec![station("a", 0.0), last],
        jidoka_line_stop: true,
        ..Default::default()
    })
    .unwrap();

    let mut state = create_initial_state(&config);
    while state.rejected_at_end_count() == 0 && state.tick() < 200 {
        tick_in_place(&mut state, &config, TickInputs::default());
    }

    assert_eq!(state.rejected_at_end_count(), 1);
    let stop = state.line_stop().unwrap();
    assert_eq!(stop.station, 1);
    assert!(stop.until_tick >= state.tick() + 10);
    assert_eq!(state.total_defective_shipped(), 0);
}

// ============================================================================
// Rework
// ============================================================================

#[test]
fn test_rework_loops_items_upstream() {
    let mut rework = station("b", 1.0);
    rework.rework_sends_back = Some(true);
    let config = line(vec![station("a", 0.0), rework, station("c", 0.0)]);

    let (state, log) = run(&config, 300);

    let released = log.count_of_type("materialConsumed");
    let created = log.count_of_type("defectCreated");
    assert!(created > released, "items should cycle back through b");
    assert_eq!(state.total_completed(), 0);
    assert_eq!(state.total_defective_shipped(), 0);
    // Sent-back items come back clean to the upstream station
    assert!(state.items().all(|item| !item.is_defective));
}
