//! Market Change Tests
//!
//! Critical invariants tested:
//! - Scheduled changes fire on their tick, requested ones immediately
//! - 1..=3 distinct stations are picked
//! - Every item resting at a picked station turns defective
//! - Picked stations forget what they learned

use line_simulator_core_rs::config::presets::ScenarioId;
use line_simulator_core_rs::config::{MarketChangeSchedule, SimConfig};
use line_simulator_core_rs::engine::{create_initial_state, tick, tick_in_place, TickInputs};
use line_simulator_core_rs::models::{Event, ItemId};
use std::collections::HashSet;

// ============================================================================
// Test Helpers
// ============================================================================

fn with_schedule(scenario: ScenarioId, schedule: MarketChangeSchedule) -> SimConfig {
    let mut line = scenario.line_config();
    line.market_change = schedule;
    SimConfig::resolve(line).unwrap()
}

fn market_ticks(config: &SimConfig, ticks: u64) -> Vec<u64> {
    let mut state = create_initial_state(config);
    let mut fired = Vec::new();
    for _ in 0..ticks {
        for event in tick_in_place(&mut state, config, TickInputs::default()) {
            if let Event::MarketChangeTriggered { tick, .. } = event {
                fired.push(tick);
            }
        }
    }
    fired
}

fn picked(events: &[Event]) -> Vec<String> {
    events
        .iter()
        .find_map(|e| match e {
            Event::MarketChangeTriggered { station_ids, .. } => Some(station_ids.clone()),
            _ => None,
        })
        .unwrap_or_default()
}

// ============================================================================
// Scheduling
// ============================================================================

#[test]
fn test_never_schedule_stays_quiet() {
    let config = with_schedule(ScenarioId::Intro, MarketChangeSchedule::Never);
    assert!(create_initial_state(&config).next_market_change_tick().is_none());
    assert!(market_ticks(&config, 2_000).is_empty());
}

#[test]
fn test_every_ticks_schedule() {
    let config = with_schedule(ScenarioId::Intro, MarketChangeSchedule::EveryTicks { interval: 50 });
    assert_eq!(market_ticks(&config, 220), vec![50, 100, 150, 200]);
}

#[test]
fn test_presets_change_every_600_ticks() {
    for scenario in [ScenarioId::Intro, ScenarioId::Step1, ScenarioId::Step8, ScenarioId::Playground] {
        let config = scenario.config().unwrap();
        assert_eq!(create_initial_state(&config).next_market_change_tick(), Some(600));
        assert_eq!(market_ticks(&config, 3_000), vec![600, 1_200, 1_800, 2_400, 3_000], "{}", scenario);
    }
}

#[test]
fn test_every_millis_schedule_jitters() {
    // 10 s at 20 ticks/s is 200 ticks, ±30 %
    let config = with_schedule(
        ScenarioId::Intro,
        MarketChangeSchedule::EveryMillis { interval_ms: 10_000.0 },
    );
    let fired = market_ticks(&config, 3_000);
    assert!(fired.len() >= 10, "only {} changes", fired.len());

    let mut gaps = vec![fired[0]];
    gaps.extend(fired.windows(2).map(|w| w[1] - w[0]));
    assert!(gaps.iter().all(|g| (140..=260).contains(g)), "gaps out of range: {:?}", gaps);
    assert!(gaps.iter().collect::<HashSet<_>>().len() > 1, "no jitter: {:?}", gaps);
}

// ============================================================================
// Effects
// ============================================================================

#[test]
fn test_requested_change_picks_distinct_stations() {
    let config = ScenarioId::Intro.config().unwrap();
    let mut state = create_initial_state(&config);
    let mut sizes = HashSet::new();

    for _ in 0..60 {
        let events = tick_in_place(&mut state, &config, TickInputs::market_change());
        let ids = picked(&events);
        assert!((1..=3).contains(&ids.len()));
        assert_eq!(ids.iter().collect::<HashSet<_>>().len(), ids.len());
        assert!(ids.iter().all(|id| config.station_index(id).is_some()));
        assert_eq!(state.last_market_change_tick(), Some(state.tick()));
        sizes.insert(ids.len());
    }
    assert_eq!(sizes.len(), 3, "every pick size should occur");
}

#[test]
fn test_items_at_picked_stations_turn_defective() {
    let config = ScenarioId::Intro.config().unwrap();
    let mut state = create_initial_state(&config);
    for _ in 0..400 {
        tick_in_place(&mut state, &config, TickInputs::default());
    }

    let result = tick(&state, &config, TickInputs::market_change());
    let ids = picked(&result.events);

    let mut marked = 0;
    for station_id in &ids {
        let idx = config.station_index(station_id).unwrap();
        let resting: Vec<ItemId> = state.stations()[idx].all_items().collect();
        for id in resting {
            if let Some(item) = result.state.item(id) {
                assert!(item.is_defective, "{} at {} not marked", id, station_id);
                assert!(item.defect_from_market_change);
                marked += 1;
            }
        }
        assert_eq!(result.state.quality()[idx].defect_multiplier, 1.0);
    }

    let untouched: Vec<ItemId> = state
        .stations()
        .iter()
        .enumerate()
        .filter(|(idx, _)| !ids.contains(&config.stations()[*idx].id))
        .flat_map(|(_, st)| st.all_items().collect::<Vec<_>>())
        .collect();
    assert!(untouched.iter().all(|id| result
        .state
        .item(*id)
        .map_or(true, |item| !item.defect_from_market_change)));
    assert!(marked + untouched.len() > 0);
}

#[test]
fn test_change_resets_learning() {
    let config = ScenarioId::Step4.config().unwrap();
    let mut state = create_initial_state(&config);
    while state.quality().iter().all(|q| q.defect_multiplier == 1.0) {
        assert!(state.tick() < 10_000, "no learning happened");
        tick_in_place(&mut state, &config, TickInputs::default());
    }

    let learned: Vec<usize> = state
        .quality()
        .iter()
        .enumerate()
        .filter(|(_, q)| q.defect_multiplier < 1.0)
        .map(|(i, _)| i)
        .collect();

    // Keep requesting until a learned station is hit
    for _ in 0..200 {
        let events = tick_in_place(&mut state, &config, TickInputs::market_change());
        let hit: Vec<usize> = picked(&events)
            .iter()
            .filter_map(|id| config.station_index(id))
            .collect();
        for idx in &hit {
            assert_eq!(state.quality()[*idx].defect_multiplier, 1.0);
        }
        if hit.iter().any(|idx| learned.contains(idx)) {
            return;
        }
    }
    panic!("no learned station picked in 200 changes");
}
