//! Market change
//!
//! An exogenous shift in demand invalidates work in progress: between one
//! and three stations are picked without replacement, every item physically
//! at those stations becomes defective, and their learned quality resets.

use crate::config::{MarketChangeSchedule, SimConfig, StationIdx};
use crate::models::{Event, ItemId, SimState};
use super::TickInputs;
use tracing::info;

/// Upper bound on stations hit by one market change
pub const MAX_MARKET_CHANGE_STATIONS: usize = 3;

/// Relative jitter applied to millisecond schedules
const INTERVAL_JITTER: f64 = 0.3;

/// Next due tick counted from `from_tick`
///
/// Millisecond schedules draw their jitter from the state's sampler.
pub(super) fn schedule_after(state: &mut SimState, config: &SimConfig, from_tick: u64) -> Option<u64> {
    match config.line().market_change {
        MarketChangeSchedule::Never => None,
        MarketChangeSchedule::EveryTicks { interval } => Some(from_tick.saturating_add(interval)),
        MarketChangeSchedule::EveryMillis { interval_ms } => {
            let u = state.rng.next_float();
            let factor = 1.0 + (u * 2.0 - 1.0) * INTERVAL_JITTER;
            Some(from_tick.saturating_add(config.clock().ticks_for_ms(interval_ms * factor)))
        }
    }
}

pub(super) fn run(state: &mut SimState, config: &SimConfig, inputs: TickInputs, events: &mut Vec<Event>) {
    let scheduled = state
        .next_market_change_tick
        .is_some_and(|due| state.tick >= due);
    if !(inputs.market_change_requested || scheduled) {
        return;
    }

    let stations = pick_stations(state, config.station_count());

    for &idx in &stations {
        let ids: Vec<ItemId> = state.stations[idx].all_items().collect();
        for id in ids {
            if let Some(item) = state.item_mut(id) {
                item.mark_defective(true);
            }
        }
        state.quality[idx].defect_multiplier = 1.0;
    }

    let station_ids: Vec<String> = stations
        .iter()
        .map(|&idx| config.stations()[idx].id.clone())
        .collect();
    info!(tick = state.tick, stations = ?station_ids, "market change");

    events.push(Event::MarketChangeTriggered {
        tick: state.tick,
        station_ids,
    });

    state.last_market_change_tick = Some(state.tick);
    let now = state.tick;
    state.next_market_change_tick = schedule_after(state, config, now);
}

/// Choose 1..=min(3, n) distinct stations
fn pick_stations(state: &mut SimState, n: usize) -> Vec<StationIdx> {
    let upper = MAX_MARKET_CHANGE_STATIONS.min(n) as i64;
    let count = state.rng.next_int(1, upper) as usize;

    let mut remaining: Vec<StationIdx> = (0..n).collect();
    let mut picked = Vec::with_capacity(count);
    for _ in 0..count {
        let pos = state.rng.next_int(0, remaining.len() as i64 - 1) as usize;
        picked.push(remaining.remove(pos));
    }
    picked
}
