//! Manager dispatch
//!
//! A single manager walks to stations with an andon hold, in the order the
//! holds were raised. Arrival pauses the station for its andon pause
//! duration; at the end of it the manager either fixes the held item or
//! scraps it, which stops the line when jidoka is enabled.

use super::line_stop;
use crate::config::{SimConfig, StationIdx};
use crate::models::{Event, SimState};
use tracing::debug;

/// Ticks for the manager to reach a station
pub const MANAGER_TRAVEL_TICKS: u64 = 1;

pub(super) fn run(state: &mut SimState, config: &SimConfig, events: &mut Vec<Event>) {
    let tick = state.tick;

    if state.manager.is_idle() && !dispatch_next(state) {
        return;
    }
    let Some(station) = state.manager.to else {
        return;
    };

    match (state.manager.arrives_at_tick, state.manager.resolves_at_tick) {
        (Some(arrives), None) if tick >= arrives => {
            let pause = config.stations()[station].andon_pause_ticks.max(1);
            let resolves = tick.saturating_add(pause);
            state.manager.resolves_at_tick = Some(resolves);
            state.quality[station].pause_until(resolves);
            debug!(tick, station = %config.stations()[station].id, resolves, "manager arrived");
        }
        (_, Some(resolves)) if tick >= resolves => {
            resolve(state, config, station, events);
            state.manager.from = Some(station);
            if !dispatch_next(state) {
                state.manager.go_home();
            }
        }
        _ => {}
    }
}

/// Send the manager to the oldest pending station; false if none
fn dispatch_next(state: &mut SimState) -> bool {
    match state.pending_andon.pop_front() {
        Some(next) => {
            let arrives = state.tick + MANAGER_TRAVEL_TICKS;
            state.manager.walk_to(next, arrives);
            true
        }
        None => false,
    }
}

fn resolve(state: &mut SimState, config: &SimConfig, station: StationIdx, events: &mut Vec<Event>) {
    let policy = &config.stations()[station];
    let Some(id) = state.stations[station].andon_hold.take() else {
        return;
    };
    let tick = state.tick;

    if state.rng.chance(config.manager_revert_probability()) {
        if let Some(item) = state.item_mut(id) {
            item.clear_defect();
        }
        state.stations[station].stash_finished(id, policy.batch_size);
        events.push(Event::ManagerReverted {
            tick,
            station_id: policy.id.clone(),
            item_id: id,
        });
    } else {
        state.bin_item(station, id);
        events.push(Event::ManagerRejected {
            tick,
            station_id: policy.id.clone(),
            item_id: id,
        });
        if config.jidoka_line_stop() {
            line_stop::trigger(state, config, station);
        }
    }
}
