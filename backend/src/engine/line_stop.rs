//! Jidoka line stop
//!
//! A rejected defect with line stop enabled pauses every station and
//! freezes every courier at the triggering station. When the window
//! closes, the triggering station's defective backlog goes to its red bin,
//! all pause timers clear, couriers resume or go home, and the station's
//! quality improves by one learning step.

use crate::config::{SimConfig, StationIdx};
use crate::models::{CourierStatus, ItemId, LineStop, SimState};
use tracing::info;

/// Shortest line-stop window in ticks
pub const MIN_LINE_STOP_TICKS: u64 = 10;

/// Close the window once its end tick has been reached
pub(super) fn housekeeping(state: &mut SimState, config: &SimConfig) {
    let Some(stop) = state.jidoka else {
        return;
    };
    if state.tick >= stop.until_tick {
        close(state, config, stop);
    }
}

/// Stop the line because of a rejection at `station`
///
/// A stop raised while one is active only extends the window.
pub(super) fn trigger(state: &mut SimState, config: &SimConfig, station: StationIdx) {
    let andon_pause = config.stations()[station].andon_pause_ticks;
    let duration = MIN_LINE_STOP_TICKS.max(config.max_travel_ticks().saturating_add(andon_pause));
    let until_tick = state.tick.saturating_add(duration);

    match state.jidoka.as_mut() {
        Some(stop) => stop.until_tick = stop.until_tick.max(until_tick),
        None => {
            state.jidoka = Some(LineStop {
                station,
                until_tick,
            })
        }
    }

    for quality in &mut state.quality {
        quality.pause_until(until_tick);
    }
    for courier in &mut state.couriers {
        courier.status = CourierStatus::Walking;
        courier.from = Some(courier.home);
        courier.to = Some(station);
    }

    info!(
        tick = state.tick,
        station = %config.stations()[station].id,
        until_tick,
        "line stopped"
    );
}

fn close(state: &mut SimState, config: &SimConfig, stop: LineStop) {
    let idx = stop.station;
    let policy = &config.stations()[idx];

    if policy.red_bin {
        let st = &state.stations[idx];
        let backlog: Vec<ItemId> = st
            .input_queue
            .iter()
            .copied()
            .chain(st.finished())
            .filter(|id| state.is_defective(*id))
            .collect();

        for id in backlog {
            let st = &mut state.stations[idx];
            st.input_queue.retain(|queued| *queued != id);
            st.remove_finished(id, policy.batch_size);
            state.bin_item(idx, id);
        }
    }

    for quality in &mut state.quality {
        quality.pause_until_tick = None;
    }

    // Couriers with a live transfer pick up where they froze
    for courier in &mut state.couriers {
        let transfer = courier
            .carrying
            .and_then(|id| state.transfers.iter().find(|t| t.id == id));
        match transfer {
            Some(t) => {
                courier.status = CourierStatus::Walking;
                courier.from = Some(t.from);
                courier.to = Some(t.to);
            }
            None => courier.send_home(),
        }
    }

    state.quality[idx].learn();
    state.jidoka = None;

    info!(
        tick = state.tick,
        station = %policy.id,
        defect_multiplier = state.quality[idx].defect_multiplier,
        "line restarted"
    );
}
