//! Routing finished work
//!
//! The last station disposes of everything it has finished: good items
//! ship, defective items either ship to a customer or stay in its red bin.
//! Interior stations hand a full batch to the next station, directly when
//! no travel is configured, otherwise through a courier transfer.

use super::{line_stop, transfers};
use crate::config::{FlowMode, SimConfig, StationIdx};
use crate::models::{Event, SimState, Transfer};
use tracing::debug;

pub(super) fn route(state: &mut SimState, config: &SimConfig, events: &mut Vec<Event>) {
    let last = config.last_station();
    for idx in 0..last {
        match config.flow_mode() {
            FlowMode::Push => push(state, config, idx),
            FlowMode::Pull => pull(state, config, idx),
        }
    }
    ship(state, config, events);
}

fn ship(state: &mut SimState, config: &SimConfig, events: &mut Vec<Event>) {
    let last = config.last_station();
    let policy = &config.stations()[last];
    let tick = state.tick;

    let count = state.stations[last].finished_len();
    let finished = state.stations[last].take_finished(count, policy.batch_size, |_| true);
    for id in finished {
        let defective = state.is_defective(id);
        if defective && policy.red_bin {
            state.rejected_at_end_count += 1;
            state.bin_item(last, id);
            if config.jidoka_line_stop() {
                line_stop::trigger(state, config, last);
            }
            continue;
        }

        if let Some(item) = state.item_mut(id) {
            item.finish(tick);
        }
        if defective {
            events.push(Event::DefectShippedToCustomer { tick, item_id: id });
            state.record_defective_shipped(id);
        } else {
            state.record_completed(id);
        }
    }
}

fn push(state: &mut SimState, config: &SimConfig, from: StationIdx) {
    let to = from + 1;
    let src = &config.stations()[from];
    let batch = src.batch_size;

    if state.stations[from].finished_len() < batch {
        return;
    }
    if !state.input_accepts(to, config.stations()[to].input_limit, batch) {
        return;
    }
    if src.travel_ticks == 0 {
        let items = state.stations[from].take_finished(batch, batch, |_| true);
        transfers::deliver(state, to, items);
        return;
    }
    if state.courier_blocked(from) || state.courier_blocked(to) {
        return;
    }

    let items = state.stations[from].take_finished(batch, batch, |_| true);
    for id in &items {
        if let Some(item) = state.item_mut(*id) {
            item.station = to;
        }
    }
    let id = state.alloc_transfer_id();
    let transfer = Transfer::push(id, from, to, items, src.travel_ticks, src.cross_department);
    state.couriers[from].dispatch(&transfer);
    debug!(tick = state.tick, transfer = %id, from = %src.id, "push transfer dispatched");
    state.transfers.push(transfer);
}

fn pull(state: &mut SimState, config: &SimConfig, from: StationIdx) {
    let to = from + 1;
    let src = &config.stations()[from];
    let batch = src.batch_size;

    let sendable = state.stations[from]
        .finished()
        .filter(|id| transfers::pull_eligible(state, config, from, *id))
        .count();
    if sendable < batch || !downstream_ready(state, config, to) || state.courier_blocked(from) {
        return;
    }

    if src.travel_ticks == 0 {
        let room = state
            .input_headroom(to, config.stations()[to].input_limit)
            .unwrap_or(batch);
        let eligible: Vec<_> = state.stations[from]
            .finished()
            .filter(|id| transfers::pull_eligible(state, config, from, *id))
            .take(batch.min(room))
            .collect();
        let items = state.stations[from].take_finished(eligible.len(), batch, |id| eligible.contains(&id));
        transfers::deliver(state, to, items);
        return;
    }

    let id = state.alloc_transfer_id();
    let transfer = Transfer::pull(id, from, to, batch, src.travel_ticks, src.cross_department);
    state.couriers[to].dispatch(&transfer);
    debug!(tick = state.tick, transfer = %id, to = %config.stations()[to].id, "pull transfer dispatched");
    state.transfers.push(transfer);
}

/// A pull station signals readiness when it is idle and starved
fn downstream_ready(state: &SimState, config: &SimConfig, station: StationIdx) -> bool {
    let st = &state.stations[station];
    !state.is_paused(station)
        && st.andon_hold.is_none()
        && st.input_queue.is_empty()
        && st.free_slots(config.stations()[station].capacity) > 0
        && !state.courier_blocked(station)
}
