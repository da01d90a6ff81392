//! Station work: advancing in-process slots, completing items, and
//! starting new work from the input queue.

use crate::config::{FlowMode, SimConfig, StationIdx, StationPolicy};
use crate::models::{Event, InProcessSlot, ItemId, ItemStatus, SimState};
use tracing::debug;

/// Advance every in-process slot at non-paused stations by one tick of
/// simulated time and complete the items whose work is done
pub(super) fn advance(state: &mut SimState, config: &SimConfig, events: &mut Vec<Event>) {
    let ms_per_tick = config.ms_per_tick();

    for policy in config.stations() {
        let idx = policy.index;
        if state.is_paused(idx) {
            continue;
        }

        let mut completed = Vec::new();
        let st = &mut state.stations[idx];
        for slot in &mut st.in_process {
            slot.remaining_work_ms -= ms_per_tick;
        }
        st.in_process.retain(|slot| {
            if slot.remaining_work_ms <= 0.0 {
                completed.push(slot.item_id);
                false
            } else {
                true
            }
        });

        for slot in &state.stations[idx].in_process {
            if let Some(item) = state.items.get_mut(&slot.item_id) {
                item.remaining_work_ms = slot.remaining_work_ms;
            }
        }

        for id in completed {
            complete(state, config, policy, id, events);
        }
    }
}

fn complete(
    state: &mut SimState,
    config: &SimConfig,
    policy: &StationPolicy,
    id: ItemId,
    events: &mut Vec<Event>,
) {
    let idx = policy.index;
    let tick = state.tick;
    state.stations[idx].processed_count += 1;

    if let Some(item) = state.item_mut(id) {
        item.status = ItemStatus::Waiting;
        item.remaining_work_ms = 0.0;
    }

    let probability = policy.effective_defect_probability(state.quality[idx].defect_multiplier);
    if !state.rng.chance(probability) {
        state.stations[idx].stash_finished(id, policy.batch_size);
        return;
    }

    state.stations[idx].defect_created_count += 1;
    events.push(Event::DefectCreated {
        tick,
        station_id: policy.id.clone(),
        item_id: id,
    });

    if policy.holds_for_manager && state.stations[idx].andon_hold.is_none() {
        hold_for_manager(state, policy, id, events);
        return;
    }

    if policy.rework_sends_back && idx > 0 && send_back(state, config, idx - 1, id) {
        return;
    }

    if let Some(item) = state.item_mut(id) {
        item.mark_defective(false);
    }
    state.stations[idx].stash_finished(id, policy.batch_size);
}

fn hold_for_manager(state: &mut SimState, policy: &StationPolicy, id: ItemId, events: &mut Vec<Event>) {
    let idx = policy.index;
    if let Some(item) = state.item_mut(id) {
        item.mark_defective(false);
    }
    state.stations[idx].andon_hold = Some(id);
    state.quality[idx].last_andon_tick = Some(state.tick);
    if !state.pending_andon.contains(&idx) {
        state.pending_andon.push_back(idx);
    }

    debug!(tick = state.tick, station = %policy.id, item = %id, "andon raised");
    events.push(Event::AndonTriggered {
        tick: state.tick,
        station_id: policy.id.clone(),
        item_id: id,
    });
}

/// Requeue a defective item for rework upstream; false when the upstream
/// input queue is full
fn send_back(state: &mut SimState, config: &SimConfig, prev: StationIdx, id: ItemId) -> bool {
    let limit = config.stations()[prev].input_limit;
    if !state.input_accepts(prev, limit, 1) {
        return false;
    }
    if let Some(item) = state.item_mut(id) {
        item.clear_defect();
        item.move_to(prev);
    }
    state.stations[prev].input_queue.push_back(id);
    true
}

/// Move queued items into free work slots at every available station
pub(super) fn start(state: &mut SimState, config: &SimConfig) {
    let pull = config.flow_mode() == FlowMode::Pull;

    for policy in config.stations() {
        let idx = policy.index;
        if state.is_paused(idx) || state.stations[idx].andon_hold.is_some() {
            continue;
        }
        if pull && state.stations[idx].batch_buffer.len() >= policy.batch_size {
            continue;
        }

        let free = state.stations[idx].free_slots(policy.capacity);
        for _ in 0..free {
            let Some(id) = state.stations[idx].input_queue.pop_front() else {
                break;
            };
            let work_ms = state
                .rng
                .sample_cycle_time(policy.cycle_time_ms, policy.cycle_variance);
            state.stations[idx].in_process.push(InProcessSlot {
                item_id: id,
                remaining_work_ms: work_ms,
            });
            if let Some(item) = state.item_mut(id) {
                item.start_work(work_ms);
            }
        }
    }
}
