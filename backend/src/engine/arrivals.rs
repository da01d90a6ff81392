//! Raw-material arrivals at the first station
//!
//! A batch is released only when the first station can take it: not
//! paused, no andon hold, no courier mid-trip, a free work slot, and room in
//! its input queue (an empty queue when no limit is configured).

use crate::config::SimConfig;
use crate::models::{Event, Item, SimState};

pub(super) fn release(state: &mut SimState, config: &SimConfig, events: &mut Vec<Event>) {
    let policy = &config.stations()[0];
    let st = &state.stations[0];

    let ready = !state.is_paused(0)
        && st.andon_hold.is_none()
        && !state.courier_blocked(0)
        && st.free_slots(policy.capacity) > 0;
    let room = match policy.input_limit {
        Some(_) => state.input_accepts(0, policy.input_limit, policy.batch_size),
        None => st.input_queue.is_empty(),
    };
    if !(ready && room) {
        return;
    }

    let tick = state.tick;
    for _ in 0..policy.batch_size {
        let id = state.alloc_item_id();
        state.items.insert(id, Item::new(id, 0, tick));
        state.stations[0].input_queue.push_back(id);
        events.push(Event::MaterialConsumed { tick, item_id: id });
    }
}
