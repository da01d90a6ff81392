//! Transfer advancement
//!
//! Each in-flight transfer walks one tick. Leg completions:
//! - push outbound: deliver the carried batch, walk back empty
//! - pull outbound: pick up a batch at the source, walk back loaded
//! - return: free the courier; pull transfers deliver their batch now

use crate::config::{SimConfig, StationIdx};
use crate::models::{ItemId, SimState, TransferId, TransferPhase};

pub(super) fn advance(state: &mut SimState, config: &SimConfig) {
    let mut done: Vec<TransferId> = Vec::new();

    for pos in 0..state.transfers.len() {
        let transfer = &mut state.transfers[pos];
        transfer.remaining_ticks = transfer.remaining_ticks.saturating_sub(1);
        state.couriers[transfer.courier].progress = transfer.leg_progress();
        if transfer.remaining_ticks > 0 {
            continue;
        }

        match (transfer.phase, transfer.is_pull) {
            (TransferPhase::Outbound, false) => {
                let (to, items) = (transfer.to, std::mem::take(&mut transfer.item_ids));
                transfer.turn_around();
                deliver(state, to, items);
            }
            (TransferPhase::Outbound, true) => {
                let (from, to, batch) = (transfer.from, transfer.to, transfer.pull_batch_size);
                let items = pick_up(state, config, from, to, batch);
                let transfer = &mut state.transfers[pos];
                transfer.item_ids = items;
                transfer.turn_around();
            }
            (TransferPhase::Return, is_pull) => {
                let (id, to, courier) = (transfer.id, transfer.to, transfer.courier);
                let items = std::mem::take(&mut transfer.item_ids);
                state.couriers[courier].send_home();
                if is_pull {
                    deliver(state, to, items);
                }
                done.push(id);
            }
        }
    }

    if !done.is_empty() {
        state.transfers.retain(|t| !done.contains(&t.id));
    }
}

/// Whether a finished item at `station` may be fetched by a pull
///
/// Red-bin stations hold back defective items their gate has not seen.
pub(super) fn pull_eligible(state: &SimState, config: &SimConfig, station: StationIdx, id: ItemId) -> bool {
    if !config.stations()[station].red_bin {
        return true;
    }
    state
        .item(id)
        .map_or(true, |item| !item.is_defective || item.inspected_at == Some(station))
}

/// Append items to a station's input queue
pub(super) fn deliver(state: &mut SimState, to: StationIdx, items: Vec<ItemId>) {
    for id in items {
        if let Some(item) = state.item_mut(id) {
            item.move_to(to);
        }
        state.stations[to].input_queue.push_back(id);
    }
}

fn pick_up(state: &mut SimState, config: &SimConfig, from: StationIdx, to: StationIdx, batch: usize) -> Vec<ItemId> {
    let room = state
        .input_headroom(to, config.stations()[to].input_limit)
        .unwrap_or(batch);
    let count = batch.min(room);
    let source_batch = config.stations()[from].batch_size;

    let eligible: Vec<ItemId> = state.stations[from]
        .finished()
        .filter(|id| pull_eligible(state, config, from, *id))
        .take(count)
        .collect();
    let taken = state.stations[from].take_finished(count, source_batch, |id| eligible.contains(&id));

    for id in &taken {
        if let Some(item) = state.item_mut(*id) {
            item.station = to;
        }
    }
    taken
}
