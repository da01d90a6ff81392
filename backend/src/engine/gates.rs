//! Red-bin quality gates
//!
//! Every defective finished item at a red-bin station is inspected once.
//! A catch bins it; a miss lets it continue downstream still defective.

use crate::config::SimConfig;
use crate::models::{Event, ItemId, SimState};

pub(super) fn inspect(state: &mut SimState, config: &SimConfig, events: &mut Vec<Event>) {
    for policy in config.stations().iter().filter(|p| p.red_bin) {
        let idx = policy.index;
        let pending: Vec<ItemId> = state.stations[idx]
            .finished()
            .filter(|id| {
                state
                    .item(*id)
                    .is_some_and(|item| item.is_defective && item.inspected_at != Some(idx))
            })
            .collect();

        for id in pending {
            if state.rng.chance(policy.catch_probability) {
                state.stations[idx].remove_finished(id, policy.batch_size);
                state.bin_item(idx, id);
                events.push(Event::DefectCaught {
                    tick: state.tick,
                    station_id: policy.id.clone(),
                    item_id: id,
                });
            } else if let Some(item) = state.item_mut(id) {
                item.inspected_at = Some(idx);
            }
        }
    }
}
