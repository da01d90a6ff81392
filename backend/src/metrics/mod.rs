//! Read-only line metrics
//!
//! Pure functions over a state (and its config). Nothing here mutates or
//! samples; front ends call these once per tick for display.

use crate::config::{FlowMode, SimConfig, StationIdx};
use crate::models::SimState;
use serde::Serialize;

/// Percentage attributed to one station
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationPercent {
    pub station_id: String,
    pub percent: f64,
}

/// Line utilisation snapshot
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IdleBlocked {
    /// Share of total capacity with no item in process
    pub idle_percent: f64,
    /// Share of stations whose outbound buffer is saturated (pull only)
    pub blocked_percent: f64,
}

/// Items on the line: every station collection, andon holds, and items
/// riding a transfer
pub fn get_wip(state: &SimState) -> usize {
    let at_stations: usize = state.stations().iter().map(|st| st.wip()).sum();
    let in_transit: usize = state.transfers().iter().map(|t| t.item_ids.len()).sum();
    at_stations + in_transit
}

/// WIP that accrues inventory cost
///
/// Defective items resting at a red-bin station are already written off.
pub fn get_wip_for_inventory_cost(state: &SimState, config: &SimConfig) -> usize {
    let written_off: usize = config
        .stations()
        .iter()
        .filter(|p| p.red_bin)
        .map(|p| {
            state.stations()[p.index]
                .all_items()
                .filter(|id| state.item(*id).is_some_and(|item| item.is_defective))
                .count()
        })
        .sum();
    get_wip(state) - written_off
}

pub fn get_station_wip(state: &SimState, station: StationIdx) -> usize {
    state.station(station).map_or(0, |st| st.wip())
}

/// Good items shipped since `completed_before`
pub fn get_throughput(state: &SimState, completed_before: u64) -> u64 {
    state.total_completed().saturating_sub(completed_before)
}

/// Mean lead time in simulated ms over the completed-item history
pub fn get_lead_time_avg(state: &SimState, config: &SimConfig) -> f64 {
    let lead_times: Vec<u64> = state
        .completed_ids()
        .iter()
        .filter_map(|id| state.item(*id))
        .filter_map(|item| item.lead_time_ticks())
        .collect();
    if lead_times.is_empty() {
        return 0.0;
    }
    let total: u64 = lead_times.iter().sum();
    total as f64 * config.ms_per_tick() / lead_times.len() as f64
}

/// Defective items shipped to customers over the whole run
pub fn get_defects_count(state: &SimState) -> u64 {
    state.total_defective_shipped()
}

/// Share of finished outcomes that were binned
pub fn get_measured_defect_percent(state: &SimState) -> f64 {
    let rejected = state.total_rejected();
    let total = state.total_completed() + rejected;
    if total == 0 {
        return 0.0;
    }
    rejected as f64 / total as f64 * 100.0
}

/// Binned items per work completion, by station
pub fn get_measured_defect_percent_by_station(state: &SimState, config: &SimConfig) -> Vec<StationPercent> {
    config
        .stations()
        .iter()
        .map(|p| {
            let st = &state.stations()[p.index];
            let percent = if st.processed_count == 0 {
                0.0
            } else {
                st.defect_count as f64 / st.processed_count as f64 * 100.0
            };
            StationPercent {
                station_id: p.id.clone(),
                percent,
            }
        })
        .collect()
}

/// Current effective defect probability, by station
pub fn get_defect_probability_percent_by_station(state: &SimState, config: &SimConfig) -> Vec<StationPercent> {
    config
        .stations()
        .iter()
        .map(|p| StationPercent {
            station_id: p.id.clone(),
            percent: p.effective_defect_probability(state.quality()[p.index].defect_multiplier) * 100.0,
        })
        .collect()
}

pub fn get_idle_blocked_percent(state: &SimState, config: &SimConfig) -> IdleBlocked {
    let capacity = config.total_capacity();
    let busy: usize = state.stations().iter().map(|st| st.in_process.len()).sum();
    let idle_percent = if capacity == 0 {
        0.0
    } else {
        capacity.saturating_sub(busy) as f64 / capacity as f64 * 100.0
    };

    let blocked = match config.flow_mode() {
        FlowMode::Push => 0,
        FlowMode::Pull => config
            .stations()
            .iter()
            .filter(|p| state.stations()[p.index].batch_buffer.len() >= p.batch_size)
            .count(),
    };
    let blocked_percent = blocked as f64 / config.station_count() as f64 * 100.0;

    IdleBlocked {
        idle_percent,
        blocked_percent,
    }
}
