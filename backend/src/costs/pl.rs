//! Profit and loss
//!
//! Per tick:
//! - revenue: good items shipped × revenue per item
//! - labor: every capacity slot on the line is one paid employee
//! - inventory: WIP, excluding defective stock resting in red bins
//! - material: one charge per `MaterialConsumed` event
//! - defects: one charge per `DefectShippedToCustomer` event
//!
//! Each row also carries the counts the costs were derived from (employee
//! ticks, WIP, defects created) so averages can be recovered from the
//! cumulative series.
//!
//! # Example
//!
//! ```rust
//! use line_simulator_core_rs::config::presets::get_initial_config;
//! use line_simulator_core_rs::costs::{add_tick_pl_to_cumulative, compute_tick_pl};
//! use line_simulator_core_rs::engine::{create_initial_state, tick, TickInputs};
//!
//! let config = get_initial_config("intro").unwrap();
//! let state = create_initial_state(&config);
//! let result = tick(&state, &config, TickInputs::default());
//!
//! let pl = compute_tick_pl(&result.state, &config, state.total_completed(), &result.events);
//! assert_eq!(pl.material_units, 6);
//!
//! let investment = config.cost_rates().initial_investment;
//! let cumulative = add_tick_pl_to_cumulative(None, &pl, investment);
//! assert_eq!(cumulative.cumulative_profit, investment + pl.profit);
//! ```

use crate::config::SimConfig;
use crate::metrics::get_wip_for_inventory_cost;
use crate::models::{Event, SimState};
use serde::{Deserialize, Serialize};

/// Profit and loss of a single tick
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickPl {
    pub tick: u64,
    pub revenue: i64,
    pub labor_cost: i64,
    pub inventory_cost: i64,
    pub material_cost: i64,
    pub material_units: u64,
    pub defect_cost: i64,
    pub profit: i64,
    /// Good items shipped this tick
    pub completed_count: u64,
    /// Defective items shipped to customers this tick
    pub defects_shipped: u64,
    /// Employee-ticks paid this tick
    pub labor_ticks: u64,
    /// Inventory-cost WIP at the end of the tick
    pub wip: u64,
    /// Defects created by station work this tick
    pub defect_count: u64,
}

/// Running totals up to and including `tick`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CumulativePl {
    pub tick: u64,
    pub cumulative_revenue: i64,
    pub cumulative_labor_cost: i64,
    pub cumulative_inventory_cost: i64,
    pub cumulative_material_cost: i64,
    pub cumulative_material_units: u64,
    pub cumulative_defect_cost: i64,
    /// Includes the initial investment
    pub cumulative_profit: i64,
    pub cumulative_completed: u64,
    pub cumulative_labor_ticks: u64,
    /// Sum of per-tick WIP; divide by ticks elapsed for the average
    pub cumulative_wip_sum: u64,
    pub cumulative_defects: u64,
}

impl CumulativePl {
    /// Mean inventory-cost WIP over a series that started at tick 1
    pub fn average_wip(&self) -> f64 {
        if self.tick == 0 {
            0.0
        } else {
            self.cumulative_wip_sum as f64 / self.tick as f64
        }
    }
}

/// P&L of the tick that produced `state` and `events`
///
/// `completed_before` is `total_completed()` of the state the tick started from.
pub fn compute_tick_pl(state: &SimState, config: &SimConfig, completed_before: u64, events: &[Event]) -> TickPl {
    let rates = config.cost_rates();

    let completed_count = state.total_completed().saturating_sub(completed_before);
    let material_units = events
        .iter()
        .filter(|e| matches!(e, Event::MaterialConsumed { .. }))
        .count() as u64;
    let defects_shipped = events
        .iter()
        .filter(|e| matches!(e, Event::DefectShippedToCustomer { .. }))
        .count() as u64;
    let defect_count = events
        .iter()
        .filter(|e| matches!(e, Event::DefectCreated { .. }))
        .count() as u64;
    let labor_ticks = config.total_capacity() as u64;
    let wip = get_wip_for_inventory_cost(state, config) as u64;

    let revenue = completed_count as i64 * rates.revenue_per_item;
    let labor_cost = labor_ticks as i64 * rates.labor_cost_per_tick_per_employee;
    let inventory_cost = wip as i64 * rates.inventory_cost_per_item_per_tick;
    let material_cost = material_units as i64 * rates.material_cost_per_item;
    let defect_cost = defects_shipped as i64 * rates.defect_cost_customer_shipped;

    TickPl {
        tick: state.tick(),
        revenue,
        labor_cost,
        inventory_cost,
        material_cost,
        material_units,
        defect_cost,
        profit: revenue - labor_cost - inventory_cost - material_cost - defect_cost,
        completed_count,
        defects_shipped,
        labor_ticks,
        wip,
        defect_count,
    }
}

/// Fold one tick into the running totals
///
/// With no previous row the fold starts from `initial_investment`.
pub fn add_tick_pl_to_cumulative(prev: Option<&CumulativePl>, tick_pl: &TickPl, initial_investment: i64) -> CumulativePl {
    let base = prev.cloned().unwrap_or(CumulativePl {
        cumulative_profit: initial_investment,
        ..Default::default()
    });

    CumulativePl {
        tick: tick_pl.tick,
        cumulative_revenue: base.cumulative_revenue + tick_pl.revenue,
        cumulative_labor_cost: base.cumulative_labor_cost + tick_pl.labor_cost,
        cumulative_inventory_cost: base.cumulative_inventory_cost + tick_pl.inventory_cost,
        cumulative_material_cost: base.cumulative_material_cost + tick_pl.material_cost,
        cumulative_material_units: base.cumulative_material_units + tick_pl.material_units,
        cumulative_defect_cost: base.cumulative_defect_cost + tick_pl.defect_cost,
        cumulative_profit: base.cumulative_profit + tick_pl.profit,
        cumulative_completed: base.cumulative_completed + tick_pl.completed_count,
        cumulative_labor_ticks: base.cumulative_labor_ticks + tick_pl.labor_ticks,
        cumulative_wip_sum: base.cumulative_wip_sum + tick_pl.wip,
        cumulative_defects: base.cumulative_defects + tick_pl.defect_count,
    }
}

/// Cumulative series for a whole tick history
pub fn compute_cumulative_pl(history: &[TickPl], initial_investment: i64) -> Vec<CumulativePl> {
    let mut series: Vec<CumulativePl> = Vec::with_capacity(history.len());
    for row in history {
        let next = add_tick_pl_to_cumulative(series.last(), row, initial_investment);
        series.push(next);
    }
    series
}
