//! Cost Rates
//!
//! Economic parameters of a line. All monetary values are i64 minor units.

use serde::{Deserialize, Serialize};

/// Cost Rates Configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostRates {
    /// Revenue for each good item shipped
    pub revenue_per_item: i64,

    /// Labor cost per tick for each employee (one employee per capacity slot)
    pub labor_cost_per_tick_per_employee: i64,

    /// Holding cost per tick for each item of work in process
    pub inventory_cost_per_item_per_tick: i64,

    /// Material cost charged when an item is released onto the line
    pub material_cost_per_item: i64,

    /// Cost of each defective item that reaches a customer
    pub defect_cost_customer_shipped: i64,

    /// Starting cash; cumulative profit is seeded with it
    pub initial_investment: i64,
}

impl Default for CostRates {
    fn default() -> Self {
        Self {
            revenue_per_item: 20_000,
            labor_cost_per_tick_per_employee: 15,
            inventory_cost_per_item_per_tick: 2,
            material_cost_per_item: 500,
            defect_cost_customer_shipped: 500,
            initial_investment: 1_000_000,
        }
    }
}
