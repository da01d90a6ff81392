//! Item model
//!
//! An item is one unit of work moving down the line. Exactly one station
//! collection (or one in-flight transfer) holds its id at any instant; the
//! item record itself lives in the state's item table until evicted.

use crate::config::StationIdx;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of an item, allocated sequentially per run
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub u64);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "item-{}", self.0)
    }
}

/// Lifecycle status of an item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    /// Queued or buffered, not being worked on
    Waiting,
    /// In a processing slot
    Working,
    /// Shipped good
    Done,
    /// Shipped to a customer or binned while defective
    Defective,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub status: ItemStatus,
    /// Station currently responsible for the item (destination while in transit)
    pub station: StationIdx,
    pub remaining_work_ms: f64,
    pub created_at_tick: u64,
    pub completed_at_tick: Option<u64>,
    pub is_defective: bool,
    pub defect_from_market_change: bool,
    /// Station whose red bin last inspected this item
    pub inspected_at: Option<StationIdx>,
}

impl Item {
    /// Fresh raw material at `station`
    pub fn new(id: ItemId, station: StationIdx, tick: u64) -> Self {
        Self {
            id,
            status: ItemStatus::Waiting,
            station,
            remaining_work_ms: 0.0,
            created_at_tick: tick,
            completed_at_tick: None,
            is_defective: false,
            defect_from_market_change: false,
            inspected_at: None,
        }
    }

    pub fn mark_defective(&mut self, from_market_change: bool) {
        self.is_defective = true;
        self.defect_from_market_change |= from_market_change;
    }

    /// Clear the defect after rework or a manager fix
    pub fn clear_defect(&mut self) {
        self.is_defective = false;
        self.defect_from_market_change = false;
        self.inspected_at = None;
    }

    /// Hand the item to another station's queue
    pub fn move_to(&mut self, station: StationIdx) {
        self.station = station;
        self.status = ItemStatus::Waiting;
        self.remaining_work_ms = 0.0;
        self.inspected_at = None;
    }

    pub fn start_work(&mut self, work_ms: f64) {
        self.status = ItemStatus::Working;
        self.remaining_work_ms = work_ms;
    }

    /// Final disposition at the end of the line
    pub fn finish(&mut self, tick: u64) {
        self.completed_at_tick = Some(tick);
        self.status = if self.is_defective {
            ItemStatus::Defective
        } else {
            ItemStatus::Done
        };
    }

    /// Ticks from creation to completion
    pub fn lead_time_ticks(&self) -> Option<u64> {
        self.completed_at_tick
            .map(|done| done.saturating_sub(self.created_at_tick))
    }
}
