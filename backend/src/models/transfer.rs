//! Transfers and couriers
//!
//! A transfer moves a batch between two adjacent stations in two legs:
//! `Outbound` (courier walks to the far end) then `Return` (courier walks
//! back). Push transfers carry their items on the outbound leg. Pull
//! transfers walk out empty, pick the batch up on arrival, and deposit it
//! when the return leg completes.
//!
//! Each station owns one courier. A walking courier blocks both ends of its
//! trip from starting another transfer.

use super::item::ItemId;
use crate::config::StationIdx;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransferId(pub u64);

impl fmt::Display for TransferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "transfer-{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferPhase {
    Outbound,
    Return,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transfer {
    pub id: TransferId,
    pub item_ids: Vec<ItemId>,
    pub from: StationIdx,
    pub to: StationIdx,
    pub remaining_ticks: u64,
    pub phase_ticks_total: u64,
    pub phase: TransferPhase,
    /// Home station of the courier doing the walking
    pub courier: StationIdx,
    pub cross_department: bool,
    pub is_pull: bool,
    /// Items to fetch on a pull pickup
    pub pull_batch_size: usize,
}

impl Transfer {
    /// Push transfer carrying `item_ids` from `from` to `to`
    pub fn push(
        id: TransferId,
        from: StationIdx,
        to: StationIdx,
        item_ids: Vec<ItemId>,
        travel_ticks: u64,
        cross_department: bool,
    ) -> Self {
        Self {
            id,
            item_ids,
            from,
            to,
            remaining_ticks: travel_ticks,
            phase_ticks_total: travel_ticks,
            phase: TransferPhase::Outbound,
            courier: from,
            cross_department,
            is_pull: false,
            pull_batch_size: 0,
        }
    }

    /// Pull transfer: the destination's courier walks out to fetch a batch
    pub fn pull(
        id: TransferId,
        from: StationIdx,
        to: StationIdx,
        batch_size: usize,
        travel_ticks: u64,
        cross_department: bool,
    ) -> Self {
        Self {
            id,
            item_ids: Vec::new(),
            from,
            to,
            remaining_ticks: travel_ticks,
            phase_ticks_total: travel_ticks,
            phase: TransferPhase::Outbound,
            courier: to,
            cross_department,
            is_pull: true,
            pull_batch_size: batch_size,
        }
    }

    /// Fraction of the current leg walked, in [0, 1]
    pub fn leg_progress(&self) -> f64 {
        if self.phase_ticks_total == 0 {
            return 1.0;
        }
        1.0 - self.remaining_ticks as f64 / self.phase_ticks_total as f64
    }

    /// Start the return leg
    pub fn turn_around(&mut self) {
        self.phase = TransferPhase::Return;
        self.remaining_ticks = self.phase_ticks_total;
    }

    /// Items already carried and bound for the destination's input queue
    pub fn inbound_items(&self, station: StationIdx) -> usize {
        let carrying = match (self.is_pull, self.phase) {
            (false, TransferPhase::Outbound) => true,
            (true, TransferPhase::Return) => true,
            _ => false,
        };
        if carrying && self.to == station {
            self.item_ids.len()
        } else {
            0
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CourierStatus {
    Idle,
    Walking,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Courier {
    pub home: StationIdx,
    pub status: CourierStatus,
    pub from: Option<StationIdx>,
    pub to: Option<StationIdx>,
    pub carrying: Option<TransferId>,
    /// Presentation only
    pub progress: f64,
}

impl Courier {
    pub fn new(home: StationIdx) -> Self {
        Self {
            home,
            status: CourierStatus::Idle,
            from: None,
            to: None,
            carrying: None,
            progress: 0.0,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.status == CourierStatus::Idle
    }

    /// True if this courier's trip touches `station`
    pub fn blocks(&self, station: StationIdx) -> bool {
        self.status == CourierStatus::Walking
            && (self.from == Some(station) || self.to == Some(station))
    }

    pub fn dispatch(&mut self, transfer: &Transfer) {
        self.status = CourierStatus::Walking;
        self.from = Some(transfer.from);
        self.to = Some(transfer.to);
        self.carrying = Some(transfer.id);
        self.progress = 0.0;
    }

    pub fn send_home(&mut self) {
        self.status = CourierStatus::Idle;
        self.from = None;
        self.to = None;
        self.carrying = None;
        self.progress = 0.0;
    }
}
