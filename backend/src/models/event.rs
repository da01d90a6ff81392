//! Tick events
//!
//! The closed set of observable occurrences emitted by `tick`. Consumers
//! (P&L, front ends, tests) match exhaustively on [`Event`].
//!
//! # Event Types
//!
//! - **Quality**: defect created, caught by a red bin, shipped to a customer
//! - **Material**: raw material released onto the line
//! - **Market**: exogenous change invalidating in-flight work
//! - **Andon**: hold raised, manager reverted or rejected the item
//!
//! # Example
//!
//! ```rust
//! use line_simulator_core_rs::models::{Event, ItemId};
//!
//! let event = Event::DefectCaught {
//!     tick: 10,
//!     station_id: "s3".to_string(),
//!     item_id: ItemId(42),
//! };
//!
//! assert_eq!(event.tick(), 10);
//! assert_eq!(event.event_type(), "defectCaught");
//! ```

use super::item::ItemId;
use serde::{Deserialize, Serialize};

/// Simulation event capturing a state change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Event {
    /// A station's work produced a defect
    DefectCreated {
        tick: u64,
        station_id: String,
        item_id: ItemId,
    },

    /// A red bin intercepted a defective item
    DefectCaught {
        tick: u64,
        station_id: String,
        item_id: ItemId,
    },

    /// A defective item left the line to a customer
    DefectShippedToCustomer { tick: u64, item_id: ItemId },

    /// New material entered the first station (the only material cost)
    MaterialConsumed { tick: u64, item_id: ItemId },

    /// Market change marked work at these stations defective
    MarketChangeTriggered { tick: u64, station_ids: Vec<String> },

    /// A defective item was held for the manager
    AndonTriggered {
        tick: u64,
        station_id: String,
        item_id: ItemId,
    },

    /// The manager fixed a held item
    ManagerReverted {
        tick: u64,
        station_id: String,
        item_id: ItemId,
    },

    /// The manager scrapped a held item
    ManagerRejected {
        tick: u64,
        station_id: String,
        item_id: ItemId,
    },
}

impl Event {
    /// Get the tick number when this event occurred
    pub fn tick(&self) -> u64 {
        match self {
            Event::DefectCreated { tick, .. }
            | Event::DefectCaught { tick, .. }
            | Event::DefectShippedToCustomer { tick, .. }
            | Event::MaterialConsumed { tick, .. }
            | Event::MarketChangeTriggered { tick, .. }
            | Event::AndonTriggered { tick, .. }
            | Event::ManagerReverted { tick, .. }
            | Event::ManagerRejected { tick, .. } => *tick,
        }
    }

    /// Wire name of the event type
    pub fn event_type(&self) -> &'static str {
        match self {
            Event::DefectCreated { .. } => "defectCreated",
            Event::DefectCaught { .. } => "defectCaught",
            Event::DefectShippedToCustomer { .. } => "defectShippedToCustomer",
            Event::MaterialConsumed { .. } => "materialConsumed",
            Event::MarketChangeTriggered { .. } => "marketChangeTriggered",
            Event::AndonTriggered { .. } => "andonTriggered",
            Event::ManagerReverted { .. } => "managerReverted",
            Event::ManagerRejected { .. } => "managerRejected",
        }
    }

    /// Item the event concerns, if any
    pub fn item_id(&self) -> Option<ItemId> {
        match self {
            Event::DefectCreated { item_id, .. }
            | Event::DefectCaught { item_id, .. }
            | Event::DefectShippedToCustomer { item_id, .. }
            | Event::MaterialConsumed { item_id, .. }
            | Event::AndonTriggered { item_id, .. }
            | Event::ManagerReverted { item_id, .. }
            | Event::ManagerRejected { item_id, .. } => Some(*item_id),
            Event::MarketChangeTriggered { .. } => None,
        }
    }

    /// Whether the event concerns `station_id`
    pub fn involves_station(&self, station: &str) -> bool {
        match self {
            Event::DefectCreated { station_id, .. }
            | Event::DefectCaught { station_id, .. }
            | Event::AndonTriggered { station_id, .. }
            | Event::ManagerReverted { station_id, .. }
            | Event::ManagerRejected { station_id, .. } => station_id == station,
            Event::MarketChangeTriggered { station_ids, .. } => {
                station_ids.iter().any(|s| s == station)
            }
            Event::DefectShippedToCustomer { .. } | Event::MaterialConsumed { .. } => false,
        }
    }
}

/// Event log for storing and querying simulation events.
///
/// A thin wrapper around `Vec<Event>` with convenience queries.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<Event>,
}

impl EventLog {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn log(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn extend<I: IntoIterator<Item = Event>>(&mut self, events: I) {
        self.events.extend(events);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn events_at_tick(&self, tick: u64) -> Vec<&Event> {
        self.events.iter().filter(|e| e.tick() == tick).collect()
    }

    pub fn events_of_type(&self, event_type: &str) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|e| e.event_type() == event_type)
            .collect()
    }

    pub fn count_of_type(&self, event_type: &str) -> usize {
        self.events
            .iter()
            .filter(|e| e.event_type() == event_type)
            .count()
    }

    pub fn events_for_station(&self, station_id: &str) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|e| e.involves_station(station_id))
            .collect()
    }

    pub fn events_for_item(&self, item_id: ItemId) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|e| e.item_id() == Some(item_id))
            .collect()
    }

    /// Drop events older than `tick`
    pub fn discard_before(&mut self, tick: u64) {
        self.events.retain(|e| e.tick() >= tick);
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}
