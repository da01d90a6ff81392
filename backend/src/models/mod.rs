//! Domain models for the production line simulator

pub mod event;
pub mod item;
pub mod state;
pub mod station;
pub mod transfer;

// Re-exports
pub use event::{Event, EventLog};
pub use item::{Item, ItemId, ItemStatus};
pub use state::{LineStop, ManagerState, SimState, HISTORY_LIMIT};
pub use station::{InProcessSlot, StationQuality, StationState};
pub use transfer::{Courier, CourierStatus, Transfer, TransferId, TransferPhase};
