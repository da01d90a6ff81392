//! Checkpoint - Fingerprint and Validate Simulation State
//!
//! Two runs are identical iff their state digests match. Validation checks
//! the structural invariants a state must hold after every tick.
//!
//! # Critical Invariants
//!
//! - **Determinism**: Same seed + config + inputs produces the same digest
//! - **Item Uniqueness**: No item id in two locations
//! - **Capacity**: No station works on more items than it has slots
//! - **Buffer Limits**: No input queue beyond its configured limit
//! - **No Dangling Ids**: Every referenced item exists in the item table

use crate::config::SimConfig;
use crate::models::{ItemId, SimState};
use crate::orchestrator::SimulationError;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use thiserror::Error;

/// Structural invariant violations
#[derive(Debug, Error, Clone, PartialEq)]
pub enum StateValidationError {
    #[error("Item {item} found in both {first} and {second}")]
    DuplicateItem {
        item: ItemId,
        first: String,
        second: String,
    },

    #[error("Station {station} has {in_process} items in process, capacity {capacity}")]
    CapacityExceeded {
        station: String,
        in_process: usize,
        capacity: usize,
    },

    #[error("Station {station} input queue holds {len} items, limit {limit}")]
    InputBufferExceeded {
        station: String,
        len: usize,
        limit: usize,
    },

    #[error("Item {item} referenced by {location} is missing from the item table")]
    DanglingItem { item: ItemId, location: String },

    #[error("State has {actual} stations, config has {expected}")]
    StationCountMismatch { expected: usize, actual: usize },
}

// ============================================================================
// Hashing
// ============================================================================

/// Deterministic SHA256 of any serializable value
///
/// Uses canonical JSON serialization with sorted keys so map ordering
/// never changes the hash.
fn canonical_sha256<T: Serialize>(value: &T, what: &str) -> Result<String, SimulationError> {
    use serde_json::Value;
    use std::collections::BTreeMap;

    let value = serde_json::to_value(value).map_err(|e| {
        SimulationError::SerializationError(format!("{} serialization failed: {}", what, e))
    })?;

    // Recursively sort all object keys for canonical representation
    fn canonicalize(value: Value) -> Value {
        match value {
            Value::Object(map) => {
                let sorted: BTreeMap<String, Value> =
                    map.into_iter().map(|(k, v)| (k, canonicalize(v))).collect();
                Value::Object(sorted.into_iter().collect())
            }
            Value::Array(arr) => Value::Array(arr.into_iter().map(canonicalize).collect()),
            other => other,
        }
    }

    let json = serde_json::to_string(&canonicalize(value)).map_err(|e| {
        SimulationError::SerializationError(format!("{} serialization failed: {}", what, e))
    })?;

    let mut hasher = Sha256::new();
    hasher.update(json.as_bytes());
    Ok(format!("{:x}", hasher.finalize()))
}

/// Fingerprint of a complete state, sampler seed included
pub fn state_digest(state: &SimState) -> Result<String, SimulationError> {
    canonical_sha256(state, "State")
}

/// Fingerprint of a config
pub fn compute_config_hash<T: Serialize>(config: &T) -> Result<String, SimulationError> {
    canonical_sha256(config, "Config")
}

// ============================================================================
// Validation Functions
// ============================================================================

/// Validate state integrity against its config
///
/// Checks critical invariants:
/// - Item uniqueness across station collections and transfers
/// - Capacity and input buffer limits
/// - Referential integrity of every held item id
pub fn validate_state(state: &SimState, config: &SimConfig) -> Result<(), StateValidationError> {
    if state.stations().len() != config.station_count() {
        return Err(StateValidationError::StationCountMismatch {
            expected: config.station_count(),
            actual: state.stations().len(),
        });
    }

    let mut seen: HashMap<ItemId, String> = HashMap::new();
    let mut claim = |item: ItemId, location: String| -> Result<(), StateValidationError> {
        if state.item(item).is_none() {
            return Err(StateValidationError::DanglingItem { item, location });
        }
        match seen.insert(item, location.clone()) {
            Some(first) => Err(StateValidationError::DuplicateItem {
                item,
                first,
                second: location,
            }),
            None => Ok(()),
        }
    };

    for (policy, st) in config.stations().iter().zip(state.stations()) {
        if st.in_process.len() > policy.capacity {
            return Err(StateValidationError::CapacityExceeded {
                station: policy.id.clone(),
                in_process: st.in_process.len(),
                capacity: policy.capacity,
            });
        }
        if let Some(limit) = policy.input_limit {
            if st.input_queue.len() > limit {
                return Err(StateValidationError::InputBufferExceeded {
                    station: policy.id.clone(),
                    len: st.input_queue.len(),
                    limit,
                });
            }
        }

        for id in &st.input_queue {
            claim(*id, format!("{} input queue", policy.id))?;
        }
        for slot in &st.in_process {
            claim(slot.item_id, format!("{} in process", policy.id))?;
        }
        for id in &st.batch_buffer {
            claim(*id, format!("{} batch buffer", policy.id))?;
        }
        for id in &st.output_queue {
            claim(*id, format!("{} output queue", policy.id))?;
        }
        if let Some(id) = st.andon_hold {
            claim(id, format!("{} andon hold", policy.id))?;
        }
    }

    for transfer in state.transfers() {
        for id in &transfer.item_ids {
            claim(*id, transfer.id.to_string())?;
        }
    }

    Ok(())
}
