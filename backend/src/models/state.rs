//! Simulation State
//!
//! The complete mutable snapshot of a production line: the item table,
//! per-station queues, in-flight transfers, couriers, learned quality,
//! manager bookkeeping, the line-stop window, and running totals.
//!
//! # Critical Invariants
//!
//! 1. **Item Uniqueness**: an item id appears in at most one station
//!    collection or one in-flight transfer across the whole state
//! 2. **Capacity**: `in_process.len() <= capacity` and the input queue
//!    respects the station's buffer limit
//! 3. **Tick Monotonicity**: `tick` advances by exactly 1 per engine step
//! 4. **No Dangling Ids**: every id held by a station or transfer exists in
//!    the item table
//!
//! The state is mutated only by the tick engine. Everything else reads it
//! through the accessors below.

use super::item::{Item, ItemId};
use super::station::{StationQuality, StationState};
use super::transfer::{Courier, Transfer, TransferId};
use crate::config::{SimConfig, StationIdx};
use crate::rng::RngManager;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};

/// Completed and shipped-defective ids kept for display and audit
pub const HISTORY_LIMIT: usize = 1000;

/// Active jidoka window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineStop {
    /// Station whose rejection stopped the line
    pub station: StationIdx,
    /// The window closes at the first tick `>= until_tick`
    pub until_tick: u64,
}

/// Manager dispatch bookkeeping
///
/// Idle when `to` is `None`. While walking, `arrives_at_tick` is set and
/// `resolves_at_tick` is not; once arrived, `resolves_at_tick` marks the
/// decision tick.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagerState {
    pub from: Option<StationIdx>,
    pub to: Option<StationIdx>,
    pub arrives_at_tick: Option<u64>,
    pub resolves_at_tick: Option<u64>,
}

impl ManagerState {
    pub fn is_idle(&self) -> bool {
        self.to.is_none()
    }

    pub(crate) fn walk_to(&mut self, station: StationIdx, arrives_at_tick: u64) {
        self.to = Some(station);
        self.arrives_at_tick = Some(arrives_at_tick);
        self.resolves_at_tick = None;
    }

    pub(crate) fn go_home(&mut self) {
        *self = Self::default();
    }
}

/// Complete simulation state
///
/// # Example
///
/// ```rust
/// use line_simulator_core_rs::config::presets::get_initial_config;
/// use line_simulator_core_rs::engine::create_initial_state;
///
/// let config = get_initial_config("intro").unwrap();
/// let state = create_initial_state(&config);
/// assert_eq!(state.tick(), 0);
/// assert_eq!(state.stations().len(), config.station_count());
/// assert_eq!(state.total_completed(), 0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimState {
    pub(crate) tick: u64,
    pub(crate) next_item_id: u64,
    pub(crate) next_transfer_id: u64,

    /// Live items plus the trailing history window
    pub(crate) items: BTreeMap<ItemId, Item>,
    pub(crate) stations: Vec<StationState>,
    /// In creation order
    pub(crate) transfers: Vec<Transfer>,
    /// One courier per station, indexed like `stations`
    pub(crate) couriers: Vec<Courier>,
    pub(crate) quality: Vec<StationQuality>,

    pub(crate) completed_ids: VecDeque<ItemId>,
    pub(crate) defective_ids: VecDeque<ItemId>,
    pub(crate) total_completed: u64,
    pub(crate) total_defective_shipped: u64,
    /// Items permanently binned anywhere on the line
    pub(crate) total_rejected: u64,
    /// Subset of `total_rejected` retained by the last station's red bin
    pub(crate) rejected_at_end_count: u64,

    pub(crate) last_market_change_tick: Option<u64>,
    pub(crate) next_market_change_tick: Option<u64>,
    pub(crate) last_defect_shipped_tick: Option<u64>,

    pub(crate) rng: RngManager,
    pub(crate) jidoka: Option<LineStop>,
    pub(crate) manager: ManagerState,
    /// Stations with an andon hold awaiting the manager, FIFO
    pub(crate) pending_andon: VecDeque<StationIdx>,

    pub(crate) is_bust: bool,
    pub(crate) ended: bool,
}

impl SimState {
    /// Empty line shaped after `config`, seeded from the config seed
    pub(crate) fn empty(config: &SimConfig) -> Self {
        let n = config.station_count();
        Self {
            tick: 0,
            next_item_id: 0,
            next_transfer_id: 0,
            items: BTreeMap::new(),
            stations: vec![StationState::new(); n],
            transfers: Vec::new(),
            couriers: (0..n).map(Courier::new).collect(),
            quality: vec![StationQuality::default(); n],
            completed_ids: VecDeque::new(),
            defective_ids: VecDeque::new(),
            total_completed: 0,
            total_defective_shipped: 0,
            total_rejected: 0,
            rejected_at_end_count: 0,
            last_market_change_tick: None,
            next_market_change_tick: None,
            last_defect_shipped_tick: None,
            rng: RngManager::new(config.seed()),
            jidoka: None,
            manager: ManagerState::default(),
            pending_andon: VecDeque::new(),
            is_bust: false,
            ended: false,
        }
    }

    // ========================================================================
    // Read accessors
    // ========================================================================

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn item(&self, id: ItemId) -> Option<&Item> {
        self.items.get(&id)
    }

    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.items.values()
    }

    pub fn num_items(&self) -> usize {
        self.items.len()
    }

    pub fn stations(&self) -> &[StationState] {
        &self.stations
    }

    pub fn station(&self, idx: StationIdx) -> Option<&StationState> {
        self.stations.get(idx)
    }

    pub fn transfers(&self) -> &[Transfer] {
        &self.transfers
    }

    pub fn couriers(&self) -> &[Courier] {
        &self.couriers
    }

    pub fn quality(&self) -> &[StationQuality] {
        &self.quality
    }

    pub fn completed_ids(&self) -> &VecDeque<ItemId> {
        &self.completed_ids
    }

    pub fn defective_ids(&self) -> &VecDeque<ItemId> {
        &self.defective_ids
    }

    pub fn total_completed(&self) -> u64 {
        self.total_completed
    }

    pub fn total_defective_shipped(&self) -> u64 {
        self.total_defective_shipped
    }

    pub fn total_rejected(&self) -> u64 {
        self.total_rejected
    }

    pub fn rejected_at_end_count(&self) -> u64 {
        self.rejected_at_end_count
    }

    pub fn last_market_change_tick(&self) -> Option<u64> {
        self.last_market_change_tick
    }

    pub fn next_market_change_tick(&self) -> Option<u64> {
        self.next_market_change_tick
    }

    pub fn last_defect_shipped_tick(&self) -> Option<u64> {
        self.last_defect_shipped_tick
    }

    /// Current sampler seed
    pub fn rng_state(&self) -> u64 {
        self.rng.get_state()
    }

    pub fn line_stop(&self) -> Option<LineStop> {
        self.jidoka
    }

    pub fn manager(&self) -> &ManagerState {
        &self.manager
    }

    pub fn pending_andon(&self) -> &VecDeque<StationIdx> {
        &self.pending_andon
    }

    pub fn is_bust(&self) -> bool {
        self.is_bust
    }

    pub fn ended(&self) -> bool {
        self.ended
    }

    /// Either terminal flag is set
    pub fn is_halted(&self) -> bool {
        self.is_bust || self.ended
    }

    pub(crate) fn mark_bust(&mut self) {
        self.is_bust = true;
    }

    // ========================================================================
    // Engine helpers
    // ========================================================================

    pub(crate) fn item_mut(&mut self, id: ItemId) -> Option<&mut Item> {
        self.items.get_mut(&id)
    }

    pub(crate) fn is_defective(&self, id: ItemId) -> bool {
        self.items.get(&id).is_some_and(|item| item.is_defective)
    }

    pub(crate) fn alloc_item_id(&mut self) -> ItemId {
        let id = ItemId(self.next_item_id);
        self.next_item_id += 1;
        id
    }

    pub(crate) fn alloc_transfer_id(&mut self) -> TransferId {
        let id = TransferId(self.next_transfer_id);
        self.next_transfer_id += 1;
        id
    }

    /// Whether a walking courier touches `station`
    pub(crate) fn courier_blocked(&self, station: StationIdx) -> bool {
        self.couriers.iter().any(|c| c.blocks(station))
    }

    pub(crate) fn is_paused(&self, station: StationIdx) -> bool {
        self.quality[station].is_paused(self.tick)
    }

    /// Items already in transit towards `station`'s input queue
    pub(crate) fn reserved_inbound(&self, station: StationIdx) -> usize {
        self.transfers.iter().map(|t| t.inbound_items(station)).sum()
    }

    /// Free input-queue places at `station`, counting reserved inbound
    /// items; `None` when the queue is unbounded
    pub(crate) fn input_headroom(&self, station: StationIdx, limit: Option<usize>) -> Option<usize> {
        limit.map(|limit| {
            limit.saturating_sub(self.stations[station].input_queue.len() + self.reserved_inbound(station))
        })
    }

    /// Whether `count` more items fit in `station`'s input queue
    pub(crate) fn input_accepts(&self, station: StationIdx, limit: Option<usize>, count: usize) -> bool {
        self.input_headroom(station, limit).map_or(true, |room| room >= count)
    }

    /// Drop an item record that no structure references any more
    pub(crate) fn evict(&mut self, id: ItemId) {
        self.items.remove(&id);
    }

    /// Permanently bin an item at `station`
    pub(crate) fn bin_item(&mut self, station: StationIdx, id: ItemId) {
        self.stations[station].defect_count += 1;
        self.total_rejected += 1;
        self.evict(id);
    }

    pub(crate) fn record_completed(&mut self, id: ItemId) {
        self.total_completed += 1;
        push_history(&mut self.completed_ids, &mut self.items, id);
    }

    pub(crate) fn record_defective_shipped(&mut self, id: ItemId) {
        self.total_defective_shipped += 1;
        self.last_defect_shipped_tick = Some(self.tick);
        push_history(&mut self.defective_ids, &mut self.items, id);
    }
}

fn push_history(history: &mut VecDeque<ItemId>, items: &mut BTreeMap<ItemId, Item>, id: ItemId) {
    history.push_back(id);
    while history.len() > HISTORY_LIMIT {
        if let Some(old) = history.pop_front() {
            items.remove(&old);
        }
    }
}
