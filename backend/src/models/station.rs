//! Per-station mutable state
//!
//! Each station owns four ordered collections:
//! - `input_queue`: items waiting for a work slot
//! - `in_process`: items in a slot with remaining work time
//! - `batch_buffer`: the oldest finished items (at most one batch)
//! - `output_queue`: finished items queued behind a full batch buffer
//!
//! Finished items always enter through [`StationState::stash_finished`] and
//! are promoted from the output queue as the batch buffer drains, so the
//! pair behaves as one FIFO whose head is capped at the batch size.

use super::item::ItemId;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Floor for the learned defect multiplier
pub const MIN_DEFECT_MULTIPLIER: f64 = 0.2;

/// Per-line-stop decay factor for the defect multiplier
pub const LEARNING_DECAY: f64 = 0.95;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InProcessSlot {
    pub item_id: ItemId,
    pub remaining_work_ms: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StationState {
    pub input_queue: VecDeque<ItemId>,
    pub in_process: Vec<InProcessSlot>,
    pub batch_buffer: VecDeque<ItemId>,
    pub output_queue: VecDeque<ItemId>,
    /// Items permanently binned here (caught, rejected, retained)
    pub defect_count: u64,
    /// Defects produced by this station's own work
    pub defect_created_count: u64,
    /// Work completions, good or defective
    pub processed_count: u64,
    pub andon_hold: Option<ItemId>,
}

impl StationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Items physically at this station
    pub fn wip(&self) -> usize {
        self.input_queue.len()
            + self.in_process.len()
            + self.finished_len()
            + usize::from(self.andon_hold.is_some())
    }

    /// Finished items awaiting dispatch
    pub fn finished_len(&self) -> usize {
        self.batch_buffer.len() + self.output_queue.len()
    }

    pub fn free_slots(&self, capacity: usize) -> usize {
        capacity.saturating_sub(self.in_process.len())
    }

    /// Finished items in FIFO order, batch buffer first
    pub fn finished(&self) -> impl Iterator<Item = ItemId> + '_ {
        self.batch_buffer.iter().chain(self.output_queue.iter()).copied()
    }

    /// Place a finished item behind the existing finished work
    pub fn stash_finished(&mut self, item_id: ItemId, batch_size: usize) {
        if self.batch_buffer.len() < batch_size && self.output_queue.is_empty() {
            self.batch_buffer.push_back(item_id);
        } else {
            self.output_queue.push_back(item_id);
        }
    }

    /// Refill the batch buffer from the output queue head
    pub fn promote(&mut self, batch_size: usize) {
        while self.batch_buffer.len() < batch_size {
            match self.output_queue.pop_front() {
                Some(id) => self.batch_buffer.push_back(id),
                None => break,
            }
        }
    }

    /// Remove up to `count` finished items accepted by `eligible`,
    /// batch buffer first then output queue, preserving order
    pub fn take_finished<F>(&mut self, count: usize, batch_size: usize, mut eligible: F) -> Vec<ItemId>
    where
        F: FnMut(ItemId) -> bool,
    {
        let mut taken = Vec::with_capacity(count);
        for queue in [&mut self.batch_buffer, &mut self.output_queue] {
            let mut kept = VecDeque::with_capacity(queue.len());
            while let Some(id) = queue.pop_front() {
                if taken.len() < count && eligible(id) {
                    taken.push(id);
                } else {
                    kept.push_back(id);
                }
            }
            *queue = kept;
        }
        self.promote(batch_size);
        taken
    }

    /// Remove a specific finished item
    pub fn remove_finished(&mut self, item_id: ItemId, batch_size: usize) -> bool {
        let removed = remove_from(&mut self.batch_buffer, item_id)
            || remove_from(&mut self.output_queue, item_id);
        if removed {
            self.promote(batch_size);
        }
        removed
    }

    /// Every item id at this station, in no particular order
    pub fn all_items(&self) -> impl Iterator<Item = ItemId> + '_ {
        self.input_queue
            .iter()
            .copied()
            .chain(self.in_process.iter().map(|s| s.item_id))
            .chain(self.finished())
            .chain(self.andon_hold)
    }
}

fn remove_from(queue: &mut VecDeque<ItemId>, item_id: ItemId) -> bool {
    match queue.iter().position(|id| *id == item_id) {
        Some(pos) => {
            queue.remove(pos);
            true
        }
        None => false,
    }
}

/// Learned quality state of a station
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationQuality {
    pub defect_multiplier: f64,
    pub last_andon_tick: Option<u64>,
    /// Work start and completion are blocked while `tick < pause_until_tick`
    pub pause_until_tick: Option<u64>,
}

impl Default for StationQuality {
    fn default() -> Self {
        Self {
            defect_multiplier: 1.0,
            last_andon_tick: None,
            pause_until_tick: None,
        }
    }
}

impl StationQuality {
    pub fn is_paused(&self, tick: u64) -> bool {
        self.pause_until_tick.is_some_and(|until| tick < until)
    }

    /// Extend (never shorten) the pause window
    pub fn pause_until(&mut self, tick: u64) {
        self.pause_until_tick = Some(self.pause_until_tick.map_or(tick, |t| t.max(tick)));
    }

    /// One step of post-line-stop learning
    pub fn learn(&mut self) {
        self.defect_multiplier = (self.defect_multiplier * LEARNING_DECAY).max(MIN_DEFECT_MULTIPLIER);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stash_caps_batch_buffer() {
        let mut st = StationState::new();
        for i in 0..5 {
            st.stash_finished(ItemId(i), 3);
        }
        assert_eq!(st.batch_buffer, [ItemId(0), ItemId(1), ItemId(2)]);
        assert_eq!(st.output_queue, [ItemId(3), ItemId(4)]);
    }

    #[test]
    fn test_take_finished_is_fifo_and_promotes() {
        let mut st = StationState::new();
        for i in 0..5 {
            st.stash_finished(ItemId(i), 2);
        }
        let taken = st.take_finished(2, 2, |_| true);
        assert_eq!(taken, vec![ItemId(0), ItemId(1)]);
        assert_eq!(st.batch_buffer, [ItemId(2), ItemId(3)]);
        assert_eq!(st.output_queue, [ItemId(4)]);
    }

    #[test]
    fn test_take_finished_skips_ineligible() {
        let mut st = StationState::new();
        for i in 0..4 {
            st.stash_finished(ItemId(i), 4);
        }
        let taken = st.take_finished(4, 4, |id| id != ItemId(1));
        assert_eq!(taken, vec![ItemId(0), ItemId(2), ItemId(3)]);
        assert_eq!(st.batch_buffer, [ItemId(1)]);
    }

    #[test]
    fn test_wip_counts_andon_hold() {
        let mut st = StationState::new();
        st.input_queue.push_back(ItemId(1));
        st.andon_hold = Some(ItemId(2));
        assert_eq!(st.wip(), 2);
        assert_eq!(st.all_items().count(), 2);
    }

    #[test]
    fn test_learning_floor() {
        let mut q = StationQuality::default();
        for _ in 0..1000 {
            q.learn();
        }
        assert_eq!(q.defect_multiplier, MIN_DEFECT_MULTIPLIER);
    }

    #[test]
    fn test_pause_window_extends_only() {
        let mut q = StationQuality::default();
        q.pause_until(10);
        q.pause_until(5);
        assert_eq!(q.pause_until_tick, Some(10));
        assert!(q.is_paused(9));
        assert!(!q.is_paused(10));
    }
}
