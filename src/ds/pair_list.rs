//! Backing list for the high-frequency queue.
//!
//! Stores [`PairRecord`]s in a [`SlotArena`] and keeps the slots of the
//! current minimum- and maximum-frequency records cached, so both order
//! statistics are O(1) reads.
//!
//! ## Architecture
//!
//! ```text
//!   records: SlotArena<PairRecord>
//!   ┌──────┬───────────────┐
//!   │ slot │ record        │      min ──► slot 2
//!   ├──────┼───────────────┤      max ──► slot 0
//!   │  0   │ (a,b) F=41    │
//!   │  1   │  <dead>       │      live = 3, slots = 4
//!   │  2   │ (b,c) F=17    │      compact when live < slots / 2
//!   │  3   │ (c,a) F=23    │
//!   └──────┴───────────────┘
//! ```
//!
//! ## Extremum maintenance
//!
//! | Operation     | min                          | max                          |
//! |---------------|------------------------------|------------------------------|
//! | `insert`      | compare, O(1)                | compare, O(1)                |
//! | `decrement`   | compare, O(1)                | rescan if the max was hit    |
//! | `remove`      | rescan if the min was hit    | rescan if the max was hit    |
//! | `compact_with`| rescan                       | rescan                       |
//!
//! A rescan walks the live slots. High-frequency pairs are few (with a
//! threshold of `f` over a sequence of length `n`, at most `n / f` of them),
//! so the walk stays short relative to the work that caused it.
//!
//! Decrementing the cached max is the one case that rescans without an
//! extremum leaving the list: the cached slot must keep pointing at a true
//! maximum, and a lowered max may now tie with or trail another record. The
//! cost is at most one rescan per `decrement`, and none when the max is the
//! only live record.

use std::collections::TryReserveError;

use crate::ds::slot_arena::{SlotArena, SlotId};
use crate::pair::{Frequency, PairRecord};

#[derive(Debug, Default)]
pub struct PairList {
    records: SlotArena<PairRecord>,
    min: Option<SlotId>,
    max: Option<SlotId>,
    rescans: u64,
}

impl PairList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty list with room for `capacity` records, reporting
    /// allocation failure instead of aborting.
    pub fn try_with_capacity(capacity: usize) -> Result<Self, TryReserveError> {
        let mut list = Self::default();
        list.records.try_reserve(capacity)?;
        Ok(list)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Slots currently allocated, live or dead.
    pub fn slot_count(&self) -> usize {
        self.records.slot_count()
    }

    /// Returns `true` once fewer than half of the allocated slots are live.
    pub fn needs_compaction(&self) -> bool {
        self.records.len() < self.records.slot_count() / 2
    }

    /// Number of full extremum rescans performed so far.
    pub fn rescans(&self) -> u64 {
        self.rescans
    }

    pub fn get(&self, id: SlotId) -> Option<&PairRecord> {
        self.records.get(id)
    }

    pub fn min_slot(&self) -> Option<SlotId> {
        self.min
    }

    pub fn max_slot(&self) -> Option<SlotId> {
        self.max
    }

    pub fn min_record(&self) -> Option<&PairRecord> {
        self.min.and_then(|id| self.records.get(id))
    }

    pub fn max_record(&self) -> Option<&PairRecord> {
        self.max.and_then(|id| self.records.get(id))
    }

    pub fn insert(&mut self, record: PairRecord) -> SlotId {
        let frequency = record.frequency;
        let id = self.records.insert(record);
        if self.frequency_at(self.min).is_none_or(|min| frequency < min) {
            self.min = Some(id);
        }
        if self.frequency_at(self.max).is_none_or(|max| frequency > max) {
            self.max = Some(id);
        }
        id
    }

    pub fn remove(&mut self, id: SlotId) -> Option<PairRecord> {
        let record = self.records.remove(id)?;
        let hit_min = self.min == Some(id);
        let hit_max = self.max == Some(id);
        if hit_min || hit_max {
            self.rescan(hit_min, hit_max);
        }
        Some(record)
    }

    /// Lowers the frequency stored at `id` by one and returns the new value.
    ///
    /// Returns `None` if `id` is dead or the frequency is already zero.
    pub fn decrement(&mut self, id: SlotId) -> Option<Frequency> {
        let record = self.records.get_mut(id)?;
        if record.frequency == 0 {
            return None;
        }
        record.frequency -= 1;
        let frequency = record.frequency;

        if self.min != Some(id) && self.frequency_at(self.min).is_none_or(|min| frequency < min) {
            self.min = Some(id);
        }
        if self.max == Some(id) && self.records.len() > 1 {
            self.rescan(false, true);
        }
        Some(frequency)
    }

    /// Squeezes out dead slots, calling `relocate` with every surviving
    /// record's new slot, then re-derives the cached extrema.
    pub fn compact_with<F>(&mut self, relocate: F)
    where
        F: FnMut(&PairRecord, SlotId),
    {
        self.records.compact_with(relocate);
        self.rescan(true, true);
    }

    pub fn clear(&mut self) {
        self.records.clear();
        self.min = None;
        self.max = None;
    }

    pub fn iter(&self) -> impl Iterator<Item = (SlotId, &PairRecord)> {
        self.records.iter()
    }

    pub fn approx_bytes(&self) -> usize {
        self.records.approx_bytes()
    }

    fn frequency_at(&self, id: Option<SlotId>) -> Option<Frequency> {
        id.and_then(|id| self.records.get(id))
            .map(|record| record.frequency)
    }

    fn rescan(&mut self, min: bool, max: bool) {
        self.rescans += 1;
        let mut lowest: Option<(SlotId, Frequency)> = None;
        let mut highest: Option<(SlotId, Frequency)> = None;
        for (id, record) in self.records.iter() {
            let f = record.frequency;
            if lowest.is_none_or(|(_, low)| f < low) {
                lowest = Some((id, f));
            }
            if highest.is_none_or(|(_, high)| f > high) {
                highest = Some((id, f));
            }
        }
        if min {
            self.min = lowest.map(|(id, _)| id);
        }
        if max {
            self.max = highest.map(|(id, _)| id);
        }
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        if self.is_empty() {
            assert!(self.min.is_none());
            assert!(self.max.is_none());
            return;
        }
        let min = self.min_record().expect("cached min slot is dead");
        let max = self.max_record().expect("cached max slot is dead");
        for (_, record) in self.records.iter() {
            assert!(min.frequency <= record.frequency);
            assert!(max.frequency >= record.frequency);
        }
    }
}
