//! High-frequency pair queue.
//!
//! Holds every pair whose frequency is at or above a floor (the global
//! high/low threshold). Storage is a compacting [`PairList`] plus a lookup
//! table from pair to slot.
//!
//! ## Architecture
//!
//! ```text
//!   index: FxHashMap<SymbolPair, SlotId>          list: PairList
//!   ┌──────────┬────────┐                         ┌──────┬──────────────┐
//!   │  (a,b)   │ slot 0 │────────────────────────►│  0   │ (a,b) F=41   │◄── max
//!   │  (c,a)   │ slot 3 │──────────┐              │  1   │ <dead>       │
//!   │  (b,c)   │ slot 2 │───────┐  │              │  2   │ (b,c) F=17   │◄── min
//!   └──────────┴────────┘       │  └─────────────►│  3   │ (c,a) F=23   │
//!                               └────────────────►└──────┴──────────────┘
//! ```
//!
//! ## Compaction
//!
//! After every removal, if fewer than half of the list's slots are live the
//! list is compacted and every surviving pair's slot is rewritten in the same
//! pass. The O(n) pass is paid for by the n/2 removals that made it due.
//!
//! ## Operations
//!
//! | Operation   | Time            | Notes                                    |
//! |-------------|-----------------|------------------------------------------|
//! | `insert`    | O(1)            | Rejects duplicates, sub-floor, overflow  |
//! | `lookup`    | O(1)            |                                          |
//! | `max`/`min` | O(1)            | Cached by the backing list               |
//! | `remove`    | O(1) amortized  | May compact                              |
//! | `decrease`  | O(1) amortized  | Evicts below the floor                   |
//!
//! ## Example Usage
//!
//! ```
//! use repairkit::pair::{OccurrenceHandle, PairRecord, SymbolPair};
//! use repairkit::queue::HighFrequencyQueue;
//! use repairkit::traits::DecreaseOutcome;
//!
//! let mut queue = HighFrequencyQueue::new(16, 3);
//! let ab = SymbolPair::new(1, 2);
//! let bc = SymbolPair::new(2, 3);
//! queue.insert(PairRecord::new(ab, OccurrenceHandle::new(0), 0, 9))?;
//! queue.insert(PairRecord::new(bc, OccurrenceHandle::new(1), 0, 3))?;
//!
//! assert_eq!(queue.max()?, ab);
//! assert_eq!(queue.min()?, bc);
//!
//! // Dropping below the floor removes the pair.
//! assert!(matches!(queue.decrease(bc)?, DecreaseOutcome::Evicted(_)));
//! assert!(!queue.contains(bc));
//! # Ok::<(), repairkit::error::QueueError>(())
//! ```

use rustc_hash::FxHashMap;
use std::collections::TryReserveError;

use crate::ds::pair_list::PairList;
use crate::ds::slot_arena::SlotId;
use crate::error::{ConfigError, InvariantError, QueueError};
use crate::pair::{Frequency, PairRecord, SymbolPair, Triple};
use crate::traits::{DecreaseOutcome, PairQueue};

#[cfg(feature = "metrics")]
use crate::metrics::metrics_impl::HighQueueMetrics;
#[cfg(feature = "metrics")]
use crate::metrics::snapshot::HighQueueMetricsSnapshot;
#[cfg(feature = "metrics")]
use crate::metrics::traits::{
    CoreQueueMetricsRecorder, HighQueueMetricsRecorder, MetricsSnapshotProvider,
    QueueMetricsReadRecorder,
};

/// Queue of pairs with frequency `>= floor`.
#[derive(Debug)]
pub struct HighFrequencyQueue {
    list: PairList,
    index: FxHashMap<SymbolPair, SlotId>,
    capacity: usize,
    floor: Frequency,
    compactions: u64,
    #[cfg(feature = "metrics")]
    metrics: HighQueueMetrics,
}

impl HighFrequencyQueue {
    /// Creates a queue for up to `capacity` pairs with frequency `>= floor`.
    ///
    /// # Panics
    ///
    /// Panics if parameters are invalid. See [`try_new`](Self::try_new).
    pub fn new(capacity: usize, floor: Frequency) -> Self {
        match Self::try_new(capacity, floor) {
            Ok(queue) => queue,
            Err(e) => panic!("{}", e),
        }
    }

    /// Creates a queue, returning an error on invalid parameters.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `capacity` is zero, if `floor <= 1`
    /// (frequencies of one and below belong to the low-frequency queue), or
    /// if the record list or pair table cannot be allocated.
    pub fn try_new(capacity: usize, floor: Frequency) -> Result<Self, ConfigError> {
        if capacity == 0 {
            return Err(ConfigError::new("queue capacity must be greater than zero"));
        }
        if floor <= 1 {
            return Err(ConfigError::new(format!(
                "high-frequency floor must be greater than 1, got {}",
                floor
            )));
        }
        let too_large = |e: TryReserveError| {
            ConfigError::new(format!(
                "high-frequency queue with capacity {} does not fit in memory: {}",
                capacity, e
            ))
        };
        let list = PairList::try_with_capacity(capacity).map_err(too_large)?;
        let mut index = FxHashMap::default();
        index.try_reserve(capacity).map_err(too_large)?;
        Ok(Self {
            list,
            index,
            capacity,
            floor,
            compactions: 0,
            #[cfg(feature = "metrics")]
            metrics: HighQueueMetrics::default(),
        })
    }

    /// Minimum admissible frequency (inclusive).
    pub fn floor(&self) -> Frequency {
        self.floor
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    pub fn contains(&self, pair: SymbolPair) -> bool {
        self.index.contains_key(&pair)
    }

    /// Returns `true` if a record at `frequency` may be inserted.
    pub fn admits(&self, frequency: Frequency) -> bool {
        frequency >= self.floor
    }

    /// Number of compaction passes run so far.
    pub fn compactions(&self) -> u64 {
        self.compactions
    }

    /// Number of backing-list slots currently allocated, live or dead.
    pub fn slot_count(&self) -> usize {
        self.list.slot_count()
    }

    pub fn get(&self, pair: SymbolPair) -> Option<Triple> {
        #[cfg(feature = "metrics")]
        (&self.metrics).record_lookup_call();

        let id = *self.index.get(&pair)?;
        let triple = self.list.get(id).map(PairRecord::triple);

        #[cfg(feature = "metrics")]
        if triple.is_some() {
            (&self.metrics).record_lookup_found();
        }
        triple
    }

    /// Returns the triple of `pair`.
    ///
    /// # Errors
    ///
    /// [`QueueError::MissingPair`] if `pair` is not queued.
    pub fn lookup(&self, pair: SymbolPair) -> Result<Triple, QueueError> {
        self.get(pair).ok_or(QueueError::MissingPair(pair))
    }

    pub fn frequency(&self, pair: SymbolPair) -> Option<Frequency> {
        let id = *self.index.get(&pair)?;
        self.list.get(id).map(|record| record.frequency)
    }

    /// A pair with the highest frequency.
    pub fn max(&self) -> Result<SymbolPair, QueueError> {
        #[cfg(feature = "metrics")]
        (&self.metrics).record_extremum_call();

        self.list
            .max_record()
            .map(|record| record.pair)
            .ok_or(QueueError::EmptyQueue)
    }

    /// A pair with the lowest frequency.
    pub fn min(&self) -> Result<SymbolPair, QueueError> {
        #[cfg(feature = "metrics")]
        (&self.metrics).record_extremum_call();

        self.list
            .min_record()
            .map(|record| record.pair)
            .ok_or(QueueError::EmptyQueue)
    }

    /// Queues `record`.
    ///
    /// # Errors
    ///
    /// - [`QueueError::DuplicatePair`] if the pair is already queued.
    /// - [`QueueError::FrequencyOutOfRange`] if the frequency is below the floor.
    /// - [`QueueError::CapacityExceeded`] if the queue is full.
    pub fn insert(&mut self, record: PairRecord) -> Result<(), QueueError> {
        #[cfg(feature = "metrics")]
        self.metrics.record_insert_call();

        if let Err(err) = self.check_insert(&record) {
            #[cfg(feature = "metrics")]
            self.metrics.record_insert_rejected();
            return Err(err);
        }

        let id = self.list.insert(record);
        self.index.insert(record.pair, id);
        Ok(())
    }

    /// Removes `pair` and returns its record, compacting the backing list if
    /// it has become more than half dead.
    ///
    /// # Errors
    ///
    /// [`QueueError::MissingPair`] if `pair` is not queued.
    pub fn remove(&mut self, pair: SymbolPair) -> Result<PairRecord, QueueError> {
        #[cfg(feature = "metrics")]
        self.metrics.record_remove_call();

        let id = self
            .index
            .remove(&pair)
            .ok_or(QueueError::MissingPair(pair))?;
        let record = self
            .list
            .remove(id)
            .ok_or(QueueError::MissingPair(pair))?;

        if self.list.needs_compaction() {
            self.compact();
        }
        Ok(record)
    }

    /// Lowers the frequency of `pair` by one. If it drops below the floor the
    /// pair is removed and returned as [`DecreaseOutcome::Evicted`].
    ///
    /// # Errors
    ///
    /// - [`QueueError::MissingPair`] if `pair` is not queued.
    /// - [`QueueError::FrequencyExhausted`] if its frequency is already zero.
    pub fn decrease(&mut self, pair: SymbolPair) -> Result<DecreaseOutcome, QueueError> {
        #[cfg(feature = "metrics")]
        self.metrics.record_decrease_call();

        let id = *self.index.get(&pair).ok_or(QueueError::MissingPair(pair))?;
        let frequency = self
            .list
            .decrement(id)
            .ok_or(QueueError::FrequencyExhausted(pair))?;

        if frequency < self.floor {
            #[cfg(feature = "metrics")]
            self.metrics.record_floor_eviction();
            let record = self.remove(pair)?;
            return Ok(DecreaseOutcome::Evicted(record));
        }
        Ok(DecreaseOutcome::Retained { frequency })
    }

    /// Removes and returns a record with the highest frequency.
    pub fn pop_max(&mut self) -> Result<PairRecord, QueueError> {
        let pair = self.max()?;
        self.remove(pair)
    }

    /// Iterates queued records in storage order.
    pub fn iter(&self) -> impl Iterator<Item = PairRecord> + '_ {
        self.list.iter().map(|(_, record)| *record)
    }

    pub fn clear(&mut self) {
        #[cfg(feature = "metrics")]
        self.metrics.record_clear();

        self.list.clear();
        self.index.clear();
    }

    pub fn approx_bytes(&self) -> usize {
        std::mem::size_of::<Self>()
            + self.list.approx_bytes()
            + self.index.capacity() * std::mem::size_of::<(SymbolPair, SlotId)>()
    }

    /// Verifies the lookup table, backing list, and cached extrema agree.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        if self.index.len() != self.list.len() {
            return Err(InvariantError::new(format!(
                "index holds {} pairs but list holds {}",
                self.index.len(),
                self.list.len()
            )));
        }
        if self.list.len() > self.capacity {
            return Err(InvariantError::new(format!(
                "{} pairs queued over capacity {}",
                self.list.len(),
                self.capacity
            )));
        }
        for (pair, &id) in &self.index {
            let record = self.list.get(id).ok_or_else(|| {
                InvariantError::new(format!("pair {} maps to dead slot {}", pair, id.index()))
            })?;
            if record.pair != *pair {
                return Err(InvariantError::new(format!(
                    "slot {} holds {} but is indexed as {}",
                    id.index(),
                    record.pair,
                    pair
                )));
            }
            if record.frequency < self.floor {
                return Err(InvariantError::new(format!(
                    "pair {} kept at frequency {} below floor {}",
                    pair, record.frequency, self.floor
                )));
            }
        }

        match (self.list.min_record(), self.list.max_record()) {
            (None, None) if self.list.is_empty() => {},
            (Some(min), Some(max)) => {
                for (_, record) in self.list.iter() {
                    if record.frequency < min.frequency || record.frequency > max.frequency {
                        return Err(InvariantError::new(format!(
                            "pair {} at {} lies outside cached [{}, {}]",
                            record.pair, record.frequency, min.frequency, max.frequency
                        )));
                    }
                }
            },
            _ => {
                return Err(InvariantError::new(
                    "cached extrema disagree with list occupancy",
                ));
            },
        }

        if self.list.needs_compaction() {
            return Err(InvariantError::new(format!(
                "{} live pairs in {} slots left uncompacted",
                self.list.len(),
                self.list.slot_count()
            )));
        }
        Ok(())
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        if let Err(err) = self.check_invariants() {
            panic!("high-frequency queue invariant violated: {}", err);
        }
    }

    fn check_insert(&self, record: &PairRecord) -> Result<(), QueueError> {
        if self.index.contains_key(&record.pair) {
            return Err(QueueError::DuplicatePair(record.pair));
        }
        if record.frequency < self.floor {
            return Err(QueueError::FrequencyOutOfRange {
                pair: record.pair,
                frequency: record.frequency,
                min: self.floor,
                max: None,
            });
        }
        if self.list.len() >= self.capacity {
            return Err(QueueError::CapacityExceeded {
                capacity: self.capacity,
            });
        }
        Ok(())
    }

    fn compact(&mut self) {
        let index = &mut self.index;
        let mut relocated = 0usize;
        self.list.compact_with(|record, id| {
            index.insert(record.pair, id);
            relocated += 1;
        });
        self.compactions += 1;

        #[cfg(feature = "metrics")]
        self.metrics.record_compaction(relocated);
        #[cfg(not(feature = "metrics"))]
        let _ = relocated;
    }
}

impl PairQueue for HighFrequencyQueue {
    fn insert(&mut self, record: PairRecord) -> Result<(), QueueError> {
        HighFrequencyQueue::insert(self, record)
    }

    fn get(&self, pair: SymbolPair) -> Option<Triple> {
        HighFrequencyQueue::get(self, pair)
    }

    fn contains(&self, pair: SymbolPair) -> bool {
        HighFrequencyQueue::contains(self, pair)
    }

    fn len(&self) -> usize {
        HighFrequencyQueue::len(self)
    }

    fn capacity(&self) -> usize {
        HighFrequencyQueue::capacity(self)
    }

    fn max(&self) -> Result<SymbolPair, QueueError> {
        HighFrequencyQueue::max(self)
    }

    fn min(&self) -> Result<SymbolPair, QueueError> {
        HighFrequencyQueue::min(self)
    }

    fn remove(&mut self, pair: SymbolPair) -> Result<PairRecord, QueueError> {
        HighFrequencyQueue::remove(self, pair)
    }

    fn decrease(&mut self, pair: SymbolPair) -> Result<DecreaseOutcome, QueueError> {
        HighFrequencyQueue::decrease(self, pair)
    }

    fn admits(&self, frequency: Frequency) -> bool {
        HighFrequencyQueue::admits(self, frequency)
    }
}

#[cfg(feature = "metrics")]
impl HighFrequencyQueue {
    pub fn metrics_snapshot(&self) -> HighQueueMetricsSnapshot {
        HighQueueMetricsSnapshot {
            insert_calls: self.metrics.insert_calls,
            insert_rejected: self.metrics.insert_rejected,
            remove_calls: self.metrics.remove_calls,
            decrease_calls: self.metrics.decrease_calls,
            floor_evictions: self.metrics.floor_evictions,
            clear_calls: self.metrics.clear_calls,
            lookup_calls: self.metrics.lookup_calls.get(),
            lookup_found: self.metrics.lookup_found.get(),
            extremum_calls: self.metrics.extremum_calls.get(),
            compactions: self.metrics.compactions,
            relocated_records: self.metrics.relocated_records,
            extremum_rescans: self.list.rescans(),
            queue_len: self.len(),
            slot_count: self.list.slot_count(),
            capacity: self.capacity,
        }
    }
}

#[cfg(feature = "metrics")]
impl MetricsSnapshotProvider<HighQueueMetricsSnapshot> for HighFrequencyQueue {
    fn snapshot(&self) -> HighQueueMetricsSnapshot {
        self.metrics_snapshot()
    }
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use crate::pair::OccurrenceHandle;
    use proptest::prelude::*;
    use std::collections::HashMap;

    const FLOOR: Frequency = 3;
    const CAPACITY: usize = 12;

    fn pair(n: u32) -> SymbolPair {
        SymbolPair::new(n, n)
    }

    proptest! {
        /// Property: the queue agrees with a reference map after every operation
        #[cfg_attr(miri, ignore)]
        #[test]
        fn prop_matches_reference_model(
            ops in prop::collection::vec((0u8..4, 0u32..16, FLOOR..40u64), 0..200)
        ) {
            let mut queue = HighFrequencyQueue::new(CAPACITY, FLOOR);
            let mut model: HashMap<SymbolPair, Frequency> = HashMap::new();

            for (op, n, freq) in ops {
                let p = pair(n);
                match op {
                    0 => {
                        let record = PairRecord::new(p, OccurrenceHandle::new(n as u64), 0, freq);
                        let result = queue.insert(record);
                        if model.contains_key(&p) {
                            prop_assert_eq!(result, Err(QueueError::DuplicatePair(p)));
                        } else if model.len() >= CAPACITY {
                            prop_assert_eq!(result, Err(QueueError::CapacityExceeded { capacity: CAPACITY }));
                        } else {
                            prop_assert!(result.is_ok());
                            model.insert(p, freq);
                        }
                    }
                    1 => {
                        let result = queue.decrease(p);
                        match model.get(&p).copied() {
                            None => prop_assert_eq!(result, Err(QueueError::MissingPair(p))),
                            Some(f) if f - 1 < FLOOR => {
                                prop_assert!(matches!(result, Ok(DecreaseOutcome::Evicted(r)) if r.frequency == f - 1));
                                model.remove(&p);
                            }
                            Some(f) => {
                                prop_assert_eq!(result, Ok(DecreaseOutcome::Retained { frequency: f - 1 }));
                                model.insert(p, f - 1);
                            }
                        }
                    }
                    2 => {
                        let result = queue.remove(p).map(|r| r.frequency);
                        match model.remove(&p) {
                            Some(f) => prop_assert_eq!(result, Ok(f)),
                            None => prop_assert_eq!(result, Err(QueueError::MissingPair(p))),
                        }
                    }
                    3 => {
                        if let Ok(record) = queue.pop_max() {
                            let top = model.values().copied().max();
                            prop_assert_eq!(Some(record.frequency), top);
                            model.remove(&record.pair);
                        } else {
                            prop_assert!(model.is_empty());
                        }
                    }
                    _ => unreachable!(),
                }

                prop_assert!(queue.check_invariants().is_ok());
                prop_assert_eq!(queue.len(), model.len());
                for (p, f) in &model {
                    prop_assert_eq!(queue.frequency(*p), Some(*f));
                }
                if let Ok(max) = queue.max() {
                    prop_assert_eq!(model.get(&max).copied(), model.values().copied().max());
                }
                if let Ok(min) = queue.min() {
                    prop_assert_eq!(model.get(&min).copied(), model.values().copied().min());
                }
            }
        }
    }
}
