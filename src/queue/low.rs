//! Low-frequency pair queue.
//!
//! Holds every pair whose frequency lies in `[floor, ceiling)`, where the
//! ceiling is the global high/low threshold. Pairs are bucketed by exact
//! frequency in [`FrequencyBuckets`], whose chain over the non-empty buckets
//! gives O(1) access to the lowest and highest occupied frequency.
//!
//! ## Decrease Flow
//!
//! ```text
//!   decrease((a,b)) with (a,b) at f = 4, floor = 1:
//!
//!     chain before:   1 ◄──► 4 ◄──► 7          bucket 3 empty
//!     1. unlink (a,b) from bucket 4's list
//!     2. bucket 4 empty?  yes → unlink 4:      1 ◄──► 7
//!     3. bucket 3 empty?  yes → splice between 4's old neighbours:
//!                                              1 ◄──► 3 ◄──► 7
//!     4. push (a,b) to the front of bucket 3
//!     5. 3 < floor?  no → Retained { frequency: 3 }
//! ```
//!
//! ## Representatives
//!
//! - `max()`: oldest pair of the highest bucket.
//! - `min()`: oldest pair of the lowest bucket.
//! - `head()`: newest pair of the lowest bucket, i.e. the head of that
//!   bucket's list.
//!
//! ## Example Usage
//!
//! ```
//! use repairkit::pair::{OccurrenceHandle, PairRecord, SymbolPair};
//! use repairkit::queue::LowFrequencyQueue;
//!
//! let mut queue = LowFrequencyQueue::new(32, 10, 1);
//! let ab = SymbolPair::new(b'a' as u32, b'b' as u32);
//! let cd = SymbolPair::new(b'c' as u32, b'd' as u32);
//! queue.insert(PairRecord::new(ab, OccurrenceHandle::new(0), 0, 5))?;
//! queue.insert(PairRecord::new(cd, OccurrenceHandle::new(1), 0, 3))?;
//!
//! assert_eq!(queue.max()?, ab);
//! for _ in 0..5 {
//!     queue.decrease(ab)?;
//! }
//! assert!(!queue.contains(ab));
//! assert_eq!(queue.max()?, cd);
//! # Ok::<(), repairkit::error::QueueError>(())
//! ```

use crate::ds::frequency_buckets::FrequencyBuckets;
use crate::error::{ConfigError, InvariantError, QueueError};
use crate::pair::{Frequency, OccurrenceHandle, PairRecord, SymbolPair, Triple};
use crate::traits::{DecreaseOutcome, PairQueue};

#[cfg(feature = "metrics")]
use crate::metrics::metrics_impl::LowQueueMetrics;
#[cfg(feature = "metrics")]
use crate::metrics::snapshot::LowQueueMetricsSnapshot;
#[cfg(feature = "metrics")]
use crate::metrics::traits::{
    CoreQueueMetricsRecorder, LowQueueMetricsRecorder, MetricsSnapshotProvider,
    QueueMetricsReadRecorder,
};

/// The part of a record the buckets carry without looking at it.
#[derive(Debug, Clone, Copy)]
struct Handles {
    occurrences: OccurrenceHandle,
    aux: u64,
}

/// Queue of pairs with `floor <= frequency < ceiling`.
#[derive(Debug)]
pub struct LowFrequencyQueue {
    buckets: FrequencyBuckets<SymbolPair, Handles>,
    capacity: usize,
    floor: Frequency,
    #[cfg(feature = "metrics")]
    metrics: LowQueueMetrics,
}

impl LowFrequencyQueue {
    /// Creates a queue for up to `capacity` pairs with frequencies in
    /// `[floor, ceiling)`.
    ///
    /// # Panics
    ///
    /// Panics if parameters are invalid. See [`try_new`](Self::try_new).
    pub fn new(capacity: usize, ceiling: Frequency, floor: Frequency) -> Self {
        match Self::try_new(capacity, ceiling, floor) {
            Ok(queue) => queue,
            Err(e) => panic!("{}", e),
        }
    }

    /// Creates a queue, returning an error on invalid parameters.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `capacity` or `ceiling` is zero, if
    /// `floor >= ceiling` (no frequency would be admissible), or if the
    /// bucket array or pair table cannot be allocated.
    pub fn try_new(
        capacity: usize,
        ceiling: Frequency,
        floor: Frequency,
    ) -> Result<Self, ConfigError> {
        if capacity == 0 {
            return Err(ConfigError::new("queue capacity must be greater than zero"));
        }
        if ceiling == 0 {
            return Err(ConfigError::new(
                "low-frequency ceiling must be greater than zero",
            ));
        }
        if floor >= ceiling {
            return Err(ConfigError::new(format!(
                "low-frequency floor {} must be below the ceiling {}",
                floor, ceiling
            )));
        }
        let buckets = FrequencyBuckets::try_with_capacity(ceiling, capacity).map_err(|e| {
            ConfigError::new(format!(
                "low-frequency queue with ceiling {} and capacity {} does not fit in memory: {}",
                ceiling, capacity, e
            ))
        })?;
        Ok(Self {
            buckets,
            capacity,
            floor,
            #[cfg(feature = "metrics")]
            metrics: LowQueueMetrics::default(),
        })
    }

    /// Minimum admissible frequency (inclusive).
    pub fn floor(&self) -> Frequency {
        self.floor
    }

    /// Upper bound on admissible frequency (exclusive).
    pub fn ceiling(&self) -> Frequency {
        self.buckets.ceiling()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn contains(&self, pair: SymbolPair) -> bool {
        self.buckets.contains(&pair)
    }

    /// Returns `true` if a record at `frequency` may be inserted.
    pub fn admits(&self, frequency: Frequency) -> bool {
        frequency >= self.floor && frequency < self.ceiling()
    }

    pub fn get(&self, pair: SymbolPair) -> Option<Triple> {
        #[cfg(feature = "metrics")]
        (&self.metrics).record_lookup_call();

        let triple = self
            .buckets
            .get(&pair)
            .map(|(handles, frequency)| Triple {
                occurrences: handles.occurrences,
                aux: handles.aux,
                frequency,
            });

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
        self.buckets.frequency(&pair)
    }

    /// A pair from the highest occupied frequency bucket.
    pub fn max(&self) -> Result<SymbolPair, QueueError> {
        #[cfg(feature = "metrics")]
        (&self.metrics).record_extremum_call();

        self.buckets
            .peek_max()
            .map(|(pair, _)| *pair)
            .ok_or(QueueError::EmptyQueue)
    }

    /// A pair from the lowest occupied frequency bucket.
    pub fn min(&self) -> Result<SymbolPair, QueueError> {
        #[cfg(feature = "metrics")]
        (&self.metrics).record_extremum_call();

        self.buckets
            .peek_min()
            .map(|(pair, _)| *pair)
            .ok_or(QueueError::EmptyQueue)
    }

    /// The head of the lowest occupied bucket's list (its newest pair).
    pub fn head(&self) -> Result<SymbolPair, QueueError> {
        #[cfg(feature = "metrics")]
        (&self.metrics).record_extremum_call();

        self.buckets
            .peek_head()
            .map(|(pair, _)| *pair)
            .ok_or(QueueError::EmptyQueue)
    }

    /// Lowest occupied frequency.
    pub fn min_frequency(&self) -> Option<Frequency> {
        self.buckets.min_freq()
    }

    /// Highest occupied frequency.
    pub fn max_frequency(&self) -> Option<Frequency> {
        self.buckets.max_freq()
    }

    /// Occupied frequencies in ascending chain order.
    pub fn frequencies(&self) -> impl Iterator<Item = Frequency> + '_ {
        self.buckets.frequencies()
    }

    /// Number of pairs at exactly `frequency`.
    pub fn bucket_len(&self, frequency: Frequency) -> usize {
        self.buckets.bucket_len(frequency)
    }

    /// Pairs at exactly `frequency`, head first.
    pub fn bucket_pairs(&self, frequency: Frequency) -> impl Iterator<Item = SymbolPair> + '_ {
        self.buckets.iter_bucket(frequency).copied()
    }

    /// Total chain steps spent splicing buckets in on insert.
    pub fn chain_probes(&self) -> u64 {
        self.buckets.chain_probes()
    }

    /// Queues `record` in the bucket for its frequency.
    ///
    /// # Errors
    ///
    /// - [`QueueError::DuplicatePair`] if the pair is already queued.
    /// - [`QueueError::FrequencyOutOfRange`] if the frequency is outside
    ///   `[floor, ceiling)`.
    /// - [`QueueError::CapacityExceeded`] if the queue is full.
    pub fn insert(&mut self, record: PairRecord) -> Result<(), QueueError> {
        #[cfg(feature = "metrics")]
        self.metrics.record_insert_call();

        if let Err(err) = self.check_insert(&record) {
            #[cfg(feature = "metrics")]
            self.metrics.record_insert_rejected();
            return Err(err);
        }

        let handles = Handles {
            occurrences: record.occurrences,
            aux: record.aux,
        };
        let inserted = self.buckets.insert(record.pair, record.frequency, handles);
        debug_assert!(inserted, "pre-checked insert rejected by buckets");
        Ok(())
    }

    /// Removes `pair` and returns its record.
    ///
    /// # Errors
    ///
    /// [`QueueError::MissingPair`] if `pair` is not queued.
    pub fn remove(&mut self, pair: SymbolPair) -> Result<PairRecord, QueueError> {
        #[cfg(feature = "metrics")]
        self.metrics.record_remove_call();

        let (handles, frequency) = self
            .buckets
            .remove(&pair)
            .ok_or(QueueError::MissingPair(pair))?;
        Ok(PairRecord::new(pair, handles.occurrences, handles.aux, frequency))
    }

    /// Moves `pair` one bucket down. If the new frequency is below the floor
    /// the pair is removed and returned as [`DecreaseOutcome::Evicted`].
    ///
    /// # Errors
    ///
    /// - [`QueueError::MissingPair`] if `pair` is not queued.
    /// - [`QueueError::FrequencyExhausted`] if its frequency is already zero
    ///   (only reachable with a floor of zero).
    pub fn decrease(&mut self, pair: SymbolPair) -> Result<DecreaseOutcome, QueueError> {
        #[cfg(feature = "metrics")]
        self.metrics.record_decrease_call();

        if !self.buckets.contains(&pair) {
            return Err(QueueError::MissingPair(pair));
        }
        let Some(frequency) = self.buckets.decrement(&pair) else {
            #[cfg(feature = "metrics")]
            self.metrics.record_decrease_exhausted();
            return Err(QueueError::FrequencyExhausted(pair));
        };

        if frequency < self.floor {
            #[cfg(feature = "metrics")]
            self.metrics.record_floor_eviction();
            let record = self.remove(pair)?;
            return Ok(DecreaseOutcome::Evicted(record));
        }
        Ok(DecreaseOutcome::Retained { frequency })
    }

    /// Removes and returns a record from the highest occupied bucket.
    pub fn pop_max(&mut self) -> Result<PairRecord, QueueError> {
        let pair = self.max()?;
        self.remove(pair)
    }

    /// Iterates queued records in storage order.
    pub fn iter(&self) -> impl Iterator<Item = PairRecord> + '_ {
        self.buckets.iter().map(|(pair, handles, frequency)| {
            PairRecord::new(*pair, handles.occurrences, handles.aux, frequency)
        })
    }

    pub fn clear(&mut self) {
        #[cfg(feature = "metrics")]
        self.metrics.record_clear();

        self.buckets.clear();
    }

    pub fn approx_bytes(&self) -> usize {
        std::mem::size_of::<Self>() + self.buckets.approx_bytes()
    }

    /// Verifies the bucket chain and that every pair is within range.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        self.buckets.check_invariants()?;
        if self.len() > self.capacity {
            return Err(InvariantError::new(format!(
                "{} pairs queued over capacity {}",
                self.len(),
                self.capacity
            )));
        }
        if let Some(min) = self.buckets.min_freq() {
            if min < self.floor {
                return Err(InvariantError::new(format!(
                    "bucket {} occupied below floor {}",
                    min, self.floor
                )));
            }
        }
        Ok(())
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        if let Err(err) = self.check_invariants() {
            panic!("low-frequency queue invariant violated: {}", err);
        }
    }

    fn check_insert(&self, record: &PairRecord) -> Result<(), QueueError> {
        if self.buckets.contains(&record.pair) {
            return Err(QueueError::DuplicatePair(record.pair));
        }
        if !self.admits(record.frequency) {
            return Err(QueueError::FrequencyOutOfRange {
                pair: record.pair,
                frequency: record.frequency,
                min: self.floor,
                max: Some(self.ceiling()),
            });
        }
        if self.buckets.len() >= self.capacity {
            return Err(QueueError::CapacityExceeded {
                capacity: self.capacity,
            });
        }
        Ok(())
    }
}

impl PairQueue for LowFrequencyQueue {
    fn insert(&mut self, record: PairRecord) -> Result<(), QueueError> {
        LowFrequencyQueue::insert(self, record)
    }

    fn get(&self, pair: SymbolPair) -> Option<Triple> {
        LowFrequencyQueue::get(self, pair)
    }

    fn contains(&self, pair: SymbolPair) -> bool {
        LowFrequencyQueue::contains(self, pair)
    }

    fn len(&self) -> usize {
        LowFrequencyQueue::len(self)
    }

    fn capacity(&self) -> usize {
        LowFrequencyQueue::capacity(self)
    }

    fn max(&self) -> Result<SymbolPair, QueueError> {
        LowFrequencyQueue::max(self)
    }

    fn min(&self) -> Result<SymbolPair, QueueError> {
        LowFrequencyQueue::min(self)
    }

    fn remove(&mut self, pair: SymbolPair) -> Result<PairRecord, QueueError> {
        LowFrequencyQueue::remove(self, pair)
    }

    fn decrease(&mut self, pair: SymbolPair) -> Result<DecreaseOutcome, QueueError> {
        LowFrequencyQueue::decrease(self, pair)
    }

    fn admits(&self, frequency: Frequency) -> bool {
        LowFrequencyQueue::admits(self, frequency)
    }
}

#[cfg(feature = "metrics")]
impl LowFrequencyQueue {
    pub fn metrics_snapshot(&self) -> LowQueueMetricsSnapshot {
        LowQueueMetricsSnapshot {
            insert_calls: self.metrics.insert_calls,
            insert_rejected: self.metrics.insert_rejected,
            remove_calls: self.metrics.remove_calls,
            decrease_calls: self.metrics.decrease_calls,
            floor_evictions: self.metrics.floor_evictions,
            clear_calls: self.metrics.clear_calls,
            decrease_exhausted: self.metrics.decrease_exhausted,
            lookup_calls: self.metrics.lookup_calls.get(),
            lookup_found: self.metrics.lookup_found.get(),
            extremum_calls: self.metrics.extremum_calls.get(),
            chain_probes: self.buckets.chain_probes(),
            linked_buckets: self.buckets.linked_buckets(),
            queue_len: self.len(),
            capacity: self.capacity,
        }
    }
}

#[cfg(feature = "metrics")]
impl MetricsSnapshotProvider<LowQueueMetricsSnapshot> for LowFrequencyQueue {
    fn snapshot(&self) -> LowQueueMetricsSnapshot {
        self.metrics_snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(n: u32) -> SymbolPair {
        SymbolPair::new(n, n + 100)
    }

    fn record(n: u32, frequency: Frequency) -> PairRecord {
        PairRecord::new(pair(n), OccurrenceHandle::new(u64::from(n)), 7, frequency)
    }

    #[test]
    fn try_new_validates_parameters() {
        assert!(LowFrequencyQueue::try_new(0, 8, 1).is_err());
        assert!(LowFrequencyQueue::try_new(8, 0, 0).is_err());
        assert!(LowFrequencyQueue::try_new(8, 4, 4).is_err());
        let queue = LowFrequencyQueue::try_new(8, 4, 0).unwrap();
        assert_eq!(queue.ceiling(), 4);
        assert_eq!(queue.floor(), 0);
        assert_eq!(queue.capacity(), 8);
    }

    #[test]
    fn try_new_reports_unallocatable_sizes() {
        let err = LowFrequencyQueue::try_new(1, Frequency::MAX, 0).unwrap_err();
        assert!(err.to_string().contains("does not fit in memory"));
        assert!(LowFrequencyQueue::try_new(usize::MAX, 8, 0).is_err());
    }

    #[test]
    fn insert_rejects_out_of_range_and_duplicates() {
        let mut queue = LowFrequencyQueue::new(2, 6, 1);
        assert_eq!(
            queue.insert(record(1, 6)),
            Err(QueueError::FrequencyOutOfRange {
                pair: pair(1),
                frequency: 6,
                min: 1,
                max: Some(6),
            })
        );
        assert!(queue.insert(record(1, 0)).is_err());
        queue.insert(record(1, 5)).unwrap();
        assert_eq!(
            queue.insert(record(1, 2)),
            Err(QueueError::DuplicatePair(pair(1)))
        );
        queue.insert(record(2, 1)).unwrap();
        assert_eq!(
            queue.insert(record(3, 1)),
            Err(QueueError::CapacityExceeded { capacity: 2 })
        );
        assert_eq!(queue.len(), 2);
        queue.debug_validate_invariants();
    }

    #[test]
    fn lookup_returns_carried_handles() {
        let mut queue = LowFrequencyQueue::new(4, 6, 1);
        queue.insert(record(3, 4)).unwrap();
        let triple = queue.lookup(pair(3)).unwrap();
        assert_eq!(triple.occurrences, OccurrenceHandle::new(3));
        assert_eq!(triple.aux, 7);
        assert_eq!(triple.frequency, 4);

        queue.decrease(pair(3)).unwrap();
        assert_eq!(queue.lookup(pair(3)).map(|t| t.frequency), Ok(3));
        assert_eq!(queue.lookup(pair(3)).map(|t| t.occurrences), Ok(OccurrenceHandle::new(3)));
    }

    #[test]
    fn empty_queue_order_statistics_fail() {
        let queue = LowFrequencyQueue::new(4, 6, 1);
        assert_eq!(queue.max(), Err(QueueError::EmptyQueue));
        assert_eq!(queue.min(), Err(QueueError::EmptyQueue));
        assert_eq!(queue.head(), Err(QueueError::EmptyQueue));
    }

    #[test]
    fn head_is_newest_of_lowest_bucket() {
        let mut queue = LowFrequencyQueue::new(8, 6, 1);
        queue.insert(record(1, 2)).unwrap();
        queue.insert(record(2, 2)).unwrap();
        queue.insert(record(3, 4)).unwrap();

        assert_eq!(queue.min(), Ok(pair(1)));
        assert_eq!(queue.head(), Ok(pair(2)));
        assert_eq!(queue.max(), Ok(pair(3)));
        assert_eq!(
            queue.bucket_pairs(2).collect::<Vec<_>>(),
            vec![pair(2), pair(1)]
        );
    }

    #[test]
    fn decrease_at_zero_with_zero_floor_fails() {
        let mut queue = LowFrequencyQueue::new(4, 3, 0);
        queue.insert(record(1, 1)).unwrap();
        assert_eq!(
            queue.decrease(pair(1)),
            Ok(DecreaseOutcome::Retained { frequency: 0 })
        );
        assert_eq!(
            queue.decrease(pair(1)),
            Err(QueueError::FrequencyExhausted(pair(1)))
        );
        assert_eq!(queue.frequency(pair(1)), Some(0));
        queue.debug_validate_invariants();
    }

    #[test]
    fn decrease_missing_pair_fails() {
        let mut queue = LowFrequencyQueue::new(4, 3, 0);
        assert_eq!(
            queue.decrease(pair(1)),
            Err(QueueError::MissingPair(pair(1)))
        );
    }

    #[test]
    fn decrease_walks_down_and_evicts_at_floor() {
        let mut queue = LowFrequencyQueue::new(4, 8, 2);
        queue.insert(record(1, 4)).unwrap();
        queue.insert(record(2, 6)).unwrap();

        assert_eq!(queue.decrease(pair(2)).map(|o| o.frequency()), Ok(5));
        assert_eq!(queue.frequencies().collect::<Vec<_>>(), vec![4, 5]);
        assert_eq!(queue.decrease(pair(1)).map(|o| o.frequency()), Ok(3));
        assert_eq!(queue.decrease(pair(1)).map(|o| o.frequency()), Ok(2));

        let outcome = queue.decrease(pair(1)).unwrap();
        assert_eq!(outcome, DecreaseOutcome::Evicted(record(1, 1)));
        assert!(!queue.contains(pair(1)));
        assert_eq!(queue.frequencies().collect::<Vec<_>>(), vec![5]);
        assert_eq!(queue.chain_probes(), 0);
        queue.debug_validate_invariants();
    }

    #[test]
    fn remove_returns_record_and_unlinks_bucket() {
        let mut queue = LowFrequencyQueue::new(4, 8, 1);
        queue.insert(record(1, 3)).unwrap();
        queue.insert(record(2, 5)).unwrap();
        assert_eq!(queue.remove(pair(1)), Ok(record(1, 3)));
        assert_eq!(queue.min_frequency(), Some(5));
        assert_eq!(queue.bucket_len(3), 0);
        assert_eq!(queue.remove(pair(1)), Err(QueueError::MissingPair(pair(1))));
        queue.debug_validate_invariants();
    }

    #[test]
    fn pop_max_drains_in_non_increasing_order() {
        let mut queue = LowFrequencyQueue::new(8, 9, 1);
        for (n, f) in [(1, 3), (2, 8), (3, 1), (4, 5), (5, 8)] {
            queue.insert(record(n, f)).unwrap();
        }
        let mut drained = Vec::new();
        while let Ok(record) = queue.pop_max() {
            drained.push(record.frequency);
            queue.debug_validate_invariants();
        }
        assert_eq!(drained, vec![8, 8, 5, 3, 1]);
    }

    #[test]
    fn iter_and_clear() {
        let mut queue = LowFrequencyQueue::new(8, 9, 1);
        queue.insert(record(1, 3)).unwrap();
        queue.insert(record(2, 4)).unwrap();
        let mut records: Vec<_> = queue.iter().collect();
        records.sort_by_key(|r| r.frequency);
        assert_eq!(records, vec![record(1, 3), record(2, 4)]);

        queue.clear();
        assert!(queue.is_empty());
        assert_eq!(queue.frequencies().count(), 0);
        queue.debug_validate_invariants();
    }
}
