//! # Pair Queue Traits
//!
//! This module defines the interface shared by the two frequency queues, so a
//! compression driver can address either one uniformly while it moves pairs
//! between them.
//!
//! ## Architecture
//!
//! ```text
//!                     ┌─────────────────────────────────────────────┐
//!                     │                 PairQueue                   │
//!                     │                                             │
//!                     │  insert(&mut, PairRecord) → Result<()>      │
//!                     │  get(&, SymbolPair) → Option<Triple>        │
//!                     │  lookup(&, SymbolPair) → Result<Triple>     │
//!                     │  contains(&, SymbolPair) → bool             │
//!                     │  len(&) / is_empty(&) / capacity(&)         │
//!                     │  max(&) / min(&) → Result<SymbolPair>       │
//!                     │  remove(&mut, SymbolPair) → Result<Record>  │
//!                     │  decrease(&mut, SymbolPair)                 │
//!                     │        → Result<DecreaseOutcome>            │
//!                     │  admits(&, Frequency) → bool                │
//!                     └──────────────────────┬──────────────────────┘
//!                                            │
//!                   ┌────────────────────────┴────────────────────────┐
//!                   ▼                                                 ▼
//!     ┌──────────────────────────────┐                ┌──────────────────────────────┐
//!     │     HighFrequencyQueue       │                │      LowFrequencyQueue       │
//!     │  admits f >= floor           │                │  admits floor <= f < ceiling │
//!     │  backing list + cached min/  │                │  exact-frequency buckets +   │
//!     │  max, compacting             │                │  chain over non-empty ones   │
//!     └──────────────────────────────┘                └──────────────────────────────┘
//! ```
//!
//! ## Driver Responsibilities
//!
//! | Concern                                  | Owner   |
//! |------------------------------------------|---------|
//! | Global max: high queue first, then low   | driver  |
//! | Migration when a pair crosses threshold  | driver  |
//! | A pair lives in exactly one queue        | driver  |
//! | Record bijection with lookup table       | queue   |
//! | Eviction below the floor on `decrease`   | queue   |
//!
//! ## Example: migrating on eviction
//!
//! ```
//! use repairkit::pair::{OccurrenceHandle, PairRecord, SymbolPair};
//! use repairkit::queue::{HighFrequencyQueue, LowFrequencyQueue};
//! use repairkit::traits::{DecreaseOutcome, PairQueue};
//!
//! let threshold = 4;
//! let mut high = HighFrequencyQueue::new(8, threshold);
//! let mut low = LowFrequencyQueue::new(8, threshold, 1);
//!
//! let ab = SymbolPair::new(1, 2);
//! high.insert(PairRecord::new(ab, OccurrenceHandle::new(0), 0, 4))?;
//!
//! if let DecreaseOutcome::Evicted(record) = high.decrease(ab)? {
//!     if low.admits(record.frequency) {
//!         low.insert(record)?;
//!     }
//! }
//! assert!(!high.contains(ab));
//! assert_eq!(low.lookup(ab)?.frequency, 3);
//! # Ok::<(), repairkit::error::QueueError>(())
//! ```

use crate::error::QueueError;
use crate::pair::{Frequency, PairRecord, SymbolPair, Triple};

/// Result of a successful `decrease`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecreaseOutcome {
    /// The pair is still queued at this frequency.
    Retained { frequency: Frequency },
    /// The new frequency fell below the floor; the pair left the queue.
    ///
    /// The record carries the lowered frequency so the caller can hand it
    /// to another queue.
    Evicted(PairRecord),
}

impl DecreaseOutcome {
    /// Frequency after the decrement, whether or not the pair was kept.
    pub fn frequency(&self) -> Frequency {
        match self {
            DecreaseOutcome::Retained { frequency } => *frequency,
            DecreaseOutcome::Evicted(record) => record.frequency,
        }
    }

    pub fn is_evicted(&self) -> bool {
        matches!(self, DecreaseOutcome::Evicted(_))
    }
}

/// Operations common to the high- and low-frequency queues.
pub trait PairQueue {
    /// Queues a new pair. Fails if the pair is present, its frequency is not
    /// admissible, or the queue is full.
    fn insert(&mut self, record: PairRecord) -> Result<(), QueueError>;

    /// Returns the triple of `pair`, or `None` if absent.
    fn get(&self, pair: SymbolPair) -> Option<Triple>;

    /// Returns the triple of `pair`, failing if absent.
    fn lookup(&self, pair: SymbolPair) -> Result<Triple, QueueError> {
        self.get(pair).ok_or(QueueError::MissingPair(pair))
    }

    fn contains(&self, pair: SymbolPair) -> bool;

    /// Number of queued pairs.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of distinct pairs.
    fn capacity(&self) -> usize;

    /// A pair with the highest frequency.
    fn max(&self) -> Result<SymbolPair, QueueError>;

    /// A pair with the lowest frequency.
    fn min(&self) -> Result<SymbolPair, QueueError>;

    /// Removes `pair`, returning its record.
    fn remove(&mut self, pair: SymbolPair) -> Result<PairRecord, QueueError>;

    /// Lowers the frequency of `pair` by one, evicting it below the floor.
    fn decrease(&mut self, pair: SymbolPair) -> Result<DecreaseOutcome, QueueError>;

    /// Returns `true` if a record at `frequency` may be inserted.
    fn admits(&self, frequency: Frequency) -> bool;

    /// Removes and returns a record with the highest frequency.
    fn pop_max(&mut self) -> Result<PairRecord, QueueError> {
        let pair = self.max()?;
        self.remove(pair)
    }
}
