//! Error types for the repairkit library.
//!
//! ## Key Components
//!
//! - [`QueueError`]: Returned when a queue operation's precondition does not
//!   hold (absent pair, duplicate insert, frequency out of range, capacity
//!   exceeded, empty queue). These are contract violations by the caller and
//!   are not meant to be retried.
//! - [`InvariantError`]: Returned when internal data-structure invariants are
//!   violated (`check_invariants` methods).
//! - [`ConfigError`]: Returned when queue configuration parameters are invalid
//!   (e.g. zero capacity, a high-frequency floor of one).
//!
//! ## Example Usage
//!
//! ```
//! use repairkit::error::{ConfigError, QueueError};
//! use repairkit::pair::SymbolPair;
//! use repairkit::queue::LowFrequencyQueue;
//!
//! // Fallible constructor for user-configurable parameters
//! let queue: Result<LowFrequencyQueue, ConfigError> = LowFrequencyQueue::try_new(16, 8, 1);
//! assert!(queue.is_ok());
//!
//! // A floor at or above the ceiling is caught without panicking
//! assert!(LowFrequencyQueue::try_new(16, 8, 8).is_err());
//!
//! // Contract violations surface as errors rather than silent no-ops
//! let mut queue = queue.unwrap();
//! let err = queue.remove(SymbolPair::new(1, 2)).unwrap_err();
//! assert_eq!(err, QueueError::MissingPair(SymbolPair::new(1, 2)));
//! ```

use std::fmt;

use crate::pair::{Frequency, SymbolPair};

// ---------------------------------------------------------------------------
// QueueError
// ---------------------------------------------------------------------------

/// Precondition violation reported by a frequency queue.
///
/// A correctly behaving driver never triggers one of these; the queue state is
/// left untouched when an operation fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueError {
    /// `insert` of a pair that is already present.
    DuplicatePair(SymbolPair),
    /// Operation on a pair that is not present.
    MissingPair(SymbolPair),
    /// `insert` with a frequency outside the queue's admissible range.
    ///
    /// `max` is `None` when the range has no upper bound.
    FrequencyOutOfRange {
        pair: SymbolPair,
        frequency: Frequency,
        min: Frequency,
        max: Option<Frequency>,
    },
    /// `insert` would exceed the configured number of distinct pairs.
    CapacityExceeded { capacity: usize },
    /// `max`/`min`/`head` on an empty queue.
    EmptyQueue,
    /// `decrease` on a pair whose frequency is already zero.
    FrequencyExhausted(SymbolPair),
}

impl fmt::Display for QueueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueueError::DuplicatePair(pair) => write!(f, "pair {} is already queued", pair),
            QueueError::MissingPair(pair) => write!(f, "pair {} is not queued", pair),
            QueueError::FrequencyOutOfRange {
                pair,
                frequency,
                min,
                max: Some(max),
            } => write!(
                f,
                "frequency {} of pair {} is outside [{}, {})",
                frequency, pair, min, max
            ),
            QueueError::FrequencyOutOfRange {
                pair,
                frequency,
                min,
                max: None,
            } => write!(
                f,
                "frequency {} of pair {} is below the floor {}",
                frequency, pair, min
            ),
            QueueError::CapacityExceeded { capacity } => {
                write!(f, "queue capacity of {} pairs exceeded", capacity)
            },
            QueueError::EmptyQueue => f.write_str("queue is empty"),
            QueueError::FrequencyExhausted(pair) => {
                write!(f, "frequency of pair {} is already zero", pair)
            },
        }
    }
}

impl std::error::Error for QueueError {}

// ---------------------------------------------------------------------------
// InvariantError
// ---------------------------------------------------------------------------

/// Error returned when internal queue invariants are violated.
///
/// Produced by `check_invariants` methods on queue types
/// (e.g. [`LowFrequencyQueue::check_invariants`](crate::queue::LowFrequencyQueue::check_invariants)).
/// Carries a human-readable description of which invariant failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantError(String);

impl InvariantError {
    /// Creates a new `InvariantError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InvariantError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for InvariantError {}

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Error returned when queue configuration parameters are invalid.
///
/// Produced by fallible constructors such as
/// [`HighFrequencyQueue::try_new`](crate::queue::HighFrequencyQueue::try_new)
/// and [`QueueBuilder::try_build`](crate::builder::QueueBuilder::try_build).
/// Carries a human-readable description of which parameter failed validation.
///
/// # Example
///
/// ```
/// use repairkit::queue::HighFrequencyQueue;
///
/// let err = HighFrequencyQueue::try_new(0, 4).unwrap_err();
/// assert!(err.to_string().contains("capacity"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError(String);

impl ConfigError {
    /// Creates a new `ConfigError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for ConfigError {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
