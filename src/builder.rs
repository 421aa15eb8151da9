//! Builder for a matched pair of frequency queues.
//!
//! A compression driver needs a high-frequency queue and a low-frequency
//! queue that agree on a single threshold: the high queue admits
//! `f >= threshold` and the low queue admits `floor <= f < threshold`.
//! [`QueueBuilder`] derives both from one set of parameters so they cannot
//! drift apart.
//!
//! ## Example
//!
//! ```rust
//! use repairkit::builder::QueueBuilder;
//!
//! let queues = QueueBuilder::new(1024).threshold(32).floor(2).build();
//! assert_eq!(queues.high.floor(), 32);
//! assert_eq!(queues.low.ceiling(), 32);
//! assert_eq!(queues.low.floor(), 2);
//!
//! // Layout for a sequence of 10_000 symbols: threshold = ceil(sqrt(n)).
//! let queues = QueueBuilder::for_sequence_len(10_000).build();
//! assert_eq!(queues.high.floor(), 100);
//! assert_eq!(queues.high.capacity(), 101);
//! assert_eq!(queues.low.capacity(), 10_000);
//! ```

use crate::error::ConfigError;
use crate::pair::Frequency;
use crate::queue::{HighFrequencyQueue, LowFrequencyQueue};
use crate::traits::PairQueue;

/// Default split between the two queues.
pub const DEFAULT_THRESHOLD: Frequency = 2;

/// Default lowest frequency kept by the low queue.
pub const DEFAULT_FLOOR: Frequency = 1;

/// A high/low queue pair sharing one threshold.
#[derive(Debug)]
pub struct QueuePair {
    pub high: HighFrequencyQueue,
    pub low: LowFrequencyQueue,
}

impl QueuePair {
    /// The frequency at which pairs move from the low to the high queue.
    pub fn threshold(&self) -> Frequency {
        self.high.floor()
    }

    /// Pairs queued across both queues.
    pub fn len(&self) -> usize {
        self.high.len() + self.low.len()
    }

    pub fn is_empty(&self) -> bool {
        self.high.is_empty() && self.low.is_empty()
    }

    /// Routes a frequency to the queue that admits it.
    pub fn queue_for(&mut self, frequency: Frequency) -> Option<&mut dyn PairQueue> {
        if self.high.admits(frequency) {
            Some(&mut self.high)
        } else if self.low.admits(frequency) {
            Some(&mut self.low)
        } else {
            None
        }
    }

    pub fn clear(&mut self) {
        self.high.clear();
        self.low.clear();
    }
}

/// Builder for [`QueuePair`].
#[derive(Debug, Clone)]
pub struct QueueBuilder {
    capacity: usize,
    high_capacity: Option<usize>,
    low_capacity: Option<usize>,
    threshold: Frequency,
    floor: Frequency,
}

impl QueueBuilder {
    /// Create a new builder where both queues hold up to `capacity` pairs.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            high_capacity: None,
            low_capacity: None,
            threshold: DEFAULT_THRESHOLD,
            floor: DEFAULT_FLOOR,
        }
    }

    /// Standard layout for a sequence of `len` symbols.
    ///
    /// The threshold is `max(2, ceil(sqrt(len)))`. At most `len / threshold`
    /// distinct pairs can reach it, so the high queue is sized to that, and
    /// the low queue can hold one pair per position.
    pub fn for_sequence_len(len: usize) -> Self {
        let threshold = ceil_sqrt(len as u64).max(DEFAULT_THRESHOLD);
        let high_capacity = (len as u64 / threshold) as usize + 1;
        Self::new(len.max(1))
            .threshold(threshold)
            .high_capacity(high_capacity)
    }

    pub fn threshold(mut self, threshold: Frequency) -> Self {
        self.threshold = threshold;
        self
    }

    /// Lowest frequency the low queue keeps; pairs decreased below it are
    /// evicted.
    pub fn floor(mut self, floor: Frequency) -> Self {
        self.floor = floor;
        self
    }

    pub fn high_capacity(mut self, capacity: usize) -> Self {
        self.high_capacity = Some(capacity);
        self
    }

    pub fn low_capacity(mut self, capacity: usize) -> Self {
        self.low_capacity = Some(capacity);
        self
    }

    /// Build the queue pair.
    ///
    /// # Panics
    ///
    /// Panics if the parameters are invalid. See [`try_build`](Self::try_build).
    pub fn build(self) -> QueuePair {
        match self.try_build() {
            Ok(queues) => queues,
            Err(e) => panic!("{}", e),
        }
    }

    /// Build the queue pair, returning an error on invalid parameters.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a capacity is zero, the threshold is not
    /// greater than 1 or not above the floor, or either queue cannot be
    /// allocated.
    pub fn try_build(self) -> Result<QueuePair, ConfigError> {
        if self.threshold <= self.floor {
            return Err(ConfigError::new(format!(
                "threshold {} must be above the floor {}",
                self.threshold, self.floor
            )));
        }
        let high = HighFrequencyQueue::try_new(
            self.high_capacity.unwrap_or(self.capacity),
            self.threshold,
        )?;
        let low = LowFrequencyQueue::try_new(
            self.low_capacity.unwrap_or(self.capacity),
            self.threshold,
            self.floor,
        )?;
        Ok(QueuePair { high, low })
    }
}

fn ceil_sqrt(n: u64) -> u64 {
    if n < 2 {
        return n;
    }
    let mut root = (n as f64).sqrt() as u64;
    while root.checked_mul(root).is_none_or(|square| square > n) {
        root -= 1;
    }
    while root.checked_mul(root).is_some_and(|square| square < n) {
        root += 1;
    }
    root
}
