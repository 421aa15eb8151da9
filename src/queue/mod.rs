//! The two frequency queues of the Re-Pair substrate.
//!
//! - [`HighFrequencyQueue`]: the few pairs at or above the threshold, kept in
//!   a compacting list with cached extrema.
//! - [`LowFrequencyQueue`]: everything below the threshold, kept in
//!   exact-frequency buckets linked in ascending order.

pub mod high;
pub mod low;

pub use high::HighFrequencyQueue;
pub use low::LowFrequencyQueue;
