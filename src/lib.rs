//! repairkit: priority queues for Re-Pair grammar compression.
//!
//! Re-Pair repeatedly replaces the most frequent adjacent symbol pair with a
//! fresh symbol. This crate provides the queue substrate that makes "most
//! frequent" cheap to answer while frequencies only go down:
//!
//! - [`queue::HighFrequencyQueue`] for pairs at or above a threshold.
//! - [`queue::LowFrequencyQueue`] for pairs below it.
//! - [`builder::QueueBuilder`] to size both from one set of parameters.
//!
//! The driver that scans the text, replaces pairs and migrates records
//! between the queues lives outside this crate.

pub mod builder;
pub mod ds;
pub mod error;

#[cfg(feature = "metrics")]
pub mod metrics;

pub mod pair;
pub mod prelude;
pub mod queue;
pub mod traits;
