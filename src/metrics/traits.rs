//! # Metrics Trait Hierarchy
//!
//! Recording, snapshotting and export are split into small traits so queue
//! logic never depends on how counters are consumed.
//!
//! ## Architecture
//!
//! ```text
//!                       ┌─────────────────────────────────┐
//!                       │    CoreQueueMetricsRecorder     │
//!                       │  insert/remove/decrease/evict   │
//!                       │  clear                          │
//!                       └────────────────┬────────────────┘
//!                                        │
//!                    ┌───────────────────┴───────────────────┐
//!                    ▼                                       ▼
//!     ┌─────────────────────────────┐         ┌─────────────────────────────┐
//!     │  HighQueueMetricsRecorder   │         │   LowQueueMetricsRecorder   │
//!     │  compaction                 │         │   decrease at zero          │
//!     └─────────────────────────────┘         └─────────────────────────────┘
//!
//!   Read paths (&self, interior mutability):  QueueMetricsReadRecorder
//!
//!   Consumption (decoupled from recording):
//!   ┌──────────────────────────────┐    ┌──────────────────────────────┐
//!   │ MetricsSnapshotProvider<S>   │    │ MetricsExporter<S>           │
//!   │ (bench/test)                 │    │ (monitoring)                 │
//!   └──────────────────────────────┘    └──────────────────────────────┘
//! ```
//!
//! Structural gauges such as chain probes or extremum rescans are kept by the
//! data structures themselves and only copied into snapshots.

/// Counters shared by both frequency queues.
pub trait CoreQueueMetricsRecorder {
    fn record_insert_call(&mut self);
    fn record_insert_rejected(&mut self);
    fn record_remove_call(&mut self);
    fn record_decrease_call(&mut self);
    fn record_floor_eviction(&mut self);
    fn record_clear(&mut self);
}

/// Read-only queue metrics for &self methods (uses interior mutability).
///
/// Use this for `get`, `max`, `min` and friends, where a mutable recorder is
/// not available.
pub trait QueueMetricsReadRecorder {
    fn record_lookup_call(&self);
    fn record_lookup_found(&self);
    fn record_extremum_call(&self);
}

/// Metrics for the compacting high-frequency queue.
pub trait HighQueueMetricsRecorder: CoreQueueMetricsRecorder {
    fn record_compaction(&mut self, relocated: usize);
}

/// Metrics for the bucketed low-frequency queue.
pub trait LowQueueMetricsRecorder: CoreQueueMetricsRecorder {
    fn record_decrease_exhausted(&mut self);
}

/// Snapshot provider for bench/testing.
pub trait MetricsSnapshotProvider<S> {
    fn snapshot(&self) -> S;
}

/// Export/publish metrics to monitoring backends.
pub trait MetricsExporter<S> {
    fn export(&self, snapshot: &S);
}
