//! Optional queue instrumentation, enabled with the `metrics` feature.
//!
//! Each queue owns a metrics struct from [`metrics_impl`] and exposes a
//! snapshot through [`traits::MetricsSnapshotProvider`]. Snapshots can be
//! published with [`exporter::PrometheusTextExporter`].

pub mod cell;
pub mod exporter;
pub mod metrics_impl;
pub mod snapshot;
pub mod traits;
