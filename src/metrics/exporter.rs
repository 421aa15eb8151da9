use std::io::Write;
use std::sync::Mutex;

use crate::metrics::snapshot::{HighQueueMetricsSnapshot, LowQueueMetricsSnapshot};
use crate::metrics::traits::MetricsExporter;

/// Prometheus text exporter for queue metrics snapshots.
///
/// This exporter writes in the Prometheus text exposition format so it can be
/// scraped by Prometheus or forwarded to an OpenTelemetry collector. Use one
/// exporter per queue with distinct prefixes, e.g. `repair_hfq` and
/// `repair_lfq`.
#[derive(Debug)]
pub struct PrometheusTextExporter<W: Write + Send + Sync> {
    prefix: String,
    writer: Mutex<W>,
}

impl<W: Write + Send + Sync> PrometheusTextExporter<W> {
    pub fn new(prefix: impl Into<String>, writer: W) -> Self {
        Self {
            prefix: prefix.into(),
            writer: Mutex::new(writer),
        }
    }

    /// Consumes the exporter and returns the underlying writer.
    pub fn into_inner(self) -> W {
        match self.writer.into_inner() {
            Ok(writer) => writer,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write_counter(&self, name: &str, value: u64) {
        self.write_sample("counter", name, value);
    }

    fn write_gauge(&self, name: &str, value: u64) {
        self.write_sample("gauge", name, value);
    }

    fn write_sample(&self, kind: &str, name: &str, value: u64) {
        let mut writer = match self.writer.lock() {
            Ok(writer) => writer,
            Err(poisoned) => poisoned.into_inner(),
        };
        let _ = writeln!(writer, "# TYPE {} {}", name, kind);
        let _ = writeln!(writer, "{} {}", name, value);
    }

    fn metric_name(&self, suffix: &str) -> String {
        if self.prefix.is_empty() {
            suffix.to_string()
        } else {
            format!("{}_{}", self.prefix, suffix)
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn export_core(
        &self,
        insert_calls: u64,
        insert_rejected: u64,
        remove_calls: u64,
        decrease_calls: u64,
        floor_evictions: u64,
        clear_calls: u64,
        lookup_calls: u64,
        lookup_found: u64,
        extremum_calls: u64,
    ) {
        self.write_counter(&self.metric_name("insert_calls_total"), insert_calls);
        self.write_counter(
            &self.metric_name("insert_rejected_total"),
            insert_rejected,
        );
        self.write_counter(&self.metric_name("remove_calls_total"), remove_calls);
        self.write_counter(&self.metric_name("decrease_calls_total"), decrease_calls);
        self.write_counter(
            &self.metric_name("floor_evictions_total"),
            floor_evictions,
        );
        self.write_counter(&self.metric_name("clear_calls_total"), clear_calls);
        self.write_counter(&self.metric_name("lookup_calls_total"), lookup_calls);
        self.write_counter(&self.metric_name("lookup_found_total"), lookup_found);
        self.write_counter(&self.metric_name("extremum_calls_total"), extremum_calls);
    }
}

impl<W: Write + Send + Sync> MetricsExporter<HighQueueMetricsSnapshot>
    for PrometheusTextExporter<W>
{
    fn export(&self, snapshot: &HighQueueMetricsSnapshot) {
        self.export_core(
            snapshot.insert_calls,
            snapshot.insert_rejected,
            snapshot.remove_calls,
            snapshot.decrease_calls,
            snapshot.floor_evictions,
            snapshot.clear_calls,
            snapshot.lookup_calls,
            snapshot.lookup_found,
            snapshot.extremum_calls,
        );
        self.write_counter(&self.metric_name("compactions_total"), snapshot.compactions);
        self.write_counter(
            &self.metric_name("relocated_records_total"),
            snapshot.relocated_records,
        );
        self.write_counter(
            &self.metric_name("extremum_rescans_total"),
            snapshot.extremum_rescans,
        );
        self.write_gauge(&self.metric_name("queue_len"), snapshot.queue_len as u64);
        self.write_gauge(&self.metric_name("slot_count"), snapshot.slot_count as u64);
        self.write_gauge(&self.metric_name("capacity"), snapshot.capacity as u64);
    }
}

impl<W: Write + Send + Sync> MetricsExporter<LowQueueMetricsSnapshot>
    for PrometheusTextExporter<W>
{
    fn export(&self, snapshot: &LowQueueMetricsSnapshot) {
        self.export_core(
            snapshot.insert_calls,
            snapshot.insert_rejected,
            snapshot.remove_calls,
            snapshot.decrease_calls,
            snapshot.floor_evictions,
            snapshot.clear_calls,
            snapshot.lookup_calls,
            snapshot.lookup_found,
            snapshot.extremum_calls,
        );
        self.write_counter(
            &self.metric_name("decrease_exhausted_total"),
            snapshot.decrease_exhausted,
        );
        self.write_counter(&self.metric_name("chain_probes_total"), snapshot.chain_probes);
        self.write_gauge(
            &self.metric_name("linked_buckets"),
            snapshot.linked_buckets as u64,
        );
        self.write_gauge(&self.metric_name("queue_len"), snapshot.queue_len as u64);
        self.write_gauge(&self.metric_name("capacity"), snapshot.capacity as u64);
    }
}
