use crate::metrics::cell::MetricsCell;
use crate::metrics::traits::{
    CoreQueueMetricsRecorder, HighQueueMetricsRecorder, LowQueueMetricsRecorder,
    QueueMetricsReadRecorder,
};

#[derive(Debug, Default)]
pub struct HighQueueMetrics {
    pub insert_calls: u64,
    pub insert_rejected: u64,
    pub remove_calls: u64,
    pub decrease_calls: u64,
    pub floor_evictions: u64,
    pub clear_calls: u64,
    pub compactions: u64,
    pub relocated_records: u64,
    pub lookup_calls: MetricsCell,
    pub lookup_found: MetricsCell,
    pub extremum_calls: MetricsCell,
}

#[derive(Debug, Default)]
pub struct LowQueueMetrics {
    pub insert_calls: u64,
    pub insert_rejected: u64,
    pub remove_calls: u64,
    pub decrease_calls: u64,
    pub floor_evictions: u64,
    pub clear_calls: u64,
    pub decrease_exhausted: u64,
    pub lookup_calls: MetricsCell,
    pub lookup_found: MetricsCell,
    pub extremum_calls: MetricsCell,
}

impl CoreQueueMetricsRecorder for HighQueueMetrics {
    fn record_insert_call(&mut self) {
        self.insert_calls += 1;
    }

    fn record_insert_rejected(&mut self) {
        self.insert_rejected += 1;
    }

    fn record_remove_call(&mut self) {
        self.remove_calls += 1;
    }

    fn record_decrease_call(&mut self) {
        self.decrease_calls += 1;
    }

    fn record_floor_eviction(&mut self) {
        self.floor_evictions += 1;
    }

    fn record_clear(&mut self) {
        self.clear_calls += 1;
    }
}

impl HighQueueMetricsRecorder for HighQueueMetrics {
    fn record_compaction(&mut self, relocated: usize) {
        self.compactions += 1;
        self.relocated_records += relocated as u64;
    }
}

impl QueueMetricsReadRecorder for &HighQueueMetrics {
    fn record_lookup_call(&self) {
        self.lookup_calls.incr();
    }

    fn record_lookup_found(&self) {
        self.lookup_found.incr();
    }

    fn record_extremum_call(&self) {
        self.extremum_calls.incr();
    }
}

impl CoreQueueMetricsRecorder for LowQueueMetrics {
    fn record_insert_call(&mut self) {
        self.insert_calls += 1;
    }

    fn record_insert_rejected(&mut self) {
        self.insert_rejected += 1;
    }

    fn record_remove_call(&mut self) {
        self.remove_calls += 1;
    }

    fn record_decrease_call(&mut self) {
        self.decrease_calls += 1;
    }

    fn record_floor_eviction(&mut self) {
        self.floor_evictions += 1;
    }

    fn record_clear(&mut self) {
        self.clear_calls += 1;
    }
}

impl LowQueueMetricsRecorder for LowQueueMetrics {
    fn record_decrease_exhausted(&mut self) {
        self.decrease_exhausted += 1;
    }
}

impl QueueMetricsReadRecorder for &LowQueueMetrics {
    fn record_lookup_call(&self) {
        self.lookup_calls.incr();
    }

    fn record_lookup_found(&self) {
        self.lookup_found.incr();
    }

    fn record_extremum_call(&self) {
        self.extremum_calls.incr();
    }
}
