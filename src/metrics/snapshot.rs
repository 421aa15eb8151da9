#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct HighQueueMetricsSnapshot {
    pub insert_calls: u64,
    pub insert_rejected: u64,
    pub remove_calls: u64,
    pub decrease_calls: u64,
    pub floor_evictions: u64,
    pub clear_calls: u64,

    pub lookup_calls: u64,
    pub lookup_found: u64,
    pub extremum_calls: u64,

    pub compactions: u64,
    pub relocated_records: u64, // survivors moved to a new slot by compaction
    pub extremum_rescans: u64,  // full walks to re-derive the cached min/max

    // gauges captured at snapshot time
    pub queue_len: usize,
    pub slot_count: usize,
    pub capacity: usize,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LowQueueMetricsSnapshot {
    pub insert_calls: u64,
    pub insert_rejected: u64,
    pub remove_calls: u64,
    pub decrease_calls: u64,
    pub floor_evictions: u64,
    pub clear_calls: u64,
    pub decrease_exhausted: u64,

    pub lookup_calls: u64,
    pub lookup_found: u64,
    pub extremum_calls: u64,

    pub chain_probes: u64, // chain steps taken to splice in an interior bucket

    // gauges captured at snapshot time
    pub linked_buckets: usize,
    pub queue_len: usize,
    pub capacity: usize,
}
