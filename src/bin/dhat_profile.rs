//! DHAT heap profiler for repairkit.
//!
//! Run with: cargo run --bin dhat_profile --release --features dhat-heap
//! View results: Open dhat-heap.json in <https://nnethercote.github.io/dh_view/dh_view.html>

#[global_allocator]
static ALLOC: dhat::Alloc = dhat::Alloc;

use std::collections::HashMap;

use repairkit::builder::{QueueBuilder, QueuePair};
use repairkit::pair::{Frequency, OccurrenceHandle, PairRecord, SymbolPair};
use repairkit::queue::LowFrequencyQueue;
use repairkit::traits::{DecreaseOutcome, PairQueue};

/// Simple XorShift64 RNG for deterministic workloads.
struct XorShift64 {
    state: u64,
}

impl XorShift64 {
    fn new(seed: u64) -> Self {
        Self { state: seed.max(1) }
    }

    fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    fn next_f64(&mut self) -> f64 {
        const SCALE: f64 = 1.0 / (u64::MAX as f64);
        (self.next_u64() as f64) * SCALE
    }
}

/// Random text where 90% of symbols come from a small hot alphabet.
fn skewed_text(len: usize, alphabet: u32, seed: u64) -> Vec<u32> {
    let mut rng = XorShift64::new(seed);
    let hot = (alphabet / 10).max(1);
    (0..len)
        .map(|_| {
            if rng.next_f64() < 0.9 {
                (rng.next_u64() % u64::from(hot)) as u32
            } else {
                hot + (rng.next_u64() % u64::from(alphabet - hot)) as u32
            }
        })
        .collect()
}

fn pair_counts(text: &[u32]) -> HashMap<SymbolPair, Frequency> {
    let mut counts = HashMap::new();
    for window in text.windows(2) {
        *counts.entry(SymbolPair::new(window[0], window[1])).or_insert(0) += 1;
    }
    counts
}

fn seed_queues(queues: &mut QueuePair, counts: &HashMap<SymbolPair, Frequency>) {
    for (i, (&pair, &frequency)) in counts.iter().enumerate() {
        let record = PairRecord::new(pair, OccurrenceHandle::new(i as u64), 0, frequency);
        if let Some(queue) = queues.queue_for(frequency) {
            let _ = queue.insert(record);
        }
    }
}

/// Pop the global maximum and bleed frequency off a few other pairs, moving
/// evicted high-frequency records into the low queue.
fn drain_workload(queues: &mut QueuePair, rounds: usize, seed: u64) -> usize {
    let mut rng = XorShift64::new(seed);
    let mut replaced = 0;

    for _ in 0..rounds {
        let popped = if queues.high.is_empty() {
            queues.low.pop_max()
        } else {
            queues.high.pop_max()
        };
        if popped.is_err() {
            break;
        }
        replaced += 1;

        let victims: Vec<SymbolPair> = queues
            .high
            .iter()
            .map(|record| record.pair)
            .chain(queues.low.bucket_pairs(queues.low.max_frequency().unwrap_or(0)))
            .filter(|_| rng.next_f64() < 0.25)
            .collect();

        for pair in victims {
            if queues.high.contains(pair) {
                if let Ok(DecreaseOutcome::Evicted(record)) = queues.high.decrease(pair) {
                    if queues.low.admits(record.frequency) {
                        let _ = queues.low.insert(record);
                    }
                }
            } else {
                let _ = queues.low.decrease(pair);
            }
        }
    }
    replaced
}

/// Insert and remove pairs across the whole low-frequency range.
fn bucket_churn(queue: &mut LowFrequencyQueue, operations: usize, seed: u64) {
    let mut rng = XorShift64::new(seed);
    let span = queue.ceiling() - queue.floor();

    for i in 0..operations {
        let pair = SymbolPair::new((rng.next_u64() % 4096) as u32, i as u32 % 7);
        if queue.contains(pair) {
            let _ = queue.remove(pair);
        } else {
            let frequency = queue.floor() + rng.next_u64() % span;
            let _ = queue.insert(PairRecord::new(pair, OccurrenceHandle::new(0), 0, frequency));
        }
    }
}

fn profile_repair_drain() {
    println!("=== Profiling Re-Pair drain ===");
    let text = skewed_text(200_000, 256, 42);
    let counts = pair_counts(&text);

    let mut queues = QueueBuilder::for_sequence_len(text.len()).build();
    seed_queues(&mut queues, &counts);
    println!(
        "  Distinct pairs: {} (high: {}, low: {})",
        counts.len(),
        queues.high.len(),
        queues.low.len()
    );

    let replaced = drain_workload(&mut queues, 2_000, 7);
    println!("  Replaced pairs: {}", replaced);
    println!("  High compactions: {}", queues.high.compactions());
    println!("  Low chain probes: {}", queues.low.chain_probes());
    println!("  Final size: {}", queues.len());
}

fn profile_bucket_churn() {
    println!("=== Profiling low-frequency bucket churn ===");
    let mut queue = LowFrequencyQueue::new(8_192, 1_024, 1);
    bucket_churn(&mut queue, 200_000, 42);
    println!("  Linked frequencies: {}", queue.frequencies().count());
    println!("  Chain probes: {}", queue.chain_probes());
    println!("  Final size: {}", queue.len());
}

fn main() {
    let _profiler = dhat::Profiler::new_heap();

    println!("repairkit DHAT Heap Profiling");
    println!("=============================\n");

    profile_repair_drain();
    profile_bucket_churn();

    println!("\n=============================");
    println!("Profiling complete!");
    println!(
        "View results: Open dhat-heap.json in <https://nnethercote.github.io/dh_view/dh_view.html>"
    );
}
