// ==============================================
// QUEUE INVARIANT TESTS (integration)
// ==============================================
//
// Behaviour that spans the public surface of both queues: lookup/record
// bijection, ordering statistics under churn, capacity limits, and the
// amortized maintenance work (compaction, chain walks, rescans).

use repairkit::error::QueueError;
use repairkit::pair::{Frequency, OccurrenceHandle, PairRecord, SymbolPair};
use repairkit::queue::{HighFrequencyQueue, LowFrequencyQueue};
use repairkit::traits::{DecreaseOutcome, PairQueue};

fn pair(left: u8, right: u8) -> SymbolPair {
    SymbolPair::new(u32::from(left), u32::from(right))
}

fn record(pair: SymbolPair, frequency: Frequency) -> PairRecord {
    PairRecord::new(pair, OccurrenceHandle::new(u64::from(pair.left)), 0, frequency)
}

// ==============================================
// Low-frequency queue scenarios
// ==============================================

mod low_queue {
    use super::*;

    #[test]
    fn round_trip_decrease_to_eviction() {
        let ab = pair(b'A', b'B');
        let cd = pair(b'C', b'D');
        let mut queue = LowFrequencyQueue::new(16, 10, 1);
        queue.insert(record(ab, 5)).unwrap();
        queue.insert(record(cd, 3)).unwrap();
        assert_eq!(queue.max(), Ok(ab));

        for expected in [4, 3, 2, 1] {
            let outcome = queue.decrease(ab).unwrap();
            assert_eq!(outcome, DecreaseOutcome::Retained { frequency: expected });
        }
        assert_eq!(queue.frequency(ab), Some(1));
        assert_eq!(queue.len(), 2);

        let outcome = queue.decrease(ab).unwrap();
        assert!(outcome.is_evicted());
        assert_eq!(outcome.frequency(), 0);
        assert!(!queue.contains(ab));
        assert_eq!(queue.len(), 1);

        assert_eq!(queue.lookup(cd).map(|t| t.frequency), Ok(3));
        assert_eq!(queue.max(), Ok(cd));
        queue.debug_validate_invariants();
    }

    #[test]
    fn chain_correctness_under_churn() {
        let mut queue = LowFrequencyQueue::new(16, 6, 1);
        for (i, frequency) in [1, 5, 3, 5, 2].into_iter().enumerate() {
            queue.insert(record(pair(i as u8, 0), frequency)).unwrap();
        }

        let mut last_max = Frequency::MAX;
        while !queue.is_empty() {
            let chain: Vec<Frequency> = queue.frequencies().collect();
            assert!(chain.windows(2).all(|w| w[0] < w[1]));
            for &frequency in &chain {
                assert!(queue.bucket_len(frequency) > 0, "empty bucket {} linked", frequency);
            }

            let min = queue.min().unwrap();
            let max = queue.max().unwrap();
            let min_freq = queue.frequency(min).unwrap();
            let max_freq = queue.frequency(max).unwrap();
            assert_eq!(Some(&min_freq), chain.first());
            assert_eq!(Some(&max_freq), chain.last());
            assert!(min_freq <= max_freq);
            assert!(max_freq <= last_max);
            last_max = max_freq;

            queue.remove(max).unwrap();
            queue.debug_validate_invariants();
        }
        assert!(queue.frequencies().next().is_none());
        assert_eq!(queue.max(), Err(QueueError::EmptyQueue));
    }

    #[test]
    fn lookup_table_and_records_stay_in_bijection() {
        let mut queue = LowFrequencyQueue::new(64, 32, 1);
        for i in 0..40u8 {
            queue.insert(record(pair(i, i), Frequency::from(1 + i % 31))).unwrap();
        }
        for i in (0..40u8).step_by(3) {
            queue.remove(pair(i, i)).unwrap();
        }
        for i in (1..40u8).step_by(2) {
            let _ = queue.decrease(pair(i, i));
        }

        let records: Vec<PairRecord> = queue.iter().collect();
        assert_eq!(records.len(), queue.len());
        for record in &records {
            let triple = queue.lookup(record.pair).unwrap();
            assert_eq!(triple, record.triple());
        }
        let bucketed: usize = queue.frequencies().map(|f| queue.bucket_len(f)).sum();
        assert_eq!(bucketed, queue.len());
        queue.debug_validate_invariants();
    }

    #[test]
    fn decrease_never_walks_the_chain() {
        let mut queue = LowFrequencyQueue::new(64, 64, 1);
        for i in 0..32u8 {
            queue.insert(record(pair(i, 1), 63 - Frequency::from(i))).unwrap();
        }
        let probes = queue.chain_probes();
        for i in 0..32u8 {
            while queue.contains(pair(i, 1)) {
                queue.decrease(pair(i, 1)).unwrap();
            }
        }
        assert!(queue.is_empty());
        assert_eq!(queue.chain_probes(), probes);
    }

    #[test]
    fn capacity_is_enforced() {
        let mut queue = LowFrequencyQueue::new(2, 8, 1);
        queue.insert(record(pair(1, 1), 2)).unwrap();
        queue.insert(record(pair(2, 2), 2)).unwrap();
        assert_eq!(
            queue.insert(record(pair(3, 3), 2)),
            Err(QueueError::CapacityExceeded { capacity: 2 })
        );
        queue.remove(pair(1, 1)).unwrap();
        queue.insert(record(pair(3, 3), 2)).unwrap();
    }
}

// ==============================================
// High-frequency queue scenarios
// ==============================================

mod high_queue {
    use super::*;

    #[test]
    fn extrema_survive_compaction() {
        let mut queue = HighFrequencyQueue::new(64, 10);
        for i in 0..32u8 {
            queue.insert(record(pair(i, 0), 10 + Frequency::from(i))).unwrap();
        }
        for i in 0..24u8 {
            queue.remove(pair(i, 0)).unwrap();
            queue.debug_validate_invariants();
        }
        assert!(queue.compactions() > 0);
        assert!(queue.slot_count() < 32);
        assert_eq!(queue.max(), Ok(pair(31, 0)));
        assert_eq!(queue.min(), Ok(pair(24, 0)));
        for i in 24..32u8 {
            assert_eq!(queue.frequency(pair(i, 0)), Some(10 + Frequency::from(i)));
        }
    }

    #[test]
    fn dead_slots_never_dominate() {
        let mut queue = HighFrequencyQueue::new(128, 2);
        for round in 0..8u8 {
            for i in 0..16u8 {
                queue.insert(record(pair(i, round), 50)).unwrap();
            }
            for i in 0..16u8 {
                queue.remove(pair(i, round)).unwrap();
                assert!(queue.len() >= queue.slot_count() / 2);
            }
        }
        assert!(queue.is_empty());
    }

    #[test]
    fn pop_max_yields_non_increasing_frequencies() {
        let mut queue = HighFrequencyQueue::new(32, 4);
        let frequencies = [9, 4, 17, 4, 12, 30, 8];
        for (i, &frequency) in frequencies.iter().enumerate() {
            queue.insert(record(pair(i as u8, 9), frequency)).unwrap();
        }
        queue.decrease(pair(5, 9)).unwrap();

        let mut drained = Vec::new();
        while let Ok(record) = queue.pop_max() {
            drained.push(record.frequency);
        }
        assert_eq!(drained, vec![29, 17, 12, 9, 8, 4, 4]);
    }

    #[test]
    fn rejects_frequencies_below_floor() {
        let mut queue = HighFrequencyQueue::new(4, 8);
        let result = queue.insert(record(pair(1, 2), 7));
        assert!(matches!(
            result,
            Err(QueueError::FrequencyOutOfRange { frequency: 7, min: 8, max: None, .. })
        ));
        assert!(queue.is_empty());
    }
}

// ==============================================
// Migration between the queues
// ==============================================

#[test]
fn evicted_high_record_migrates_intact() {
    let threshold = 5;
    let mut high = HighFrequencyQueue::new(8, threshold);
    let mut low = LowFrequencyQueue::new(8, threshold, 1);

    let ab = pair(b'a', b'b');
    let original = PairRecord::new(ab, OccurrenceHandle::new(99), 1234, threshold);
    high.insert(original).unwrap();

    let DecreaseOutcome::Evicted(evicted) = high.decrease(ab).unwrap() else {
        panic!("pair at the threshold must leave the high queue");
    };
    assert!(low.admits(evicted.frequency));
    low.insert(evicted).unwrap();

    let triple = low.lookup(ab).unwrap();
    assert_eq!(triple.occurrences, OccurrenceHandle::new(99));
    assert_eq!(triple.aux, 1234);
    assert_eq!(triple.frequency, threshold - 1);
}

#[test]
fn queues_are_interchangeable_behind_the_trait() {
    fn drain(queue: &mut dyn PairQueue) -> Vec<Frequency> {
        let mut out = Vec::new();
        while let Ok(record) = queue.pop_max() {
            out.push(record.frequency);
        }
        out
    }

    let mut high = HighFrequencyQueue::new(8, 2);
    let mut low = LowFrequencyQueue::new(8, 16, 1);
    for (i, frequency) in [3, 7, 5].into_iter().enumerate() {
        let p = pair(i as u8, 0);
        PairQueue::insert(&mut high, record(p, frequency)).unwrap();
        PairQueue::insert(&mut low, record(p, frequency)).unwrap();
    }
    assert_eq!(drain(&mut high), vec![7, 5, 3]);
    assert_eq!(drain(&mut low), vec![7, 5, 3]);
    assert!(PairQueue::is_empty(&high));
    assert_eq!(PairQueue::lookup(&low, pair(0, 0)), Err(QueueError::MissingPair(pair(0, 0))));
}
