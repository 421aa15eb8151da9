#![no_main]

use libfuzzer_sys::fuzz_target;
use repairkit::pair::{OccurrenceHandle, PairRecord, SymbolPair};
use repairkit::queue::HighFrequencyQueue;

// Fuzz arbitrary operation sequences on HighFrequencyQueue
//
// Tests random sequences of insert, decrease, remove and pop_max so that
// compaction and extremum rescans run in arbitrary interleavings.
fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }

    let floor = u64::from(data[0] % 16) + 2;
    let mut queue = HighFrequencyQueue::new(48, floor);

    let mut idx = 1;
    while idx + 2 < data.len() {
        let op = data[idx] % 6;
        let pair = SymbolPair::new(u32::from(data[idx + 1] % 64), 1);
        let freq = u64::from(data[idx + 2]);

        match op {
            0 | 1 => {
                // Insert
                let record = PairRecord::new(pair, OccurrenceHandle::new(freq), 0, freq);
                let result = queue.insert(record);
                if result.is_ok() {
                    assert!(freq >= floor);
                }
            },
            2 | 3 => {
                // Decrease
                let before = queue.frequency(pair);
                if let Ok(outcome) = queue.decrease(pair) {
                    assert_eq!(before, Some(outcome.frequency() + 1));
                    assert_eq!(outcome.is_evicted(), outcome.frequency() < floor);
                }
            },
            4 => {
                // Remove
                if let Ok(record) = queue.remove(pair) {
                    assert_eq!(record.pair, pair);
                }
            },
            5 => {
                // Pop max
                let top = queue.max().ok().and_then(|p| queue.frequency(p));
                let popped = queue.pop_max().ok().map(|r| r.frequency);
                assert_eq!(popped, top);
                if let Ok(min) = queue.min() {
                    assert!(queue.frequency(min) <= popped);
                }
            },
            _ => unreachable!(),
        }

        queue.debug_validate_invariants();
        idx += 3;
    }
});
