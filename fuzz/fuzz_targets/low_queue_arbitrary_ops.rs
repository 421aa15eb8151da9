#![no_main]

use libfuzzer_sys::fuzz_target;
use repairkit::pair::{OccurrenceHandle, PairRecord, SymbolPair};
use repairkit::queue::LowFrequencyQueue;

// Fuzz arbitrary operation sequences on LowFrequencyQueue
//
// Tests random sequences of insert, decrease, remove, pop_max, reads
// and clear against the bucket chain invariants.
fuzz_target!(|data: &[u8]| {
    if data.len() < 3 {
        return;
    }

    let ceiling = u64::from(data[0] % 64) + 2;
    let floor = u64::from(data[1]) % ceiling;
    let mut queue = LowFrequencyQueue::new(64, ceiling, floor);

    let mut idx = 2;
    while idx + 2 < data.len() {
        let op = data[idx] % 8;
        let pair = SymbolPair::new(u32::from(data[idx + 1] % 32), 0);
        let freq = u64::from(data[idx + 2]) % (ceiling + 2);

        match op {
            0 | 1 => {
                // Insert
                let record = PairRecord::new(pair, OccurrenceHandle::new(0), 0, freq);
                let _ = queue.insert(record);
            },
            2 | 3 => {
                // Decrease
                let before = queue.frequency(pair);
                match queue.decrease(pair) {
                    Ok(outcome) => {
                        assert_eq!(Some(outcome.frequency() + 1), before);
                        assert_eq!(outcome.is_evicted(), !queue.contains(pair));
                    },
                    Err(_) => assert!(before.is_none_or(|f| f == 0)),
                }
            },
            4 => {
                // Remove
                let _ = queue.remove(pair);
                assert!(!queue.contains(pair));
            },
            5 => {
                // Pop max
                let top = queue.max_frequency();
                let popped = queue.pop_max().ok().map(|r| r.frequency);
                assert_eq!(popped, top);
            },
            6 => {
                // Reads
                let _ = queue.get(pair);
                let _ = queue.head();
                let _ = queue.min();
            },
            7 => {
                if data[idx + 2] == 0 {
                    queue.clear();
                }
            },
            _ => unreachable!(),
        }

        queue.debug_validate_invariants();
        idx += 3;
    }
});
