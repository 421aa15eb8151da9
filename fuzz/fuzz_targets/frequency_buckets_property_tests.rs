#![no_main]

use libfuzzer_sys::fuzz_target;
use repairkit::ds::FrequencyBuckets;

// Fuzz property-based tests for FrequencyBuckets
//
// Tests specific invariants and properties:
// - Decrement moves a key exactly one bucket down
// - Newest-first ordering within a bucket
// - Chain is strictly ascending over non-empty buckets
// - Decrement never walks the chain
fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }

    let test_type = data[0] % 4;

    match test_type {
        0 => test_decrement_steps_down(&data[1..]),
        1 => test_newest_first_within_bucket(&data[1..]),
        2 => test_chain_ascending(&data[1..]),
        3 => test_decrement_walk_free(&data[1..]),
        _ => unreachable!(),
    }
});

const CEILING: u64 = 256;

// Property: decrement lowers the frequency by exactly one until zero
fn test_decrement_steps_down(data: &[u8]) {
    let mut buckets: FrequencyBuckets<u32, ()> = FrequencyBuckets::new(CEILING);

    for &byte in data {
        let key = u32::from(byte % 16);
        if !buckets.contains(&key) {
            assert!(buckets.insert(key, u64::from(byte), ()));
            continue;
        }
        let old = buckets.frequency(&key).unwrap();
        match buckets.decrement(&key) {
            Some(new) => assert_eq!(new + 1, old),
            None => assert_eq!(old, 0),
        }
        buckets.debug_validate_invariants();
    }
}

// Property: keys of one bucket iterate newest first
fn test_newest_first_within_bucket(data: &[u8]) {
    let mut buckets: FrequencyBuckets<u32, ()> = FrequencyBuckets::new(CEILING);
    let freq = u64::from(data[0]);

    let mut inserted = Vec::new();
    for &byte in &data[1..] {
        let key = u32::from(byte);
        if buckets.insert(key, freq, ()) {
            inserted.push(key);
        }
    }

    let listed: Vec<u32> = buckets.iter_bucket(freq).copied().collect();
    inserted.reverse();
    assert_eq!(listed, inserted);
    assert_eq!(buckets.peek_head().map(|(k, _)| *k), inserted.first().copied());
    assert_eq!(buckets.peek_min().map(|(k, _)| *k), inserted.last().copied());
    buckets.debug_validate_invariants();
}

// Property: the chain lists exactly the non-empty buckets in ascending order
fn test_chain_ascending(data: &[u8]) {
    let mut buckets: FrequencyBuckets<u32, ()> = FrequencyBuckets::new(CEILING);

    for (i, &byte) in data.iter().enumerate() {
        if byte % 3 == 0 {
            let _ = buckets.remove(&u32::from(byte / 3));
        } else {
            let _ = buckets.insert(i as u32, u64::from(byte), ());
        }
    }

    let chain: Vec<u64> = buckets.frequencies().collect();
    assert!(chain.windows(2).all(|w| w[0] < w[1]));
    assert_eq!(chain.first().copied(), buckets.min_freq());
    assert_eq!(chain.last().copied(), buckets.max_freq());
    assert_eq!(chain.len(), buckets.linked_buckets());
    let total: usize = chain.iter().map(|&f| buckets.bucket_len(f)).sum();
    assert_eq!(total, buckets.len());
}

// Property: decrement only splices neighbours, it never probes the chain
fn test_decrement_walk_free(data: &[u8]) {
    let mut buckets: FrequencyBuckets<u32, ()> = FrequencyBuckets::new(CEILING);

    for (i, &byte) in data.iter().enumerate() {
        let _ = buckets.insert(i as u32, u64::from(byte), ());
    }
    let probes = buckets.chain_probes();

    for i in 0..data.len() as u32 {
        while buckets.decrement(&i).is_some() {}
    }
    assert_eq!(buckets.chain_probes(), probes);
    assert_eq!(buckets.frequencies().collect::<Vec<_>>(), if data.is_empty() { vec![] } else { vec![0] });
    buckets.debug_validate_invariants();
}
