//! Bounded frequency buckets with a chain over the non-empty ones.
//!
//! Tracks keys by exact frequency in `[0, ceiling)` with O(1) insert, remove,
//! decrement, and min/max queries. This is the storage behind the
//! low-frequency queue.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────────┐
//! │                      FrequencyBuckets<K, V> Layout                          │
//! │                                                                             │
//! │   ┌─────────────────────────────┐   ┌─────────────────────────────────┐     │
//! │   │  index: FxHashMap<K,SlotId> │   │  entries: SlotArena<Entry<K,V>> │     │
//! │   │                             │   │                                 │     │
//! │   │   (a,b) ─► id_0 ────────────┼───┼──► id_0  freq:3  prev/next      │     │
//! │   │   (b,c) ─► id_1 ────────────┼───┼──► id_1  freq:1  prev/next      │     │
//! │   │   (c,a) ─► id_2 ────────────┼───┼──► id_2  freq:3  prev/next      │     │
//! │   └─────────────────────────────┘   └─────────────────────────────────┘     │
//! │                                                                             │
//! │   buckets: Vec<Bucket>, one per frequency in [0, ceiling)                   │
//! │                                                                             │
//! │      freq:   0     1     2     3     4     5                                │
//! │             [ ]   [■]   [ ]   [■]   [ ]   [ ]                               │
//! │                    │           │                                            │
//! │   min_freq ──────► 1 ◄──────► 3 ◄──────── max_freq                          │
//! │                  (chain links only non-empty buckets)                       │
//! │                                                                             │
//! │   bucket 3 list:  head ─► [id_2] ◄──► [id_0] ◄─ tail                        │
//! │                    newest              oldest                               │
//! └─────────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Chain maintenance
//!
//! A bucket is linked into the chain exactly when its list is non-empty.
//!
//! - `decrement` moves an entry from `f` to `f - 1`. If `f - 1` was empty it
//!   is spliced in right before `f`'s position, using `f`'s own links, so no
//!   walk is needed.
//! - `insert` into an empty bucket outside `[min_freq, max_freq]` becomes the
//!   new chain end. Inside that range the chain is walked from the nearer end
//!   until the neighbours on both sides are found. Every step of such a walk
//!   is counted in [`chain_probes`](FrequencyBuckets::chain_probes).
//! - Emptying a bucket unlinks it by pointing its neighbours at each other.
//!
//! ## Operations
//!
//! | Operation    | Time            | Notes                                 |
//! |--------------|-----------------|---------------------------------------|
//! | `insert`     | O(1) amortized  | Chain walk only for interior splices  |
//! | `remove`     | O(1)            | Unlinks emptied bucket                |
//! | `decrement`  | O(1)            | Splice at known position              |
//! | `peek_min`   | O(1)            | Oldest entry of the lowest bucket     |
//! | `peek_max`   | O(1)            | Oldest entry of the highest bucket    |
//! | `peek_head`  | O(1)            | Newest entry of the lowest bucket     |
//! | `frequency`  | O(1)            |                                       |
//!
//! ## Example Usage
//!
//! ```
//! use repairkit::ds::FrequencyBuckets;
//!
//! let mut buckets = FrequencyBuckets::new(8);
//! buckets.insert("a", 5, ());
//! buckets.insert("b", 2, ());
//!
//! assert_eq!(buckets.max_freq(), Some(5));
//! assert_eq!(buckets.decrement(&"a"), Some(4));
//! assert_eq!(buckets.frequencies().collect::<Vec<_>>(), vec![2, 4]);
//! ```

use rustc_hash::FxHashMap;
use std::collections::TryReserveError;
use std::hash::Hash;

use crate::ds::slot_arena::{SlotArena, SlotId};
use crate::error::InvariantError;
use crate::pair::Frequency;

/// Link pointers first; they are touched on every list operation.
#[derive(Debug)]
#[repr(C)]
struct Entry<K, V> {
    prev: Option<SlotId>,
    next: Option<SlotId>,
    freq: Frequency,
    key: K,
    value: V,
}

#[derive(Debug, Default, Clone, Copy)]
struct Bucket {
    head: Option<SlotId>,
    tail: Option<SlotId>,
    len: usize,
    prev: Option<Frequency>,
    next: Option<Frequency>,
}

impl Bucket {
    fn is_empty(&self) -> bool {
        self.head.is_none()
    }
}

/// Keys bucketed by exact frequency below a fixed ceiling.
///
/// `V` is an opaque payload carried alongside each key. Within a bucket,
/// entries are kept newest-first; `peek_min`/`peek_max` report the oldest
/// entry of their bucket and `peek_head` the newest one.
#[derive(Debug)]
pub struct FrequencyBuckets<K, V> {
    entries: SlotArena<Entry<K, V>>,
    index: FxHashMap<K, SlotId>,
    buckets: Vec<Bucket>,
    min_freq: Option<Frequency>,
    max_freq: Option<Frequency>,
    linked: usize,
    chain_probes: u64,
}

impl<K, V> FrequencyBuckets<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Creates empty buckets for frequencies in `[0, ceiling)`.
    pub fn new(ceiling: Frequency) -> Self {
        Self::with_capacity(ceiling, 0)
    }

    /// Creates empty buckets with room for `capacity` keys.
    pub fn with_capacity(ceiling: Frequency, capacity: usize) -> Self {
        Self {
            entries: SlotArena::with_capacity(capacity),
            index: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            buckets: vec![Bucket::default(); ceiling as usize],
            min_freq: None,
            max_freq: None,
            linked: 0,
            chain_probes: 0,
        }
    }

    /// Like [`with_capacity`](Self::with_capacity), but reports a bucket
    /// array or key table that cannot be allocated instead of panicking.
    pub fn try_with_capacity(
        ceiling: Frequency,
        capacity: usize,
    ) -> Result<Self, TryReserveError> {
        let ceiling = usize::try_from(ceiling).unwrap_or(usize::MAX);
        let mut buckets = Vec::new();
        buckets.try_reserve_exact(ceiling)?;
        buckets.resize(ceiling, Bucket::default());

        let mut entries = SlotArena::new();
        entries.try_reserve(capacity)?;
        let mut index = FxHashMap::default();
        index.try_reserve(capacity)?;

        Ok(Self {
            entries,
            index,
            buckets,
            min_freq: None,
            max_freq: None,
            linked: 0,
            chain_probes: 0,
        })
    }

    /// Exclusive upper bound on admissible frequencies.
    pub fn ceiling(&self) -> Frequency {
        self.buckets.len() as Frequency
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    pub fn frequency(&self, key: &K) -> Option<Frequency> {
        let id = *self.index.get(key)?;
        self.entries.get(id).map(|entry| entry.freq)
    }

    /// Returns the payload and frequency stored for `key`.
    pub fn get(&self, key: &K) -> Option<(&V, Frequency)> {
        let id = *self.index.get(key)?;
        self.entries.get(id).map(|entry| (&entry.value, entry.freq))
    }

    /// Lowest frequency with at least one key.
    pub fn min_freq(&self) -> Option<Frequency> {
        self.min_freq
    }

    /// Highest frequency with at least one key.
    pub fn max_freq(&self) -> Option<Frequency> {
        self.max_freq
    }

    /// Number of buckets currently linked into the chain.
    pub fn linked_buckets(&self) -> usize {
        self.linked
    }

    /// Total chain steps taken while splicing buckets in from `insert`.
    pub fn chain_probes(&self) -> u64 {
        self.chain_probes
    }

    /// Number of keys at exactly `freq`.
    pub fn bucket_len(&self, freq: Frequency) -> usize {
        self.bucket(freq).map(|bucket| bucket.len).unwrap_or(0)
    }

    /// Oldest key in the lowest non-empty bucket.
    pub fn peek_min(&self) -> Option<(&K, Frequency)> {
        let freq = self.min_freq?;
        self.bucket_tail(freq)
    }

    /// Oldest key in the highest non-empty bucket.
    pub fn peek_max(&self) -> Option<(&K, Frequency)> {
        let freq = self.max_freq?;
        self.bucket_tail(freq)
    }

    /// Newest key in the lowest non-empty bucket.
    pub fn peek_head(&self) -> Option<(&K, Frequency)> {
        let freq = self.min_freq?;
        let id = self.bucket(freq)?.head?;
        self.entries.get(id).map(|entry| (&entry.key, entry.freq))
    }

    /// Walks the chain from the lowest to the highest non-empty bucket.
    pub fn frequencies(&self) -> ChainIter<'_, K, V> {
        ChainIter {
            buckets: self,
            current: self.min_freq,
        }
    }

    /// Iterates keys at exactly `freq`, newest first.
    pub fn iter_bucket(&self, freq: Frequency) -> BucketIter<'_, K, V> {
        BucketIter {
            entries: &self.entries,
            current: self.bucket(freq).and_then(|bucket| bucket.head),
        }
    }

    /// Iterates every `(key, payload, frequency)` in storage order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V, Frequency)> {
        self.entries
            .iter()
            .map(|(_, entry)| (&entry.key, &entry.value, entry.freq))
    }

    /// Inserts `key` at `freq`. Returns `false` without changes if the key
    /// is already present or `freq` is not below the ceiling.
    pub fn insert(&mut self, key: K, freq: Frequency, value: V) -> bool {
        if freq >= self.ceiling() || self.index.contains_key(&key) {
            return false;
        }

        let id = self.entries.insert(Entry {
            prev: None,
            next: None,
            freq,
            key: key.clone(),
            value,
        });
        self.index.insert(key, id);

        if self.bucket_is_empty(freq) {
            let (prev, next) = self.find_neighbours(freq);
            self.link_bucket(freq, prev, next);
        }
        self.list_push_front(freq, id);
        true
    }

    /// Removes `key` and returns its payload and frequency.
    pub fn remove(&mut self, key: &K) -> Option<(V, Frequency)> {
        let id = self.index.remove(key)?;
        let freq = self.entries.get(id)?.freq;
        self.list_remove(freq, id);
        if self.bucket_is_empty(freq) {
            self.unlink_bucket(freq);
        }
        self.entries.remove(id).map(|entry| (entry.value, entry.freq))
    }

    /// Moves `key` from bucket `f` to bucket `f - 1` and returns `f - 1`.
    ///
    /// Returns `None` if `key` is missing or already at frequency zero.
    pub fn decrement(&mut self, key: &K) -> Option<Frequency> {
        let id = *self.index.get(key)?;
        let freq = self.entries.get(id)?.freq;
        if freq == 0 {
            return None;
        }
        let lower = freq - 1;
        let (prev, next) = {
            let bucket = self.bucket(freq)?;
            (bucket.prev, bucket.next)
        };

        self.list_remove(freq, id);
        let emptied = self.bucket_is_empty(freq);
        if emptied {
            self.unlink_bucket(freq);
        }

        if self.bucket_is_empty(lower) {
            // `prev` is below `lower` because `lower` was empty.
            let next = if emptied { next } else { Some(freq) };
            self.link_bucket(lower, prev, next);
        }

        if let Some(entry) = self.entries.get_mut(id) {
            entry.freq = lower;
        }
        self.list_push_front(lower, id);
        Some(lower)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.index.clear();
        for bucket in &mut self.buckets {
            *bucket = Bucket::default();
        }
        self.min_freq = None;
        self.max_freq = None;
        self.linked = 0;
    }

    pub fn approx_bytes(&self) -> usize {
        std::mem::size_of::<Self>()
            + self.entries.approx_bytes()
            + self.index.capacity() * std::mem::size_of::<(K, SlotId)>()
            + self.buckets.capacity() * std::mem::size_of::<Bucket>()
    }

    /// Verifies chain, bucket lists, and index against each other.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        if self.index.len() != self.entries.len() {
            return Err(InvariantError::new(format!(
                "index holds {} keys but {} entries are live",
                self.index.len(),
                self.entries.len()
            )));
        }

        let mut seen_entries = 0usize;
        let mut seen_buckets = 0usize;
        let mut last: Option<Frequency> = None;
        let mut current = self.min_freq;
        while let Some(freq) = current {
            let bucket = self.bucket(freq).ok_or_else(|| {
                InvariantError::new(format!("chain points past ceiling at {}", freq))
            })?;
            if bucket.is_empty() {
                return Err(InvariantError::new(format!(
                    "empty bucket {} is linked into the chain",
                    freq
                )));
            }
            if bucket.prev != last {
                return Err(InvariantError::new(format!(
                    "bucket {} prev link {:?} != {:?}",
                    freq, bucket.prev, last
                )));
            }
            if last.is_some_and(|last| last >= freq) {
                return Err(InvariantError::new(format!(
                    "chain not ascending at {}",
                    freq
                )));
            }

            let mut count = 0usize;
            let mut prev_id = None;
            let mut node = bucket.head;
            while let Some(id) = node {
                let entry = self.entries.get(id).ok_or_else(|| {
                    InvariantError::new(format!("bucket {} references dead slot {:?}", freq, id))
                })?;
                if entry.freq != freq {
                    return Err(InvariantError::new(format!(
                        "entry with frequency {} listed in bucket {}",
                        entry.freq, freq
                    )));
                }
                if entry.prev != prev_id {
                    return Err(InvariantError::new(format!(
                        "bucket {} list back-link broken at {:?}",
                        freq, id
                    )));
                }
                if self.index.get(&entry.key) != Some(&id) {
                    return Err(InvariantError::new(format!(
                        "index does not point at slot {:?}",
                        id
                    )));
                }
                prev_id = Some(id);
                node = entry.next;
                count += 1;
            }
            if bucket.tail != prev_id {
                return Err(InvariantError::new(format!(
                    "bucket {} tail does not match its last entry",
                    freq
                )));
            }
            if bucket.len != count {
                return Err(InvariantError::new(format!(
                    "bucket {} records len {} but holds {}",
                    freq, bucket.len, count
                )));
            }

            seen_entries += count;
            seen_buckets += 1;
            last = Some(freq);
            current = bucket.next;
        }

        if last != self.max_freq {
            return Err(InvariantError::new(format!(
                "chain ends at {:?} but max_freq is {:?}",
                last, self.max_freq
            )));
        }
        if seen_entries != self.entries.len() {
            return Err(InvariantError::new(format!(
                "chain reaches {} entries, {} are live",
                seen_entries,
                self.entries.len()
            )));
        }
        if seen_buckets != self.linked {
            return Err(InvariantError::new(format!(
                "chain has {} buckets, {} recorded as linked",
                seen_buckets, self.linked
            )));
        }
        let non_empty = self.buckets.iter().filter(|b| !b.is_empty()).count();
        if non_empty != seen_buckets {
            return Err(InvariantError::new(format!(
                "{} non-empty buckets but only {} are linked",
                non_empty, seen_buckets
            )));
        }
        Ok(())
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        if let Err(err) = self.check_invariants() {
            panic!("frequency buckets invariant violated: {}", err);
        }
    }

    fn bucket(&self, freq: Frequency) -> Option<&Bucket> {
        self.buckets.get(freq as usize)
    }

    fn bucket_mut(&mut self, freq: Frequency) -> Option<&mut Bucket> {
        self.buckets.get_mut(freq as usize)
    }

    fn bucket_is_empty(&self, freq: Frequency) -> bool {
        self.bucket(freq).map(Bucket::is_empty).unwrap_or(true)
    }

    fn bucket_tail(&self, freq: Frequency) -> Option<(&K, Frequency)> {
        let id = self.bucket(freq)?.tail?;
        self.entries.get(id).map(|entry| (&entry.key, entry.freq))
    }

    /// Finds the linked buckets immediately below and above an unlinked
    /// `freq`, walking from whichever chain end is closer.
    fn find_neighbours(&mut self, freq: Frequency) -> (Option<Frequency>, Option<Frequency>) {
        let (Some(lo), Some(hi)) = (self.min_freq, self.max_freq) else {
            return (None, None);
        };
        if freq < lo {
            return (None, Some(lo));
        }
        if freq > hi {
            return (Some(hi), None);
        }

        if freq - lo <= hi - freq {
            let mut below = lo;
            loop {
                self.chain_probes += 1;
                match self.bucket(below).and_then(|b| b.next) {
                    Some(next) if next < freq => below = next,
                    next => return (Some(below), next),
                }
            }
        } else {
            let mut above = hi;
            loop {
                self.chain_probes += 1;
                match self.bucket(above).and_then(|b| b.prev) {
                    Some(prev) if prev > freq => above = prev,
                    prev => return (prev, Some(above)),
                }
            }
        }
    }

    fn link_bucket(&mut self, freq: Frequency, prev: Option<Frequency>, next: Option<Frequency>) {
        if let Some(bucket) = self.bucket_mut(freq) {
            bucket.prev = prev;
            bucket.next = next;
        }
        match prev {
            Some(prev) => {
                if let Some(bucket) = self.bucket_mut(prev) {
                    bucket.next = Some(freq);
                }
            },
            None => self.min_freq = Some(freq),
        }
        match next {
            Some(next) => {
                if let Some(bucket) = self.bucket_mut(next) {
                    bucket.prev = Some(freq);
                }
            },
            None => self.max_freq = Some(freq),
        }
        self.linked += 1;
    }

    fn unlink_bucket(&mut self, freq: Frequency) {
        let Some(bucket) = self.bucket_mut(freq) else {
            return;
        };
        let (prev, next) = (bucket.prev.take(), bucket.next.take());
        match prev {
            Some(prev) => {
                if let Some(bucket) = self.bucket_mut(prev) {
                    bucket.next = next;
                }
            },
            None => self.min_freq = next,
        }
        match next {
            Some(next) => {
                if let Some(bucket) = self.bucket_mut(next) {
                    bucket.prev = prev;
                }
            },
            None => self.max_freq = prev,
        }
        self.linked -= 1;
    }

    fn list_push_front(&mut self, freq: Frequency, id: SlotId) {
        let Some(bucket) = self.buckets.get_mut(freq as usize) else {
            return;
        };
        let old_head = bucket.head;
        bucket.head = Some(id);
        bucket.len += 1;
        if old_head.is_none() {
            bucket.tail = Some(id);
        }

        if let Some(entry) = self.entries.get_mut(id) {
            entry.prev = None;
            entry.next = old_head;
        }
        if let Some(old_head) = old_head {
            if let Some(entry) = self.entries.get_mut(old_head) {
                entry.prev = Some(id);
            }
        }
    }

    fn list_remove(&mut self, freq: Frequency, id: SlotId) {
        let Some((prev, next)) = self.entries.get(id).map(|entry| (entry.prev, entry.next)) else {
            return;
        };

        match prev {
            Some(prev) => {
                if let Some(entry) = self.entries.get_mut(prev) {
                    entry.next = next;
                }
            },
            None => {
                if let Some(bucket) = self.buckets.get_mut(freq as usize) {
                    bucket.head = next;
                }
            },
        }
        match next {
            Some(next) => {
                if let Some(entry) = self.entries.get_mut(next) {
                    entry.prev = prev;
                }
            },
            None => {
                if let Some(bucket) = self.buckets.get_mut(freq as usize) {
                    bucket.tail = prev;
                }
            },
        }
        if let Some(bucket) = self.buckets.get_mut(freq as usize) {
            bucket.len -= 1;
        }
        if let Some(entry) = self.entries.get_mut(id) {
            entry.prev = None;
            entry.next = None;
        }
    }
}

/// Iterator over the frequencies of non-empty buckets, ascending.
#[derive(Debug)]
pub struct ChainIter<'a, K, V> {
    buckets: &'a FrequencyBuckets<K, V>,
    current: Option<Frequency>,
}

impl<K, V> Iterator for ChainIter<'_, K, V>
where
    K: Eq + Hash + Clone,
{
    type Item = Frequency;

    fn next(&mut self) -> Option<Self::Item> {
        let freq = self.current?;
        self.current = self.buckets.bucket(freq).and_then(|bucket| bucket.next);
        Some(freq)
    }
}

/// Iterator over the keys of one bucket, newest first.
#[derive(Debug)]
pub struct BucketIter<'a, K, V> {
    entries: &'a SlotArena<Entry<K, V>>,
    current: Option<SlotId>,
}

impl<'a, K, V> Iterator for BucketIter<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        let entry = self.entries.get(id)?;
        self.current = entry.next;
        Some(&entry.key)
    }
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashMap;

    const CEILING: Frequency = 16;

    proptest! {
        /// Property: chain and index stay consistent under arbitrary operations
        #[cfg_attr(miri, ignore)]
        #[test]
        fn prop_invariants_always_hold(
            ops in prop::collection::vec((0u8..3, 0u32..24, 0u64..CEILING), 0..200)
        ) {
            let mut buckets: FrequencyBuckets<u32, ()> = FrequencyBuckets::new(CEILING);

            for (op, key, freq) in ops {
                match op {
                    0 => { buckets.insert(key, freq, ()); }
                    1 => { buckets.decrement(&key); }
                    2 => { buckets.remove(&key); }
                    _ => unreachable!(),
                }
                prop_assert!(buckets.check_invariants().is_ok());
            }
        }

        /// Property: frequencies match a reference model
        #[cfg_attr(miri, ignore)]
        #[test]
        fn prop_matches_reference_model(
            ops in prop::collection::vec((0u8..3, 0u32..24, 0u64..CEILING), 0..200)
        ) {
            let mut buckets: FrequencyBuckets<u32, ()> = FrequencyBuckets::new(CEILING);
            let mut model: HashMap<u32, Frequency> = HashMap::new();

            for (op, key, freq) in ops {
                match op {
                    0 => {
                        let inserted = buckets.insert(key, freq, ());
                        prop_assert_eq!(inserted, !model.contains_key(&key));
                        model.entry(key).or_insert(freq);
                    }
                    1 => {
                        let expected = match model.get_mut(&key) {
                            Some(f) if *f > 0 => { *f -= 1; Some(*f) }
                            _ => None,
                        };
                        prop_assert_eq!(buckets.decrement(&key), expected);
                    }
                    2 => {
                        let expected = model.remove(&key);
                        prop_assert_eq!(buckets.remove(&key).map(|(_, f)| f), expected);
                    }
                    _ => unreachable!(),
                }

                prop_assert_eq!(buckets.len(), model.len());
                prop_assert_eq!(buckets.min_freq(), model.values().copied().min());
                prop_assert_eq!(buckets.max_freq(), model.values().copied().max());
                if let Some((key, freq)) = buckets.peek_max() {
                    prop_assert_eq!(model.get(key), Some(&freq));
                }
            }
        }

        /// Property: decrement never walks the chain
        #[cfg_attr(miri, ignore)]
        #[test]
        fn prop_decrement_is_walk_free(
            freqs in prop::collection::vec(0u64..CEILING, 1..40),
            rounds in 1usize..20
        ) {
            let mut buckets: FrequencyBuckets<usize, ()> = FrequencyBuckets::new(CEILING);
            for (key, freq) in freqs.iter().enumerate() {
                buckets.insert(key, *freq, ());
            }
            let probes = buckets.chain_probes();
            for _ in 0..rounds {
                for key in 0..freqs.len() {
                    buckets.decrement(&key);
                }
            }
            prop_assert_eq!(buckets.chain_probes(), probes);
            prop_assert!(buckets.check_invariants().is_ok());
        }
    }
}
