//! Index-addressed storage with slot reuse and explicit compaction.
//!
//! Values live in a `Vec<Option<T>>`; removal leaves a hole that is recorded
//! on a free list and handed out again by the next insert. [`SlotId`]s stay
//! stable until [`SlotArena::compact_with`] is called, which squeezes the
//! holes out and reports every surviving value's new id so owners can rewrite
//! their lookup tables in the same pass.
//!
//! ```
//! use repairkit::ds::SlotArena;
//!
//! let mut arena = SlotArena::new();
//! let a = arena.insert("a");
//! let b = arena.insert("b");
//! arena.remove(a);
//! assert_eq!(arena.slot_count(), 2);
//!
//! let mut moved = Vec::new();
//! arena.compact_with(|value, id| moved.push((*value, id.index())));
//! assert_eq!(arena.slot_count(), 1);
//! assert_eq!(moved, vec![("b", 0)]);
//! # let _ = b;
//! ```

use std::collections::TryReserveError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotId(pub(crate) usize);

impl SlotId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug)]
pub struct SlotArena<T> {
    slots: Vec<Option<T>>,
    free_list: Vec<usize>,
    len: usize,
}

impl<T> SlotArena<T> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_list: Vec::new(),
            len: 0,
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free_list: Vec::new(),
            len: 0,
        }
    }

    /// Reserves room for at least `additional` more values, reporting
    /// allocation failure instead of aborting.
    pub fn try_reserve(&mut self, additional: usize) -> Result<(), TryReserveError> {
        self.slots.try_reserve(additional)
    }

    pub fn insert(&mut self, value: T) -> SlotId {
        let idx = if let Some(idx) = self.free_list.pop() {
            self.slots[idx] = Some(value);
            idx
        } else {
            self.slots.push(Some(value));
            self.slots.len() - 1
        };
        self.len += 1;
        SlotId(idx)
    }

    pub fn remove(&mut self, id: SlotId) -> Option<T> {
        let slot = self.slots.get_mut(id.0)?;
        let value = slot.take()?;
        self.free_list.push(id.0);
        self.len -= 1;
        Some(value)
    }

    pub fn get(&self, id: SlotId) -> Option<&T> {
        self.slots.get(id.0).and_then(|slot| slot.as_ref())
    }

    pub fn get_mut(&mut self, id: SlotId) -> Option<&mut T> {
        self.slots.get_mut(id.0).and_then(|slot| slot.as_mut())
    }

    pub fn contains(&self, id: SlotId) -> bool {
        self.slots
            .get(id.0)
            .map(|slot| slot.is_some())
            .unwrap_or(false)
    }

    /// Number of live values.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of slots handed out so far, live or dead.
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Number of dead slots waiting on the free list.
    pub fn dead_slots(&self) -> usize {
        self.slots.len() - self.len
    }

    pub fn capacity(&self) -> usize {
        self.slots.capacity()
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.free_list.clear();
        self.len = 0;
    }

    pub fn iter(&self) -> impl Iterator<Item = (SlotId, &T)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(idx, slot)| slot.as_ref().map(|value| (SlotId(idx), value)))
    }

    /// Moves every live value to the front, preserving relative order, and
    /// releases the dead tail.
    ///
    /// `relocate` is called once per surviving value with its new id. Ids
    /// handed out before the call are invalid afterwards.
    pub fn compact_with<F>(&mut self, mut relocate: F)
    where
        F: FnMut(&T, SlotId),
    {
        let mut write = 0;
        for read in 0..self.slots.len() {
            if self.slots[read].is_none() {
                continue;
            }
            self.slots.swap(read, write);
            if let Some(value) = self.slots[write].as_ref() {
                relocate(value, SlotId(write));
            }
            write += 1;
        }
        debug_assert_eq!(write, self.len);
        self.slots.truncate(write);
        self.slots.shrink_to_fit();
        self.free_list.clear();
        self.free_list.shrink_to_fit();
    }

    pub fn approx_bytes(&self) -> usize {
        std::mem::size_of::<Self>()
            + self.slots.capacity() * std::mem::size_of::<Option<T>>()
            + self.free_list.capacity() * std::mem::size_of::<usize>()
    }
}

impl<T> Default for SlotArena<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_arena_try_reserve_reports_overflow() {
        let mut arena: SlotArena<u64> = SlotArena::new();
        assert!(arena.try_reserve(usize::MAX).is_err());
        assert!(arena.try_reserve(16).is_ok());
        assert!(arena.is_empty());
    }

    #[test]
    fn slot_arena_insert_remove_reuse() {
        let mut arena = SlotArena::new();
        let id1 = arena.insert("a");
        let id2 = arena.insert("b");
        assert_eq!(arena.len(), 2);
        assert_eq!(arena.get(id1), Some(&"a"));
        assert_eq!(arena.get(id2), Some(&"b"));

        assert_eq!(arena.remove(id1), Some("a"));
        assert_eq!(arena.len(), 1);
        assert_eq!(arena.dead_slots(), 1);

        let id3 = arena.insert("c");
        assert_eq!(arena.len(), 2);
        assert_eq!(arena.get(id3), Some(&"c"));
        assert_eq!(id1.index(), id3.index());
        assert_eq!(arena.dead_slots(), 0);
    }

    #[test]
    fn slot_arena_double_remove_is_none() {
        let mut arena = SlotArena::new();
        let id = arena.insert(1u32);
        assert_eq!(arena.remove(id), Some(1));
        assert_eq!(arena.remove(id), None);
        assert!(!arena.contains(id));
        assert!(arena.is_empty());
    }

    #[test]
    fn slot_arena_compact_preserves_order_and_reports_moves() {
        let mut arena = SlotArena::new();
        let ids: Vec<_> = (0..6u32).map(|v| arena.insert(v)).collect();
        for &id in &[ids[0], ids[2], ids[3]] {
            arena.remove(id);
        }
        assert_eq!(arena.slot_count(), 6);

        let mut moved = Vec::new();
        arena.compact_with(|value, id| moved.push((*value, id.index())));

        assert_eq!(moved, vec![(1, 0), (4, 1), (5, 2)]);
        assert_eq!(arena.slot_count(), 3);
        assert_eq!(arena.dead_slots(), 0);
        assert_eq!(arena.get(SlotId(1)), Some(&4));

        // Fresh inserts append after the compacted prefix.
        let id = arena.insert(9);
        assert_eq!(id.index(), 3);
    }

    #[test]
    fn slot_arena_compact_empty_releases_everything() {
        let mut arena = SlotArena::new();
        let a = arena.insert('x');
        arena.remove(a);
        arena.compact_with(|_, _| panic!("no live values"));
        assert_eq!(arena.slot_count(), 0);
        assert_eq!(arena.iter().count(), 0);
    }
}
