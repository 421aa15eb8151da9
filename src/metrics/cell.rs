use std::cell::Cell;

/// A counter that can be bumped through a shared reference.
///
/// Queues are single-threaded values, so a plain `Cell` is enough; the
/// resulting `!Sync` propagates to the queue that owns it.
#[repr(transparent)]
#[derive(Debug, Default)]
pub struct MetricsCell(Cell<u64>);

impl MetricsCell {
    #[inline]
    pub fn new() -> Self {
        Self(Cell::new(0))
    }

    #[inline]
    pub fn get(&self) -> u64 {
        self.0.get()
    }

    #[inline]
    pub fn incr(&self) {
        self.0.set(self.0.get() + 1);
    }
}
