//! Pair records shared by both frequency queues.
//!
//! ## Key Components
//!
//! - [`SymbolPair`]: ordered pair of symbol ids, the key of every queue.
//! - [`OccurrenceHandle`]: opaque reference into the occurrence-list manager.
//! - [`Triple`]: `<P_ab, L_ab, F_ab>` view returned by lookups.
//! - [`PairRecord`]: `<ab, P_ab, L_ab, F_ab>` element handed to `insert`.
//!
//! Only the frequency is ever inspected by the queues. The occurrence handle
//! and the auxiliary integer belong to the occurrence-list manager and are
//! copied by value without interpretation.
//!
//! ## Example Usage
//!
//! ```
//! use repairkit::pair::{OccurrenceHandle, PairRecord, SymbolPair};
//!
//! let ab = SymbolPair::new(b'a' as u32, b'b' as u32);
//! let record = PairRecord::new(ab, OccurrenceHandle::new(17), 0, 5);
//!
//! assert_eq!(record.pair, ab);
//! assert_eq!(record.triple().frequency, 5);
//! ```

use std::fmt;

/// Symbol identifier (alphabet character or grammar non-terminal).
pub type Symbol = u32;

/// Occurrence count of a pair in the working sequence.
pub type Frequency = u64;

/// Ordered pair of adjacent symbols.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolPair {
    pub left: Symbol,
    pub right: Symbol,
}

impl SymbolPair {
    #[inline]
    pub const fn new(left: Symbol, right: Symbol) -> Self {
        Self { left, right }
    }
}

impl From<(Symbol, Symbol)> for SymbolPair {
    #[inline]
    fn from((left, right): (Symbol, Symbol)) -> Self {
        Self { left, right }
    }
}

impl From<SymbolPair> for (Symbol, Symbol) {
    #[inline]
    fn from(pair: SymbolPair) -> Self {
        (pair.left, pair.right)
    }
}

impl fmt::Display for SymbolPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.left, self.right)
    }
}

/// Opaque handle into the occurrence-list manager (`P_ab`).
///
/// Never dereferenced, freed, or compared for ordering by the queues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct OccurrenceHandle(u64);

impl OccurrenceHandle {
    #[inline]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// The `<P_ab, L_ab, F_ab>` triple associated with a pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Triple {
    /// `P_ab`: where this pair's occurrences are recorded.
    pub occurrences: OccurrenceHandle,
    /// `L_ab`: auxiliary value owned by the occurrence-list manager.
    pub aux: u64,
    /// `F_ab`: current frequency.
    pub frequency: Frequency,
}

/// A pair together with its triple; the unit of insertion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PairRecord {
    pub pair: SymbolPair,
    pub occurrences: OccurrenceHandle,
    pub aux: u64,
    pub frequency: Frequency,
}

impl PairRecord {
    #[inline]
    pub const fn new(
        pair: SymbolPair,
        occurrences: OccurrenceHandle,
        aux: u64,
        frequency: Frequency,
    ) -> Self {
        Self {
            pair,
            occurrences,
            aux,
            frequency,
        }
    }

    /// Builds a record from a pair and a previously looked-up triple.
    #[inline]
    pub const fn from_triple(pair: SymbolPair, triple: Triple) -> Self {
        Self {
            pair,
            occurrences: triple.occurrences,
            aux: triple.aux,
            frequency: triple.frequency,
        }
    }

    #[inline]
    pub const fn triple(&self) -> Triple {
        Triple {
            occurrences: self.occurrences,
            aux: self.aux,
            frequency: self.frequency,
        }
    }

    /// Returns a copy of this record carrying `frequency` instead.
    #[inline]
    pub const fn with_frequency(self, frequency: Frequency) -> Self {
        Self { frequency, ..self }
    }
}
