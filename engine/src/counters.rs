//! Traversal counters.
//!
//! This module provides the accumulators threaded through a tree walk:
//! - Counter: a single monotonic count with a choice of representation
//! - PathCounters: the file/directory/byte triple returned by every
//!   counting operation
//!
//! A PathCounters instance is created at the start of one walk, mutated
//! exclusively by that walk, and handed back as the result. Callers wanting
//! cumulative totals across several walks thread the same instance through
//! each call.

use serde::Serialize;
use std::fmt;

/// Representation chosen for a counter, fixed once at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterKind {
    /// Machine-word counter; wraps silently past `u64::MAX`.
    Fixed,
    /// Wide counter; byte totals cannot overflow it in practice.
    Exact,
    /// Discards all writes, for callers uninterested in counts.
    Noop,
}

/// A monotonic, mutable count.
///
/// The representation is chosen once, at construction, for the whole
/// traversal. `as_u64` is the fixed-width view and may wrap or truncate;
/// `as_u128` is the exact view and never truncates for the `Exact` variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Counter {
    /// Fast fixed-width count; additions wrap silently on overflow.
    Fixed(u64),
    /// Exact wide count; never overflows from file sizes or entry counts.
    Exact(u128),
    /// Ignores all updates and always reads as zero.
    Noop,
}

impl Counter {
    /// Create a zeroed counter of the given kind.
    pub fn new(kind: CounterKind) -> Self {
        match kind {
            CounterKind::Fixed => Counter::Fixed(0),
            CounterKind::Exact => Counter::Exact(0),
            CounterKind::Noop => Counter::Noop,
        }
    }

    /// Add `n` to the count.
    pub fn add(&mut self, n: u64) {
        match self {
            Counter::Fixed(value) => *value = value.wrapping_add(n),
            Counter::Exact(value) => *value += u128::from(n),
            Counter::Noop => {}
        }
    }

    /// Add one to the count.
    pub fn increment(&mut self) {
        self.add(1);
    }

    /// Reset the count to zero.
    pub fn reset(&mut self) {
        match self {
            Counter::Fixed(value) => *value = 0,
            Counter::Exact(value) => *value = 0,
            Counter::Noop => {}
        }
    }

    /// Fixed-width view of the count.
    ///
    /// For the `Fixed` variant this is the (possibly wrapped) stored value;
    /// for the `Exact` variant it truncates to the low 64 bits.
    pub fn as_u64(&self) -> u64 {
        match self {
            Counter::Fixed(value) => *value,
            Counter::Exact(value) => *value as u64,
            Counter::Noop => 0,
        }
    }

    /// Exact view of the count. Never truncates for the `Exact` variant.
    pub fn as_u128(&self) -> u128 {
        match self {
            Counter::Fixed(value) => u128::from(*value),
            Counter::Exact(value) => *value,
            Counter::Noop => 0,
        }
    }
}

impl fmt::Display for Counter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u128())
    }
}

/// The file/directory/byte counter triple owned by a single traversal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathCounters {
    /// Regular files accepted by the file filter.
    pub files: Counter,

    /// Directories visited, counted post-order on exit.
    pub directories: Counter,

    /// Sum of the sizes of counted files.
    pub bytes: Counter,
}

impl PathCounters {
    /// Create a counter triple of the given kind, all zeroed.
    pub fn new(kind: CounterKind) -> Self {
        PathCounters {
            files: Counter::new(kind),
            directories: Counter::new(kind),
            bytes: Counter::new(kind),
        }
    }

    /// Fast fixed-width counters; may wrap silently on extreme inputs.
    pub fn fixed() -> Self {
        Self::new(CounterKind::Fixed)
    }

    /// Exact counters.
    pub fn exact() -> Self {
        Self::new(CounterKind::Exact)
    }

    /// Counters that discard every update.
    pub fn noop() -> Self {
        Self::new(CounterKind::Noop)
    }

    /// Reset all three counts to zero.
    pub fn reset(&mut self) {
        self.files.reset();
        self.directories.reset();
        self.bytes.reset();
    }

    /// Exact point-in-time copy of the counts, for serialization.
    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            files: self.files.as_u128(),
            directories: self.directories.as_u128(),
            bytes: self.bytes.as_u128(),
        }
    }
}

impl fmt::Display for PathCounters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} files, {} directories, {} bytes",
            self.files, self.directories, self.bytes
        )
    }
}

/// Serializable snapshot of a PathCounters, exact values only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CounterSnapshot {
    pub files: u128,
    pub directories: u128,
    pub bytes: u128,
}
