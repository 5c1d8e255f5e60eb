//! Strongly-typed identifiers and the [`Value`] type.

use std::fmt;

/// Identifies a signal within an elaborated design.
///
/// Signals are registered during elaboration and assigned sequential IDs.
/// `SignalId(n)` corresponds to the n-th signal added to the
/// [`NetModelBuilder`](crate::NetModelBuilder).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SignalId(pub u32);

impl fmt::Display for SignalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s{}", self.0)
    }
}

impl From<u32> for SignalId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Identifies a net: an equivalence class of connected signals.
///
/// Nets are numbered in order of their lowest member signal, so the
/// numbering is a pure function of the signal list and connections.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NetId(pub u32);

impl fmt::Display for NetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

impl From<u32> for NetId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Identifies an update action by its declaration index.
///
/// `ActionId(n)` is the n-th action registered. The declaration index is
/// also the default tie-break key of the scheduler.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActionId(pub u32);

impl ActionId {
    /// The declaration index as a `usize`, for indexing dense tables.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "a{}", self.0)
    }
}

impl From<u32> for ActionId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Monotonically increasing simulation tick counter.
///
/// Incremented each time a tick commits successfully.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TickId(pub u64);

impl fmt::Display for TickId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for TickId {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

/// The bit pattern held by a net during one tick.
///
/// Nets are at most 64 bits wide; narrower nets keep only their low
/// `width` bits (see [`mask_to_width`]).
pub type Value = u64;

/// Largest supported net width in bits.
pub const MAX_WIDTH: u32 = 64;

/// Truncate `value` to its low `width` bits.
///
/// `width` must be in `1..=MAX_WIDTH`; the net model rejects anything else
/// at elaboration.
#[inline]
pub fn mask_to_width(value: Value, width: u32) -> Value {
    if width >= MAX_WIDTH {
        value
    } else {
        value & ((1u64 << width) - 1)
    }
}
