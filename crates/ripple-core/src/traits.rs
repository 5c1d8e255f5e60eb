//! Core abstraction traits for net value access.

use crate::id::{NetId, Value};

/// Read-only access to net values within a tick.
///
/// Implemented by the live net store and by saved snapshots of it.
/// Returns `None` if the net is not readable in the current context.
pub trait NetReader {
    /// Current value of `net`.
    fn read(&self, net: NetId) -> Option<Value>;
}

/// Write access to net values within a tick.
///
/// Implemented by the live store and by the per-action write log that the
/// executor routes to the store or the staging buffer.
pub trait NetWriter {
    /// Write `value` to `net`, masking it to the net's width.
    ///
    /// Returns `false` if the net is not writable in the current context.
    fn write(&mut self, net: NetId, value: Value) -> bool;
}
