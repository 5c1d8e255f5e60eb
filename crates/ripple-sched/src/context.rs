//! Execution contexts handed to actions during tick execution.
//!
//! [`ActionContext`] gives an action a footprint-checked view of the live
//! store plus a [`WriteLog`] that collects its writes. The executor decides
//! where the log goes afterwards: straight into the live store for
//! combinational and method-call actions, into the staging buffer for
//! sequential ones.

use ripple_core::{ActionError, NetId, NetReader, NetWriter, TickId, Value};

use crate::footprint::Footprint;

/// Writes recorded by one action invocation, in program order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WriteLog {
    entries: Vec<(NetId, Value)>,
}

impl WriteLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop all recorded writes, keeping the allocation.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Recorded `(net, value)` pairs in program order.
    pub fn entries(&self) -> &[(NetId, Value)] {
        &self.entries
    }

    /// Take the recorded writes, leaving the log empty.
    pub fn drain(&mut self) -> std::vec::Drain<'_, (NetId, Value)> {
        self.entries.drain(..)
    }

    /// Number of recorded writes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing was written.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl NetWriter for WriteLog {
    fn write(&mut self, net: NetId, value: Value) -> bool {
        self.entries.push((net, value));
        true
    }
}

/// Execution context passed to each action's `execute()` method.
///
/// # Read semantics
///
/// [`read()`](Self::read) sees the live store: the tick-start value, or the
/// value written earlier this tick by a combinational or method-call action
/// scheduled before this one. Sequential actions read the same way; only
/// their writes are deferred.
///
/// An action's own writes are collected in a [`WriteLog`] and become
/// visible once the action returns.
pub struct ActionContext<'a> {
    footprint: &'a Footprint,
    live: &'a dyn NetReader,
    log: &'a mut WriteLog,
    tick_id: TickId,
}

impl<'a> ActionContext<'a> {
    /// Construct a new action context.
    ///
    /// Typically called by the tick executor, not by actions directly.
    pub fn new(
        footprint: &'a Footprint,
        live: &'a dyn NetReader,
        log: &'a mut WriteLog,
        tick_id: TickId,
    ) -> Self {
        Self {
            footprint,
            live,
            log,
            tick_id,
        }
    }

    /// Current value of a net in the action's read set.
    pub fn read(&self, net: NetId) -> Result<Value, ActionError> {
        if !self.footprint.reads.contains(net) {
            return Err(ActionError::UndeclaredRead { net });
        }
        self.live.read(net).ok_or(ActionError::UndeclaredRead { net })
    }

    /// Write a net in the action's write set.
    pub fn write(&mut self, net: NetId, value: Value) -> Result<(), ActionError> {
        if !self.footprint.writes.contains(net) {
            return Err(ActionError::UndeclaredWrite { net });
        }
        self.log.write(net, value);
        Ok(())
    }

    /// The tick being computed (the previous committed tick plus one).
    pub fn tick_id(&self) -> TickId {
        self.tick_id
    }

    /// The action's declared footprint.
    pub fn footprint(&self) -> &Footprint {
        self.footprint
    }
}

/// Read-only context passed to method-call guards.
pub struct GuardContext<'a> {
    footprint: &'a Footprint,
    live: &'a dyn NetReader,
    tick_id: TickId,
}

impl<'a> GuardContext<'a> {
    /// Construct a guard context over the live store.
    pub fn new(footprint: &'a Footprint, live: &'a dyn NetReader, tick_id: TickId) -> Self {
        Self {
            footprint,
            live,
            tick_id,
        }
    }

    /// Current value of a net in the action's read set.
    pub fn read(&self, net: NetId) -> Result<Value, ActionError> {
        if !self.footprint.reads.contains(net) {
            return Err(ActionError::UndeclaredRead { net });
        }
        self.live.read(net).ok_or(ActionError::UndeclaredRead { net })
    }

    /// The tick being computed.
    pub fn tick_id(&self) -> TickId {
        self.tick_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ripple_test_utils::{MockNetReader, MockNetWriter};

    fn reader(values: &[(u32, Value)]) -> MockNetReader {
        let mut r = MockNetReader::new();
        for &(n, v) in values {
            r.set(NetId(n), v);
        }
        r
    }

    #[test]
    fn context_enforces_footprint() {
        let fp = Footprint::new([NetId(0)], [NetId(1)]);
        let live = reader(&[(0, 10), (1, 20)]);
        let mut log = WriteLog::new();
        let mut ctx = ActionContext::new(&fp, &live, &mut log, TickId(3));

        assert_eq!(ctx.read(NetId(0)), Ok(10));
        assert_eq!(
            ctx.read(NetId(1)),
            Err(ActionError::UndeclaredRead { net: NetId(1) })
        );
        assert_eq!(ctx.write(NetId(1), 5), Ok(()));
        assert_eq!(
            ctx.write(NetId(0), 5),
            Err(ActionError::UndeclaredWrite { net: NetId(0) })
        );
        assert_eq!(ctx.tick_id(), TickId(3));
        assert_eq!(log.entries(), &[(NetId(1), 5)]);
    }

    #[test]
    fn unreadable_net_in_footprint_is_rejected() {
        // Declared, but the reader has no slot for it.
        let fp = Footprint::new([NetId(7)], []);
        let live = reader(&[(0, 1)]);
        let mut log = WriteLog::new();
        let ctx = ActionContext::new(&fp, &live, &mut log, TickId(1));
        assert_eq!(
            ctx.read(NetId(7)),
            Err(ActionError::UndeclaredRead { net: NetId(7) })
        );
    }

    #[test]
    fn guard_context_reads_live_values() {
        let fp = Footprint::new([NetId(1)], []);
        let live = reader(&[(0, 0), (1, 9)]);
        let ctx = GuardContext::new(&fp, &live, TickId(1));
        assert_eq!(ctx.read(NetId(1)), Ok(9));
        assert!(ctx.read(NetId(0)).is_err());
    }

    #[test]
    fn write_log_drains_in_program_order() {
        let mut log = WriteLog::new();
        log.write(NetId(2), 1);
        log.write(NetId(0), 2);
        log.write(NetId(2), 3);

        let mut sink = MockNetWriter::new();
        sink.add_net(NetId(2));
        let accepted: Vec<bool> = log.drain().map(|(n, v)| sink.write(n, v)).collect();
        assert_eq!(accepted, vec![true, false, true]);
        assert_eq!(sink.get(NetId(2)), Some(3));
        assert_eq!(sink.writes(), 2);
        assert!(log.is_empty());
    }
}
