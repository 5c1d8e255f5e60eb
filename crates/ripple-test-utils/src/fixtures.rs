//! Reusable action fixtures.
//!
//! Net-level building blocks for scheduler and engine testing:
//!
//! - [`ConstDriver`]: combinational, drives a constant (no reads).
//! - [`Adder`]: combinational, `out = a + b`.
//! - [`Register`]: sequential, `q <<= d`.
//! - [`Counter`]: sequential, `count <<= count + 1`.
//! - [`FailingAction`]: fails deterministically after N calls.
//!
//! Each fixture offers a `footprint()` matching exactly what it touches.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use ripple_core::{ActionError, NetId, Value};
use ripple_sched::{Action, ActionContext, ActionKind, Footprint};

/// Writes a constant value every tick.
pub struct ConstDriver {
    pub name: String,
    pub output: NetId,
    pub value: Value,
}

impl ConstDriver {
    pub fn new(name: impl Into<String>, output: NetId, value: Value) -> Self {
        Self {
            name: name.into(),
            output,
            value,
        }
    }

    pub fn footprint(&self) -> Footprint {
        Footprint::new([], [self.output])
    }
}

impl Action for ConstDriver {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> ActionKind {
        ActionKind::Combinational
    }

    fn execute(&mut self, ctx: &mut ActionContext<'_>) -> Result<(), ActionError> {
        ctx.write(self.output, self.value)
    }
}

/// Combinational two-input adder (wrapping, masked by the store).
pub struct Adder {
    pub name: String,
    pub a: NetId,
    pub b: NetId,
    pub out: NetId,
}

impl Adder {
    pub fn new(name: impl Into<String>, a: NetId, b: NetId, out: NetId) -> Self {
        Self {
            name: name.into(),
            a,
            b,
            out,
        }
    }

    pub fn footprint(&self) -> Footprint {
        Footprint::new([self.a, self.b], [self.out])
    }
}

impl Action for Adder {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> ActionKind {
        ActionKind::Combinational
    }

    fn execute(&mut self, ctx: &mut ActionContext<'_>) -> Result<(), ActionError> {
        let sum = ctx.read(self.a)?.wrapping_add(ctx.read(self.b)?);
        ctx.write(self.out, sum)
    }
}

/// Edge-triggered register: `q` takes the value `d` holds when the register
/// runs, and shows it from the next tick on.
pub struct Register {
    pub name: String,
    pub d: NetId,
    pub q: NetId,
}

impl Register {
    pub fn new(name: impl Into<String>, d: NetId, q: NetId) -> Self {
        Self {
            name: name.into(),
            d,
            q,
        }
    }

    pub fn footprint(&self) -> Footprint {
        Footprint::new([self.d], [self.q])
    }
}

impl Action for Register {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> ActionKind {
        ActionKind::Sequential
    }

    fn execute(&mut self, ctx: &mut ActionContext<'_>) -> Result<(), ActionError> {
        let d = ctx.read(self.d)?;
        ctx.write(self.q, d)
    }
}

/// Sequential free-running counter.
pub struct Counter {
    pub name: String,
    pub count: NetId,
}

impl Counter {
    pub fn new(name: impl Into<String>, count: NetId) -> Self {
        Self {
            name: name.into(),
            count,
        }
    }

    pub fn footprint(&self) -> Footprint {
        Footprint::new([self.count], [self.count])
    }
}

impl Action for Counter {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> ActionKind {
        ActionKind::Sequential
    }

    fn execute(&mut self, ctx: &mut ActionContext<'_>) -> Result<(), ActionError> {
        let n = ctx.read(self.count)?;
        ctx.write(self.count, n.wrapping_add(1))
    }
}

/// Fails deterministically after a configurable number of successful calls.
///
/// Useful for testing rollback and error propagation in the tick executor.
/// The call counter is shared, so [`calls()`](Self::calls) stays readable
/// through a [`counter()`](Self::counter) handle after the action has been
/// boxed and handed to a simulator.
pub struct FailingAction {
    pub name: String,
    pub output: NetId,
    pub succeed_count: usize,
    call_count: Arc<AtomicUsize>,
}

impl FailingAction {
    /// Create an action that succeeds `succeed_count` times then fails.
    pub fn new(name: impl Into<String>, output: NetId, succeed_count: usize) -> Self {
        Self {
            name: name.into(),
            output,
            succeed_count,
            call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn footprint(&self) -> Footprint {
        Footprint::new([], [self.output])
    }

    /// How many times `execute()` has been called.
    pub fn calls(&self) -> usize {
        self.call_count.load(Ordering::Relaxed)
    }

    /// A shared handle on the call counter.
    pub fn counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.call_count)
    }

    /// Reset the call counter.
    pub fn reset(&self) {
        self.call_count.store(0, Ordering::Relaxed);
    }
}

impl Action for FailingAction {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> ActionKind {
        ActionKind::Combinational
    }

    fn execute(&mut self, ctx: &mut ActionContext<'_>) -> Result<(), ActionError> {
        let n = self.call_count.fetch_add(1, Ordering::Relaxed);
        if n >= self.succeed_count {
            return Err(ActionError::ExecutionFailed {
                reason: format!(
                    "deliberate failure after {} successful calls",
                    self.succeed_count
                ),
            });
        }
        // On success, write the 1-based call number for traceability.
        ctx.write(self.output, n as Value + 1)
    }
}
