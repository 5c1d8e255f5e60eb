//! Cycle-level queue models exercising guarded method calls.
//!
//! A [`Queue`] is shared storage behind four kinds of actions:
//!
//! - [`TestSource`] calls `enq` with scripted messages.
//! - [`TestSink`] calls `deq` and records what arrives, and when.
//! - [`QueuePeek`] calls `peek`, copying the head entry without removing it.
//! - [`QueuePulse`] (normal queues only) latches readiness at tick start.
//!
//! The queue's [`QueuePolicy`] decides which method goes first within a
//! tick, expressed as ordering constraints from [`Queue::constraints`] and
//! [`Queue::peek_constraints`]:
//!
//! | Policy | Ordering | One-entry behavior |
//! |--------|----------|--------------------|
//! | `Pipe` | `deq < enq`, `peek < enq` | enq into a full queue if deq fires the same tick |
//! | `Bypass` | `enq < deq`, `enq < peek` | a message can pass through in the tick it arrives |
//! | `Normal` | `pulse < enq`, `pulse < deq`, `peek < enq`, `peek < deq` | readiness fixed at tick start |
//!
//! `peek` is guarded on the live queue contents under every policy.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use ripple_core::{ActionError, ActionId, NetId, TickId, Value};
use ripple_sched::{Action, ActionContext, ActionKind, Footprint, GuardContext, RawConstraint};

/// Which method of a queue sees the other's effect within a tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QueuePolicy {
    /// `deq` before `enq`.
    Pipe,
    /// `enq` before `deq`.
    Bypass,
    /// Readiness latched by a pulse update before either method.
    Normal,
}

#[derive(Debug)]
struct QueueState {
    policy: QueuePolicy,
    capacity: usize,
    items: VecDeque<Value>,
    enq_rdy: bool,
    deq_rdy: bool,
}

impl QueueState {
    fn enq_ready(&self) -> bool {
        match self.policy {
            QueuePolicy::Normal => self.enq_rdy,
            _ => self.items.len() < self.capacity,
        }
    }

    fn deq_ready(&self) -> bool {
        match self.policy {
            QueuePolicy::Normal => self.deq_rdy,
            _ => !self.items.is_empty(),
        }
    }
}

/// Handle on a bounded queue shared by its method actions.
#[derive(Clone, Debug)]
pub struct Queue {
    state: Arc<Mutex<QueueState>>,
}

impl Queue {
    pub fn new(policy: QueuePolicy, capacity: usize) -> Self {
        Self {
            state: Arc::new(Mutex::new(QueueState {
                policy,
                capacity,
                items: VecDeque::with_capacity(capacity),
                enq_rdy: false,
                deq_rdy: false,
            })),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, QueueState>, ActionError> {
        self.state.lock().map_err(|_| ActionError::GuardFailed {
            reason: "queue state poisoned".to_string(),
        })
    }

    /// Number of buffered messages (0 if the state is poisoned).
    pub fn len(&self) -> usize {
        self.state.lock().map(|s| s.items.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn policy(&self) -> QueuePolicy {
        match self.state.lock() {
            Ok(s) => s.policy,
            Err(poisoned) => poisoned.into_inner().policy,
        }
    }

    /// Ordering constraints for this queue's policy.
    ///
    /// `pulse` is only consulted for [`QueuePolicy::Normal`].
    pub fn constraints(
        &self,
        enq: ActionId,
        deq: ActionId,
        pulse: Option<ActionId>,
    ) -> Vec<RawConstraint> {
        match self.policy() {
            QueuePolicy::Pipe => vec![RawConstraint::action_before_action(deq, enq)],
            QueuePolicy::Bypass => vec![RawConstraint::action_before_action(enq, deq)],
            QueuePolicy::Normal => pulse
                .map(|p| {
                    vec![
                        RawConstraint::action_before_action(p, enq),
                        RawConstraint::action_before_action(p, deq),
                    ]
                })
                .unwrap_or_default(),
        }
    }

    /// Ordering of a `peek` caller against `enq` and `deq`.
    ///
    /// A pipe or normal peek sees the head before this tick's enq; a bypass
    /// peek sees it after. A normal peek also runs before deq, so it reports
    /// the entry deq removes in the same tick.
    pub fn peek_constraints(
        &self,
        peek: ActionId,
        enq: ActionId,
        deq: ActionId,
    ) -> Vec<RawConstraint> {
        match self.policy() {
            QueuePolicy::Pipe => vec![RawConstraint::action_before_action(peek, enq)],
            QueuePolicy::Bypass => vec![RawConstraint::action_before_action(enq, peek)],
            QueuePolicy::Normal => vec![
                RawConstraint::action_before_action(peek, deq),
                RawConstraint::action_before_action(peek, enq),
            ],
        }
    }
}

/// Calls `enq` once per tick while scripted messages remain.
///
/// Each accepted message is also driven onto `out` for tracing.
pub struct TestSource {
    pub name: String,
    pub out: NetId,
    queue: Queue,
    msgs: VecDeque<Value>,
}

impl TestSource {
    pub fn new(
        name: impl Into<String>,
        queue: &Queue,
        out: NetId,
        msgs: impl IntoIterator<Item = Value>,
    ) -> Self {
        Self {
            name: name.into(),
            out,
            queue: queue.clone(),
            msgs: msgs.into_iter().collect(),
        }
    }

    pub fn footprint(&self) -> Footprint {
        Footprint::new([], [self.out])
    }

    /// Messages not yet accepted by the queue.
    pub fn remaining(&self) -> usize {
        self.msgs.len()
    }
}

impl Action for TestSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> ActionKind {
        ActionKind::MethodCall
    }

    fn guard(&self, _ctx: &GuardContext<'_>) -> Result<bool, ActionError> {
        Ok(!self.msgs.is_empty() && self.queue.lock()?.enq_ready())
    }

    fn execute(&mut self, ctx: &mut ActionContext<'_>) -> Result<(), ActionError> {
        let Some(msg) = self.msgs.pop_front() else {
            return Ok(());
        };
        self.queue.lock()?.items.push_back(msg);
        ctx.write(self.out, msg)
    }

    fn line_trace(&self) -> Option<String> {
        Some(format!("{} left", self.msgs.len()))
    }
}

/// Calls `deq` whenever the queue is ready and records each arrival.
pub struct TestSink {
    pub name: String,
    pub out: NetId,
    queue: Queue,
    received: Arc<Mutex<Vec<(TickId, Value)>>>,
}

impl TestSink {
    pub fn new(name: impl Into<String>, queue: &Queue, out: NetId) -> Self {
        Self {
            name: name.into(),
            out,
            queue: queue.clone(),
            received: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn footprint(&self) -> Footprint {
        Footprint::new([], [self.out])
    }

    /// Shared log of `(tick, message)` arrivals.
    pub fn received(&self) -> Arc<Mutex<Vec<(TickId, Value)>>> {
        Arc::clone(&self.received)
    }
}

impl Action for TestSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> ActionKind {
        ActionKind::MethodCall
    }

    fn guard(&self, _ctx: &GuardContext<'_>) -> Result<bool, ActionError> {
        Ok(self.queue.lock()?.deq_ready())
    }

    fn execute(&mut self, ctx: &mut ActionContext<'_>) -> Result<(), ActionError> {
        let msg = self
            .queue
            .lock()?
            .items
            .pop_front()
            .ok_or_else(|| ActionError::ExecutionFailed {
                reason: "deq from empty queue".to_string(),
            })?;
        self.received
            .lock()
            .map_err(|_| ActionError::ExecutionFailed {
                reason: "sink log poisoned".to_string(),
            })?
            .push((ctx.tick_id(), msg));
        ctx.write(self.out, msg)
    }

    fn line_trace(&self) -> Option<String> {
        let n = self.received.lock().map(|r| r.len()).unwrap_or(0);
        Some(format!("{n} recv"))
    }
}

/// Calls `peek` whenever the queue holds an entry, driving the head onto
/// `out`.
pub struct QueuePeek {
    pub name: String,
    pub out: NetId,
    queue: Queue,
    hits: usize,
}

impl QueuePeek {
    pub fn new(name: impl Into<String>, queue: &Queue, out: NetId) -> Self {
        Self {
            name: name.into(),
            out,
            queue: queue.clone(),
            hits: 0,
        }
    }

    pub fn footprint(&self) -> Footprint {
        Footprint::new([], [self.out])
    }
}

impl Action for QueuePeek {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> ActionKind {
        ActionKind::MethodCall
    }

    fn guard(&self, _ctx: &GuardContext<'_>) -> Result<bool, ActionError> {
        Ok(!self.queue.lock()?.items.is_empty())
    }

    fn execute(&mut self, ctx: &mut ActionContext<'_>) -> Result<(), ActionError> {
        let head = self
            .queue
            .lock()?
            .items
            .front()
            .copied()
            .ok_or_else(|| ActionError::ExecutionFailed {
                reason: "peek at empty queue".to_string(),
            })?;
        self.hits += 1;
        ctx.write(self.out, head)
    }

    fn line_trace(&self) -> Option<String> {
        Some(format!("{} seen", self.hits))
    }
}

/// Latches a normal queue's readiness before its methods run.
pub struct QueuePulse {
    pub name: String,
    queue: Queue,
}

impl QueuePulse {
    pub fn new(name: impl Into<String>, queue: &Queue) -> Self {
        Self {
            name: name.into(),
            queue: queue.clone(),
        }
    }

    pub fn footprint(&self) -> Footprint {
        Footprint::default()
    }
}

impl Action for QueuePulse {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> ActionKind {
        ActionKind::Combinational
    }

    fn execute(&mut self, _ctx: &mut ActionContext<'_>) -> Result<(), ActionError> {
        let mut s = self.queue.lock()?;
        s.enq_rdy = s.items.len() < s.capacity;
        s.deq_rdy = !s.items.is_empty();
        Ok(())
    }
}
