//! Tick executor: replays a [`Schedule`] against a [`NetStore`].
//!
//! One tick is:
//!
//! 1. Snapshot the store (restored if an action fails).
//! 2. Run every action in schedule order. Combinational and method-call
//!    writes land in the live store as soon as the action returns;
//!    sequential writes are staged. A method call whose guard is false is
//!    skipped.
//! 3. Commit the staged writes in one pass and advance the tick counter.
//!
//! An action error aborts the tick: the store is restored from the
//! snapshot, staged writes are dropped, and the counter stays put.

use std::time::Instant;

use ripple_core::{ActionError, NetId, TickId, Value};
use ripple_sched::{Action, ActionContext, ActionKind, GuardContext, Schedule, WriteLog};
use thiserror::Error;
use tracing::trace;

use crate::metrics::TickMetrics;
use crate::store::{NetSnapshot, NetStore};

/// Result of a committed tick.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TickOutcome {
    /// The tick that was committed.
    pub tick_id: TickId,
    /// Metrics for this tick.
    pub metrics: TickMetrics,
}

/// Why a tick did not commit.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum TickError {
    /// An action body or method guard returned an error. The tick was
    /// rolled back.
    #[error("action '{action}' failed in tick {tick}: {source}")]
    ActionFailed {
        /// Name of the failing action.
        action: String,
        /// The tick that was being computed.
        tick: TickId,
        /// The action's own error, unmodified.
        #[source]
        source: ActionError,
    },
    /// The simulator has no valid schedule.
    #[error("simulator is not scheduled")]
    NotScheduled,
    /// Ticking was disabled after repeated failures.
    #[error("ticking disabled after {failures} consecutive failed ticks")]
    TickDisabled {
        /// Consecutive failures that tripped the limit.
        failures: u32,
    },
    /// The action list does not match the schedule it is run against.
    #[error("schedule covers {scheduled} actions but {actions} were supplied")]
    ScheduleMismatch {
        /// Actions in the schedule.
        scheduled: usize,
        /// Actions supplied to the executor.
        actions: usize,
    },
}

/// Reusable per-tick buffers plus the committed tick counter.
#[derive(Debug, Default)]
pub struct TickExecutor {
    previous: NetSnapshot,
    staged: Vec<(NetId, Value)>,
    log: WriteLog,
    current_tick: TickId,
}

impl TickExecutor {
    /// An executor at tick 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// The last committed tick.
    pub fn current_tick(&self) -> TickId {
        self.current_tick
    }

    /// Rewind the tick counter to 0.
    pub fn reset(&mut self) {
        self.current_tick = TickId(0);
        self.staged.clear();
        self.log.clear();
    }

    /// Execute one tick.
    ///
    /// `actions[i]` must be the action registered as `ActionId(i)` when
    /// `schedule` was built.
    pub fn tick(
        &mut self,
        schedule: &Schedule,
        actions: &mut [Box<dyn Action>],
        store: &mut NetStore,
    ) -> Result<TickOutcome, TickError> {
        let tick_start = Instant::now();
        if actions.len() != schedule.len() {
            return Err(TickError::ScheduleMismatch {
                scheduled: schedule.len(),
                actions: actions.len(),
            });
        }

        let next_tick = TickId(self.current_tick.0 + 1);
        store.snapshot_into(&mut self.previous);
        self.staged.clear();

        let mut metrics = TickMetrics {
            action_us: Vec::with_capacity(schedule.len()),
            ..TickMetrics::default()
        };

        for &id in schedule.order() {
            let (Some(footprint), Some(kind)) = (schedule.footprint(id), schedule.kind(id)) else {
                continue;
            };
            let action = &mut actions[id.index()];
            let action_start = Instant::now();

            if kind == ActionKind::MethodCall {
                let ready = {
                    let ctx = GuardContext::new(footprint, &*store, next_tick);
                    action.guard(&ctx)
                };
                match ready {
                    Ok(true) => {}
                    Ok(false) => {
                        trace!(tick = %next_tick, action = action.name(), "guard false, skipped");
                        metrics.skipped_guards += 1;
                        continue;
                    }
                    Err(e) => return Err(self.rollback(store, action.name(), next_tick, e)),
                }
            }

            self.log.clear();
            let result = {
                let mut ctx = ActionContext::new(footprint, &*store, &mut self.log, next_tick);
                action.execute(&mut ctx)
            };
            if let Err(e) = result {
                return Err(self.rollback(store, action.name(), next_tick, e));
            }

            metrics.invoked += 1;
            if kind.writes_immediately() {
                for (net, value) in self.log.drain() {
                    store.set(net, value);
                    metrics.immediate_writes += 1;
                }
            } else {
                self.staged.extend(self.log.drain());
            }
            metrics.action_us.push((
                action.name().to_string(),
                action_start.elapsed().as_micros() as u64,
            ));
        }

        for (net, value) in self.staged.drain(..) {
            store.set(net, value);
            metrics.committed_writes += 1;
        }

        self.current_tick = next_tick;
        metrics.total_us = tick_start.elapsed().as_micros() as u64;
        trace!(
            tick = %next_tick,
            invoked = metrics.invoked,
            skipped = metrics.skipped_guards,
            committed = metrics.committed_writes,
            "tick committed"
        );
        Ok(TickOutcome {
            tick_id: next_tick,
            metrics,
        })
    }

    fn rollback(
        &mut self,
        store: &mut NetStore,
        action: &str,
        tick: TickId,
        source: ActionError,
    ) -> TickError {
        store.restore(&self.previous);
        self.staged.clear();
        self.log.clear();
        trace!(tick = %tick, action, error = %source, "tick rolled back");
        TickError::ActionFailed {
            action: action.to_string(),
            tick,
            source,
        }
    }
}
