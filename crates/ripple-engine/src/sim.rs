//! The simulation driver tying scheduling and tick execution together.
//!
//! # State machine
//!
//! ```text
//! Uninitialized ──schedule() ok──▶ Scheduled ──tick()──▶ Ticking ⟲ tick()
//!       │
//!       └────schedule() err──▶ Failed
//! ```
//!
//! Structural edits (adding actions, changing footprints or constraints)
//! return the simulator to `Uninitialized`; the next
//! [`schedule()`](Simulator::schedule) rebuilds only if the design's
//! fingerprint actually changed.

use std::fmt;
use std::sync::Arc;

use ripple_core::{ActionId, NetId, NetModel, TickId, Value};
use ripple_sched::{
    Action, ActionRegistry, Footprint, FootprintTable, RawConstraint, Schedule, ScheduleError,
    Scheduler, SchedulerStats,
};
use tracing::{debug, info, warn};

use crate::config::{ConfigError, SimConfig};
use crate::metrics::{SimCounters, TickMetrics};
use crate::store::NetStore;
use crate::tick::{TickError, TickExecutor, TickOutcome};

/// Lifecycle state of a [`Simulator`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimState {
    /// No schedule yet, or the design changed since the last one.
    Uninitialized,
    /// A schedule exists; no tick has run on it.
    Scheduled,
    /// At least one tick has been attempted on the current schedule.
    Ticking,
    /// The last scheduling attempt failed. Ticking is refused until the
    /// design is edited and rescheduled.
    Failed,
}

impl fmt::Display for SimState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uninitialized => write!(f, "uninitialized"),
            Self::Scheduled => write!(f, "scheduled"),
            Self::Ticking => write!(f, "ticking"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Owns a design and runs it tick by tick.
pub struct Simulator {
    nets: NetModel,
    actions: ActionRegistry,
    footprints: FootprintTable,
    constraints: Vec<RawConstraint>,
    initial_values: Vec<(NetId, Value)>,
    scheduler: Scheduler,
    schedule: Option<Arc<Schedule>>,
    store: NetStore,
    executor: TickExecutor,
    state: SimState,
    max_consecutive_failures: Option<u32>,
    consecutive_failures: u32,
    tick_disabled: bool,
    last_metrics: TickMetrics,
    counters: SimCounters,
}

impl Simulator {
    /// Construct an unscheduled simulator.
    ///
    /// Validates initial values and limits; scheduling is deferred to
    /// [`schedule()`](Self::schedule).
    pub fn new(config: SimConfig) -> Result<Self, ConfigError> {
        config.validate_values()?;
        let SimConfig {
            nets,
            actions,
            footprints,
            constraints,
            initial_values,
            tie_break,
            max_consecutive_failures,
        } = config;

        let mut store = NetStore::new(&nets);
        for &(net, value) in &initial_values {
            store.set(net, value);
        }

        Ok(Self {
            nets,
            actions: actions.into_iter().collect(),
            footprints,
            constraints,
            initial_values,
            scheduler: Scheduler::new(tie_break),
            schedule: None,
            store,
            executor: TickExecutor::new(),
            state: SimState::Uninitialized,
            max_consecutive_failures,
            consecutive_failures: 0,
            tick_disabled: false,
            last_metrics: TickMetrics::default(),
            counters: SimCounters::default(),
        })
    }

    /// Construct and schedule in one step.
    pub fn build(config: SimConfig) -> Result<Self, ConfigError> {
        let mut sim = Self::new(config)?;
        sim.schedule()?;
        Ok(sim)
    }

    /// Build (or fetch from cache) the schedule for the current design.
    pub fn schedule(&mut self) -> Result<Arc<Schedule>, ScheduleError> {
        match self.scheduler.schedule(
            self.actions.decls(),
            &self.constraints,
            &self.footprints,
            &self.nets,
        ) {
            Ok(schedule) => {
                let unchanged = self
                    .schedule
                    .as_ref()
                    .is_some_and(|s| Arc::ptr_eq(s, &schedule));
                if !unchanged || self.state != SimState::Ticking {
                    self.state = SimState::Scheduled;
                }
                self.schedule = Some(Arc::clone(&schedule));
                self.counters.schedules += 1;
                Ok(schedule)
            }
            Err(e) => {
                warn!(error = %e, "design cannot be scheduled");
                self.schedule = None;
                self.state = SimState::Failed;
                Err(e)
            }
        }
    }

    /// Run one tick.
    ///
    /// On an action error the tick is rolled back and the error returned;
    /// the simulator stays in `Ticking` and may be ticked again.
    pub fn tick(&mut self) -> Result<TickOutcome, TickError> {
        if self.tick_disabled {
            return Err(TickError::TickDisabled {
                failures: self.consecutive_failures,
            });
        }
        let Some(schedule) = self.schedule.as_ref() else {
            return Err(TickError::NotScheduled);
        };
        if matches!(self.state, SimState::Uninitialized | SimState::Failed) {
            return Err(TickError::NotScheduled);
        }
        self.state = SimState::Ticking;

        match self
            .executor
            .tick(schedule, self.actions.actions_mut(), &mut self.store)
        {
            Ok(outcome) => {
                self.consecutive_failures = 0;
                self.counters.record(&outcome.metrics);
                self.last_metrics = outcome.metrics.clone();
                Ok(outcome)
            }
            Err(e) => {
                self.consecutive_failures += 1;
                self.counters.failed_ticks += 1;
                if let Some(limit) = self.max_consecutive_failures {
                    if self.consecutive_failures >= limit {
                        warn!(failures = self.consecutive_failures, "ticking disabled");
                        self.tick_disabled = true;
                    }
                }
                Err(e)
            }
        }
    }

    /// Run `n` ticks, stopping at the first error.
    pub fn run(&mut self, n: u64) -> Result<TickId, TickError> {
        for _ in 0..n {
            self.tick()?;
        }
        Ok(self.current_tick())
    }

    // ── Structural edits ────────────────────────────────────────

    /// Register a new action with its footprint.
    pub fn add_action(&mut self, action: Box<dyn Action>, footprint: Footprint) -> ActionId {
        let id = self.actions.register(action);
        self.footprints.insert(id, footprint);
        self.mark_changed();
        id
    }

    /// Replace the footprint of an existing action.
    pub fn set_footprint(&mut self, action: ActionId, footprint: Footprint) {
        self.footprints.insert(action, footprint);
        self.mark_changed();
    }

    /// Append an ordering constraint.
    pub fn add_constraint(&mut self, constraint: RawConstraint) {
        self.constraints.push(constraint);
        self.mark_changed();
    }

    /// Replace every ordering constraint.
    pub fn set_constraints(&mut self, constraints: Vec<RawConstraint>) {
        self.constraints = constraints;
        self.mark_changed();
    }

    /// Discard the cached schedule so the next [`schedule()`](Self::schedule)
    /// rebuilds unconditionally.
    pub fn invalidate(&mut self) {
        self.scheduler.invalidate();
        self.schedule = None;
        self.state = SimState::Uninitialized;
    }

    fn mark_changed(&mut self) {
        debug!("design edited, schedule pending");
        self.schedule = None;
        self.state = SimState::Uninitialized;
    }

    // ── Net access ──────────────────────────────────────────────

    /// Current value of `net`.
    pub fn read(&self, net: NetId) -> Option<Value> {
        self.store.get(net)
    }

    /// Current value of the net owning the signal called `name`.
    pub fn read_signal(&self, name: &str) -> Option<Value> {
        let signal = self.nets.signal_by_name(name)?;
        self.store.get(self.nets.net_of(signal)?)
    }

    /// Force a net value between ticks (test-bench stimulus).
    pub fn poke(&mut self, net: NetId, value: Value) -> bool {
        self.store.set(net, value)
    }

    /// `name=0xVALUE` pairs for every net, in net-id order.
    pub fn line_trace(&self) -> String {
        self.store.line_trace()
    }

    /// Per-action debugging text, in schedule order, for actions that
    /// provide one.
    pub fn action_trace(&self) -> String {
        let Some(schedule) = &self.schedule else {
            return String::new();
        };
        schedule
            .order()
            .iter()
            .filter_map(|&id| {
                let action = self.actions.get(id)?;
                let text = action.line_trace()?;
                Some(format!("{}: {}", action.name(), text))
            })
            .collect::<Vec<_>>()
            .join(" | ")
    }

    /// Restore initial net values and rewind to tick 0. The schedule is
    /// kept; actions keep their private state.
    pub fn reset(&mut self) {
        self.store.clear();
        for &(net, value) in &self.initial_values {
            self.store.set(net, value);
        }
        self.executor.reset();
        self.consecutive_failures = 0;
        self.tick_disabled = false;
        self.last_metrics = TickMetrics::default();
        if self.state == SimState::Ticking {
            self.state = SimState::Scheduled;
        }
        info!("simulator reset");
    }

    // ── Accessors ───────────────────────────────────────────────

    /// Lifecycle state.
    pub fn state(&self) -> SimState {
        self.state
    }

    /// The last committed tick.
    pub fn current_tick(&self) -> TickId {
        self.executor.current_tick()
    }

    /// The active schedule.
    pub fn current_schedule(&self) -> Option<&Arc<Schedule>> {
        self.schedule.as_ref()
    }

    /// The net model.
    pub fn nets(&self) -> &NetModel {
        &self.nets
    }

    /// The live net store.
    pub fn store(&self) -> &NetStore {
        &self.store
    }

    /// Registered actions.
    pub fn actions(&self) -> &ActionRegistry {
        &self.actions
    }

    /// Whether ticking is disabled due to consecutive failures.
    pub fn is_tick_disabled(&self) -> bool {
        self.tick_disabled
    }

    /// Consecutive failed ticks since the last committed one.
    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    /// Metrics from the most recent committed tick.
    pub fn last_metrics(&self) -> &TickMetrics {
        &self.last_metrics
    }

    /// Lifetime counters.
    pub fn counters(&self) -> SimCounters {
        self.counters
    }

    /// Schedule cache counters.
    pub fn scheduler_stats(&self) -> SchedulerStats {
        self.scheduler.stats()
    }
}

impl fmt::Debug for Simulator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Simulator")
            .field("state", &self.state)
            .field("tick", &self.current_tick())
            .field("actions", &self.actions.len())
            .field("nets", &self.nets.net_count())
            .finish()
    }
}
