//! Per-tick and cumulative execution metrics.
//!
//! [`TickMetrics`] captures timing and activity for a single tick;
//! [`SimCounters`] accumulates over the lifetime of a simulator.

/// Timing and activity collected during a single tick.
///
/// All durations are in microseconds. The executor fills these in after
/// each successful tick.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TickMetrics {
    /// Wall-clock time for the entire tick, in microseconds.
    pub total_us: u64,
    /// Per-action execution times in schedule order: `(name, microseconds)`.
    /// Skipped method calls are not listed.
    pub action_us: Vec<(String, u64)>,
    /// Actions whose body ran.
    pub invoked: u32,
    /// Method calls skipped because their guard was false.
    pub skipped_guards: u32,
    /// Writes applied to the live store during the tick.
    pub immediate_writes: u32,
    /// Staged sequential writes committed at the tick boundary.
    pub committed_writes: u32,
}

/// Lifetime counters of a [`Simulator`](crate::Simulator).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SimCounters {
    /// Successfully committed ticks.
    pub ticks: u64,
    /// Ticks aborted and rolled back by an action error.
    pub failed_ticks: u64,
    /// Action bodies executed across all committed ticks.
    pub invocations: u64,
    /// Guard-false method skips across all committed ticks.
    pub skipped_guards: u64,
    /// Sequential writes committed across all ticks.
    pub committed_writes: u64,
    /// Successful schedule requests (cache hits included).
    pub schedules: u64,
}

impl SimCounters {
    pub(crate) fn record(&mut self, m: &TickMetrics) {
        self.ticks += 1;
        self.invocations += u64::from(m.invoked);
        self.skipped_guards += u64::from(m.skipped_guards);
        self.committed_writes += u64::from(m.committed_writes);
    }
}
