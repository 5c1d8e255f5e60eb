//! Ripple: a cycle-level hardware simulator built around a constraint-based
//! static scheduler.
//!
//! This is the top-level facade crate that re-exports the public API from all
//! Ripple sub-crates. For most users, adding `ripple` as a single dependency
//! is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use ripple::prelude::*;
//!
//! // count <<= count + 1, and a combinational tap doubling it.
//! struct Count(NetId);
//! impl Action for Count {
//!     fn name(&self) -> &str { "count" }
//!     fn kind(&self) -> ActionKind { ActionKind::Sequential }
//!     fn execute(&mut self, ctx: &mut ActionContext<'_>) -> Result<(), ActionError> {
//!         let n = ctx.read(self.0)?;
//!         ctx.write(self.0, n + 1)
//!     }
//! }
//!
//! struct Double { input: NetId, output: NetId }
//! impl Action for Double {
//!     fn name(&self) -> &str { "double" }
//!     fn kind(&self) -> ActionKind { ActionKind::Combinational }
//!     fn execute(&mut self, ctx: &mut ActionContext<'_>) -> Result<(), ActionError> {
//!         let v = ctx.read(self.input)?;
//!         ctx.write(self.output, v * 2)
//!     }
//! }
//!
//! let mut nets = NetModelBuilder::new();
//! nets.add_signal("count", 8);
//! nets.add_signal("twice", 8);
//! let nets = nets.build().unwrap();
//!
//! let mut config = SimConfig::new(nets);
//! config.actions = vec![
//!     Box::new(Double { input: NetId(0), output: NetId(1) }),
//!     Box::new(Count(NetId(0))),
//! ];
//! config.footprints.insert(ActionId(0), Footprint::new([NetId(0)], [NetId(1)]));
//! config.footprints.insert(ActionId(1), Footprint::new([NetId(0)], [NetId(0)]));
//!
//! let mut sim = Simulator::build(config).unwrap();
//! sim.run(3).unwrap();
//! assert_eq!(sim.line_trace(), "count=0x3 twice=0x4");
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in the prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `ripple-core` | IDs, net model, `NetSet`, core traits and errors |
//! | [`sched`] | `ripple-sched` | Actions, constraints, dependency graph, scheduler |
//! | [`engine`] | `ripple-engine` | Net store, tick executor, simulator |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types, traits, and IDs (`ripple-core`).
///
/// Contains the net model and its builder, the [`types::NetSet`] bitset,
/// error types, and the net access traits ([`types::NetReader`],
/// [`types::NetWriter`]).
pub use ripple_core as types;

/// Constraint collection, dependency graph, and static scheduling
/// (`ripple-sched`).
///
/// The [`sched::Action`] trait is the main extension point for
/// user-defined update logic.
pub use ripple_sched as sched;

/// Simulation driver (`ripple-engine`).
///
/// [`engine::Simulator`] owns a design and ticks it;
/// [`engine::TickExecutor`] is the lower-level replay loop.
pub use ripple_engine as engine;

/// Common imports for typical Ripple usage.
///
/// ```rust
/// use ripple::prelude::*;
/// ```
///
/// This imports the most frequently used types: the net model builder,
/// ids, the action trait and its contexts, constraints, and the simulator.
pub mod prelude {
    // Core types and traits
    pub use ripple_core::{
        ActionId, NetId, NetModel, NetModelBuilder, NetReader, NetSet, NetWriter, SignalId,
        TickId, Value,
    };

    // Errors
    pub use ripple_core::{ActionError, ElaborationError};
    pub use ripple_engine::{ConfigError, TickError};
    pub use ripple_sched::ScheduleError;

    // Scheduling
    pub use ripple_sched::{
        Action, ActionContext, ActionKind, Footprint, FootprintTable, GuardContext,
        RawConstraint, Schedule, Scheduler, TieBreak,
    };

    // Engine
    pub use ripple_engine::{SimConfig, SimState, Simulator, TickMetrics, TickOutcome};
}
