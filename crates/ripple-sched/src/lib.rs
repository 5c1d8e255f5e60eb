//! Constraint collection, dependency graph, and static scheduling.
//!
//! Given a design's actions, their read/write footprints and any declared
//! ordering constraints, this crate derives one fixed, reproducible
//! execution order (a [`Schedule`]) or reports why none exists. The
//! [`Action`] trait and the [`ActionContext`] handed to it at tick time
//! also live here.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod action;
pub mod constraint;
pub mod context;
pub mod error;
pub mod fingerprint;
pub mod footprint;
pub mod graph;
pub mod schedule;

pub use action::{Action, ActionDecl, ActionKind, ActionRegistry};
pub use constraint::{
    collect_constraints, ConstraintKind, ConstraintTarget, ExplicitEdge, RawConstraint,
};
pub use context::{ActionContext, GuardContext, WriteLog};
pub use error::{EntityRef, ScheduleError};
pub use fingerprint::structural_fingerprint;
pub use footprint::{Footprint, FootprintOracle, FootprintTable};
pub use graph::{DependencyGraph, Edge, EdgeKind, Hazard};
pub use schedule::{build_schedule, Schedule, Scheduler, SchedulerStats, TieBreak};
