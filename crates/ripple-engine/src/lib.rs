//! Simulation engine driving Ripple designs tick by tick.
//!
//! Provides the [`Simulator`] that owns a design's nets and actions,
//! obtains a static schedule from [`ripple_sched`], and replays it once per
//! tick against a [`NetStore`], committing sequential writes at the tick
//! boundary and rolling back on action errors.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod metrics;
pub mod sim;
pub mod store;
pub mod tick;

pub use config::{ConfigError, SimConfig};
pub use metrics::{SimCounters, TickMetrics};
pub use sim::{SimState, Simulator};
pub use store::{NetSnapshot, NetStore};
pub use tick::{TickError, TickExecutor, TickOutcome};
