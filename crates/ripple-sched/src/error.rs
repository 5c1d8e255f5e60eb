//! Scheduling errors (build-time, never per-tick).

use std::fmt;

use ripple_core::{ActionId, NetId};
use thiserror::Error;

/// An entity referenced by a constraint or footprint.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntityRef {
    /// An action id.
    Action(ActionId),
    /// A net id.
    Net(NetId),
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Action(a) => write!(f, "action {a}"),
            Self::Net(n) => write!(f, "net {n}"),
        }
    }
}

/// Why a schedule could not be built.
///
/// Every variant is fatal and is reported before any tick executes. The
/// scheduler never drops a constraint or guesses an order; the design must
/// be corrected and re-elaborated.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ScheduleError {
    /// A constraint names an action or net that does not exist.
    #[error("constraint #{constraint} references unknown {entity}")]
    UnknownEntity {
        /// Index of the offending constraint in the input list.
        constraint: usize,
        /// The unresolvable reference.
        entity: EntityRef,
    },

    /// The footprint oracle has no entry for a registered action.
    #[error("no footprint for action '{action}'")]
    MissingFootprint {
        /// Name of the action.
        action: String,
    },

    /// A footprint names a net outside the net model.
    #[error("footprint of action '{action}' references unknown net {net}")]
    UnknownFootprintNet {
        /// Name of the action.
        action: String,
        /// The unknown net.
        net: NetId,
    },

    /// Two registered actions share a name, which would make reports
    /// ambiguous.
    #[error("action name '{name}' registered more than once")]
    DuplicateAction {
        /// The duplicated name.
        name: String,
    },

    /// A net has writers whose relative order is undetermined.
    #[error("net '{net_name}' ({net}) has uncoordinated drivers: {}", .writers.join(", "))]
    DriverConflict {
        /// The contested net.
        net: NetId,
        /// Its name.
        net_name: String,
        /// The conflicting writers, in declaration order.
        writers: Vec<String>,
    },

    /// A cycle exists among combinational actions.
    #[error("combinational loop: {} (through nets {})", .path.join(" -> "), fmt_nets(.nets))]
    CombinationalLoop {
        /// Every action of the strongly connected component, in
        /// declaration order.
        cycle: Vec<String>,
        /// A concrete cycle through the component, starting and implicitly
        /// ending at its lowest-declaration-index member.
        path: Vec<String>,
        /// Nets carrying the data dependencies along `path`.
        nets: Vec<NetId>,
    },

    /// Explicit constraints close a cycle through method-call or
    /// sequential actions.
    #[error("constraint cycle: {}", .path.join(" -> "))]
    ConstraintCycle {
        /// Every action of the cyclic component, in declaration order.
        cycle: Vec<String>,
        /// A concrete cycle through the component.
        path: Vec<String>,
    },
}

fn fmt_nets(nets: &[NetId]) -> String {
    if nets.is_empty() {
        return "none".to_string();
    }
    nets.iter()
        .map(|n| n.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
