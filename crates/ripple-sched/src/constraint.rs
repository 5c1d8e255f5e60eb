//! Constraint collection: raw ordering declarations to action edges.
//!
//! Users order update logic with declarations such as "`up_pulse` before
//! any read of `enq.rdy`" or "every write of `a` before every read of
//! `b`". [`collect_constraints`] resolves the net-access side of each
//! declaration to the actions whose footprints touch that net and emits
//! canonical `(predecessor, successor)` edges.

use std::fmt;

use indexmap::IndexMap;
use ripple_core::{ActionId, NetId, NetModel};
use tracing::debug;

use crate::error::{EntityRef, ScheduleError};
use crate::footprint::Footprint;

/// One side of an ordering declaration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ConstraintTarget {
    /// A specific action (update block or method).
    Action(ActionId),
    /// Every action that reads the net.
    Read(NetId),
    /// Every action that writes the net.
    Write(NetId),
}

impl fmt::Display for ConstraintTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Action(a) => write!(f, "U({a})"),
            Self::Read(n) => write!(f, "RD({n})"),
            Self::Write(n) => write!(f, "WR({n})"),
        }
    }
}

/// The declaration shape of a [`RawConstraint`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConstraintKind {
    /// `U(a) < U(b)`, including method-to-method ordering.
    ActionBeforeAction,
    /// `U(a) < WR(n)`.
    ActionBeforeNetWrite,
    /// `U(a) < RD(n)`.
    ActionBeforeNetRead,
    /// `RD(n) < U(a)` or `WR(n) < U(a)`.
    NetAccessBeforeAction,
    /// `RD(n) < WR(m)` and the other three combinations.
    NetAccessBeforeNetAccess,
}

/// An explicit "`before` executes strictly before `after`" declaration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RawConstraint {
    /// The predecessor side.
    pub before: ConstraintTarget,
    /// The successor side.
    pub after: ConstraintTarget,
}

impl RawConstraint {
    /// General constructor.
    pub fn new(before: ConstraintTarget, after: ConstraintTarget) -> Self {
        Self { before, after }
    }

    /// `a` runs before `b`.
    pub fn action_before_action(a: ActionId, b: ActionId) -> Self {
        Self::new(ConstraintTarget::Action(a), ConstraintTarget::Action(b))
    }

    /// `a` runs before every writer of `net`.
    pub fn action_before_net_write(a: ActionId, net: NetId) -> Self {
        Self::new(ConstraintTarget::Action(a), ConstraintTarget::Write(net))
    }

    /// `a` runs before every reader of `net`.
    pub fn action_before_net_read(a: ActionId, net: NetId) -> Self {
        Self::new(ConstraintTarget::Action(a), ConstraintTarget::Read(net))
    }

    /// Every writer of `net` runs before `a`.
    pub fn net_write_before_action(net: NetId, a: ActionId) -> Self {
        Self::new(ConstraintTarget::Write(net), ConstraintTarget::Action(a))
    }

    /// Every reader of `net` runs before `a`.
    pub fn net_read_before_action(net: NetId, a: ActionId) -> Self {
        Self::new(ConstraintTarget::Read(net), ConstraintTarget::Action(a))
    }

    /// Every accessor named by `before` runs before every accessor named by
    /// `after`.
    pub fn net_access_before_net_access(before: ConstraintTarget, after: ConstraintTarget) -> Self {
        Self::new(before, after)
    }

    /// Classify the declaration.
    pub fn kind(&self) -> ConstraintKind {
        use ConstraintTarget::{Action, Read, Write};
        match (self.before, self.after) {
            (Action(_), Action(_)) => ConstraintKind::ActionBeforeAction,
            (Action(_), Write(_)) => ConstraintKind::ActionBeforeNetWrite,
            (Action(_), Read(_)) => ConstraintKind::ActionBeforeNetRead,
            (_, Action(_)) => ConstraintKind::NetAccessBeforeAction,
            _ => ConstraintKind::NetAccessBeforeNetAccess,
        }
    }
}

impl fmt::Display for RawConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} < {}", self.before, self.after)
    }
}

/// A normalized explicit ordering edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExplicitEdge {
    /// Predecessor action.
    pub from: ActionId,
    /// Successor action.
    pub to: ActionId,
    /// Index of the first constraint that produced this edge.
    pub constraint: usize,
}

/// Resolve raw constraints into deduplicated action edges.
///
/// `footprints[i]` is the footprint of `ActionId(i)`. The result is sorted
/// by `(from, to)`; duplicate pairs collapse to the first declaring
/// constraint.
///
/// Pairs where both sides resolve to the same action through a net access
/// are dropped. An explicit `U(a) < U(a)` is kept and later surfaces as a
/// self-loop.
pub fn collect_constraints(
    constraints: &[RawConstraint],
    footprints: &[Footprint],
    nets: &NetModel,
) -> Result<Vec<ExplicitEdge>, ScheduleError> {
    let mut pairs: IndexMap<(ActionId, ActionId), usize> = IndexMap::new();

    for (idx, c) in constraints.iter().enumerate() {
        let befores = resolve(idx, c.before, footprints, nets)?;
        let afters = resolve(idx, c.after, footprints, nets)?;
        if befores.is_empty() || afters.is_empty() {
            debug!(constraint = idx, decl = %c, "constraint resolves to no actions");
            continue;
        }
        let explicit_pair = c.kind() == ConstraintKind::ActionBeforeAction;
        for &from in &befores {
            for &to in &afters {
                if from == to && !explicit_pair {
                    continue;
                }
                pairs.entry((from, to)).or_insert(idx);
            }
        }
    }

    let mut edges: Vec<ExplicitEdge> = pairs
        .into_iter()
        .map(|((from, to), constraint)| ExplicitEdge {
            from,
            to,
            constraint,
        })
        .collect();
    edges.sort_by_key(|e| (e.from, e.to));
    Ok(edges)
}

fn resolve(
    idx: usize,
    target: ConstraintTarget,
    footprints: &[Footprint],
    nets: &NetModel,
) -> Result<Vec<ActionId>, ScheduleError> {
    let check_net = |net: NetId| {
        if nets.contains(net) {
            Ok(())
        } else {
            Err(ScheduleError::UnknownEntity {
                constraint: idx,
                entity: EntityRef::Net(net),
            })
        }
    };
    let select = |pred: &dyn Fn(&Footprint) -> bool| -> Vec<ActionId> {
        footprints
            .iter()
            .enumerate()
            .filter(|(_, fp)| pred(fp))
            .map(|(i, _)| ActionId(i as u32))
            .collect()
    };

    match target {
        ConstraintTarget::Action(a) => {
            if a.index() < footprints.len() {
                Ok(vec![a])
            } else {
                Err(ScheduleError::UnknownEntity {
                    constraint: idx,
                    entity: EntityRef::Action(a),
                })
            }
        }
        ConstraintTarget::Read(net) => {
            check_net(net)?;
            Ok(select(&|fp| fp.reads.contains(net)))
        }
        ConstraintTarget::Write(net) => {
            check_net(net)?;
            Ok(select(&|fp| fp.writes.contains(net)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ripple_core::NetModelBuilder;

    fn model(n: usize) -> NetModel {
        let mut b = NetModelBuilder::new();
        for i in 0..n {
            b.add_signal(format!("n{i}"), 8);
        }
        b.build().unwrap()
    }

    fn a(i: u32) -> ActionId {
        ActionId(i)
    }

    fn pairs(edges: &[ExplicitEdge]) -> Vec<(u32, u32)> {
        edges.iter().map(|e| (e.from.0, e.to.0)).collect()
    }

    #[test]
    fn action_pairs_pass_through() {
        let fps = vec![Footprint::default(); 3];
        let edges = collect_constraints(
            &[RawConstraint::action_before_action(a(2), a(0))],
            &fps,
            &model(0),
        )
        .unwrap();
        assert_eq!(pairs(&edges), vec![(2, 0)]);
        assert_eq!(edges[0].constraint, 0);
    }

    #[test]
    fn duplicates_collapse_to_first_declaration() {
        let fps = vec![Footprint::default(); 2];
        let c = RawConstraint::action_before_action(a(0), a(1));
        let edges = collect_constraints(&[c, c, c], &fps, &model(0)).unwrap();
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].constraint, 0);
    }

    #[test]
    fn net_write_resolves_to_all_writers() {
        let n = NetId(0);
        let fps = vec![
            Footprint::default(),
            Footprint::new([], [n]),
            Footprint::new([n], []),
            Footprint::new([], [n]),
        ];
        let edges = collect_constraints(
            &[RawConstraint::action_before_net_write(a(0), n)],
            &fps,
            &model(1),
        )
        .unwrap();
        assert_eq!(pairs(&edges), vec![(0, 1), (0, 3)]);
    }

    #[test]
    fn net_access_pairs_expand_as_cross_product() {
        let (x, y) = (NetId(0), NetId(1));
        let fps = vec![
            Footprint::new([x], []),
            Footprint::new([x], [y]),
            Footprint::new([], [y]),
        ];
        let edges = collect_constraints(
            &[RawConstraint::net_access_before_net_access(
                ConstraintTarget::Read(x),
                ConstraintTarget::Write(y),
            )],
            &fps,
            &model(2),
        )
        .unwrap();
        // (1, 1) is dropped: an action is trivially ordered with itself.
        assert_eq!(pairs(&edges), vec![(0, 1), (0, 2), (1, 2)]);
    }

    #[test]
    fn explicit_self_pair_is_kept() {
        let fps = vec![Footprint::default()];
        let edges = collect_constraints(
            &[RawConstraint::action_before_action(a(0), a(0))],
            &fps,
            &model(0),
        )
        .unwrap();
        assert_eq!(pairs(&edges), vec![(0, 0)]);
    }

    #[test]
    fn unmatched_net_access_yields_no_edges() {
        let fps = vec![Footprint::default(); 2];
        let edges = collect_constraints(
            &[RawConstraint::net_read_before_action(NetId(0), a(1))],
            &fps,
            &model(1),
        )
        .unwrap();
        assert!(edges.is_empty());
    }

    #[test]
    fn unknown_action_rejected() {
        let fps = vec![Footprint::default(); 2];
        let err = collect_constraints(
            &[
                RawConstraint::action_before_action(a(0), a(1)),
                RawConstraint::action_before_action(a(0), a(7)),
            ],
            &fps,
            &model(0),
        )
        .unwrap_err();
        assert_eq!(
            err,
            ScheduleError::UnknownEntity {
                constraint: 1,
                entity: EntityRef::Action(a(7)),
            }
        );
    }

    #[test]
    fn unknown_net_rejected() {
        let fps = vec![Footprint::default()];
        let err = collect_constraints(
            &[RawConstraint::action_before_net_read(a(0), NetId(4))],
            &fps,
            &model(2),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ScheduleError::UnknownEntity {
                entity: EntityRef::Net(NetId(4)),
                ..
            }
        ));
    }

    #[test]
    fn kinds_classify_declarations() {
        let n = NetId(0);
        assert_eq!(
            RawConstraint::action_before_action(a(0), a(1)).kind(),
            ConstraintKind::ActionBeforeAction
        );
        assert_eq!(
            RawConstraint::action_before_net_write(a(0), n).kind(),
            ConstraintKind::ActionBeforeNetWrite
        );
        assert_eq!(
            RawConstraint::action_before_net_read(a(0), n).kind(),
            ConstraintKind::ActionBeforeNetRead
        );
        assert_eq!(
            RawConstraint::net_write_before_action(n, a(0)).kind(),
            ConstraintKind::NetAccessBeforeAction
        );
        assert_eq!(
            RawConstraint::new(ConstraintTarget::Write(n), ConstraintTarget::Read(n)).kind(),
            ConstraintKind::NetAccessBeforeNetAccess
        );
        assert_eq!(
            RawConstraint::action_before_net_read(a(3), n).to_string(),
            "U(a3) < RD(n0)"
        );
    }
}
