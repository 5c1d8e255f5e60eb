//! The dependency graph: explicit edges merged with net-derived hazards.
//!
//! # Implicit edges
//!
//! For every net `n`, with *immediate* writers being combinational and
//! method-call actions:
//!
//! - **Read-after-write**: each immediate writer of `n` precedes every
//!   other reader of `n`. A combinational action that reads its own output
//!   gets a self-loop.
//! - **Write-after-write**: immediate co-writers of `n` must already be
//!   ordered through explicit or read-after-write edges. The implied
//!   direction is recorded as an edge; an unordered pair is a driver
//!   conflict.
//!
//! Sequential writers contribute no implicit edges: their writes are
//! staged until the tick boundary. A net with several sequential writers,
//! or with both sequential and immediate writers, is still a driver
//! conflict because its committed value would be ambiguous.

use std::collections::VecDeque;

use indexmap::IndexSet;
use ripple_core::{ActionId, NetId, NetModel};
use smallvec::SmallVec;
use tracing::trace;

use crate::action::{ActionDecl, ActionKind};
use crate::constraint::ExplicitEdge;
use crate::error::ScheduleError;
use crate::footprint::Footprint;

/// The data hazard an implicit edge resolves.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Hazard {
    /// The successor reads a value the predecessor writes.
    ReadAfterWrite,
    /// Both actions write the net; the successor's value wins.
    WriteAfterWrite,
}

/// Why an edge exists.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EdgeKind {
    /// Declared by the user.
    Explicit {
        /// Index of the first declaring constraint.
        constraint: usize,
    },
    /// Derived from footprints.
    Implicit {
        /// The net carrying the dependency.
        net: NetId,
        /// The hazard being ordered.
        hazard: Hazard,
    },
}

/// A directed "`from` before `to`" edge with its provenance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Edge {
    /// Predecessor.
    pub from: ActionId,
    /// Successor.
    pub to: ActionId,
    /// Provenance.
    pub kind: EdgeKind,
}

type Successors = SmallVec<[ActionId; 4]>;

/// Merged explicit and implicit ordering over a design's actions.
///
/// A pair of actions may be linked by several edges (one per reason);
/// [`successors`](Self::successors) lists each neighbour once.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DependencyGraph {
    edges: Vec<Edge>,
    succ: Vec<Successors>,
}

impl DependencyGraph {
    /// Build the graph for `decls`/`footprints` (indexed by [`ActionId`])
    /// plus the collector's explicit edges.
    ///
    /// Fails with [`ScheduleError::DriverConflict`] when a net's writers
    /// cannot be ordered.
    pub fn build(
        decls: &[ActionDecl],
        footprints: &[Footprint],
        explicit: &[ExplicitEdge],
        nets: &NetModel,
    ) -> Result<Self, ScheduleError> {
        let mut b = Builder::new(decls.len());

        for e in explicit {
            b.push(Edge {
                from: e.from,
                to: e.to,
                kind: EdgeKind::Explicit {
                    constraint: e.constraint,
                },
            });
        }

        let mut co_writers: Vec<(NetId, Vec<ActionId>)> = Vec::new();
        for net in nets.nets() {
            let n = net.id;
            let writers: Vec<ActionId> = ids_where(footprints, |fp| fp.writes.contains(n));
            if writers.is_empty() {
                continue;
            }
            let (immediate, staged): (Vec<ActionId>, Vec<ActionId>) = writers
                .iter()
                .copied()
                .partition(|w| decls[w.index()].kind.writes_immediately());

            if staged.len() > 1 || (!staged.is_empty() && !immediate.is_empty()) {
                return Err(driver_conflict(n, &writers, decls, nets));
            }

            for &w in &immediate {
                for r in ids_where(footprints, |fp| fp.reads.contains(n)) {
                    if r == w && decls[w.index()].kind != ActionKind::Combinational {
                        continue;
                    }
                    b.push(Edge {
                        from: w,
                        to: r,
                        kind: EdgeKind::Implicit {
                            net: n,
                            hazard: Hazard::ReadAfterWrite,
                        },
                    });
                }
            }

            if immediate.len() > 1 {
                co_writers.push((n, immediate));
            }
        }

        // Write-after-write edges only follow orderings that already exist,
        // so adding them never changes reachability for later pairs.
        for (n, writers) in co_writers {
            for (i, &a) in writers.iter().enumerate() {
                for &c in &writers[i + 1..] {
                    let (from, to) = if b.reaches(a, c) {
                        (a, c)
                    } else if b.reaches(c, a) {
                        (c, a)
                    } else {
                        return Err(driver_conflict(n, &[a, c], decls, nets));
                    };
                    b.push(Edge {
                        from,
                        to,
                        kind: EdgeKind::Implicit {
                            net: n,
                            hazard: Hazard::WriteAfterWrite,
                        },
                    });
                }
            }
        }

        Ok(b.finish())
    }

    /// Number of actions (nodes).
    pub fn node_count(&self) -> usize {
        self.succ.len()
    }

    /// Every edge with provenance, sorted by `(from, to)`.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Distinct successors of `action`, ascending.
    pub fn successors(&self, action: ActionId) -> &[ActionId] {
        self.succ
            .get(action.index())
            .map(|s| s.as_slice())
            .unwrap_or(&[])
    }

    /// All edges from `from` to `to`.
    pub fn edges_between(&self, from: ActionId, to: ActionId) -> impl Iterator<Item = &Edge> {
        let start = self.edges.partition_point(|e| (e.from, e.to) < (from, to));
        self.edges[start..]
            .iter()
            .take_while(move |e| e.from == from && e.to == to)
    }

    /// Whether at least one edge `from -> to` exists.
    pub fn has_edge(&self, from: ActionId, to: ActionId) -> bool {
        self.successors(from).binary_search(&to).is_ok()
    }

    /// Whether a non-empty path leads from `from` to `to`.
    pub fn reachable(&self, from: ActionId, to: ActionId) -> bool {
        reaches(&self.succ, from, to)
    }

    /// Number of distinct predecessors of each action.
    pub fn in_degrees(&self) -> Vec<usize> {
        let mut deg = vec![0; self.succ.len()];
        for s in &self.succ {
            for t in s {
                deg[t.index()] += 1;
            }
        }
        deg
    }
}

struct Builder {
    edges: IndexSet<Edge>,
    succ: Vec<Successors>,
}

impl Builder {
    fn new(n: usize) -> Self {
        Self {
            edges: IndexSet::new(),
            succ: vec![Successors::new(); n],
        }
    }

    fn push(&mut self, edge: Edge) {
        if self.edges.insert(edge) {
            trace!(from = %edge.from, to = %edge.to, kind = ?edge.kind, "edge");
            let s = &mut self.succ[edge.from.index()];
            if !s.contains(&edge.to) {
                s.push(edge.to);
            }
        }
    }

    fn reaches(&self, from: ActionId, to: ActionId) -> bool {
        reaches(&self.succ, from, to)
    }

    fn finish(self) -> DependencyGraph {
        let mut edges: Vec<Edge> = self.edges.into_iter().collect();
        // Stable: reasons for one pair keep insertion order.
        edges.sort_by_key(|e| (e.from, e.to));
        let mut succ = self.succ;
        for s in &mut succ {
            s.sort_unstable();
        }
        DependencyGraph { edges, succ }
    }
}

fn reaches(succ: &[Successors], from: ActionId, to: ActionId) -> bool {
    let Some(first) = succ.get(from.index()) else {
        return false;
    };
    let mut seen = vec![false; succ.len()];
    let mut queue: VecDeque<ActionId> = first.iter().copied().collect();
    while let Some(v) = queue.pop_front() {
        if v == to {
            return true;
        }
        if std::mem::replace(&mut seen[v.index()], true) {
            continue;
        }
        queue.extend(succ[v.index()].iter().copied());
    }
    false
}

fn ids_where(footprints: &[Footprint], pred: impl Fn(&Footprint) -> bool) -> Vec<ActionId> {
    footprints
        .iter()
        .enumerate()
        .filter(|(_, fp)| pred(fp))
        .map(|(i, _)| ActionId(i as u32))
        .collect()
}

fn driver_conflict(
    net: NetId,
    writers: &[ActionId],
    decls: &[ActionDecl],
    nets: &NetModel,
) -> ScheduleError {
    ScheduleError::DriverConflict {
        net,
        net_name: nets.net(net).map(|n| n.name.clone()).unwrap_or_default(),
        writers: writers
            .iter()
            .map(|w| decls[w.index()].name.clone())
            .collect(),
    }
}
