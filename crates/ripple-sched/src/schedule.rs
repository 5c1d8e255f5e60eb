//! Static schedule construction and caching.
//!
//! [`build_schedule`] runs the whole pipeline once:
//!
//! 1. Validate declarations and fetch footprints from the oracle.
//! 2. Collect explicit constraints into action edges.
//! 3. Build the [`DependencyGraph`] (implicit hazards, driver checks).
//! 4. Reject combinational loops (SCCs over combinational-only edges).
//! 5. Order the actions with Kahn's algorithm under a [`TieBreak`].
//!
//! [`Scheduler`] wraps this with a fingerprint-keyed cache so an unchanged
//! design is never rescheduled.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, VecDeque};
use std::sync::Arc;

use indexmap::IndexSet;
use ripple_core::{ActionId, NetId, NetModel};
use tracing::{debug, info, warn};

use crate::action::{ActionDecl, ActionKind};
use crate::constraint::{collect_constraints, ExplicitEdge, RawConstraint};
use crate::error::ScheduleError;
use crate::fingerprint::{seeded_key, structural_fingerprint};
use crate::footprint::{Footprint, FootprintOracle};
use crate::graph::{DependencyGraph, Edge, EdgeKind};

/// How Kahn's algorithm picks among simultaneously ready actions.
///
/// Both policies are fully deterministic.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TieBreak {
    /// Lowest declaration index first.
    #[default]
    DeclarationOrder,
    /// A seeded pseudo-random priority per action, ties broken by index.
    ///
    /// Useful for flushing out designs that silently depend on the
    /// declaration order of unconstrained actions.
    Seeded(u64),
}

impl TieBreak {
    fn key(self, action: ActionId) -> u64 {
        match self {
            Self::DeclarationOrder => 0,
            Self::Seeded(seed) => seeded_key(seed, action.0),
        }
    }
}

/// A fixed total order over every action of a design.
///
/// Immutable once built; replayed by the tick executor every tick.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Schedule {
    order: Vec<ActionId>,
    position: Vec<usize>,
    decls: Vec<ActionDecl>,
    footprints: Vec<Footprint>,
    graph: DependencyGraph,
    levels: Vec<Vec<ActionId>>,
    tie_break: TieBreak,
    fingerprint: u64,
}

impl Schedule {
    /// Actions in execution order.
    pub fn order(&self) -> &[ActionId] {
        &self.order
    }

    /// Number of scheduled actions.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether the schedule is empty.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Position of `action` in the execution order.
    pub fn position(&self, action: ActionId) -> Option<usize> {
        self.position.get(action.index()).copied()
    }

    /// Whether `a` executes strictly before `b`.
    pub fn precedes(&self, a: ActionId, b: ActionId) -> bool {
        match (self.position(a), self.position(b)) {
            (Some(pa), Some(pb)) => pa < pb,
            _ => false,
        }
    }

    /// Action names in execution order.
    pub fn names(&self) -> Vec<&str> {
        self.order
            .iter()
            .map(|a| self.decls[a.index()].name.as_str())
            .collect()
    }

    /// Declaration of `action`.
    pub fn decl(&self, action: ActionId) -> Option<&ActionDecl> {
        self.decls.get(action.index())
    }

    /// Kind of `action`.
    pub fn kind(&self, action: ActionId) -> Option<ActionKind> {
        self.decl(action).map(|d| d.kind)
    }

    /// Footprint of `action`.
    pub fn footprint(&self, action: ActionId) -> Option<&Footprint> {
        self.footprints.get(action.index())
    }

    /// The merged dependency graph.
    pub fn graph(&self) -> &DependencyGraph {
        &self.graph
    }

    /// Every edge with provenance.
    pub fn edges(&self) -> &[Edge] {
        self.graph.edges()
    }

    /// Longest-path layering of the graph.
    ///
    /// Level `k` holds the actions whose longest chain of predecessors has
    /// length `k`, in schedule order. No path connects two actions of the
    /// same level, so a concurrent executor may run a level in parallel.
    pub fn levels(&self) -> &[Vec<ActionId>] {
        &self.levels
    }

    /// The tie-break policy this schedule was built with.
    pub fn tie_break(&self) -> TieBreak {
        self.tie_break
    }

    /// Structural fingerprint of the inputs.
    pub fn fingerprint(&self) -> u64 {
        self.fingerprint
    }
}

/// Validated scheduler inputs, ready to be ordered.
struct Prepared {
    decls: Vec<ActionDecl>,
    footprints: Vec<Footprint>,
    explicit: Vec<ExplicitEdge>,
    tie_break: TieBreak,
    fingerprint: u64,
}

fn prepare<O>(
    decls: &[ActionDecl],
    constraints: &[RawConstraint],
    oracle: &O,
    nets: &NetModel,
    tie_break: TieBreak,
) -> Result<Prepared, ScheduleError>
where
    O: FootprintOracle + ?Sized,
{
    let mut names = IndexSet::with_capacity(decls.len());
    for d in decls {
        if !names.insert(d.name.as_str()) {
            return Err(ScheduleError::DuplicateAction {
                name: d.name.clone(),
            });
        }
    }

    let mut footprints = Vec::with_capacity(decls.len());
    for (i, d) in decls.iter().enumerate() {
        let fp = oracle
            .footprint(ActionId(i as u32))
            .ok_or_else(|| ScheduleError::MissingFootprint {
                action: d.name.clone(),
            })?;
        let unknown = fp.reads.iter().chain(fp.writes.iter()).find(|n| !nets.contains(*n));
        if let Some(net) = unknown {
            return Err(ScheduleError::UnknownFootprintNet {
                action: d.name.clone(),
                net,
            });
        }
        footprints.push(fp);
    }

    let explicit = collect_constraints(constraints, &footprints, nets)?;
    let fingerprint = structural_fingerprint(decls, &footprints, &explicit, tie_break);
    Ok(Prepared {
        decls: decls.to_vec(),
        footprints,
        explicit,
        tie_break,
        fingerprint,
    })
}

impl Prepared {
    fn build(self, nets: &NetModel) -> Result<Schedule, ScheduleError> {
        let graph = DependencyGraph::build(&self.decls, &self.footprints, &self.explicit, nets)?;
        check_combinational_loops(&graph, &self.decls)?;
        let order = topological_order(&graph, &self.decls, self.tie_break)?;

        let mut position = vec![0; order.len()];
        for (pos, a) in order.iter().enumerate() {
            position[a.index()] = pos;
        }
        let levels = layer(&graph, &order);

        Ok(Schedule {
            order,
            position,
            decls: self.decls,
            footprints: self.footprints,
            graph,
            levels,
            tie_break: self.tie_break,
            fingerprint: self.fingerprint,
        })
    }
}

/// Build a schedule from scratch.
///
/// `decls` are the registered actions in declaration order (see
/// [`ActionRegistry::decls`](crate::ActionRegistry::decls)); `oracle`
/// supplies each one's footprint. Every failure is fatal: no partial
/// schedule is ever returned.
pub fn build_schedule<O>(
    decls: &[ActionDecl],
    constraints: &[RawConstraint],
    oracle: &O,
    nets: &NetModel,
    tie_break: TieBreak,
) -> Result<Schedule, ScheduleError>
where
    O: FootprintOracle + ?Sized,
{
    prepare(decls, constraints, oracle, nets, tie_break)?.build(nets)
}

// ── Loop detection ──────────────────────────────────────────────

type Adjacency = Vec<Vec<usize>>;

fn check_combinational_loops(
    graph: &DependencyGraph,
    decls: &[ActionDecl],
) -> Result<(), ScheduleError> {
    let is_comb = |a: ActionId| decls[a.index()].kind == ActionKind::Combinational;
    let adj: Adjacency = (0..graph.node_count())
        .map(|i| {
            let a = ActionId(i as u32);
            if !is_comb(a) {
                return Vec::new();
            }
            graph
                .successors(a)
                .iter()
                .filter(|s| is_comb(**s))
                .map(|s| s.index())
                .collect()
        })
        .collect();

    let Some(comp) = first_cycle(&adj) else {
        return Ok(());
    };
    let path = cycle_path(&comp, &adj);
    let mut nets: Vec<NetId> = Vec::new();
    for (i, &u) in path.iter().enumerate() {
        let v = path[(i + 1) % path.len()];
        for e in graph.edges_between(ActionId(u as u32), ActionId(v as u32)) {
            if let EdgeKind::Implicit { net, .. } = e.kind {
                if !nets.contains(&net) {
                    nets.push(net);
                }
            }
        }
    }
    Err(ScheduleError::CombinationalLoop {
        cycle: names_of(&comp, decls),
        path: names_of(&path, decls),
        nets,
    })
}

/// The first strongly connected component (by lowest member) that is
/// cyclic: more than one member, or a single member with a self-loop.
fn first_cycle(adj: &Adjacency) -> Option<Vec<usize>> {
    strongly_connected(adj)
        .into_iter()
        .find(|c| c.len() > 1 || adj[c[0]].contains(&c[0]))
}

/// Iterative Tarjan. Components come back sorted by their lowest member,
/// each with members ascending.
fn strongly_connected(adj: &Adjacency) -> Vec<Vec<usize>> {
    const UNVISITED: usize = usize::MAX;
    let n = adj.len();
    let mut index = vec![UNVISITED; n];
    let mut low = vec![0; n];
    let mut on_stack = vec![false; n];
    let mut stack: Vec<usize> = Vec::new();
    let mut frames: Vec<(usize, usize)> = Vec::new();
    let mut next = 0;
    let mut comps = Vec::new();

    for root in 0..n {
        if index[root] != UNVISITED {
            continue;
        }
        index[root] = next;
        low[root] = next;
        next += 1;
        stack.push(root);
        on_stack[root] = true;
        frames.push((root, 0));

        while let Some(&(v, child)) = frames.last() {
            if let Some(&w) = adj[v].get(child) {
                if let Some(top) = frames.last_mut() {
                    top.1 += 1;
                }
                if index[w] == UNVISITED {
                    index[w] = next;
                    low[w] = next;
                    next += 1;
                    stack.push(w);
                    on_stack[w] = true;
                    frames.push((w, 0));
                } else if on_stack[w] {
                    low[v] = low[v].min(index[w]);
                }
                continue;
            }

            frames.pop();
            if let Some(&(parent, _)) = frames.last() {
                low[parent] = low[parent].min(low[v]);
            }
            if low[v] == index[v] {
                let mut comp = Vec::new();
                while let Some(w) = stack.pop() {
                    on_stack[w] = false;
                    comp.push(w);
                    if w == v {
                        break;
                    }
                }
                comp.sort_unstable();
                comps.push(comp);
            }
        }
    }

    comps.sort_by_key(|c| c[0]);
    comps
}

/// A shortest cycle through the component's lowest member, found by BFS
/// restricted to the component.
fn cycle_path(comp: &[usize], adj: &Adjacency) -> Vec<usize> {
    let start = comp[0];
    if adj[start].contains(&start) {
        return vec![start];
    }
    let mut parent = vec![usize::MAX; adj.len()];
    let mut queue = VecDeque::from([start]);
    parent[start] = start;
    while let Some(u) = queue.pop_front() {
        for &w in &adj[u] {
            if w == start {
                let mut path = vec![u];
                let mut cur = u;
                while cur != start {
                    cur = parent[cur];
                    path.push(cur);
                }
                path.reverse();
                return path;
            }
            if parent[w] == usize::MAX && comp.binary_search(&w).is_ok() {
                parent[w] = u;
                queue.push_back(w);
            }
        }
    }
    comp.to_vec()
}

fn names_of(ids: &[usize], decls: &[ActionDecl]) -> Vec<String> {
    ids.iter().map(|&i| decls[i].name.clone()).collect()
}

// ── Ordering ────────────────────────────────────────────────────

fn topological_order(
    graph: &DependencyGraph,
    decls: &[ActionDecl],
    tie_break: TieBreak,
) -> Result<Vec<ActionId>, ScheduleError> {
    let n = graph.node_count();
    let mut in_degree = graph.in_degrees();
    let mut ready: BinaryHeap<Reverse<(u64, ActionId)>> = BinaryHeap::new();
    for (i, &d) in in_degree.iter().enumerate() {
        if d == 0 {
            let a = ActionId(i as u32);
            ready.push(Reverse((tie_break.key(a), a)));
        }
    }

    let mut order = Vec::with_capacity(n);
    while let Some(Reverse((_, a))) = ready.pop() {
        order.push(a);
        for &s in graph.successors(a) {
            in_degree[s.index()] -= 1;
            if in_degree[s.index()] == 0 {
                ready.push(Reverse((tie_break.key(s), s)));
            }
        }
    }

    if order.len() == n {
        return Ok(order);
    }

    // Stalled: what is left contains a cycle through non-combinational
    // actions (combinational ones were rejected earlier).
    let mut placed = vec![false; n];
    for a in &order {
        placed[a.index()] = true;
    }
    let adj: Adjacency = (0..n)
        .map(|i| {
            if placed[i] {
                return Vec::new();
            }
            graph
                .successors(ActionId(i as u32))
                .iter()
                .map(|s| s.index())
                .filter(|&s| !placed[s])
                .collect()
        })
        .collect();
    let (cycle, path) = match first_cycle(&adj) {
        Some(comp) => {
            let path = cycle_path(&comp, &adj);
            (comp, path)
        }
        None => {
            let rest: Vec<usize> = (0..n).filter(|&i| !placed[i]).collect();
            (rest.clone(), rest)
        }
    };
    Err(ScheduleError::ConstraintCycle {
        cycle: names_of(&cycle, decls),
        path: names_of(&path, decls),
    })
}

fn layer(graph: &DependencyGraph, order: &[ActionId]) -> Vec<Vec<ActionId>> {
    let mut depth = vec![0usize; graph.node_count()];
    let mut levels: Vec<Vec<ActionId>> = Vec::new();
    for &a in order {
        let d = depth[a.index()];
        if levels.len() <= d {
            levels.resize_with(d + 1, Vec::new);
        }
        levels[d].push(a);
        for &s in graph.successors(a) {
            depth[s.index()] = depth[s.index()].max(d + 1);
        }
    }
    levels
}

// ── Cache ───────────────────────────────────────────────────────

/// Counters describing how a [`Scheduler`] has been used.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SchedulerStats {
    /// Schedules built from scratch.
    pub builds: u64,
    /// Requests served from the cache.
    pub cache_hits: u64,
    /// Cached schedules discarded because the design changed or
    /// [`Scheduler::invalidate`] was called.
    pub invalidations: u64,
    /// Failed scheduling attempts.
    pub failures: u64,
}

/// Fingerprint-keyed schedule cache.
///
/// Holds at most one schedule. A request whose structural fingerprint
/// matches the cached one is answered without rebuilding; anything else
/// rebuilds and replaces the cache. A failed build clears it.
#[derive(Debug, Default)]
pub struct Scheduler {
    tie_break: TieBreak,
    cached: Option<Arc<Schedule>>,
    stats: SchedulerStats,
}

impl Scheduler {
    /// Create a scheduler with an empty cache.
    pub fn new(tie_break: TieBreak) -> Self {
        Self {
            tie_break,
            cached: None,
            stats: SchedulerStats::default(),
        }
    }

    /// Current tie-break policy.
    pub fn tie_break(&self) -> TieBreak {
        self.tie_break
    }

    /// Change the tie-break policy. The next request rebuilds, since the
    /// policy is part of the fingerprint.
    pub fn set_tie_break(&mut self, tie_break: TieBreak) {
        self.tie_break = tie_break;
    }

    /// Return the schedule for this design, building it if the cache is
    /// empty or stale.
    pub fn schedule<O>(
        &mut self,
        decls: &[ActionDecl],
        constraints: &[RawConstraint],
        oracle: &O,
        nets: &NetModel,
    ) -> Result<Arc<Schedule>, ScheduleError>
    where
        O: FootprintOracle + ?Sized,
    {
        let prepared = match prepare(decls, constraints, oracle, nets, self.tie_break) {
            Ok(p) => p,
            Err(e) => return Err(self.fail(e)),
        };

        if let Some(cached) = &self.cached {
            if cached.fingerprint == prepared.fingerprint {
                self.stats.cache_hits += 1;
                debug!(fingerprint = cached.fingerprint, "schedule cache hit");
                return Ok(Arc::clone(cached));
            }
            info!(
                old = cached.fingerprint,
                new = prepared.fingerprint,
                "design changed, rebuilding schedule"
            );
            self.stats.invalidations += 1;
            self.cached = None;
        }

        debug!(
            actions = decls.len(),
            constraints = constraints.len(),
            "building schedule"
        );
        match prepared.build(nets) {
            Ok(schedule) => {
                info!(
                    actions = schedule.len(),
                    edges = schedule.edges().len(),
                    levels = schedule.levels().len(),
                    fingerprint = schedule.fingerprint,
                    "schedule built"
                );
                self.stats.builds += 1;
                let schedule = Arc::new(schedule);
                self.cached = Some(Arc::clone(&schedule));
                Ok(schedule)
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// The cached schedule, if any.
    pub fn cached(&self) -> Option<&Arc<Schedule>> {
        self.cached.as_ref()
    }

    /// Drop the cached schedule so the next request rebuilds.
    pub fn invalidate(&mut self) {
        if self.cached.take().is_some() {
            self.stats.invalidations += 1;
            info!("schedule invalidated");
        }
    }

    /// Usage counters.
    pub fn stats(&self) -> SchedulerStats {
        self.stats
    }

    fn fail(&mut self, e: ScheduleError) -> ScheduleError {
        warn!(error = %e, "scheduling failed");
        self.stats.failures += 1;
        self.cached = None;
        e
    }
}
