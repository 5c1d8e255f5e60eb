//! Read/write footprints and the oracle that supplies them.
//!
//! The scheduler treats footprints as an interface contract: some external
//! analyzer (source inspection, manual annotation, an IR scan) fills a
//! [`FootprintOracle`], and the scheduler trusts it without re-deriving
//! anything.

use indexmap::IndexMap;
use ripple_core::{ActionId, ElaborationError, NetId, NetModel, NetSet, SignalId};

/// The sets of nets an action may read and write.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Footprint {
    /// Nets the action reads.
    pub reads: NetSet,
    /// Nets the action writes.
    pub writes: NetSet,
}

impl Footprint {
    /// Build a footprint from explicit read and write net lists.
    pub fn new<R, W>(reads: R, writes: W) -> Self
    where
        R: IntoIterator<Item = NetId>,
        W: IntoIterator<Item = NetId>,
    {
        Self {
            reads: reads.into_iter().collect(),
            writes: writes.into_iter().collect(),
        }
    }

    /// Build a footprint from signal references, normalizing them to the
    /// nets that own them.
    pub fn from_signals<R, W>(model: &NetModel, reads: R, writes: W) -> Result<Self, ElaborationError>
    where
        R: IntoIterator<Item = SignalId>,
        W: IntoIterator<Item = SignalId>,
    {
        Ok(Self {
            reads: model.nets_of(reads)?,
            writes: model.nets_of(writes)?,
        })
    }

    /// Whether the action touches `net` at all.
    pub fn touches(&self, net: NetId) -> bool {
        self.reads.contains(net) || self.writes.contains(net)
    }

    /// Whether this footprint and `other` share no net.
    pub fn is_disjoint(&self, other: &Self) -> bool {
        let mine = self.reads.union(&self.writes);
        let theirs = other.reads.union(&other.writes);
        mine.is_disjoint(&theirs)
    }
}

/// Source of per-action footprints.
///
/// Assumed total and correct for every registered action.
pub trait FootprintOracle {
    /// The footprint of `action`, or `None` if the analyzer has no entry.
    fn footprint(&self, action: ActionId) -> Option<Footprint>;
}

/// A pre-computed footprint table keyed by action id.
#[derive(Clone, Debug, Default)]
pub struct FootprintTable {
    entries: IndexMap<ActionId, Footprint>,
}

impl FootprintTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the footprint for `action`, replacing any previous entry.
    pub fn insert(&mut self, action: ActionId, footprint: Footprint) {
        self.entries.insert(action, footprint);
    }

    /// Remove the entry for `action`.
    pub fn remove(&mut self, action: ActionId) -> Option<Footprint> {
        self.entries.shift_remove(&action)
    }

    /// Borrow the footprint for `action`.
    pub fn get(&self, action: ActionId) -> Option<&Footprint> {
        self.entries.get(&action)
    }

    /// Number of recorded footprints.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FootprintOracle for FootprintTable {
    fn footprint(&self, action: ActionId) -> Option<Footprint> {
        self.entries.get(&action).cloned()
    }
}

impl FromIterator<(ActionId, Footprint)> for FootprintTable {
    fn from_iter<I: IntoIterator<Item = (ActionId, Footprint)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Footprints in declaration order: entry `i` belongs to `ActionId(i)`.
impl FootprintOracle for [Footprint] {
    fn footprint(&self, action: ActionId) -> Option<Footprint> {
        self.get(action.index()).cloned()
    }
}

impl FootprintOracle for Vec<Footprint> {
    fn footprint(&self, action: ActionId) -> Option<Footprint> {
        self.as_slice().footprint(action)
    }
}
