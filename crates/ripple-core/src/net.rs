//! Signals, nets, and the frozen [`NetModel`] snapshot.
//!
//! Elaboration registers signals and the connections between them; the
//! [`NetModelBuilder`] collapses connected signals into nets with a
//! union-find pass. The resulting [`NetModel`] is immutable and is what
//! the scheduler and tick executor see.

use indexmap::IndexMap;

use crate::error::ElaborationError;
use crate::id::{NetId, SignalId, MAX_WIDTH};
use crate::net_set::NetSet;

/// An addressable storage location declared by the design.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Signal {
    /// Unique id, the signal's registration index.
    pub id: SignalId,
    /// Hierarchical name, e.g. `"top.alu.out"`.
    pub name: String,
    /// Declared bit-width, `1..=64`.
    pub width: u32,
    /// The net this signal belongs to.
    pub net: NetId,
}

/// An equivalence class of connected signals sharing one value per tick.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Net {
    /// The net's id.
    pub id: NetId,
    /// Name of the lowest-id member signal.
    pub name: String,
    /// Bit-width shared by every member signal.
    pub width: u32,
    /// Member signals in ascending id order.
    pub signals: Vec<SignalId>,
}

/// Frozen view of signals and nets after elaboration.
#[derive(Clone, Debug, Default)]
pub struct NetModel {
    signals: Vec<Signal>,
    nets: Vec<Net>,
    by_signal_name: IndexMap<String, SignalId>,
}

impl NetModel {
    /// All nets in id order.
    pub fn nets(&self) -> &[Net] {
        &self.nets
    }

    /// All signals in id order.
    pub fn signals(&self) -> &[Signal] {
        &self.signals
    }

    /// Number of nets.
    pub fn net_count(&self) -> usize {
        self.nets.len()
    }

    /// Look up a net by id.
    pub fn net(&self, id: NetId) -> Option<&Net> {
        self.nets.get(id.0 as usize)
    }

    /// Whether `id` names a net of this model.
    pub fn contains(&self, id: NetId) -> bool {
        (id.0 as usize) < self.nets.len()
    }

    /// Look up a signal by id.
    pub fn signal(&self, id: SignalId) -> Option<&Signal> {
        self.signals.get(id.0 as usize)
    }

    /// The net a signal belongs to.
    pub fn net_of(&self, signal: SignalId) -> Option<NetId> {
        self.signal(signal).map(|s| s.net)
    }

    /// Signals collapsed into `net`, in ascending id order.
    pub fn connectivity(&self, net: NetId) -> Option<&[SignalId]> {
        self.net(net).map(|n| n.signals.as_slice())
    }

    /// Look up a signal by its name.
    pub fn signal_by_name(&self, name: &str) -> Option<SignalId> {
        self.by_signal_name.get(name).copied()
    }

    /// Look up the net that owns the signal called `name`.
    pub fn net_by_name(&self, name: &str) -> Option<NetId> {
        self.signal_by_name(name).and_then(|s| self.net_of(s))
    }

    /// The set of every net in the model.
    pub fn all_nets(&self) -> NetSet {
        NetSet::all(self.nets.len() as u32)
    }

    /// Map a set of signals onto the set of nets that own them.
    ///
    /// Fails with [`ElaborationError::UnknownSignal`] on the first signal
    /// that does not exist.
    pub fn nets_of<I>(&self, signals: I) -> Result<NetSet, ElaborationError>
    where
        I: IntoIterator<Item = SignalId>,
    {
        signals
            .into_iter()
            .map(|s| {
                self.net_of(s)
                    .ok_or(ElaborationError::UnknownSignal { signal: s })
            })
            .collect()
    }
}

/// Incremental builder for a [`NetModel`].
///
/// ```
/// use ripple_core::NetModelBuilder;
///
/// let mut b = NetModelBuilder::new();
/// let out = b.add_signal("adder.out", 8);
/// let inp = b.add_signal("reg.in", 8);
/// b.connect(out, inp).unwrap();
/// let model = b.build().unwrap();
/// assert_eq!(model.net_count(), 1);
/// assert_eq!(model.net_of(out), model.net_of(inp));
/// ```
#[derive(Debug, Default)]
pub struct NetModelBuilder {
    names: Vec<String>,
    widths: Vec<u32>,
    parent: Vec<u32>,
}

impl NetModelBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a signal and return its id.
    ///
    /// Widths are checked in [`build`](Self::build) so that every error is
    /// reported from one place.
    pub fn add_signal(&mut self, name: impl Into<String>, width: u32) -> SignalId {
        let id = self.names.len() as u32;
        self.names.push(name.into());
        self.widths.push(width);
        self.parent.push(id);
        SignalId(id)
    }

    /// Connect two signals so they share a net.
    pub fn connect(&mut self, a: SignalId, b: SignalId) -> Result<(), ElaborationError> {
        for s in [a, b] {
            if s.0 as usize >= self.parent.len() {
                return Err(ElaborationError::UnknownSignal { signal: s });
            }
        }
        let ra = self.find(a.0);
        let rb = self.find(b.0);
        if ra != rb {
            // Lower id becomes the root so the representative is stable.
            let (lo, hi) = if ra < rb { (ra, rb) } else { (rb, ra) };
            self.parent[hi as usize] = lo;
        }
        Ok(())
    }

    fn find(&mut self, mut x: u32) -> u32 {
        while self.parent[x as usize] != x {
            let grand = self.parent[self.parent[x as usize] as usize];
            self.parent[x as usize] = grand;
            x = grand;
        }
        x
    }

    /// Freeze the builder into a [`NetModel`].
    ///
    /// Nets are numbered in order of their lowest member signal.
    pub fn build(mut self) -> Result<NetModel, ElaborationError> {
        let mut by_signal_name = IndexMap::with_capacity(self.names.len());
        for (i, name) in self.names.iter().enumerate() {
            let width = self.widths[i];
            if width == 0 || width > MAX_WIDTH {
                return Err(ElaborationError::InvalidWidth {
                    signal: name.clone(),
                    width,
                });
            }
            if by_signal_name
                .insert(name.clone(), SignalId(i as u32))
                .is_some()
            {
                return Err(ElaborationError::DuplicateSignal { name: name.clone() });
            }
        }

        let mut root_to_net: IndexMap<u32, NetId> = IndexMap::new();
        let mut nets: Vec<Net> = Vec::new();
        let mut signals = Vec::with_capacity(self.names.len());

        for i in 0..self.names.len() as u32 {
            let root = self.find(i);
            let width = self.widths[i as usize];
            let net_id = *root_to_net.entry(root).or_insert_with(|| {
                let id = NetId(nets.len() as u32);
                nets.push(Net {
                    id,
                    name: self.names[i as usize].clone(),
                    width,
                    signals: Vec::new(),
                });
                id
            });
            let net = &mut nets[net_id.0 as usize];
            if net.width != width {
                return Err(ElaborationError::WidthMismatch {
                    net: net.name.clone(),
                    expected: net.width,
                    signal: self.names[i as usize].clone(),
                    found: width,
                });
            }
            net.signals.push(SignalId(i));
            signals.push(Signal {
                id: SignalId(i),
                name: self.names[i as usize].clone(),
                width,
                net: net_id,
            });
        }

        Ok(NetModel {
            signals,
            nets,
            by_signal_name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unconnected_signals_get_their_own_nets() {
        let mut b = NetModelBuilder::new();
        let a = b.add_signal("a", 1);
        let c = b.add_signal("c", 4);
        let m = b.build().unwrap();
        assert_eq!(m.net_count(), 2);
        assert_eq!(m.net_of(a), Some(NetId(0)));
        assert_eq!(m.net_of(c), Some(NetId(1)));
        assert_eq!(m.net(NetId(1)).unwrap().width, 4);
    }

    #[test]
    fn transitive_connections_collapse_into_one_net() {
        let mut b = NetModelBuilder::new();
        let x = b.add_signal("x", 8);
        let lone = b.add_signal("lone", 8);
        let y = b.add_signal("y", 8);
        let z = b.add_signal("z", 8);
        b.connect(z, y).unwrap();
        b.connect(y, x).unwrap();
        let m = b.build().unwrap();

        assert_eq!(m.net_count(), 2);
        let net = m.net_of(z).unwrap();
        assert_eq!(net, NetId(0));
        assert_eq!(m.connectivity(net).unwrap(), &[x, y, z]);
        assert_eq!(m.net(net).unwrap().name, "x");
        assert_eq!(m.net_of(lone), Some(NetId(1)));
        assert_eq!(m.net_by_name("z"), Some(NetId(0)));
    }

    #[test]
    fn width_mismatch_rejected() {
        let mut b = NetModelBuilder::new();
        let a = b.add_signal("a", 8);
        let c = b.add_signal("c", 16);
        b.connect(a, c).unwrap();
        match b.build() {
            Err(ElaborationError::WidthMismatch {
                net,
                expected,
                signal,
                found,
            }) => {
                assert_eq!(net, "a");
                assert_eq!(expected, 8);
                assert_eq!(signal, "c");
                assert_eq!(found, 16);
            }
            other => panic!("expected WidthMismatch, got {other:?}"),
        }
    }

    #[test]
    fn zero_and_oversized_widths_rejected() {
        let mut b = NetModelBuilder::new();
        b.add_signal("w0", 0);
        assert!(matches!(
            b.build(),
            Err(ElaborationError::InvalidWidth { width: 0, .. })
        ));

        let mut b = NetModelBuilder::new();
        b.add_signal("w65", 65);
        assert!(matches!(
            b.build(),
            Err(ElaborationError::InvalidWidth { width: 65, .. })
        ));
    }

    #[test]
    fn duplicate_names_rejected() {
        let mut b = NetModelBuilder::new();
        b.add_signal("dup", 1);
        b.add_signal("dup", 1);
        assert!(matches!(
            b.build(),
            Err(ElaborationError::DuplicateSignal { .. })
        ));
    }

    #[test]
    fn connect_unknown_signal_rejected() {
        let mut b = NetModelBuilder::new();
        let a = b.add_signal("a", 1);
        assert_eq!(
            b.connect(a, SignalId(9)),
            Err(ElaborationError::UnknownSignal {
                signal: SignalId(9)
            })
        );
    }

    #[test]
    fn nets_of_maps_signals() {
        let mut b = NetModelBuilder::new();
        let a = b.add_signal("a", 1);
        let c = b.add_signal("c", 1);
        let d = b.add_signal("d", 1);
        b.connect(a, d).unwrap();
        let m = b.build().unwrap();
        let set = m.nets_of([a, c, d]).unwrap();
        assert_eq!(set, [NetId(0), NetId(1)].into_iter().collect());
        assert!(m.nets_of([SignalId(42)]).is_err());
    }
}
