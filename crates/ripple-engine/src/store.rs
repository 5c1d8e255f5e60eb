//! Net-value storage: one masked [`Value`] slot per net.

use std::fmt::Write as _;

use ripple_core::{mask_to_width, NetId, NetModel, NetReader, NetWriter, Value};

/// The live value of every net.
///
/// Slot `n` holds the value of `NetId(n)`. Writes are masked to the net's
/// declared width, so a 4-bit net written with `0x1f` reads back `0xf`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NetStore {
    values: Vec<Value>,
    widths: Vec<u32>,
    names: Vec<String>,
}

impl NetStore {
    /// A zero-initialized store shaped after `model`.
    pub fn new(model: &NetModel) -> Self {
        Self {
            values: vec![0; model.net_count()],
            widths: model.nets().iter().map(|n| n.width).collect(),
            names: model.nets().iter().map(|n| n.name.clone()).collect(),
        }
    }

    /// Number of nets.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the store holds no nets.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Current value of `net`.
    pub fn get(&self, net: NetId) -> Option<Value> {
        self.values.get(net.0 as usize).copied()
    }

    /// Set `net`, masking to its width. Returns `false` for an unknown net.
    pub fn set(&mut self, net: NetId, value: Value) -> bool {
        let i = net.0 as usize;
        match (self.values.get_mut(i), self.widths.get(i)) {
            (Some(slot), Some(&width)) => {
                *slot = mask_to_width(value, width);
                true
            }
            _ => false,
        }
    }

    /// Declared width of `net`.
    pub fn width(&self, net: NetId) -> Option<u32> {
        self.widths.get(net.0 as usize).copied()
    }

    /// Name of `net`.
    pub fn name(&self, net: NetId) -> Option<&str> {
        self.names.get(net.0 as usize).map(String::as_str)
    }

    /// All values in net-id order.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Zero every net.
    pub fn clear(&mut self) {
        self.values.fill(0);
    }

    /// Copy the current values into `snapshot`, reusing its allocation.
    pub fn snapshot_into(&self, snapshot: &mut NetSnapshot) {
        snapshot.values.clear();
        snapshot.values.extend_from_slice(&self.values);
    }

    /// A fresh snapshot of the current values.
    pub fn snapshot(&self) -> NetSnapshot {
        NetSnapshot {
            values: self.values.clone(),
        }
    }

    /// Overwrite every value from `snapshot`.
    ///
    /// A snapshot taken from a differently shaped store restores only the
    /// overlapping prefix.
    pub fn restore(&mut self, snapshot: &NetSnapshot) {
        let n = self.values.len().min(snapshot.values.len());
        self.values[..n].copy_from_slice(&snapshot.values[..n]);
    }

    /// Human-readable dump: `name=0xVALUE` pairs in net-id order,
    /// separated by single spaces.
    pub fn line_trace(&self) -> String {
        let mut out = String::new();
        for (i, (name, value)) in self.names.iter().zip(&self.values).enumerate() {
            if i > 0 {
                out.push(' ');
            }
            let _ = write!(out, "{name}={value:#x}");
        }
        out
    }
}

impl NetReader for NetStore {
    fn read(&self, net: NetId) -> Option<Value> {
        self.get(net)
    }
}

impl NetWriter for NetStore {
    fn write(&mut self, net: NetId, value: Value) -> bool {
        self.set(net, value)
    }
}

/// A frozen copy of every net value, taken at tick start.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NetSnapshot {
    values: Vec<Value>,
}

impl NetSnapshot {
    /// Values in net-id order.
    pub fn values(&self) -> &[Value] {
        &self.values
    }
}

impl NetReader for NetSnapshot {
    fn read(&self, net: NetId) -> Option<Value> {
        self.values.get(net.0 as usize).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ripple_core::NetModelBuilder;

    fn store() -> NetStore {
        let mut b = NetModelBuilder::new();
        b.add_signal("data", 4);
        b.add_signal("valid", 1);
        b.add_signal("wide", 64);
        NetStore::new(&b.build().unwrap())
    }

    #[test]
    fn writes_mask_to_width() {
        let mut s = store();
        assert!(s.set(NetId(0), 0x1f));
        assert!(s.set(NetId(1), 2));
        assert!(s.set(NetId(2), u64::MAX));
        assert_eq!(s.values(), &[0xf, 0, u64::MAX]);
        assert!(!s.set(NetId(3), 1));
        assert_eq!(s.get(NetId(3)), None);
    }

    #[test]
    fn snapshot_restore_round_trip() {
        let mut s = store();
        s.set(NetId(0), 3);
        let snap = s.snapshot();
        s.set(NetId(0), 9);
        s.set(NetId(1), 1);
        assert_eq!(snap.read(NetId(0)), Some(3));
        s.restore(&snap);
        assert_eq!(s.values(), &[3, 0, 0]);
    }

    #[test]
    fn snapshot_into_reuses_buffer() {
        let mut s = store();
        let mut snap = NetSnapshot::default();
        s.snapshot_into(&mut snap);
        s.set(NetId(2), 7);
        s.snapshot_into(&mut snap);
        assert_eq!(snap.values(), &[0, 0, 7]);
    }

    #[test]
    fn line_trace_lists_nets_in_id_order() {
        let mut s = store();
        s.set(NetId(0), 0xa);
        s.set(NetId(1), 1);
        assert_eq!(s.line_trace(), "data=0xa valid=0x1 wide=0x0");
    }
}
