//! Test utilities and mock types for Ripple development.
//!
//! Provides mock implementations of the net access traits
//! ([`NetReader`], [`NetWriter`]), reusable action [`fixtures`], and
//! cycle-level [`queues`] for exercising method-call ordering.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;
pub mod queues;

use std::collections::HashMap;

use ripple_core::{NetId, NetModel, NetModelBuilder, NetReader, NetWriter, Value};

pub use fixtures::{Adder, ConstDriver, Counter, FailingAction, Register};
pub use queues::{Queue, QueuePeek, QueuePolicy, QueuePulse, TestSink, TestSource};

/// A net model of `n` unconnected signals named `n0..`, all `width` bits.
///
/// # Panics
///
/// If `width` is outside `1..=64`.
pub fn flat_model(n: usize, width: u32) -> NetModel {
    let mut b = NetModelBuilder::new();
    for i in 0..n {
        b.add_signal(format!("n{i}"), width);
    }
    b.build().expect("flat model with a valid width")
}

/// Mock implementation of [`NetReader`].
///
/// Backed by a `HashMap<NetId, Value>`. Pre-populate nets with
/// [`set`](MockNetReader::set) before passing to code under test.
pub struct MockNetReader {
    values: HashMap<NetId, Value>,
}

impl MockNetReader {
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
        }
    }

    /// Pre-populate a net value for testing.
    pub fn set(&mut self, net: NetId, value: Value) {
        self.values.insert(net, value);
    }
}

impl Default for MockNetReader {
    fn default() -> Self {
        Self::new()
    }
}

impl NetReader for MockNetReader {
    fn read(&self, net: NetId) -> Option<Value> {
        self.values.get(&net).copied()
    }
}

/// Mock implementation of [`NetWriter`].
///
/// Only nets registered with [`add_net`](MockNetWriter::add_net) are
/// writable. Inspect results with [`get`](MockNetWriter::get).
pub struct MockNetWriter {
    values: HashMap<NetId, Value>,
    writes: usize,
}

impl MockNetWriter {
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
            writes: 0,
        }
    }

    /// Make `net` writable, initialized to zero.
    pub fn add_net(&mut self, net: NetId) {
        self.values.insert(net, 0);
    }

    /// Read back the current value for test assertions.
    pub fn get(&self, net: NetId) -> Option<Value> {
        self.values.get(&net).copied()
    }

    /// Number of accepted writes.
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl Default for MockNetWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl NetWriter for MockNetWriter {
    fn write(&mut self, net: NetId, value: Value) -> bool {
        match self.values.get_mut(&net) {
            Some(slot) => {
                *slot = value;
                self.writes += 1;
                true
            }
            None => false,
        }
    }
}
