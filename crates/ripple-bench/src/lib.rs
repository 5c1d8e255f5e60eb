//! Benchmark profiles and utilities for the Ripple simulator.
//!
//! Provides pre-built [`SimConfig`] profiles for benchmarking:
//!
//! - [`chain_profile`]: one long combinational adder chain (deep, narrow)
//! - [`mixed_profile`]: seeded mix of drivers, registers, counters, and
//!   adders (wide, shallow), one driver per net
//! - [`decls`]: the scheduler's view of a profile's actions

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use ripple_core::{ActionId, NetId, NetModel, NetModelBuilder};
use ripple_engine::SimConfig;
use ripple_sched::{Action, ActionDecl, Footprint};
use ripple_test_utils::{Adder, ConstDriver, Counter, Register};

fn model(nets: usize) -> NetModel {
    let mut b = NetModelBuilder::new();
    for i in 0..nets {
        b.add_signal(format!("net{i}"), 32);
    }
    match b.build() {
        Ok(m) => m,
        // 32-bit, unconnected, uniquely named signals always elaborate.
        Err(e) => unreachable!("benchmark model failed to elaborate: {e}"),
    }
}

fn push(cfg: &mut SimConfig, action: Box<dyn Action>, footprint: Footprint) {
    let id = ActionId(cfg.actions.len() as u32);
    cfg.actions.push(action);
    cfg.footprints.insert(id, footprint);
}

/// A combinational chain of `depth` adders: `net[i+1] = net[i] + net[0]`.
///
/// Declared in reverse so the scheduler has to reorder every action.
pub fn chain_profile(depth: usize) -> SimConfig {
    let mut cfg = SimConfig::new(model(depth + 1));
    for i in (0..depth).rev() {
        let a = Adder::new(
            format!("add{i}"),
            NetId(i as u32),
            NetId(0),
            NetId(i as u32 + 1),
        );
        let fp = a.footprint();
        push(&mut cfg, Box::new(a), fp);
    }
    let c = ConstDriver::new("seed", NetId(0), 1);
    let fp = c.footprint();
    push(&mut cfg, Box::new(c), fp);
    cfg
}

/// `nets` nets, each driven by one action picked from a hash of `seed`.
///
/// Adders only read lower-numbered nets, so the design is always
/// schedulable.
pub fn mixed_profile(nets: usize, seed: u64) -> SimConfig {
    let mut cfg = SimConfig::new(model(nets));
    for i in 0..nets {
        let h = seed
            .wrapping_mul(6364136223846793005)
            .wrapping_add(i as u64 * 1442695040888963407);
        let h = h ^ (h >> 29);
        let out = NetId(i as u32);
        let name = format!("u{i}");
        let pick = |k: u64| NetId((k % i.max(1) as u64) as u32);
        match h % 4 {
            0 if i > 1 => {
                let a = Adder::new(name, pick(h >> 8), pick(h >> 24), out);
                let fp = a.footprint();
                push(&mut cfg, Box::new(a), fp);
            }
            1 if i > 0 => {
                let r = Register::new(name, pick(h >> 8), out);
                let fp = r.footprint();
                push(&mut cfg, Box::new(r), fp);
            }
            2 => {
                let c = Counter::new(name, out);
                let fp = c.footprint();
                push(&mut cfg, Box::new(c), fp);
            }
            _ => {
                let c = ConstDriver::new(name, out, h & 0xff);
                let fp = c.footprint();
                push(&mut cfg, Box::new(c), fp);
            }
        }
    }
    cfg
}

/// Declarations for `cfg`'s actions, in id order.
pub fn decls(cfg: &SimConfig) -> Vec<ActionDecl> {
    cfg.actions
        .iter()
        .map(|a| ActionDecl::new(a.name(), a.kind()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_profile_validates() {
        let cfg = chain_profile(64);
        assert_eq!(cfg.actions.len(), 65);
        cfg.validate().unwrap();
    }

    #[test]
    fn mixed_profile_validates() {
        for seed in [0, 1, 42, 7919] {
            mixed_profile(500, seed).validate().unwrap();
        }
    }

    #[test]
    fn mixed_profile_is_deterministic() {
        assert_eq!(decls(&mixed_profile(100, 42)), decls(&mixed_profile(100, 42)));
    }
}
