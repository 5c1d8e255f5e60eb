//! Structural fingerprints for schedule caching.
//!
//! Uses FNV-1a for fast, deterministic hashing of the scheduler's inputs.
//! These hashes are not cryptographically secure; they only decide whether
//! a cached schedule still matches the elaborated design.

use ripple_core::NetSet;

use crate::action::ActionDecl;
use crate::constraint::ExplicitEdge;
use crate::footprint::Footprint;
use crate::schedule::TieBreak;

/// FNV-1a offset basis for 64-bit.
const FNV_OFFSET: u64 = 0xcbf29ce484222325;
/// FNV-1a prime for 64-bit.
const FNV_PRIME: u64 = 0x00000100000001B3;

#[inline]
fn fnv1a_byte(hash: u64, byte: u8) -> u64 {
    (hash ^ byte as u64).wrapping_mul(FNV_PRIME)
}

#[inline]
fn fnv1a_u32(mut hash: u64, v: u32) -> u64 {
    for &b in &v.to_le_bytes() {
        hash = fnv1a_byte(hash, b);
    }
    hash
}

#[inline]
fn fnv1a_u64(mut hash: u64, v: u64) -> u64 {
    for &b in &v.to_le_bytes() {
        hash = fnv1a_byte(hash, b);
    }
    hash
}

fn fnv1a_str(mut hash: u64, s: &str) -> u64 {
    // Length prefix keeps ("ab", "c") distinct from ("a", "bc").
    hash = fnv1a_u32(hash, s.len() as u32);
    for &b in s.as_bytes() {
        hash = fnv1a_byte(hash, b);
    }
    hash
}

fn fnv1a_nets(mut hash: u64, nets: &NetSet) -> u64 {
    hash = fnv1a_u32(hash, nets.len() as u32);
    for n in nets {
        hash = fnv1a_u32(hash, n.0);
    }
    hash
}

/// Per-action priority for [`TieBreak::Seeded`].
pub(crate) fn seeded_key(seed: u64, index: u32) -> u64 {
    fnv1a_u32(fnv1a_u64(FNV_OFFSET, seed), index)
}

/// Hash everything a schedule is derived from.
///
/// Covers the tie-break policy, every action's name, kind and footprint in
/// declaration order, and the normalized explicit edges with their
/// provenance (already sorted by the collector). Implicit edges are a pure
/// function of these inputs and are not hashed separately.
pub fn structural_fingerprint(
    decls: &[ActionDecl],
    footprints: &[Footprint],
    explicit: &[ExplicitEdge],
    tie_break: TieBreak,
) -> u64 {
    let mut hash = FNV_OFFSET;
    hash = match tie_break {
        TieBreak::DeclarationOrder => fnv1a_byte(hash, 0),
        TieBreak::Seeded(seed) => fnv1a_u64(fnv1a_byte(hash, 1), seed),
    };

    hash = fnv1a_u32(hash, decls.len() as u32);
    for (decl, fp) in decls.iter().zip(footprints) {
        hash = fnv1a_str(hash, &decl.name);
        hash = fnv1a_byte(hash, decl.kind.tag());
        hash = fnv1a_nets(hash, &fp.reads);
        hash = fnv1a_nets(hash, &fp.writes);
    }

    hash = fnv1a_u32(hash, explicit.len() as u32);
    for e in explicit {
        hash = fnv1a_u32(hash, e.from.0);
        hash = fnv1a_u32(hash, e.to.0);
        hash = fnv1a_u64(hash, e.constraint as u64);
    }
    hash
}
