//! The [`NetSet`] bitset used for action footprints.

use crate::id::NetId;

/// A set of net IDs implemented as a dynamically-sized bitset.
///
/// Used by footprints to declare which nets an action reads and writes.
/// Iteration is always in ascending `NetId` order, which the dependency
/// graph builder relies on for deterministic edge order.
#[derive(Clone, Debug, Default)]
pub struct NetSet {
    bits: Vec<u64>,
}

impl NetSet {
    const BITS_PER_WORD: usize = 64;

    /// Create an empty net set.
    pub fn empty() -> Self {
        Self { bits: Vec::new() }
    }

    /// A set holding every net in `0..count`.
    pub fn all(count: u32) -> Self {
        (0..count).map(NetId).collect()
    }

    #[inline]
    fn locate(net: NetId) -> (usize, usize) {
        let i = net.0 as usize;
        (i / Self::BITS_PER_WORD, i % Self::BITS_PER_WORD)
    }

    /// Insert a net. Returns `true` if it was not already present.
    pub fn insert(&mut self, net: NetId) -> bool {
        let (word, bit) = Self::locate(net);
        if word >= self.bits.len() {
            self.bits.resize(word + 1, 0);
        }
        let fresh = self.bits[word] & (1u64 << bit) == 0;
        self.bits[word] |= 1u64 << bit;
        fresh
    }

    /// Remove a net. Returns `true` if it was present.
    pub fn remove(&mut self, net: NetId) -> bool {
        let (word, bit) = Self::locate(net);
        match self.bits.get_mut(word) {
            Some(w) if *w & (1u64 << bit) != 0 => {
                *w &= !(1u64 << bit);
                self.trim();
                true
            }
            _ => false,
        }
    }

    /// Check whether the set contains a net.
    pub fn contains(&self, net: NetId) -> bool {
        let (word, bit) = Self::locate(net);
        word < self.bits.len() && (self.bits[word] & (1u64 << bit)) != 0
    }

    /// Return the union of two sets (`self | other`).
    pub fn union(&self, other: &Self) -> Self {
        let max_len = self.bits.len().max(other.bits.len());
        let bits = (0..max_len)
            .map(|i| {
                self.bits.get(i).copied().unwrap_or(0) | other.bits.get(i).copied().unwrap_or(0)
            })
            .collect();
        Self { bits }
    }

    /// Return the intersection of two sets (`self & other`).
    pub fn intersection(&self, other: &Self) -> Self {
        let mut out = Self {
            bits: self
                .bits
                .iter()
                .zip(&other.bits)
                .map(|(a, b)| a & b)
                .collect(),
        };
        out.trim();
        out
    }

    /// Return the set difference (`self - other`).
    pub fn difference(&self, other: &Self) -> Self {
        let mut out = Self {
            bits: self
                .bits
                .iter()
                .enumerate()
                .map(|(i, a)| a & !other.bits.get(i).copied().unwrap_or(0))
                .collect(),
        };
        out.trim();
        out
    }

    /// Check whether `self` is a subset of `other`.
    pub fn is_subset(&self, other: &Self) -> bool {
        self.bits
            .iter()
            .enumerate()
            .all(|(i, a)| a & !other.bits.get(i).copied().unwrap_or(0) == 0)
    }

    /// `true` if the two sets share no net.
    pub fn is_disjoint(&self, other: &Self) -> bool {
        self.bits.iter().zip(&other.bits).all(|(a, b)| a & b == 0)
    }

    /// Returns `true` if the set contains no nets.
    pub fn is_empty(&self) -> bool {
        self.bits.iter().all(|&w| w == 0)
    }

    /// Returns the number of nets in the set.
    pub fn len(&self) -> usize {
        self.bits.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Iterate over the net IDs in the set, in ascending order.
    pub fn iter(&self) -> NetSetIter<'_> {
        NetSetIter {
            bits: &self.bits,
            word_idx: 0,
            bit_idx: 0,
        }
    }

    fn trim(&mut self) {
        while self.bits.last() == Some(&0) {
            self.bits.pop();
        }
    }
}

impl PartialEq for NetSet {
    fn eq(&self, other: &Self) -> bool {
        let max_len = self.bits.len().max(other.bits.len());
        (0..max_len).all(|i| {
            self.bits.get(i).copied().unwrap_or(0) == other.bits.get(i).copied().unwrap_or(0)
        })
    }
}

impl Eq for NetSet {}

impl FromIterator<NetId> for NetSet {
    fn from_iter<I: IntoIterator<Item = NetId>>(iter: I) -> Self {
        let mut set = Self::empty();
        for net in iter {
            set.insert(net);
        }
        set
    }
}

impl<'a> IntoIterator for &'a NetSet {
    type Item = NetId;
    type IntoIter = NetSetIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over net IDs in a [`NetSet`], yielding IDs in ascending order.
pub struct NetSetIter<'a> {
    bits: &'a [u64],
    word_idx: usize,
    bit_idx: usize,
}

impl Iterator for NetSetIter<'_> {
    type Item = NetId;

    fn next(&mut self) -> Option<Self::Item> {
        while self.word_idx < self.bits.len() {
            let word = self.bits[self.word_idx];
            while self.bit_idx < 64 {
                let bit = self.bit_idx;
                self.bit_idx += 1;
                if word & (1u64 << bit) != 0 {
                    return Some(NetId((self.word_idx * 64 + bit) as u32));
                }
            }
            self.word_idx += 1;
            self.bit_idx = 0;
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn arb_net_set() -> impl Strategy<Value = NetSet> {
        prop::collection::vec(0u32..160, 0..40)
            .prop_map(|ids| ids.into_iter().map(NetId).collect::<NetSet>())
    }

    #[test]
    fn remove_trims_trailing_words() {
        let mut set: NetSet = [NetId(3), NetId(130)].into_iter().collect();
        assert!(set.remove(NetId(130)));
        assert!(!set.remove(NetId(130)));
        assert_eq!(set, [NetId(3)].into_iter().collect());
        assert_eq!(set.bits.len(), 1);
    }

    #[test]
    fn insert_reports_freshness() {
        let mut set = NetSet::empty();
        assert!(set.insert(NetId(7)));
        assert!(!set.insert(NetId(7)));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn all_covers_prefix() {
        let set = NetSet::all(70);
        assert_eq!(set.len(), 70);
        assert!(set.contains(NetId(69)));
        assert!(!set.contains(NetId(70)));
    }

    proptest! {
        #[test]
        fn union_commutative(a in arb_net_set(), b in arb_net_set()) {
            prop_assert_eq!(a.union(&b), b.union(&a));
        }

        #[test]
        fn intersection_commutative(a in arb_net_set(), b in arb_net_set()) {
            prop_assert_eq!(a.intersection(&b), b.intersection(&a));
        }

        #[test]
        fn disjoint_iff_empty_intersection(a in arb_net_set(), b in arb_net_set()) {
            prop_assert_eq!(a.is_disjoint(&b), a.intersection(&b).is_empty());
        }

        #[test]
        fn difference_is_disjoint_from_subtrahend(a in arb_net_set(), b in arb_net_set()) {
            let diff = a.difference(&b);
            prop_assert!(diff.is_disjoint(&b));
            prop_assert!(diff.is_subset(&a));
        }

        #[test]
        fn union_contains_both(a in arb_net_set(), b in arb_net_set()) {
            let u = a.union(&b);
            prop_assert!(a.is_subset(&u));
            prop_assert!(b.is_subset(&u));
        }

        #[test]
        fn iteration_is_ascending(a in arb_net_set()) {
            let ids: Vec<NetId> = a.iter().collect();
            prop_assert!(ids.windows(2).all(|w| w[0] < w[1]));
            prop_assert_eq!(ids.len(), a.len());
        }
    }
}
