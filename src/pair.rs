//! Canonical Body Pairs
//!
//! Unordered pair of body ids, canonicalized so the larger id is stored
//! first. Canonical form gives the pair a total order independent of
//! insertion order, which the broad phase relies on for merge-based set
//! differencing across frames.

use crate::body::BodyId;

/// Unordered pair of body ids, larger id first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BodyPair {
    /// The numerically larger id
    pub first: BodyId,
    /// The numerically smaller id
    pub second: BodyId,
}

impl BodyPair {
    /// Create a canonical pair from two distinct body ids.
    ///
    /// A body never pairs with itself; equal ids are a caller bug.
    #[inline]
    #[must_use]
    pub fn new(a: BodyId, b: BodyId) -> Self {
        debug_assert_ne!(a, b, "a body cannot pair with itself");
        if a > b {
            Self { first: a, second: b }
        } else {
            Self { first: b, second: a }
        }
    }

    /// Check whether this pair references the given body
    #[inline]
    #[must_use]
    pub fn contains(&self, id: BodyId) -> bool {
        self.first == id || self.second == id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_order_independent() {
        assert_eq!(BodyPair::new(3, 7), BodyPair::new(7, 3));
    }

    #[test]
    fn test_larger_id_stored_first() {
        let p = BodyPair::new(2, 9);
        assert_eq!(p.first, 9);
        assert_eq!(p.second, 2);
    }

    #[test]
    fn test_total_order_for_merging() {
        let mut pairs = [
            BodyPair::new(5, 1),
            BodyPair::new(2, 0),
            BodyPair::new(5, 0),
            BodyPair::new(3, 2),
        ];
        pairs.sort_unstable();
        assert_eq!(
            pairs,
            [
                BodyPair::new(2, 0),
                BodyPair::new(3, 2),
                BodyPair::new(5, 0),
                BodyPair::new(5, 1),
            ]
        );
    }

    #[test]
    fn test_contains() {
        let p = BodyPair::new(4, 8);
        assert!(p.contains(4));
        assert!(p.contains(8));
        assert!(!p.contains(5));
    }
}
