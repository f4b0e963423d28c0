//! Collision Filtering
//!
//! Tag-based filtering: two bodies can produce a broad-phase pair only when
//! their filter tags match. Collidable bodies share the default tag; a body
//! made invisible to collision (for example a kinematic grab anchor) receives
//! a distinct tag that nothing else carries.

/// Collision filter tag
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CollisionFilter(pub u32);

impl CollisionFilter {
    /// Tag shared by every collidable body
    pub const DEFAULT: Self = Self(0);

    /// Create a filter with an explicit tag
    #[inline]
    #[must_use]
    pub const fn new(tag: u32) -> Self {
        Self(tag)
    }

    /// Check if two filters allow collision (tags must match)
    #[inline]
    #[must_use]
    pub fn can_collide(a: Self, b: Self) -> bool {
        a.0 == b.0
    }
}

impl Default for CollisionFilter {
    #[inline]
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filters_collide() {
        assert!(CollisionFilter::can_collide(
            CollisionFilter::DEFAULT,
            CollisionFilter::DEFAULT
        ));
    }

    #[test]
    fn test_distinct_tags_never_collide() {
        let a = CollisionFilter::new(1);
        let b = CollisionFilter::new(2);
        assert!(!CollisionFilter::can_collide(a, CollisionFilter::DEFAULT));
        assert!(!CollisionFilter::can_collide(a, b));
        assert!(CollisionFilter::can_collide(a, a));
    }
}
