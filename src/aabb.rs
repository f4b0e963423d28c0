//! Axis-Aligned Bounding Boxes
//!
//! World-space AABBs used by the broad phase. Stored as center + half-extents
//! so the overlap test is two per-axis distance comparisons.

use glam::Vec2;

/// Axis-aligned bounding box (center / half-extent form)
#[derive(Clone, Copy, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Aabb {
    /// Box center in world space
    pub center: Vec2,
    /// Half-extents along each axis (non-negative)
    pub half_extents: Vec2,
}

impl Aabb {
    /// Empty box at the origin
    pub const ZERO: Self = Self {
        center: Vec2::ZERO,
        half_extents: Vec2::ZERO,
    };

    /// Create a new AABB from center and half-extents
    #[inline]
    #[must_use]
    pub const fn new(center: Vec2, half_extents: Vec2) -> Self {
        Self {
            center,
            half_extents,
        }
    }

    /// Create an AABB from min and max corners
    #[inline]
    #[must_use]
    pub fn from_min_max(min: Vec2, max: Vec2) -> Self {
        Self {
            center: (min + max) * 0.5,
            half_extents: (max - min) * 0.5,
        }
    }

    /// Minimum corner
    #[inline]
    #[must_use]
    pub fn min(&self) -> Vec2 {
        self.center - self.half_extents
    }

    /// Maximum corner
    #[inline]
    #[must_use]
    pub fn max(&self) -> Vec2 {
        self.center + self.half_extents
    }

    /// Check if two AABBs overlap (both axes, center/half-extent comparison)
    #[inline]
    #[must_use]
    pub fn overlaps(&self, other: &Aabb) -> bool {
        let delta = (other.center - self.center).abs();
        let reach = self.half_extents + other.half_extents;
        delta.x <= reach.x && delta.y <= reach.y
    }

    /// Check if a world-space point lies inside the box
    #[inline]
    #[must_use]
    pub fn contains_point(&self, point: Vec2) -> bool {
        let delta = (point - self.center).abs();
        delta.x <= self.half_extents.x && delta.y <= self.half_extents.y
    }

    /// Grow the box by a uniform margin on every side
    #[inline]
    #[must_use]
    pub fn inflated(&self, margin: f32) -> Self {
        Self {
            center: self.center,
            half_extents: self.half_extents + Vec2::splat(margin),
        }
    }

    /// Move the box center
    #[inline]
    #[must_use]
    pub fn translated(&self, offset: Vec2) -> Self {
        Self {
            center: self.center + offset,
            half_extents: self.half_extents,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlap_basic() {
        let a = Aabb::new(Vec2::ZERO, Vec2::splat(1.0));
        let b = Aabb::new(Vec2::new(1.5, 0.0), Vec2::splat(1.0));
        let c = Aabb::new(Vec2::new(5.0, 5.0), Vec2::splat(1.0));

        assert!(a.overlaps(&b), "a and b should overlap");
        assert!(b.overlaps(&a), "overlap must be symmetric");
        assert!(!a.overlaps(&c), "a and c should not overlap");
    }

    #[test]
    fn test_overlap_touching_edges() {
        // Exactly touching counts as overlapping
        let a = Aabb::new(Vec2::ZERO, Vec2::splat(1.0));
        let b = Aabb::new(Vec2::new(2.0, 0.0), Vec2::splat(1.0));
        assert!(a.overlaps(&b));
    }

    #[test]
    fn test_overlap_one_axis_only() {
        // Overlapping in x but separated in y is not an overlap
        let a = Aabb::new(Vec2::ZERO, Vec2::splat(1.0));
        let b = Aabb::new(Vec2::new(0.5, 10.0), Vec2::splat(1.0));
        assert!(!a.overlaps(&b));
    }

    #[test]
    fn test_min_max_round_trip() {
        let a = Aabb::from_min_max(Vec2::new(-2.0, 1.0), Vec2::new(4.0, 5.0));
        assert_eq!(a.min(), Vec2::new(-2.0, 1.0));
        assert_eq!(a.max(), Vec2::new(4.0, 5.0));
        assert_eq!(a.center, Vec2::new(1.0, 3.0));
    }

    #[test]
    fn test_inflate_and_translate() {
        let a = Aabb::new(Vec2::ZERO, Vec2::splat(1.0)).inflated(0.5);
        assert_eq!(a.half_extents, Vec2::splat(1.5));

        let moved = a.translated(Vec2::new(3.0, -1.0));
        assert_eq!(moved.center, Vec2::new(3.0, -1.0));
        assert_eq!(moved.half_extents, Vec2::splat(1.5));
    }

    #[test]
    fn test_contains_point() {
        let a = Aabb::new(Vec2::new(1.0, 1.0), Vec2::splat(2.0));
        assert!(a.contains_point(Vec2::new(0.0, 0.0)));
        assert!(a.contains_point(Vec2::new(3.0, 3.0)));
        assert!(!a.contains_point(Vec2::new(3.1, 0.0)));
    }
}
