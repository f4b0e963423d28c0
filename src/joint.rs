//! Point-to-Point Joints
//!
//! A joint pins one anchor point on each body together. Anchors are captured
//! in local space when the joint is created from a world pivot, so the
//! constraint follows the bodies as they move and rotate. Each step the
//! solver re-linearizes the joint into an X row and a Y row driving the
//! world-space anchor gap to zero.
//!
//! Joints live in a slot arena mirroring the body arena: ids stay stable and
//! freed slots are recycled.

use crate::body::{Body, BodyId};
use crate::solver::ConstrainedPair;
use glam::Vec2;

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

/// Stable joint identifier (slot index, recycled on removal)
pub type JointId = usize;

/// A point-to-point pin between two bodies
#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Joint {
    /// First pinned body
    pub body_a: BodyId,
    /// Second pinned body
    pub body_b: BodyId,
    /// Pivot in body A's local frame
    pub local_anchor_a: Vec2,
    /// Pivot in body B's local frame
    pub local_anchor_b: Vec2,
}

impl Joint {
    /// Pin two bodies at a shared world-space pivot
    #[must_use]
    pub fn at_world_pivot(
        id_a: BodyId,
        body_a: &Body,
        id_b: BodyId,
        body_b: &Body,
        pivot: Vec2,
    ) -> Self {
        debug_assert_ne!(id_a, id_b, "a joint needs two distinct bodies");
        Self {
            body_a: id_a,
            body_b: id_b,
            local_anchor_a: body_a.to_local_point(pivot),
            local_anchor_b: body_b.to_local_point(pivot),
        }
    }

    /// Build the solver rows for this joint
    #[must_use]
    pub(crate) fn constrained_pair(&self) -> ConstrainedPair {
        ConstrainedPair::joint(
            self.body_a,
            self.body_b,
            self.local_anchor_a,
            self.local_anchor_b,
        )
    }
}

/// Slot arena of joints with id recycling
#[derive(Debug, Default)]
pub struct JointSet {
    slots: Vec<Option<Joint>>,
    free: Vec<JointId>,
}

impl JointSet {
    /// Create an empty set
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a joint and return its id
    pub fn insert(&mut self, joint: Joint) -> JointId {
        if let Some(id) = self.free.pop() {
            self.slots[id] = Some(joint);
            id
        } else {
            self.slots.push(Some(joint));
            self.slots.len() - 1
        }
    }

    /// Remove a joint; the slot is recycled
    pub fn remove(&mut self, id: JointId) -> Option<Joint> {
        let joint = self.slots.get_mut(id)?.take();
        if joint.is_some() {
            self.free.push(id);
        }
        joint
    }

    /// Remove every joint attached to a body (follows body removal)
    pub fn remove_involving(&mut self, body: BodyId) {
        for (id, slot) in self.slots.iter_mut().enumerate() {
            let attached = slot
                .as_ref()
                .is_some_and(|j| j.body_a == body || j.body_b == body);
            if attached {
                *slot = None;
                self.free.push(id);
            }
        }
    }

    /// Look up a joint
    #[must_use]
    pub fn get(&self, id: JointId) -> Option<&Joint> {
        self.slots.get(id)?.as_ref()
    }

    /// Number of live joints
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    /// Whether the set holds no joints
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate live joints
    pub fn iter(&self) -> impl Iterator<Item = (JointId, &Joint)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(id, slot)| slot.as_ref().map(|j| (id, j)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::BodyDef;
    use crate::filter::CollisionFilter;
    use crate::shape::Shape;
    use approx::assert_relative_eq;

    fn body_at(position: Vec2, rotation: f32) -> Body {
        Body::from_def(
            &BodyDef::new("j", Shape::circle(1.0))
                .with_position(position)
                .with_rotation(rotation),
            CollisionFilter::DEFAULT,
        )
    }

    #[test]
    fn test_world_pivot_captured_in_local_frames() {
        let a = body_at(Vec2::new(2.0, 0.0), 0.0);
        let b = body_at(Vec2::new(6.0, 0.0), core::f32::consts::FRAC_PI_2);
        let joint = Joint::at_world_pivot(0, &a, 1, &b, Vec2::new(4.0, 0.0));

        assert_relative_eq!(joint.local_anchor_a.x, 2.0, epsilon = 1e-5);
        assert_relative_eq!(joint.local_anchor_a.y, 0.0, epsilon = 1e-5);
        // B is rotated 90 degrees, so the pivot 2 units to its -x lands on
        // its local -y axis... rotating world (-2, 0) by -90 gives (0, 2).
        assert_relative_eq!(joint.local_anchor_b.x, 0.0, epsilon = 1e-5);
        assert_relative_eq!(joint.local_anchor_b.y, 2.0, epsilon = 1e-5);

        // Both anchors map back to the same world pivot
        let back_a = a.to_world_point(joint.local_anchor_a);
        let back_b = b.to_world_point(joint.local_anchor_b);
        assert_relative_eq!(back_a.x, back_b.x, epsilon = 1e-5);
        assert_relative_eq!(back_a.y, back_b.y, epsilon = 1e-5);
    }

    #[test]
    fn test_slot_recycling() {
        let a = body_at(Vec2::ZERO, 0.0);
        let b = body_at(Vec2::new(1.0, 0.0), 0.0);
        let joint = Joint::at_world_pivot(0, &a, 1, &b, Vec2::ZERO);

        let mut set = JointSet::new();
        let first = set.insert(joint);
        let second = set.insert(joint);
        assert_ne!(first, second);
        assert_eq!(set.len(), 2);

        assert!(set.remove(first).is_some());
        assert!(set.get(first).is_none());
        assert_eq!(set.len(), 1);

        // Freed slot is reused
        let third = set.insert(joint);
        assert_eq!(third, first);

        // Double remove is a no-op
        assert!(set.remove(42).is_none());
    }

    #[test]
    fn test_remove_involving_body() {
        let a = body_at(Vec2::ZERO, 0.0);
        let b = body_at(Vec2::new(1.0, 0.0), 0.0);
        let c = body_at(Vec2::new(2.0, 0.0), 0.0);

        let mut set = JointSet::new();
        set.insert(Joint::at_world_pivot(0, &a, 1, &b, Vec2::ZERO));
        set.insert(Joint::at_world_pivot(1, &b, 2, &c, Vec2::new(1.5, 0.0)));
        set.insert(Joint::at_world_pivot(0, &a, 2, &c, Vec2::new(1.0, 0.0)));

        set.remove_involving(1);
        assert_eq!(set.len(), 1);
        let (_, survivor) = set.iter().next().expect("one joint left");
        assert_eq!((survivor.body_a, survivor.body_b), (0, 2));
    }
}
