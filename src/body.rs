//! Rigid Bodies
//!
//! Body state (pose, velocity, mass properties) plus the descriptor used to
//! construct bodies. Bodies reference their shape through a shared handle and
//! cache a fattened world-space AABB for the broad phase.

use crate::aabb::Aabb;
use crate::filter::CollisionFilter;
use crate::shape::Shape;
use glam::Vec2;

#[cfg(not(feature = "std"))]
use alloc::{string::String, sync::Arc};
#[cfg(feature = "std")]
use std::sync::Arc;

/// Stable body identifier.
///
/// Ids index the world's slot array and are recycled through a free list when
/// bodies are removed.
pub type BodyId = usize;

/// Shared shape handle; several bodies may reference the same geometry.
pub type ShapeHandle = Arc<Shape>;

/// How a body participates in the simulation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MotionType {
    /// Never moves; infinite mass
    Static,
    /// Fully simulated: gravity, impulses, integration
    Dynamic,
    /// Moved by user code (e.g. a grab anchor); infinite mass, no integration
    Keyframe,
}

/// Descriptor for constructing a body (builder style)
#[derive(Clone, Debug)]
pub struct BodyDef {
    /// Debug name
    pub name: String,
    /// Shape handle (shared or exclusive)
    pub shape: ShapeHandle,
    /// Motion type
    pub motion_type: MotionType,
    /// Initial world position
    pub position: Vec2,
    /// Initial rotation in radians
    pub rotation: f32,
    /// Initial linear velocity
    pub linear_velocity: Vec2,
    /// Initial angular velocity (radians/second, CCW positive)
    pub angular_velocity: f32,
    /// Explicit mass override; derived from the shape when `None`
    pub mass: Option<f32>,
    /// Explicit inertia override; derived from the shape when `None`
    pub inertia: Option<f32>,
    /// Density used when deriving mass/inertia from the shape
    pub density: f32,
    /// Whether this body participates in collision at all
    pub collidable: bool,
}

impl BodyDef {
    /// Create a descriptor with a dynamic motion type and default pose
    #[must_use]
    pub fn new(name: &str, shape: Shape) -> Self {
        Self {
            name: String::from(name),
            shape: Arc::new(shape),
            motion_type: MotionType::Dynamic,
            position: Vec2::ZERO,
            rotation: 0.0,
            linear_velocity: Vec2::ZERO,
            angular_velocity: 0.0,
            mass: None,
            inertia: None,
            density: 1.0,
            collidable: true,
        }
    }

    /// Create a descriptor sharing an existing shape handle
    #[must_use]
    pub fn with_shared_shape(name: &str, shape: ShapeHandle) -> Self {
        Self {
            name: String::from(name),
            shape,
            motion_type: MotionType::Dynamic,
            position: Vec2::ZERO,
            rotation: 0.0,
            linear_velocity: Vec2::ZERO,
            angular_velocity: 0.0,
            mass: None,
            inertia: None,
            density: 1.0,
            collidable: true,
        }
    }

    /// Set the motion type
    #[must_use]
    pub fn with_motion_type(mut self, motion_type: MotionType) -> Self {
        self.motion_type = motion_type;
        self
    }

    /// Set the initial position
    #[must_use]
    pub fn with_position(mut self, position: Vec2) -> Self {
        self.position = position;
        self
    }

    /// Set the initial rotation (radians)
    #[must_use]
    pub fn with_rotation(mut self, rotation: f32) -> Self {
        self.rotation = rotation;
        self
    }

    /// Set the initial linear velocity
    #[must_use]
    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.linear_velocity = velocity;
        self
    }

    /// Set the initial angular velocity
    #[must_use]
    pub fn with_angular_velocity(mut self, angular_velocity: f32) -> Self {
        self.angular_velocity = angular_velocity;
        self
    }

    /// Override the mass (dynamic bodies only)
    #[must_use]
    pub fn with_mass(mut self, mass: f32) -> Self {
        self.mass = Some(mass);
        self
    }

    /// Override the rotational inertia (dynamic bodies only)
    #[must_use]
    pub fn with_inertia(mut self, inertia: f32) -> Self {
        self.inertia = Some(inertia);
        self
    }

    /// Set the density used when deriving mass from the shape
    #[must_use]
    pub fn with_density(mut self, density: f32) -> Self {
        self.density = density;
        self
    }

    /// Make the body invisible to collision detection
    #[must_use]
    pub fn non_collidable(mut self) -> Self {
        self.collidable = false;
        self
    }
}

/// A rigid body in the world
#[derive(Clone, Debug)]
pub struct Body {
    /// Debug name
    pub name: String,
    /// Motion type
    pub motion_type: MotionType,
    /// World position of the center of mass
    pub position: Vec2,
    /// Orientation angle in radians (CCW from +X)
    pub rotation: f32,
    /// Linear velocity
    pub linear_velocity: Vec2,
    /// Angular velocity (radians/second, CCW positive)
    pub angular_velocity: f32,
    /// Mass (0 for static/keyframe)
    pub mass: f32,
    /// Inverse mass (exactly 0 for static/keyframe)
    pub inv_mass: f32,
    /// Rotational inertia (0 for static/keyframe)
    pub inertia: f32,
    /// Inverse inertia (exactly 0 for static/keyframe)
    pub inv_inertia: f32,
    /// Density used to derive mass when the motion type changes
    pub density: f32,
    /// Collision filter tag
    pub filter: CollisionFilter,
    /// Attached shape
    pub shape: ShapeHandle,
    /// Cached fattened world AABB, refreshed once per step
    pub(crate) aabb: Aabb,
}

impl Body {
    /// Build a body from a descriptor.
    ///
    /// Dynamic bodies must end up with strictly positive mass and inertia;
    /// static/keyframe bodies must not carry explicit mass overrides.
    #[must_use]
    pub(crate) fn from_def(def: &BodyDef, filter: CollisionFilter) -> Self {
        let (mass, inertia) = match def.motion_type {
            MotionType::Dynamic => {
                let mass = def.mass.unwrap_or_else(|| def.shape.mass(def.density));
                let inertia = def
                    .inertia
                    .unwrap_or_else(|| def.shape.inertia(def.density));
                debug_assert!(mass > 0.0, "dynamic body needs positive mass");
                debug_assert!(inertia > 0.0, "dynamic body needs positive inertia");
                (mass, inertia)
            }
            MotionType::Static | MotionType::Keyframe => {
                debug_assert!(
                    def.mass.is_none() && def.inertia.is_none(),
                    "static/keyframe bodies must not set mass or inertia"
                );
                (0.0, 0.0)
            }
        };

        let inv_mass = if mass > 0.0 { 1.0 / mass } else { 0.0 };
        let inv_inertia = if inertia > 0.0 { 1.0 / inertia } else { 0.0 };

        Self {
            name: def.name.clone(),
            motion_type: def.motion_type,
            position: def.position,
            rotation: def.rotation,
            linear_velocity: def.linear_velocity,
            angular_velocity: def.angular_velocity,
            mass,
            inv_mass,
            inertia,
            inv_inertia,
            density: def.density,
            filter,
            shape: def.shape.clone(),
            aabb: Aabb::ZERO,
        }
    }

    /// Check if the body never moves
    #[inline]
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.motion_type == MotionType::Static
    }

    /// Check if the body is fully simulated
    #[inline]
    #[must_use]
    pub fn is_dynamic(&self) -> bool {
        self.motion_type == MotionType::Dynamic
    }

    /// Transform a local-space point to world space
    #[inline]
    #[must_use]
    pub fn to_world_point(&self, local: Vec2) -> Vec2 {
        self.position + Vec2::from_angle(self.rotation).rotate(local)
    }

    /// Transform a world-space point into this body's local frame
    #[inline]
    #[must_use]
    pub fn to_local_point(&self, world: Vec2) -> Vec2 {
        Vec2::from_angle(-self.rotation).rotate(world - self.position)
    }

    /// Rotate a local-space vector into world space (no translation)
    #[inline]
    #[must_use]
    pub fn to_world_vector(&self, local: Vec2) -> Vec2 {
        Vec2::from_angle(self.rotation).rotate(local)
    }

    /// Rotate a world-space vector into local space (no translation)
    #[inline]
    #[must_use]
    pub fn to_local_vector(&self, world: Vec2) -> Vec2 {
        Vec2::from_angle(-self.rotation).rotate(world)
    }

    /// Recompute the cached world AABB, fattened by `margin` to tolerate
    /// sub-step motion.
    pub(crate) fn update_aabb(&mut self, margin: f32) {
        self.aabb = self
            .shape
            .local_aabb(self.rotation)
            .inflated(margin)
            .translated(self.position);
    }

    /// Cached world AABB from the last step
    #[inline]
    #[must_use]
    pub fn aabb(&self) -> Aabb {
        self.aabb
    }
}
