//! # rigid2d
//!
//! **Deterministic 2D Rigid-Body Physics**
//!
//! A small impulse-based physics engine: sweep-and-prune broad phase,
//! GJK/EPA narrow phase, and a sequential-impulse constraint solver, driven
//! by a fixed-timestep world.
//!
//! ## Pipeline
//!
//! | Stage | Module | Cost |
//! |-------|--------|------|
//! | **Broad phase** | [`broad_phase`] | O(n log n) sweep + pair diff |
//! | **Narrow phase** | [`collider`] | GJK/EPA per surviving pair |
//! | **Solve** | [`solver`] | Gauss-Seidel, fixed iterations |
//! | **Integrate** | [`world`] | semi-implicit Euler |
//!
//! ## Design Principles
//!
//! - **Deterministic**: sorted pair sets and merge-based differencing; the
//!   same input replays bit-identically
//! - **Id-based**: bodies, joints and constraints reference each other by
//!   index, never by pointer
//! - **no_std Compatible**: needs `alloc`; enable the `libm` feature on
//!   targets without a float runtime
//!
//! ## Quick Start
//!
//! ```rust
//! use rigid2d::prelude::*;
//! use glam::Vec2;
//!
//! let mut world = World::new(WorldConfig::default());
//!
//! let _floor = world.add_body(
//!     &BodyDef::new("floor", Shape::rect(Vec2::new(400.0, 25.0)))
//!         .with_motion_type(MotionType::Static),
//! );
//! let ball = world.add_body(
//!     &BodyDef::new("ball", Shape::circle(5.0)).with_position(Vec2::new(0.0, 100.0)),
//! );
//!
//! for _ in 0..60 {
//!     world.step();
//! }
//!
//! assert!(world.get_body(ball).unwrap().position.y < 100.0);
//! ```
//!
//! ## Picking
//!
//! ```rust
//! use rigid2d::prelude::*;
//! use glam::Vec2;
//!
//! let mut world = World::new(WorldConfig::default());
//! let body = world.add_body(&BodyDef::new("box", Shape::rect(Vec2::splat(10.0))));
//!
//! assert_eq!(world.query_point(Vec2::new(5.0, 5.0)), vec![body]);
//! assert!(world.query_point(Vec2::new(50.0, 0.0)).is_empty());
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod aabb;
pub mod body;
pub mod broad_phase;
pub mod collider;
pub mod debug_draw;
pub mod event;
pub mod filter;
pub mod joint;
pub mod pair;
pub mod shape;
pub mod solver;
pub mod world;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::aabb::Aabb;
    pub use crate::body::{Body, BodyDef, BodyId, MotionType, ShapeHandle};
    pub use crate::broad_phase::{BroadPhase, BroadPhaseEntry, PairTransitions};
    pub use crate::collider::{collide, Contact};
    pub use crate::debug_draw::DebugDraw;
    pub use crate::event::{ContactEvent, ContactEventKind, EventCollector};
    pub use crate::filter::CollisionFilter;
    pub use crate::joint::{Joint, JointId, JointSet};
    pub use crate::pair::BodyPair;
    pub use crate::shape::{BoxShape, Circle, ConvexPolygon, Shape, ShapeType};
    pub use crate::solver::{ConstrainedPair, Constraint, Jacobian, Solver, SolverBody};
    pub use crate::world::{World, WorldConfig};
}

// Re-export main types at crate root
pub use prelude::*;

// ============================================================================
// Integration Tests
// ============================================================================
