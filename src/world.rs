//! Simulation World
//!
//! Owns the bodies, joints, broad phase, narrow phase and solver, and runs
//! the fixed-timestep pipeline:
//!
//! 1. refresh fattened world AABBs
//! 2. broad phase: sweep and classify pairs (added / persisted / removed)
//! 3. narrow phase on surviving pairs; contacts feed the solver and events
//! 4. gravity on dynamic bodies
//! 5. sequential-impulse solve over detached snapshots
//! 6. commit velocities and integrate dynamic bodies
//!
//! Everything runs synchronously on the calling thread. Pair sets and the
//! contact list are sorted vectors diffed by merge scans, so identical input
//! produces bit-identical trajectories across runs.

use crate::body::{Body, BodyDef, BodyId, MotionType};
use crate::broad_phase::{BroadPhase, BroadPhaseEntry};
use crate::collider::collide;
use crate::debug_draw::DebugDraw;
use crate::event::{ContactEvent, EventCollector};
use crate::filter::CollisionFilter;
use crate::joint::{Joint, JointId, JointSet};
use crate::pair::BodyPair;
use crate::shape::Shape;
use crate::solver::{ConstrainedPair, Solver, SolverBody};
use glam::Vec2;

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

/// World configuration
#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WorldConfig {
    /// Gravity acceleration applied to dynamic bodies
    pub gravity: Vec2,
    /// Fixed time step advanced by each [`World::step`]
    pub delta_time: f32,
    /// Solver iteration count
    pub iterations: u32,
    /// Restitution coefficient applied to all contacts (0 = no bounce)
    pub restitution: f32,
    /// Margin added to every broad-phase AABB to tolerate sub-step motion
    pub aabb_margin: f32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            gravity: Vec2::new(0.0, -981.0),
            delta_time: 1.0 / 60.0,
            iterations: 8,
            restitution: 0.0,
            aabb_margin: 2.0,
        }
    }
}

impl WorldConfig {
    /// Set the gravity vector
    #[must_use]
    pub fn with_gravity(mut self, gravity: Vec2) -> Self {
        self.gravity = gravity;
        self
    }

    /// Set the fixed time step
    #[must_use]
    pub fn with_delta_time(mut self, delta_time: f32) -> Self {
        self.delta_time = delta_time;
        self
    }

    /// Set the solver iteration count
    #[must_use]
    pub fn with_iterations(mut self, iterations: u32) -> Self {
        self.iterations = iterations;
        self
    }

    /// Set the contact restitution coefficient
    #[must_use]
    pub fn with_restitution(mut self, restitution: f32) -> Self {
        self.restitution = restitution;
        self
    }
}

/// The simulation world
pub struct World {
    /// Configuration (fixed after construction)
    pub config: WorldConfig,
    bodies: Vec<Option<Body>>,
    free: Vec<BodyId>,
    broad_phase: BroadPhase,
    solver: Solver,
    joints: JointSet,
    events: EventCollector,
    /// Next tag handed to a non-collidable body; tag 0 is the shared default
    next_filter_tag: u32,
    // Per-step scratch, reused across frames
    entries: Vec<BroadPhaseEntry>,
    solver_bodies: Vec<SolverBody>,
    joint_pairs: Vec<ConstrainedPair>,
}

impl World {
    /// Create a world with the given configuration
    #[must_use]
    pub fn new(config: WorldConfig) -> Self {
        Self {
            config,
            bodies: Vec::new(),
            free: Vec::new(),
            broad_phase: BroadPhase::new(),
            solver: Solver::new(),
            joints: JointSet::new(),
            events: EventCollector::new(),
            next_filter_tag: 1,
            entries: Vec::new(),
            solver_bodies: Vec::new(),
            joint_pairs: Vec::new(),
        }
    }

    // ========================================================================
    // Body lifecycle
    // ========================================================================

    /// Create a body and return its stable id
    pub fn add_body(&mut self, def: &BodyDef) -> BodyId {
        let filter = if def.collidable {
            CollisionFilter::DEFAULT
        } else {
            let tag = self.next_filter_tag;
            self.next_filter_tag += 1;
            CollisionFilter::new(tag)
        };

        let mut body = Body::from_def(def, filter);
        body.update_aabb(self.config.aabb_margin);

        let id = if let Some(id) = self.free.pop() {
            self.bodies[id] = Some(body);
            id
        } else {
            self.bodies.push(Some(body));
            self.bodies.len() - 1
        };

        #[cfg(feature = "log")]
        log::debug!("add body {} ({})", id, def.name);
        id
    }

    /// Remove a body; its id is recycled.
    ///
    /// Contacts, joints and pending event tracking referencing the body are
    /// dropped with it.
    pub fn remove_body(&mut self, id: BodyId) {
        let Some(slot) = self.bodies.get_mut(id) else {
            return;
        };
        if slot.take().is_none() {
            return;
        }
        self.free.push(id);
        self.broad_phase.forget_body(id);
        self.solver.remove_contacts_involving(id);
        self.joints.remove_involving(id);
        self.events.forget_body(id);

        #[cfg(feature = "log")]
        log::debug!("remove body {}", id);
    }

    /// Read access to a body
    #[must_use]
    pub fn get_body(&self, id: BodyId) -> Option<&Body> {
        self.bodies.get(id)?.as_ref()
    }

    /// Number of live bodies
    #[must_use]
    pub fn body_count(&self) -> usize {
        self.bodies.len() - self.free.len()
    }

    /// Iterate live bodies with their ids
    pub fn bodies(&self) -> impl Iterator<Item = (BodyId, &Body)> {
        self.bodies
            .iter()
            .enumerate()
            .filter_map(|(id, slot)| slot.as_ref().map(|b| (id, b)))
    }

    /// Ids of all live bodies, ascending
    #[must_use]
    pub fn active_body_ids(&self) -> Vec<BodyId> {
        self.bodies().map(|(id, _)| id).collect()
    }

    /// All bodies whose shape contains the world-space point
    #[must_use]
    pub fn query_point(&self, point: Vec2) -> Vec<BodyId> {
        self.bodies()
            .filter(|(_, body)| {
                body.aabb.contains_point(point)
                    && body.shape.contains_local_point(body.to_local_point(point))
            })
            .map(|(id, _)| id)
            .collect()
    }

    // ========================================================================
    // Direct mutation (picking / grab tooling)
    // ========================================================================

    /// Teleport a body, bypassing integration
    pub fn set_position(&mut self, id: BodyId, position: Vec2) {
        let margin = self.config.aabb_margin;
        if let Some(body) = self.bodies.get_mut(id).and_then(Option::as_mut) {
            body.position = position;
            body.update_aabb(margin);
        }
    }

    /// Change a body's motion type.
    ///
    /// Switching to dynamic re-derives mass and inertia from the shape and
    /// stored density; switching away zeroes them (infinite mass).
    pub fn set_motion_type(&mut self, id: BodyId, motion_type: MotionType) {
        let Some(body) = self.bodies.get_mut(id).and_then(Option::as_mut) else {
            return;
        };
        body.motion_type = motion_type;
        match motion_type {
            MotionType::Dynamic => {
                body.mass = body.shape.mass(body.density);
                body.inertia = body.shape.inertia(body.density);
                body.inv_mass = 1.0 / body.mass;
                body.inv_inertia = 1.0 / body.inertia;
            }
            MotionType::Static | MotionType::Keyframe => {
                body.mass = 0.0;
                body.inertia = 0.0;
                body.inv_mass = 0.0;
                body.inv_inertia = 0.0;
            }
        }
    }

    // ========================================================================
    // Joint lifecycle
    // ========================================================================

    /// Pin two bodies together at a world-space pivot.
    ///
    /// Returns `None` when either body does not exist.
    pub fn add_joint(&mut self, a: BodyId, b: BodyId, world_pivot: Vec2) -> Option<JointId> {
        let body_a = self.get_body(a)?;
        let body_b = self.get_body(b)?;
        let joint = Joint::at_world_pivot(a, body_a, b, body_b, world_pivot);
        Some(self.joints.insert(joint))
    }

    /// Remove a joint
    pub fn remove_joint(&mut self, id: JointId) {
        self.joints.remove(id);
    }

    /// Read access to a joint
    #[must_use]
    pub fn get_joint(&self, id: JointId) -> Option<&Joint> {
        self.joints.get(id)
    }

    /// Number of live joints
    #[must_use]
    pub fn joint_count(&self) -> usize {
        self.joints.len()
    }

    // ========================================================================
    // Events
    // ========================================================================

    /// Contact events accumulated since the last drain
    #[must_use]
    pub fn contact_events(&self) -> &[ContactEvent] {
        self.events.events()
    }

    /// Take all accumulated contact events
    pub fn drain_contact_events(&mut self) -> Vec<ContactEvent> {
        self.events.drain()
    }

    // ========================================================================
    // Stepping
    // ========================================================================

    /// Advance the simulation by exactly one fixed time step
    pub fn step(&mut self) {
        let dt = self.config.delta_time;
        let margin = self.config.aabb_margin;

        // Fattened AABBs for the sweep
        self.entries.clear();
        for (id, slot) in self.bodies.iter_mut().enumerate() {
            if let Some(body) = slot.as_mut() {
                body.update_aabb(margin);
                self.entries.push(BroadPhaseEntry {
                    id,
                    aabb: body.aabb,
                    filter: body.filter,
                    is_static: body.is_static(),
                });
            }
        }

        let transitions = self.broad_phase.update(&self.entries);
        for &pair in &transitions.removed {
            self.solver.remove_contact(pair);
        }

        #[cfg(feature = "log")]
        log::trace!(
            "broad phase: +{} ={} -{}",
            transitions.added.len(),
            transitions.persisted.len(),
            transitions.removed.len()
        );

        // Narrow phase over every overlapping pair; A is always pair.first
        self.events.begin_frame();
        for &pair in transitions.added.iter().chain(&transitions.persisted) {
            self.narrow_phase(pair);
        }

        // Gravity, then snapshot for the solver
        self.solver_bodies.clear();
        for slot in self.bodies.iter_mut() {
            match slot.as_mut() {
                Some(body) => {
                    if body.is_dynamic() {
                        body.linear_velocity += self.config.gravity * dt;
                    }
                    self.solver_bodies.push(SolverBody::from_body(body));
                }
                None => self.solver_bodies.push(SolverBody::vacant()),
            }
        }

        self.joint_pairs.clear();
        for (_, joint) in self.joints.iter() {
            self.joint_pairs.push(joint.constrained_pair());
        }

        self.solver.solve(
            &mut self.joint_pairs,
            &mut self.solver_bodies,
            dt,
            self.config.iterations,
        );

        // Commit and integrate dynamic bodies
        for (id, slot) in self.bodies.iter_mut().enumerate() {
            if let Some(body) = slot.as_mut() {
                if body.is_dynamic() {
                    let solved = &self.solver_bodies[id];
                    body.linear_velocity = solved.linear_velocity;
                    body.angular_velocity = solved.angular_velocity;
                    body.position += body.linear_velocity * dt;
                    body.rotation += body.angular_velocity * dt;
                    body.update_aabb(margin);
                }
            }
        }

        self.events.end_frame();
    }

    /// Narrow phase for one pair: refresh or drop its contact
    fn narrow_phase(&mut self, pair: BodyPair) {
        let (Some(body_a), Some(body_b)) = (self.get_body(pair.first), self.get_body(pair.second))
        else {
            return;
        };
        match collide(body_a, body_b) {
            Some(contact) => {
                self.solver
                    .apply_contact(pair, &contact, self.config.restitution);
                self.events.push_contact(pair);
            }
            // AABBs overlap but the shapes do not; stale contacts must go.
            None => self.solver.remove_contact(pair),
        }
    }

    // ========================================================================
    // Debug overlay
    // ========================================================================

    /// Push every body outline and joint pivot into a debug sink
    pub fn debug_draw(&self, sink: &mut dyn DebugDraw) {
        for (_, body) in self.bodies() {
            match &*body.shape {
                Shape::Circle(c) => {
                    sink.circle(body.position, c.radius);
                    // Orientation tick from center to rim
                    sink.segment(body.position, body.to_world_point(Vec2::new(c.radius, 0.0)));
                }
                Shape::Box(b) => {
                    let h = b.half_extents;
                    let corners = [
                        body.to_world_point(Vec2::new(-h.x, -h.y)),
                        body.to_world_point(Vec2::new(h.x, -h.y)),
                        body.to_world_point(Vec2::new(h.x, h.y)),
                        body.to_world_point(Vec2::new(-h.x, h.y)),
                    ];
                    for i in 0..4 {
                        sink.segment(corners[i], corners[(i + 1) % 4]);
                    }
                }
                Shape::Convex(p) => {
                    let n = p.winding.len();
                    for i in 0..n {
                        let a = p.vertices[p.winding[i] as usize];
                        let b = p.vertices[p.winding[(i + 1) % n] as usize];
                        sink.segment(body.to_world_point(a), body.to_world_point(b));
                    }
                }
            }
        }

        for (_, joint) in self.joints.iter() {
            if let (Some(a), Some(b)) = (self.get_body(joint.body_a), self.get_body(joint.body_b)) {
                let pa = a.to_world_point(joint.local_anchor_a);
                let pb = b.to_world_point(joint.local_anchor_b);
                sink.point(pa);
                sink.point(pb);
                sink.segment(pa, pb);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::ContactEventKind;
    use approx::assert_relative_eq;

    fn world() -> World {
        World::new(WorldConfig::default())
    }

    fn floor_def() -> BodyDef {
        BodyDef::new("floor", Shape::rect(Vec2::new(400.0, 25.0)))
            .with_motion_type(MotionType::Static)
    }

    #[test]
    fn test_body_id_recycling() {
        let mut w = world();
        let a = w.add_body(&BodyDef::new("a", Shape::circle(1.0)));
        let b = w.add_body(&BodyDef::new("b", Shape::circle(1.0)));
        assert_ne!(a, b);
        assert_eq!(w.body_count(), 2);

        w.remove_body(a);
        assert!(w.get_body(a).is_none());
        assert_eq!(w.body_count(), 1);

        let c = w.add_body(&BodyDef::new("c", Shape::circle(1.0)));
        assert_eq!(c, a, "freed slot is reused");
        assert_eq!(w.active_body_ids(), [c, b]);
    }

    #[test]
    fn test_gravity_only_on_dynamic() {
        let mut w = world();
        let falling = w.add_body(&BodyDef::new("ball", Shape::circle(10.0)));
        let fixed = w.add_body(&floor_def().with_position(Vec2::new(500.0, 0.0)));
        let key = w.add_body(
            &BodyDef::new("anchor", Shape::circle(1.0))
                .with_motion_type(MotionType::Keyframe)
                .with_position(Vec2::new(-500.0, 0.0)),
        );

        w.step();

        let dt = w.config.delta_time;
        assert_relative_eq!(
            w.get_body(falling).unwrap().linear_velocity.y,
            -981.0 * dt,
            epsilon = 1e-3
        );
        assert_eq!(w.get_body(fixed).unwrap().linear_velocity, Vec2::ZERO);
        assert_eq!(w.get_body(key).unwrap().linear_velocity, Vec2::ZERO);
    }

    #[test]
    fn test_non_collidable_body_falls_through() {
        let mut w = world();
        w.add_body(&floor_def());
        let ghost = w.add_body(
            &BodyDef::new("ghost", Shape::circle(10.0))
                .with_position(Vec2::new(0.0, 40.0))
                .non_collidable(),
        );

        for _ in 0..60 {
            w.step();
        }

        assert!(
            w.get_body(ghost).unwrap().position.y < -100.0,
            "non-collidable body must ignore the floor"
        );
        assert!(w.contact_events().is_empty());
    }

    #[test]
    fn test_two_non_collidable_bodies_do_not_pair() {
        let mut w = world();
        let a = w.add_body(&BodyDef::new("a", Shape::circle(10.0)).non_collidable());
        let b = w.add_body(&BodyDef::new("b", Shape::circle(10.0))
            .with_position(Vec2::new(1.0, 0.0))
            .non_collidable());
        assert_ne!(
            w.get_body(a).unwrap().filter,
            w.get_body(b).unwrap().filter,
            "each non-collidable body gets its own tag"
        );
    }

    #[test]
    fn test_ball_rests_on_floor() {
        let mut w = world();
        w.add_body(&floor_def());
        let ball = w.add_body(
            &BodyDef::new("ball", Shape::circle(10.0)).with_position(Vec2::new(0.0, 40.0)),
        );

        for _ in 0..600 {
            w.step();
        }

        // Floor top at y = 25, so the resting center sits near 35. The
        // positional correction leaves a sub-unit oscillation around the
        // resting height with residual speed bounded by one gravity tick.
        let body = w.get_body(ball).unwrap();
        assert!(
            (body.position.y - 35.0).abs() < 2.0,
            "ball should rest on the floor, y = {}",
            body.position.y
        );
        assert!(
            body.linear_velocity.length() < 25.0,
            "residual speed too high: {}",
            body.linear_velocity.length()
        );
    }

    #[test]
    fn test_contact_events_fire() {
        let mut w = world();
        let floor = w.add_body(&floor_def());
        // A keyframe probe overlaps the floor without being integrated, so
        // the contact is reproduced identically every frame.
        let probe = w.add_body(
            &BodyDef::new("probe", Shape::circle(10.0))
                .with_motion_type(MotionType::Keyframe)
                .with_position(Vec2::new(0.0, 30.0)),
        );
        let pair = BodyPair::new(floor, probe);

        w.step();
        w.step();
        let kinds: Vec<_> = w
            .drain_contact_events()
            .iter()
            .filter(|e| e.pair == pair)
            .map(|e| e.kind)
            .collect();
        assert_eq!(kinds, [ContactEventKind::Begin, ContactEventKind::Persist]);

        w.set_position(probe, Vec2::new(0.0, 500.0));
        w.step();
        let kinds: Vec<_> = w
            .drain_contact_events()
            .iter()
            .filter(|e| e.pair == pair)
            .map(|e| e.kind)
            .collect();
        assert_eq!(kinds, [ContactEventKind::End]);
    }

    #[test]
    fn test_query_point() {
        let mut w = world();
        let a = w.add_body(
            &BodyDef::new("a", Shape::circle(5.0)).with_position(Vec2::new(10.0, 0.0)),
        );
        let b = w.add_body(
            &BodyDef::new("b", Shape::rect(Vec2::splat(5.0))).with_position(Vec2::new(12.0, 0.0)),
        );
        w.add_body(&BodyDef::new("far", Shape::circle(5.0)).with_position(Vec2::new(100.0, 0.0)));

        let mut hits = w.query_point(Vec2::new(11.0, 0.0));
        hits.sort_unstable();
        assert_eq!(hits, [a, b]);
        assert!(w.query_point(Vec2::new(50.0, 50.0)).is_empty());
    }

    #[test]
    fn test_set_motion_type_rederives_mass() {
        let mut w = world();
        let id = w.add_body(&BodyDef::new("ball", Shape::circle(2.0)));
        let dynamic_mass = w.get_body(id).unwrap().mass;
        assert!(dynamic_mass > 0.0);

        w.set_motion_type(id, MotionType::Keyframe);
        assert_eq!(w.get_body(id).unwrap().inv_mass, 0.0);

        w.set_motion_type(id, MotionType::Dynamic);
        assert_relative_eq!(w.get_body(id).unwrap().mass, dynamic_mass, epsilon = 1e-5);
    }

    #[test]
    fn test_joint_holds_bodies_together() {
        let mut w = World::new(WorldConfig::default().with_gravity(Vec2::ZERO));
        let anchor = w.add_body(
            &BodyDef::new("anchor", Shape::circle(1.0))
                .with_motion_type(MotionType::Static)
                .non_collidable(),
        );
        let ball = w.add_body(
            &BodyDef::new("ball", Shape::circle(5.0))
                .with_position(Vec2::new(30.0, 0.0))
                .with_velocity(Vec2::new(0.0, 50.0)),
        );
        let joint = w.add_joint(anchor, ball, Vec2::new(30.0, 0.0)).unwrap();

        for _ in 0..120 {
            w.step();
        }

        // The pivot coincides with the ball's center, so the center must stay
        // pinned at the pivot no matter the initial velocity.
        let body = w.get_body(ball).unwrap();
        let drift = (body.position - Vec2::new(30.0, 0.0)).length();
        assert!(drift < 1.0, "joint drift too large: {drift}");

        w.remove_joint(joint);
        assert_eq!(w.joint_count(), 0);
    }

    #[test]
    fn test_add_joint_missing_body() {
        let mut w = world();
        let a = w.add_body(&BodyDef::new("a", Shape::circle(1.0)));
        assert!(w.add_joint(a, 99, Vec2::ZERO).is_none());
    }

    #[test]
    fn test_remove_body_drops_joints_and_contacts() {
        let mut w = world();
        w.add_body(&floor_def());
        let ball = w.add_body(
            &BodyDef::new("ball", Shape::circle(10.0)).with_position(Vec2::new(0.0, 30.0)),
        );
        let other = w.add_body(
            &BodyDef::new("other", Shape::circle(10.0)).with_position(Vec2::new(100.0, 30.0)),
        );
        w.add_joint(ball, other, Vec2::new(50.0, 30.0));

        w.step();
        w.remove_body(ball);
        assert_eq!(w.joint_count(), 0);

        // Further steps must not reference the removed body
        for _ in 0..10 {
            w.step();
        }
        assert!(w.get_body(ball).is_none());
    }

    #[test]
    fn test_debug_draw_covers_all_bodies() {
        use crate::debug_draw::recorder::Recorder;

        let mut w = world();
        w.add_body(&BodyDef::new("c", Shape::circle(5.0)));
        w.add_body(&floor_def().with_position(Vec2::new(0.0, -50.0)));

        let mut sink = Recorder::default();
        w.debug_draw(&mut sink);
        assert_eq!(sink.circles.len(), 1);
        // Floor box outline plus the circle's orientation tick
        assert_eq!(sink.segments.len(), 5);
    }
}
