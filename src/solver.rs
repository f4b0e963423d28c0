//! Sequential-Impulse Constraint Solver
//!
//! Velocity-level constraint solving over detached body snapshots. Each
//! constraint is one scalar row: a world axis, local anchors on both bodies,
//! a position-error bias, and an accumulated impulse. Contact rows clamp the
//! accumulated impulse to be non-negative (non-penetration is one-sided);
//! joint rows are bilateral.
//!
//! Iteration is Gauss-Seidel: impulses are applied to the snapshots
//! immediately, so later rows in the same sweep see updated velocities.
//! Joints are solved before contacts in every iteration; sequential impulse
//! is order-dependent, so the order is fixed rather than incidental.
//!
//! Axis convention: a row's axis points from body A toward body B, and a
//! positive impulse pushes A along `-axis` and B along `+axis`. Contact
//! normals from the narrow phase already follow this convention.

use crate::body::{Body, BodyId};
use crate::collider::Contact;
use crate::pair::BodyPair;
use glam::Vec2;

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

/// Rows with a smaller effective mass than this are skipped (two infinite
/// masses on one row).
const MIN_EFFECTIVE_MASS: f32 = 1e-9;

// ============================================================================
// Solver bodies
// ============================================================================

/// Per-body snapshot the solver iterates on.
///
/// Decoupled from [`Body`] so iteration never reads a half-updated body;
/// results are committed back in one pass after solving.
#[derive(Clone, Copy, Debug)]
pub struct SolverBody {
    /// Linear velocity
    pub linear_velocity: Vec2,
    /// Angular velocity
    pub angular_velocity: f32,
    /// World position
    pub position: Vec2,
    /// Orientation angle
    pub rotation: f32,
    /// Inverse mass (0 for static/keyframe)
    pub inv_mass: f32,
    /// Inverse inertia (0 for static/keyframe)
    pub inv_inertia: f32,
}

impl SolverBody {
    /// Snapshot a body's dynamic state
    #[must_use]
    pub fn from_body(body: &Body) -> Self {
        Self {
            linear_velocity: body.linear_velocity,
            angular_velocity: body.angular_velocity,
            position: body.position,
            rotation: body.rotation,
            inv_mass: body.inv_mass,
            inv_inertia: body.inv_inertia,
        }
    }

    /// Placeholder for empty body slots; impulses cannot move it
    #[must_use]
    pub fn vacant() -> Self {
        Self {
            linear_velocity: Vec2::ZERO,
            angular_velocity: 0.0,
            position: Vec2::ZERO,
            rotation: 0.0,
            inv_mass: 0.0,
            inv_inertia: 0.0,
        }
    }

    /// World-space position of a local anchor
    #[inline]
    #[must_use]
    pub fn anchor_world(&self, local: Vec2) -> Vec2 {
        self.position + Vec2::from_angle(self.rotation).rotate(local)
    }

    /// World-space arm of a local anchor (rotation only)
    #[inline]
    #[must_use]
    pub fn arm_world(&self, local: Vec2) -> Vec2 {
        Vec2::from_angle(self.rotation).rotate(local)
    }
}

// ============================================================================
// Jacobian
// ============================================================================

/// One-row Jacobian: linear and angular parts for both bodies
#[derive(Clone, Copy, Debug)]
pub struct Jacobian {
    /// Linear part for body A
    pub lin_a: Vec2,
    /// Angular part for body A
    pub ang_a: f32,
    /// Linear part for body B
    pub lin_b: Vec2,
    /// Angular part for body B
    pub ang_b: f32,
}

impl Jacobian {
    /// Zero row (inert until prepared)
    pub const ZERO: Self = Self {
        lin_a: Vec2::ZERO,
        ang_a: 0.0,
        lin_b: Vec2::ZERO,
        ang_b: 0.0,
    };

    /// Build the row for a unit `axis` (A toward B) and world-space arms.
    ///
    /// `J v` is then the rate of separation along the axis: negative while
    /// the anchor points approach, positive while they separate.
    #[must_use]
    pub fn from_axis(axis: Vec2, arm_a: Vec2, arm_b: Vec2) -> Self {
        Self {
            lin_a: -axis,
            ang_a: -arm_a.perp_dot(axis),
            lin_b: axis,
            ang_b: arm_b.perp_dot(axis),
        }
    }

    /// Relative velocity along the row (`J v`)
    #[inline]
    #[must_use]
    pub fn relative_velocity(&self, a: &SolverBody, b: &SolverBody) -> f32 {
        self.lin_a.dot(a.linear_velocity)
            + self.ang_a * a.angular_velocity
            + self.lin_b.dot(b.linear_velocity)
            + self.ang_b * b.angular_velocity
    }

    /// Effective mass of the row (`J M^-1 J^T`)
    #[inline]
    #[must_use]
    pub fn effective_mass(&self, a: &SolverBody, b: &SolverBody) -> f32 {
        a.inv_mass * self.lin_a.length_squared()
            + a.inv_inertia * self.ang_a * self.ang_a
            + b.inv_mass * self.lin_b.length_squared()
            + b.inv_inertia * self.ang_b * self.ang_b
    }

    /// Apply a scalar impulse along the row to both bodies
    #[inline]
    pub fn apply(&self, a: &mut SolverBody, b: &mut SolverBody, impulse: f32) {
        a.linear_velocity += self.lin_a * (a.inv_mass * impulse);
        a.angular_velocity += self.ang_a * (a.inv_inertia * impulse);
        b.linear_velocity += self.lin_b * (b.inv_mass * impulse);
        b.angular_velocity += self.ang_b * (b.inv_inertia * impulse);
    }
}

// ============================================================================
// Constraints
// ============================================================================

/// One scalar velocity constraint row
#[derive(Clone, Copy, Debug)]
pub struct Constraint {
    /// Anchor in body A's local frame
    pub local_anchor_a: Vec2,
    /// Anchor in body B's local frame
    pub local_anchor_b: Vec2,
    /// World axis, A toward B (contact normal, or a fixed joint axis)
    pub axis: Vec2,
    /// Position error fed back as `bias / dt` (penetration depth for
    /// contacts; recomputed anchor gap for joints)
    pub bias: f32,
    /// Restitution coefficient (contacts; 0 disables bounce)
    pub restitution: f32,
    /// Clamp the accumulated impulse to be non-negative (contacts)
    pub one_sided: bool,
    /// Extra velocity bias from restitution, set during prepare
    velocity_bias: f32,
    /// Current row Jacobian, rebuilt during prepare
    jacobian: Jacobian,
    /// Running impulse total, carried across frames for warm starting
    pub accumulated_impulse: f32,
}

impl Constraint {
    /// Build the single normal-direction row for a contact
    #[must_use]
    pub fn contact(contact: &Contact, restitution: f32) -> Self {
        Self {
            local_anchor_a: contact.local_anchor_a,
            local_anchor_b: contact.local_anchor_b,
            axis: contact.normal,
            bias: contact.depth,
            restitution,
            one_sided: true,
            velocity_bias: 0.0,
            jacobian: Jacobian::ZERO,
            accumulated_impulse: 0.0,
        }
    }

    /// Build one axis row of a point-to-point joint
    #[must_use]
    pub fn joint_axis(local_anchor_a: Vec2, local_anchor_b: Vec2, axis: Vec2) -> Self {
        Self {
            local_anchor_a,
            local_anchor_b,
            axis,
            bias: 0.0,
            restitution: 0.0,
            one_sided: false,
            velocity_bias: 0.0,
            jacobian: Jacobian::ZERO,
            accumulated_impulse: 0.0,
        }
    }

    /// Replace contact geometry while keeping the accumulated impulse
    pub fn refresh_contact(&mut self, contact: &Contact) {
        self.local_anchor_a = contact.local_anchor_a;
        self.local_anchor_b = contact.local_anchor_b;
        self.axis = contact.normal;
        self.bias = contact.depth;
    }

    /// Re-linearize the row from current poses; warm-starts by applying the
    /// carried impulse.
    fn prepare(&mut self, a: &mut SolverBody, b: &mut SolverBody) {
        let arm_a = a.arm_world(self.local_anchor_a);
        let arm_b = b.arm_world(self.local_anchor_b);
        self.jacobian = Jacobian::from_axis(self.axis, arm_a, arm_b);

        if self.one_sided {
            // Restitution targets a fraction of the pre-solve approach speed.
            let approach = -self.jacobian.relative_velocity(a, b);
            self.velocity_bias = self.restitution * approach.max(0.0);
        } else {
            // Joint drift: gap between the world anchors along this axis,
            // signed so a positive impulse closes it.
            let gap = b.anchor_world(self.local_anchor_b) - a.anchor_world(self.local_anchor_a);
            self.bias = -gap.dot(self.axis);
            self.velocity_bias = 0.0;
            self.accumulated_impulse = 0.0;
        }

        if self.accumulated_impulse != 0.0 {
            self.jacobian.apply(a, b, self.accumulated_impulse);
        }
    }

    /// One Gauss-Seidel update of this row
    fn solve(&mut self, a: &mut SolverBody, b: &mut SolverBody, inv_dt: f32) {
        let effective_mass = self.jacobian.effective_mass(a, b);
        if effective_mass < MIN_EFFECTIVE_MASS {
            return;
        }

        let jv = self.jacobian.relative_velocity(a, b);
        let target = self.bias * inv_dt + self.velocity_bias;
        let mut impulse = (target - jv) / effective_mass;

        if self.one_sided {
            let total = (self.accumulated_impulse + impulse).max(0.0);
            impulse = total - self.accumulated_impulse;
            self.accumulated_impulse = total;
        } else {
            self.accumulated_impulse += impulse;
        }

        self.jacobian.apply(a, b, impulse);
    }
}

/// One or two constraint rows sharing a body pair.
///
/// Contacts carry one normal row; point-to-point joints carry an X row and a
/// Y row.
#[derive(Clone, Debug)]
pub struct ConstrainedPair {
    /// Canonical pair key (used for sorted lookup and removal)
    pub pair: BodyPair,
    /// The body the rows' A side refers to
    pub body_a: BodyId,
    /// The body the rows' B side refers to
    pub body_b: BodyId,
    /// 1 row (contact) or 2 rows (joint)
    pub constraints: Vec<Constraint>,
}

impl ConstrainedPair {
    /// Contact pair: a single normal row with A = `pair.first`.
    ///
    /// The caller must have produced the contact with the same A/B order.
    #[must_use]
    pub fn contact(pair: BodyPair, contact: &Contact, restitution: f32) -> Self {
        let mut constraints = Vec::with_capacity(1);
        constraints.push(Constraint::contact(contact, restitution));
        Self {
            pair,
            body_a: pair.first,
            body_b: pair.second,
            constraints,
        }
    }

    /// Point-to-point joint pair: X and Y axis rows
    #[must_use]
    pub fn joint(body_a: BodyId, body_b: BodyId, local_anchor_a: Vec2, local_anchor_b: Vec2) -> Self {
        let mut constraints = Vec::with_capacity(2);
        constraints.push(Constraint::joint_axis(local_anchor_a, local_anchor_b, Vec2::X));
        constraints.push(Constraint::joint_axis(local_anchor_a, local_anchor_b, Vec2::Y));
        Self {
            pair: BodyPair::new(body_a, body_b),
            body_a,
            body_b,
            constraints,
        }
    }
}

// ============================================================================
// Solver
// ============================================================================

/// Sequential-impulse solver with a persistent contact set.
///
/// Contacts are kept sorted by pair so refresh and removal are binary
/// searches driven directly by the broad phase's frame classification.
#[derive(Debug, Default)]
pub struct Solver {
    contacts: Vec<ConstrainedPair>,
}

impl Solver {
    /// Create an empty solver
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of active contact pairs
    #[must_use]
    pub fn contact_count(&self) -> usize {
        self.contacts.len()
    }

    /// Insert or refresh the contact for a pair.
    ///
    /// A refresh keeps the accumulated impulse from the previous frame so
    /// resting stacks warm-start instead of re-converging from zero.
    pub fn apply_contact(&mut self, pair: BodyPair, contact: &Contact, restitution: f32) {
        match self.contacts.binary_search_by(|c| c.pair.cmp(&pair)) {
            Ok(index) => {
                let existing = &mut self.contacts[index];
                existing.constraints[0].refresh_contact(contact);
                existing.constraints[0].restitution = restitution;
            }
            Err(index) => {
                self.contacts
                    .insert(index, ConstrainedPair::contact(pair, contact, restitution));
            }
        }
    }

    /// Drop the contact for a pair, if present
    pub fn remove_contact(&mut self, pair: BodyPair) {
        if let Ok(index) = self.contacts.binary_search_by(|c| c.pair.cmp(&pair)) {
            self.contacts.remove(index);
        }
    }

    /// Drop every contact referencing a removed body
    pub fn remove_contacts_involving(&mut self, id: BodyId) {
        self.contacts.retain(|c| !c.pair.contains(id));
    }

    /// Drop all contacts
    pub fn clear(&mut self) {
        self.contacts.clear();
    }

    /// Active contact pairs (sorted by pair key)
    #[must_use]
    pub fn contacts(&self) -> &[ConstrainedPair] {
        &self.contacts
    }

    /// Run the iteration loop over joints and contacts.
    ///
    /// `bodies` is indexed by [`BodyId`]; vacant slots must hold
    /// [`SolverBody::vacant`]. Velocities in `bodies` are updated in place.
    pub fn solve(
        &mut self,
        joints: &mut [ConstrainedPair],
        bodies: &mut [SolverBody],
        dt: f32,
        iterations: u32,
    ) {
        debug_assert!(dt > 0.0, "time step must be positive");
        let inv_dt = 1.0 / dt;

        for joint in joints.iter_mut() {
            prepare_pair(joint, bodies);
        }
        for contact in self.contacts.iter_mut() {
            prepare_pair(contact, bodies);
        }

        for _ in 0..iterations {
            for joint in joints.iter_mut() {
                solve_pair(joint, bodies, inv_dt);
            }
            for contact in self.contacts.iter_mut() {
                solve_pair(contact, bodies, inv_dt);
            }
        }
    }
}

/// Split two distinct body slots out of the snapshot array
fn two_bodies(bodies: &mut [SolverBody], a: BodyId, b: BodyId) -> (&mut SolverBody, &mut SolverBody) {
    debug_assert_ne!(a, b, "constraint needs two distinct bodies");
    if a < b {
        let (head, tail) = bodies.split_at_mut(b);
        (&mut head[a], &mut tail[0])
    } else {
        let (head, tail) = bodies.split_at_mut(a);
        (&mut tail[0], &mut head[b])
    }
}

fn prepare_pair(pair: &mut ConstrainedPair, bodies: &mut [SolverBody]) {
    let (a, b) = two_bodies(bodies, pair.body_a, pair.body_b);
    for constraint in pair.constraints.iter_mut() {
        constraint.prepare(a, b);
    }
}

fn solve_pair(pair: &mut ConstrainedPair, bodies: &mut [SolverBody], inv_dt: f32) {
    let (a, b) = two_bodies(bodies, pair.body_a, pair.body_b);
    for constraint in pair.constraints.iter_mut() {
        constraint.solve(a, b, inv_dt);
    }
}
