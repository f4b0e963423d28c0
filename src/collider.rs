//! Narrow Phase (GJK + EPA)
//!
//! Convex collision detection for pairs that survive the broad phase.
//! Circle-circle uses a closed form; every other shape pairing runs the
//! general support-function path: GJK to detect overlap, then EPA to refine
//! the penetration normal, depth, and witness points.
//!
//! A contact stores its anchors in each body's local frame so the solver can
//! re-derive world-space arms every step as the bodies move, without running
//! collision again.
//!
//! Convention: the contact normal is a world-space unit vector such that
//! resolution pushes body A along `-normal` and body B along `+normal`.

use crate::body::Body;
use crate::shape::Shape;
use glam::Vec2;

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

/// GJK iteration cap
const GJK_MAX_ITERATIONS: usize = 50;
/// GJK convergence epsilon (projection gap along the search direction)
const GJK_EPSILON: f32 = 1e-4;
/// EPA iteration cap
const EPA_MAX_ITERATIONS: usize = 50;
/// EPA convergence tolerance (support improvement along the edge normal)
const EPA_TOLERANCE: f32 = 1e-4;

// ============================================================================
// Contact
// ============================================================================

/// A single contact point between two convex shapes
#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Contact {
    /// Contact anchor in body A's local frame
    pub local_anchor_a: Vec2,
    /// Contact anchor in body B's local frame
    pub local_anchor_b: Vec2,
    /// World-space unit normal; pushes A along `-normal`, B along `+normal`
    pub normal: Vec2,
    /// Penetration depth (strictly positive)
    pub depth: f32,
}

/// Detect collision between two bodies.
///
/// Returns `None` when the shapes are separated or the configuration is
/// degenerate (coincident centers, zero-length normal).
#[must_use]
pub fn collide(body_a: &Body, body_b: &Body) -> Option<Contact> {
    match (&*body_a.shape, &*body_b.shape) {
        (Shape::Circle(a), Shape::Circle(b)) => {
            circle_circle(body_a, a.radius, body_b, b.radius)
        }
        // Boxes and polygons reduce to support queries; circles against
        // anything non-circular take the same path.
        _ => gjk(body_a, body_b),
    }
}

// ============================================================================
// Circle-Circle (closed form)
// ============================================================================

fn circle_circle(body_a: &Body, ra: f32, body_b: &Body, rb: f32) -> Option<Contact> {
    let delta = body_b.position - body_a.position;
    if delta == Vec2::ZERO {
        // Coincident centers; no usable axis.
        return None;
    }

    let distance = delta.length();
    let depth = ra + rb - distance;
    if depth <= 0.0 {
        return None;
    }

    let axis = delta / distance;
    let witness_a = body_a.position + axis * ra;
    let witness_b = body_b.position - axis * rb;

    let normal = witness_a - witness_b;
    if normal == Vec2::ZERO {
        // Surfaces meet at a single shared point; nothing to resolve.
        return None;
    }

    Some(Contact {
        local_anchor_a: body_a.to_local_point(witness_a),
        local_anchor_b: body_b.to_local_point(witness_b),
        normal: normal.normalize(),
        depth,
    })
}

// ============================================================================
// Support queries
// ============================================================================

/// Minkowski-difference vertex with the witness points it came from
#[derive(Clone, Copy, Debug)]
struct SupportPoint {
    /// Point on the Minkowski difference A - B (world space)
    w: Vec2,
    /// Supporting point on A (world space)
    on_a: Vec2,
    /// Supporting point on B (world space)
    on_b: Vec2,
}

/// Farthest point of A - B along `direction`.
///
/// The direction is inverse-rotated into each body's local frame (support
/// functions are translation-invariant); the resulting local points are
/// transformed back with the full body transform.
fn support(body_a: &Body, body_b: &Body, direction: Vec2) -> SupportPoint {
    let local_a = body_a.shape.support_local(body_a.to_local_vector(direction));
    let local_b = body_b.shape.support_local(body_b.to_local_vector(-direction));
    let on_a = body_a.to_world_point(local_a);
    let on_b = body_b.to_world_point(local_b);
    SupportPoint {
        w: on_a - on_b,
        on_a,
        on_b,
    }
}

/// Closest point to the origin on the segment `a`-`b`
fn closest_on_segment(a: Vec2, b: Vec2) -> Vec2 {
    let edge = b - a;
    let len_sq = edge.length_squared();
    if len_sq <= f32::EPSILON {
        return a;
    }
    let t = ((-a).dot(edge) / len_sq).clamp(0.0, 1.0);
    a + edge * t
}

/// Same-sign winding test: does the triangle `a`,`b`,`c` enclose the origin?
///
/// A collinear triangle with the origin on its carrier line zeroes every
/// cross product; that degenerate case encloses nothing.
fn triangle_contains_origin(a: Vec2, b: Vec2, c: Vec2) -> bool {
    let d0 = (b - a).perp_dot(-a);
    let d1 = (c - b).perp_dot(-b);
    let d2 = (a - c).perp_dot(-c);
    if d0 == 0.0 && d1 == 0.0 && d2 == 0.0 {
        return false;
    }
    (d0 >= 0.0 && d1 >= 0.0 && d2 >= 0.0) || (d0 <= 0.0 && d1 <= 0.0 && d2 <= 0.0)
}

// ============================================================================
// GJK
// ============================================================================

/// GJK overlap test; hands the enclosing simplex to EPA on overlap.
fn gjk(body_a: &Body, body_b: &Body) -> Option<Contact> {
    let mut initial = body_b.position - body_a.position;
    if initial == Vec2::ZERO {
        initial = Vec2::X;
    }

    let mut simplex = [
        support(body_a, body_b, initial),
        support(body_a, body_b, -initial),
    ];
    // Search direction points from the origin toward the simplex edge.
    let mut direction = closest_on_segment(simplex[0].w, simplex[1].w);

    for _ in 0..GJK_MAX_ITERATIONS {
        if direction == Vec2::ZERO {
            // Origin lies on the simplex segment itself.
            return overlap_on_segment(body_a, body_b, simplex);
        }

        let new = support(body_a, body_b, -direction);

        // A support that fails to expand the simplex cannot pass the origin,
        // and it would collapse the containment test below to a zero-area
        // triangle. The shapes are separated.
        if new.w == simplex[0].w || new.w == simplex[1].w {
            return None;
        }

        if triangle_contains_origin(simplex[0].w, simplex[1].w, new.w) {
            return epa(body_a, body_b, [simplex[0], simplex[1], new]);
        }

        // No progress toward the origin means the closest feature converged
        // and the shapes are separated.
        let axis = direction.normalize();
        let gap = simplex[0].w.dot(axis).min(simplex[1].w.dot(axis)) - new.w.dot(axis);
        if gap < GJK_EPSILON {
            return None;
        }

        // Keep whichever sub-edge passes closer to the origin.
        let toward_0 = closest_on_segment(simplex[0].w, new.w);
        let toward_1 = closest_on_segment(simplex[1].w, new.w);
        if toward_0.length_squared() < toward_1.length_squared() {
            simplex[1] = new;
            direction = toward_0;
        } else {
            simplex[0] = new;
            direction = toward_1;
        }
    }

    None
}

/// Origin on the current GJK segment: decide touching versus penetration.
///
/// The segment is a chord of the Minkowski difference, so an origin strictly
/// between its endpoints means the shapes overlap even though no search
/// direction is left (equal-height boxes stacked on an axis hit this every
/// frame). A third support perpendicular to the segment rebuilds a simplex
/// EPA can expand. An origin at an endpoint is surface-on-surface touching
/// with nothing to resolve.
fn overlap_on_segment(
    body_a: &Body,
    body_b: &Body,
    simplex: [SupportPoint; 2],
) -> Option<Contact> {
    let edge = simplex[1].w - simplex[0].w;
    if edge.length_squared() <= f32::EPSILON {
        return None;
    }
    let axis = edge.normalize();
    if simplex[0].w.dot(axis) * simplex[1].w.dot(axis) >= 0.0 {
        // Endpoints do not straddle the origin: it sits at an endpoint.
        return None;
    }

    let perp = Vec2::new(-edge.y, edge.x).normalize();
    for side in [perp, -perp] {
        let third = support(body_a, body_b, side);
        if third.w.dot(perp).abs() > GJK_EPSILON {
            return epa(body_a, body_b, [simplex[0], simplex[1], third]);
        }
    }
    // The whole difference is flat along the segment; touching, not overlap.
    None
}

// ============================================================================
// EPA
// ============================================================================

/// Outward normal and origin distance of the CCW polytope edge `a` -> `b`
fn edge_normal(a: Vec2, b: Vec2) -> Option<(Vec2, f32)> {
    let edge = b - a;
    if edge.length_squared() <= f32::EPSILON {
        return None;
    }
    // Right perpendicular points outward for a CCW winding.
    let normal = Vec2::new(edge.y, -edge.x).normalize();
    Some((normal, normal.dot(a)))
}

/// Expand the enclosing simplex until the closest polytope edge stops
/// improving, then derive the contact from that edge.
fn epa(body_a: &Body, body_b: &Body, simplex: [SupportPoint; 3]) -> Option<Contact> {
    let mut polytope: Vec<SupportPoint> = Vec::with_capacity(8);
    polytope.extend_from_slice(&simplex);

    // Fix the winding to CCW so every edge's right perpendicular faces out.
    let area = (polytope[1].w - polytope[0].w).perp_dot(polytope[2].w - polytope[0].w);
    if area < 0.0 {
        polytope.swap(1, 2);
    }

    for _ in 0..EPA_MAX_ITERATIONS {
        // Edge with the smallest perpendicular distance from the origin.
        let mut best_edge = usize::MAX;
        let mut best_normal = Vec2::ZERO;
        let mut best_distance = f32::MAX;
        for i in 0..polytope.len() {
            let j = (i + 1) % polytope.len();
            if let Some((normal, distance)) = edge_normal(polytope[i].w, polytope[j].w) {
                if distance < best_distance {
                    best_edge = i;
                    best_normal = normal;
                    best_distance = distance;
                }
            }
        }
        if best_edge == usize::MAX {
            return None;
        }

        let new = support(body_a, body_b, best_normal);
        if new.w.dot(best_normal) - best_distance < EPA_TOLERANCE {
            return contact_from_edge(
                body_a,
                body_b,
                polytope[best_edge],
                polytope[(best_edge + 1) % polytope.len()],
                best_normal,
                best_distance,
            );
        }
        polytope.insert(best_edge + 1, new);
    }

    // Iteration cap hit; use the best edge found so far.
    let mut best_edge = usize::MAX;
    let mut best_normal = Vec2::ZERO;
    let mut best_distance = f32::MAX;
    for i in 0..polytope.len() {
        let j = (i + 1) % polytope.len();
        if let Some((normal, distance)) = edge_normal(polytope[i].w, polytope[j].w) {
            if distance < best_distance {
                best_edge = i;
                best_normal = normal;
                best_distance = distance;
            }
        }
    }
    if best_edge == usize::MAX {
        return None;
    }
    contact_from_edge(
        body_a,
        body_b,
        polytope[best_edge],
        polytope[(best_edge + 1) % polytope.len()],
        best_normal,
        best_distance,
    )
}

/// Interpolate witness points along the converged edge and emit the contact
fn contact_from_edge(
    body_a: &Body,
    body_b: &Body,
    a: SupportPoint,
    b: SupportPoint,
    normal: Vec2,
    distance: f32,
) -> Option<Contact> {
    if distance <= 0.0 {
        // Origin not strictly inside the polytope: no penetration to report,
        // and negating would flip the normal onto the wrong side.
        return None;
    }

    let edge = b.w - a.w;
    let len_sq = edge.length_squared();
    let t = if len_sq <= f32::EPSILON {
        0.0
    } else {
        ((-a.w).dot(edge) / len_sq).clamp(0.0, 1.0)
    };

    let point_a = a.on_a.lerp(b.on_a, t);
    let point_b = a.on_b.lerp(b.on_b, t);

    Some(Contact {
        local_anchor_a: body_a.to_local_point(point_a),
        local_anchor_b: body_b.to_local_point(point_b),
        normal,
        depth: distance,
    })
}
