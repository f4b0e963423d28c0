//! Convex Collision Shapes
//!
//! Immutable local-space geometry attached to rigid bodies. The shape set is
//! closed (circle, box, convex polygon) and dispatched exhaustively, so it is
//! a tagged enum rather than an open trait object.
//!
//! Every variant answers four questions:
//!
//! - mass and rotational inertia for a uniform density
//! - whether a local-space point is inside the shape
//! - the supporting vertex along a local-space direction (GJK support)
//! - the axis-aligned bounds for a given rotation

use crate::aabb::Aabb;
use glam::Vec2;

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

/// Discriminant for shape-pair dispatch
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ShapeType {
    /// Circle with a radius
    Circle,
    /// Axis-aligned box (in local space) with half-extents
    Box,
    /// Convex polygon with a precomputed winding
    Convex,
}

/// Circle centered at the local origin
#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Circle {
    /// Circle radius (must be positive)
    pub radius: f32,
}

impl Circle {
    /// Create a new circle
    #[inline]
    #[must_use]
    pub const fn new(radius: f32) -> Self {
        Self { radius }
    }
}

/// Box centered at the local origin
#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoxShape {
    /// Half-extents along the local axes (must be positive)
    pub half_extents: Vec2,
}

impl BoxShape {
    /// Create a new box from half-extents
    #[inline]
    #[must_use]
    pub const fn new(half_extents: Vec2) -> Self {
        Self { half_extents }
    }
}

/// Convex polygon with a precomputed cyclic winding.
///
/// Vertices may be supplied in any order; construction builds a
/// counter-clockwise winding by a greedy gift-wrap walk ("most
/// counter-clockwise next edge") starting from the leftmost vertex. The
/// winding is what point-containment and the mass integrals iterate over.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConvexPolygon {
    /// Polygon vertices in local space (order as supplied)
    pub vertices: Vec<Vec2>,
    /// Indices into `vertices` forming a CCW cycle
    pub winding: Vec<u32>,
}

impl ConvexPolygon {
    /// Build a convex polygon from at least 3 vertices.
    ///
    /// The vertices are assumed to be the hull points of a convex set;
    /// interior or duplicate points are dropped from the winding.
    #[must_use]
    pub fn new(vertices: Vec<Vec2>) -> Self {
        debug_assert!(vertices.len() >= 3, "convex polygon needs >= 3 vertices");
        let winding = build_winding(&vertices);
        Self { vertices, winding }
    }

    /// Iterate the winding as consecutive vertex pairs (each directed edge)
    pub(crate) fn edges(&self) -> impl Iterator<Item = (Vec2, Vec2)> + '_ {
        let n = self.winding.len();
        (0..n).map(move |i| {
            let a = self.vertices[self.winding[i] as usize];
            let b = self.vertices[self.winding[(i + 1) % n] as usize];
            (a, b)
        })
    }
}

/// Greedy gift-wrap walk: from the leftmost vertex, repeatedly pick the
/// candidate that every other vertex lies to the left of, producing a CCW
/// cycle of indices.
fn build_winding(vertices: &[Vec2]) -> Vec<u32> {
    let mut start = 0usize;
    for (i, v) in vertices.iter().enumerate() {
        let s = vertices[start];
        if v.x < s.x || (v.x == s.x && v.y < s.y) {
            start = i;
        }
    }

    let mut winding = Vec::with_capacity(vertices.len());
    let mut current = start;
    loop {
        winding.push(current as u32);
        let mut next = (current + 1) % vertices.len();
        for (i, v) in vertices.iter().enumerate() {
            if i == current {
                continue;
            }
            let edge = vertices[next] - vertices[current];
            let to_v = *v - vertices[current];
            // Pick the most counter-clockwise candidate; on ties take the
            // farther one so collinear midpoints are skipped.
            let cross = edge.perp_dot(to_v);
            if cross < 0.0 || (cross == 0.0 && to_v.length_squared() > edge.length_squared()) {
                next = i;
            }
        }
        current = next;
        if current == start {
            break;
        }
        // A duplicate-heavy input cannot loop longer than the vertex count
        if winding.len() >= vertices.len() {
            break;
        }
    }
    winding
}

/// Closed set of convex shapes
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Shape {
    /// Circle variant
    Circle(Circle),
    /// Box variant
    Box(BoxShape),
    /// Convex polygon variant
    Convex(ConvexPolygon),
}

impl Shape {
    /// Create a circle shape
    #[inline]
    #[must_use]
    pub const fn circle(radius: f32) -> Self {
        Self::Circle(Circle::new(radius))
    }

    /// Create a box shape from half-extents
    #[inline]
    #[must_use]
    pub const fn rect(half_extents: Vec2) -> Self {
        Self::Box(BoxShape::new(half_extents))
    }

    /// Create a convex polygon shape
    #[must_use]
    pub fn convex(vertices: Vec<Vec2>) -> Self {
        Self::Convex(ConvexPolygon::new(vertices))
    }

    /// Shape discriminant used for narrow-phase dispatch
    #[inline]
    #[must_use]
    pub fn shape_type(&self) -> ShapeType {
        match self {
            Shape::Circle(_) => ShapeType::Circle,
            Shape::Box(_) => ShapeType::Box,
            Shape::Convex(_) => ShapeType::Convex,
        }
    }

    /// Mass for a uniform density (area * density)
    #[must_use]
    pub fn mass(&self, density: f32) -> f32 {
        match self {
            Shape::Circle(c) => core::f32::consts::PI * c.radius * c.radius * density,
            Shape::Box(b) => 4.0 * b.half_extents.x * b.half_extents.y * density,
            Shape::Convex(p) => polygon_area(p) * density,
        }
    }

    /// Rotational inertia about the local origin for a uniform density.
    ///
    /// Circle: `m r^2 / 2`. Box: `m (w^2 + h^2) / 12`. Polygon: second polar
    /// moment of area via the standard edge-sum formula.
    #[must_use]
    pub fn inertia(&self, density: f32) -> f32 {
        match self {
            Shape::Circle(c) => {
                let m = self.mass(density);
                0.5 * m * c.radius * c.radius
            }
            Shape::Box(b) => {
                let m = self.mass(density);
                let w = 2.0 * b.half_extents.x;
                let h = 2.0 * b.half_extents.y;
                m * (w * w + h * h) / 12.0
            }
            Shape::Convex(p) => polygon_inertia(p, density),
        }
    }

    /// Check whether a local-space point is inside the shape
    #[must_use]
    pub fn contains_local_point(&self, point: Vec2) -> bool {
        match self {
            Shape::Circle(c) => point.length_squared() <= c.radius * c.radius,
            Shape::Box(b) => {
                let d = point.abs();
                d.x <= b.half_extents.x && d.y <= b.half_extents.y
            }
            // CCW winding: inside iff the point is on the left of every edge
            Shape::Convex(p) => p.edges().all(|(a, b)| (b - a).perp_dot(point - a) >= 0.0),
        }
    }

    /// Supporting point along a local-space direction (GJK support function).
    ///
    /// The direction need not be normalized. A zero direction falls back to
    /// an arbitrary extreme point; GJK never queries with one.
    #[must_use]
    pub fn support_local(&self, direction: Vec2) -> Vec2 {
        match self {
            Shape::Circle(c) => {
                let d = direction.normalize_or_zero();
                if d == Vec2::ZERO {
                    Vec2::new(c.radius, 0.0)
                } else {
                    d * c.radius
                }
            }
            Shape::Box(b) => Vec2::new(
                if direction.x >= 0.0 {
                    b.half_extents.x
                } else {
                    -b.half_extents.x
                },
                if direction.y >= 0.0 {
                    b.half_extents.y
                } else {
                    -b.half_extents.y
                },
            ),
            Shape::Convex(p) => {
                let mut best = p.vertices[0];
                let mut best_dot = best.dot(direction);
                for &v in &p.vertices[1..] {
                    let d = v.dot(direction);
                    if d > best_dot {
                        best = v;
                        best_dot = d;
                    }
                }
                best
            }
        }
    }

    /// Axis-aligned bounds of the shape rotated by `rotation`, centered at
    /// the local origin (translation is applied by the caller).
    #[must_use]
    pub fn local_aabb(&self, rotation: f32) -> Aabb {
        match self {
            Shape::Circle(c) => Aabb::new(Vec2::ZERO, Vec2::splat(c.radius)),
            Shape::Box(b) => {
                let (sin, cos) = {
                    let r = Vec2::from_angle(rotation);
                    (r.y.abs(), r.x.abs())
                };
                let half = Vec2::new(
                    cos * b.half_extents.x + sin * b.half_extents.y,
                    sin * b.half_extents.x + cos * b.half_extents.y,
                );
                Aabb::new(Vec2::ZERO, half)
            }
            Shape::Convex(p) => {
                let rot = Vec2::from_angle(rotation);
                let mut min = Vec2::splat(f32::MAX);
                let mut max = Vec2::splat(f32::MIN);
                for &v in &p.vertices {
                    let w = rot.rotate(v);
                    min = min.min(w);
                    max = max.max(w);
                }
                Aabb::from_min_max(min, max)
            }
        }
    }
}

/// Signed area of the polygon winding (positive for CCW)
fn polygon_area(p: &ConvexPolygon) -> f32 {
    let mut area = 0.0;
    for (a, b) in p.edges() {
        area += a.perp_dot(b);
    }
    area * 0.5
}

/// Second polar moment about the local origin, times density
fn polygon_inertia(p: &ConvexPolygon, density: f32) -> f32 {
    let mut sum = 0.0;
    for (a, b) in p.edges() {
        let cross = a.perp_dot(b);
        sum += cross * (a.dot(a) + a.dot(b) + b.dot(b));
    }
    density * sum / 12.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[cfg(not(feature = "std"))]
    use alloc::vec;

    fn square(half: f32) -> Vec<Vec2> {
        vec![
            Vec2::new(-half, -half),
            Vec2::new(half, -half),
            Vec2::new(half, half),
            Vec2::new(-half, half),
        ]
    }

    #[test]
    fn test_winding_is_ccw() {
        // Shuffled vertex order must still produce a CCW cycle
        let p = ConvexPolygon::new(vec![
            Vec2::new(1.0, 1.0),
            Vec2::new(-1.0, -1.0),
            Vec2::new(-1.0, 1.0),
            Vec2::new(1.0, -1.0),
        ]);
        assert_eq!(p.winding.len(), 4);
        let area: f32 = p.edges().map(|(a, b)| a.perp_dot(b)).sum();
        assert!(area > 0.0, "winding should be counter-clockwise");
    }

    #[test]
    fn test_winding_starts_leftmost() {
        let p = ConvexPolygon::new(vec![
            Vec2::new(3.0, 0.0),
            Vec2::new(0.0, 4.0),
            Vec2::new(-2.0, 1.0),
        ]);
        assert_eq!(p.vertices[p.winding[0] as usize], Vec2::new(-2.0, 1.0));
    }

    #[test]
    fn test_mass_positive_for_all_variants() {
        let shapes = [
            Shape::circle(5.0),
            Shape::rect(Vec2::new(3.0, 2.0)),
            Shape::convex(square(2.0)),
        ];
        for shape in &shapes {
            assert!(shape.mass(1.0) > 0.0, "mass must be positive: {shape:?}");
            assert!(shape.inertia(1.0) > 0.0, "inertia must be positive: {shape:?}");
        }
    }

    #[test]
    fn test_circle_mass_inertia() {
        let c = Shape::circle(2.0);
        assert_relative_eq!(c.mass(1.0), core::f32::consts::PI * 4.0, epsilon = 1e-4);
        // I = m r^2 / 2
        assert_relative_eq!(c.inertia(1.0), c.mass(1.0) * 2.0, epsilon = 1e-3);
    }

    #[test]
    fn test_box_and_square_polygon_agree() {
        // A square expressed as a box and as a convex polygon must have the
        // same area and inertia.
        let as_box = Shape::rect(Vec2::splat(2.0));
        let as_poly = Shape::convex(square(2.0));
        assert_relative_eq!(as_box.mass(1.0), as_poly.mass(1.0), epsilon = 1e-4);
        assert_relative_eq!(as_box.inertia(1.0), as_poly.inertia(1.0), epsilon = 1e-2);
    }

    #[test]
    fn test_contains_point() {
        let c = Shape::circle(1.0);
        assert!(c.contains_local_point(Vec2::new(0.5, 0.5)));
        assert!(!c.contains_local_point(Vec2::new(1.0, 1.0)));

        let b = Shape::rect(Vec2::new(2.0, 1.0));
        assert!(b.contains_local_point(Vec2::new(1.9, -0.9)));
        assert!(!b.contains_local_point(Vec2::new(0.0, 1.1)));

        let p = Shape::convex(square(1.0));
        assert!(p.contains_local_point(Vec2::ZERO));
        assert!(p.contains_local_point(Vec2::new(0.99, 0.99)));
        assert!(!p.contains_local_point(Vec2::new(1.5, 0.0)));
    }

    #[test]
    fn test_support_extremes() {
        let b = Shape::rect(Vec2::new(2.0, 1.0));
        assert_eq!(b.support_local(Vec2::new(1.0, 1.0)), Vec2::new(2.0, 1.0));
        assert_eq!(b.support_local(Vec2::new(-1.0, 0.5)), Vec2::new(-2.0, 1.0));

        let c = Shape::circle(3.0);
        let s = c.support_local(Vec2::new(0.0, -2.0));
        assert_relative_eq!(s.y, -3.0, epsilon = 1e-6);

        let p = Shape::convex(square(1.0));
        assert_eq!(p.support_local(Vec2::new(1.0, 1.0)), Vec2::new(1.0, 1.0));
    }

    #[test]
    fn test_rotated_box_aabb_grows() {
        let b = Shape::rect(Vec2::new(2.0, 1.0));
        let axis_aligned = b.local_aabb(0.0);
        assert_relative_eq!(axis_aligned.half_extents.x, 2.0, epsilon = 1e-6);

        // 45 degrees: both half-extents become (2+1)/sqrt(2)
        let rotated = b.local_aabb(core::f32::consts::FRAC_PI_4);
        let expected = 3.0 / core::f32::consts::SQRT_2;
        assert_relative_eq!(rotated.half_extents.x, expected, epsilon = 1e-4);
        assert_relative_eq!(rotated.half_extents.y, expected, epsilon = 1e-4);
    }

    #[test]
    fn test_convex_aabb_tracks_rotation() {
        let p = Shape::convex(square(1.0));
        let aabb = p.local_aabb(core::f32::consts::FRAC_PI_4);
        assert_relative_eq!(aabb.half_extents.x, core::f32::consts::SQRT_2, epsilon = 1e-4);
    }
}
