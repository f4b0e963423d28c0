//! Debug Drawing
//!
//! A sink trait the world pushes overlay geometry into. The engine owns no
//! rendering; whatever implements [`DebugDraw`] (an immediate-mode painter, a
//! test recorder) decides what the primitives become.

use glam::Vec2;

/// Receiver for debug overlay primitives
pub trait DebugDraw {
    /// A line segment in world space
    fn segment(&mut self, from: Vec2, to: Vec2);

    /// A circle outline in world space
    fn circle(&mut self, center: Vec2, radius: f32);

    /// A marker point (joint pivots, contact points)
    fn point(&mut self, position: Vec2);

    /// An axis-aligned box outline given min/max corners
    fn rect(&mut self, min: Vec2, max: Vec2) {
        let a = min;
        let b = Vec2::new(max.x, min.y);
        let c = max;
        let d = Vec2::new(min.x, max.y);
        self.segment(a, b);
        self.segment(b, c);
        self.segment(c, d);
        self.segment(d, a);
    }
}

#[cfg(test)]
pub(crate) mod recorder {
    use super::*;

    #[cfg(not(feature = "std"))]
    use alloc::vec::Vec;

    /// Test sink that counts primitives
    #[derive(Debug, Default)]
    pub struct Recorder {
        pub segments: Vec<(Vec2, Vec2)>,
        pub circles: Vec<(Vec2, f32)>,
        pub points: Vec<Vec2>,
    }

    impl DebugDraw for Recorder {
        fn segment(&mut self, from: Vec2, to: Vec2) {
            self.segments.push((from, to));
        }

        fn circle(&mut self, center: Vec2, radius: f32) {
            self.circles.push((center, radius));
        }

        fn point(&mut self, position: Vec2) {
            self.points.push(position);
        }
    }
}
