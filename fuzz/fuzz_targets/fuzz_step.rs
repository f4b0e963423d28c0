#![no_main]
use arbitrary::Arbitrary;
use glam::Vec2;
use libfuzzer_sys::fuzz_target;
use rigid2d::prelude::*;

#[derive(Debug, Arbitrary, Clone, Copy)]
enum FuzzShape {
    Circle { radius: u8 },
    Rect { hx: u8, hy: u8 },
}

impl FuzzShape {
    fn build(self) -> Shape {
        match self {
            // Keep dimensions strictly positive
            FuzzShape::Circle { radius } => Shape::circle(f32::from(radius) + 1.0),
            FuzzShape::Rect { hx, hy } => {
                Shape::rect(Vec2::new(f32::from(hx) + 1.0, f32::from(hy) + 1.0))
            }
        }
    }
}

#[derive(Debug, Arbitrary)]
struct FuzzBody {
    shape: FuzzShape,
    x: i16,
    y: i16,
    vx: i8,
    vy: i8,
    kind: u8,
    collidable: bool,
}

#[derive(Debug, Arbitrary)]
struct FuzzInput {
    bodies: Vec<FuzzBody>,
    /// Indices removed after the first half of the steps
    removals: Vec<u8>,
    step_count: u8,
}

// Build a world from arbitrary bodies, step it, remove some bodies, and step
// again. Must never panic regardless of input.
fuzz_target!(|input: FuzzInput| {
    let mut world = World::new(WorldConfig::default());

    let mut ids = Vec::new();
    for spec in input.bodies.iter().take(16) {
        let motion_type = match spec.kind % 3 {
            0 => MotionType::Dynamic,
            1 => MotionType::Static,
            _ => MotionType::Keyframe,
        };
        let mut def = BodyDef::new("fuzz", spec.shape.build())
            .with_motion_type(motion_type)
            .with_position(Vec2::new(f32::from(spec.x), f32::from(spec.y)))
            .with_velocity(Vec2::new(f32::from(spec.vx), f32::from(spec.vy)));
        if !spec.collidable {
            def = def.non_collidable();
        }
        ids.push(world.add_body(&def));
    }

    let steps = usize::from(input.step_count).min(32);
    for _ in 0..steps / 2 {
        world.step();
    }

    for &index in input.removals.iter().take(8) {
        if let Some(&id) = ids.get(usize::from(index) % ids.len().max(1)) {
            world.remove_body(id);
        }
    }

    for _ in steps / 2..steps {
        world.step();
    }
    let _ = world.drain_contact_events();
});
