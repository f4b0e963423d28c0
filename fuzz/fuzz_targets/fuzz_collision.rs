#![no_main]
use arbitrary::Arbitrary;
use glam::Vec2;
use libfuzzer_sys::fuzz_target;
use rigid2d::prelude::*;

#[derive(Debug, Arbitrary)]
struct CollisionInput {
    // i8 positions keep the bodies close together so overlap is common,
    // including exactly coincident centers
    x1: i8,
    y1: i8,
    x2: i8,
    y2: i8,
    r1: u8,
    r2: u8,
    use_boxes: bool,
    steps: u8,
}

// Place two bodies at potentially overlapping (or identical) positions and
// step. Degenerate geometry must yield "no contact", never a panic.
fuzz_target!(|input: CollisionInput| {
    let shape = |r: u8| {
        if input.use_boxes {
            Shape::rect(Vec2::splat(f32::from(r) + 1.0))
        } else {
            Shape::circle(f32::from(r) + 1.0)
        }
    };

    let mut world = World::new(WorldConfig::default());
    let a = world.add_body(
        &BodyDef::new("a", shape(input.r1))
            .with_position(Vec2::new(f32::from(input.x1), f32::from(input.y1))),
    );
    let b = world.add_body(
        &BodyDef::new("b", shape(input.r2))
            .with_position(Vec2::new(f32::from(input.x2), f32::from(input.y2))),
    );

    // Direct narrow-phase query on the raw placement
    let _ = collide(world.get_body(a).unwrap(), world.get_body(b).unwrap());

    let steps = usize::from(input.steps).min(64);
    for _ in 0..steps {
        world.step();
    }

    // Positions must stay finite whatever the overlap configuration was
    for (_, body) in world.bodies() {
        assert!(body.position.is_finite(), "position diverged: {:?}", body.position);
    }
});
