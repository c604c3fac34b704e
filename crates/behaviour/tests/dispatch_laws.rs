use glam::Vec3;
use gravefield_behaviour::{
    Behaviour, BehaviourBinding, BehaviourContext, FollowPath, OscillatingMover, behaviour,
    behaviour_mut, bind, bind_disabled, bind_with, dispatch,
};
use gravefield_common::EntityId;
use gravefield_common::Transform;
use gravefield_ecs::Registry;
use gravefield_input::{InputState, Key};

#[test]
fn path_follower_returns_to_start_after_full_loop() {
    let points = vec![
        Vec3::new(-4.0, -4.0, 0.0),
        Vec3::new(4.0, -4.0, 0.0),
        Vec3::new(4.0, 4.0, 0.0),
        Vec3::new(-4.0, 4.0, 0.0),
    ];
    let mut registry = Registry::new();
    let skeleton = registry.create();
    registry.emplace(skeleton, Transform::from_position(points[0]));
    bind_with(&mut registry, skeleton, FollowPath::new(points.clone(), 2.0));

    let input = InputState::new();
    // four sides of 8 units at 2 units/s
    let dt: f32 = 0.05;
    let frames = (4.0 * 8.0 / 2.0 / dt).round() as usize;
    let mut visited_far_corner = false;
    for _ in 0..frames {
        dispatch(&mut registry, &input, dt);
        let p = registry.get::<Transform>(skeleton).local_position();
        visited_far_corner |= p.distance(points[2]) < 0.05;
    }

    let end = registry.get::<Transform>(skeleton).local_position();
    assert!(visited_far_corner);
    assert!(end.distance(points[0]) < 1e-3, "ended at {end}");
}

#[test]
fn disabled_behaviour_runs_only_after_enabling() {
    let mut registry = Registry::new();
    let tombstone = registry.create();
    registry.emplace(tombstone, Transform::default());
    bind_disabled::<OscillatingMover>(&mut registry, tombstone);

    let mut input = InputState::new();
    input.set_key(Key::E, true);
    for _ in 0..10 {
        assert_eq!(dispatch(&mut registry, &input, 0.1), 0);
    }
    assert_eq!(registry.get::<Transform>(tombstone).local_rotation(), Vec3::ZERO);

    behaviour_mut::<OscillatingMover>(&mut registry, tombstone)
        .unwrap()
        .enabled = true;
    assert_eq!(dispatch(&mut registry, &input, 0.1), 1);
    assert!(registry.get::<Transform>(tombstone).local_rotation().z.abs() > 1.0);
}

#[test]
fn destroyed_entities_are_skipped() {
    let mut registry = Registry::new();
    let a = registry.create();
    registry.emplace(a, Transform::default());
    bind::<OscillatingMover>(&mut registry, a);
    let b = registry.create();
    registry.emplace(b, Transform::default());
    bind::<OscillatingMover>(&mut registry, b);

    registry.destroy(a);
    assert_eq!(dispatch(&mut registry, &InputState::new(), 0.1), 1);
}

/// Switches off the entity's mover and records the binding it saw.
#[derive(Debug, Default)]
struct MoverSwitch {
    seen_len: Option<usize>,
}

impl Behaviour for MoverSwitch {
    fn update(&mut self, entity: EntityId, ctx: &mut BehaviourContext<'_>) {
        self.seen_len = ctx
            .registry
            .try_get::<BehaviourBinding>(entity)
            .map(BehaviourBinding::len);
        if let Some(mover) = behaviour_mut::<OscillatingMover>(ctx.registry, entity) {
            mover.enabled = false;
        }
    }

    fn enabled(&self) -> bool {
        true
    }

    fn set_enabled(&mut self, _enabled: bool) {}

    fn name(&self) -> &'static str {
        "MoverSwitch"
    }
}

#[test]
fn behaviour_can_disable_sibling_on_same_entity() {
    let mut registry = Registry::new();
    let lantern = registry.create();
    registry.emplace(lantern, Transform::default());
    bind::<MoverSwitch>(&mut registry, lantern);
    bind::<OscillatingMover>(&mut registry, lantern);

    let mut input = InputState::new();
    input.set_key(Key::E, true);
    // the mover is switched off before its turn
    assert_eq!(dispatch(&mut registry, &input, 0.1), 1);

    let switch = behaviour::<MoverSwitch>(&registry, lantern).unwrap();
    assert_eq!(switch.seen_len, Some(2));
    assert!(!behaviour::<OscillatingMover>(&registry, lantern).unwrap().enabled);
    assert_eq!(registry.get::<Transform>(lantern).local_rotation(), Vec3::ZERO);
    assert_eq!(registry.get::<BehaviourBinding>(lantern).len(), 2);
}
