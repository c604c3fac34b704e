use crate::binding::{Behaviour, BehaviourContext};
use glam::{EulerRot, Quat, Vec3};
use gravefield_common::{EntityId, Transform};
use gravefield_input::Key;

/// Rotates an entity continuously and from the keyboard.
///
/// Q/E yaw about Z, Left/Right roll about Y, Down/Up pitch about X. With
/// `relative` set the rotation is composed about the entity's local axes,
/// otherwise about the world axes.
#[derive(Debug, Clone)]
pub struct OscillatingMover {
    pub enabled: bool,
    pub relative: bool,
    /// Constant spin in degrees per second about (x, y, z).
    pub spin: Vec3,
    /// Key-driven rotation in degrees per second.
    pub key_rate: f32,
}

impl Default for OscillatingMover {
    fn default() -> Self {
        Self {
            enabled: true,
            relative: false,
            spin: Vec3::ZERO,
            key_rate: 90.0,
        }
    }
}

impl OscillatingMover {
    /// Rotation applied this frame, in degrees per second about (x, y, z).
    pub fn angular_rate(&self, input: &gravefield_input::InputState) -> Vec3 {
        let keys = Vec3::new(
            input.axis(Key::Down, Key::Up),
            input.axis(Key::Left, Key::Right),
            input.axis(Key::Q, Key::E),
        );
        keys * self.key_rate + self.spin
    }

    /// Compose `delta` onto `current` about local or world axes.
    pub fn compose(&self, current: Quat, delta: Quat) -> Quat {
        let rotated = if self.relative {
            current * delta
        } else {
            delta * current
        };
        rotated.normalize()
    }
}

impl Behaviour for OscillatingMover {
    fn update(&mut self, entity: EntityId, ctx: &mut BehaviourContext<'_>) {
        let rate = self.angular_rate(ctx.input) * ctx.dt;
        if rate == Vec3::ZERO {
            return;
        }
        let delta = Quat::from_euler(
            EulerRot::ZYX,
            rate.z.to_radians(),
            rate.y.to_radians(),
            rate.x.to_radians(),
        );
        let transform = ctx.registry.get_mut::<Transform>(entity);
        let rotation = self.compose(transform.rotation_quat(), delta);
        transform.set_local_rotation_quat(rotation);
    }

    fn enabled(&self) -> bool {
        self.enabled
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    fn name(&self) -> &'static str {
        "OscillatingMover"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::{bind, dispatch};
    use gravefield_ecs::Registry;
    use gravefield_input::InputState;

    #[test]
    fn idle_without_keys_or_spin() {
        let mut r = Registry::new();
        let e = r.create();
        let mut t = Transform::default();
        t.set_local_rotation(Vec3::new(90.0, 0.0, -90.0));
        r.emplace(e, t);
        bind::<OscillatingMover>(&mut r, e);
        dispatch(&mut r, &InputState::new(), 0.5);
        assert_eq!(r.get::<Transform>(e).local_rotation(), t.local_rotation());
    }

    #[test]
    fn e_yaws_about_world_z() {
        let mut r = Registry::new();
        let e = r.create();
        r.emplace(e, Transform::default());
        bind::<OscillatingMover>(&mut r, e);
        let mut input = InputState::new();
        input.set_key(Key::E, true);
        dispatch(&mut r, &input, 1.0);
        let q = r.get::<Transform>(e).rotation_quat();
        assert!((q * Vec3::X).abs_diff_eq(Vec3::Y, 1e-4));
    }

    #[test]
    fn relative_composes_about_local_axes() {
        let tilted = Quat::from_rotation_x(90f32.to_radians());
        let yaw = Quat::from_rotation_z(90f32.to_radians());
        let mut mover = OscillatingMover::default();

        let world = mover.compose(tilted, yaw);
        mover.relative = true;
        let local = mover.compose(tilted, yaw);

        // local Z of a tilted object is world -Y, so the two must differ
        assert!(!(world * Vec3::Y).abs_diff_eq(local * Vec3::Y, 1e-3));
        assert!((local * Vec3::X).abs_diff_eq(tilted * Vec3::Y, 1e-4));
        assert!((world * Vec3::X).abs_diff_eq(Vec3::Y, 1e-4));
    }
}
