use crate::binding::{Behaviour, BehaviourContext};
use glam::{Quat, Vec3};
use gravefield_common::{EntityId, Transform};
use gravefield_input::{Key, MouseButton};
use gravefield_render::Camera;

const MIN_PITCH: f32 = 1.0;
const MAX_PITCH: f32 = 179.0;
const SPRINT_MULTIPLIER: f32 = 3.0;

/// Free-look camera driven by the mouse (right button held) and WASD.
///
/// Orientation is yaw about world +Z and pitch about the local X axis, with
/// pitch 0 looking straight down and 180 straight up. The entity's Transform
/// is rewritten every frame and an attached [`Camera`] is kept in sync.
#[derive(Debug, Clone)]
pub struct CameraControl {
    pub enabled: bool,
    /// Units per second.
    pub move_speed: f32,
    /// Degrees per pixel of mouse motion.
    pub mouse_sensitivity: f32,
    yaw: f32,
    pitch: f32,
    initialized: bool,
}

impl Default for CameraControl {
    fn default() -> Self {
        Self {
            enabled: true,
            move_speed: 4.0,
            mouse_sensitivity: 0.25,
            yaw: 0.0,
            pitch: 90.0,
            initialized: false,
        }
    }
}

impl CameraControl {
    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    /// View direction for the current yaw and pitch.
    pub fn forward(&self) -> Vec3 {
        let (sy, cy) = self.yaw.to_radians().sin_cos();
        let (sp, cp) = self.pitch.to_radians().sin_cos();
        Vec3::new(-sp * sy, sp * cy, -cp)
    }

    fn orientation(&self) -> Quat {
        Quat::from_rotation_z(self.yaw.to_radians()) * Quat::from_rotation_x(self.pitch.to_radians())
    }

    /// Recover yaw and pitch from the transform the camera starts with.
    fn initialize_from(&mut self, transform: &Transform) {
        let forward = transform.rotation_quat() * Vec3::NEG_Z;
        let forward = forward.normalize_or_zero();
        if forward != Vec3::ZERO {
            self.pitch = (-forward.z).clamp(-1.0, 1.0).acos().to_degrees();
            self.yaw = (-forward.x).atan2(forward.y).to_degrees();
        }
        self.pitch = self.pitch.clamp(MIN_PITCH, MAX_PITCH);
        self.initialized = true;
    }
}

impl Behaviour for CameraControl {
    fn update(&mut self, entity: EntityId, ctx: &mut BehaviourContext<'_>) {
        let input = ctx.input;
        let dt = ctx.dt;
        let transform = ctx.registry.get_mut::<Transform>(entity);
        if !self.initialized {
            self.initialize_from(transform);
        }

        if input.is_button_down(MouseButton::Right) {
            let delta = input.mouse_delta() * self.mouse_sensitivity;
            self.yaw = (self.yaw - delta.x).rem_euclid(360.0);
            self.pitch = (self.pitch - delta.y).clamp(MIN_PITCH, MAX_PITCH);
        }

        let forward = self.forward();
        let right = forward.cross(Vec3::Z).normalize_or_zero();
        let mut motion = forward * input.axis(Key::S, Key::W)
            + right * input.axis(Key::A, Key::D)
            + Vec3::Z * input.axis(Key::LeftControl, Key::Space);
        if input.is_key_down(Key::LeftShift) {
            motion *= SPRINT_MULTIPLIER;
        }
        let position = transform.local_position() + motion * self.move_speed * dt;

        transform
            .set_local_position(position)
            .set_local_rotation_quat(self.orientation());

        if let Some(camera) = ctx.registry.try_get_mut::<Camera>(entity) {
            camera.position = position;
            camera.target = position + forward;
        }
    }

    fn enabled(&self) -> bool {
        self.enabled
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    fn name(&self) -> &'static str {
        "CameraControl"
    }
}
