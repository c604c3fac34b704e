use glam::{EulerRot, Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Identifier for an entity in the scene registry.
///
/// The index addresses the registry's component arrays; the generation
/// distinguishes a live entity from an earlier one that reused its slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId {
    index: u32,
    generation: u32,
}

impl EntityId {
    pub const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    pub const fn index(self) -> u32 {
        self.index
    }

    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}v{}", self.index, self.generation)
    }
}

/// Spatial transform: local position, Euler rotation (degrees), scale, and a
/// cached world matrix.
///
/// Setters only touch the local fields. The world matrix is recomputed by
/// [`Transform::update_world_matrix`] (or the parented variant) once per
/// frame, before anything reads it for rendering.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    position: Vec3,
    /// Euler angles in degrees, applied X first, then Y, then Z.
    rotation: Vec3,
    scale: Vec3,
    world: Mat4,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
            world: Mat4::IDENTITY,
        }
    }
}

impl Transform {
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    pub fn set_local_position(&mut self, position: Vec3) -> &mut Self {
        self.position = position;
        self
    }

    /// Set the rotation as Euler angles in degrees.
    pub fn set_local_rotation(&mut self, degrees: Vec3) -> &mut Self {
        self.rotation = degrees;
        self
    }

    /// Set the rotation from a quaternion, stored back as Euler degrees.
    pub fn set_local_rotation_quat(&mut self, rotation: Quat) -> &mut Self {
        let (z, y, x) = rotation.to_euler(EulerRot::ZYX);
        self.rotation = Vec3::new(x.to_degrees(), y.to_degrees(), z.to_degrees());
        self
    }

    /// Zero or negative components are accepted and yield degenerate geometry.
    pub fn set_local_scale(&mut self, scale: Vec3) -> &mut Self {
        self.scale = scale;
        self
    }

    pub fn local_position(&self) -> Vec3 {
        self.position
    }

    pub fn local_rotation(&self) -> Vec3 {
        self.rotation
    }

    pub fn local_scale(&self) -> Vec3 {
        self.scale
    }

    /// Local rotation as a quaternion.
    pub fn rotation_quat(&self) -> Quat {
        let r = self.rotation;
        Quat::from_euler(
            EulerRot::ZYX,
            r.z.to_radians(),
            r.y.to_radians(),
            r.x.to_radians(),
        )
    }

    /// Orient the transform so its local -Z axis faces `target`.
    ///
    /// Leaves the rotation untouched when `target` coincides with the
    /// position or is collinear with `up`.
    pub fn look_at(&mut self, target: Vec3, up: Vec3) -> &mut Self {
        let forward = target - self.position;
        if forward.length_squared() <= f32::EPSILON
            || forward.normalize().cross(up.normalize()).length_squared() <= f32::EPSILON
        {
            return self;
        }
        let view = Mat4::look_at_rh(self.position, target, up);
        let (_, rotation, _) = view.inverse().to_scale_rotation_translation();
        self.set_local_rotation_quat(rotation)
    }

    /// Matrix built from the local fields: scale, then rotate, then translate.
    pub fn local_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation_quat(), self.position)
    }

    /// Recompute the cached world matrix for an unparented transform.
    pub fn update_world_matrix(&mut self) {
        self.world = self.local_matrix();
    }

    /// Recompute the cached world matrix under a parent's world matrix.
    pub fn update_world_matrix_with_parent(&mut self, parent_world: Mat4) {
        self.world = parent_world * self.local_matrix();
    }

    /// The cached world matrix as of the last refresh.
    pub fn local_transform(&self) -> Mat4 {
        self.world
    }

    /// World-space position from the cached world matrix.
    pub fn world_position(&self) -> Vec3 {
        self.world.w_axis.truncate()
    }
}
