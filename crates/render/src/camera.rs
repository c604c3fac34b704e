use glam::{Mat4, Vec3};

/// Camera component: projection parameters plus position and look target.
///
/// The view matrix normally comes from the camera entity's world matrix;
/// `position` and `target` are kept in sync by the camera control behaviour.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    pub up: Vec3,
    pub target: Vec3,
    pub fov_degrees: f32,
    pub ortho_height: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub orthographic: bool,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 3.0, 3.0),
            up: Vec3::Z,
            target: Vec3::ZERO,
            fov_degrees: 90.0,
            ortho_height: 3.0,
            aspect: 16.0 / 9.0,
            near: 0.01,
            far: 1000.0,
            orthographic: false,
        }
    }
}

impl Camera {
    pub fn set_aspect(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    pub fn toggle_ortho(&mut self) -> bool {
        self.orthographic = !self.orthographic;
        self.orthographic
    }

    pub fn projection(&self) -> Mat4 {
        if self.orthographic {
            let half_h = self.ortho_height * 0.5;
            let half_w = half_h * self.aspect;
            Mat4::orthographic_rh(-half_w, half_w, -half_h, half_h, self.near, self.far)
        } else {
            Mat4::perspective_rh(self.fov_degrees.to_radians(), self.aspect, self.near, self.far)
        }
    }

    /// View from `position` toward `target`, for cameras without a transform.
    pub fn look_at_view(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    pub fn forward(&self) -> Vec3 {
        (self.target - self.position).normalize_or_zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_camera() {
        let cam = Camera::default();
        assert_eq!(cam.fov_degrees, 90.0);
        assert_eq!(cam.ortho_height, 3.0);
        let vp = cam.projection() * cam.look_at_view();
        assert!(!vp.col(0).x.is_nan());
    }

    #[test]
    fn toggle_switches_projection() {
        let mut cam = Camera::default();
        let perspective = cam.projection();
        assert!(cam.toggle_ortho());
        let ortho = cam.projection();
        assert_ne!(perspective, ortho);
        // orthographic projections keep w = 1
        assert_eq!(ortho.w_axis.w, 1.0);
        assert!(!cam.toggle_ortho());
        assert_eq!(cam.projection(), perspective);
    }

    #[test]
    fn zero_height_aspect_is_ignored() {
        let mut cam = Camera::default();
        cam.set_aspect(800, 0);
        assert_eq!(cam.aspect, 16.0 / 9.0);
        cam.set_aspect(800, 400);
        assert_eq!(cam.aspect, 2.0);
    }
}
