// Fixed look-at camera for the gasket scene
//
// Camera model:
//   - Eye on the +Z axis looking at the origin, +Y up
//   - Perspective projection, 60° vertical field of view
//   - Nothing moves; only the aspect ratio follows the window

use glam::{Mat4, Vec3};

pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,

    /// Vertical field of view in radians
    pub fov: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

impl Camera {
    pub fn new() -> Self {
        Self {
            eye: Vec3::new(0.0, 0.0, 4.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov: std::f32::consts::FRAC_PI_3,
            near: 1.0,
            far: 100.0,
        }
    }

    /// View matrix: looks from the eye toward the target.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }

    /// Perspective projection matrix. A degenerate aspect (zero-height window) falls back to 1.
    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        let aspect = if aspect.is_finite() && aspect > 0.0 { aspect } else { 1.0 };
        Mat4::perspective_rh(self.fov, aspect, self.near, self.far)
    }

    /// Combined view-projection matrix ready to upload to the GPU.
    pub fn view_projection(&self, aspect: f32) -> Mat4 {
        self.projection_matrix(aspect) * self.view_matrix()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_projects_to_screen_centre() {
        let camera = Camera::new();
        let clip = camera.view_projection(16.0 / 9.0) * camera.target.extend(1.0);
        let ndc = clip.truncate() / clip.w;
        assert!(ndc.x.abs() < 1e-6 && ndc.y.abs() < 1e-6);
        assert!(ndc.z > 0.0 && ndc.z < 1.0);
    }

    #[test]
    fn eye_maps_to_view_origin() {
        let camera = Camera::new();
        let eye = camera.view_matrix().transform_point3(camera.eye);
        assert!(eye.length() < 1e-6);
    }

    #[test]
    fn zero_aspect_falls_back() {
        let camera = Camera::new();
        assert_eq!(camera.projection_matrix(f32::NAN), camera.projection_matrix(1.0));
        assert_eq!(camera.projection_matrix(0.0), camera.projection_matrix(1.0));
    }
}
