use glam::{Mat4, Vec3, Vec4};

use crate::projector::raycast::Ray;

/// Pixel size of the surface pointer positions are measured against.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn is_valid(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }

    pub fn aspect(&self) -> f32 {
        self.width / self.height
    }

    /// Pointer position to normalized device coordinates, y up.
    pub fn to_ndc(&self, x: f32, y: f32) -> (f32, f32) {
        ((x / self.width) * 2.0 - 1.0, -(y / self.height) * 2.0 + 1.0)
    }
}

pub const MIN_DISTANCE: f32 = 2.0;
pub const MAX_DISTANCE: f32 = 8.0;
pub const MIN_POLAR: f32 = std::f32::consts::FRAC_PI_4;
pub const MAX_POLAR: f32 = std::f32::consts::PI / 1.5;

/// Orbit camera around a target, parameterized by azimuth and polar angle (from +Y).
#[derive(Clone, Debug, PartialEq)]
pub struct OrbitCamera {
    pub target: Vec3,
    pub distance: f32,
    pub azimuth: f32,
    pub polar: f32,
    /// Vertical field of view (radians)
    pub fov: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::new()
    }
}

impl OrbitCamera {
    /// Looking at the origin from `(0, 0, 4)`.
    pub fn new() -> Self {
        Self {
            target: Vec3::ZERO,
            distance: 4.0,
            azimuth: 0.0,
            polar: std::f32::consts::FRAC_PI_2,
            fov: 45.0_f32.to_radians(),
        }
    }

    /// Rotate by angle deltas in radians; the polar angle stays within its limits.
    pub fn rotate(&mut self, d_azimuth: f32, d_polar: f32) {
        if d_azimuth.is_finite() {
            self.azimuth += d_azimuth;
        }
        if d_polar.is_finite() {
            self.polar = (self.polar + d_polar).clamp(MIN_POLAR, MAX_POLAR);
        }
    }

    /// Multiply the distance by `factor` (< 1 zooms in).
    pub fn zoom(&mut self, factor: f32) {
        if factor.is_finite() && factor > 0.0 {
            self.distance = (self.distance * factor).clamp(MIN_DISTANCE, MAX_DISTANCE);
        }
    }

    /// Camera position in world space
    pub fn eye_position(&self) -> Vec3 {
        let (sp, cp) = self.polar.sin_cos();
        let (sa, ca) = self.azimuth.sin_cos();
        self.target + Vec3::new(sp * sa, cp, sp * ca) * self.distance
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye_position(), self.target, Vec3::Y)
    }

    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh_gl(self.fov, aspect, 0.1, 1000.0)
    }

    pub fn view_projection(&self, aspect: f32) -> Mat4 {
        self.projection_matrix(aspect) * self.view_matrix()
    }

    /// Cast a ray from a pointer position on `viewport` into the scene.
    pub fn screen_ray(&self, x: f32, y: f32, viewport: Viewport) -> Ray {
        let (ndc_x, ndc_y) = viewport.to_ndc(x, y);
        let vp_inv = self.view_projection(viewport.aspect()).inverse();

        let near_world = vp_inv * Vec4::new(ndc_x, ndc_y, -1.0, 1.0);
        let far_world = vp_inv * Vec4::new(ndc_x, ndc_y, 1.0, 1.0);
        let near = near_world.truncate() / near_world.w;
        let far = far_world.truncate() / far_world.w;

        Ray {
            origin: self.eye_position(),
            direction: (far - near).normalize_or_zero(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_on_positive_z() {
        let cam = OrbitCamera::new();
        assert!((cam.eye_position() - Vec3::new(0.0, 0.0, 4.0)).length() < 1e-5);
    }

    #[test]
    fn center_ray_points_at_target() {
        let cam = OrbitCamera::new();
        let ray = cam.screen_ray(400.0, 300.0, Viewport::new(800.0, 600.0));
        assert!((ray.direction - Vec3::NEG_Z).length() < 1e-4);
    }

    #[test]
    fn limits_are_enforced() {
        let mut cam = OrbitCamera::new();
        cam.zoom(0.01);
        assert_eq!(cam.distance, MIN_DISTANCE);
        cam.zoom(1000.0);
        assert_eq!(cam.distance, MAX_DISTANCE);
        cam.rotate(0.0, -10.0);
        assert_eq!(cam.polar, MIN_POLAR);
        cam.rotate(0.0, 10.0);
        assert_eq!(cam.polar, MAX_POLAR);
    }

    #[test]
    fn ndc_corners() {
        let vp = Viewport::new(200.0, 100.0);
        assert_eq!(vp.to_ndc(0.0, 0.0), (-1.0, 1.0));
        assert_eq!(vp.to_ndc(200.0, 100.0), (1.0, -1.0));
    }
}
