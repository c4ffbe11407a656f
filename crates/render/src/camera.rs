use glam::{Mat4, Vec3};
use phosphor_common::math;
use serde::{Deserialize, Serialize};
use std::f32::consts::FRAC_PI_2;

/// Vertical half-extent of the orthographic view volume, in world units.
pub const ORTHO_HALF_EXTENT: f32 = 10.0;

/// Closest the camera may get to its target through [`Camera::zoom`].
pub const MIN_ZOOM_DISTANCE: f32 = 0.05;

const ELEVATION_LIMIT: f32 = FRAC_PI_2 - 1e-3;

/// Projection kind used to build the projection matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Projection {
    #[default]
    Perspective,
    Orthographic,
}

/// Orbiting look-at camera. One per view, owned by the scene.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Camera {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    /// Vertical field of view in radians.
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    pub aspect: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 6.0, 26.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov: 45f32.to_radians(),
            near: 0.1,
            far: 1000.0,
            aspect: 4.0 / 3.0,
        }
    }
}

impl Camera {
    pub fn new(position: Vec3, target: Vec3) -> Self {
        Self {
            position,
            target,
            ..Self::default()
        }
    }

    pub fn view_matrix(&self) -> Mat4 {
        math::look_at(self.position, self.target, self.up)
    }

    pub fn projection_matrix(&self, kind: Projection) -> Mat4 {
        match kind {
            Projection::Perspective => math::perspective(self.fov, self.aspect, self.near, self.far),
            Projection::Orthographic => {
                math::orthographic(ORTHO_HALF_EXTENT, self.aspect, self.near, self.far)
            }
        }
    }

    /// `projection * view`.
    pub fn view_projection(&self, kind: Projection) -> Mat4 {
        self.projection_matrix(kind) * self.view_matrix()
    }

    /// Match the aspect ratio to a viewport. Zero-sized viewports are ignored.
    pub fn set_aspect(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    /// Rotate the camera around its target.
    ///
    /// Elevation is clamped just inside `(-pi/2, pi/2)`; the distance to the
    /// target is preserved. A camera sitting on its target does not move.
    pub fn orbit(&mut self, delta_azimuth: f32, delta_elevation: f32) {
        let offset = self.position - self.target;
        let radius = offset.length();
        if radius < 1e-6 {
            return;
        }

        let azimuth = offset.x.atan2(offset.z) + delta_azimuth;
        let elevation = ((offset.y / radius).clamp(-1.0, 1.0).asin() + delta_elevation)
            .clamp(-ELEVATION_LIMIT, ELEVATION_LIMIT);

        let (sin_el, cos_el) = elevation.sin_cos();
        let (sin_az, cos_az) = azimuth.sin_cos();
        self.position = self.target + Vec3::new(cos_el * sin_az, sin_el, cos_el * cos_az) * radius;
    }

    /// Move toward the target by `delta` (negative backs away).
    ///
    /// The camera stops [`MIN_ZOOM_DISTANCE`] short of the target.
    pub fn zoom(&mut self, delta: f32) {
        let offset = self.target - self.position;
        let distance = offset.length();
        let dir = math::normalize(offset);
        if dir == Vec3::ZERO {
            return;
        }
        let step = delta.min(distance - MIN_ZOOM_DISTANCE);
        self.position += dir * step;
    }

    /// Translate position and target together along the view's right and up axes.
    pub fn pan(&mut self, dx: f32, dy: f32) {
        let view = self.view_matrix();
        let right = view.row(0).truncate();
        let up = view.row(1).truncate();
        let shift = right * dx + up * dy;
        self.position += shift;
        self.target += shift;
    }

    pub fn distance(&self) -> f32 {
        self.position.distance(self.target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn view_maps_position_to_origin() {
        let cam = Camera::new(Vec3::new(3.0, -4.0, 12.0), Vec3::new(1.0, 1.0, 0.0));
        let p = math::transform_point(&cam.view_matrix(), cam.position);
        assert_abs_diff_eq!(p.length(), 0.0, epsilon = 1e-4);
    }

    #[test]
    fn orbit_keeps_radius() {
        let mut cam = Camera::default();
        let before = cam.distance();
        cam.orbit(0.7, 0.3);
        assert_abs_diff_eq!(cam.distance(), before, epsilon = 1e-3);
        assert_ne!(cam.position, Camera::default().position);
    }

    #[test]
    fn orbit_clamps_elevation_below_pole() {
        let mut cam = Camera::new(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO);
        cam.orbit(0.0, 10.0);
        let offset = cam.position - cam.target;
        assert!(offset.y < 10.0);
        assert!(offset.x.abs() + offset.z.abs() > 0.0);
        assert!(cam.view_matrix().is_finite());
    }

    #[test]
    fn orbit_at_target_is_noop() {
        let mut cam = Camera::new(Vec3::ONE, Vec3::ONE);
        cam.orbit(1.0, 1.0);
        assert_eq!(cam.position, Vec3::ONE);
    }

    #[test]
    fn zoom_moves_toward_target_and_stops_short() {
        let mut cam = Camera::new(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO);
        cam.zoom(4.0);
        assert_abs_diff_eq!(cam.position.z, 6.0, epsilon = 1e-5);
        cam.zoom(-2.0);
        assert_abs_diff_eq!(cam.position.z, 8.0, epsilon = 1e-5);
        cam.zoom(100.0);
        assert_abs_diff_eq!(cam.distance(), MIN_ZOOM_DISTANCE, epsilon = 1e-5);
    }

    #[test]
    fn pan_moves_position_and_target_together() {
        let mut cam = Camera::new(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO);
        cam.pan(2.0, 1.0);
        assert_abs_diff_eq!(cam.target.x, 2.0, epsilon = 1e-5);
        assert_abs_diff_eq!(cam.target.y, 1.0, epsilon = 1e-5);
        assert_abs_diff_eq!(cam.distance(), 10.0, epsilon = 1e-5);
    }

    #[test]
    fn set_aspect_ignores_empty_viewport() {
        let mut cam = Camera::default();
        cam.set_aspect(800, 400);
        assert_abs_diff_eq!(cam.aspect, 2.0);
        cam.set_aspect(0, 400);
        assert_abs_diff_eq!(cam.aspect, 2.0);
    }
}
