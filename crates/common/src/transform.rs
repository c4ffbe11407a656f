use glam::{Affine2, Mat4, Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::math;
use crate::types::ViewMode;

/// Planar transform: pixel-space position, rotation in radians, per-axis scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform2D {
    pub position: Vec2,
    pub rotation: f32,
    pub scale: Vec2,
}

impl Default for Transform2D {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            rotation: 0.0,
            scale: Vec2::ONE,
        }
    }
}

impl Transform2D {
    pub fn from_position(position: Vec2) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    /// Affine map from local shape space into pixel space.
    pub fn affine(&self) -> Affine2 {
        Affine2::from_scale_angle_translation(self.scale, self.rotation, self.position)
    }
}

/// Spatial transform: position, XYZ Euler angles in radians, per-axis scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform3D {
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Default for Transform3D {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

impl Transform3D {
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    /// Model matrix in the fixed `T * Rz * Ry * Rx * S` order.
    pub fn model_matrix(&self) -> Mat4 {
        math::model_matrix(self.position, self.rotation, self.scale)
    }
}

/// An entity transform in exactly one of the two shapes.
///
/// The shape always agrees with the entity's current view mode.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum Transform {
    Planar(Transform2D),
    Spatial(Transform3D),
}

impl Transform {
    pub fn mode(&self) -> ViewMode {
        match self {
            Self::Planar(_) => ViewMode::Planar,
            Self::Spatial(_) => ViewMode::Spatial,
        }
    }

    pub fn as_planar(&self) -> Option<&Transform2D> {
        match self {
            Self::Planar(t) => Some(t),
            Self::Spatial(_) => None,
        }
    }

    pub fn as_spatial(&self) -> Option<&Transform3D> {
        match self {
            Self::Spatial(t) => Some(t),
            Self::Planar(_) => None,
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::Planar(Transform2D::default())
    }
}

impl From<Transform2D> for Transform {
    fn from(t: Transform2D) -> Self {
        Self::Planar(t)
    }
}

impl From<Transform3D> for Transform {
    fn from(t: Transform3D) -> Self {
        Self::Spatial(t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn transform_defaults_are_identity() {
        let t = Transform3D::default();
        assert_eq!(t.model_matrix(), Mat4::IDENTITY);
        let p = Transform2D::default();
        assert_eq!(p.affine(), Affine2::IDENTITY);
    }

    #[test]
    fn mode_follows_shape() {
        assert_eq!(Transform::from(Transform2D::default()).mode(), ViewMode::Planar);
        assert_eq!(Transform::from(Transform3D::default()).mode(), ViewMode::Spatial);
        assert!(Transform::default().as_spatial().is_none());
    }

    #[test]
    fn planar_affine_rotates_about_origin_then_translates() {
        let t = Transform2D {
            position: Vec2::new(10.0, 20.0),
            rotation: FRAC_PI_2,
            scale: Vec2::splat(2.0),
        };
        let p = t.affine().transform_point2(Vec2::X);
        assert_abs_diff_eq!(p.x, 10.0, epsilon = 1e-4);
        assert_abs_diff_eq!(p.y, 22.0, epsilon = 1e-4);
    }
}
