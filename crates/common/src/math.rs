//! Vector and homogeneous matrix helpers on top of `glam`.
//!
//! `Vec3` supplies add/sub/scale/dot/cross/length/distance/to_array directly;
//! normalization goes through [`normalize`] so the zero vector stays zero.
//! `Mat4` is column-major. Products read right to left: in `a * b`, `b` is
//! applied first.

use glam::{Mat4, Vec3, Vec4};

/// Below this squared length a vector is treated as zero.
pub const DEGENERATE_EPSILON: f32 = 1e-12;

/// Unit vector in the direction of `v`, or the zero vector when `v` has no length.
#[inline]
pub fn normalize(v: Vec3) -> Vec3 {
    v.normalize_or_zero()
}

/// Model matrix for a spatial transform, `T * Rz * Ry * Rx * S`.
///
/// Scale is applied first, then X, Y and Z rotations, then translation.
pub fn model_matrix(position: Vec3, rotation: Vec3, scale: Vec3) -> Mat4 {
    Mat4::from_translation(position)
        * Mat4::from_rotation_z(rotation.z)
        * Mat4::from_rotation_y(rotation.y)
        * Mat4::from_rotation_x(rotation.x)
        * Mat4::from_scale(scale)
}

/// Right-handed view matrix looking from `eye` toward `target`.
///
/// The basis is built from `forward = eye - target` and `up`. When `up` is
/// parallel to `forward` (or either is zero) a secondary up vector is
/// substituted: world +Z, or world +X when the view itself runs along Z.
/// When `eye == target` the camera looks down -Z.
pub fn look_at(eye: Vec3, target: Vec3, up: Vec3) -> Mat4 {
    let mut forward = eye - target;
    if forward.length_squared() < DEGENERATE_EPSILON {
        forward = Vec3::Z;
    }
    let forward = forward.normalize();

    let mut right = up.cross(forward);
    if right.length_squared() < DEGENERATE_EPSILON {
        let fallback = if forward.z.abs() < 0.9 { Vec3::Z } else { Vec3::X };
        right = fallback.cross(forward);
    }
    let right = right.normalize();
    let true_up = forward.cross(right);

    Mat4::from_cols(
        Vec4::new(right.x, true_up.x, forward.x, 0.0),
        Vec4::new(right.y, true_up.y, forward.y, 0.0),
        Vec4::new(right.z, true_up.z, forward.z, 0.0),
        Vec4::new(-right.dot(eye), -true_up.dot(eye), -forward.dot(eye), 1.0),
    )
}

/// OpenGL-style perspective projection (NDC z in [-1, 1]).
pub fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
    let aspect = if aspect > 0.0 { aspect } else { 1.0 };
    Mat4::perspective_rh_gl(fov_y, aspect, near, far)
}

/// OpenGL-style orthographic projection covering `half_extent` world units
/// vertically above and below the view axis.
pub fn orthographic(half_extent: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
    let aspect = if aspect > 0.0 { aspect } else { 1.0 };
    let half_w = half_extent * aspect;
    Mat4::orthographic_rh_gl(-half_w, half_w, -half_extent, half_extent, near, far)
}

/// Apply the full homogeneous transform to a point (implicit w = 1).
///
/// The perspective divide happens only when the resulting w is neither 0 nor 1.
pub fn transform_point(m: &Mat4, p: Vec3) -> Vec3 {
    perspective_divide(*m * p.extend(1.0))
}

/// Divide a homogeneous point by its w, unless w is exactly 0 or 1.
#[inline]
pub fn perspective_divide(v: Vec4) -> Vec3 {
    if v.w != 0.0 && v.w != 1.0 {
        v.truncate() / v.w
    } else {
        v.truncate()
    }
}

/// Transform a direction (implicit w = 0); translation is ignored.
pub fn transform_direction(m: &Mat4, d: Vec3) -> Vec3 {
    m.transform_vector3(d)
}

/// Twice the signed area of the triangle `a, b, c` in a 2D plane.
#[inline]
pub fn signed_area(a: glam::Vec2, b: glam::Vec2, c: glam::Vec2) -> f32 {
    (b - a).perp_dot(c - b)
}

/// Liang-Barsky clip of the segment `a`-`b` to the rectangle `min..=max`.
///
/// Returns `None` when no part of the segment lies inside. Intersections are
/// computed in `f64` and clamped into the rectangle, so the result stays
/// bounded even when an endpoint is astronomically far away.
pub fn clip_segment(
    a: glam::Vec2,
    b: glam::Vec2,
    min: glam::Vec2,
    max: glam::Vec2,
) -> Option<(glam::Vec2, glam::Vec2)> {
    let (a, b) = (a.as_dvec2(), b.as_dvec2());
    let (lo, hi) = (min.as_dvec2(), max.as_dvec2());
    let d = b - a;
    let (mut t0, mut t1) = (0.0f64, 1.0f64);
    let bounds = [
        (-d.x, a.x - lo.x),
        (d.x, hi.x - a.x),
        (-d.y, a.y - lo.y),
        (d.y, hi.y - a.y),
    ];
    for (p, q) in bounds {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
        } else {
            let r = q / p;
            if p < 0.0 {
                if r > t1 {
                    return None;
                }
                t0 = t0.max(r);
            } else {
                if r < t0 {
                    return None;
                }
                t1 = t1.min(r);
            }
        }
    }
    let at = |t: f64| (a + d * t).as_vec2().clamp(min, max);
    Some((at(t0), at(t1)))
}
