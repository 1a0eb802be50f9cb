/// Frustum: six clipping planes for sphere culling.
///
/// Each plane is a Vec4 (A, B, C, D) with a unit inward normal (A, B, C):
/// a point P is inside when `dot(plane, (P, 1)) >= 0` for all planes.

use glam::{Mat4, Vec3, Vec4};
use crate::math::Sphere;

/// Frustum plane indices
pub const PLANE_LEFT: usize = 0;
pub const PLANE_RIGHT: usize = 1;
pub const PLANE_BOTTOM: usize = 2;
pub const PLANE_TOP: usize = 3;
pub const PLANE_NEAR: usize = 4;
pub const PLANE_FAR: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frustum {
    /// Frustum planes: left, right, bottom, top, near, far
    pub planes: [Vec4; 6],
}

impl Default for Frustum {
    fn default() -> Self {
        Self::from_view_projection(&Mat4::IDENTITY)
    }
}

impl Frustum {
    /// Extract planes from `projection * view` (Gribb & Hartmann).
    ///
    /// Expects a GL-style clip volume (z in [-w, w]), which is what the
    /// camera builds with `perspective_rh_gl` / `orthographic_rh_gl`.
    pub fn from_view_projection(vp: &Mat4) -> Self {
        let m = vp.to_cols_array_2d();

        let row = |r: usize| Vec4::new(m[0][r], m[1][r], m[2][r], m[3][r]);
        let (r0, r1, r2, r3) = (row(0), row(1), row(2), row(3));

        let mut planes = [
            r3 + r0, // left
            r3 - r0, // right
            r3 + r1, // bottom
            r3 - r1, // top
            r3 + r2, // near
            r3 - r2, // far
        ];

        for plane in &mut planes {
            let normal_len = Vec3::new(plane.x, plane.y, plane.z).length();
            if normal_len > 0.0 {
                *plane /= normal_len;
            }
        }

        Self { planes }
    }

    /// Signed distance of `point` to plane `idx` (positive inside)
    pub fn distance(&self, idx: usize, point: Vec3) -> f32 {
        self.planes[idx].dot(point.extend(1.0))
    }

    /// `None` if the sphere is fully outside a plane, else the distance of
    /// its centre to the near plane plus its radius.
    pub fn sphere_in_frustum(&self, sphere: &Sphere) -> Option<f32> {
        let mut near_distance = 0.0;
        for (idx, _) in self.planes.iter().enumerate() {
            let distance = self.distance(idx, sphere.center);
            if distance < -sphere.radius {
                return None;
            }
            if idx == PLANE_NEAR {
                near_distance = distance;
            }
        }
        Some(near_distance + sphere.radius)
    }

    pub fn intersects_sphere(&self, sphere: &Sphere) -> bool {
        self.sphere_in_frustum(sphere).is_some()
    }
}

#[cfg(test)]
#[path = "frustum_tests.rs"]
mod tests;
