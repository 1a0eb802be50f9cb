/// Camera: view/projection derivation for a camera node.
///
/// Two independent dirty axes:
///
/// - *view*: position, rotation, look-at, up
/// - *projection*: zoom, fov, far plane, backing size
///
/// Each axis has a `modified` flag (matrix must be recomputed) and a
/// `need_update` flag (matrix must be re-uploaded to the renderer).
/// Modifying either axis also marks the frustum dirty. Matrices are only
/// recomputed when queried.

use std::f32::consts::PI;
use glam::{Mat4, Vec3};
use crate::math::{axis_rotation, Sphere};
use crate::scene::{ActorKind, SceneNode, Transform};
use super::frustum::Frustum;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Projection {
    Orthogonal,
    Perspective,
}

#[derive(Debug, Clone)]
pub struct Camera {
    projection: Projection,
    look_at: Vec3,
    is_look_at_offset: bool,
    up: Vec3,
    ortho_zoom: f32,
    perspective_fov: f32,
    far_z: f32,
    backing_width: u32,
    backing_height: u32,

    view_matrix: Mat4,
    projection_matrix: Mat4,
    frustum: Frustum,

    is_view_modified: bool,
    is_projection_modified: bool,
    is_view_need_update: bool,
    is_projection_need_update: bool,
    is_frustum_dirty: bool,
    is_up_modified_by_rotate: bool,
}

impl Camera {
    pub fn new(projection: Projection, backing_width: u32, backing_height: u32) -> Self {
        Self {
            projection,
            look_at: Vec3::NEG_Z,
            is_look_at_offset: true,
            up: Vec3::Y,
            ortho_zoom: 1.0,
            perspective_fov: PI / 3.0,
            far_z: 1000.0,
            backing_width,
            backing_height,
            view_matrix: Mat4::IDENTITY,
            projection_matrix: Mat4::IDENTITY,
            frustum: Frustum::default(),
            is_view_modified: true,
            is_projection_modified: true,
            is_view_need_update: true,
            is_projection_need_update: true,
            is_frustum_dirty: true,
            is_up_modified_by_rotate: false,
        }
    }

    pub fn projection(&self) -> Projection {
        self.projection
    }

    pub fn look_at(&self) -> Vec3 {
        self.look_at
    }

    pub fn is_look_at_offset(&self) -> bool {
        self.is_look_at_offset
    }

    pub fn up(&self) -> Vec3 {
        self.up
    }

    pub fn ortho_zoom(&self) -> f32 {
        self.ortho_zoom
    }

    /// Vertical field of view in radians
    pub fn perspective_fov(&self) -> f32 {
        self.perspective_fov
    }

    pub fn far_z(&self) -> f32 {
        self.far_z
    }

    pub fn backing_size(&self) -> (u32, u32) {
        (self.backing_width, self.backing_height)
    }

    /// Cached view matrix (current after the next frustum test or upload)
    pub fn view_matrix(&self) -> Mat4 {
        self.view_matrix
    }

    pub fn projection_matrix(&self) -> Mat4 {
        self.projection_matrix
    }

    pub fn frustum(&self) -> &Frustum {
        &self.frustum
    }

    // ===== Setters =====

    /// Look-at target, absolute or relative to the camera position
    pub fn set_look_at(&mut self, look_at: Vec3, is_offset: bool) {
        self.look_at = look_at;
        self.is_look_at_offset = is_offset;
        self.set_view_modified();
    }

    /// Explicit up vector (stops deriving it from the node rotation)
    pub fn set_up(&mut self, up: Vec3) {
        self.up = up;
        self.is_up_modified_by_rotate = false;
        self.set_view_modified();
    }

    pub fn set_perspective_fov(&mut self, fov: f32) {
        debug_assert!(self.projection == Projection::Perspective);
        self.perspective_fov = fov;
        self.set_projection_modified();
    }

    pub fn set_far_z(&mut self, far_z: f32) {
        debug_assert!(far_z > 0.0);
        if far_z <= 0.0 {
            return;
        }
        self.far_z = far_z;
        self.set_projection_modified();
    }

    pub fn set_backing_size(&mut self, width: u32, height: u32) {
        self.backing_width = width;
        self.backing_height = height;
        self.set_projection_modified();
    }

    /// Zoom part of `SceneManager::set_ortho_zoom` (the scale is set there)
    pub(crate) fn set_ortho_zoom(&mut self, zoom: f32) -> bool {
        debug_assert!(self.projection == Projection::Orthogonal);
        debug_assert!(zoom > 0.0);
        if self.projection != Projection::Orthogonal || zoom <= 0.0 {
            return false;
        }
        self.ortho_zoom = zoom;
        self.set_projection_modified();
        true
    }

    pub(crate) fn on_rotate(&mut self) {
        self.is_up_modified_by_rotate = true;
        self.set_view_modified();
    }

    pub fn set_view_modified(&mut self) {
        self.is_view_modified = true;
        self.is_view_need_update = true;
        self.is_frustum_dirty = true;
    }

    pub fn set_projection_modified(&mut self) {
        self.is_projection_modified = true;
        self.is_projection_need_update = true;
        self.is_frustum_dirty = true;
    }

    /// Force a re-upload (camera switch)
    pub(crate) fn set_view_projection_need_update(&mut self) {
        self.is_view_need_update = true;
        self.is_projection_need_update = true;
    }

    pub fn is_view_modified(&self) -> bool {
        self.is_view_modified
    }

    pub fn is_projection_modified(&self) -> bool {
        self.is_projection_modified
    }

    pub fn is_view_need_update(&self) -> bool {
        self.is_view_need_update
    }

    pub fn is_projection_need_update(&self) -> bool {
        self.is_projection_need_update
    }

    pub fn is_frustum_dirty(&self) -> bool {
        self.is_frustum_dirty
    }

    // ===== Derivation =====

    /// View matrix to upload; clears `need_update`
    pub(crate) fn update_view_matrix(&mut self, transform: &Transform) -> Mat4 {
        debug_assert!(self.is_view_need_update);
        if self.is_view_modified {
            self.calculate_view_matrix(transform);
        }
        self.is_view_need_update = false;
        self.view_matrix
    }

    /// Projection matrix to upload; clears `need_update`
    pub(crate) fn update_projection_matrix(&mut self) -> Mat4 {
        debug_assert!(self.is_projection_need_update);
        if self.is_projection_modified {
            self.calculate_projection_matrix();
        }
        self.is_projection_need_update = false;
        self.projection_matrix
    }

    pub(crate) fn is_in_frustum(&mut self, transform: &Transform, sphere: &Sphere) -> bool {
        if self.is_frustum_dirty {
            if self.is_view_modified {
                self.calculate_view_matrix(transform);
            }
            if self.is_projection_modified {
                self.calculate_projection_matrix();
            }
            self.frustum = Frustum::from_view_projection(&(self.projection_matrix * self.view_matrix));
            self.is_frustum_dirty = false;
        }
        self.frustum.sphere_in_frustum(sphere).map_or(false, |d| d > 0.0)
    }

    fn calculate_view_matrix(&mut self, transform: &Transform) {
        if self.is_up_modified_by_rotate {
            self.up = axis_rotation(transform.rotate(), transform.rotate_axis()) * Vec3::Y;
        }
        let pos = transform.pos3();
        let target = if self.is_look_at_offset { pos + self.look_at } else { self.look_at };
        self.view_matrix = Mat4::look_at_rh(pos, target, self.up);
        self.is_view_modified = false;
    }

    fn calculate_projection_matrix(&mut self) {
        let width = self.backing_width.max(1) as f32;
        let height = self.backing_height.max(1) as f32;
        self.projection_matrix = match self.projection {
            Projection::Orthogonal => {
                let half_w = width / self.ortho_zoom * 0.5;
                let half_h = height / self.ortho_zoom * 0.5;
                Mat4::orthographic_rh_gl(-half_w, half_w, -half_h, half_h, -self.far_z, self.far_z)
            }
            Projection::Perspective => {
                Mat4::perspective_rh_gl(self.perspective_fov, width / height, 1.0, self.far_z)
            }
        };
        self.is_projection_modified = false;
    }
}

// ===== Node access =====

impl SceneNode {
    pub fn camera(&self) -> Option<&Camera> {
        match &self.kind {
            ActorKind::Camera(camera) => Some(camera),
            _ => None,
        }
    }

    pub fn camera_mut(&mut self) -> Option<&mut Camera> {
        match &mut self.kind {
            ActorKind::Camera(camera) => Some(camera),
            _ => None,
        }
    }

    /// Frustum test against this camera node; non-camera nodes accept everything
    pub(crate) fn camera_in_frustum(&mut self, sphere: &Sphere) -> bool {
        match &mut self.kind {
            ActorKind::Camera(camera) => camera.is_in_frustum(&self.transform, sphere),
            _ => true,
        }
    }
}

#[cfg(test)]
#[path = "camera_tests.rs"]
mod tests;
