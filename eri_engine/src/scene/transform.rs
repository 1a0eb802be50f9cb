/// Transform component of a scene node.
///
/// Local fields plus four lazily derived matrices. Each derived matrix has
/// its own dirty flag:
///
/// - `model` / `inv_model`: set by any local mutation
/// - `world` / `inv_world`: set by a local mutation of the node or of any
///   ancestor (the scene manager propagates it down the subtree)
/// - `view_depth`: cached world z, only re-read when flagged
///
/// Nothing is recomputed until queried.

use glam::{Mat4, Vec2, Vec3};
use crate::math::compose_model;

#[derive(Debug, Clone)]
pub struct Transform {
    translate: Vec3,
    rotate_degree: f32,
    rotate_axis: Vec3,
    scale: Vec3,

    model: Mat4,
    inv_model: Mat4,
    world: Mat4,
    inv_world: Mat4,
    view_depth: f32,

    model_dirty: bool,
    inv_model_dirty: bool,
    world_dirty: bool,
    inv_world_dirty: bool,
    view_depth_dirty: bool,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translate: Vec3::ZERO,
            rotate_degree: 0.0,
            rotate_axis: Vec3::Z,
            scale: Vec3::ONE,
            model: Mat4::IDENTITY,
            inv_model: Mat4::IDENTITY,
            world: Mat4::IDENTITY,
            inv_world: Mat4::IDENTITY,
            view_depth: 0.0,
            model_dirty: false,
            inv_model_dirty: false,
            world_dirty: true,
            inv_world_dirty: true,
            view_depth_dirty: true,
        }
    }
}

impl Transform {
    pub fn pos(&self) -> Vec2 {
        self.translate.truncate()
    }

    pub fn pos3(&self) -> Vec3 {
        self.translate
    }

    /// Rotation in degrees around `rotate_axis`
    pub fn rotate(&self) -> f32 {
        self.rotate_degree
    }

    pub fn rotate_axis(&self) -> Vec3 {
        self.rotate_axis
    }

    pub fn scale(&self) -> Vec2 {
        self.scale.truncate()
    }

    pub fn scale3(&self) -> Vec3 {
        self.scale
    }

    pub(crate) fn set_translate(&mut self, translate: Vec3) {
        self.translate = translate;
        self.mark_model_dirty();
    }

    pub(crate) fn set_rotation(&mut self, degree: f32, axis: Vec3) {
        self.rotate_degree = degree;
        self.rotate_axis = axis;
        self.mark_model_dirty();
    }

    pub(crate) fn set_scale(&mut self, scale: Vec3) {
        self.scale = scale;
        self.mark_model_dirty();
    }

    fn mark_model_dirty(&mut self) {
        self.model_dirty = true;
        self.inv_model_dirty = true;
    }

    /// Flag world and inverse world for recompute; `depth` also flags view depth
    pub(crate) fn mark_world_dirty(&mut self, depth: bool) {
        self.world_dirty = true;
        self.inv_world_dirty = true;
        if depth {
            self.view_depth_dirty = true;
        }
    }

    pub fn is_world_dirty(&self) -> bool {
        self.world_dirty
    }

    pub fn is_view_depth_dirty(&self) -> bool {
        self.view_depth_dirty
    }

    /// Local model matrix `T * R * S`
    pub fn model_matrix(&mut self) -> Mat4 {
        if self.model_dirty {
            self.model = compose_model(self.translate, self.rotate_degree, self.rotate_axis, self.scale);
            self.model_dirty = false;
        }
        self.model
    }

    pub fn inv_model_matrix(&mut self) -> Mat4 {
        if self.inv_model_dirty {
            self.inv_model = self.model_matrix().inverse();
            self.inv_model_dirty = false;
        }
        self.inv_model
    }

    /// Recompute the world matrix from the parent's current world matrix
    pub(crate) fn update_world(&mut self, parent_world: Option<Mat4>) -> Mat4 {
        let model = self.model_matrix();
        self.world = match parent_world {
            Some(parent) => parent * model,
            None => model,
        };
        self.world_dirty = false;
        self.world
    }

    /// Last computed world matrix (valid when not dirty)
    pub fn cached_world(&self) -> Mat4 {
        self.world
    }

    /// Inverse of the cached world matrix
    pub(crate) fn inv_world(&mut self) -> Mat4 {
        debug_assert!(!self.world_dirty);
        if self.inv_world_dirty {
            self.inv_world = self.world.inverse();
            self.inv_world_dirty = false;
        }
        self.inv_world
    }

    /// World-space z of the origin, re-read from the cached world matrix
    pub(crate) fn view_depth(&mut self) -> f32 {
        debug_assert!(!self.world_dirty);
        if self.view_depth_dirty {
            self.view_depth = self.world.w_axis.z;
            self.view_depth_dirty = false;
        }
        self.view_depth
    }
}
