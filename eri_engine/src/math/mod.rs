//! Math primitives on top of glam
//!
//! Angles are in degrees throughout the engine.

mod color;

pub use color::Color;

use glam::{Mat4, Quat, Vec2, Vec3};

/// Bounding sphere
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Sphere {
    pub center: Vec3,
    pub radius: f32,
}

impl Sphere {
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }
}

/// Axis-aligned rectangle in a node's local space (y up)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Rectangle of `size` centred on `center`
    pub fn from_center(center: Vec2, size: Vec2) -> Self {
        let half = size * 0.5;
        Self { min: center - half, max: center + half }
    }

    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    /// Whether `pos` lies inside the rectangle grown by `border` on every side
    pub fn contains(&self, pos: Vec2, border: Vec2) -> bool {
        pos.x >= self.min.x - border.x
            && pos.x <= self.max.x + border.x
            && pos.y >= self.min.y - border.y
            && pos.y <= self.max.y + border.y
    }
}

/// Rotate a 2D vector counter-clockwise by `degree`
pub fn rotate_degree(v: Vec2, degree: f32) -> Vec2 {
    Vec2::from_angle(degree.to_radians()).rotate(v)
}

/// Rotation of `degree` around `axis`; identity for a zero axis
pub fn axis_rotation(degree: f32, axis: Vec3) -> Quat {
    let axis = axis.normalize_or_zero();
    if axis == Vec3::ZERO {
        Quat::IDENTITY
    } else {
        Quat::from_axis_angle(axis, degree.to_radians())
    }
}

/// Model matrix `T * R * S`
pub fn compose_model(translate: Vec3, degree: f32, axis: Vec3, scale: Vec3) -> Mat4 {
    Mat4::from_scale_rotation_translation(scale, axis_rotation(degree, axis), translate)
}

#[cfg(test)]
#[path = "math_tests.rs"]
mod tests;
