/// Pooled particle record
///
/// Records are allocated when the pool is sized and recycled afterwards:
/// an expired particle is reset (marked unused), never dropped.

use glam::Vec2;
use crate::math::Color;

#[derive(Debug, Clone)]
pub struct Particle {
    pub pos: Vec2,
    pub velocity: Vec2,
    pub size: Vec2,
    pub scale: Vec2,
    /// Degrees
    pub rotate_angle: f32,
    /// Degrees per second
    pub rotate_speed: f32,
    pub color: Color,
    /// Current segment of a color interval table
    pub color_interval: usize,
    pub life: f32,
    pub lived_time: f32,
    pub lived_percent: f32,
    pub in_use: bool,
    /// Remaining period per affector: `-1` unlimited, `0` expired
    pub affector_timers: Vec<f32>,
}

impl Default for Particle {
    fn default() -> Self {
        Self {
            pos: Vec2::ZERO,
            velocity: Vec2::ZERO,
            size: Vec2::ZERO,
            scale: Vec2::ONE,
            rotate_angle: 0.0,
            rotate_speed: 0.0,
            color: Color::WHITE,
            color_interval: 0,
            life: 0.0,
            lived_time: 0.0,
            lived_percent: 0.0,
            in_use: false,
            affector_timers: Vec::new(),
        }
    }
}

impl Particle {
    /// Return the record to the pool
    pub fn reset(&mut self) {
        self.in_use = false;
        self.scale = Vec2::ONE;
    }
}
