/// Emitter: shape and rate source of new particles.
///
/// The only state is the countdown to the next emission. When a frame is
/// longer than the emission interval several particles are due at once:
/// `floor(overdue / interval) + 1`.

use glam::Vec2;
use rand::Rng;
use super::range_random;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EmitterShape {
    /// Uniform inside a rectangle
    Box { half_size: Vec2 },
    /// Uniform inside a disk
    Circle { radius: f32 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Emitter {
    shape: EmitterShape,
    rate: f32,
    angle_min: f32,
    angle_max: f32,
    emit_interval: f32,
    emit_remain_time: f32,
}

impl Emitter {
    pub fn new(shape: EmitterShape, rate: f32, angle_min: f32, angle_max: f32) -> Self {
        debug_assert!(rate > 0.0, "emitter rate must be positive");
        let rate = if rate > 0.0 { rate } else { f32::EPSILON };
        Self {
            shape,
            rate,
            angle_min,
            angle_max,
            emit_interval: 1.0 / rate,
            emit_remain_time: 0.0,
        }
    }

    pub fn new_box(half_size: Vec2, rate: f32, angle_min: f32, angle_max: f32) -> Self {
        Self::new(EmitterShape::Box { half_size }, rate, angle_min, angle_max)
    }

    pub fn new_circle(radius: f32, rate: f32, angle_min: f32, angle_max: f32) -> Self {
        Self::new(EmitterShape::Circle { radius }, rate, angle_min, angle_max)
    }

    pub fn shape(&self) -> EmitterShape {
        self.shape
    }

    /// Particles per second
    pub fn rate(&self) -> f32 {
        self.rate
    }

    pub fn angle_min(&self) -> f32 {
        self.angle_min
    }

    pub fn angle_max(&self) -> f32 {
        self.angle_max
    }

    pub fn emit_interval(&self) -> f32 {
        self.emit_interval
    }

    /// Advance the countdown; the number of particles due, if any
    pub fn check_emit(&mut self, delta_time: f32) -> Option<usize> {
        self.emit_remain_time -= delta_time;
        if self.emit_remain_time > 0.0 {
            return None;
        }
        let count = (-self.emit_remain_time / self.emit_interval) as usize + 1;
        self.emit_remain_time = self.emit_interval;
        Some(count)
    }

    /// Emission direction in degrees (0 is +Y)
    pub fn emit_angle(&self, rng: &mut impl Rng) -> f32 {
        range_random(rng, self.angle_min, self.angle_max)
    }

    /// Emission position relative to the emitter centre
    pub fn emit_pos(&self, rng: &mut impl Rng) -> Vec2 {
        match self.shape {
            EmitterShape::Box { half_size } => Vec2::new(
                range_random(rng, -half_size.x, half_size.x),
                range_random(rng, -half_size.y, half_size.y),
            ),
            EmitterShape::Circle { radius } => {
                let radius_squared = radius * radius;
                loop {
                    let pos = Vec2::new(
                        range_random(rng, -radius, radius),
                        range_random(rng, -radius, radius),
                    );
                    if pos.length_squared() <= radius_squared {
                        return pos;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "emitter_tests.rs"]
mod tests;
