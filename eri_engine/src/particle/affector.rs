/// Affectors: per-frame particle mutators.
///
/// Each affector may be limited to a period after the particle's birth
/// (`-1` means for the whole life).

use glam::Vec2;
use crate::math::Color;
use super::particle::Particle;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorInterval {
    pub lived_percent: f32,
    pub color: Color,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AffectorKind {
    /// Spin, degrees per second, optionally accelerating
    Rotate { speed: f32, acceleration: f32 },
    /// Constant acceleration added to the velocity
    Force { acceleration: Vec2 },
    /// Speed change along the current direction, stops at zero
    Acceleration { acceleration: f32 },
    /// Scale growth per second, floored at zero
    Scale { speed: Vec2 },
    /// Linear color over the particle's life
    Color { start: Color, end: Color },
    /// Piecewise linear color over the particle's life
    ColorInterval { intervals: Vec<ColorInterval> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Affector {
    kind: AffectorKind,
    period: f32,
}

impl Affector {
    pub fn new(kind: AffectorKind) -> Self {
        Self { kind, period: -1.0 }
    }

    pub fn rotate(speed: f32, acceleration: f32) -> Self {
        Self::new(AffectorKind::Rotate { speed, acceleration })
    }

    pub fn force(acceleration: Vec2) -> Self {
        Self::new(AffectorKind::Force { acceleration })
    }

    pub fn acceleration(acceleration: f32) -> Self {
        Self::new(AffectorKind::Acceleration { acceleration })
    }

    pub fn scale(speed: Vec2) -> Self {
        Self::new(AffectorKind::Scale { speed })
    }

    pub fn color(start: Color, end: Color) -> Self {
        Self::new(AffectorKind::Color { start, end })
    }

    /// Empty interval table, filled with [`Affector::add_interval`]
    pub fn color_interval() -> Self {
        Self::new(AffectorKind::ColorInterval { intervals: Vec::new() })
    }

    pub fn with_period(mut self, period: f32) -> Self {
        self.period = period;
        self
    }

    pub fn kind(&self) -> &AffectorKind {
        &self.kind
    }

    pub fn period(&self) -> f32 {
        self.period
    }

    pub fn set_period(&mut self, period: f32) {
        self.period = period;
    }

    /// Append an interval (ascending `lived_percent`)
    pub fn add_interval(&mut self, lived_percent: f32, color: Color) {
        match &mut self.kind {
            AffectorKind::ColorInterval { intervals } => {
                debug_assert!(intervals.last().map_or(true, |last| last.lived_percent <= lived_percent));
                intervals.push(ColorInterval { lived_percent, color });
            }
            _ => debug_assert!(false, "add_interval on a non-interval affector"),
        }
    }

    /// Initial state at emission
    pub fn init_setup(&self, p: &mut Particle) {
        match &self.kind {
            AffectorKind::Rotate { speed, .. } => p.rotate_speed = *speed,
            AffectorKind::Color { start, .. } => p.color = *start,
            AffectorKind::ColorInterval { intervals } => {
                debug_assert!(!intervals.is_empty());
                if let Some(first) = intervals.first() {
                    p.color = first.color;
                }
                p.color_interval = 0;
            }
            _ => {}
        }
    }

    pub fn update(&self, delta_time: f32, p: &mut Particle) {
        match &self.kind {
            AffectorKind::Rotate { acceleration, .. } => {
                p.rotate_speed += acceleration * delta_time;
                p.rotate_angle += p.rotate_speed * delta_time;
            }
            AffectorKind::Force { acceleration } => {
                p.velocity += *acceleration * delta_time;
            }
            AffectorKind::Acceleration { acceleration } => {
                let speed = p.velocity.length();
                let delta_speed = acceleration * delta_time;
                if speed + delta_speed <= 0.0 {
                    p.velocity = Vec2::ZERO;
                } else {
                    p.velocity += p.velocity.normalize_or_zero() * delta_speed;
                }
            }
            AffectorKind::Scale { speed } => {
                p.scale = (p.scale + *speed * delta_time).max(Vec2::ZERO);
            }
            AffectorKind::Color { start, end } => {
                p.color = *start * (1.0 - p.lived_percent) + *end * p.lived_percent;
            }
            AffectorKind::ColorInterval { intervals } => update_color_interval(intervals, p),
        }
    }
}

fn update_color_interval(intervals: &[ColorInterval], p: &mut Particle) {
    let Some(last) = intervals.len().checked_sub(1) else {
        return;
    };
    if p.color_interval >= last || p.lived_percent <= intervals[p.color_interval].lived_percent {
        return;
    }

    while p.color_interval < last && p.lived_percent >= intervals[p.color_interval + 1].lived_percent {
        p.color_interval += 1;
    }

    if p.color_interval >= last {
        p.color = intervals[last].color;
    } else {
        let from = intervals[p.color_interval];
        let to = intervals[p.color_interval + 1];
        let t = (p.lived_percent - from.lived_percent) / (to.lived_percent - from.lived_percent);
        p.color = from.color * (1.0 - t) + to.color * t;
    }
}

#[cfg(test)]
#[path = "affector_tests.rs"]
mod tests;
