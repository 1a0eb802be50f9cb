//! Unit tests for math primitives

use super::*;
use glam::{Vec2, Vec3, Vec4};

const EPS: f32 = 1e-5;

// ============================================================================
// Color
// ============================================================================

#[test]
fn test_color_lerp_midpoint() {
    let mid = Color::RED.lerp(Color::GREEN, 0.5);
    assert!((mid.r - 0.5).abs() < EPS);
    assert!((mid.g - 0.5).abs() < EPS);
    assert!(mid.b.abs() < EPS);
    assert!((mid.a - 1.0).abs() < EPS);
}

#[test]
fn test_color_modulate() {
    let c = Color::new(0.5, 1.0, 0.25, 1.0) * Color::new(0.5, 0.5, 1.0, 0.5);
    assert_eq!(c, Color::new(0.25, 0.5, 0.25, 0.5));
}

#[test]
fn test_color_to_rgba8_clamps() {
    assert_eq!(Color::new(2.0, -1.0, 0.5, 1.0).to_rgba8(), [255, 0, 128, 255]);
}

#[test]
fn test_color_default_is_white() {
    assert_eq!(Color::default(), Color::WHITE);
}

// ============================================================================
// Rect
// ============================================================================

#[test]
fn test_rect_from_center_and_contains() {
    let rect = Rect::from_center(Vec2::new(1.0, 1.0), Vec2::new(2.0, 4.0));
    assert_eq!(rect.min, Vec2::new(0.0, -1.0));
    assert_eq!(rect.max, Vec2::new(2.0, 3.0));
    assert!(rect.contains(Vec2::new(2.0, 3.0), Vec2::ZERO));
    assert!(!rect.contains(Vec2::new(2.5, 3.0), Vec2::ZERO));
    assert!(rect.contains(Vec2::new(2.5, 3.0), Vec2::new(0.5, 0.0)));
}

// ============================================================================
// Rotation helpers
// ============================================================================

#[test]
fn test_rotate_degree_quarter_turn() {
    let v = rotate_degree(Vec2::new(0.0, 1.0), 90.0);
    assert!((v.x + 1.0).abs() < EPS);
    assert!(v.y.abs() < EPS);
}

#[test]
fn test_axis_rotation_zero_axis_is_identity() {
    assert_eq!(axis_rotation(45.0, Vec3::ZERO), glam::Quat::IDENTITY);
}

#[test]
fn test_compose_model_applies_scale_then_rotate_then_translate() {
    let m = compose_model(Vec3::new(10.0, 0.0, 0.0), 90.0, Vec3::Z, Vec3::new(2.0, 2.0, 1.0));
    let p = m * Vec4::new(1.0, 0.0, 0.0, 1.0);
    assert!((p.x - 10.0).abs() < EPS);
    assert!((p.y - 2.0).abs() < EPS);
}
