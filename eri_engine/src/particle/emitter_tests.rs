use glam::Vec2;
use rand::rngs::StdRng;
use rand::SeedableRng;
use super::*;

#[test]
fn test_interval_from_rate() {
    let emitter = Emitter::new_box(Vec2::ONE, 10.0, 0.0, 0.0);
    assert!((emitter.emit_interval() - 0.1).abs() < 1e-7);
    assert_eq!(emitter.rate(), 10.0);
}

#[test]
fn test_first_check_emits_immediately() {
    let mut emitter = Emitter::new_box(Vec2::ONE, 10.0, 0.0, 0.0);
    assert_eq!(emitter.check_emit(0.05), Some(1));
    assert_eq!(emitter.check_emit(0.05), None);
    assert_eq!(emitter.check_emit(0.05), Some(1));
}

#[test]
fn test_long_frame_queues_several() {
    let mut emitter = Emitter::new_box(Vec2::ONE, 10.0, 0.0, 0.0);
    // overdue 0.35 -> floor(3.5) + 1
    assert_eq!(emitter.check_emit(0.35), Some(4));
    // countdown restarts at a full interval
    assert_eq!(emitter.check_emit(0.09), None);
}

#[test]
fn test_box_positions_within_half_size() {
    let emitter = Emitter::new_box(Vec2::new(3.0, 0.5), 1.0, 0.0, 0.0);
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..1000 {
        let pos = emitter.emit_pos(&mut rng);
        assert!(pos.x.abs() <= 3.0 && pos.y.abs() <= 0.5);
    }
}

#[test]
fn test_circle_positions_within_radius() {
    let radius = 2.5;
    let emitter = Emitter::new_circle(radius, 1.0, 0.0, 0.0);
    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..10_000 {
        let pos = emitter.emit_pos(&mut rng);
        assert!(pos.length_squared() <= radius * radius);
    }
}

#[test]
fn test_zero_radius_circle_emits_at_centre() {
    let emitter = Emitter::new_circle(0.0, 1.0, 0.0, 0.0);
    let mut rng = StdRng::seed_from_u64(1);
    assert_eq!(emitter.emit_pos(&mut rng), Vec2::ZERO);
}

#[test]
fn test_angle_within_range() {
    let emitter = Emitter::new_circle(1.0, 1.0, -30.0, 45.0);
    let mut rng = StdRng::seed_from_u64(3);
    for _ in 0..1000 {
        let angle = emitter.emit_angle(&mut rng);
        assert!((-30.0..=45.0).contains(&angle));
    }
    let fixed = Emitter::new_circle(1.0, 1.0, 90.0, 90.0);
    assert_eq!(fixed.emit_angle(&mut rng), 90.0);
}
