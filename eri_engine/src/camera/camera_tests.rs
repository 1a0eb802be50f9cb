use glam::{Mat4, Vec3};
use crate::math::Sphere;
use crate::scene::Transform;
use super::*;

fn ortho_camera() -> Camera {
    Camera::new(Projection::Orthogonal, 800, 600)
}

fn transform_at(pos: Vec3) -> Transform {
    let mut transform = Transform::default();
    transform.set_translate(pos);
    transform
}

// ============================================================================
// Defaults
// ============================================================================

#[test]
fn test_camera_defaults() {
    let camera = ortho_camera();
    assert_eq!(camera.projection(), Projection::Orthogonal);
    assert_eq!(camera.look_at(), Vec3::new(0.0, 0.0, -1.0));
    assert!(camera.is_look_at_offset());
    assert_eq!(camera.up(), Vec3::Y);
    assert_eq!(camera.ortho_zoom(), 1.0);
    assert!((camera.perspective_fov() - std::f32::consts::PI / 3.0).abs() < 1e-6);
    assert_eq!(camera.far_z(), 1000.0);
    assert_eq!(camera.backing_size(), (800, 600));
    assert!(camera.is_view_modified());
    assert!(camera.is_projection_modified());
    assert!(camera.is_view_need_update());
    assert!(camera.is_projection_need_update());
    assert!(camera.is_frustum_dirty());
}

// ============================================================================
// Frustum classification
// ============================================================================

#[test]
fn test_look_at_target_is_in_frustum() {
    let mut camera = ortho_camera();
    let transform = transform_at(Vec3::new(30.0, -20.0, 0.0));
    let target = transform.pos3() + camera.look_at();

    assert!(camera.is_in_frustum(&transform, &Sphere::new(target, 1.0)));
    assert!(!camera.is_frustum_dirty());
}

#[test]
fn test_sphere_beyond_far_z_is_out() {
    let mut camera = ortho_camera();
    let transform = Transform::default();

    assert!(!camera.is_in_frustum(&transform, &Sphere::new(Vec3::new(0.0, 0.0, -5000.0), 1.0)));
    assert!(!camera.is_in_frustum(&transform, &Sphere::new(Vec3::new(0.0, 0.0, 5000.0), 1.0)));
}

#[test]
fn test_zoom_narrows_ortho_volume() {
    let mut camera = ortho_camera();
    let transform = Transform::default();
    let sphere = Sphere::new(Vec3::new(300.0, 0.0, 0.0), 1.0);

    assert!(camera.is_in_frustum(&transform, &sphere));

    assert!(camera.set_ortho_zoom(2.0));
    assert!(camera.is_frustum_dirty());
    assert!(!camera.is_in_frustum(&transform, &sphere));
}

#[test]
fn test_perspective_behind_camera_is_out() {
    let mut camera = Camera::new(Projection::Perspective, 640, 480);
    camera.set_look_at(Vec3::ZERO, false);
    let transform = transform_at(Vec3::new(0.0, 0.0, 10.0));

    assert!(camera.is_in_frustum(&transform, &Sphere::new(Vec3::ZERO, 1.0)));
    assert!(!camera.is_in_frustum(&transform, &Sphere::new(Vec3::new(0.0, 0.0, 20.0), 1.0)));
}

#[test]
fn test_frustum_follows_position_after_view_modified() {
    let mut camera = ortho_camera();
    let mut transform = Transform::default();
    let sphere = Sphere::new(Vec3::new(1000.0, 0.0, 0.0), 1.0);
    assert!(!camera.is_in_frustum(&transform, &sphere));

    transform.set_translate(Vec3::new(1000.0, 0.0, 0.0));
    camera.set_view_modified();
    assert!(camera.is_in_frustum(&transform, &sphere));
}

// ============================================================================
// Upload flags
// ============================================================================

#[test]
fn test_update_clears_need_update_only() {
    let mut camera = ortho_camera();
    let transform = transform_at(Vec3::new(0.0, 0.0, 5.0));

    let view = camera.update_view_matrix(&transform);
    assert_eq!(view, Mat4::look_at_rh(Vec3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, 4.0), Vec3::Y));
    assert!(!camera.is_view_need_update());
    assert!(!camera.is_view_modified());

    let projection = camera.update_projection_matrix();
    assert_eq!(projection, Mat4::orthographic_rh_gl(-400.0, 400.0, -300.0, 300.0, -1000.0, 1000.0));
    assert!(!camera.is_projection_need_update());

    camera.set_far_z(50.0);
    assert!(camera.is_projection_need_update());
    assert!(!camera.is_view_need_update());

    camera.set_view_projection_need_update();
    assert!(camera.is_view_need_update());
    assert!(!camera.is_view_modified());
}

#[test]
fn test_backing_size_changes_projection() {
    let mut camera = ortho_camera();
    camera.update_projection_matrix();

    camera.set_backing_size(200, 100);
    assert!(camera.is_projection_modified());
    let projection = camera.update_projection_matrix();
    assert_eq!(projection, Mat4::orthographic_rh_gl(-100.0, 100.0, -50.0, 50.0, -1000.0, 1000.0));
}

#[test]
fn test_up_derived_from_rotation() {
    let mut camera = ortho_camera();
    let mut transform = Transform::default();
    transform.set_rotation(90.0, Vec3::Z);
    camera.on_rotate();

    camera.update_view_matrix(&transform);
    assert!((camera.up() - Vec3::new(-1.0, 0.0, 0.0)).length() < 1e-5);

    camera.set_up(Vec3::Y);
    camera.update_view_matrix(&transform);
    assert_eq!(camera.up(), Vec3::Y);
}
