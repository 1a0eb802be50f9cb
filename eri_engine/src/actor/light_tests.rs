use glam::Vec3;
use crate::math::Color;
use crate::renderer::MockRenderer;
use super::*;

#[test]
fn test_light_defaults() {
    let light = Light::new(LightType::Spot);
    assert_eq!(light.idx(), None);
    assert_eq!(light.ambient(), Color::BLACK);
    assert_eq!(light.attenuation(), (1.0, 0.0, 0.0));
    assert_eq!(light.dir(), Vec3::new(0.0, 0.0, -1.0));
    assert_eq!(light.spot_exponent(), 0.0);
    assert_eq!(light.spot_cutoff(), 180.0);
    assert!(light.is_dirty());
}

#[test]
fn test_sync_obtains_slot_and_applies_once() {
    let mut renderer = MockRenderer::new(320, 240);
    let mut light = Light::new(LightType::Point);
    light.set_diffuse(Color::RED);

    assert!(light.sync(&mut renderer, Vec3::new(1.0, 2.0, 3.0)));
    assert_eq!(light.idx(), Some(0));
    assert!(!light.is_dirty());

    let state = &renderer.lights[&0];
    assert_eq!(state.pos, Some(Vec3::new(1.0, 2.0, 3.0)));
    assert_eq!(state.diffuse, Some(Color::RED));
    assert_eq!(state.dir, None, "point lights have no direction");

    renderer.clear_log();
    assert!(light.sync(&mut renderer, Vec3::ZERO));
    assert!(renderer.commands.is_empty(), "clean light pushes nothing");
}

#[test]
fn test_direction_light_pushes_dir_not_pos() {
    let mut renderer = MockRenderer::new(320, 240);
    let mut light = Light::new(LightType::Direction);
    light.set_dir(Vec3::X);
    light.sync(&mut renderer, Vec3::ONE);

    let state = &renderer.lights[&0];
    assert_eq!(state.dir, Some(Vec3::X));
    assert_eq!(state.pos, None);
    assert_eq!(state.spot_cutoff, None);
}

#[test]
fn test_spot_light_pushes_spot_settings() {
    let mut renderer = MockRenderer::new(320, 240);
    let mut light = Light::new(LightType::Spot);
    light.set_spot_cutoff(45.0);
    light.set_spot_exponent(2.0);
    light.sync(&mut renderer, Vec3::ZERO);

    let state = &renderer.lights[&0];
    assert_eq!(state.spot_cutoff, Some(45.0));
    assert_eq!(state.spot_exponent, Some(2.0));
    assert_eq!(state.spot_dir, Some(Vec3::NEG_Z));
}

#[test]
fn test_sync_fails_when_slots_exhausted() {
    let mut renderer = MockRenderer::new(320, 240);
    let mut lights: Vec<Light> = (0..crate::renderer::mock_renderer::MOCK_MAX_LIGHTS)
        .map(|_| Light::new(LightType::Point))
        .collect();
    for light in &mut lights {
        assert!(light.sync(&mut renderer, Vec3::ZERO));
    }

    let mut extra = Light::new(LightType::Point);
    assert!(!extra.sync(&mut renderer, Vec3::ZERO));
    assert_eq!(extra.idx(), None);
}

#[test]
fn test_take_slot_marks_dirty_for_next_obtain() {
    let mut renderer = MockRenderer::new(320, 240);
    let mut light = Light::new(LightType::Point);
    light.sync(&mut renderer, Vec3::ZERO);

    assert_eq!(light.take_slot(), Some(0));
    assert_eq!(light.idx(), None);
    assert!(light.is_dirty());
}
