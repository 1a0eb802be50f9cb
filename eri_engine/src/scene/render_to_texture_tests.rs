/// Tests for RenderToTexture

use glam::Vec2;
use crate::camera::Projection;
use crate::renderer::MockRenderer;
use crate::resource::{TextureImage, TextureReader};
use crate::scene::DEFAULT_LAYER_COUNT;
use super::*;

struct NoFiles;

impl TextureReader for NoFiles {
    fn read(&mut self, _path: &str) -> Option<TextureImage> {
        None
    }
}

fn setup() -> (SceneManager, TextureManager, MockRenderer) {
    let mut scene = SceneManager::new(DEFAULT_LAYER_COUNT, 800, 600);
    let sprite = scene.create_sprite(Vec2::ONE, Vec2::ZERO);
    scene.add_to_scene(sprite, 0);
    (scene, TextureManager::new(Box::new(NoFiles)), MockRenderer::new(800, 600))
}

// ============================================================================
// Tests
// ============================================================================

#[test]
fn test_init_creates_target() {
    let (_, mut textures, mut renderer) = setup();
    let mut target = RenderToTexture::new(256, 128, None);
    assert!(!target.is_ready());

    assert!(target.init(&mut textures, &mut renderer));
    assert!(target.is_ready());
    assert_eq!(target.size(), (256, 128));
    let texture = target.texture().unwrap();
    assert_eq!((texture.width(), texture.height()), (256, 128));
    assert_eq!(renderer.count_commands("generate_render_to_texture"), 1);
}

#[test]
fn test_init_fails_when_renderer_refuses() {
    let (_, mut textures, mut renderer) = setup();
    renderer.set_refuse_textures(true);
    let mut target = RenderToTexture::new(64, 64, None);
    assert!(!target.init(&mut textures, &mut renderer));
    assert!(!target.is_ready());
}

#[test]
fn test_process_render_draws_into_frame_buffer() {
    let (mut scene, mut textures, mut renderer) = setup();
    let mut target = RenderToTexture::new(64, 64, None);
    target.init(&mut textures, &mut renderer);

    target.process_render(&mut scene, &mut renderer);
    assert_eq!(renderer.draws.len(), 1);
    assert!(renderer.draws[0].frame_buffer.is_some());
    assert_eq!(renderer.render_target(), None);
    assert_eq!(scene.viewport(), (800, 600));
}

#[test]
fn test_process_render_restores_camera() {
    let (mut scene, mut textures, mut renderer) = setup();
    let cam = scene.create_camera(Projection::Perspective);
    let mut target = RenderToTexture::new(64, 64, Some(cam));
    target.init(&mut textures, &mut renderer);

    target.process_render(&mut scene, &mut renderer);
    assert_eq!(scene.current_cam(), scene.default_cam());
    assert_eq!(scene.node(cam).and_then(|node| node.camera()).map(|c| c.backing_size()), Some((64, 64)));
}

#[test]
fn test_release_frees_texture_and_frame_buffer() {
    let (_, mut textures, mut renderer) = setup();
    let mut target = RenderToTexture::new(32, 32, None);
    target.init(&mut textures, &mut renderer);
    assert_eq!(renderer.live_textures(), 1);

    target.release(&mut textures, &mut renderer);
    assert!(!target.is_ready());
    assert_eq!(renderer.live_textures(), 0);
    assert_eq!(renderer.count_commands("release_render_to_texture"), 1);
}
