/// Unit tests for Texture and TextureManager

use super::*;
use crate::renderer::MockRenderer;
use std::cell::Cell;
use std::rc::Rc;

struct CountingReader {
    reads: Rc<Cell<usize>>,
}

impl TextureReader for CountingReader {
    fn read(&mut self, path: &str) -> Option<TextureImage> {
        self.reads.set(self.reads.get() + 1);
        if path.starts_with("missing") {
            return None;
        }
        Some(TextureImage {
            width: 2,
            height: 1,
            pixels: vec![255, 0, 0, 255, 0, 0, 255, 128],
            alpha_premultiplied: path.contains("premul"),
        })
    }
}

fn create_manager() -> (TextureManager, Rc<Cell<usize>>) {
    let reads = Rc::new(Cell::new(0));
    (TextureManager::new(Box::new(CountingReader { reads: reads.clone() })), reads)
}

// ============================================================================
// Cache
// ============================================================================

#[test]
fn test_get_texture_caches_by_path() {
    let (mut manager, reads) = create_manager();
    let mut renderer = MockRenderer::new(64, 64);

    let a = manager.get_texture("media/a.png", &mut renderer).unwrap();
    let b = manager.get_texture("media/a.png", &mut renderer).unwrap();

    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(reads.get(), 1);
    assert_eq!(manager.len(), 1);
    assert_eq!(a.width(), 2);
    assert_eq!(a.height(), 1);
    assert_eq!(renderer.live_textures(), 1);
}

#[test]
fn test_missing_texture_returns_none() {
    let (mut manager, _) = create_manager();
    let mut renderer = MockRenderer::new(64, 64);
    assert!(manager.get_texture("missing.png", &mut renderer).is_none());
    assert!(manager.is_empty());
}

#[test]
fn test_refused_upload_returns_none() {
    let (mut manager, _) = create_manager();
    let mut renderer = MockRenderer::new(64, 64);
    renderer.set_refuse_textures(true);
    assert!(manager.get_texture("a.png", &mut renderer).is_none());
}

#[test]
fn test_release_texture_removes_entry() {
    let (mut manager, reads) = create_manager();
    let mut renderer = MockRenderer::new(64, 64);

    let tex = manager.get_texture("a.png", &mut renderer).unwrap();
    manager.release_texture(&tex, &mut renderer);
    assert!(manager.is_empty());
    assert_eq!(renderer.live_textures(), 0);

    manager.get_texture("a.png", &mut renderer).unwrap();
    assert_eq!(reads.get(), 2);
}

#[test]
fn test_render_to_texture_serial_keys() {
    let (mut manager, _) = create_manager();
    let mut renderer = MockRenderer::new(64, 64);

    let (first, fb0) = manager.generate_render_to_texture(32, 16, &mut renderer).unwrap();
    let (second, fb1) = manager.generate_render_to_texture(32, 16, &mut renderer).unwrap();

    assert_ne!(first.id(), second.id());
    assert_ne!(fb0, fb1);
    assert_eq!(first.width(), 32);
    assert_eq!(manager.len(), 2);
    assert!(manager.textures.contains_key("0_render2tex"));
    assert!(manager.textures.contains_key("1_render2tex"));
}

#[test]
fn test_release_all() {
    let (mut manager, _) = create_manager();
    let mut renderer = MockRenderer::new(64, 64);
    manager.get_texture("a.png", &mut renderer);
    manager.get_texture("b.png", &mut renderer);
    manager.release_all(&mut renderer);
    assert!(manager.is_empty());
    assert_eq!(renderer.live_textures(), 0);
}

// ============================================================================
// Pixels
// ============================================================================

#[test]
fn test_pixel_color_requires_kept_pixels() {
    let (mut manager, _) = create_manager();
    let mut renderer = MockRenderer::new(64, 64);

    let plain = manager.get_texture("plain.png", &mut renderer).unwrap();
    assert!(plain.pixel_color(0, 0).is_none());

    manager.set_keep_pixels(true);
    let kept = manager.get_texture("kept_premul.png", &mut renderer).unwrap();
    assert!(kept.alpha_premultiplied());
    assert_eq!(kept.pixel_color(0, 0), Some(Color::RED));
    let second = kept.pixel_color(1, 0).unwrap();
    assert!((second.a - 128.0 / 255.0).abs() < 1e-6);
    assert!(kept.pixel_color(2, 0).is_none());
}
