/// Unit tests for MockRenderer.

use super::*;
use crate::renderer::{BlendMode, VertexData, VertexPosTex};

fn quad_data() -> RenderData {
    let mut data = RenderData::default();
    data.set_vertices(
        VertexData::PosTex(vec![VertexPosTex::default(); 4]),
        PrimitiveType::TriangleStrip,
    );
    data
}

// ============================================================================
// Lifecycle
// ============================================================================

#[test]
fn test_init_records_depth_flag() {
    let mut renderer = MockRenderer::new(320, 240);
    assert!(renderer.init(true));
    assert_eq!(renderer.use_depth_buffer(), Some(true));
    assert_eq!(renderer.backing_width(), 320);
    assert_eq!(renderer.backing_height(), 240);
}

#[test]
fn test_failing_renderer_reports_init_failure() {
    let mut renderer = MockRenderer::failing();
    assert!(!renderer.init(false));
}

// ============================================================================
// Draw recording
// ============================================================================

#[test]
fn test_render_records_draw_and_stats() {
    let mut renderer = MockRenderer::new(100, 100);
    let mut data = quad_data();
    data.set_blend(BlendMode::Add);
    let world = Mat4::from_translation(Vec3::new(1.0, 2.0, 0.0));

    renderer.enable_material(&MaterialData::default());
    renderer.save_transform();
    renderer.render(&data, &world);
    renderer.recover_transform();

    assert_eq!(renderer.draws.len(), 1);
    assert_eq!(renderer.draws[0].vertex_count, 4);
    assert_eq!(renderer.draws[0].world, world);
    assert_eq!(renderer.stats().draw_calls, 1);
    assert_eq!(renderer.stats().vertices, 4);
    assert_eq!(renderer.transform_depth(), 0);
    assert_eq!(renderer.max_transform_depth(), 1);
    assert_eq!(
        renderer.commands,
        vec![
            "enable_material units=0 texture=0",
            "save_transform",
            "render vertices=4 indices=0",
            "recover_transform",
        ]
    );
}

#[test]
fn test_clear_log_keeps_resources() {
    let mut renderer = MockRenderer::new(10, 10);
    let handle = renderer.create_buffer();
    renderer.clear_log();
    assert!(renderer.commands.is_empty());
    assert_eq!(renderer.live_buffers(), 1);
    renderer.release_buffer(handle);
    assert_eq!(renderer.live_buffers(), 0);
}

// ============================================================================
// Buffers and textures
// ============================================================================

#[test]
fn test_render_data_sync_creates_buffer_once() {
    let mut renderer = MockRenderer::new(10, 10);
    let mut data = quad_data();

    data.sync_buffers(&mut renderer);
    data.sync_buffers(&mut renderer);

    let handle = data.vertex_buffer().expect("vertex buffer created");
    assert_eq!(renderer.count_commands("create_buffer"), 1);
    assert_eq!(renderer.count_commands("upload_buffer"), 1);
    assert_eq!(renderer.buffer_size(handle), Some(4 * std::mem::size_of::<VertexPosTex>()));
}

#[test]
fn test_texture_ids_start_at_one_and_recycle() {
    let mut renderer = MockRenderer::new(10, 10);
    let image = TextureImage { width: 2, height: 2, pixels: vec![0; 16], alpha_premultiplied: false };

    let a = renderer.create_texture(&image).unwrap();
    let b = renderer.create_texture(&image).unwrap();
    assert_eq!(a, TextureId(1));
    assert_eq!(b, TextureId(2));

    renderer.release_texture(a);
    assert_eq!(renderer.live_textures(), 1);
    assert_eq!(renderer.create_texture(&image), Some(TextureId(1)));
}

#[test]
fn test_refused_textures() {
    let mut renderer = MockRenderer::new(10, 10);
    renderer.set_refuse_textures(true);
    assert!(renderer.create_texture(&TextureImage::default()).is_none());
    assert!(renderer.generate_render_to_texture(64, 64).is_none());
}

#[test]
fn test_render_to_texture_redirects_draws() {
    let mut renderer = MockRenderer::new(10, 10);
    let (_, fb) = renderer.generate_render_to_texture(64, 64).unwrap();

    renderer.enable_render_to_texture(fb, 64, 64);
    renderer.render(&quad_data(), &Mat4::IDENTITY);
    renderer.restore_render_target();
    renderer.render(&quad_data(), &Mat4::IDENTITY);

    assert_eq!(renderer.draws[0].frame_buffer, Some(fb));
    assert_eq!(renderer.draws[1].frame_buffer, None);
}

// ============================================================================
// Lights
// ============================================================================

#[test]
fn test_light_slots_are_bounded() {
    let mut renderer = MockRenderer::new(10, 10);
    let slots: Vec<usize> = (0..MOCK_MAX_LIGHTS).filter_map(|_| renderer.obtain_light()).collect();
    assert_eq!(slots.len(), MOCK_MAX_LIGHTS);
    assert!(renderer.obtain_light().is_none());

    renderer.release_light(3);
    assert_eq!(renderer.obtain_light(), Some(3));
}

#[test]
fn test_light_settings_recorded() {
    let mut renderer = MockRenderer::new(10, 10);
    let idx = renderer.obtain_light().unwrap();
    renderer.set_light_diffuse(idx, Color::RED);
    renderer.set_light_attenuation(idx, 1.0, 0.5, 0.25);

    let light = &renderer.lights[&idx];
    assert_eq!(light.diffuse, Some(Color::RED));
    assert_eq!(light.attenuation, Some([1.0, 0.5, 0.25]));
    assert_eq!(light.pos, None);
}
