//! Integration tests for the scene through the Root context
//!
//! These tests drive complete frames against the mock renderer: hierarchy,
//! visibility, culling, text, particles and resource teardown.
//! No GPU required.
//!
//! Run with: cargo test --test scene_integration_tests

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use eri_engine::eri::particle::{Emitter, ParticleSystemCreator, ParticleSystemSetup, ScriptNode};
use eri_engine::eri::render::MockRenderer;
use eri_engine::eri::resource::{
    CharSetting, Font, FontLoader, Texture, TextureId, TextureImage, TextureReader,
};
use eri_engine::eri::scene::NodeKey;
use eri_engine::eri::{Root, RootConfig};
use eri_engine::glam::{Vec2, Vec3};
use rustc_hash::FxHashMap;

// ============================================================================
// TEST HELPERS
// ============================================================================

struct AnyPng;

impl TextureReader for AnyPng {
    fn read(&mut self, path: &str) -> Option<TextureImage> {
        path.ends_with(".png").then(|| TextureImage {
            width: 64,
            height: 64,
            pixels: vec![255; 64 * 64 * 4],
            alpha_premultiplied: false,
        })
    }
}

/// Serves one atlas font with glyphs 'A' and 'B' of 8x8 pixels
struct AtlasFonts;

impl FontLoader for AtlasFonts {
    fn load(&mut self, path: &str) -> Option<Font> {
        if path != "fonts/mono.fnt" {
            return None;
        }
        let mut chars = FxHashMap::default();
        for (i, code) in ['A', 'B'].into_iter().enumerate() {
            chars.insert(
                code as u32,
                CharSetting {
                    x: i as f32 * 9.0,
                    y: 0.0,
                    width: 9.0,
                    height: 9.0,
                    x_offset: 0.0,
                    y_offset: 0.0,
                    x_advance: 8.0,
                },
            );
        }
        let texture = Arc::new(Texture::new(TextureId(900), 128, 128, false));
        Some(Font::new_atlas("mono", 8, 10.0, texture, chars))
    }
}

fn setup() -> (Root, Rc<RefCell<MockRenderer>>) {
    let mock = Rc::new(RefCell::new(MockRenderer::new(800, 600)));
    let root = Root::init(
        RootConfig::default(),
        Box::new(mock.clone()),
        Box::new(AnyPng),
        Box::new(AtlasFonts),
    )
    .unwrap();
    (root, mock)
}

fn frame(root: &mut Root, mock: &Rc<RefCell<MockRenderer>>) -> usize {
    mock.borrow_mut().clear_log();
    root.update(0.05);
    mock.borrow().draws.len()
}

fn sprite_in_layer(root: &mut Root, layer: usize) -> NodeKey {
    let scene = root.scene_mut();
    let key = scene.create_sprite(Vec2::new(10.0, 10.0), Vec2::ZERO);
    scene.add_to_scene(key, layer);
    key
}

// ============================================================================
// HIERARCHY AND VISIBILITY
// ============================================================================

#[test]
fn test_integration_hierarchy_frame() {
    let (mut root, mock) = setup();
    let parent = sprite_in_layer(&mut root, 0);
    let child = sprite_in_layer(&mut root, 0);
    let grandchild = sprite_in_layer(&mut root, 1);
    {
        let scene = root.scene_mut();
        scene.add_child(parent, child);
        scene.add_child(child, grandchild);
        scene.set_pos(parent, Vec2::new(100.0, 0.0));
        scene.set_pos(child, Vec2::new(0.0, 50.0));
        scene.set_pos(grandchild, Vec2::new(5.0, 5.0));
    }

    assert_eq!(frame(&mut root, &mock), 3);
    let positions: Vec<Vec3> = mock.borrow().draws.iter().map(|d| d.world.w_axis.truncate()).collect();
    assert!(positions.contains(&Vec3::new(105.0, 55.0, 0.0)));

    root.scene_mut().set_visible(parent, false, false);
    assert_eq!(frame(&mut root, &mock), 0);

    root.scene_mut().remove_from_parent(child);
    assert_eq!(frame(&mut root, &mock), 2);
    let positions: Vec<Vec3> = mock.borrow().draws.iter().map(|d| d.world.w_axis.truncate()).collect();
    assert!(positions.contains(&Vec3::new(5.0, 55.0, 0.0)));
}

#[test]
fn test_integration_layers_draw_in_order() {
    let (mut root, mock) = setup();
    let top = sprite_in_layer(&mut root, 5);
    let bottom = sprite_in_layer(&mut root, 2);
    root.scene_mut().set_pos(top, Vec2::new(1.0, 0.0));
    root.scene_mut().set_pos(bottom, Vec2::new(2.0, 0.0));

    assert_eq!(frame(&mut root, &mock), 2);
    let xs: Vec<f32> = mock.borrow().draws.iter().map(|d| d.world.w_axis.x).collect();
    assert_eq!(xs, vec![2.0, 1.0]);
}

// ============================================================================
// CAMERA
// ============================================================================

#[test]
fn test_integration_camera_follow_culling() {
    let (mut root, mock) = setup();
    let far = sprite_in_layer(&mut root, 0);
    root.scene_mut().node_mut(far).unwrap().create_sphere_bounding(8.0);
    root.scene_mut().set_pos(far, Vec2::new(2000.0, 0.0));
    assert_eq!(frame(&mut root, &mock), 0);

    let cam = root.scene().default_cam();
    root.scene_mut().set_pos(cam, Vec2::new(2000.0, 0.0));
    assert_eq!(frame(&mut root, &mock), 1);
    assert_eq!(mock.borrow().count_commands("update_view"), 1);
}

// ============================================================================
// TEXT
// ============================================================================

#[test]
fn test_integration_atlas_text() {
    let (mut root, mock) = setup();
    let font = root.get_font("fonts/mono.fnt").unwrap();
    let txt = root.scene_mut().create_txt(font, 8, false);
    root.scene_mut().add_to_scene(txt, 0);
    root.set_txt(txt, "AB?A");

    assert_eq!(frame(&mut root, &mock), 1);
    assert_eq!(mock.borrow().draws[0].vertex_count, 18);
    assert_eq!(mock.borrow().draws[0].texture, TextureId(900));

    let size = root.scene().node(txt).unwrap().txt().unwrap().size();
    assert_eq!(size, Vec2::new(24.0, 10.0));
}

// ============================================================================
// PARTICLES
// ============================================================================

#[test]
fn test_integration_particle_pool_bound() {
    let (mut root, mock) = setup();
    let setup = ParticleSystemSetup { life_min: 2.0, life_max: 2.0, ..Default::default() };
    let creator = ParticleSystemCreator::new(setup, Emitter::new_box(Vec2::new(5.0, 5.0), 10.0, 0.0, 360.0));
    let key = root.create_particle_system(&creator);
    root.scene_mut().add_to_scene(key, 0);

    let capacity = root.scene().node(key).unwrap().particle_system().unwrap().capacity();
    assert_eq!(capacity, 25);

    let mut emitted = false;
    for _ in 0..40 {
        frame(&mut root, &mock);
        let system = root.scene().node(key).unwrap().particle_system().unwrap();
        assert!(system.in_use_count() <= capacity);
        let vertex_count = root.scene().node(key).unwrap().render_data().vertex_count;
        assert_eq!(vertex_count, system.in_use_count() * 4);
        emitted |= system.in_use_count() > 0;
    }
    assert!(emitted);
}

#[test]
fn test_integration_scripted_particles_with_texture() {
    let (mut root, mock) = setup();
    let doc = vec![ScriptNode::new("particle_system")
        .with_child(
            ScriptNode::new("particle")
                .with_child(ScriptNode::new("life").with_attr("min", "0.5").with_attr("max", "0.5")),
        )
        .with_child(ScriptNode::new("circle_emitter").with_attr("radius", "4").with_attr("rate", "40"))
        .with_child(ScriptNode::new("material").with_attr("tex", "spark.png").with_attr("blend", "add"))];
    let key = root.load_particle_system(&doc, "fx/sparks.xml").unwrap();
    root.scene_mut().add_to_scene(key, 0);

    assert!(root.textures().len() == 1);
    for _ in 0..10 {
        frame(&mut root, &mock);
    }
    let draws = mock.borrow().draws.clone();
    assert_eq!(draws.len(), 1);
    assert!(draws[0].identity_model);
    assert_ne!(draws[0].texture, TextureId::default());
}

// ============================================================================
// TEARDOWN
// ============================================================================

#[test]
fn test_integration_destroy_then_shutdown() {
    let (mut root, mock) = setup();
    let parent = sprite_in_layer(&mut root, 0);
    let child = sprite_in_layer(&mut root, 0);
    root.scene_mut().add_child(parent, child);
    let keep = sprite_in_layer(&mut root, 1);
    frame(&mut root, &mock);
    assert_eq!(mock.borrow().live_buffers(), 3);

    root.scene_mut().destroy_node(parent);
    assert_eq!(frame(&mut root, &mock), 1);
    assert_eq!(mock.borrow().live_buffers(), 1);
    assert!(root.scene().contains(keep));

    root.shutdown();
    assert_eq!(mock.borrow().live_buffers(), 0);
    assert_eq!(mock.borrow().live_textures(), 0);
}
