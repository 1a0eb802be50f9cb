/// Tests for ParticleSystemCreator

use rustc_hash::FxHashMap;
use crate::renderer::{BlendFactor, MockRenderer};
use crate::resource::{TextureImage, TextureReader};
use crate::scene::DEFAULT_LAYER_COUNT;
use super::*;

struct MapReader(FxHashMap<String, (u32, u32)>);

impl TextureReader for MapReader {
    fn read(&mut self, path: &str) -> Option<TextureImage> {
        let &(width, height) = self.0.get(path)?;
        Some(TextureImage {
            width,
            height,
            pixels: vec![0; (width * height * 4) as usize],
            alpha_premultiplied: false,
        })
    }
}

fn context() -> (SceneManager, TextureManager, MockRenderer) {
    let mut files = FxHashMap::default();
    files.insert("fx/spark.png".to_string(), (16, 16));
    (
        SceneManager::new(DEFAULT_LAYER_COUNT, 640, 480),
        TextureManager::new(Box::new(MapReader(files))),
        MockRenderer::new(640, 480),
    )
}

fn creator() -> ParticleSystemCreator {
    let setup = ParticleSystemSetup { life_min: 1.0, life_max: 2.0, ..Default::default() };
    let mut creator = ParticleSystemCreator::new(setup, Emitter::new_circle(3.0, 10.0, 0.0, 360.0));
    creator.affectors.push(Affector::force(Vec2::new(0.0, -10.0)));
    creator.affectors.push(Affector::rotate(90.0, 0.0).with_period(0.5));
    creator
}

// ============================================================================
// Tests
// ============================================================================

#[test]
fn test_create_installs_emitter_and_affectors() {
    let (mut scene, mut textures, mut renderer) = context();
    let template = creator();
    let key = template.create(&mut scene, &mut textures, &mut renderer);

    let node = scene.node(key).unwrap();
    let system = node.particle_system().unwrap();
    assert_eq!(system.emitter(), Some(&template.emitter));
    assert_eq!(system.affectors(), &template.affectors[..]);
    assert_eq!(system.capacity(), 25);
    assert!(system.particles().iter().all(|p| p.affector_timers == vec![-1.0, 0.5]));
    assert!(node.render_data().apply_identity_model_matrix);
    assert!(!node.is_in_scene());
}

#[test]
fn test_create_shares_setup() {
    let (mut scene, mut textures, mut renderer) = context();
    let template = creator();
    let a = template.create(&mut scene, &mut textures, &mut renderer);
    let b = template.create(&mut scene, &mut textures, &mut renderer);

    let setup_a = scene.node(a).unwrap().particle_system().unwrap().setup() as *const _;
    let setup_b = scene.node(b).unwrap().particle_system().unwrap().setup() as *const _;
    assert_eq!(setup_a, setup_b);
    assert_eq!(Arc::strong_count(&template.setup), 3);
}

#[test]
fn test_create_applies_material() {
    let (mut scene, mut textures, mut renderer) = context();
    let mut template = creator();
    template.material_setup = ParticleMaterialSetup {
        tex_path: "fx/spark.png".to_string(),
        tex_filter: TextureFilter::Nearest,
        uv_start: Vec2::new(0.5, 0.0),
        uv_size: Vec2::new(0.5, 0.5),
        depth_write: false,
        blend_add: true,
    };
    let key = template.create(&mut scene, &mut textures, &mut renderer);

    let node = scene.node(key).unwrap();
    assert_eq!(node.material().used_unit, 1);
    assert_eq!(node.material().units[0].filter_min, TextureFilter::Nearest);
    assert_eq!(node.material().units[0].filter_mag, TextureFilter::Nearest);
    assert!(!node.material().depth_write);
    assert_eq!(node.render_data().blend_dst, BlendFactor::One);
    assert_eq!(
        node.particle_system().unwrap().uv_area(),
        (Vec2::new(0.5, 0.0), Vec2::new(0.5, 0.5))
    );
}

#[test]
fn test_create_without_texture_file() {
    let (mut scene, mut textures, mut renderer) = context();
    let mut template = creator();
    template.material_setup.tex_path = "fx/missing.png".to_string();
    let key = template.create(&mut scene, &mut textures, &mut renderer);

    let node = scene.node(key).unwrap();
    assert_eq!(node.material().used_unit, 0);
    assert!(node.particle_system().unwrap().emitter().is_some());
}

#[test]
fn test_created_systems_run_independently() {
    let (mut scene, mut textures, mut renderer) = context();
    let template = creator();
    let a = template.create(&mut scene, &mut textures, &mut renderer);
    let b = template.create(&mut scene, &mut textures, &mut renderer);
    scene.add_to_scene(a, 0);
    scene.add_to_scene(b, 0);

    scene.update_particle_system(a, 0.05);
    assert_eq!(scene.node(a).unwrap().particle_system().unwrap().in_use_count(), 1);
    assert_eq!(scene.node(b).unwrap().particle_system().unwrap().in_use_count(), 0);
}
