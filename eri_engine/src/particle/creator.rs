/// Reusable particle system template.

use std::sync::Arc;
use glam::Vec2;
use crate::renderer::{Renderer, TextureFilter};
use crate::resource::TextureManager;
use crate::scene::{NodeKey, SceneManager};
use super::affector::Affector;
use super::emitter::Emitter;
use super::particle_system::ParticleSystemSetup;

/// Material part of a particle template
#[derive(Debug, Clone, PartialEq)]
pub struct ParticleMaterialSetup {
    /// Texture path, empty for an untextured system
    pub tex_path: String,
    pub tex_filter: TextureFilter,
    pub uv_start: Vec2,
    pub uv_size: Vec2,
    pub depth_write: bool,
    pub blend_add: bool,
}

impl Default for ParticleMaterialSetup {
    fn default() -> Self {
        Self {
            tex_path: String::new(),
            tex_filter: TextureFilter::Linear,
            uv_start: Vec2::ZERO,
            uv_size: Vec2::ONE,
            depth_write: true,
            blend_add: false,
        }
    }
}

/// Everything needed to spawn identical particle systems
///
/// The setup is shared by every spawned system; the emitter and affectors
/// are cloned into each one.
#[derive(Debug, Clone)]
pub struct ParticleSystemCreator {
    pub setup: Arc<ParticleSystemSetup>,
    pub emitter: Emitter,
    pub affectors: Vec<Affector>,
    pub material_setup: ParticleMaterialSetup,
}

impl ParticleSystemCreator {
    pub fn new(setup: ParticleSystemSetup, emitter: Emitter) -> Self {
        Self {
            setup: Arc::new(setup),
            emitter,
            affectors: Vec::new(),
            material_setup: ParticleMaterialSetup::default(),
        }
    }

    /// Spawn a detached particle system node in `scene`
    pub fn create(
        &self,
        scene: &mut SceneManager,
        textures: &mut TextureManager,
        renderer: &mut dyn Renderer,
    ) -> NodeKey {
        let key = scene.create_particle_system(self.setup.clone());
        let material = &self.material_setup;

        if !material.tex_path.is_empty() {
            let filter = material.tex_filter;
            scene.set_material_path(key, &material.tex_path, filter, filter, 0, textures, renderer);
        }

        if let Some(node) = scene.node_mut(key) {
            if let Some(system) = node.particle_system_mut() {
                system.set_tex_area_uv(material.uv_start, material.uv_size);
            }
            node.set_depth_write(material.depth_write);
            if material.blend_add {
                node.blend_add();
            }

            node.set_particle_emitter(self.emitter.clone());
            if let Some(system) = node.particle_system_mut() {
                for affector in &self.affectors {
                    system.add_affector(affector.clone());
                }
            }
            node.refresh_particle_setup();
        }
        key
    }
}

#[cfg(test)]
#[path = "creator_tests.rs"]
mod tests;
