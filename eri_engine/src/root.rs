/// Root - the engine context
///
/// Owns the renderer, the scene manager and the texture and font caches.
/// Built once with [`Root::init`] and torn down with [`Root::shutdown`]
/// (or on drop). There is no global engine state besides the logger.

use std::sync::Arc;
use crate::error::{Error, Result};
use crate::log::{LogSeverity, Logger};
use crate::particle::{load_particle_script, ParticleSystemCreator, ScriptNode};
use crate::renderer::{Renderer, TextureFilter};
use crate::resource::{Font, FontLoader, FontManager, Texture, TextureManager, TextureReader};
use crate::scene::{NodeKey, RenderToTexture, SceneManager, DEFAULT_LAYER_COUNT};

/// Context settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootConfig {
    /// Ask the backend for a depth buffer
    pub use_depth_buffer: bool,
    /// Number of render layers in the scene
    pub layer_count: usize,
}

impl Default for RootConfig {
    fn default() -> Self {
        Self {
            use_depth_buffer: false,
            layer_count: DEFAULT_LAYER_COUNT,
        }
    }
}

/// Engine context
///
/// # Example
///
/// ```ignore
/// use eri_engine::eri::{Root, RootConfig};
///
/// let mut root = Root::init(RootConfig::default(), Box::new(backend), Box::new(reader), Box::new(fonts))?;
/// let sprite = root.scene_mut().create_sprite(glam::Vec2::new(32.0, 32.0), glam::Vec2::ZERO);
/// root.scene_mut().add_to_scene(sprite, 0);
///
/// loop {
///     root.update(1.0 / 60.0);
/// }
/// ```
pub struct Root {
    config: RootConfig,
    renderer: Box<dyn Renderer>,
    scene: SceneManager,
    textures: TextureManager,
    fonts: FontManager,
    is_shut_down: bool,
}

impl Root {
    /// Bring up the renderer and build an empty scene sized to its surface
    ///
    /// # Errors
    ///
    /// [`Error::InitializationFailed`] when the renderer cannot initialize or
    /// the configuration asks for no layers.
    pub fn init(
        config: RootConfig,
        mut renderer: Box<dyn Renderer>,
        texture_reader: Box<dyn TextureReader>,
        font_loader: Box<dyn FontLoader>,
    ) -> Result<Self> {
        if config.layer_count == 0 {
            return Err(Self::log_and_return_error(Error::InitializationFailed(
                "layer_count must be at least 1".to_string(),
            )));
        }
        if !renderer.init(config.use_depth_buffer) {
            return Err(Self::log_and_return_error(Error::InitializationFailed(
                "renderer init failed".to_string(),
            )));
        }

        let (width, height) = (renderer.backing_width(), renderer.backing_height());
        crate::engine_info!(
            "eri::Root",
            "Initialized {}x{}, {} layers, depth buffer {}",
            width, height, config.layer_count, config.use_depth_buffer
        );

        Ok(Self {
            scene: SceneManager::new(config.layer_count, width, height),
            textures: TextureManager::new(texture_reader),
            fonts: FontManager::new(font_loader),
            renderer,
            config,
            is_shut_down: false,
        })
    }

    fn log_and_return_error(error: Error) -> Error {
        crate::engine_error!("eri::Root", "{}", error);
        error
    }

    // ===== Access =====

    pub fn config(&self) -> &RootConfig {
        &self.config
    }

    pub fn renderer(&self) -> &dyn Renderer {
        self.renderer.as_ref()
    }

    pub fn renderer_mut(&mut self) -> &mut dyn Renderer {
        self.renderer.as_mut()
    }

    pub fn scene(&self) -> &SceneManager {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut SceneManager {
        &mut self.scene
    }

    pub fn textures(&self) -> &TextureManager {
        &self.textures
    }

    pub fn textures_mut(&mut self) -> &mut TextureManager {
        &mut self.textures
    }

    pub fn fonts_mut(&mut self) -> &mut FontManager {
        &mut self.fonts
    }

    /// Scene, texture cache and renderer borrowed together
    pub fn split_mut(&mut self) -> (&mut SceneManager, &mut TextureManager, &mut dyn Renderer) {
        (&mut self.scene, &mut self.textures, self.renderer.as_mut())
    }

    pub fn is_shut_down(&self) -> bool {
        self.is_shut_down
    }

    // ===== Frame =====

    /// Advance particle systems by `delta_time` seconds, then render
    pub fn update(&mut self, delta_time: f32) {
        debug_assert!(!self.is_shut_down, "update after shutdown");
        if self.is_shut_down {
            return;
        }
        self.scene.update(delta_time);
        self.scene.render(self.renderer.as_mut());
    }

    /// Render surface changed size
    pub fn on_viewport_resize(&mut self, width: u32, height: u32) {
        self.scene.on_viewport_resize(width, height);
    }

    // ===== Resources =====

    pub fn get_font(&mut self, path: &str) -> Option<Arc<Font>> {
        self.fonts.get_font(path)
    }

    pub fn get_texture(&mut self, path: &str) -> Option<Arc<Texture>> {
        self.textures.get_texture(path, self.renderer.as_mut())
    }

    /// See [`SceneManager::set_txt`]
    pub fn set_txt(&mut self, key: NodeKey, text: &str) {
        self.scene.set_txt(key, text, self.renderer.as_mut());
    }

    /// See [`SceneManager::set_material_path`]
    pub fn set_material_path(
        &mut self,
        key: NodeKey,
        path: &str,
        filter_min: TextureFilter,
        filter_mag: TextureFilter,
        idx: usize,
    ) -> Option<Arc<Texture>> {
        self.scene.set_material_path(
            key,
            path,
            filter_min,
            filter_mag,
            idx,
            &mut self.textures,
            self.renderer.as_mut(),
        )
    }

    /// Spawn a particle system node from a template
    pub fn create_particle_system(&mut self, creator: &ParticleSystemCreator) -> NodeKey {
        creator.create(&mut self.scene, &mut self.textures, self.renderer.as_mut())
    }

    /// Parse a particle script and spawn one system from it
    pub fn load_particle_system(&mut self, document: &[ScriptNode], script_path: &str) -> Result<NodeKey> {
        let creator = load_particle_script(document, script_path)?;
        Ok(self.create_particle_system(&creator))
    }

    // ===== Render to texture =====

    pub fn init_render_to_texture(&mut self, target: &mut RenderToTexture) -> bool {
        target.init(&mut self.textures, self.renderer.as_mut())
    }

    pub fn render_to_texture(&mut self, target: &mut RenderToTexture) {
        target.process_render(&mut self.scene, self.renderer.as_mut());
    }

    pub fn release_render_to_texture(&mut self, target: &mut RenderToTexture) {
        target.release(&mut self.textures, self.renderer.as_mut());
    }

    // ===== Teardown =====

    /// Destroy every node and release every GPU resource
    ///
    /// Idempotent; also run on drop.
    pub fn shutdown(&mut self) {
        if self.is_shut_down {
            return;
        }
        self.scene.clear();
        self.scene.flush_releases(self.renderer.as_mut());
        self.textures.release_all(self.renderer.as_mut());
        self.fonts.release_all();
        self.is_shut_down = true;
        crate::engine_info!("eri::Root", "Shut down");
    }

    // ===== Logging =====

    /// Install a custom logger for the whole process
    pub fn set_logger<L: Logger + 'static>(logger: L) {
        crate::log::set_logger(logger);
    }

    /// Reinstall the default stdout logger
    pub fn reset_logger() {
        crate::log::reset_logger();
    }

    /// Drop log entries below `severity`
    pub fn set_min_log_severity(severity: LogSeverity) {
        crate::log::set_min_severity(severity);
    }

    pub fn log(severity: LogSeverity, source: &str, message: String) {
        crate::log::log(severity, source, message);
    }

    pub fn log_detailed(severity: LogSeverity, source: &str, message: String, file: &'static str, line: u32) {
        crate::log::log_detailed(severity, source, message, file, line);
    }
}

impl Drop for Root {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
#[path = "root_tests.rs"]
mod tests;
