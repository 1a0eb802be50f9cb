/// Off-screen rendering of the scene into a texture.
///
/// The target texture is created through the texture manager (so it is
/// cached and released like any other texture) together with a renderer
/// frame buffer. `process_render` draws the whole scene into it, optionally
/// through a dedicated camera, then restores the screen target and camera.

use std::sync::Arc;
use crate::renderer::{FrameBufferId, Renderer};
use crate::resource::{Texture, TextureManager};
use super::scene_manager::SceneManager;
use super::scene_node::NodeKey;

pub struct RenderToTexture {
    width: u32,
    height: u32,
    render_cam: Option<NodeKey>,
    texture: Option<Arc<Texture>>,
    frame_buffer: Option<FrameBufferId>,
}

impl RenderToTexture {
    /// `render_cam` of `None` renders through the scene's current camera
    pub fn new(width: u32, height: u32, render_cam: Option<NodeKey>) -> Self {
        Self { width, height, render_cam, texture: None, frame_buffer: None }
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn texture(&self) -> Option<&Arc<Texture>> {
        self.texture.as_ref()
    }

    pub fn is_ready(&self) -> bool {
        self.texture.is_some() && self.frame_buffer.is_some()
    }

    pub fn set_render_cam(&mut self, cam: Option<NodeKey>) {
        self.render_cam = cam;
    }

    /// Create the target texture and frame buffer; false if the renderer refuses
    pub fn init(&mut self, textures: &mut TextureManager, renderer: &mut dyn Renderer) -> bool {
        debug_assert!(self.texture.is_none(), "render target initialized twice");
        if self.texture.is_some() {
            return true;
        }
        match textures.generate_render_to_texture(self.width, self.height, renderer) {
            Some((texture, frame_buffer)) => {
                self.texture = Some(texture);
                self.frame_buffer = Some(frame_buffer);
                true
            }
            None => {
                crate::engine_warn!(
                    "eri::RenderToTexture",
                    "Cannot create {}x{} render target",
                    self.width, self.height
                );
                false
            }
        }
    }

    pub fn release(&mut self, textures: &mut TextureManager, renderer: &mut dyn Renderer) {
        if let Some(texture) = self.texture.take() {
            textures.release_texture(&texture, renderer);
        }
        if let Some(frame_buffer) = self.frame_buffer.take() {
            renderer.release_render_to_texture(frame_buffer);
        }
    }

    /// Draw `scene` into the texture
    pub fn process_render(&mut self, scene: &mut SceneManager, renderer: &mut dyn Renderer) {
        let Some(frame_buffer) = self.frame_buffer else {
            debug_assert!(false, "process_render before init");
            return;
        };

        let previous_cam = scene.current_cam();
        let previous_viewport = scene.viewport();
        let switch_cam = self.render_cam.filter(|&cam| cam != previous_cam);

        renderer.enable_render_to_texture(frame_buffer, self.width, self.height);
        if switch_cam.is_some() {
            scene.set_current_cam(switch_cam);
        }
        scene.on_viewport_resize(self.width, self.height);

        scene.render(renderer);

        renderer.restore_render_target();
        if switch_cam.is_some() {
            scene.set_current_cam(Some(previous_cam));
        }
        scene.on_viewport_resize(previous_viewport.0, previous_viewport.1);
    }
}

#[cfg(test)]
#[path = "render_to_texture_tests.rs"]
mod tests;
