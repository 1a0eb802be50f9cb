/// Renderer trait - the graphics backend seen by the scene core
///
/// The scene manager drives one implementation per `Root`. Every call is made
/// from the single simulation/render thread.

use glam::{Mat4, Vec3};
use crate::math::Color;
use crate::resource::{TextureId, TextureImage};
use super::material_data::MaterialData;
use super::render_data::{BufferHandle, BufferKind, BufferUsage, RenderData};

/// Handle to an off-screen frame buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameBufferId(pub u32);

/// Renderer statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RendererStats {
    /// Draw calls since the last `reset_stats`
    pub draw_calls: u32,
    /// Vertices submitted since the last `reset_stats`
    pub vertices: u32,
}

pub trait Renderer {
    /// Bring the backend up once the platform surface exists
    ///
    /// Returns false if the backend cannot render.
    fn init(&mut self, use_depth_buffer: bool) -> bool;

    /// Surface width in pixels
    fn backing_width(&self) -> u32;

    /// Surface height in pixels
    fn backing_height(&self) -> u32;

    // ===== Draw =====

    /// Bind textures and fixed-function state of a material
    fn enable_material(&mut self, material: &MaterialData);

    /// Push the current model transform
    fn save_transform(&mut self);

    /// Pop the transform pushed by the matching `save_transform`
    fn recover_transform(&mut self);

    /// Submit one node's geometry with its world matrix
    fn render(&mut self, data: &RenderData, world: &Mat4);

    fn update_view(&mut self, view: &Mat4);

    fn update_projection(&mut self, projection: &Mat4);

    fn stats(&self) -> RendererStats {
        RendererStats::default()
    }

    // ===== Buffers =====

    fn create_buffer(&mut self) -> BufferHandle;

    fn upload_buffer(&mut self, handle: BufferHandle, kind: BufferKind, data: &[u8], usage: BufferUsage);

    fn release_buffer(&mut self, handle: BufferHandle);

    // ===== Textures =====

    /// Upload a decoded image; `None` if the backend refuses it
    fn create_texture(&mut self, image: &TextureImage) -> Option<TextureId>;

    fn release_texture(&mut self, id: TextureId);

    /// Create an empty color target of the given size with its frame buffer
    fn generate_render_to_texture(&mut self, width: u32, height: u32) -> Option<(TextureId, FrameBufferId)>;

    fn release_render_to_texture(&mut self, frame_buffer: FrameBufferId);

    /// Redirect subsequent draws into `frame_buffer`
    fn enable_render_to_texture(&mut self, frame_buffer: FrameBufferId, width: u32, height: u32);

    /// Draw to the surface again
    fn restore_render_target(&mut self);

    // ===== Lights =====

    /// Reserve a hardware light slot; `None` when all are taken
    fn obtain_light(&mut self) -> Option<usize>;

    fn release_light(&mut self, idx: usize);

    fn set_light_pos(&mut self, idx: usize, pos: Vec3);

    fn set_light_dir(&mut self, idx: usize, dir: Vec3);

    fn set_light_spot_dir(&mut self, idx: usize, dir: Vec3);

    fn set_light_ambient(&mut self, idx: usize, color: Color);

    fn set_light_diffuse(&mut self, idx: usize, color: Color);

    fn set_light_specular(&mut self, idx: usize, color: Color);

    fn set_light_attenuation(&mut self, idx: usize, constant: f32, linear: f32, quadratic: f32);

    fn set_light_spot_exponent(&mut self, idx: usize, exponent: f32);

    fn set_light_spot_cutoff(&mut self, idx: usize, cutoff: f32);
}
