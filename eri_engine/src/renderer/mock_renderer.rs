/// Mock Renderer (no GPU required)
///
/// Records every call as a readable command string, tracks live buffers,
/// textures, frame buffers and light slots, and checks that transform
/// save/recover calls are strictly nested. Used by unit and integration
/// tests and for headless runs.

use std::cell::RefCell;
use std::rc::Rc;
use glam::{Mat4, Vec3};
use rustc_hash::FxHashMap;
use crate::math::Color;
use crate::resource::{TextureId, TextureImage};
use crate::utils::SlotAllocator;
use super::material_data::MaterialData;
use super::render_data::{BufferHandle, BufferKind, BufferUsage, PrimitiveType, RenderData};
use super::renderer::{FrameBufferId, Renderer, RendererStats};

/// Hardware light slots exposed by the mock
pub const MOCK_MAX_LIGHTS: usize = 8;

// ============================================================================
// Recorded state
// ============================================================================

/// One recorded `render` call
#[derive(Debug, Clone, PartialEq)]
pub struct MockDraw {
    pub vertex_count: usize,
    pub index_count: usize,
    pub primitive: PrimitiveType,
    pub world: Mat4,
    pub color: Color,
    /// Unit 0 texture of the last enabled material
    pub texture: TextureId,
    pub identity_model: bool,
    pub frame_buffer: Option<FrameBufferId>,
}

/// Last values pushed to a light slot
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MockLight {
    pub pos: Option<Vec3>,
    pub dir: Option<Vec3>,
    pub spot_dir: Option<Vec3>,
    pub ambient: Option<Color>,
    pub diffuse: Option<Color>,
    pub specular: Option<Color>,
    pub attenuation: Option<[f32; 3]>,
    pub spot_exponent: Option<f32>,
    pub spot_cutoff: Option<f32>,
}

// ============================================================================
// Mock Renderer
// ============================================================================

pub struct MockRenderer {
    /// Every call in order, e.g. `"render vertices=4"`
    pub commands: Vec<String>,
    pub draws: Vec<MockDraw>,
    pub lights: FxHashMap<usize, MockLight>,
    pub view: Mat4,
    pub projection: Mat4,
    width: u32,
    height: u32,
    init_result: bool,
    use_depth_buffer: Option<bool>,
    transform_depth: usize,
    max_transform_depth: usize,
    buffers: SlotAllocator,
    buffer_sizes: FxHashMap<BufferHandle, usize>,
    textures: SlotAllocator,
    refuse_textures: bool,
    frame_buffers: SlotAllocator,
    render_target: Option<FrameBufferId>,
    light_slots: SlotAllocator,
    bound_texture: TextureId,
    stats: RendererStats,
}

impl MockRenderer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            commands: Vec::new(),
            draws: Vec::new(),
            lights: FxHashMap::default(),
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
            width,
            height,
            init_result: true,
            use_depth_buffer: None,
            transform_depth: 0,
            max_transform_depth: 0,
            buffers: SlotAllocator::new(),
            buffer_sizes: FxHashMap::default(),
            textures: SlotAllocator::new(),
            refuse_textures: false,
            frame_buffers: SlotAllocator::new(),
            render_target: None,
            light_slots: SlotAllocator::with_capacity(MOCK_MAX_LIGHTS),
            bound_texture: TextureId::default(),
            stats: RendererStats::default(),
        }
    }

    /// A renderer whose `init` reports failure
    pub fn failing() -> Self {
        Self { init_result: false, ..Self::new(0, 0) }
    }

    /// Make `create_texture` and `generate_render_to_texture` fail
    pub fn set_refuse_textures(&mut self, refuse: bool) {
        self.refuse_textures = refuse;
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    /// Depth buffer flag passed to `init`, if it was called
    pub fn use_depth_buffer(&self) -> Option<bool> {
        self.use_depth_buffer
    }

    pub fn transform_depth(&self) -> usize {
        self.transform_depth
    }

    pub fn max_transform_depth(&self) -> usize {
        self.max_transform_depth
    }

    pub fn live_buffers(&self) -> usize {
        self.buffers.len()
    }

    /// Bytes last uploaded to `handle`
    pub fn buffer_size(&self, handle: BufferHandle) -> Option<usize> {
        self.buffer_sizes.get(&handle).copied()
    }

    pub fn live_textures(&self) -> usize {
        self.textures.len()
    }

    pub fn live_lights(&self) -> usize {
        self.light_slots.len()
    }

    pub fn render_target(&self) -> Option<FrameBufferId> {
        self.render_target
    }

    /// Commands starting with `prefix`
    pub fn count_commands(&self, prefix: &str) -> usize {
        self.commands.iter().filter(|cmd| cmd.starts_with(prefix)).count()
    }

    /// Forget recorded commands and draws, keep live resources
    pub fn clear_log(&mut self) {
        self.commands.clear();
        self.draws.clear();
    }
}

impl Renderer for MockRenderer {
    fn init(&mut self, use_depth_buffer: bool) -> bool {
        self.use_depth_buffer = Some(use_depth_buffer);
        self.commands.push(format!("init depth={}", use_depth_buffer));
        self.init_result
    }

    fn backing_width(&self) -> u32 {
        self.width
    }

    fn backing_height(&self) -> u32 {
        self.height
    }

    fn enable_material(&mut self, material: &MaterialData) {
        self.bound_texture = material.single_texture_id();
        self.commands.push(format!(
            "enable_material units={} texture={}",
            material.used_unit, self.bound_texture.0
        ));
    }

    fn save_transform(&mut self) {
        self.transform_depth += 1;
        self.max_transform_depth = self.max_transform_depth.max(self.transform_depth);
        self.commands.push("save_transform".to_string());
    }

    fn recover_transform(&mut self) {
        debug_assert!(self.transform_depth > 0, "recover_transform without save_transform");
        self.transform_depth = self.transform_depth.saturating_sub(1);
        self.commands.push("recover_transform".to_string());
    }

    fn render(&mut self, data: &RenderData, world: &Mat4) {
        self.stats.draw_calls += 1;
        self.stats.vertices += data.vertex_count as u32;
        self.commands.push(format!(
            "render vertices={} indices={}",
            data.vertex_count, data.index_count
        ));
        self.draws.push(MockDraw {
            vertex_count: data.vertex_count,
            index_count: data.index_count,
            primitive: data.primitive,
            world: *world,
            color: data.color,
            texture: self.bound_texture,
            identity_model: data.apply_identity_model_matrix,
            frame_buffer: self.render_target,
        });
    }

    fn update_view(&mut self, view: &Mat4) {
        self.view = *view;
        self.commands.push("update_view".to_string());
    }

    fn update_projection(&mut self, projection: &Mat4) {
        self.projection = *projection;
        self.commands.push("update_projection".to_string());
    }

    fn stats(&self) -> RendererStats {
        self.stats
    }

    fn create_buffer(&mut self) -> BufferHandle {
        let handle = BufferHandle(self.buffers.alloc().unwrap_or_default() as u32);
        self.commands.push(format!("create_buffer {}", handle.0));
        handle
    }

    fn upload_buffer(&mut self, handle: BufferHandle, kind: BufferKind, data: &[u8], usage: BufferUsage) {
        debug_assert!(self.buffers.is_allocated(handle.0 as usize), "upload to a released buffer");
        self.buffer_sizes.insert(handle, data.len());
        self.commands.push(format!(
            "upload_buffer {} {:?} {:?} bytes={}",
            handle.0, kind, usage, data.len()
        ));
    }

    fn release_buffer(&mut self, handle: BufferHandle) {
        self.buffers.free(handle.0 as usize);
        self.buffer_sizes.remove(&handle);
        self.commands.push(format!("release_buffer {}", handle.0));
    }

    fn create_texture(&mut self, image: &TextureImage) -> Option<TextureId> {
        if self.refuse_textures {
            return None;
        }
        let id = TextureId(self.textures.alloc()? as u32 + 1);
        self.commands.push(format!("create_texture {} {}x{}", id.0, image.width, image.height));
        Some(id)
    }

    fn release_texture(&mut self, id: TextureId) {
        if id.0 > 0 && self.textures.is_allocated(id.0 as usize - 1) {
            self.textures.free(id.0 as usize - 1);
        }
        self.commands.push(format!("release_texture {}", id.0));
    }

    fn generate_render_to_texture(&mut self, width: u32, height: u32) -> Option<(TextureId, FrameBufferId)> {
        if self.refuse_textures {
            return None;
        }
        let id = TextureId(self.textures.alloc()? as u32 + 1);
        let frame_buffer = FrameBufferId(self.frame_buffers.alloc()? as u32);
        self.commands.push(format!(
            "generate_render_to_texture {} fb={} {}x{}",
            id.0, frame_buffer.0, width, height
        ));
        Some((id, frame_buffer))
    }

    fn release_render_to_texture(&mut self, frame_buffer: FrameBufferId) {
        self.frame_buffers.free(frame_buffer.0 as usize);
        self.commands.push(format!("release_render_to_texture fb={}", frame_buffer.0));
    }

    fn enable_render_to_texture(&mut self, frame_buffer: FrameBufferId, width: u32, height: u32) {
        self.render_target = Some(frame_buffer);
        self.commands.push(format!("enable_render_to_texture fb={} {}x{}", frame_buffer.0, width, height));
    }

    fn restore_render_target(&mut self) {
        self.render_target = None;
        self.commands.push("restore_render_target".to_string());
    }

    fn obtain_light(&mut self) -> Option<usize> {
        let idx = self.light_slots.alloc()?;
        self.lights.insert(idx, MockLight::default());
        self.commands.push(format!("obtain_light {}", idx));
        Some(idx)
    }

    fn release_light(&mut self, idx: usize) {
        self.light_slots.free(idx);
        self.lights.remove(&idx);
        self.commands.push(format!("release_light {}", idx));
    }

    fn set_light_pos(&mut self, idx: usize, pos: Vec3) {
        self.lights.entry(idx).or_default().pos = Some(pos);
        self.commands.push(format!("set_light_pos {}", idx));
    }

    fn set_light_dir(&mut self, idx: usize, dir: Vec3) {
        self.lights.entry(idx).or_default().dir = Some(dir);
        self.commands.push(format!("set_light_dir {}", idx));
    }

    fn set_light_spot_dir(&mut self, idx: usize, dir: Vec3) {
        self.lights.entry(idx).or_default().spot_dir = Some(dir);
        self.commands.push(format!("set_light_spot_dir {}", idx));
    }

    fn set_light_ambient(&mut self, idx: usize, color: Color) {
        self.lights.entry(idx).or_default().ambient = Some(color);
        self.commands.push(format!("set_light_ambient {}", idx));
    }

    fn set_light_diffuse(&mut self, idx: usize, color: Color) {
        self.lights.entry(idx).or_default().diffuse = Some(color);
        self.commands.push(format!("set_light_diffuse {}", idx));
    }

    fn set_light_specular(&mut self, idx: usize, color: Color) {
        self.lights.entry(idx).or_default().specular = Some(color);
        self.commands.push(format!("set_light_specular {}", idx));
    }

    fn set_light_attenuation(&mut self, idx: usize, constant: f32, linear: f32, quadratic: f32) {
        self.lights.entry(idx).or_default().attenuation = Some([constant, linear, quadratic]);
        self.commands.push(format!("set_light_attenuation {}", idx));
    }

    fn set_light_spot_exponent(&mut self, idx: usize, exponent: f32) {
        self.lights.entry(idx).or_default().spot_exponent = Some(exponent);
        self.commands.push(format!("set_light_spot_exponent {}", idx));
    }

    fn set_light_spot_cutoff(&mut self, idx: usize, cutoff: f32) {
        self.lights.entry(idx).or_default().spot_cutoff = Some(cutoff);
        self.commands.push(format!("set_light_spot_cutoff {}", idx));
    }
}

// ============================================================================
// Shared handle
// ============================================================================

/// Lets a test keep inspecting a mock after handing it to a `Root`
impl Renderer for Rc<RefCell<MockRenderer>> {
    fn init(&mut self, use_depth_buffer: bool) -> bool {
        self.borrow_mut().init(use_depth_buffer)
    }

    fn backing_width(&self) -> u32 {
        self.borrow().backing_width()
    }

    fn backing_height(&self) -> u32 {
        self.borrow().backing_height()
    }

    fn enable_material(&mut self, material: &MaterialData) {
        self.borrow_mut().enable_material(material)
    }

    fn save_transform(&mut self) {
        self.borrow_mut().save_transform()
    }

    fn recover_transform(&mut self) {
        self.borrow_mut().recover_transform()
    }

    fn render(&mut self, data: &RenderData, world: &Mat4) {
        self.borrow_mut().render(data, world)
    }

    fn update_view(&mut self, view: &Mat4) {
        self.borrow_mut().update_view(view)
    }

    fn update_projection(&mut self, projection: &Mat4) {
        self.borrow_mut().update_projection(projection)
    }

    fn stats(&self) -> RendererStats {
        self.borrow().stats()
    }

    fn create_buffer(&mut self) -> BufferHandle {
        self.borrow_mut().create_buffer()
    }

    fn upload_buffer(&mut self, handle: BufferHandle, kind: BufferKind, data: &[u8], usage: BufferUsage) {
        self.borrow_mut().upload_buffer(handle, kind, data, usage)
    }

    fn release_buffer(&mut self, handle: BufferHandle) {
        self.borrow_mut().release_buffer(handle)
    }

    fn create_texture(&mut self, image: &TextureImage) -> Option<TextureId> {
        self.borrow_mut().create_texture(image)
    }

    fn release_texture(&mut self, id: TextureId) {
        self.borrow_mut().release_texture(id)
    }

    fn generate_render_to_texture(&mut self, width: u32, height: u32) -> Option<(TextureId, FrameBufferId)> {
        self.borrow_mut().generate_render_to_texture(width, height)
    }

    fn release_render_to_texture(&mut self, frame_buffer: FrameBufferId) {
        self.borrow_mut().release_render_to_texture(frame_buffer)
    }

    fn enable_render_to_texture(&mut self, frame_buffer: FrameBufferId, width: u32, height: u32) {
        self.borrow_mut().enable_render_to_texture(frame_buffer, width, height)
    }

    fn restore_render_target(&mut self) {
        self.borrow_mut().restore_render_target()
    }

    fn obtain_light(&mut self) -> Option<usize> {
        self.borrow_mut().obtain_light()
    }

    fn release_light(&mut self, idx: usize) {
        self.borrow_mut().release_light(idx)
    }

    fn set_light_pos(&mut self, idx: usize, pos: Vec3) {
        self.borrow_mut().set_light_pos(idx, pos)
    }

    fn set_light_dir(&mut self, idx: usize, dir: Vec3) {
        self.borrow_mut().set_light_dir(idx, dir)
    }

    fn set_light_spot_dir(&mut self, idx: usize, dir: Vec3) {
        self.borrow_mut().set_light_spot_dir(idx, dir)
    }

    fn set_light_ambient(&mut self, idx: usize, color: Color) {
        self.borrow_mut().set_light_ambient(idx, color)
    }

    fn set_light_diffuse(&mut self, idx: usize, color: Color) {
        self.borrow_mut().set_light_diffuse(idx, color)
    }

    fn set_light_specular(&mut self, idx: usize, color: Color) {
        self.borrow_mut().set_light_specular(idx, color)
    }

    fn set_light_attenuation(&mut self, idx: usize, constant: f32, linear: f32, quadratic: f32) {
        self.borrow_mut().set_light_attenuation(idx, constant, linear, quadratic)
    }

    fn set_light_spot_exponent(&mut self, idx: usize, exponent: f32) {
        self.borrow_mut().set_light_spot_exponent(idx, exponent)
    }

    fn set_light_spot_cutoff(&mut self, idx: usize, cutoff: f32) {
        self.borrow_mut().set_light_spot_cutoff(idx, cutoff)
    }
}

#[cfg(test)]
#[path = "mock_renderer_tests.rs"]
mod tests;
