/// Per-node draw state handed to the renderer
///
/// Holds CPU-side geometry plus the fixed-function state (blend, alpha
/// test, depth function, tint). GPU buffers are created lazily on the
/// first render pass that needs them and re-uploaded only when the CPU
/// data changed.

use bytemuck::{Pod, Zeroable};
use crate::math::Color;
use super::renderer::Renderer;

/// Handle to a renderer-owned GPU buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferHandle(pub u32);

/// Position + one texture coordinate
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct VertexPosTex {
    pub position: [f32; 3],
    pub tex_coord: [f32; 2],
}

/// Position + two texture coordinate sets
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct VertexPosTex2 {
    pub position: [f32; 3],
    pub tex_coord: [f32; 2],
    pub tex_coord2: [f32; 2],
}

/// Position + normal + texture coordinate (lit meshes)
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct VertexPosNormalTex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub tex_coord: [f32; 2],
}

/// 2D position + texture coordinate + 8-bit color (particles)
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct VertexPosTexColor {
    pub position: [f32; 2],
    pub tex_coord: [f32; 2],
    pub color: [u8; 4],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VertexFormat {
    PosTex,
    PosTex2,
    PosNormalTex,
    PosTexColor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PrimitiveType {
    #[default]
    Triangles,
    TriangleStrip,
    LineStrip,
    LineLoop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BufferUsage {
    #[default]
    Static,
    /// Rewritten every frame (particles, counters)
    Dynamic,
}

/// Which buffer an upload targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferKind {
    Vertex,
    Index,
}

/// CPU-side vertex storage, one variant per vertex format
#[derive(Debug, Clone, Default, PartialEq)]
pub enum VertexData {
    #[default]
    Empty,
    PosTex(Vec<VertexPosTex>),
    PosTex2(Vec<VertexPosTex2>),
    PosNormalTex(Vec<VertexPosNormalTex>),
    PosTexColor(Vec<VertexPosTexColor>),
}

impl VertexData {
    pub fn format(&self) -> Option<VertexFormat> {
        match self {
            VertexData::Empty => None,
            VertexData::PosTex(_) => Some(VertexFormat::PosTex),
            VertexData::PosTex2(_) => Some(VertexFormat::PosTex2),
            VertexData::PosNormalTex(_) => Some(VertexFormat::PosNormalTex),
            VertexData::PosTexColor(_) => Some(VertexFormat::PosTexColor),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            VertexData::Empty => 0,
            VertexData::PosTex(v) => v.len(),
            VertexData::PosTex2(v) => v.len(),
            VertexData::PosNormalTex(v) => v.len(),
            VertexData::PosTexColor(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Raw bytes for buffer upload
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            VertexData::Empty => &[],
            VertexData::PosTex(v) => bytemuck::cast_slice(v),
            VertexData::PosTex2(v) => bytemuck::cast_slice(v),
            VertexData::PosNormalTex(v) => bytemuck::cast_slice(v),
            VertexData::PosTexColor(v) => bytemuck::cast_slice(v),
        }
    }
}

/// Blend equation factors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendFactor {
    Zero,
    One,
    SrcColor,
    OneMinusSrcColor,
    SrcAlpha,
    OneMinusSrcAlpha,
    DstColor,
    OneMinusDstColor,
    DstAlpha,
    OneMinusDstAlpha,
}

/// Named blend presets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendMode {
    Normal,
    Add,
    Multiply,
    Multiply2x,
    Replace,
}

impl BlendMode {
    /// (source, destination) factors of the preset
    pub fn factors(self) -> (BlendFactor, BlendFactor) {
        match self {
            BlendMode::Normal => (BlendFactor::SrcAlpha, BlendFactor::OneMinusSrcAlpha),
            BlendMode::Add => (BlendFactor::SrcAlpha, BlendFactor::One),
            BlendMode::Multiply => (BlendFactor::DstColor, BlendFactor::Zero),
            BlendMode::Multiply2x => (BlendFactor::DstColor, BlendFactor::SrcColor),
            BlendMode::Replace => (BlendFactor::One, BlendFactor::Zero),
        }
    }
}

/// Comparison used by the depth and alpha tests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareFunc {
    Never,
    Less,
    Greater,
    Equal,
    LEqual,
    GEqual,
    NotEqual,
    Always,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlphaTest {
    pub func: CompareFunc,
    /// Reference in [0, 1]
    pub reference: f32,
}

/// Everything the renderer needs to draw one node
#[derive(Debug, Clone)]
pub struct RenderData {
    pub vertices: VertexData,
    pub indices: Vec<u16>,
    pub primitive: PrimitiveType,
    /// Vertices to draw (may be less than `vertices.len()`)
    pub vertex_count: usize,
    /// Indices to draw (0 draws non-indexed)
    pub index_count: usize,
    pub usage: BufferUsage,
    pub color: Color,
    pub blend_src: BlendFactor,
    pub blend_dst: BlendFactor,
    pub alpha_test: Option<AlphaTest>,
    pub depth_func: CompareFunc,
    pub alpha_premultiplied: bool,
    /// World-space geometry (particles simulated outside the node frame)
    pub apply_identity_model_matrix: bool,
    vertex_buffer: Option<BufferHandle>,
    index_buffer: Option<BufferHandle>,
    vertices_dirty: bool,
    indices_dirty: bool,
}

impl Default for RenderData {
    fn default() -> Self {
        let (blend_src, blend_dst) = BlendMode::Normal.factors();
        Self {
            vertices: VertexData::Empty,
            indices: Vec::new(),
            primitive: PrimitiveType::Triangles,
            vertex_count: 0,
            index_count: 0,
            usage: BufferUsage::Static,
            color: Color::WHITE,
            blend_src,
            blend_dst,
            alpha_test: None,
            depth_func: CompareFunc::LEqual,
            alpha_premultiplied: false,
            apply_identity_model_matrix: false,
            vertex_buffer: None,
            index_buffer: None,
            vertices_dirty: false,
            indices_dirty: false,
        }
    }
}

impl RenderData {
    /// Replace the vertex data; the whole array is drawn
    pub fn set_vertices(&mut self, vertices: VertexData, primitive: PrimitiveType) {
        self.vertex_count = vertices.len();
        self.vertices = vertices;
        self.primitive = primitive;
        self.vertices_dirty = true;
    }

    /// Mark the vertex array as rewritten in place
    pub fn mark_vertices_dirty(&mut self) {
        self.vertices_dirty = true;
    }

    pub fn set_indices(&mut self, indices: Vec<u16>) {
        self.index_count = indices.len();
        self.indices = indices;
        self.indices_dirty = true;
    }

    pub fn vertex_format(&self) -> Option<VertexFormat> {
        self.vertices.format()
    }

    pub fn vertex_buffer(&self) -> Option<BufferHandle> {
        self.vertex_buffer
    }

    pub fn index_buffer(&self) -> Option<BufferHandle> {
        self.index_buffer
    }

    pub fn needs_upload(&self) -> bool {
        self.vertices_dirty || self.indices_dirty
    }

    pub fn set_blend(&mut self, mode: BlendMode) {
        let (src, dst) = mode.factors();
        self.blend_src = src;
        self.blend_dst = dst;
    }

    /// Create missing buffers and upload dirty data
    pub(crate) fn sync_buffers(&mut self, renderer: &mut dyn Renderer) {
        if self.vertices_dirty && !self.vertices.is_empty() {
            let handle = *self.vertex_buffer.get_or_insert_with(|| renderer.create_buffer());
            renderer.upload_buffer(handle, BufferKind::Vertex, self.vertices.as_bytes(), self.usage);
        }
        self.vertices_dirty = false;

        if self.indices_dirty && !self.indices.is_empty() {
            let handle = *self.index_buffer.get_or_insert_with(|| renderer.create_buffer());
            renderer.upload_buffer(
                handle,
                BufferKind::Index,
                bytemuck::cast_slice(&self.indices),
                self.usage,
            );
        }
        self.indices_dirty = false;
    }

    /// Detach the GPU buffers; CPU data is kept and marked for re-upload
    pub(crate) fn take_buffers(&mut self) -> Vec<BufferHandle> {
        let handles: Vec<BufferHandle> = self
            .vertex_buffer
            .take()
            .into_iter()
            .chain(self.index_buffer.take())
            .collect();
        self.vertices_dirty = !self.vertices.is_empty();
        self.indices_dirty = !self.indices.is_empty();
        handles
    }
}

#[cfg(test)]
#[path = "render_data_tests.rs"]
mod tests;
