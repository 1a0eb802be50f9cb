/// Txt: text laid out from a font.
///
/// Two mesh constructors share one contract (rebuild geometry from the
/// current string and refresh the hit rectangle):
///
/// - `Atlas`: one quad per glyph looked up in the font's atlas texture,
///   multi-line on `\n`
/// - `Sprite`: the whole string rasterized into a texture owned by the
///   node, drawn as one quad
///
/// Geometry is anchored at the top-left corner, or centred when
/// `is_pos_center` is set.

use std::sync::Arc;
use glam::Vec2;
use crate::renderer::{BufferUsage, PrimitiveType, RenderData, VertexData, VertexPosTex};
use crate::resource::{Font, RasterizedText, Texture};
use crate::scene::{ActorKind, SceneNode};

pub enum TxtMeshConstructor {
    Atlas,
    /// Texture of the last rasterization
    Sprite { texture: Option<Arc<Texture>> },
}

pub struct Txt {
    font: Arc<Font>,
    font_size: u32,
    is_pos_center: bool,
    is_anti_alias: bool,
    txt: String,
    width: f32,
    height: f32,
    area_border: f32,
    constructor: TxtMeshConstructor,
}

impl Txt {
    pub fn new(font: Arc<Font>, font_size: u32, is_pos_center: bool) -> Self {
        let constructor = if font.is_atlas() {
            TxtMeshConstructor::Atlas
        } else {
            TxtMeshConstructor::Sprite { texture: None }
        };
        Self {
            font,
            font_size,
            is_pos_center,
            is_anti_alias: true,
            txt: String::new(),
            width: 0.0,
            height: 0.0,
            area_border: 0.0,
            constructor,
        }
    }

    pub fn font(&self) -> &Arc<Font> {
        &self.font
    }

    pub fn font_size(&self) -> u32 {
        self.font_size
    }

    pub fn txt(&self) -> &str {
        &self.txt
    }

    pub fn is_pos_center(&self) -> bool {
        self.is_pos_center
    }

    pub fn is_atlas(&self) -> bool {
        matches!(self.constructor, TxtMeshConstructor::Atlas)
    }

    /// Laid out extents of the current string
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    pub fn set_anti_alias(&mut self, anti_alias: bool) {
        self.is_anti_alias = anti_alias;
    }

    pub(crate) fn set_area_border(&mut self, border: f32) {
        self.area_border = border;
    }

    pub(crate) fn set_text(&mut self, txt: &str) {
        self.txt.clear();
        self.txt.push_str(txt);
    }

    fn size_scale(font: &Font, font_size: u32) -> f32 {
        font_size as f32 / font.size().max(1) as f32
    }

    /// Extents of `text` laid out with `font` at `font_size`
    ///
    /// Width is the widest line; height is one line height per line.
    pub fn calculate_size(text: &str, font: &Font, font_size: u32) -> Vec2 {
        let scale = Self::size_scale(font, font_size);
        let line_height = font.line_height() * scale;
        let mut width: f32 = 0.0;
        let mut height = line_height;
        let mut line_width = 0.0;

        for c in text.chars() {
            if c == '\n' {
                width = width.max(line_width);
                line_width = 0.0;
                height += line_height;
            } else if let Some(setting) = font.char_setting(c as u32) {
                line_width += setting.x_advance * scale;
            }
        }
        Vec2::new(width.max(line_width), height)
    }

    pub fn is_in_area(&self, pos: Vec2) -> bool {
        let (left, right, bottom, top) = if self.is_pos_center {
            (-self.width / 2.0, self.width / 2.0, -self.height / 2.0, self.height / 2.0)
        } else {
            (0.0, self.width, -self.height, 0.0)
        };
        pos.x >= left - self.area_border
            && pos.x <= right + self.area_border
            && pos.y >= bottom - self.area_border
            && pos.y <= top + self.area_border
    }

    fn line_start_x(&self) -> f32 {
        if self.is_pos_center { self.width * -0.5 } else { 0.0 }
    }

    /// Glyph quads from the atlas; no-op for the sprite constructor
    pub(crate) fn build_atlas(&mut self, render_data: &mut RenderData) {
        if !self.is_atlas() {
            return;
        }
        let Some(texture) = self.font.texture() else {
            return;
        };
        let inv_tex = Vec2::new(1.0 / texture.width().max(1) as f32, 1.0 / texture.height().max(1) as f32);
        let scale = Self::size_scale(&self.font, self.font_size);
        let line_height = self.font.line_height() * scale;

        let size = Self::calculate_size(&self.txt, &self.font, self.font_size);
        self.width = size.x;
        self.height = size.y;

        let mut x = self.line_start_x();
        let mut y = if self.is_pos_center { self.height * 0.5 } else { 0.0 };
        let mut vertices = Vec::with_capacity(self.txt.len() * 6);

        for c in self.txt.chars() {
            if c == '\n' {
                x = self.line_start_x();
                y -= line_height;
                continue;
            }
            let Some(setting) = self.font.char_setting(c as u32) else {
                continue;
            };

            let u = setting.x * inv_tex.x;
            let v = setting.y * inv_tex.y;
            let unit_u = (setting.width - 1.0) * inv_tex.x;
            let unit_v = (setting.height - 1.0) * inv_tex.y;

            let left = x + setting.x_offset * scale;
            let right = left + (setting.width - 1.0) * scale;
            let top = y - setting.y_offset * scale;
            let bottom = top - (setting.height - 1.0) * scale;

            // 2,3 - 5
            //  | \  |
            //  0 - 1,4
            let corners = [
                ([left, bottom], [u, v + unit_v]),
                ([right, bottom], [u + unit_u, v + unit_v]),
                ([left, top], [u, v]),
                ([left, top], [u, v]),
                ([right, bottom], [u + unit_u, v + unit_v]),
                ([right, top], [u + unit_u, v]),
            ];
            vertices.extend(corners.iter().map(|(p, t)| VertexPosTex {
                position: [p[0], p[1], 0.0],
                tex_coord: *t,
            }));

            x += setting.x_advance * scale;
        }

        render_data.usage = BufferUsage::Dynamic;
        render_data.set_vertices(VertexData::PosTex(vertices), PrimitiveType::Triangles);
    }

    /// Rasterize the current string through the font
    pub(crate) fn rasterize(&self) -> Option<RasterizedText> {
        self.font.rasterize(&self.txt, self.font_size, self.is_anti_alias)
    }

    /// Install a freshly rasterized texture, returning the previous one
    pub(crate) fn replace_sprite_texture(&mut self, texture: Arc<Texture>) -> Option<Arc<Texture>> {
        match &mut self.constructor {
            TxtMeshConstructor::Sprite { texture: current } => current.replace(texture),
            TxtMeshConstructor::Atlas => None,
        }
    }

    pub(crate) fn take_sprite_texture(&mut self) -> Option<Arc<Texture>> {
        match &mut self.constructor {
            TxtMeshConstructor::Sprite { texture } => texture.take(),
            TxtMeshConstructor::Atlas => None,
        }
    }

    /// One quad showing `content` texels of the rasterized texture
    pub(crate) fn build_sprite(&mut self, content: (u32, u32), render_data: &mut RenderData) {
        let TxtMeshConstructor::Sprite { texture: Some(texture) } = &self.constructor else {
            return;
        };
        let content = Vec2::new(content.0 as f32, content.1 as f32);
        let uv = content / Vec2::new(texture.width().max(1) as f32, texture.height().max(1) as f32);
        let size = content * Self::size_scale(&self.font, self.font_size);
        let start = if self.is_pos_center { Vec2::new(-size.x * 0.5, size.y * 0.5) } else { Vec2::ZERO };

        // 2 - 3
        // | \ |
        // 0 - 1
        let vertices = vec![
            VertexPosTex { position: [start.x, start.y - size.y, 0.0], tex_coord: [0.0, uv.y] },
            VertexPosTex { position: [start.x + size.x, start.y - size.y, 0.0], tex_coord: [uv.x, uv.y] },
            VertexPosTex { position: [start.x, start.y, 0.0], tex_coord: [0.0, 0.0] },
            VertexPosTex { position: [start.x + size.x, start.y, 0.0], tex_coord: [uv.x, 0.0] },
        ];
        self.width = size.x;
        self.height = size.y;
        render_data.set_vertices(VertexData::PosTex(vertices), PrimitiveType::TriangleStrip);
    }
}

impl SceneNode {
    pub fn txt(&self) -> Option<&Txt> {
        match &self.kind {
            ActorKind::Txt(txt) => Some(txt),
            _ => None,
        }
    }
}

#[cfg(test)]
#[path = "txt_tests.rs"]
mod tests;
