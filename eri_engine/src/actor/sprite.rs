/// Sprite: a textured quad centred on the node origin plus an offset.
///
/// Two texture coordinate sets, each with its own scale/scroll. The second
/// set is only emitted when a texture unit samples it.

use glam::{Vec2, Vec3};
use crate::math::{Rect, Sphere};
use crate::renderer::{
    MaterialData, PrimitiveType, RenderData, VertexData, VertexPosTex, VertexPosTex2,
    MAX_TEXTURE_COORD,
};
use crate::scene::{ActorKind, SceneNode};

#[derive(Debug, Clone)]
pub struct Sprite {
    size: Vec2,
    offset: Vec2,
    tex_scale: [Vec2; MAX_TEXTURE_COORD],
    tex_scroll: [Vec2; MAX_TEXTURE_COORD],
    use_line: bool,
    area_border: Vec2,
}

impl Sprite {
    pub fn new(size: Vec2, offset: Vec2) -> Self {
        Self {
            size,
            offset,
            tex_scale: [Vec2::ONE; MAX_TEXTURE_COORD],
            tex_scroll: [Vec2::ZERO; MAX_TEXTURE_COORD],
            use_line: false,
            area_border: Vec2::ZERO,
        }
    }

    pub fn size(&self) -> Vec2 {
        self.size
    }

    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    pub fn tex_scale(&self, coord_idx: usize) -> Vec2 {
        self.tex_scale[coord_idx.min(MAX_TEXTURE_COORD - 1)]
    }

    pub fn tex_scroll(&self, coord_idx: usize) -> Vec2 {
        self.tex_scroll[coord_idx.min(MAX_TEXTURE_COORD - 1)]
    }

    pub fn use_line(&self) -> bool {
        self.use_line
    }

    pub fn area_border(&self) -> Vec2 {
        self.area_border
    }

    fn area(&self) -> Rect {
        Rect::from_center(self.offset, self.size)
    }

    pub fn is_in_area(&self, pos: Vec2) -> bool {
        self.area().contains(pos, self.area_border)
    }

    /// Quad corners in draw order
    ///
    /// Triangle strip: bottom-left, bottom-right, top-left, top-right.
    /// Line loop: bottom-left, bottom-right, top-right, top-left.
    fn corners(&self) -> [(Vec2, Vec2); 4] {
        let area = self.area();
        let bl = (Vec2::new(area.min.x, area.min.y), Vec2::new(0.0, 1.0));
        let br = (Vec2::new(area.max.x, area.min.y), Vec2::new(1.0, 1.0));
        let tl = (Vec2::new(area.min.x, area.max.y), Vec2::new(0.0, 0.0));
        let tr = (Vec2::new(area.max.x, area.max.y), Vec2::new(1.0, 0.0));
        if self.use_line {
            [bl, br, tr, tl]
        } else {
            [bl, br, tl, tr]
        }
    }

    fn uv(&self, corner: Vec2, coord_idx: usize) -> [f32; 2] {
        (self.tex_scroll[coord_idx] + corner * self.tex_scale[coord_idx]).to_array()
    }

    pub(crate) fn build(&self, material: &MaterialData, render_data: &mut RenderData) {
        let corners = self.corners();
        let vertices = if material.uses_second_coord() {
            VertexData::PosTex2(
                corners
                    .iter()
                    .map(|(pos, corner)| VertexPosTex2 {
                        position: [pos.x, pos.y, 0.0],
                        tex_coord: self.uv(*corner, 0),
                        tex_coord2: self.uv(*corner, 1),
                    })
                    .collect(),
            )
        } else {
            VertexData::PosTex(
                corners
                    .iter()
                    .map(|(pos, corner)| VertexPosTex {
                        position: [pos.x, pos.y, 0.0],
                        tex_coord: self.uv(*corner, 0),
                    })
                    .collect(),
            )
        };
        let primitive = if self.use_line { PrimitiveType::LineLoop } else { PrimitiveType::TriangleStrip };
        render_data.set_vertices(vertices, primitive);
    }

    fn bounding(&self) -> Sphere {
        Sphere::new(Vec3::new(self.offset.x, self.offset.y, 0.0), self.size.length() * 0.5)
    }
}

// ===== Node operations =====

impl SceneNode {
    pub fn sprite(&self) -> Option<&Sprite> {
        match &self.kind {
            ActorKind::Sprite(sprite) => Some(sprite),
            _ => None,
        }
    }

    /// Mutate the sprite part and rebuild its quad
    fn edit_sprite(&mut self, edit: impl FnOnce(&mut Sprite)) {
        match &mut self.kind {
            ActorKind::Sprite(sprite) => {
                edit(sprite);
                sprite.build(&self.material, &mut self.render_data);
            }
            _ => debug_assert!(false, "{} node is not a sprite", self.kind.name()),
        }
    }

    pub fn set_size_offset(&mut self, size: Vec2, offset: Vec2) {
        self.edit_sprite(|sprite| {
            sprite.size = size;
            sprite.offset = offset;
        });
    }

    pub fn set_tex_scale(&mut self, scale: Vec2, coord_idx: usize) {
        debug_assert!(coord_idx < MAX_TEXTURE_COORD);
        if coord_idx < MAX_TEXTURE_COORD {
            self.edit_sprite(|sprite| sprite.tex_scale[coord_idx] = scale);
        }
    }

    pub fn set_tex_scroll(&mut self, scroll: Vec2, coord_idx: usize) {
        debug_assert!(coord_idx < MAX_TEXTURE_COORD);
        if coord_idx < MAX_TEXTURE_COORD {
            self.edit_sprite(|sprite| sprite.tex_scroll[coord_idx] = scroll);
        }
    }

    pub fn set_tex_scale_scroll(&mut self, scale: Vec2, scroll: Vec2, coord_idx: usize) {
        debug_assert!(coord_idx < MAX_TEXTURE_COORD);
        if coord_idx < MAX_TEXTURE_COORD {
            self.edit_sprite(|sprite| {
                sprite.tex_scale[coord_idx] = scale;
                sprite.tex_scroll[coord_idx] = scroll;
            });
        }
    }

    /// Texture sub-rectangle in pixels of the texture bound to unit `coord_idx`
    pub fn set_tex_area(&mut self, start_x: u32, start_y: u32, width: u32, height: u32, coord_idx: usize) {
        let Some(texture) = self.material.texture(coord_idx) else {
            debug_assert!(false, "set_tex_area without a texture on unit {}", coord_idx);
            return;
        };
        let tex_size = Vec2::new(texture.width().max(1) as f32, texture.height().max(1) as f32);
        let scale = Vec2::new(width as f32, height as f32) / tex_size;
        let scroll = Vec2::new(start_x as f32, start_y as f32) / tex_size;
        self.set_tex_scale_scroll(scale, scroll, coord_idx);
    }

    /// Texture sub-rectangle in normalized coordinates
    pub fn set_tex_area_uv(&mut self, start: Vec2, size: Vec2, coord_idx: usize) {
        match &mut self.kind {
            ActorKind::ParticleSystem(system) => system.set_tex_area_uv(start, size),
            _ => self.set_tex_scale_scroll(size, start, coord_idx),
        }
    }

    /// Draw the outline as a line loop instead of a filled quad
    pub fn set_use_line(&mut self, use_line: bool) {
        if self.sprite().map_or(false, |sprite| sprite.use_line != use_line) {
            self.edit_sprite(|sprite| sprite.use_line = use_line);
        }
    }

    /// Extra margin accepted by the hit test
    pub fn set_area_border(&mut self, border: Vec2) {
        match &mut self.kind {
            ActorKind::Sprite(sprite) => sprite.area_border = border,
            ActorKind::Txt(txt) => txt.set_area_border(border.x),
            _ => debug_assert!(false, "{} node has no area", self.kind.name()),
        }
    }

    /// Bounding sphere enclosing the quad
    pub fn create_sprite_bounding(&mut self) {
        if let Some(sphere) = self.sprite().map(Sprite::bounding) {
            self.set_bounding_sphere(sphere);
        }
    }
}

#[cfg(test)]
#[path = "sprite_tests.rs"]
mod tests;
