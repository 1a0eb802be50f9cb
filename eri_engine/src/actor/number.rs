/// Number: a row of digit glyphs cut from one atlas strip.
///
/// The atlas holds equally sized cells in the order `0`–`9`, `+`, `-`, `.`.
/// Glyphs are laid out centred on the node origin.

use glam::Vec2;
use crate::renderer::{BufferUsage, PrimitiveType, RenderData, VertexData, VertexPosTex};
use crate::scene::{ActorKind, SceneNode};

const GLYPH_VERTICES: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumberValue {
    Int(i32),
    /// Shown with two decimals
    Float(f32),
}

#[derive(Debug, Clone)]
pub struct Number {
    size: Vec2,
    tex_unit_uv: Vec2,
    tex_scroll: Vec2,
    spacing: f32,
    force_sign: bool,
    value: Option<NumberValue>,
    glyph_count: usize,
}

impl Number {
    pub fn new(size: Vec2, force_sign: bool) -> Self {
        Self {
            size,
            tex_unit_uv: Vec2::ONE,
            tex_scroll: Vec2::ZERO,
            spacing: 0.0,
            force_sign,
            value: None,
            glyph_count: 0,
        }
    }

    pub fn size(&self) -> Vec2 {
        self.size
    }

    pub fn spacing(&self) -> f32 {
        self.spacing
    }

    pub fn value(&self) -> Option<NumberValue> {
        self.value
    }

    /// Text the glyph row spells
    pub fn text(&self) -> String {
        match self.value {
            None => String::new(),
            Some(NumberValue::Int(n)) if self.force_sign && n != 0 => format!("{:+}", n),
            Some(NumberValue::Int(n)) => format!("{}", n),
            Some(NumberValue::Float(f)) if self.force_sign && f != 0.0 => format!("{:+.2}", f),
            Some(NumberValue::Float(f)) => format!("{:.2}", f),
        }
    }

    /// Atlas cell of a glyph
    fn cell(c: char) -> Option<u32> {
        match c {
            '0'..='9' => c.to_digit(10),
            '+' => Some(10),
            '-' => Some(11),
            '.' => Some(12),
            _ => None,
        }
    }

    pub fn is_in_area(&self, pos: Vec2) -> bool {
        let len = self.glyph_count as f32;
        pos.x >= self.size.x * ((len - 1.0) * -0.5 - 0.5)
            && pos.x <= self.size.x * ((len - 1.0) * 0.5 + 0.5)
            && pos.y >= -0.5 * self.size.y
            && pos.y <= 0.5 * self.size.y
    }

    pub(crate) fn build(&mut self, render_data: &mut RenderData) {
        if self.value.is_none() {
            return;
        }
        let text = self.text();
        // letters of NaN and inf have no atlas cell and are left out
        let glyphs: Vec<u32> = text.chars().filter_map(Self::cell).collect();

        let half = self.size * 0.5;
        let unit = self.tex_unit_uv;
        let mut x = (glyphs.len() as f32 - 1.0) * (self.size.x + self.spacing) * -0.5;
        let mut vertices = Vec::with_capacity(glyphs.len() * GLYPH_VERTICES);

        for cell in &glyphs {
            let u = self.tex_scroll.x + *cell as f32 * unit.x;
            let v = self.tex_scroll.y;
            // 2,3 - 5
            //  | \  |
            //  0 - 1,4
            let corners = [
                ([x - half.x, -half.y], [u, v + unit.y]),
                ([x + half.x, -half.y], [u + unit.x, v + unit.y]),
                ([x - half.x, half.y], [u, v]),
                ([x - half.x, half.y], [u, v]),
                ([x + half.x, -half.y], [u + unit.x, v + unit.y]),
                ([x + half.x, half.y], [u + unit.x, v]),
            ];
            vertices.extend(corners.iter().map(|(p, t)| VertexPosTex {
                position: [p[0], p[1], 0.0],
                tex_coord: *t,
            }));
            x += self.size.x + self.spacing;
        }

        self.glyph_count = glyphs.len();
        render_data.usage = BufferUsage::Dynamic;
        render_data.set_vertices(VertexData::PosTex(vertices), PrimitiveType::Triangles);
    }
}

impl SceneNode {
    pub fn number(&self) -> Option<&Number> {
        match &self.kind {
            ActorKind::Number(number) => Some(number),
            _ => None,
        }
    }

    fn edit_number(&mut self, edit: impl FnOnce(&mut Number)) {
        match &mut self.kind {
            ActorKind::Number(number) => {
                edit(number);
                number.build(&mut self.render_data);
            }
            _ => debug_assert!(false, "{} node is not a number", self.kind.name()),
        }
    }

    pub fn set_number(&mut self, value: i32) {
        self.edit_number(|number| number.value = Some(NumberValue::Int(value)));
    }

    pub fn set_number_float(&mut self, value: f32) {
        self.edit_number(|number| number.value = Some(NumberValue::Float(value)));
    }

    pub fn set_spacing(&mut self, spacing: f32) {
        self.edit_number(|number| number.spacing = spacing);
    }

    /// Size of one atlas cell in pixels of the unit 0 texture
    pub fn set_digit_tex_unit(&mut self, width: u32, height: u32) {
        let Some(tex_size) = self.unit0_size() else { return };
        let unit = Vec2::new(width as f32, height as f32) / tex_size;
        self.edit_number(|number| number.tex_unit_uv = unit);
    }

    /// Origin of the glyph strip in pixels of the unit 0 texture
    pub fn set_digit_tex_area(&mut self, start_x: u32, start_y: u32) {
        let Some(tex_size) = self.unit0_size() else { return };
        let scroll = Vec2::new(start_x as f32, start_y as f32) / tex_size;
        self.edit_number(|number| number.tex_scroll = scroll);
    }

    fn unit0_size(&self) -> Option<Vec2> {
        let texture = self.material.texture(0);
        debug_assert!(texture.is_some(), "digit atlas needs a texture on unit 0");
        texture.map(|tex| Vec2::new(tex.width().max(1) as f32, tex.height().max(1) as f32))
    }
}

#[cfg(test)]
#[path = "number_tests.rs"]
mod tests;
