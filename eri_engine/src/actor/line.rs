/// Line: a polyline drawn as a line strip.

use glam::Vec2;
use crate::renderer::{BufferUsage, PrimitiveType, RenderData, VertexData, VertexPosTex};
use crate::scene::{ActorKind, SceneNode};

#[derive(Debug, Clone, Default)]
pub struct Line {
    points: Vec<Vec2>,
}

impl Line {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn points(&self) -> &[Vec2] {
        &self.points
    }

    /// Vertex per point, `u` running from 0 to 1 along the list
    pub(crate) fn build(&self, render_data: &mut RenderData) {
        let n = self.points.len();
        let delta_u = if n > 1 { 1.0 / (n - 1) as f32 } else { 0.0 };
        let vertices = self
            .points
            .iter()
            .enumerate()
            .map(|(i, p)| VertexPosTex {
                position: [p.x, p.y, 0.0],
                tex_coord: [delta_u * i as f32, 0.0],
            })
            .collect();
        render_data.set_vertices(VertexData::PosTex(vertices), PrimitiveType::LineStrip);
    }
}

impl SceneNode {
    pub fn line(&self) -> Option<&Line> {
        match &self.kind {
            ActorKind::Line(line) => Some(line),
            _ => None,
        }
    }

    /// Mutate the point list; geometry is rebuilt when `construct` is set
    fn edit_line(&mut self, construct: bool, edit: impl FnOnce(&mut Vec<Vec2>)) {
        match &mut self.kind {
            ActorKind::Line(line) => {
                edit(&mut line.points);
                if construct {
                    line.build(&mut self.render_data);
                }
            }
            _ => debug_assert!(false, "{} node is not a line", self.kind.name()),
        }
    }

    /// Single segment
    pub fn set_line(&mut self, begin: Vec2, end: Vec2) {
        self.edit_line(true, |points| {
            points.clear();
            points.push(begin);
            points.push(end);
        });
    }

    pub fn add_point(&mut self, point: Vec2, construct: bool) {
        self.edit_line(construct, |points| points.push(point));
    }

    pub fn clear_points(&mut self, construct: bool) {
        self.edit_line(construct, Vec::clear);
    }

    /// Rebuild after a batch of unconstructed edits
    pub fn construct_line(&mut self) {
        self.edit_line(true, |_| {});
    }

    /// Buffer usage hint for frequently edited geometry
    pub fn set_dynamic_draw(&mut self, dynamic: bool) {
        self.render_data.usage = if dynamic { BufferUsage::Dynamic } else { BufferUsage::Static };
    }
}

#[cfg(test)]
#[path = "line_tests.rs"]
mod tests;
