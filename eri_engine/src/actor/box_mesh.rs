/// BoxMesh: an axis-aligned lit box of 36 vertices.

use glam::Vec3;
use crate::renderer::{PrimitiveType, RenderData, VertexData, VertexPosNormalTex};
use crate::scene::{ActorKind, SceneNode};

#[derive(Debug, Clone)]
pub struct BoxMesh {
    half_ext: Vec3,
}

/// Face normal, then the two in-plane axes `(u, v)` so that `u x v = normal`
const FACES: [(Vec3, Vec3, Vec3); 6] = [
    (Vec3::Z, Vec3::X, Vec3::Y),
    (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
    (Vec3::Y, Vec3::X, Vec3::NEG_Z),
    (Vec3::NEG_Y, Vec3::X, Vec3::Z),
    (Vec3::X, Vec3::NEG_Z, Vec3::Y),
    (Vec3::NEG_X, Vec3::Z, Vec3::Y),
];

impl BoxMesh {
    pub fn new(half_ext: Vec3) -> Self {
        Self { half_ext }
    }

    pub fn half_ext(&self) -> Vec3 {
        self.half_ext
    }

    pub(crate) fn build(&self, render_data: &mut RenderData) {
        // Two triangles per face: (0,1,2) (2,1,3) over corners
        // 2 - 3
        // | \ |
        // 0 - 1
        const CORNERS: [(f32, f32); 6] = [(-1.0, -1.0), (1.0, -1.0), (-1.0, 1.0), (-1.0, 1.0), (1.0, -1.0), (1.0, 1.0)];

        let mut vertices = Vec::with_capacity(36);
        for (normal, u, v) in FACES {
            for (cu, cv) in CORNERS {
                let position = (normal + u * cu + v * cv) * self.half_ext;
                vertices.push(VertexPosNormalTex {
                    position: position.to_array(),
                    normal: normal.to_array(),
                    tex_coord: [(cu + 1.0) * 0.5, (1.0 - cv) * 0.5],
                });
            }
        }
        render_data.set_vertices(VertexData::PosNormalTex(vertices), PrimitiveType::Triangles);
    }
}

impl SceneNode {
    pub fn box_mesh(&self) -> Option<&BoxMesh> {
        match &self.kind {
            ActorKind::BoxMesh(mesh) => Some(mesh),
            _ => None,
        }
    }

    pub fn set_half_ext(&mut self, half_ext: Vec3) {
        match &mut self.kind {
            ActorKind::BoxMesh(mesh) => {
                mesh.half_ext = half_ext;
                mesh.build(&mut self.render_data);
            }
            _ => debug_assert!(false, "{} node is not a box", self.kind.name()),
        }
    }
}

#[cfg(test)]
#[path = "box_mesh_tests.rs"]
mod tests;
