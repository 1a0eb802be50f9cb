/// SceneNode: a drawable entity of the scene graph.
///
/// A node is a composition of components: a [`Transform`], a
/// [`MaterialData`], a [`RenderData`] and a kind-specific part
/// ([`ActorKind`]). Nodes live in the [`SceneManager`](super::SceneManager)
/// arena; the parent link is a plain key, children are owned.
///
/// Operations that only touch the node itself (color, blend, depth state,
/// texture unit settings) are methods here. Operations that must reach
/// other nodes or the node's layer (transforms, hierarchy, visibility,
/// texture assignment) go through the scene manager.

use std::any::Any;
use std::sync::Arc;
use glam::{Vec2, Vec3};
use slotmap::new_key_type;
use crate::actor::{BoxMesh, Light, Line, Number, Sprite, Txt};
use crate::camera::Camera;
use crate::math::{Color, Sphere};
use crate::particle::ParticleSystem;
use crate::renderer::{
    AlphaTest, BlendMode, ColorWrite, CompareFunc, MaterialData, RenderData,
    TextureEnv, TextureFilter, TextureWrap, MAX_TEXTURE_COORD, MAX_TEXTURE_UNIT,
};
use crate::resource::{Texture, TextureId};
use super::transform::Transform;

new_key_type! {
    /// Stable handle to a node in the scene arena
    pub struct NodeKey;
}

/// Kind-specific part of a node
pub enum ActorKind {
    /// Grouping node, draws nothing unless given geometry
    Node,
    Camera(Box<Camera>),
    Light(Light),
    Sprite(Sprite),
    BoxMesh(BoxMesh),
    Line(Line),
    Number(Number),
    Txt(Txt),
    ParticleSystem(Box<ParticleSystem>),
}

impl ActorKind {
    pub fn name(&self) -> &'static str {
        match self {
            ActorKind::Node => "node",
            ActorKind::Camera(_) => "camera",
            ActorKind::Light(_) => "light",
            ActorKind::Sprite(_) => "sprite",
            ActorKind::BoxMesh(_) => "box",
            ActorKind::Line(_) => "line",
            ActorKind::Number(_) => "number",
            ActorKind::Txt(_) => "txt",
            ActorKind::ParticleSystem(_) => "particle_system",
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Bounding {
    local: Sphere,
    world: Sphere,
}

pub struct SceneNode {
    pub(crate) parent: Option<NodeKey>,
    pub(crate) children: Vec<NodeKey>,
    pub(crate) layer: Option<usize>,
    pub(crate) transform: Transform,
    pub(crate) material: MaterialData,
    pub(crate) render_data: RenderData,
    pub(crate) kind: ActorKind,
    visible: bool,
    inherit_visible: bool,
    bounding: Option<Bounding>,
    user_data: Option<Box<dyn Any>>,
}

impl SceneNode {
    pub(crate) fn new(kind: ActorKind) -> Self {
        let mut node = Self {
            parent: None,
            children: Vec::new(),
            layer: None,
            transform: Transform::default(),
            material: MaterialData::default(),
            render_data: RenderData::default(),
            kind,
            visible: true,
            inherit_visible: true,
            bounding: None,
            user_data: None,
        };
        node.rebuild_geometry();
        node
    }

    // ===== Structure =====

    pub fn parent(&self) -> Option<NodeKey> {
        self.parent
    }

    pub fn children(&self) -> &[NodeKey] {
        &self.children
    }

    /// Layer the node is registered in
    pub fn layer(&self) -> Option<usize> {
        self.layer
    }

    pub fn is_in_scene(&self) -> bool {
        self.layer.is_some()
    }

    pub fn kind(&self) -> &ActorKind {
        &self.kind
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn material(&self) -> &MaterialData {
        &self.material
    }

    pub fn render_data(&self) -> &RenderData {
        &self.render_data
    }

    // ===== Visibility =====

    /// Explicit flag
    pub fn visible(&self) -> bool {
        self.visible
    }

    /// Flag inherited from the parent chain
    pub fn inherit_visible(&self) -> bool {
        self.inherit_visible
    }

    /// Effective visibility
    pub fn is_visible(&self) -> bool {
        self.visible && self.inherit_visible
    }

    pub(crate) fn set_visible_flags(&mut self, visible: bool, inherit: bool) {
        self.visible = visible;
        self.inherit_visible = inherit;
    }

    // ===== Render state =====

    pub fn color(&self) -> Color {
        self.render_data.color
    }

    pub fn set_color(&mut self, color: Color) {
        self.render_data.color = color;
    }

    pub fn set_blend(&mut self, mode: BlendMode) {
        self.render_data.set_blend(mode);
    }

    pub fn blend_normal(&mut self) {
        self.set_blend(BlendMode::Normal);
    }

    pub fn blend_add(&mut self) {
        self.set_blend(BlendMode::Add);
    }

    /// Alpha test `alpha > value / 255`
    pub fn alpha_test_greater(&mut self, value: u8) {
        self.render_data.alpha_test = Some(AlphaTest {
            func: CompareFunc::Greater,
            reference: value as f32 / 255.0,
        });
    }

    pub fn disable_alpha_test(&mut self) {
        self.render_data.alpha_test = None;
    }

    pub fn set_depth_func(&mut self, func: CompareFunc) {
        self.render_data.depth_func = func;
    }

    pub fn set_depth_test(&mut self, enable: bool) {
        self.material.depth_test = enable;
    }

    pub fn set_depth_write(&mut self, enable: bool) {
        self.material.depth_write = enable;
    }

    pub fn set_cull_face(&mut self, enable: bool, front: bool) {
        self.material.cull_face = enable;
        self.material.cull_front = front;
    }

    pub fn set_color_write(&mut self, r: bool, g: bool, b: bool, a: bool) {
        self.material.color_write = ColorWrite::from_channels(r, g, b, a);
    }

    pub fn set_accept_light(&mut self, accept: bool) {
        self.material.accept_light = accept;
    }

    // ===== Texture units =====

    pub fn set_texture_filter(&mut self, idx: usize, filter_min: TextureFilter, filter_mag: TextureFilter) {
        debug_assert!(idx < self.material.used_unit);
        if let Some(unit) = self.material.units.get_mut(idx) {
            unit.filter_min = filter_min;
            unit.filter_mag = filter_mag;
        }
    }

    pub fn set_texture_wrap(&mut self, idx: usize, wrap_s: TextureWrap, wrap_t: TextureWrap) {
        debug_assert!(idx < self.material.used_unit);
        if let Some(unit) = self.material.units.get_mut(idx) {
            unit.wrap_s = wrap_s;
            unit.wrap_t = wrap_t;
        }
    }

    pub fn set_texture_envs(&mut self, idx: usize, env: TextureEnv) {
        debug_assert!(idx < self.material.used_unit);
        if let Some(unit) = self.material.units.get_mut(idx) {
            unit.env = env;
        }
    }

    /// Select the vertex coordinate set sampled by unit `idx`
    pub fn set_texture_coord(&mut self, idx: usize, coord_idx: usize) {
        debug_assert!(idx < self.material.used_unit);
        debug_assert!(coord_idx < MAX_TEXTURE_COORD);
        if coord_idx >= MAX_TEXTURE_COORD {
            return;
        }
        if let Some(unit) = self.material.units.get_mut(idx) {
            if unit.coord_idx != coord_idx {
                unit.coord_idx = coord_idx;
                self.rebuild_geometry();
            }
        }
    }

    /// Texture unit assignment without layer bookkeeping
    ///
    /// Returns the previous representative texture id when unit `idx`
    /// actually changed.
    pub(crate) fn assign_material(
        &mut self,
        texture: Option<Arc<Texture>>,
        filter_min: TextureFilter,
        filter_mag: TextureFilter,
        idx: usize,
    ) -> Option<TextureId> {
        if texture.is_some() && idx == self.material.used_unit {
            debug_assert!(self.material.used_unit < MAX_TEXTURE_UNIT, "texture units exhausted");
            if self.material.used_unit >= MAX_TEXTURE_UNIT {
                return None;
            }
            self.material.used_unit += 1;
        }

        debug_assert!(idx < self.material.used_unit, "texture unit {} out of range", idx);
        if idx >= self.material.used_unit {
            return None;
        }

        let has_texture = texture.is_some();
        let old_id = self.assign_texture(idx, texture);

        if has_texture {
            let unit = &mut self.material.units[idx];
            unit.filter_min = filter_min;
            unit.filter_mag = filter_mag;
        } else if idx + 1 == self.material.used_unit {
            self.material.used_unit -= 1;
        }

        old_id
    }

    fn assign_texture(&mut self, idx: usize, texture: Option<Arc<Texture>>) -> Option<TextureId> {
        let same = match (&self.material.units[idx].texture, &texture) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        };
        if same {
            return None;
        }

        let old_id = self.material.single_texture_id();
        self.material.units[idx].texture = texture;

        match self.material.other_premultiplied(idx) {
            Some(other) => {
                if let Some(tex) = &self.material.units[idx].texture {
                    debug_assert_eq!(
                        other,
                        tex.alpha_premultiplied(),
                        "mixed alpha premultiplication on one node"
                    );
                }
            }
            None => {
                self.render_data.alpha_premultiplied = self.material.units[idx]
                    .texture
                    .as_ref()
                    .map(|tex| tex.alpha_premultiplied())
                    .unwrap_or(false);
            }
        }

        Some(old_id)
    }

    // ===== Bounding =====

    /// Bounding sphere of `radius` around the local origin
    pub fn create_sphere_bounding(&mut self, radius: f32) {
        self.set_bounding_sphere(Sphere::new(Vec3::ZERO, radius));
    }

    pub fn set_bounding_sphere(&mut self, sphere: Sphere) {
        self.bounding = Some(Bounding { local: sphere, world: sphere });
        self.transform.mark_world_dirty(false);
    }

    pub fn bounding_sphere(&self) -> Option<Sphere> {
        self.bounding.map(|b| b.local)
    }

    /// World-space bounding sphere as of the last world recompute
    pub fn world_bounding_sphere(&self) -> Option<Sphere> {
        self.bounding.map(|b| b.world)
    }

    pub(crate) fn update_world_bounding(&mut self) {
        let world = self.transform.cached_world();
        if let Some(bounding) = &mut self.bounding {
            bounding.world.center = world.transform_point3(bounding.local.center);
            bounding.world.radius = bounding.local.radius;
        }
    }

    // ===== User data =====

    pub fn set_user_data<T: Any>(&mut self, data: T) {
        self.user_data = Some(Box::new(data));
    }

    pub fn user_data<T: Any>(&self) -> Option<&T> {
        self.user_data.as_ref().and_then(|data| data.downcast_ref::<T>())
    }

    // ===== Kind dispatch =====

    /// Whether local position `pos` hits the node's area
    pub fn is_in_area(&self, pos: Vec2) -> bool {
        match &self.kind {
            ActorKind::Sprite(sprite) => sprite.is_in_area(pos),
            ActorKind::Number(number) => number.is_in_area(pos),
            ActorKind::Txt(txt) => txt.is_in_area(pos),
            _ => false,
        }
    }

    /// Regenerate CPU geometry from the kind's parameters
    pub(crate) fn rebuild_geometry(&mut self) {
        match &mut self.kind {
            ActorKind::Sprite(sprite) => sprite.build(&self.material, &mut self.render_data),
            ActorKind::BoxMesh(mesh) => mesh.build(&mut self.render_data),
            ActorKind::Line(line) => line.build(&mut self.render_data),
            ActorKind::Number(number) => number.build(&mut self.render_data),
            ActorKind::Txt(txt) => txt.build_atlas(&mut self.render_data),
            ActorKind::ParticleSystem(system) => system.sync_render_data(&mut self.render_data),
            _ => {}
        }
    }
}

#[cfg(test)]
#[path = "scene_node_tests.rs"]
mod tests;
