//! Central scene manager for the engine.
//!
//! Owns every node in a SlotMap arena, the render layers and the cameras,
//! and runs the per-frame particle update and render traversal. Operations
//! that reach beyond a single node (transforms, hierarchy, visibility, layer
//! membership, texture assignment) live here; see `hierarchy.rs` for the
//! transform and hierarchy half.

use std::sync::Arc;
use glam::{Mat4, Vec2, Vec3};
use rustc_hash::FxHashMap;
use slotmap::SlotMap;
use crate::actor::{BoxMesh, Light, LightType, Line, Number, Sprite, Txt};
use crate::camera::{Camera, Projection};
use crate::particle::{EmitSpace, ParticleSystem, ParticleSystemSetup};
use crate::renderer::{BufferHandle, OpacityType, Renderer, TextureFilter};
use crate::resource::{Font, Texture, TextureId, TextureManager};
use super::layer::Layer;
use super::scene_node::{ActorKind, NodeKey, SceneNode};

/// Default number of render layers
pub const DEFAULT_LAYER_COUNT: usize = 8;

/// GPU objects of destroyed nodes, released at the start of the next render pass
#[derive(Debug, Default)]
struct ReleaseQueue {
    buffers: Vec<BufferHandle>,
    textures: Vec<TextureId>,
    lights: Vec<usize>,
}

impl ReleaseQueue {
    fn is_empty(&self) -> bool {
        self.buffers.is_empty() && self.textures.is_empty() && self.lights.is_empty()
    }

    fn flush(&mut self, renderer: &mut dyn Renderer) {
        for handle in self.buffers.drain(..) {
            renderer.release_buffer(handle);
        }
        for id in self.textures.drain(..) {
            renderer.release_texture(id);
        }
        for idx in self.lights.drain(..) {
            renderer.release_light(idx);
        }
    }
}

pub struct SceneManager {
    pub(crate) nodes: SlotMap<NodeKey, SceneNode>,
    pub(crate) layers: Vec<Layer>,
    default_cam: NodeKey,
    current_cam: NodeKey,
    /// Camera whose matrices the renderer currently holds
    uploaded_cam: Option<NodeKey>,
    viewport: (u32, u32),
    release_queue: ReleaseQueue,
}

impl SceneManager {
    /// Create a scene with `layer_count` layers and an orthogonal default camera
    pub fn new(layer_count: usize, viewport_width: u32, viewport_height: u32) -> Self {
        debug_assert!(layer_count > 0, "a scene needs at least one layer");
        let mut nodes = SlotMap::with_key();
        let default_cam = nodes.insert(SceneNode::new(ActorKind::Camera(Box::new(Camera::new(
            Projection::Orthogonal,
            viewport_width,
            viewport_height,
        )))));

        Self {
            nodes,
            layers: (0..layer_count.max(1)).map(Layer::new).collect(),
            default_cam,
            current_cam: default_cam,
            uploaded_cam: None,
            viewport: (viewport_width, viewport_height),
            release_queue: ReleaseQueue::default(),
        }
    }

    // ===== Node access =====

    pub fn node(&self, key: NodeKey) -> Option<&SceneNode> {
        self.nodes.get(key)
    }

    /// Mutable access for node-local state (color, blend, depth, texture units)
    pub fn node_mut(&mut self, key: NodeKey) -> Option<&mut SceneNode> {
        self.nodes.get_mut(key)
    }

    pub fn contains(&self, key: NodeKey) -> bool {
        self.nodes.contains_key(key)
    }

    /// Live nodes, the default camera included
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn layer(&self, id: usize) -> Option<&Layer> {
        self.layers.get(id)
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    pub fn viewport(&self) -> (u32, u32) {
        self.viewport
    }

    // ===== Creation =====

    /// Insert a detached node of `kind`
    pub fn create(&mut self, kind: ActorKind) -> NodeKey {
        self.nodes.insert(SceneNode::new(kind))
    }

    /// Grouping node with no geometry
    pub fn create_node(&mut self) -> NodeKey {
        self.create(ActorKind::Node)
    }

    pub fn create_camera(&mut self, projection: Projection) -> NodeKey {
        let (width, height) = self.viewport;
        self.create(ActorKind::Camera(Box::new(Camera::new(projection, width, height))))
    }

    pub fn create_light(&mut self, light_type: LightType) -> NodeKey {
        self.create(ActorKind::Light(Light::new(light_type)))
    }

    pub fn create_sprite(&mut self, size: Vec2, offset: Vec2) -> NodeKey {
        self.create(ActorKind::Sprite(Sprite::new(size, offset)))
    }

    pub fn create_box(&mut self, half_ext: Vec3) -> NodeKey {
        self.create(ActorKind::BoxMesh(BoxMesh::new(half_ext)))
    }

    pub fn create_line(&mut self) -> NodeKey {
        self.create(ActorKind::Line(Line::new()))
    }

    pub fn create_number(&mut self, size: Vec2, force_sign: bool) -> NodeKey {
        self.create(ActorKind::Number(Number::new(size, force_sign)))
    }

    /// Text node; atlas fonts bind their atlas texture on unit 0
    pub fn create_txt(&mut self, font: Arc<Font>, font_size: u32, is_pos_center: bool) -> NodeKey {
        let atlas = font.texture().cloned();
        let (filter_min, filter_mag) = (font.filter_min, font.filter_mag);
        let key = self.create(ActorKind::Txt(Txt::new(font, font_size, is_pos_center)));
        if atlas.is_some() {
            self.set_material(key, atlas, filter_min, filter_mag, 0);
        }
        key
    }

    pub fn create_particle_system(&mut self, setup: Arc<ParticleSystemSetup>) -> NodeKey {
        self.create(ActorKind::ParticleSystem(Box::new(ParticleSystem::new(setup))))
    }

    /// Destroy `key` and its whole subtree
    ///
    /// The node is detached from its parent first. GPU buffers, light slots
    /// and rasterized text textures of every destroyed node are released at
    /// the start of the next render pass.
    pub fn destroy_node(&mut self, key: NodeKey) {
        debug_assert!(key != self.default_cam, "the default camera cannot be destroyed");
        if key == self.default_cam || !self.nodes.contains_key(key) {
            return;
        }
        if self.nodes.get(key).and_then(|node| node.parent).is_some() {
            self.remove_from_parent(key);
        }

        let mut stack = vec![key];
        while let Some(current) = stack.pop() {
            if current == self.default_cam {
                continue;
            }
            let Some(mut node) = self.nodes.remove(current) else {
                continue;
            };
            stack.extend(node.children.iter().copied());

            if let Some(layer) = node.layer.take() {
                self.layers[layer].remove_actor(current, node.material.opacity);
            }
            self.release_queue.buffers.extend(node.render_data.take_buffers());
            match &mut node.kind {
                ActorKind::Light(light) => self.release_queue.lights.extend(light.take_slot()),
                ActorKind::Txt(txt) => {
                    if let Some(texture) = txt.take_sprite_texture() {
                        self.release_queue.textures.push(texture.id());
                    }
                }
                _ => {}
            }

            if self.current_cam == current {
                self.set_current_cam(None);
            }
            for layer in &mut self.layers {
                if layer.cam() == Some(current) {
                    layer.set_cam(None);
                }
            }
            if self.uploaded_cam == Some(current) {
                self.uploaded_cam = None;
            }
        }
    }

    // ===== Layers =====

    /// Register `key` in layer `layer` for rendering
    pub fn add_to_scene(&mut self, key: NodeKey, layer: usize) {
        debug_assert!(layer < self.layers.len(), "layer {} out of range", layer);
        let Some(node) = self.nodes.get_mut(key) else {
            return;
        };
        debug_assert!(node.layer.is_none(), "{} node already in layer", node.kind.name());
        if layer >= self.layers.len() || node.layer.is_some() {
            return;
        }
        node.layer = Some(layer);
        self.layers[layer].add_actor(key, node.material.opacity);
    }

    /// Unregister `key` from its layer; a light gives back its renderer slot
    pub fn remove_from_scene(&mut self, key: NodeKey) {
        let Some(node) = self.nodes.get_mut(key) else {
            return;
        };
        debug_assert!(node.layer.is_some(), "{} node is not in a layer", node.kind.name());
        let Some(layer) = node.layer.take() else {
            return;
        };
        self.layers[layer].remove_actor(key, node.material.opacity);
        if let ActorKind::Light(light) = &mut node.kind {
            self.release_queue.lights.extend(light.take_slot());
        }
    }

    /// Move `key` (and its direct children when asked) to another layer
    pub fn move_to_layer(&mut self, key: NodeKey, layer: usize, include_children: bool) {
        let Some(node) = self.nodes.get(key) else {
            return;
        };
        let children = if include_children { node.children.clone() } else { Vec::new() };
        if node.layer.is_some() {
            self.remove_from_scene(key);
        }
        self.add_to_scene(key, layer);
        for child in children {
            self.move_to_layer(child, layer, false);
        }
    }

    pub fn add_actor(&mut self, key: NodeKey, layer: usize) {
        self.add_to_scene(key, layer);
    }

    pub fn remove_actor(&mut self, key: NodeKey, layer: usize) {
        debug_assert_eq!(self.nodes.get(key).and_then(|node| node.layer), Some(layer));
        self.remove_from_scene(key);
    }

    /// The representative texture of `key` changed from `old`
    pub fn adjust_actor_material(&mut self, key: NodeKey, old: TextureId) {
        let Some(node) = self.nodes.get(key) else {
            return;
        };
        if let Some(layer) = node.layer {
            self.layers[layer].adjust_actor_material(node.material.opacity, old, node.material.single_texture_id());
        }
    }

    pub fn set_sort_dirty(&mut self, layer: usize) {
        if let Some(layer) = self.layers.get_mut(layer) {
            layer.set_sort_dirty();
        }
    }

    pub fn set_layer_visible(&mut self, layer: usize, visible: bool) {
        debug_assert!(layer < self.layers.len());
        if let Some(layer) = self.layers.get_mut(layer) {
            layer.set_visible(visible);
        }
    }

    /// Camera drawing `layer` instead of the current camera (`None` to reset)
    pub fn set_layer_cam(&mut self, layer: usize, cam: Option<NodeKey>) {
        debug_assert!(cam.map_or(true, |cam| self.is_camera(cam)), "layer camera is not a camera");
        if let Some(layer) = self.layers.get_mut(layer) {
            layer.set_cam(cam);
        }
    }

    // ===== Material =====

    /// Bind `texture` on unit `idx` (`None` clears it)
    ///
    /// Binding on `idx == used_unit` grows the unit list; clearing the last
    /// unit shrinks it. The node's layer re-sorts when the representative
    /// texture changed.
    pub fn set_material(
        &mut self,
        key: NodeKey,
        texture: Option<Arc<Texture>>,
        filter_min: TextureFilter,
        filter_mag: TextureFilter,
        idx: usize,
    ) {
        let Some(node) = self.nodes.get_mut(key) else {
            return;
        };
        let uses_second_coord = node.material.uses_second_coord();
        let Some(old) = node.assign_material(texture, filter_min, filter_mag, idx) else {
            return;
        };
        if node.material.uses_second_coord() != uses_second_coord {
            node.rebuild_geometry();
        }
        if let Some(layer) = node.layer {
            self.layers[layer].adjust_actor_material(node.material.opacity, old, node.material.single_texture_id());
        }
    }

    /// Load `path` through `textures` and bind it; an empty path clears the unit
    ///
    /// Returns the bound texture. A texture that fails to load leaves the
    /// unit untouched.
    pub fn set_material_path(
        &mut self,
        key: NodeKey,
        path: &str,
        filter_min: TextureFilter,
        filter_mag: TextureFilter,
        idx: usize,
        textures: &mut TextureManager,
        renderer: &mut dyn Renderer,
    ) -> Option<Arc<Texture>> {
        let texture = if path.is_empty() { None } else { Some(textures.get_texture(path, renderer)?) };
        self.set_material(key, texture.clone(), filter_min, filter_mag, idx);

        let used_unit = self.nodes.get(key).map_or(0, |node| node.material.used_unit);
        texture.filter(|_| idx < used_unit)
    }

    /// Move `key` to another opacity bucket of its layer
    pub fn set_opacity_type(&mut self, key: NodeKey, opacity: OpacityType) {
        let Some(node) = self.nodes.get_mut(key) else {
            return;
        };
        if node.material.opacity == opacity {
            return;
        }
        let old = node.material.opacity;
        node.material.opacity = opacity;
        if let Some(layer) = node.layer {
            self.layers[layer].remove_actor(key, old);
            self.layers[layer].add_actor(key, opacity);
        }
    }

    // ===== Text =====

    /// Replace the string of a text node and rebuild its mesh
    ///
    /// Rasterizing fonts render the string into a fresh texture; the previous
    /// one is released at the next render pass.
    pub fn set_txt(&mut self, key: NodeKey, text: &str, renderer: &mut dyn Renderer) {
        let Some(node) = self.nodes.get_mut(key) else {
            return;
        };
        let ActorKind::Txt(txt) = &mut node.kind else {
            debug_assert!(false, "{} node is not a txt", node.kind.name());
            return;
        };
        txt.set_text(text);
        if txt.is_atlas() {
            node.rebuild_geometry();
            return;
        }

        let Some(raster) = txt.rasterize() else {
            crate::engine_warn!("eri::SceneManager", "Cannot rasterize text '{}'", text);
            return;
        };
        let Some(texture) = Texture::from_image(&raster.image, renderer, false) else {
            crate::engine_warn!("eri::SceneManager", "Renderer refused text texture for '{}'", text);
            return;
        };
        let texture = Arc::new(texture);
        if let Some(old) = txt.replace_sprite_texture(texture.clone()) {
            self.release_queue.textures.push(old.id());
        }
        let (filter_min, filter_mag) = (txt.font().filter_min, txt.font().filter_mag);
        let content = (raster.content_width, raster.content_height);

        self.set_material(key, Some(texture), filter_min, filter_mag, 0);
        if let Some(node) = self.nodes.get_mut(key) {
            if let ActorKind::Txt(txt) = &mut node.kind {
                txt.build_sprite(content, &mut node.render_data);
            }
        }
    }

    // ===== Cameras =====

    pub fn default_cam(&self) -> NodeKey {
        self.default_cam
    }

    pub fn current_cam(&self) -> NodeKey {
        self.current_cam
    }

    fn is_camera(&self, key: NodeKey) -> bool {
        self.nodes.get(key).map_or(false, |node| node.camera().is_some())
    }

    /// Switch the camera used by layers without their own (`None` = default)
    pub fn set_current_cam(&mut self, cam: Option<NodeKey>) {
        let cam = cam.unwrap_or(self.default_cam);
        debug_assert!(self.is_camera(cam), "current camera is not a camera");
        if !self.is_camera(cam) {
            return;
        }
        self.current_cam = cam;
        let (width, height) = self.viewport;
        if let Some(camera) = self.nodes.get_mut(cam).and_then(SceneNode::camera_mut) {
            if camera.backing_size() != (width, height) {
                camera.set_backing_size(width, height);
            }
            camera.set_view_projection_need_update();
        }
    }

    /// Orthogonal zoom of camera `cam`; the node scale becomes `1 / zoom`
    pub fn set_ortho_zoom(&mut self, cam: NodeKey, zoom: f32) {
        let applied = self
            .nodes
            .get_mut(cam)
            .and_then(SceneNode::camera_mut)
            .map_or(false, |camera| camera.set_ortho_zoom(zoom));
        if applied {
            self.set_scale(cam, Vec2::splat(1.0 / zoom));
        }
    }

    /// New render surface size
    pub fn on_viewport_resize(&mut self, width: u32, height: u32) {
        self.viewport = (width, height);
        for cam in [self.default_cam, self.current_cam] {
            if let Some(camera) = self.nodes.get_mut(cam).and_then(SceneNode::camera_mut) {
                if camera.backing_size() != (width, height) {
                    camera.set_backing_size(width, height);
                }
            }
        }
    }

    // ===== Frame =====

    /// Advance every particle system registered in a layer
    pub fn update(&mut self, delta_time: f32) {
        let systems: Vec<NodeKey> = self
            .nodes
            .iter()
            .filter(|(_, node)| node.layer.is_some() && matches!(node.kind, ActorKind::ParticleSystem(_)))
            .map(|(key, _)| key)
            .collect();
        for key in systems {
            self.update_particle_system(key, delta_time);
        }
    }

    /// Advance one particle system by `delta_time`
    pub fn update_particle_system(&mut self, key: NodeKey, delta_time: f32) {
        let Some(world) = self.world_transform(key) else {
            return;
        };
        let mut rotate = 0.0;
        let mut cursor = Some(key);
        while let Some(current) = cursor {
            let Some(node) = self.nodes.get(current) else {
                break;
            };
            rotate += node.transform.rotate();
            cursor = node.parent;
        }

        let Some(node) = self.nodes.get_mut(key) else {
            return;
        };
        let space = EmitSpace { world, rotate, scale: node.transform.scale() };
        node.update_particles(delta_time, &space);
    }

    /// Draw every visible layer in id order
    pub fn render(&mut self, renderer: &mut dyn Renderer) {
        if !self.release_queue.is_empty() {
            self.release_queue.flush(renderer);
        }
        self.sync_lights(renderer);
        self.sort_dirty_layers();

        for layer in 0..self.layers.len() {
            if !self.layers[layer].visible() || self.layers[layer].is_empty() {
                continue;
            }
            let cam = self.layers[layer].cam().unwrap_or(self.current_cam);
            self.apply_camera(cam, renderer);

            let keys: Vec<NodeKey> = self.layers[layer].render_order().collect();
            for key in keys {
                self.render_node(key, cam, renderer);
            }
        }
    }

    /// Release everything still queued (context teardown)
    pub(crate) fn flush_releases(&mut self, renderer: &mut dyn Renderer) {
        self.release_queue.flush(renderer);
    }

    /// Destroy every node except the default camera
    pub(crate) fn clear(&mut self) {
        let roots: Vec<NodeKey> = self
            .nodes
            .iter()
            .filter(|(key, node)| node.parent.is_none() && *key != self.default_cam)
            .map(|(key, _)| key)
            .collect();
        for key in roots {
            self.destroy_node(key);
        }
        if let Some(node) = self.nodes.get_mut(self.default_cam) {
            self.release_queue.buffers.extend(node.render_data.take_buffers());
        }
    }

    fn sync_lights(&mut self, renderer: &mut dyn Renderer) {
        for (_, node) in self.nodes.iter_mut().filter(|(_, node)| node.layer.is_some()) {
            let pos = node.transform.pos3();
            if let ActorKind::Light(light) = &mut node.kind {
                if !light.sync(renderer, pos) {
                    crate::engine_debug!("eri::SceneManager", "No free light slot");
                }
            }
        }
    }

    fn sort_dirty_layers(&mut self) {
        for layer in 0..self.layers.len() {
            if !self.layers[layer].is_sort_dirty() {
                continue;
            }
            let blend = self.layers[layer].bucket(OpacityType::AlphaBlend).to_vec();
            let depths: FxHashMap<NodeKey, f32> = blend
                .into_iter()
                .map(|key| (key, self.view_depth(key).unwrap_or(0.0)))
                .collect();

            let nodes = &self.nodes;
            self.layers[layer].sort(
                |key| nodes.get(key).map(|node| node.material.single_texture_id()).unwrap_or_default(),
                |key| depths.get(&key).copied().unwrap_or(0.0),
            );
        }
    }

    fn apply_camera(&mut self, cam: NodeKey, renderer: &mut dyn Renderer) {
        let switched = self.uploaded_cam != Some(cam);
        let Some(node) = self.nodes.get_mut(cam) else {
            return;
        };
        let SceneNode { kind, transform, .. } = node;
        let ActorKind::Camera(camera) = kind else {
            return;
        };

        if switched {
            camera.set_view_projection_need_update();
        }
        if camera.is_view_need_update() {
            renderer.update_view(&camera.update_view_matrix(transform));
        }
        if camera.is_projection_need_update() {
            renderer.update_projection(&camera.update_projection_matrix());
        }
        self.uploaded_cam = Some(cam);
    }

    fn render_node(&mut self, key: NodeKey, cam: NodeKey, renderer: &mut dyn Renderer) {
        match self.nodes.get(key) {
            Some(node) if node.is_visible() && node.render_data.vertex_count > 0 => {}
            _ => return,
        }
        let Some(world) = self.world_transform(key) else {
            return;
        };

        let sphere = self.nodes.get(key).and_then(SceneNode::world_bounding_sphere);
        if let Some(sphere) = sphere {
            let in_frustum = self.nodes.get_mut(cam).map_or(true, |cam| cam.camera_in_frustum(&sphere));
            if !in_frustum {
                return;
            }
        }

        let Some(node) = self.nodes.get_mut(key) else {
            return;
        };
        let world = if node.render_data.apply_identity_model_matrix { Mat4::IDENTITY } else { world };
        node.render_data.sync_buffers(renderer);
        renderer.enable_material(&node.material);
        renderer.save_transform();
        renderer.render(&node.render_data, &world);
        renderer.recover_transform();
    }
}

#[cfg(test)]
#[path = "scene_manager_tests.rs"]
mod tests;
