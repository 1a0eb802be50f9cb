/// Layer: a render-order partition of the scene.
///
/// Actors are split into opacity buckets drawn in the order opaque,
/// alpha-test, alpha-blend. Mutations only flag the layer dirty; the scene
/// manager re-sorts it once at the start of the next render pass.

use std::cmp::Ordering;
use crate::renderer::OpacityType;
use crate::resource::TextureId;
use super::scene_node::NodeKey;

pub struct Layer {
    id: usize,
    cam: Option<NodeKey>,
    visible: bool,
    opaque: Vec<NodeKey>,
    alpha_test: Vec<NodeKey>,
    alpha_blend: Vec<NodeKey>,
    sort_dirty: bool,
}

impl Layer {
    pub fn new(id: usize) -> Self {
        Self {
            id,
            cam: None,
            visible: true,
            opaque: Vec::new(),
            alpha_test: Vec::new(),
            alpha_blend: Vec::new(),
            sort_dirty: false,
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    /// Camera overriding the scene's current camera for this layer
    pub fn cam(&self) -> Option<NodeKey> {
        self.cam
    }

    pub fn set_cam(&mut self, cam: Option<NodeKey>) {
        self.cam = cam;
    }

    pub fn visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    fn bucket_mut(&mut self, opacity: OpacityType) -> &mut Vec<NodeKey> {
        match opacity {
            OpacityType::Opaque => &mut self.opaque,
            OpacityType::AlphaTest => &mut self.alpha_test,
            OpacityType::AlphaBlend => &mut self.alpha_blend,
        }
    }

    pub fn bucket(&self, opacity: OpacityType) -> &[NodeKey] {
        match opacity {
            OpacityType::Opaque => &self.opaque,
            OpacityType::AlphaTest => &self.alpha_test,
            OpacityType::AlphaBlend => &self.alpha_blend,
        }
    }

    pub fn add_actor(&mut self, key: NodeKey, opacity: OpacityType) {
        debug_assert!(!self.contains(key), "actor added twice to layer {}", self.id);
        self.bucket_mut(opacity).push(key);
        self.sort_dirty = true;
    }

    /// Returns false if `key` was not in the `opacity` bucket
    pub fn remove_actor(&mut self, key: NodeKey, opacity: OpacityType) -> bool {
        let bucket = self.bucket_mut(opacity);
        match bucket.iter().position(|k| *k == key) {
            Some(at) => {
                bucket.remove(at);
                true
            }
            None => false,
        }
    }

    /// Representative texture of `key` changed from `old` to `new`
    pub fn adjust_actor_material(&mut self, opacity: OpacityType, old: TextureId, new: TextureId) {
        if opacity != OpacityType::AlphaBlend && old != new {
            self.sort_dirty = true;
        }
    }

    pub fn set_sort_dirty(&mut self) {
        self.sort_dirty = true;
    }

    pub fn is_sort_dirty(&self) -> bool {
        self.sort_dirty
    }

    pub fn contains(&self, key: NodeKey) -> bool {
        self.opaque.contains(&key) || self.alpha_test.contains(&key) || self.alpha_blend.contains(&key)
    }

    pub fn len(&self) -> usize {
        self.opaque.len() + self.alpha_test.len() + self.alpha_blend.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Draw order: opaque, alpha-test, alpha-blend
    pub fn render_order(&self) -> impl Iterator<Item = NodeKey> + '_ {
        self.opaque
            .iter()
            .chain(self.alpha_test.iter())
            .chain(self.alpha_blend.iter())
            .copied()
    }

    /// Stable sort: texture id for opaque and alpha-test, back to front for blend
    pub(crate) fn sort(
        &mut self,
        texture_of: impl Fn(NodeKey) -> TextureId,
        depth_of: impl Fn(NodeKey) -> f32,
    ) {
        self.opaque.sort_by_key(|k| texture_of(*k));
        self.alpha_test.sort_by_key(|k| texture_of(*k));
        self.alpha_blend.sort_by(|a, b| {
            depth_of(*a).partial_cmp(&depth_of(*b)).unwrap_or(Ordering::Equal)
        });
        self.sort_dirty = false;
    }
}

#[cfg(test)]
#[path = "layer_tests.rs"]
mod tests;
