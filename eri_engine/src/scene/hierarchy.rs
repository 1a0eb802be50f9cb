/// Transforms, parent/child links and visibility of scene nodes.
///
/// Local setters mark the node's model matrix dirty and flag world matrices
/// dirty down the subtree. Whether view depth (and therefore the layer's
/// back-to-front order) is also invalidated depends on the build:
///
/// | setter           | 3D (default)      | `view-2d`                        |
/// |------------------|-------------------|----------------------------------|
/// | `set_pos`        | self + children   | nothing                          |
/// | `set_pos3`       | self + children   | self + children if z changed     |
/// | `set_rotate`     | children          | children if the axis leaves z    |
/// | `set_scale`      | children          | nothing                          |
/// | `set_scale3`     | children          | children if scale.z is non-zero  |
///
/// World matrices are recomputed lazily, root first, on the next query.

use glam::{Mat4, Vec2, Vec3};
use crate::actor::LightType;
use super::scene_manager::SceneManager;
use super::scene_node::{ActorKind, NodeKey};

const VIEW_2D: bool = cfg!(feature = "view-2d");

/// Who gets view depth invalidated by a transform change
#[derive(Debug, Clone, Copy)]
struct DepthDirty {
    own: bool,
    children: bool,
}

impl DepthDirty {
    const fn new(own: bool, children: bool) -> Self {
        Self { own, children }
    }
}

/// What moved, for the camera and light hooks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Change {
    Translate,
    Rotate,
    Scale,
}

impl SceneManager {
    // ===== Local transform =====

    pub fn set_pos(&mut self, key: NodeKey, pos: Vec2) {
        let Some(node) = self.nodes.get_mut(key) else {
            return;
        };
        let z = node.transform.pos3().z;
        node.transform.set_translate(pos.extend(z));
        let depth = if VIEW_2D { DepthDirty::new(false, false) } else { DepthDirty::new(true, true) };
        self.after_transform(key, Change::Translate, depth);
    }

    pub fn set_pos3(&mut self, key: NodeKey, pos: Vec3) {
        let Some(node) = self.nodes.get_mut(key) else {
            return;
        };
        let z_changed = node.transform.pos3().z != pos.z;
        node.transform.set_translate(pos);
        let depth = if VIEW_2D { DepthDirty::new(z_changed, z_changed) } else { DepthDirty::new(true, true) };
        self.after_transform(key, Change::Translate, depth);
    }

    /// Rotation in degrees around the current axis
    pub fn set_rotate(&mut self, key: NodeKey, degree: f32) {
        let Some(node) = self.nodes.get_mut(key) else {
            return;
        };
        let axis = node.transform.rotate_axis();
        node.transform.set_rotation(degree, axis);
        self.after_transform(key, Change::Rotate, Self::rotate_depth(axis));
    }

    pub fn set_rotate_axis(&mut self, key: NodeKey, degree: f32, axis: Vec3) {
        let Some(node) = self.nodes.get_mut(key) else {
            return;
        };
        node.transform.set_rotation(degree, axis);
        self.after_transform(key, Change::Rotate, Self::rotate_depth(axis));
    }

    pub fn set_scale(&mut self, key: NodeKey, scale: Vec2) {
        let Some(node) = self.nodes.get_mut(key) else {
            return;
        };
        let z = node.transform.scale3().z;
        node.transform.set_scale(scale.extend(z));
        let depth = if VIEW_2D { DepthDirty::new(false, false) } else { DepthDirty::new(false, true) };
        self.after_transform(key, Change::Scale, depth);
    }

    pub fn set_scale3(&mut self, key: NodeKey, scale: Vec3) {
        let Some(node) = self.nodes.get_mut(key) else {
            return;
        };
        node.transform.set_scale(scale);
        let depth = if VIEW_2D { DepthDirty::new(false, scale.z != 0.0) } else { DepthDirty::new(false, true) };
        self.after_transform(key, Change::Scale, depth);
    }

    fn rotate_depth(axis: Vec3) -> DepthDirty {
        if VIEW_2D {
            DepthDirty::new(false, axis.x != 0.0 || axis.y != 0.0)
        } else {
            DepthDirty::new(false, true)
        }
    }

    fn after_transform(&mut self, key: NodeKey, change: Change, depth: DepthDirty) {
        if let Some(node) = self.nodes.get_mut(key) {
            match &mut node.kind {
                ActorKind::Camera(camera) => match change {
                    Change::Translate => camera.set_view_modified(),
                    Change::Rotate => camera.on_rotate(),
                    Change::Scale => {}
                },
                ActorKind::Light(light) => {
                    if change == Change::Translate && light.light_type() != LightType::Direction {
                        light.mark_dirty();
                    }
                }
                _ => {}
            }
        }
        self.mark_world_dirty(key, depth.own, depth.children);
    }

    /// Flag world matrices of `key` and its subtree dirty
    pub(crate) fn mark_world_dirty(&mut self, key: NodeKey, depth: bool, child_depth: bool) {
        let mut stack = vec![(key, depth)];
        while let Some((current, depth)) = stack.pop() {
            let Some(node) = self.nodes.get_mut(current) else {
                continue;
            };
            node.transform.mark_world_dirty(depth);
            if depth {
                if let Some(layer) = node.layer {
                    self.layers[layer].set_sort_dirty();
                }
            }
            stack.extend(node.children.iter().map(|&child| (child, child_depth)));
        }
    }

    // ===== Derived matrices =====

    /// Local model matrix `T * R * S`
    pub fn transform(&mut self, key: NodeKey) -> Option<Mat4> {
        Some(self.nodes.get_mut(key)?.transform.model_matrix())
    }

    pub fn inv_transform(&mut self, key: NodeKey) -> Option<Mat4> {
        Some(self.nodes.get_mut(key)?.transform.inv_model_matrix())
    }

    /// Parent world × model, recomputed from the root down where dirty
    pub fn world_transform(&mut self, key: NodeKey) -> Option<Mat4> {
        let mut chain = Vec::new();
        let mut cursor = Some(key);
        while let Some(current) = cursor {
            let node = self.nodes.get(current)?;
            chain.push(current);
            cursor = node.parent;
        }

        let mut parent_world = None;
        for current in chain.into_iter().rev() {
            let node = self.nodes.get_mut(current)?;
            let world = if node.transform.is_world_dirty() {
                let world = node.transform.update_world(parent_world);
                node.update_world_bounding();
                world
            } else {
                node.transform.cached_world()
            };
            parent_world = Some(world);
        }
        parent_world
    }

    pub fn inv_world_transform(&mut self, key: NodeKey) -> Option<Mat4> {
        self.world_transform(key)?;
        Some(self.nodes.get_mut(key)?.transform.inv_world())
    }

    /// World z of the node origin, cached until depth is flagged dirty
    pub fn view_depth(&mut self, key: NodeKey) -> Option<f32> {
        self.world_transform(key)?;
        Some(self.nodes.get_mut(key)?.transform.view_depth())
    }

    /// `world_pos` expressed in the node's local space
    pub fn local_space_pos(&mut self, key: NodeKey, world_pos: Vec3) -> Option<Vec3> {
        Some(self.inv_world_transform(key)?.transform_point3(world_pos))
    }

    /// Whether `world_pos` hits the node's own area
    pub fn is_hit(&mut self, key: NodeKey, world_pos: Vec3) -> bool {
        let Some(local) = self.local_space_pos(key, world_pos) else {
            return false;
        };
        self.nodes.get(key).map_or(false, |node| node.is_in_area(local.truncate()))
    }

    /// Topmost visible node of the subtree hit at `parent_pos`
    ///
    /// `parent_pos` is in the parent's space. The node itself is tested
    /// first, then its children from last to first.
    pub fn hit_actor(&mut self, key: NodeKey, parent_pos: Vec3) -> Option<NodeKey> {
        let node = self.nodes.get_mut(key)?;
        if !node.is_visible() {
            return None;
        }
        let local = node.transform.inv_model_matrix().transform_point3(parent_pos);
        if node.is_in_area(local.truncate()) {
            return Some(key);
        }
        let children = node.children.clone();
        children.into_iter().rev().find_map(|child| self.hit_actor(child, local))
    }

    // ===== Hierarchy =====

    fn is_ancestor(&self, ancestor: NodeKey, key: NodeKey) -> bool {
        let mut cursor = self.nodes.get(key).and_then(|node| node.parent);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = self.nodes.get(current).and_then(|node| node.parent);
        }
        false
    }

    /// Attach `child` under `parent`, detaching it from its previous parent
    ///
    /// The child's world matrix and view depth become dirty and it inherits
    /// the parent's effective visibility.
    pub fn add_child(&mut self, parent: NodeKey, child: NodeKey) {
        debug_assert!(parent != child, "a node cannot be its own child");
        debug_assert!(!self.is_ancestor(child, parent), "adding an ancestor as child");
        if parent == child
            || self.is_ancestor(child, parent)
            || !self.nodes.contains_key(parent)
            || !self.nodes.contains_key(child)
        {
            return;
        }

        if let Some(old_parent) = self.nodes.get(child).and_then(|node| node.parent) {
            self.remove_child(old_parent, child);
        }

        let Some(parent_node) = self.nodes.get_mut(parent) else {
            return;
        };
        parent_node.children.push(child);
        let visible = parent_node.is_visible();
        if let Some(child_node) = self.nodes.get_mut(child) {
            child_node.parent = Some(parent);
        }

        self.mark_world_dirty(child, true, true);
        self.set_visible(child, visible, true);
    }

    /// Detach `child`; it becomes a root with its inherited visibility reset
    pub fn remove_child(&mut self, parent: NodeKey, child: NodeKey) {
        let Some(parent_node) = self.nodes.get_mut(parent) else {
            return;
        };
        let Some(at) = parent_node.children.iter().position(|&key| key == child) else {
            debug_assert!(false, "node is not a child of this parent");
            return;
        };
        parent_node.children.remove(at);

        if let Some(child_node) = self.nodes.get_mut(child) {
            child_node.parent = None;
        }
        self.mark_world_dirty(child, true, true);
        self.set_visible(child, true, true);
    }

    pub fn remove_all_children(&mut self, key: NodeKey) {
        let Some(node) = self.nodes.get_mut(key) else {
            return;
        };
        let children = std::mem::take(&mut node.children);
        for child in children {
            if let Some(child_node) = self.nodes.get_mut(child) {
                child_node.parent = None;
            }
            self.mark_world_dirty(child, true, true);
            self.set_visible(child, true, true);
        }
    }

    pub fn remove_from_parent(&mut self, key: NodeKey) {
        let parent = self.nodes.get(key).and_then(|node| node.parent);
        debug_assert!(parent.is_some(), "node has no parent");
        if let Some(parent) = parent {
            self.remove_child(parent, key);
        }
    }

    // ===== Visibility =====

    /// Set the explicit flag, or the inherited one when `inherit` is true
    ///
    /// Children are only updated when the effective visibility flips.
    pub fn set_visible(&mut self, key: NodeKey, visible: bool, inherit: bool) {
        let Some(node) = self.nodes.get_mut(key) else {
            return;
        };
        let before = node.is_visible();
        if inherit {
            node.set_visible_flags(node.visible(), visible);
        } else {
            node.set_visible_flags(visible, node.inherit_visible());
        }
        let after = node.is_visible();
        if before == after {
            return;
        }

        let children = node.children.clone();
        for child in children {
            self.set_visible(child, after, true);
        }
    }
}
