//! Scene module: the node arena, layers and the per-frame traversal.
//!
//! Nodes are [`SceneNode`] values stored in the [`SceneManager`] arena and
//! addressed by [`NodeKey`]. Each node carries a [`Transform`], material and
//! render data plus its [`ActorKind`].

mod transform;
mod scene_node;
mod layer;
mod scene_manager;
mod hierarchy;
mod render_to_texture;

pub use transform::Transform;
pub use scene_node::{ActorKind, NodeKey, SceneNode};
pub use layer::Layer;
pub use scene_manager::{SceneManager, DEFAULT_LAYER_COUNT};
pub use render_to_texture::RenderToTexture;
