//! Actor module: kind-specific parts of scene nodes.
//!
//! Each kind holds its own parameters and knows how to regenerate the
//! node's CPU geometry. Operations on a kind are exposed as `SceneNode`
//! methods next to the kind itself.

mod light;
mod sprite;
mod box_mesh;
mod line;
mod number;
mod txt;

pub use light::{Light, LightType};
pub use sprite::Sprite;
pub use box_mesh::BoxMesh;
pub use line::Line;
pub use number::{Number, NumberValue};
pub use txt::{Txt, TxtMeshConstructor};
