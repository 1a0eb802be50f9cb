//! Camera module: camera node kind and frustum.
//!
//! A camera is a scene node (it can be moved, rotated and parented like any
//! other). The scene manager uploads its matrices to the renderer and uses
//! its frustum to cull spheres.

mod camera;
mod frustum;

pub use camera::{Camera, Projection};
pub use frustum::{
    Frustum,
    PLANE_LEFT, PLANE_RIGHT, PLANE_BOTTOM, PLANE_TOP, PLANE_NEAR, PLANE_FAR,
};
