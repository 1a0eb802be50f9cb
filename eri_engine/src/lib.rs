/*!
# Eri Engine

Scene core of a small 2D/3D engine with a pluggable rendering backend.

The crate owns the scene graph, render layers, cameras, lights, text and
particle systems, and drives a [`Renderer`](renderer::Renderer) implementation
supplied by the application. Image decoding, font loading and script parsing
are collaborators behind traits as well, so the whole engine runs headless
against [`MockRenderer`](renderer::MockRenderer) in tests.

## Architecture

- **Root**: engine context owning the renderer, scene and resource caches
- **SceneManager**: node arena, hierarchy, layers and the render traversal
- **SceneNode / ActorKind**: shared node components plus the kind-specific part
  (camera, light, sprite, box, line, number, text, particle system)
- **ParticleSystem**: pooled particles fed by an emitter and affectors,
  built from scripts through `ParticleSystemCreator`
- **TextureManager / FontManager**: path-keyed resource caches
*/

// Internal modules
mod error;
mod root;
pub mod log;
pub mod math;
pub mod renderer;
pub mod resource;
pub mod utils;
pub mod scene;
pub mod camera;
pub mod actor;
pub mod particle;

// Main eri namespace module
pub mod eri {
    // Error types
    pub use crate::error::{Error, Result};

    // Engine context
    pub use crate::root::{Root, RootConfig};

    // Renderer backend trait
    pub use crate::renderer::Renderer;

    // Logging sub-module (types only, NOT macros)
    pub mod log {
        pub use crate::log::{DefaultLogger, LogEntry, LogSeverity, Logger};
    }

    pub mod math {
        pub use crate::math::*;
    }

    // Render sub-module with all backend-facing types
    pub mod render {
        pub use crate::renderer::*;
    }

    pub mod resource {
        pub use crate::resource::*;
    }

    pub mod scene {
        pub use crate::scene::*;
        pub use crate::camera::{Camera, Projection};
        pub use crate::actor::*;
    }

    pub mod particle {
        pub use crate::particle::*;
    }
}

// Re-export math library at crate root
pub use glam;
