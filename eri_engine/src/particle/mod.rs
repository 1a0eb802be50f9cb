//! Particle module: pooled 2D particle simulation.
//!
//! A [`ParticleSystem`] is a scene node kind. It owns a fixed pool of
//! [`Particle`] records sized from its [`Emitter`], runs every
//! [`Affector`] on live particles each frame and rewrites one quad per
//! live particle into the node's render data.
//!
//! Systems are usually built from a [`ParticleSystemCreator`], itself
//! loaded from a particle script with [`load_particle_script`].

mod particle;
mod emitter;
mod affector;
mod particle_system;
mod creator;
mod script;

pub use particle::Particle;
pub use emitter::{Emitter, EmitterShape};
pub use affector::{Affector, AffectorKind, ColorInterval};
pub use particle_system::{EmitSpace, ParticleSystem, ParticleSystemSetup, MAX_PARTICLES};
pub use creator::{ParticleMaterialSetup, ParticleSystemCreator};
pub use script::{load_particle_script, ScriptNode};

use rand::Rng;

/// Uniform value between `min` and `max` (either order, inclusive)
pub(crate) fn range_random(rng: &mut impl Rng, min: f32, max: f32) -> f32 {
    let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
    if lo < hi {
        rng.gen_range(lo..=hi)
    } else {
        lo
    }
}
