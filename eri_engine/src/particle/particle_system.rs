/// ParticleSystem: pooled particles driven by one emitter and a list of affectors.
///
/// State machine: a system with a negative custom life plays forever. A
/// system with a finite life is stopped until [`ParticleSystem::play`], then
/// emits for `custom_life` seconds and keeps updating until its longest-lived
/// particle can have died (`custom_life + life_max`), after which it stops.
///
/// Unless the setup is coordinate-relative, particles are simulated in world
/// space: emission positions go through the node's world matrix and the
/// render data is drawn with an identity model matrix.

use std::sync::Arc;
use glam::{Mat4, Vec2};
use rand::rngs::StdRng;
use rand::SeedableRng;
use crate::math::{rotate_degree, Color};
use crate::renderer::{BufferUsage, PrimitiveType, RenderData, VertexData, VertexPosTexColor};
use crate::scene::{ActorKind, SceneNode};
use super::affector::Affector;
use super::emitter::Emitter;
use super::particle::Particle;
use super::range_random;

/// Pool cap; 4 vertices per particle must stay addressable by u16 indices
pub const MAX_PARTICLES: usize = 16384;

/// Pool headroom over the steady-state particle count
const POOL_FACTOR: f32 = 1.25;

/// Shared, immutable description of a family of particle systems
#[derive(Debug, Clone, PartialEq)]
pub struct ParticleSystemSetup {
    /// Simulate in the node's local space instead of world space
    pub is_coord_relative: bool,
    /// Emission duration in seconds; negative plays forever
    pub custom_life: f32,
    pub particle_size: Vec2,
    pub life_min: f32,
    pub life_max: f32,
    pub speed_min: f32,
    pub speed_max: f32,
    pub rotate_min: f32,
    pub rotate_max: f32,
    pub scale_min: f32,
    pub scale_max: f32,
}

impl Default for ParticleSystemSetup {
    fn default() -> Self {
        Self {
            is_coord_relative: false,
            custom_life: -1.0,
            particle_size: Vec2::ONE,
            life_min: 1.0,
            life_max: 1.0,
            speed_min: 0.0,
            speed_max: 0.0,
            rotate_min: 0.0,
            rotate_max: 0.0,
            scale_min: 1.0,
            scale_max: 1.0,
        }
    }
}

/// Where the owning node sits in the world at update time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EmitSpace {
    pub world: Mat4,
    /// Accumulated rotation of the node and its ancestors, degrees
    pub rotate: f32,
    pub scale: Vec2,
}

impl Default for EmitSpace {
    fn default() -> Self {
        Self { world: Mat4::IDENTITY, rotate: 0.0, scale: Vec2::ONE }
    }
}

pub struct ParticleSystem {
    setup: Arc<ParticleSystemSetup>,
    emitter: Option<Emitter>,
    affectors: Vec<Affector>,
    particles: Vec<Particle>,
    first_available: Option<usize>,
    custom_life: f32,
    lived_time: f32,
    system_scale: Vec2,
    uv_start: Vec2,
    uv_size: Vec2,
    rng: StdRng,
}

impl ParticleSystem {
    pub fn new(setup: Arc<ParticleSystemSetup>) -> Self {
        debug_assert!(setup.life_min <= setup.life_max);
        let custom_life = setup.custom_life;
        Self {
            setup,
            emitter: None,
            affectors: Vec::new(),
            particles: Vec::new(),
            first_available: None,
            custom_life,
            lived_time: -1.0,
            system_scale: Vec2::ONE,
            uv_start: Vec2::ZERO,
            uv_size: Vec2::ONE,
            rng: StdRng::from_entropy(),
        }
    }

    /// Reseed the emission random source
    pub fn set_seed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    pub fn setup(&self) -> &ParticleSystemSetup {
        &self.setup
    }

    pub fn emitter(&self) -> Option<&Emitter> {
        self.emitter.as_ref()
    }

    pub fn affectors(&self) -> &[Affector] {
        &self.affectors
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn capacity(&self) -> usize {
        self.particles.len()
    }

    pub fn in_use_count(&self) -> usize {
        self.particles.iter().filter(|p| p.in_use).count()
    }

    pub fn custom_life(&self) -> f32 {
        self.custom_life
    }

    pub fn set_custom_life(&mut self, life: f32) {
        self.custom_life = life;
    }

    /// Seconds since `play`, `-1` when stopped
    pub fn lived_time(&self) -> f32 {
        self.lived_time
    }

    pub fn uv_area(&self) -> (Vec2, Vec2) {
        (self.uv_start, self.uv_size)
    }

    pub fn play(&mut self) {
        self.lived_time = 0.0;
    }

    pub fn is_playing(&self) -> bool {
        self.custom_life < 0.0 || self.lived_time >= 0.0
    }

    /// Re-read the shared setup
    pub fn refresh_setup(&mut self, render_data: &mut RenderData) {
        debug_assert!(self.setup.life_min <= self.setup.life_max, "particle life range is reversed");
        render_data.apply_identity_model_matrix = !self.setup.is_coord_relative;
        self.custom_life = self.setup.custom_life;
    }

    /// Install `emitter` and size the pool for it
    ///
    /// Every particle is reset and the render data gets a fresh vertex and
    /// index layout of 4 vertices and 6 indices per pooled particle.
    pub fn set_emitter(&mut self, emitter: Emitter, render_data: &mut RenderData) {
        let wanted = (emitter.rate() * self.setup.life_max * POOL_FACTOR).ceil().max(1.0) as usize;
        if wanted > MAX_PARTICLES {
            crate::engine_warn!(
                "eri::ParticleSystem",
                "Pool of {} particles clamped to {}",
                wanted, MAX_PARTICLES
            );
        }
        let capacity = wanted.min(MAX_PARTICLES);

        self.emitter = Some(emitter);
        self.particles.resize_with(capacity, Particle::default);
        self.particles.iter_mut().for_each(Particle::reset);
        self.first_available = Some(0);

        render_data.set_vertices(
            VertexData::PosTexColor(vec![VertexPosTexColor::default(); capacity * 4]),
            PrimitiveType::Triangles,
        );
        render_data.set_indices(
            (0..capacity)
                .flat_map(|i| {
                    let base = (i * 4) as u16;
                    [base, base + 2, base + 3, base + 3, base + 1, base]
                })
                .collect(),
        );
        render_data.vertex_count = 0;
        render_data.index_count = 0;
        render_data.usage = BufferUsage::Dynamic;
    }

    pub fn add_affector(&mut self, affector: Affector) {
        let period = affector.period();
        for p in &mut self.particles {
            p.affector_timers.push(period);
        }
        self.affectors.push(affector);
    }

    /// Texture sub-rectangle every particle quad samples
    pub fn set_tex_area_uv(&mut self, start: Vec2, size: Vec2) {
        self.uv_start = start;
        self.uv_size = size;
    }

    /// Return every particle to the pool
    pub fn reset_particles(&mut self, render_data: &mut RenderData) {
        self.particles.iter_mut().for_each(Particle::reset);
        self.first_available = if self.particles.is_empty() { None } else { Some(0) };
        self.update_buffer(render_data);
    }

    /// Take a free particle out of the pool
    ///
    /// The returned slot is marked in use. `None` when every slot is taken.
    pub fn obtain_particle(&mut self) -> Option<usize> {
        let hint = self
            .first_available
            .filter(|&idx| self.particles.get(idx).map_or(false, |p| !p.in_use));
        let idx = match hint {
            Some(idx) => idx,
            None => self.particles.iter().position(|p| !p.in_use)?,
        };

        self.particles[idx].in_use = true;
        self.first_available = self.particles[idx + 1..]
            .iter()
            .position(|p| !p.in_use)
            .map(|offset| idx + 1 + offset);
        Some(idx)
    }

    /// Advance the simulation by `delta_time` seconds
    ///
    /// A stopped system is frozen: nothing ages and the geometry is kept.
    pub fn update(&mut self, delta_time: f32, space: &EmitSpace, render_data: &mut RenderData) {
        if !self.is_playing() {
            return;
        }
        if self.custom_life >= 0.0 && self.lived_time >= 0.0 {
            self.lived_time += delta_time;
            if self.lived_time > self.custom_life + self.setup.life_max {
                self.lived_time = -1.0;
            }
        }

        self.system_scale = if self.setup.is_coord_relative { Vec2::ONE } else { space.scale };
        let system_scale = self.system_scale;

        let mut first_available = self.first_available;
        for (i, p) in self.particles.iter_mut().enumerate() {
            if !p.in_use {
                continue;
            }

            p.lived_time += delta_time;
            if p.lived_time < p.life {
                p.lived_percent = p.lived_time / p.life;
                p.pos += p.velocity * system_scale * delta_time;

                for (a, affector) in self.affectors.iter().enumerate() {
                    let timer = p.affector_timers.get(a).copied().unwrap_or(-1.0);
                    if timer == -1.0 || timer > 0.0 {
                        affector.update(delta_time, p);
                        if timer > 0.0 {
                            p.affector_timers[a] = (timer - delta_time).max(0.0);
                        }
                    }
                }
            } else {
                p.reset();
                first_available = Some(first_available.map_or(i, |first| first.min(i)));
            }
        }
        self.first_available = first_available;

        let emitting = self.custom_life < 0.0
            || (self.lived_time > 0.0 && self.lived_time < self.custom_life);
        if emitting {
            if let Some(count) = self.emitter.as_mut().and_then(|emitter| emitter.check_emit(delta_time)) {
                for _ in 0..count {
                    if !self.emit(space) {
                        break;
                    }
                }
            }
        }

        self.update_buffer(render_data);
    }

    /// Spawn one particle; false once the pool is exhausted
    fn emit(&mut self, space: &EmitSpace) -> bool {
        if self.emitter.is_none() {
            return false;
        }
        // pool exhausted: drop the emission silently
        let Some(idx) = self.obtain_particle() else {
            return false;
        };
        let Some(emitter) = self.emitter.as_ref() else {
            return false;
        };

        let setup = &*self.setup;
        let rng = &mut self.rng;
        let mut pos = emitter.emit_pos(rng);
        let mut angle = emitter.emit_angle(rng);
        if !setup.is_coord_relative {
            pos = space.world.transform_point3(pos.extend(0.0)).truncate();
            angle += space.rotate;
        }

        let p = &mut self.particles[idx];
        p.pos = pos;
        p.size = setup.particle_size * range_random(rng, setup.scale_min, setup.scale_max);
        p.scale = Vec2::ONE;
        p.rotate_angle = range_random(rng, setup.rotate_min, setup.rotate_max) + angle;
        p.rotate_speed = 0.0;
        p.life = range_random(rng, setup.life_min, setup.life_max);
        p.velocity = rotate_degree(Vec2::Y, angle) * range_random(rng, setup.speed_min, setup.speed_max);
        p.color = Color::WHITE;
        p.color_interval = 0;
        p.lived_time = 0.0;
        p.lived_percent = 0.0;
        p.affector_timers.clear();
        p.affector_timers.extend(self.affectors.iter().map(Affector::period));
        for affector in &self.affectors {
            affector.init_setup(p);
        }
        p.in_use = true;
        true
    }

    /// Rewrite one quad per live particle, live quads packed first
    fn update_buffer(&self, render_data: &mut RenderData) {
        let tint = render_data.color;
        let VertexData::PosTexColor(vertices) = &mut render_data.vertices else {
            render_data.vertex_count = 0;
            render_data.index_count = 0;
            return;
        };

        let uv_start = self.uv_start;
        let uv_end = self.uv_start + self.uv_size;
        let mut count = 0;
        for (p, quad) in self.particles.iter().filter(|p| p.in_use).zip(vertices.chunks_exact_mut(4)) {
            let color = (p.color * tint).to_rgba8();
            let up = rotate_degree(
                Vec2::new(0.0, p.size.y * p.scale.y * 0.5 * self.system_scale.y),
                p.rotate_angle,
            );
            let right = rotate_degree(
                Vec2::new(p.size.x * p.scale.x * 0.5 * self.system_scale.x, 0.0),
                p.rotate_angle,
            );

            let corners = [
                (p.pos + up - right, [uv_start.x, uv_start.y]),
                (p.pos + up + right, [uv_end.x, uv_start.y]),
                (p.pos - up - right, [uv_start.x, uv_end.y]),
                (p.pos - up + right, [uv_end.x, uv_end.y]),
            ];
            for (vertex, (pos, tex_coord)) in quad.iter_mut().zip(corners) {
                *vertex = VertexPosTexColor { position: pos.to_array(), tex_coord, color };
            }
            count += 1;
        }

        render_data.vertex_count = count * 4;
        render_data.index_count = count * 6;
        render_data.mark_vertices_dirty();
    }

    /// Bring render data in line after a rebuild request
    pub(crate) fn sync_render_data(&self, render_data: &mut RenderData) {
        render_data.apply_identity_model_matrix = !self.setup.is_coord_relative;
        self.update_buffer(render_data);
    }
}

// ===== Node operations =====

impl SceneNode {
    pub fn particle_system(&self) -> Option<&ParticleSystem> {
        match &self.kind {
            ActorKind::ParticleSystem(system) => Some(system),
            _ => None,
        }
    }

    /// Direct access for settings that do not touch geometry (seed, play, affectors)
    pub fn particle_system_mut(&mut self) -> Option<&mut ParticleSystem> {
        match &mut self.kind {
            ActorKind::ParticleSystem(system) => Some(system),
            _ => None,
        }
    }

    fn edit_particle_system(&mut self, edit: impl FnOnce(&mut ParticleSystem, &mut RenderData)) {
        match &mut self.kind {
            ActorKind::ParticleSystem(system) => edit(system, &mut self.render_data),
            _ => debug_assert!(false, "{} node is not a particle system", self.kind.name()),
        }
    }

    pub fn set_particle_emitter(&mut self, emitter: Emitter) {
        self.edit_particle_system(|system, rd| system.set_emitter(emitter, rd));
    }

    pub fn reset_particles(&mut self) {
        self.edit_particle_system(|system, rd| system.reset_particles(rd));
    }

    pub fn refresh_particle_setup(&mut self) {
        self.edit_particle_system(|system, rd| system.refresh_setup(rd));
    }

    pub(crate) fn update_particles(&mut self, delta_time: f32, space: &EmitSpace) {
        self.edit_particle_system(|system, rd| system.update(delta_time, space, rd));
    }
}

#[cfg(test)]
#[path = "particle_system_tests.rs"]
mod tests;
