/// Light: renderer light slot driven by a scene node.
///
/// The slot is obtained on the first render pass after the node joins a
/// layer and released when it leaves. Every setter only flags the light
/// dirty; the scene manager pushes the full setting set to the renderer
/// while the flag is up.

use glam::Vec3;
use crate::math::Color;
use crate::renderer::Renderer;
use crate::scene::{ActorKind, SceneNode};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightType {
    Point,
    Direction,
    Spot,
}

#[derive(Debug, Clone)]
pub struct Light {
    light_type: LightType,
    idx: Option<usize>,
    ambient: Color,
    diffuse: Color,
    specular: Color,
    attenuation_constant: f32,
    attenuation_linear: f32,
    attenuation_quadratic: f32,
    dir: Vec3,
    spot_exponent: f32,
    spot_cutoff: f32,
    dirty: bool,
}

impl Light {
    pub fn new(light_type: LightType) -> Self {
        Self {
            light_type,
            idx: None,
            ambient: Color::BLACK,
            diffuse: Color::BLACK,
            specular: Color::BLACK,
            attenuation_constant: 1.0,
            attenuation_linear: 0.0,
            attenuation_quadratic: 0.0,
            dir: Vec3::NEG_Z,
            spot_exponent: 0.0,
            spot_cutoff: 180.0,
            dirty: true,
        }
    }

    pub fn light_type(&self) -> LightType {
        self.light_type
    }

    /// Renderer slot, `None` while not obtained
    pub fn idx(&self) -> Option<usize> {
        self.idx
    }

    pub fn ambient(&self) -> Color {
        self.ambient
    }

    pub fn diffuse(&self) -> Color {
        self.diffuse
    }

    pub fn specular(&self) -> Color {
        self.specular
    }

    /// (constant, linear, quadratic)
    pub fn attenuation(&self) -> (f32, f32, f32) {
        (self.attenuation_constant, self.attenuation_linear, self.attenuation_quadratic)
    }

    pub fn dir(&self) -> Vec3 {
        self.dir
    }

    pub fn spot_exponent(&self) -> f32 {
        self.spot_exponent
    }

    pub fn spot_cutoff(&self) -> f32 {
        self.spot_cutoff
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn set_dir(&mut self, dir: Vec3) {
        self.dir = dir;
        self.dirty = true;
    }

    pub fn set_ambient(&mut self, ambient: Color) {
        self.ambient = ambient;
        self.dirty = true;
    }

    pub fn set_diffuse(&mut self, diffuse: Color) {
        self.diffuse = diffuse;
        self.dirty = true;
    }

    pub fn set_specular(&mut self, specular: Color) {
        self.specular = specular;
        self.dirty = true;
    }

    pub fn set_attenuation(&mut self, constant: f32, linear: f32, quadratic: f32) {
        self.attenuation_constant = constant;
        self.attenuation_linear = linear;
        self.attenuation_quadratic = quadratic;
        self.dirty = true;
    }

    pub fn set_spot_exponent(&mut self, exponent: f32) {
        self.spot_exponent = exponent;
        self.dirty = true;
    }

    pub fn set_spot_cutoff(&mut self, cutoff: f32) {
        self.spot_cutoff = cutoff;
        self.dirty = true;
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Obtain a slot if needed, then push settings when dirty
    ///
    /// Returns false when the renderer has no free slot.
    pub(crate) fn sync(&mut self, renderer: &mut dyn Renderer, pos: Vec3) -> bool {
        if self.idx.is_none() {
            self.idx = renderer.obtain_light();
            if self.idx.is_none() {
                return false;
            }
            self.dirty = true;
        }
        if self.dirty {
            if let Some(idx) = self.idx {
                self.apply(renderer, idx, pos);
            }
            self.dirty = false;
        }
        true
    }

    /// Give the slot back; the caller releases it in the renderer
    pub(crate) fn take_slot(&mut self) -> Option<usize> {
        self.dirty = true;
        self.idx.take()
    }

    fn apply(&self, renderer: &mut dyn Renderer, idx: usize, pos: Vec3) {
        match self.light_type {
            LightType::Direction => renderer.set_light_dir(idx, self.dir),
            LightType::Point => renderer.set_light_pos(idx, pos),
            LightType::Spot => {
                renderer.set_light_pos(idx, pos);
                renderer.set_light_spot_dir(idx, self.dir);
                renderer.set_light_spot_exponent(idx, self.spot_exponent);
                renderer.set_light_spot_cutoff(idx, self.spot_cutoff);
            }
        }
        renderer.set_light_ambient(idx, self.ambient);
        renderer.set_light_diffuse(idx, self.diffuse);
        renderer.set_light_specular(idx, self.specular);
        renderer.set_light_attenuation(
            idx,
            self.attenuation_constant,
            self.attenuation_linear,
            self.attenuation_quadratic,
        );
    }
}

impl SceneNode {
    pub fn light(&self) -> Option<&Light> {
        match &self.kind {
            ActorKind::Light(light) => Some(light),
            _ => None,
        }
    }

    pub fn light_mut(&mut self) -> Option<&mut Light> {
        match &mut self.kind {
            ActorKind::Light(light) => Some(light),
            _ => None,
        }
    }
}

#[cfg(test)]
#[path = "light_tests.rs"]
mod tests;
