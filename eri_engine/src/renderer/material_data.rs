/// Material state: texture units plus fixed-function flags
///
/// Units are contiguous: `units[0..used_unit]` are active.

use std::sync::Arc;
use bitflags::bitflags;
use crate::resource::{Texture, TextureId};

/// Maximum texture units a node can bind
pub const MAX_TEXTURE_UNIT: usize = 4;

/// Texture coordinate sets a vertex format can carry
pub const MAX_TEXTURE_COORD: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextureFilter {
    Nearest,
    #[default]
    Linear,
    LinearMipmapLinear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextureWrap {
    #[default]
    Repeat,
    ClampToEdge,
    MirroredRepeat,
}

/// Texture environment (how a unit combines with the previous stage)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextureEnv {
    #[default]
    Modulate,
    Replace,
    Add,
    Decal,
    Blend,
}

/// Render bucket of a node inside its layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OpacityType {
    #[default]
    Opaque,
    AlphaTest,
    AlphaBlend,
}

bitflags! {
    /// Color channels written by a draw
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ColorWrite: u8 {
        const R = 1 << 0;
        const G = 1 << 1;
        const B = 1 << 2;
        const A = 1 << 3;
    }
}

impl ColorWrite {
    pub fn from_channels(r: bool, g: bool, b: bool, a: bool) -> Self {
        let mut mask = ColorWrite::empty();
        mask.set(ColorWrite::R, r);
        mask.set(ColorWrite::G, g);
        mask.set(ColorWrite::B, b);
        mask.set(ColorWrite::A, a);
        mask
    }
}

/// One texture stage
#[derive(Debug, Clone, Default)]
pub struct TextureUnit {
    pub texture: Option<Arc<Texture>>,
    pub filter_min: TextureFilter,
    pub filter_mag: TextureFilter,
    pub wrap_s: TextureWrap,
    pub wrap_t: TextureWrap,
    pub env: TextureEnv,
    /// Vertex texture coordinate set sampled by this unit (0 or 1)
    pub coord_idx: usize,
}

#[derive(Debug, Clone)]
pub struct MaterialData {
    pub units: [TextureUnit; MAX_TEXTURE_UNIT],
    pub used_unit: usize,
    pub opacity: OpacityType,
    pub depth_test: bool,
    pub depth_write: bool,
    pub cull_face: bool,
    pub cull_front: bool,
    pub color_write: ColorWrite,
    pub accept_light: bool,
}

impl Default for MaterialData {
    fn default() -> Self {
        Self {
            units: Default::default(),
            used_unit: 0,
            opacity: OpacityType::Opaque,
            depth_test: false,
            depth_write: true,
            cull_face: false,
            cull_front: false,
            color_write: ColorWrite::all(),
            accept_light: false,
        }
    }
}

impl MaterialData {
    pub fn texture(&self, idx: usize) -> Option<&Arc<Texture>> {
        self.units.get(idx).and_then(|unit| unit.texture.as_ref())
    }

    /// Representative texture used to batch draws: unit 0, or none
    pub fn single_texture_id(&self) -> TextureId {
        self.texture(0).map(|tex| tex.id()).unwrap_or_default()
    }

    /// Whether any active unit samples the second coordinate set
    pub fn uses_second_coord(&self) -> bool {
        self.units[..self.used_unit].iter().any(|unit| unit.coord_idx > 0)
    }

    /// Premultiplied flag of the first textured unit other than `except`
    pub(crate) fn other_premultiplied(&self, except: usize) -> Option<bool> {
        self.units[..self.used_unit]
            .iter()
            .enumerate()
            .filter(|(idx, _)| *idx != except)
            .find_map(|(_, unit)| unit.texture.as_ref().map(|tex| tex.alpha_premultiplied()))
    }
}
