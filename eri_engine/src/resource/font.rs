/// Fonts: glyph-atlas fonts and rasterizing fonts, cached by path.

use std::fmt;
use std::sync::Arc;
use rustc_hash::FxHashMap;
use crate::renderer::TextureFilter;
use super::texture::{Texture, TextureImage};

/// Glyph placement inside an atlas, in texels
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CharSetting {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub x_offset: f32,
    pub y_offset: f32,
    pub x_advance: f32,
}

/// Text rendered into a single image
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RasterizedText {
    pub image: TextureImage,
    /// Used part of the image (the image may be padded)
    pub content_width: u32,
    pub content_height: u32,
}

/// Platform text rasterizer collaborator
pub trait GlyphRasterizer {
    fn rasterize(&self, text: &str, font_size: u32, anti_alias: bool) -> Option<RasterizedText>;
}

pub enum FontKind {
    /// Pre-baked glyphs in one texture
    Atlas {
        texture: Arc<Texture>,
        chars: FxHashMap<u32, CharSetting>,
    },
    /// Whole strings rasterized on demand
    Raster(Box<dyn GlyphRasterizer>),
}

pub struct Font {
    name: String,
    /// Size the glyph metrics were authored at
    size: u32,
    line_height: f32,
    pub filter_min: TextureFilter,
    pub filter_mag: TextureFilter,
    kind: FontKind,
}

impl Font {
    pub fn new_atlas(
        name: impl Into<String>,
        size: u32,
        line_height: f32,
        texture: Arc<Texture>,
        chars: FxHashMap<u32, CharSetting>,
    ) -> Self {
        Self {
            name: name.into(),
            size,
            line_height,
            filter_min: TextureFilter::Linear,
            filter_mag: TextureFilter::Linear,
            kind: FontKind::Atlas { texture, chars },
        }
    }

    pub fn new_raster(name: impl Into<String>, size: u32, line_height: f32, rasterizer: Box<dyn GlyphRasterizer>) -> Self {
        Self {
            name: name.into(),
            size,
            line_height,
            filter_min: TextureFilter::Linear,
            filter_mag: TextureFilter::Linear,
            kind: FontKind::Raster(rasterizer),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn line_height(&self) -> f32 {
        self.line_height
    }

    pub fn is_atlas(&self) -> bool {
        matches!(self.kind, FontKind::Atlas { .. })
    }

    pub fn kind(&self) -> &FontKind {
        &self.kind
    }

    /// Atlas texture (atlas fonts only)
    pub fn texture(&self) -> Option<&Arc<Texture>> {
        match &self.kind {
            FontKind::Atlas { texture, .. } => Some(texture),
            FontKind::Raster(_) => None,
        }
    }

    /// Metrics of `code` (atlas fonts only)
    pub fn char_setting(&self, code: u32) -> Option<&CharSetting> {
        match &self.kind {
            FontKind::Atlas { chars, .. } => chars.get(&code),
            FontKind::Raster(_) => None,
        }
    }

    /// Rasterize `text` (raster fonts only)
    pub fn rasterize(&self, text: &str, font_size: u32, anti_alias: bool) -> Option<RasterizedText> {
        match &self.kind {
            FontKind::Raster(rasterizer) => rasterizer.rasterize(text, font_size, anti_alias),
            FontKind::Atlas { .. } => None,
        }
    }
}

impl fmt::Debug for Font {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Font")
            .field("name", &self.name)
            .field("size", &self.size)
            .field("line_height", &self.line_height)
            .field("is_atlas", &self.is_atlas())
            .finish()
    }
}

/// Font file loader collaborator
pub trait FontLoader {
    fn load(&mut self, path: &str) -> Option<Font>;
}

/// Path-keyed font cache
pub struct FontManager {
    loader: Box<dyn FontLoader>,
    fonts: FxHashMap<String, Arc<Font>>,
}

impl FontManager {
    pub fn new(loader: Box<dyn FontLoader>) -> Self {
        Self { loader, fonts: FxHashMap::default() }
    }

    pub fn get_font(&mut self, path: &str) -> Option<Arc<Font>> {
        if let Some(font) = self.fonts.get(path) {
            return Some(font.clone());
        }
        let Some(font) = self.loader.load(path) else {
            crate::engine_warn!("eri::FontManager", "Cannot load font '{}'", path);
            return None;
        };
        let font = Arc::new(font);
        self.fonts.insert(path.to_string(), font.clone());
        Some(font)
    }

    pub fn release_all(&mut self) {
        self.fonts.clear();
    }

    pub fn len(&self) -> usize {
        self.fonts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }
}

#[cfg(test)]
#[path = "font_tests.rs"]
mod tests;
