//! Resource management module
//!
//! Texture and font caches. Decoding and glyph generation are supplied by
//! the application through the reader/loader traits.

pub mod texture;
pub mod font;

pub use texture::{Texture, TextureId, TextureImage, TextureManager, TextureReader};
pub use font::{
    CharSetting, Font, FontKind, FontLoader, FontManager,
    GlyphRasterizer, RasterizedText,
};
