/// Texture handles and the path-keyed texture cache.
///
/// Decoding is done by an external [`TextureReader`]; the manager uploads
/// the decoded image through the renderer and hands out shared
/// `Arc<Texture>` handles. Requesting the same path twice returns the same
/// handle.

use std::sync::Arc;
use rustc_hash::FxHashMap;
use crate::math::Color;
use crate::renderer::{FrameBufferId, Renderer};

/// Renderer texture name; `TextureId(0)` means "no texture"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct TextureId(pub u32);

/// Decoded RGBA8 image
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextureImage {
    pub width: u32,
    pub height: u32,
    /// Tightly packed RGBA8, row 0 first
    pub pixels: Vec<u8>,
    pub alpha_premultiplied: bool,
}

/// Uploaded texture
#[derive(Debug)]
pub struct Texture {
    id: TextureId,
    width: u32,
    height: u32,
    alpha_premultiplied: bool,
    pixels: Option<Vec<u8>>,
}

impl Texture {
    pub fn new(id: TextureId, width: u32, height: u32, alpha_premultiplied: bool) -> Self {
        Self { id, width, height, alpha_premultiplied, pixels: None }
    }

    /// Upload `image` through `renderer`, keeping a CPU copy if asked
    pub fn from_image(image: &TextureImage, renderer: &mut dyn Renderer, keep_pixels: bool) -> Option<Self> {
        let id = renderer.create_texture(image)?;
        Some(Self {
            id,
            width: image.width,
            height: image.height,
            alpha_premultiplied: image.alpha_premultiplied,
            pixels: keep_pixels.then(|| image.pixels.clone()),
        })
    }

    pub fn id(&self) -> TextureId {
        self.id
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn alpha_premultiplied(&self) -> bool {
        self.alpha_premultiplied
    }

    /// Color of pixel (x, y) if the CPU copy was kept
    pub fn pixel_color(&self, x: u32, y: u32) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let pixels = self.pixels.as_ref()?;
        let at = ((y * self.width + x) * 4) as usize;
        let px = pixels.get(at..at + 4)?;
        Some(Color::new(
            px[0] as f32 / 255.0,
            px[1] as f32 / 255.0,
            px[2] as f32 / 255.0,
            px[3] as f32 / 255.0,
        ))
    }
}

/// Image decoder collaborator
pub trait TextureReader {
    /// Decode the image at `path`; `None` when missing or unreadable
    fn read(&mut self, path: &str) -> Option<TextureImage>;
}

/// Path-keyed texture cache
pub struct TextureManager {
    reader: Box<dyn TextureReader>,
    textures: FxHashMap<String, Arc<Texture>>,
    render_to_texture_serial: u32,
    keep_pixels: bool,
}

impl TextureManager {
    pub fn new(reader: Box<dyn TextureReader>) -> Self {
        Self {
            reader,
            textures: FxHashMap::default(),
            render_to_texture_serial: 0,
            keep_pixels: false,
        }
    }

    /// Keep CPU pixel copies of textures loaded from now on
    pub fn set_keep_pixels(&mut self, keep: bool) {
        self.keep_pixels = keep;
    }

    /// Cached texture for `path`, loading it on first request
    pub fn get_texture(&mut self, path: &str, renderer: &mut dyn Renderer) -> Option<Arc<Texture>> {
        if let Some(texture) = self.textures.get(path) {
            return Some(texture.clone());
        }

        let Some(image) = self.reader.read(path) else {
            crate::engine_warn!("eri::TextureManager", "Cannot read texture '{}'", path);
            return None;
        };
        let Some(texture) = Texture::from_image(&image, renderer, self.keep_pixels) else {
            crate::engine_warn!("eri::TextureManager", "Renderer refused texture '{}'", path);
            return None;
        };

        crate::engine_debug!(
            "eri::TextureManager",
            "Loaded '{}' ({}x{}, id {})",
            path, texture.width(), texture.height(), texture.id().0
        );
        let texture = Arc::new(texture);
        self.textures.insert(path.to_string(), texture.clone());
        Some(texture)
    }

    /// Create an empty render target texture, cached under a serial key
    pub fn generate_render_to_texture(
        &mut self,
        width: u32,
        height: u32,
        renderer: &mut dyn Renderer,
    ) -> Option<(Arc<Texture>, FrameBufferId)> {
        let (id, frame_buffer) = renderer.generate_render_to_texture(width, height)?;
        let texture = Arc::new(Texture::new(id, width, height, false));

        let key = format!("{}_render2tex", self.render_to_texture_serial);
        self.render_to_texture_serial += 1;
        self.textures.insert(key, texture.clone());
        Some((texture, frame_buffer))
    }

    /// Drop the cache entry of `texture` and release it in the renderer
    pub fn release_texture(&mut self, texture: &Texture, renderer: &mut dyn Renderer) {
        let id = texture.id();
        let before = self.textures.len();
        self.textures.retain(|_, cached| cached.id() != id);
        if self.textures.len() == before {
            crate::engine_warn!("eri::TextureManager", "Releasing unknown texture id {}", id.0);
        }
        renderer.release_texture(id);
    }

    /// Release every cached texture
    pub fn release_all(&mut self, renderer: &mut dyn Renderer) {
        for (_, texture) in self.textures.drain() {
            renderer.release_texture(texture.id());
        }
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }
}

#[cfg(test)]
#[path = "texture_tests.rs"]
mod tests;
