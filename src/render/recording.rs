//! Backend that keeps textures in memory and records every call.
//!
//! Used by tests and headless tools. Draw lists can be resolved to RGBA
//! pixels with [`RecordingBackend::resolve_pixel`], which applies the same
//! lookup the palette shader performs on the GPU.

use rustc_hash::FxHashMap;

use super::{DrawCmd, IndexedImage, RenderError, TextureBackend, TextureId};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RecordedTexture {
    Indexed(IndexedImage),
    Palette(Vec<u8>),
}

#[derive(Default, Debug)]
pub struct RecordingBackend {
    next_id: u32,
    textures: FxHashMap<TextureId, RecordedTexture>,
    /// Number of indexed textures created over the backend's lifetime.
    pub indexed_uploads: usize,
    /// Number of palette textures created over the backend's lifetime.
    pub palette_uploads: usize,
    /// Every released id, in release order.
    pub released: Vec<TextureId>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn texture(&self, id: TextureId) -> Option<&RecordedTexture> {
        self.textures.get(&id)
    }

    pub fn indexed(&self, id: TextureId) -> Option<&IndexedImage> {
        match self.textures.get(&id) {
            Some(RecordedTexture::Indexed(image)) => Some(image),
            _ => None,
        }
    }

    /// Number of textures currently alive.
    pub fn live_textures(&self) -> usize {
        self.textures.len()
    }

    /// RGBA colour a draw command produces at texture coordinate `(x, y)`.
    pub fn resolve_pixel(&self, cmd: &DrawCmd, x: u32, y: u32) -> Option<[u8; 4]> {
        let image = self.indexed(cmd.texture)?;
        let colors = match self.textures.get(&cmd.palette)? {
            RecordedTexture::Palette(colors) => colors,
            RecordedTexture::Indexed(_) => return None,
        };
        let i = image.index_at(x, y) as usize * 4;
        Some([colors[i], colors[i + 1], colors[i + 2], colors[i + 3]])
    }

    fn allocate(&mut self, texture: RecordedTexture) -> TextureId {
        self.next_id += 1;
        let id = TextureId(self.next_id);
        self.textures.insert(id, texture);
        id
    }
}

impl TextureBackend for RecordingBackend {
    fn create_indexed_texture(&mut self, image: &IndexedImage) -> Result<TextureId, RenderError> {
        self.indexed_uploads += 1;
        Ok(self.allocate(RecordedTexture::Indexed(image.clone())))
    }

    fn create_palette_texture(&mut self, colors: &[u8]) -> Result<TextureId, RenderError> {
        if colors.len() != 256 * 4 {
            return Err(RenderError::Upload(format!(
                "palette texture needs 1024 bytes, got {}",
                colors.len()
            )));
        }
        self.palette_uploads += 1;
        Ok(self.allocate(RecordedTexture::Palette(colors.to_vec())))
    }

    fn release_texture(&mut self, id: TextureId) {
        self.textures.remove(&id);
        self.released.push(id);
    }
}
