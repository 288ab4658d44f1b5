//! Renderer seam.
//!
//! The scene never talks to the graphics API directly. Node updates create
//! and release textures through a [`TextureBackend`], and rendering emits a
//! [`DrawList`] that the backend executes afterwards. This keeps every GPU
//! call inside the frame's update and render passes and lets tests run the
//! whole scene against [`RecordingBackend`].
//!
//! - [`raylib_backend`] – the raylib implementation with the palette shader
//! - [`recording`] – an in-memory backend that records every call

pub mod raylib_backend;
pub mod recording;

use thiserror::Error;

pub use raylib_backend::RaylibBackend;
pub use recording::RecordingBackend;

/// Opaque handle to a texture owned by a backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureId(pub u32);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    #[error("texture upload failed: {0}")]
    Upload(String),
    #[error("palette {0:?} is not loaded")]
    MissingPalette(String),
}

/// An 8-bit palette-indexed image, row-major.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IndexedImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl IndexedImage {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize],
        }
    }

    pub fn index_at(&self, x: u32, y: u32) -> u8 {
        if x >= self.width || y >= self.height {
            return 0;
        }
        self.pixels[(x + y * self.width) as usize]
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Texture lifecycle operations needed by the scene.
pub trait TextureBackend {
    /// Uploads an indexed image as a single-channel texture.
    fn create_indexed_texture(&mut self, image: &IndexedImage) -> Result<TextureId, RenderError>;
    /// Uploads a 256x1 RGBA lookup texture (`colors` holds 1024 bytes).
    fn create_palette_texture(&mut self, colors: &[u8]) -> Result<TextureId, RenderError>;
    fn release_texture(&mut self, id: TextureId);
}

/// Draws an indexed texture through the palette lookup shader.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DrawCmd {
    pub texture: TextureId,
    pub palette: TextureId,
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

/// Draw commands for one frame, in painter's order.
#[derive(Clone, Debug, Default)]
pub struct DrawList {
    commands: Vec<DrawCmd>,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, cmd: DrawCmd) {
        self.commands.push(cmd);
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    pub fn commands(&self) -> &[DrawCmd] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
