//! Named palette registry.
//!
//! Maps a palette identifier (`"act1"`, `"units"`, ...) to a 256-entry RGBA
//! ramp and the GPU lookup texture built from it. Loading only decodes the
//! bytes; the texture is created the first time a node draws with the
//! palette, which is always inside the render pass.

use log::info;
use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::formats::FormatError;
use crate::formats::dat::{DatPalette, PALETTE_SIZE};
use crate::render::{RenderError, TextureBackend, TextureId};
use crate::resources::loader::{Loader, LoaderError};

pub const RAMP_BYTES: usize = PALETTE_SIZE * 4;

#[derive(Debug, Error)]
pub enum PaletteError {
    #[error(transparent)]
    Loader(#[from] LoaderError),
    #[error("invalid palette data: {0}")]
    Format(#[from] FormatError),
}

/// Which ramp entry is made transparent after decoding.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PaletteTransparency {
    /// Zeroes byte 3 of the RGBA ramp, the alpha of entry 0. This is what
    /// the legacy renderer did, so index 0 is the transparent colour.
    #[default]
    Legacy,
    /// Zeroes the alpha of the given entry.
    Index(u8),
    /// Every entry stays fully opaque.
    Opaque,
}

#[derive(Debug, Clone)]
pub struct PaletteEntry {
    colors: Vec<u8>,
    texture: Option<TextureId>,
}

impl PaletteEntry {
    fn new(rgb: &[[u8; 3]; PALETTE_SIZE], transparency: PaletteTransparency) -> Self {
        let mut colors = Vec::with_capacity(RAMP_BYTES);
        for [r, g, b] in rgb {
            colors.extend_from_slice(&[*r, *g, *b, 255]);
        }
        match transparency {
            PaletteTransparency::Legacy => colors[3] = 0,
            PaletteTransparency::Index(i) => colors[i as usize * 4 + 3] = 0,
            PaletteTransparency::Opaque => {}
        }
        Self {
            colors,
            texture: None,
        }
    }

    /// The 1024-byte RGBA ramp.
    pub fn colors(&self) -> &[u8] {
        &self.colors
    }

    pub fn color(&self, index: u8) -> [u8; 4] {
        let i = index as usize * 4;
        [
            self.colors[i],
            self.colors[i + 1],
            self.colors[i + 2],
            self.colors[i + 3],
        ]
    }

    /// Whether the GPU texture has been created.
    pub fn is_initialized(&self) -> bool {
        self.texture.is_some()
    }
}

#[derive(Debug, Default)]
pub struct PaletteRegistry {
    entries: FxHashMap<String, PaletteEntry>,
    transparency: PaletteTransparency,
    /// Textures of replaced entries, released on the next texture request.
    stale: Vec<TextureId>,
}

impl PaletteRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_transparency(transparency: PaletteTransparency) -> Self {
        Self {
            transparency,
            ..Self::default()
        }
    }

    pub fn transparency(&self) -> PaletteTransparency {
        self.transparency
    }

    /// Loads and decodes a DAT palette, registering it under `id`.
    ///
    /// Re-loading an existing id replaces its colours; the old texture is
    /// released the next time any palette texture is requested.
    pub fn load_palette(&mut self, loader: &Loader, id: &str, path: &str) -> Result<(), PaletteError> {
        let bytes = loader.load_bytes(path)?;
        let palette = DatPalette::from_bytes(&bytes)?;
        self.insert_colors(id, &palette.colors);
        info!("Loaded palette '{}' from {}", id, path);
        Ok(())
    }

    /// Registers already-decoded RGB colours under `id`.
    pub fn insert_colors(&mut self, id: &str, rgb: &[[u8; 3]; PALETTE_SIZE]) {
        let entry = PaletteEntry::new(rgb, self.transparency);
        if let Some(old) = self.entries.insert(id.to_string(), entry) {
            self.stale.extend(old.texture);
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<&PaletteEntry> {
        self.entries.get(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the lookup texture for `id`, creating it on first use.
    pub fn texture(
        &mut self,
        id: &str,
        backend: &mut dyn TextureBackend,
    ) -> Result<TextureId, RenderError> {
        for stale in self.stale.drain(..) {
            backend.release_texture(stale);
        }
        let entry = self
            .entries
            .get_mut(id)
            .ok_or_else(|| RenderError::MissingPalette(id.to_string()))?;
        if let Some(texture) = entry.texture {
            return Ok(texture);
        }
        let texture = backend.create_palette_texture(&entry.colors)?;
        entry.texture = Some(texture);
        Ok(texture)
    }

    /// Releases every GPU texture. Entries keep their colours and will
    /// create new textures on next use.
    pub fn release_all(&mut self, backend: &mut dyn TextureBackend) {
        for stale in self.stale.drain(..) {
            backend.release_texture(stale);
        }
        for entry in self.entries.values_mut() {
            if let Some(texture) = entry.texture.take() {
                backend.release_texture(texture);
            }
        }
    }
}
