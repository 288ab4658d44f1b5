//! Bitmap-font text.
//!
//! A font is loaded as `<path>.tbl` (glyph metrics) plus `<path>.dc6`
//! (one frame per glyph). Setting a caption lays the glyphs out on one
//! line and composes them into a single indexed texture, drawn through
//! the same palette path as sprites.

use log::warn;

use crate::formats::dc6::Dc6;
use crate::formats::tbl::FontTable;
use crate::render::{DrawCmd, IndexedImage, TextureId};
use crate::resources::loader::Loader;
use crate::resources::palette::PaletteRegistry;

use super::sequence::{Dc6Sequences, SequenceProvider};
use super::{ComposedTexture, NodeId, RenderContext, SpriteError, UpdateContext};

#[derive(Debug)]
pub struct Label {
    font: FontTable,
    glyphs: Dc6Sequences,
    palette: String,
    caption: String,
    initialized: bool,
    texture: Option<ComposedTexture>,
}

impl Label {
    pub fn new(
        font: FontTable,
        glyphs: Dc6Sequences,
        palette: &str,
        palettes: &PaletteRegistry,
    ) -> Result<Self, SpriteError> {
        if !palettes.contains(palette) {
            return Err(SpriteError::UnknownPalette(palette.to_string()));
        }
        Ok(Self {
            font,
            glyphs,
            palette: palette.to_string(),
            caption: String::new(),
            initialized: false,
            texture: None,
        })
    }

    /// Loads `<font_path>.tbl` and `<font_path>.dc6`.
    pub fn load(
        loader: &Loader,
        font_path: &str,
        palette: &str,
        palettes: &PaletteRegistry,
    ) -> Result<Self, SpriteError> {
        if !palettes.contains(palette) {
            return Err(SpriteError::UnknownPalette(palette.to_string()));
        }
        let table = FontTable::from_bytes(&loader.load_bytes(&format!("{font_path}.tbl"))?)?;
        let sheet = Dc6::from_bytes(&loader.load_bytes(&format!("{font_path}.dc6"))?)?;
        Self::new(table, sheet.into(), palette, palettes)
    }

    pub fn caption(&self) -> &str {
        &self.caption
    }

    pub fn palette(&self) -> &str {
        &self.palette
    }

    pub fn texture(&self) -> Option<ComposedTexture> {
        self.texture
    }

    /// Replaces the text. The texture is rebuilt on the next update.
    pub fn set_caption(&mut self, caption: &str) {
        if self.caption != caption {
            self.caption = caption.to_string();
            self.initialized = false;
        }
    }

    /// Lays the caption out left to right. Characters missing from the
    /// font are skipped.
    pub fn compose(&self) -> IndexedImage {
        let glyphs: Vec<_> = self
            .caption
            .chars()
            .filter_map(|c| self.font.glyph(c))
            .collect();
        let width: u32 = glyphs.iter().map(|g| u32::from(g.width)).sum();
        let height = glyphs
            .iter()
            .map(|g| self.glyphs.frame_height(0, g.frame as usize))
            .max()
            .unwrap_or(0);

        let mut image = IndexedImage::new(width, height);
        let mut origin_x = 0u32;
        for glyph in glyphs {
            let frame = glyph.frame as usize;
            let frame_width = self.glyphs.frame_width(0, frame).min(u32::from(glyph.width));
            let frame_height = self.glyphs.frame_height(0, frame);
            for y in 0..frame_height {
                for x in 0..frame_width {
                    let index = (origin_x + x + y * width) as usize;
                    image.pixels[index] = self.glyphs.color_index_at(0, frame, x, y);
                }
            }
            origin_x += u32::from(glyph.width);
        }
        image
    }

    pub(crate) fn teardown(&mut self) -> Option<TextureId> {
        self.initialized = false;
        self.texture.take().map(|t| t.id)
    }

    pub(crate) fn update(&mut self, id: NodeId, ctx: &mut UpdateContext<'_>) {
        if self.initialized {
            return;
        }
        self.initialized = true;
        if let Some(old) = self.texture.take() {
            ctx.backend.release_texture(old.id);
        }
        let image = self.compose();
        if image.is_empty() {
            return;
        }
        match ctx.backend.create_indexed_texture(&image) {
            Ok(texture) => {
                self.texture = Some(ComposedTexture {
                    id: texture,
                    width: image.width,
                    height: image.height,
                })
            }
            Err(e) => {
                warn!("Label {} failed to upload its texture: {}", id, e);
                ctx.errors.push((id, e));
            }
        }
    }

    pub(crate) fn render(
        &self,
        x: i32,
        y: i32,
        palettes: &mut PaletteRegistry,
        ctx: &mut RenderContext<'_>,
    ) {
        let Some(texture) = self.texture else {
            return;
        };
        match palettes.texture(&self.palette, ctx.backend) {
            Ok(palette) => ctx.draw_list.push(DrawCmd {
                texture: texture.id,
                palette,
                x,
                y,
                width: texture.width,
                height: texture.height,
            }),
            Err(e) => ctx.errors.push(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::dc6::{Dc6Direction, Dc6Frame};
    use crate::render::RecordingBackend;
    use crate::resources::cursor::CursorState;

    fn font_bytes() -> Vec<u8> {
        let mut data = b"Woo!\x01".to_vec();
        data.extend_from_slice(&[0; 7]);
        for (code, width, frame) in [(b'A' as u16, 3u8, 0u16), (b'B' as u16, 2, 1)] {
            data.extend_from_slice(&code.to_le_bytes());
            data.push(0);
            data.push(width);
            data.push(4);
            data.extend_from_slice(&[0; 3]);
            data.extend_from_slice(&frame.to_le_bytes());
            data.extend_from_slice(&[0; 4]);
        }
        data
    }

    fn label() -> Label {
        let sheet = Dc6Sequences::new(vec![Dc6Direction {
            frames: vec![
                Dc6Frame {
                    width: 3,
                    height: 4,
                    pixels: vec![1; 12],
                    ..Default::default()
                },
                Dc6Frame {
                    width: 2,
                    height: 2,
                    pixels: vec![2; 4],
                    ..Default::default()
                },
            ],
        }]);
        let mut palettes = PaletteRegistry::new();
        palettes.insert_colors("static", &[[0; 3]; 256]);
        let font = FontTable::from_bytes(&font_bytes()).unwrap();
        Label::new(font, sheet, "static", &palettes).unwrap()
    }

    #[test]
    fn test_compose_lays_glyphs_left_to_right() {
        let mut label = label();
        label.set_caption("BA?B");
        let image = label.compose();
        assert_eq!((image.width, image.height), (7, 4));
        assert_eq!(image.index_at(0, 0), 2);
        assert_eq!(image.index_at(0, 3), 0);
        assert_eq!(image.index_at(2, 3), 1);
        assert_eq!(image.index_at(5, 1), 2);
    }

    #[test]
    fn test_empty_caption_has_no_texture() {
        let mut label = label();
        let mut backend = RecordingBackend::new();
        label.update(NodeId::next(), &mut UpdateContext::new(&mut backend, CursorState::default()));
        assert!(label.texture().is_none());
        assert_eq!(backend.indexed_uploads, 0);
    }

    #[test]
    fn test_caption_change_rebuilds_texture() {
        let mut label = label();
        let mut backend = RecordingBackend::new();
        let id = NodeId::next();
        label.set_caption("A");
        label.update(id, &mut UpdateContext::new(&mut backend, CursorState::default()));
        let first = label.texture().unwrap();

        label.set_caption("A");
        label.update(id, &mut UpdateContext::new(&mut backend, CursorState::default()));
        assert_eq!(backend.indexed_uploads, 1);

        label.set_caption("AB");
        label.update(id, &mut UpdateContext::new(&mut backend, CursorState::default()));
        assert_eq!(backend.released, vec![first.id]);
        assert_eq!(label.texture().unwrap().width, 5);
    }
}
