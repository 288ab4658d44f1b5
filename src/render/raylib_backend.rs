//! raylib texture backend and palette lookup shader.
//!
//! Indexed textures are uploaded as single-channel grayscale images, so the
//! red channel sampled in the shader is `index / 255`. The palette is a
//! 256x1 RGBA texture bound to the `palette` uniform for every draw.
//!
//! Texture requests come from the scene passes, which have no raylib
//! handle. They are queued with their id and uploaded by [`RaylibBackend::flush`]
//! before the frame is drawn.
//!
//! This is a NonSend resource: textures and the shader belong to the OpenGL
//! context of the main thread.

use raylib::ffi;
use raylib::prelude::*;
use rustc_hash::FxHashMap;

use super::{DrawList, IndexedImage, RenderError, TextureBackend, TextureId};

const PALETTE_FRAGMENT_SHADER: &str = r#"#version 330
in vec2 fragTexCoord;
in vec4 fragColor;
uniform sampler2D texture0;
uniform sampler2D palette;
out vec4 finalColor;
void main()
{
    float index = texture(texture0, fragTexCoord).r;
    vec4 color = texture(palette, vec2((index * 255.0 + 0.5) / 256.0, 0.5));
    finalColor = color * fragColor;
}
"#;

/// Pixels waiting for the next [`RaylibBackend::flush`].
pub(crate) struct PendingUpload {
    pub pixels: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub format: ffi::PixelFormat,
}

/// Hands out texture ids and holds their pixels until the GPU copy exists.
#[derive(Default)]
pub(crate) struct UploadQueue {
    pending: Vec<(TextureId, PendingUpload)>,
    next_id: u32,
}

impl UploadQueue {
    pub fn push(&mut self, upload: PendingUpload) -> Result<TextureId, RenderError> {
        let PendingUpload {
            pixels,
            width,
            height,
            format,
        } = &upload;
        if *width == 0 || *height == 0 {
            return Err(RenderError::Upload(format!("empty {width}x{height} image")));
        }
        let bytes_per_pixel = match format {
            ffi::PixelFormat::PIXELFORMAT_UNCOMPRESSED_GRAYSCALE => 1,
            _ => 4,
        };
        let expected = (*width as usize)
            .checked_mul(*height as usize)
            .and_then(|n| n.checked_mul(bytes_per_pixel));
        if expected != Some(pixels.len()) {
            return Err(RenderError::Upload(format!(
                "{width}x{height} image has {} bytes",
                pixels.len()
            )));
        }
        self.next_id += 1;
        let id = TextureId(self.next_id);
        self.pending.push((id, upload));
        Ok(id)
    }

    /// Drops a texture that was released before it reached the GPU.
    pub fn cancel(&mut self, id: TextureId) -> bool {
        let before = self.pending.len();
        self.pending.retain(|(pending, _)| *pending != id);
        self.pending.len() != before
    }

    pub fn take(&mut self) -> Vec<(TextureId, PendingUpload)> {
        std::mem::take(&mut self.pending)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }
}

pub struct RaylibBackend {
    shader: Shader,
    palette_location: i32,
    textures: FxHashMap<TextureId, Texture2D>,
    queue: UploadQueue,
}

impl RaylibBackend {
    /// Compiles the palette shader. Requires an open window.
    pub fn new(rl: &mut RaylibHandle, thread: &RaylibThread) -> Result<Self, RenderError> {
        let shader = rl.load_shader_from_memory(thread, None, Some(PALETTE_FRAGMENT_SHADER));
        let palette_location = shader.get_shader_location("palette");
        if palette_location < 0 {
            return Err(RenderError::Upload(
                "palette shader has no `palette` uniform".into(),
            ));
        }
        Ok(Self {
            shader,
            palette_location,
            textures: FxHashMap::default(),
            queue: UploadQueue::default(),
        })
    }

    /// Uploads every queued image. Failures are returned and their ids stay
    /// unbound, so draws that use them are skipped.
    pub fn flush(&mut self, rl: &mut RaylibHandle, thread: &RaylibThread) -> Vec<RenderError> {
        let mut errors = Vec::new();
        for (id, upload) in self.queue.take() {
            let mut image =
                Image::gen_image_color(upload.width as i32, upload.height as i32, Color::BLANK);
            image.set_format(upload.format);
            match rl.load_texture_from_image(thread, &image) {
                Ok(mut texture) => {
                    // Sizes were checked when the upload was queued.
                    let _ = texture.update_texture(&upload.pixels);
                    self.textures.insert(id, texture);
                }
                Err(e) => errors.push(RenderError::Upload(format!(
                    "raylib rejected {}x{} texture: {e}",
                    upload.width, upload.height
                ))),
            }
        }
        errors
    }

    /// Executes a draw list. Must be called inside a drawing scope, which the
    /// draw handle argument enforces.
    pub fn draw<D: RaylibDraw>(&mut self, canvas: &mut D, list: &DrawList) {
        let raw_shader = *self.shader;
        for cmd in list.commands() {
            let (Some(texture), Some(palette)) = (
                self.textures.get(&cmd.texture),
                self.textures.get(&cmd.palette),
            ) else {
                continue;
            };
            let mut mode = canvas.begin_shader_mode(&mut self.shader);
            // Entering shader mode flushes the batch and its sampler slots,
            // so the palette is bound after it while the mode holds the shader.
            unsafe {
                ffi::SetShaderValueTexture(raw_shader, self.palette_location, **palette);
            }
            mode.draw_texture(texture, cmd.x, cmd.y, Color::WHITE);
        }
    }

    pub fn texture_count(&self) -> usize {
        self.textures.len() + self.queue.len()
    }
}

impl TextureBackend for RaylibBackend {
    fn create_indexed_texture(&mut self, image: &IndexedImage) -> Result<TextureId, RenderError> {
        self.queue.push(PendingUpload {
            pixels: image.pixels.clone(),
            width: image.width,
            height: image.height,
            format: ffi::PixelFormat::PIXELFORMAT_UNCOMPRESSED_GRAYSCALE,
        })
    }

    fn create_palette_texture(&mut self, colors: &[u8]) -> Result<TextureId, RenderError> {
        if colors.len() != 256 * 4 {
            return Err(RenderError::Upload(format!(
                "palette texture needs 1024 bytes, got {}",
                colors.len()
            )));
        }
        self.queue.push(PendingUpload {
            pixels: colors.to_vec(),
            width: 256,
            height: 1,
            format: ffi::PixelFormat::PIXELFORMAT_UNCOMPRESSED_R8G8B8A8,
        })
    }

    fn release_texture(&mut self, id: TextureId) {
        if !self.queue.cancel(id) {
            // Dropping the Texture2D unloads it.
            self.textures.remove(&id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gray(width: u32, height: u32, len: usize) -> PendingUpload {
        PendingUpload {
            pixels: vec![0; len],
            width,
            height,
            format: ffi::PixelFormat::PIXELFORMAT_UNCOMPRESSED_GRAYSCALE,
        }
    }

    #[test]
    fn test_queue_assigns_ids_in_order() {
        let mut queue = UploadQueue::default();
        let a = queue.push(gray(2, 2, 4)).unwrap();
        let b = queue.push(gray(1, 1, 1)).unwrap();
        assert_ne!(a, b);
        let ids: Vec<TextureId> = queue.take().into_iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![a, b]);
        assert_eq!(queue.len(), 0);
    }

    #[test]
    fn test_queue_rejects_mismatched_sizes() {
        let mut queue = UploadQueue::default();
        assert!(queue.push(gray(0, 4, 0)).is_err());
        assert!(queue.push(gray(2, 2, 3)).is_err());
        let rgba = PendingUpload {
            pixels: vec![0; 256],
            width: 256,
            height: 1,
            format: ffi::PixelFormat::PIXELFORMAT_UNCOMPRESSED_R8G8B8A8,
        };
        assert!(queue.push(rgba).is_err());
        assert_eq!(queue.len(), 0);
    }

    #[test]
    fn test_release_before_flush_cancels_upload() {
        let mut queue = UploadQueue::default();
        let id = queue.push(gray(1, 1, 1)).unwrap();
        assert!(queue.cancel(id));
        assert!(!queue.cancel(id));
        assert!(queue.take().is_empty());
    }
}
