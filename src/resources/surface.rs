//! Fixed-resolution render surface.
//!
//! The scene is drawn into an off-screen texture at the configured render
//! size (800x600 by default) and then scaled into the window, keeping the
//! aspect ratio and centring it with black bars. Cursor positions are
//! mapped back through the same transform so hit-testing works in surface
//! pixels.

use bevy_ecs::prelude::Resource;
use raylib::ffi::{self, TextureFilter};
use raylib::prelude::*;

/// Current window size in pixels. Updated every frame.
#[derive(Resource, Clone, Copy, Debug, PartialEq, Eq)]
pub struct WindowSize {
    pub w: i32,
    pub h: i32,
}

impl WindowSize {
    /// Destination rectangle of a `width` x `height` surface scaled into
    /// the window.
    pub fn letterbox(&self, width: u32, height: u32) -> Rectangle {
        let surface_w = width as f32;
        let surface_h = height as f32;
        let window_w = self.w as f32;
        let window_h = self.h as f32;

        if window_w / window_h > surface_w / surface_h {
            // Wider window: bars left and right.
            let scaled_w = surface_w * window_h / surface_h;
            Rectangle {
                x: (window_w - scaled_w) / 2.0,
                y: 0.0,
                width: scaled_w,
                height: window_h,
            }
        } else {
            let scaled_h = surface_h * window_w / surface_w;
            Rectangle {
                x: 0.0,
                y: (window_h - scaled_h) / 2.0,
                width: window_w,
                height: scaled_h,
            }
        }
    }

    /// Maps a window position into surface pixels. Positions over the bars
    /// fall outside `0..width` / `0..height`.
    pub fn window_to_surface(&self, x: f32, y: f32, width: u32, height: u32) -> (i32, i32) {
        let dest = self.letterbox(width, height);
        if dest.width <= 0.0 || dest.height <= 0.0 {
            return (-1, -1);
        }
        let sx = (x - dest.x) * width as f32 / dest.width;
        let sy = (y - dest.y) * height as f32 / dest.height;
        (sx.floor() as i32, sy.floor() as i32)
    }
}

/// Off-screen texture the scene renders into.
///
/// NonSend: the texture is a GPU resource owned by the main thread.
pub struct RenderSurface {
    pub texture: RenderTexture2D,
    pub width: u32,
    pub height: u32,
}

impl RenderSurface {
    /// Creates the surface with nearest-neighbour scaling, which keeps
    /// palette-indexed art crisp.
    pub fn new(
        rl: &mut RaylibHandle,
        th: &RaylibThread,
        width: u32,
        height: u32,
    ) -> Result<Self, String> {
        let texture = rl
            .load_render_texture(th, width, height)
            .map_err(|e| format!("Failed to create render texture: {}", e))?;
        unsafe {
            ffi::SetTextureFilter(
                texture.texture,
                TextureFilter::TEXTURE_FILTER_POINT as i32,
            );
        }
        Ok(Self {
            texture,
            width,
            height,
        })
    }

    /// Source rectangle with a negative height, flipping the render
    /// texture's Y axis for drawing.
    pub fn source_rect(&self) -> Rectangle {
        Rectangle {
            x: 0.0,
            y: 0.0,
            width: self.width as f32,
            height: -(self.height as f32),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_letterbox_same_aspect_fills_window() {
        let window = WindowSize { w: 1600, h: 1200 };
        let dest = window.letterbox(800, 600);
        assert_eq!((dest.x, dest.y, dest.width, dest.height), (0.0, 0.0, 1600.0, 1200.0));
    }

    #[test]
    fn test_letterbox_wide_window_pillarboxes() {
        let window = WindowSize { w: 1000, h: 600 };
        let dest = window.letterbox(800, 600);
        assert_eq!((dest.x, dest.width), (100.0, 800.0));
    }

    #[test]
    fn test_letterbox_tall_window_adds_bars_top_and_bottom() {
        let window = WindowSize { w: 800, h: 800 };
        let dest = window.letterbox(800, 600);
        assert_eq!((dest.y, dest.height), (100.0, 600.0));
    }

    #[test]
    fn test_window_to_surface() {
        let window = WindowSize { w: 1600, h: 1200 };
        assert_eq!(window.window_to_surface(10.0, 20.0, 800, 600), (5, 10));

        let window = WindowSize { w: 1000, h: 600 };
        assert_eq!(window.window_to_surface(100.0, 0.0, 800, 600), (0, 0));
        assert_eq!(window.window_to_surface(50.0, 0.0, 800, 600).0, -50);
    }
}
