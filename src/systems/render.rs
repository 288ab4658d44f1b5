//! Rendering.
//!
//! [`render_system`] draws one frame in two steps: the scene (or the boot
//! text) goes into the fixed-size [`RenderSurface`], then the surface is
//! scaled into the window with [`WindowSize::letterbox`]. Textures created
//! by the scene passes are uploaded in between.

use bevy_ecs::prelude::*;
use log::warn;
use raylib::prelude::*;

use crate::render::{DrawList, RaylibBackend};
use crate::resources::enginestate::{EngineMode, EngineState};
use crate::resources::shared::{SharedPalettes, SharedScene};
use crate::resources::surface::{RenderSurface, WindowSize};
use crate::scene::RenderContext;

const BOOT_TEXT_SIZE: i32 = 20;

#[allow(clippy::too_many_arguments)]
pub fn render_system(
    mut rl: NonSendMut<RaylibHandle>,
    th: NonSend<RaylibThread>,
    mut surface: NonSendMut<RenderSurface>,
    mut backend: NonSendMut<RaylibBackend>,
    scene: NonSend<SharedScene>,
    palettes: NonSend<SharedPalettes>,
    state: Res<EngineState>,
    window: Res<WindowSize>,
    mut draw_list: Local<DrawList>,
) {
    draw_list.clear();
    if state.mode() == EngineMode::Game {
        match (scene.0.try_borrow(), palettes.0.try_borrow_mut()) {
            (Ok(tree), Ok(mut palettes)) => {
                let mut ctx = RenderContext::new(&mut *backend, &mut draw_list);
                tree.render(&mut palettes, &mut ctx);
                for err in &ctx.errors {
                    warn!("Render failed: {}", err);
                }
            }
            _ => warn!("Scene or palettes are borrowed; skipping scene render"),
        }
    }

    for err in backend.flush(&mut rl, &th) {
        warn!("Texture upload failed: {}", err);
    }

    let dest = window.letterbox(surface.width, surface.height);
    let source = surface.source_rect();
    let (surface_w, surface_h) = (surface.width as i32, surface.height as i32);

    let mut d = rl.begin_drawing(&th);
    {
        let mut target = d.begin_texture_mode(&th, &mut surface.texture);
        target.clear_background(Color::BLACK);
        match state.mode() {
            EngineMode::Boot => {
                let text = state.boot_text();
                let width = measure_text(text, BOOT_TEXT_SIZE);
                target.draw_text(
                    text,
                    (surface_w - width) / 2,
                    (surface_h - BOOT_TEXT_SIZE) / 2,
                    BOOT_TEXT_SIZE,
                    Color::WHITE,
                );
            }
            EngineMode::Game => backend.draw(&mut target, &draw_list),
        }
    }

    d.clear_background(Color::BLACK);
    d.draw_texture_pro(
        &surface.texture,
        source,
        dest,
        Vector2 { x: 0.0, y: 0.0 },
        0.0,
        Color::WHITE,
    );
}
