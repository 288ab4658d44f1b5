//! Cursor input.
//!
//! [`update_cursor_state`] reads the mouse from raylib and stores it in
//! [`CursorState`] in render-surface pixels, so everything downstream
//! (hit-testing, scripts) works in the coordinates the scene is drawn in.

use bevy_ecs::prelude::*;
use raylib::prelude::MouseButton;

use crate::resources::cursor::CursorState;
use crate::resources::surface::{RenderSurface, WindowSize};

/// Poll raylib for the mouse and update the `CursorState` resource.
pub fn update_cursor_state(
    mut cursor: ResMut<CursorState>,
    window: Res<WindowSize>,
    surface: NonSend<RenderSurface>,
    rl: NonSend<raylib::RaylibHandle>,
) {
    let mouse = rl.get_mouse_position();
    let (x, y) = window.window_to_surface(mouse.x, mouse.y, surface.width, surface.height);
    *cursor = CursorState::new(
        x,
        y,
        rl.is_mouse_button_down(MouseButton::MOUSE_BUTTON_LEFT),
    );
}
