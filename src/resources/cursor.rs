//! Cursor state in render-surface coordinates.

use bevy_ecs::prelude::*;

/// Cursor position and primary button state for the current frame.
///
/// Coordinates are in render-surface pixels (the fixed internal resolution),
/// not window pixels, so hit-testing matches what is drawn.
#[derive(Resource, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CursorState {
    pub x: i32,
    pub y: i32,
    pub button_down: bool,
}

impl CursorState {
    pub fn new(x: i32, y: i32, button_down: bool) -> Self {
        Self { x, y, button_down }
    }
}
