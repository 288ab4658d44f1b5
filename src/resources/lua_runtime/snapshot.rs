//! Engine snapshot for Lua reads.
//!
//! Scripts read cursor and mode state from a frozen copy refreshed once
//! per frame, before any callback runs. Reads never touch ECS resources.

use crate::resources::cursor::CursorState;
use crate::resources::enginestate::EngineMode;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineSnapshot {
    /// Cursor in render-surface pixels.
    pub cursor: CursorState,
    pub mode: EngineMode,
}

impl EngineSnapshot {
    pub fn new(cursor: CursorState, mode: EngineMode) -> Self {
        Self { cursor, mode }
    }
}
