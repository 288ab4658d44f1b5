//! Command enums for Lua-Rust communication.
//!
//! Scripts change engine-level state by queueing commands; a system
//! applies them once the script call returns. Scene, palette and loader
//! operations do not go through here; they act on the shared objects
//! directly.

use crate::resources::enginestate::EngineMode;

/// Engine-level commands queued by scripts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCmd {
    /// Replace the text shown while in boot mode
    SetBootText { text: String },
    /// Switch between boot and game mode
    SetEngineMode { mode: EngineMode },
    /// Stop the main loop after the current frame
    Shutdown,
}
