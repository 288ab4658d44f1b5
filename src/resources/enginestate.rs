//! High-level engine state.
//!
//! The engine starts in [`EngineMode::Boot`], drawing a boot text over a
//! blank surface while the bootstrap script sets up providers, palettes
//! and the first scene. Scripts switch to [`EngineMode::Game`] once the
//! scene is ready, after which only the node tree is drawn.

use std::fmt;
use std::str::FromStr;

use bevy_ecs::prelude::Resource;

/// Discrete modes the engine can run in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EngineMode {
    #[default]
    Boot,
    Game,
}

impl EngineMode {
    pub fn as_str(self) -> &'static str {
        match self {
            EngineMode::Boot => "boot",
            EngineMode::Game => "game",
        }
    }
}

impl fmt::Display for EngineMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EngineMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "boot" => Ok(EngineMode::Boot),
            "game" => Ok(EngineMode::Game),
            other => Err(format!("unknown engine mode: {other:?}")),
        }
    }
}

/// Authoritative engine state, mutated by processed script commands.
#[derive(Resource, Debug, Clone, PartialEq, Eq, Default)]
pub struct EngineState {
    mode: EngineMode,
    boot_text: String,
    shutdown: bool,
}

impl EngineState {
    pub fn new() -> Self {
        Self {
            boot_text: "Starting...".to_string(),
            ..Self::default()
        }
    }

    pub fn mode(&self) -> EngineMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: EngineMode) {
        self.mode = mode;
    }

    pub fn boot_text(&self) -> &str {
        &self.boot_text
    }

    pub fn set_boot_text(&mut self, text: impl Into<String>) {
        self.boot_text = text.into();
    }

    /// Requests the main loop to stop after the current frame.
    pub fn request_shutdown(&mut self) {
        self.shutdown = true;
    }

    pub fn shutdown_requested(&self) -> bool {
        self.shutdown
    }
}
