//! Lua scripting runtime for the Abyss engine.
//!
//! This module provides the Lua integration layer, exposing the resource
//! loader, palettes and scene tree through the global `engine` table in Lua
//! scripts.
//!
//! # Architecture
//!
//! The module is split into focused submodules:
//!
//! - [`commands`] - Command enums for Lua-Rust communication
//! - [`snapshot`] - Read-only engine state cached for scripts
//! - [`userdata`] - `Node`, `Sprite` and `Label` handles
//! - [`runtime`] - Core Lua runtime implementation and `engine` table API
//! - `meta` - API descriptions published as `engine.__meta`
//!
//! # Example
//!
//! ```lua
//! -- From a Lua script
//! engine.log("Hello from Lua!")
//! engine.add_loader_provider("filesystem", "data")
//! engine.load_palette("act1", "/data/global/palette/act1/pal.dat")
//!
//! local logo = engine.load_sprite("/data/global/ui/frontend/d2logoblackleft.dc6", "act1")
//! logo:set_position(400, 120)
//! logo:on_mouse_button_down(function(sprite)
//!     engine.log("clicked " .. sprite:id())
//! end)
//! engine.get_root_node():append_child(logo)
//! engine.exit_boot_mode()
//! ```

pub mod commands;
mod meta;
pub mod runtime;
pub mod snapshot;
pub mod userdata;

pub use commands::EngineCmd;
pub use runtime::LuaRuntime;
pub use snapshot::EngineSnapshot;
pub use userdata::{LuaLabel, LuaNode, LuaSprite, NodeHandle};
