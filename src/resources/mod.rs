//! Long-lived engine state.
//!
//! This module groups the data injected into the ECS world and accessed by
//! systems during execution, plus the objects scripts reach through the Lua
//! host. Each submodule documents the semantics and intended usage of its
//! resource(s).
//!
//! Overview
//! - `cursor` – cursor position and button in render-surface pixels
//! - `enginestate` – boot/game mode, boot text and shutdown request
//! - `gameconfig` – settings loaded from `config.ini`
//! - `loader` – virtual file system over ordered resource providers
//! - `lua_runtime` – the Lua interpreter and the `engine` API
//! - `palette` – named 256 color palettes and their textures
//! - `shared` – handles to state shared by systems and scripts
//! - `surface` – window size and the fixed-size render surface
pub mod cursor;
pub mod enginestate;
pub mod gameconfig;
pub mod loader;
pub mod lua_runtime;
pub mod palette;
pub mod shared;
pub mod surface;
