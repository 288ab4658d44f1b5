//! Engine state systems.
//!
//! - [`update_lua_snapshot`] refreshes what scripts read through
//!   `engine.get_mouse_position`, `engine.is_mouse_down` and
//!   `engine.get_engine_mode`.
//! - [`process_engine_commands`] applies the commands scripts queued with
//!   `engine.set_boot_text`, `engine.set_engine_mode`,
//!   `engine.exit_boot_mode` and `engine.shutdown`.

use bevy_ecs::prelude::*;
use log::info;

use crate::resources::cursor::CursorState;
use crate::resources::enginestate::EngineState;
use crate::resources::lua_runtime::{EngineCmd, EngineSnapshot, LuaRuntime};

pub fn update_lua_snapshot(
    lua_runtime: NonSend<LuaRuntime>,
    cursor: Res<CursorState>,
    state: Res<EngineState>,
) {
    lua_runtime.update_snapshot(EngineSnapshot::new(*cursor, state.mode()));
}

pub fn process_engine_commands(lua_runtime: NonSend<LuaRuntime>, mut state: ResMut<EngineState>) {
    for cmd in lua_runtime.drain_engine_commands() {
        apply_engine_command(&mut state, cmd);
    }
}

/// Applies one queued command to the engine state.
pub fn apply_engine_command(state: &mut EngineState, cmd: EngineCmd) {
    match cmd {
        EngineCmd::SetBootText { text } => state.set_boot_text(text),
        EngineCmd::SetEngineMode { mode } => {
            if state.mode() != mode {
                info!("Engine mode: {} -> {}", state.mode(), mode);
            }
            state.set_mode(mode);
        }
        EngineCmd::Shutdown => {
            info!("Shutdown requested by script");
            state.request_shutdown();
        }
    }
}
