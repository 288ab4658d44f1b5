//! Generator for the Lua Language Server `.luarc.json`.
//!
//! Game scripts run on LuaJIT and only see the `engine` global. The generated
//! config declares that global and adds the stubs file written by
//! [`crate::stub_generator`] to the workspace library, so editors can complete
//! `engine.load_sprite(...)` and the node handle methods.

use crate::resources::lua_runtime::LuaRuntime;
use mlua::prelude::*;
use std::path::Path;

/// Builds the `.luarc.json` content.
///
/// Fails if the runtime has no `engine.__meta` description or the
/// description lists no functions, since the stubs would then be empty.
pub fn generate_luarc(runtime: &LuaRuntime, stubs_filename: &str) -> Result<String, String> {
    let lua = runtime.lua();

    let engine: LuaTable = lua
        .globals()
        .get("engine")
        .map_err(|e| format!("Failed to get engine table: {e}"))?;
    let meta: LuaTable = engine
        .get("__meta")
        .map_err(|e| format!("Failed to get engine.__meta: {e}"))?;
    let functions: LuaTable = meta
        .get("functions")
        .map_err(|e| format!("Failed to get engine.__meta.functions: {e}"))?;
    if functions.pairs::<String, LuaValue>().next().is_none() {
        return Err("engine.__meta.functions is empty".to_string());
    }

    let content = serde_json::json!({
        "$schema": "https://raw.githubusercontent.com/LuaLS/vscode-lua/master/setting/schema.json",
        "runtime.version": "LuaJIT",
        // Scripts are resolved through the engine loader, not package.path.
        "runtime.path": ["?.lua", "?/init.lua"],
        "diagnostics.globals": ["engine"],
        "diagnostics.disable": ["lowercase-global"],
        "workspace.library": [stubs_filename],
        "workspace.checkThirdParty": false,
        "completion.autoRequire": false
    });

    serde_json::to_string_pretty(&content)
        .map_err(|e| format!("Failed to serialize .luarc.json: {e}"))
}

/// Write the generated `.luarc.json` content to a file.
pub fn write_luarc(path: &Path, content: &str) -> Result<(), String> {
    std::fs::write(path, content)
        .map_err(|e| format!("Failed to write {}: {e}", path.display()))
}
