//! Pointer event dispatch.
//!
//! Delivers the [`PointerEvent`] messages written by the scene update to
//! the script callbacks they name. The scene is not borrowed while a
//! callback runs, so handlers may move, create or destroy nodes. An event
//! whose node was destroyed by an earlier handler in the same frame is
//! dropped.
//!
//! # Lua Callback Signature
//!
//! ```lua
//! sprite:on_mouse_button_down(function(sprite)
//!     -- sprite is the Sprite handle the handler was registered on
//! end)
//! ```

use bevy_ecs::prelude::*;
use log::{debug, warn};

use crate::events::pointer::PointerEvent;
use crate::resources::lua_runtime::LuaRuntime;
use crate::resources::shared::SharedScene;

pub fn pointer_dispatch_system(
    mut reader: MessageReader<PointerEvent>,
    lua_runtime: NonSend<LuaRuntime>,
    scene: NonSend<SharedScene>,
) {
    for event in reader.read() {
        let pending = scene
            .0
            .try_borrow()
            .map(|tree| tree.is_pending_removal(event.node))
            .unwrap_or(true);
        if pending {
            debug!("Dropping {:?} for removed node {}", event.kind, event.node);
            continue;
        }
        if let Err(e) = lua_runtime.call_pointer_handler(event) {
            warn!("Error in {:?} handler of node {}: {}", event.kind, event.node, e);
        }
    }

    if let Err(e) = lua_runtime.release_callbacks() {
        warn!("Failed to release script callbacks: {}", e);
    }
}
