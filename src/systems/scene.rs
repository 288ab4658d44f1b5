//! Scene tree update.
//!
//! - [`update_pointer_messages`] advances the `Messages<PointerEvent>`
//!   double buffer once per frame.
//! - [`scene_update_system`] runs [`SceneTree::update`](crate::scene::SceneTree::update):
//!   stale textures are composed, sprites are hit-tested against the
//!   cursor, and destroyed nodes are swept. Pointer events it produces are
//!   written as messages for [`pointer_dispatch_system`](super::pointer::pointer_dispatch_system).
//!
//! The system is generic over the texture backend so it can run against
//! the GPU in the engine and against a recording backend in tests.

use bevy_ecs::prelude::*;
use log::warn;

use crate::events::pointer::PointerEvent;
use crate::render::TextureBackend;
use crate::resources::cursor::CursorState;
use crate::resources::enginestate::{EngineMode, EngineState};
use crate::resources::shared::SharedScene;
use crate::scene::UpdateContext;

pub fn update_pointer_messages(mut msgs: ResMut<Messages<PointerEvent>>) {
    msgs.update();
}

/// Run condition: the scene is only updated and drawn in game mode.
pub fn in_game_mode(state: Res<EngineState>) -> bool {
    state.mode() == EngineMode::Game
}

pub fn scene_update_system<B: TextureBackend + 'static>(
    scene: NonSend<SharedScene>,
    mut backend: NonSendMut<B>,
    cursor: Res<CursorState>,
    mut pointer_writer: MessageWriter<PointerEvent>,
) {
    let Ok(mut tree) = scene.0.try_borrow_mut() else {
        warn!("Scene tree is borrowed; skipping update");
        return;
    };
    let mut ctx = UpdateContext::new(&mut *backend, *cursor);
    tree.update(&mut ctx);

    for (node, err) in &ctx.errors {
        warn!("Texture update failed for node {}: {}", node, err);
    }
    for event in ctx.events {
        pointer_writer.write(event);
    }
}
