//! Pointer events emitted by sprite hit-testing.
//!
//! The scene update pass records a [`PointerEvent`] for every edge the
//! sprite pointer state machine detects, but only for events that have a
//! script callback registered. The dispatch system delivers them to Lua
//! after the scene is no longer borrowed, so callbacks can freely mutate
//! the tree.

use bevy_ecs::message::Message;

use crate::scene::NodeId;

/// Handle to a script callback held by the scripting host.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CallbackId(pub u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PointerEventKind {
    ButtonDown,
    ButtonUp,
    MouseOver,
    MouseLeave,
}

impl PointerEventKind {
    pub const ALL: [PointerEventKind; 4] = [
        PointerEventKind::ButtonDown,
        PointerEventKind::ButtonUp,
        PointerEventKind::MouseOver,
        PointerEventKind::MouseLeave,
    ];
}

#[derive(Message, Clone, Copy, Debug, PartialEq, Eq)]
pub struct PointerEvent {
    pub node: NodeId,
    pub kind: PointerEventKind,
    pub callback: CallbackId,
}
