//! Script handles for scene nodes.
//!
//! A handle is a [`NodeId`] plus a [`NodePin`]; every method looks the node
//! up in the shared [`SceneTree`] when called, so a handle to a swept node
//! fails with a Lua error instead of dangling. The pin keeps a detached node
//! alive until the last handle to it is collected. Sprites and labels expose the common
//! node methods too, so `sprite:set_position(10, 20)` works without going
//! through `sprite:node()`.

use super::runtime::{app_data, lua_error};
use crate::events::pointer::PointerEventKind;
use crate::scene::{Node, NodeId, NodeKind, NodePin, SceneTree};
use mlua::prelude::*;

/// Something that refers to a node in the scene tree.
pub trait NodeHandle {
    fn node_id(&self) -> NodeId;
}

/// Handle to any node.
#[derive(Clone, Debug)]
pub struct LuaNode {
    id: NodeId,
    pin: NodePin,
}

/// Handle to a sprite node.
#[derive(Clone, Debug)]
pub struct LuaSprite {
    id: NodeId,
    pin: NodePin,
}

/// Handle to a label node.
#[derive(Clone, Debug)]
pub struct LuaLabel {
    id: NodeId,
    pin: NodePin,
}

impl LuaNode {
    pub fn new(scene: &SceneTree, id: NodeId) -> LuaResult<Self> {
        let pin = scene.pin(id).map_err(lua_error)?;
        Ok(Self { id, pin })
    }
}

impl LuaSprite {
    pub fn new(scene: &SceneTree, id: NodeId) -> LuaResult<Self> {
        let pin = scene.pin(id).map_err(lua_error)?;
        Ok(Self { id, pin })
    }
}

impl LuaLabel {
    pub fn new(scene: &SceneTree, id: NodeId) -> LuaResult<Self> {
        let pin = scene.pin(id).map_err(lua_error)?;
        Ok(Self { id, pin })
    }
}

impl NodeHandle for LuaNode {
    fn node_id(&self) -> NodeId {
        self.id
    }
}

impl NodeHandle for LuaSprite {
    fn node_id(&self) -> NodeId {
        self.id
    }
}

impl NodeHandle for LuaLabel {
    fn node_id(&self) -> NodeId {
        self.id
    }
}

/// Extracts the node id from any of the handle types.
fn handle_id(ud: &LuaAnyUserData) -> LuaResult<NodeId> {
    if let Ok(node) = ud.borrow::<LuaNode>() {
        return Ok(node.id);
    }
    if let Ok(sprite) = ud.borrow::<LuaSprite>() {
        return Ok(sprite.id);
    }
    if let Ok(label) = ud.borrow::<LuaLabel>() {
        return Ok(label.id);
    }
    Err(LuaError::runtime("expected a Node, Sprite or Label"))
}

/// Wraps `id` in the handle type matching its kind, or nil if the node is gone.
pub(super) fn handle_value(lua: &Lua, scene: &SceneTree, id: NodeId) -> LuaResult<LuaValue> {
    match scene.get(id).map(|node| &node.kind) {
        Ok(NodeKind::Sprite(_)) => LuaSprite::new(scene, id)?.into_lua(lua),
        Ok(NodeKind::Label(_)) => LuaLabel::new(scene, id)?.into_lua(lua),
        Ok(NodeKind::Plain) => LuaNode::new(scene, id)?.into_lua(lua),
        Err(_) => Ok(LuaValue::Nil),
    }
}

fn with_scene<R>(lua: &Lua, f: impl FnOnce(&mut SceneTree) -> LuaResult<R>) -> LuaResult<R> {
    let data = app_data(lua)?;
    let mut scene = data.scene_mut()?;
    f(&mut scene)
}

fn with_node<R>(lua: &Lua, id: NodeId, f: impl FnOnce(&mut Node) -> R) -> LuaResult<R> {
    with_scene(lua, |scene| scene.get_mut(id).map(f).map_err(lua_error))
}

/// Flags the node for removal and frees its script callbacks.
fn destroy(lua: &Lua, id: NodeId) -> LuaResult<()> {
    with_scene(lua, |scene| scene.destroy(id).map_err(lua_error))?;
    app_data(lua)?.release_dropped_callbacks(lua)?;
    Ok(())
}

/// Methods shared by every handle type.
fn add_node_methods<T, M>(methods: &mut M)
where
    T: NodeHandle + 'static,
    M: LuaUserDataMethods<T>,
{
    methods.add_method("id", |_, this, ()| Ok(this.node_id().raw()));

    methods.add_method("get_position", |lua, this, ()| {
        with_node(lua, this.node_id(), |node| node.local_position())
    });

    methods.add_method("set_position", |lua, this, (x, y): (i32, i32)| {
        with_node(lua, this.node_id(), |node| node.set_local_position(x, y))
    });

    methods.add_method("get_world_position", |lua, this, ()| {
        with_scene(lua, |scene| scene.position(this.node_id()).map_err(lua_error))
    });

    methods.add_method("get_active", |lua, this, ()| {
        with_node(lua, this.node_id(), |node| node.active)
    });

    methods.add_method("set_active", |lua, this, active: bool| {
        with_node(lua, this.node_id(), |node| node.active = active)
    });

    methods.add_method("get_visible", |lua, this, ()| {
        with_node(lua, this.node_id(), |node| node.visible)
    });

    methods.add_method("set_visible", |lua, this, visible: bool| {
        with_node(lua, this.node_id(), |node| node.visible = visible)
    });

    methods.add_method("append_child", |lua, this, child: LuaAnyUserData| {
        let child = handle_id(&child)?;
        with_scene(lua, |scene| {
            scene.add_child(this.node_id(), child).map_err(lua_error)
        })
    });

    methods.add_method("remove_child", |lua, this, child: LuaAnyUserData| {
        let child = handle_id(&child)?;
        with_scene(lua, |scene| {
            scene.remove_child(this.node_id(), child).map_err(lua_error)
        })
    });

    methods.add_method("remove_all_children", |lua, this, ()| {
        with_scene(lua, |scene| {
            scene.remove_all_children(this.node_id()).map_err(lua_error)
        })
    });

    methods.add_method("find_child", |lua, this, id: u64| {
        let data = app_data(lua)?;
        let scene = data.scene()?;
        match scene.find_child(this.node_id(), NodeId::from_raw(id)) {
            Some(found) => handle_value(lua, &scene, found),
            None => Ok(LuaValue::Nil),
        }
    });

    methods.add_method("child_count", |lua, this, ()| {
        with_node(lua, this.node_id(), |node| node.children().len())
    });

    methods.add_method("destroy", |lua, this, ()| destroy(lua, this.node_id()));
}

impl LuaUserData for LuaNode {
    fn add_methods<M: LuaUserDataMethods<Self>>(methods: &mut M) {
        add_node_methods(methods);
    }
}

/// Registers or clears one pointer handler on a sprite.
fn set_pointer_handler(
    lua: &Lua,
    id: NodeId,
    kind: PointerEventKind,
    func: Option<LuaFunction>,
) -> LuaResult<()> {
    let data = app_data(lua)?;
    let callback = func.map(|f| data.register_callback(lua, f)).transpose()?;
    let result = data
        .scene_mut()
        .and_then(|mut scene| scene.set_handler(id, kind, callback).map_err(lua_error));
    if result.is_err()
        && let Some(callback) = callback
    {
        data.forget_callback(lua, callback)?;
    }
    data.release_dropped_callbacks(lua)?;
    result
}

fn with_sprite<R>(
    lua: &Lua,
    id: NodeId,
    f: impl FnOnce(&mut crate::scene::Sprite) -> LuaResult<R>,
) -> LuaResult<R> {
    with_scene(lua, |scene| f(scene.sprite_mut(id).map_err(lua_error)?))
}

impl LuaUserData for LuaSprite {
    fn add_methods<M: LuaUserDataMethods<Self>>(methods: &mut M) {
        add_node_methods(methods);

        methods.add_method("node", |_, this, ()| {
            Ok(LuaNode {
                id: this.id,
                pin: this.pin.clone(),
            })
        });

        methods.add_method("get_cell_size", |lua, this, ()| {
            with_sprite(lua, this.id, |sprite| Ok(sprite.cell_size()))
        });

        methods.add_method("set_cell_size", |lua, this, (x, y): (usize, usize)| {
            with_scene(lua, |scene| scene.set_cell_size(this.id, x, y).map_err(lua_error))
        });

        methods.add_method("get_sequence", |lua, this, ()| {
            with_sprite(lua, this.id, |sprite| Ok(sprite.sequence()))
        });

        methods.add_method("set_sequence", |lua, this, index: usize| {
            with_sprite(lua, this.id, |sprite| sprite.set_sequence(index).map_err(lua_error))
        });

        methods.add_method("get_frame", |lua, this, ()| {
            with_sprite(lua, this.id, |sprite| Ok(sprite.frame()))
        });

        methods.add_method("set_frame", |lua, this, index: usize| {
            with_sprite(lua, this.id, |sprite| sprite.set_frame(index).map_err(lua_error))
        });

        methods.add_method("sequence_count", |lua, this, ()| {
            with_sprite(lua, this.id, |sprite| Ok(sprite.sequence_count()))
        });

        methods.add_method("frame_count", |lua, this, ()| {
            with_sprite(lua, this.id, |sprite| Ok(sprite.frame_count()))
        });

        methods.add_method("on_mouse_button_down", |lua, this, func: Option<LuaFunction>| {
            set_pointer_handler(lua, this.id, PointerEventKind::ButtonDown, func)
        });

        methods.add_method("on_mouse_button_up", |lua, this, func: Option<LuaFunction>| {
            set_pointer_handler(lua, this.id, PointerEventKind::ButtonUp, func)
        });

        methods.add_method("on_mouse_over", |lua, this, func: Option<LuaFunction>| {
            set_pointer_handler(lua, this.id, PointerEventKind::MouseOver, func)
        });

        methods.add_method("on_mouse_leave", |lua, this, func: Option<LuaFunction>| {
            set_pointer_handler(lua, this.id, PointerEventKind::MouseLeave, func)
        });
    }
}

impl LuaUserData for LuaLabel {
    fn add_methods<M: LuaUserDataMethods<Self>>(methods: &mut M) {
        add_node_methods(methods);

        methods.add_method("node", |_, this, ()| {
            Ok(LuaNode {
                id: this.id,
                pin: this.pin.clone(),
            })
        });

        methods.add_method("get_caption", |lua, this, ()| {
            with_scene(lua, |scene| {
                Ok(scene.label(this.id).map_err(lua_error)?.caption().to_string())
            })
        });

        methods.add_method("set_caption", |lua, this, caption: String| {
            with_scene(lua, |scene| {
                scene.label_mut(this.id).map_err(lua_error)?.set_caption(&caption);
                Ok(())
            })
        });
    }
}
