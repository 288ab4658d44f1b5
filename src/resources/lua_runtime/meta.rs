//! Descriptions of the script API, published as `engine.__meta`.
//!
//! The stub and `.luarc.json` generators read this table; nothing reads it
//! at game time.

use mlua::prelude::*;

struct Param {
    name: &'static str,
    ty: &'static str,
}

const fn p(name: &'static str, ty: &'static str) -> Param {
    Param { name, ty }
}

struct FnDoc {
    name: &'static str,
    category: &'static str,
    description: &'static str,
    params: &'static [Param],
    returns: Option<&'static str>,
}

struct MethodDoc {
    name: &'static str,
    description: &'static str,
    params: &'static [Param],
    returns: Option<&'static str>,
}

struct ClassDoc {
    name: &'static str,
    description: &'static str,
    methods: &'static [&'static [MethodDoc]],
}

const fn f(
    name: &'static str,
    category: &'static str,
    description: &'static str,
    params: &'static [Param],
    returns: Option<&'static str>,
) -> FnDoc {
    FnDoc {
        name,
        category,
        description,
        params,
        returns,
    }
}

const fn m(
    name: &'static str,
    description: &'static str,
    params: &'static [Param],
    returns: Option<&'static str>,
) -> MethodDoc {
    MethodDoc {
        name,
        description,
        params,
        returns,
    }
}

const FUNCTIONS: &[FnDoc] = &[
    f("log", "base", "Log a message at info level.", &[p("message", "string")], None),
    f("log_info", "base", "Log a message at info level.", &[p("message", "string")], None),
    f("log_warn", "base", "Log a message at warn level.", &[p("message", "string")], None),
    f("log_error", "base", "Log a message at error level.", &[p("message", "string")], None),
    f("log_debug", "base", "Log a message at debug level.", &[p("message", "string")], None),
    f(
        "set_boot_text",
        "engine",
        "Set the text shown while the engine is in boot mode.",
        &[p("text", "string")],
        None,
    ),
    f(
        "set_engine_mode",
        "engine",
        "Switch between boot and game mode. Takes effect at the end of the frame.",
        &[p("mode", "EngineMode")],
        None,
    ),
    f("exit_boot_mode", "engine", "Shorthand for set_engine_mode(\"game\").", &[], None),
    f("get_engine_mode", "engine", "Current engine mode.", &[], Some("EngineMode")),
    f("shutdown", "engine", "Close the engine at the end of the frame.", &[], None),
    f(
        "add_loader_provider",
        "loader",
        "Append a resource provider. Filesystem paths are relative to the root path.\nProviders are searched in the order they were added.",
        &[p("kind", "LoaderKind"), p("path", "string")],
        None,
    ),
    f(
        "load_string",
        "loader",
        "Read a resource as text.",
        &[p("path", "string")],
        Some("string"),
    ),
    f(
        "load_palette",
        "scene",
        "Load a 256 color palette and register it under a name.",
        &[p("name", "string"), p("path", "string")],
        None,
    ),
    f(
        "load_sprite",
        "scene",
        "Load a DC6 or DCC file as a detached sprite node.",
        &[p("path", "string"), p("palette", "string")],
        Some("Sprite"),
    ),
    f(
        "load_label",
        "scene",
        "Load a bitmap font (path without extension) as a detached label node.",
        &[p("font_path", "string"), p("palette", "string")],
        Some("Label"),
    ),
    f("create_node", "scene", "Create a detached grouping node.", &[], Some("Node")),
    f("get_root_node", "scene", "The root of the scene tree.", &[], Some("Node")),
    f(
        "get_node",
        "scene",
        "Look a node up by id.",
        &[p("id", "integer")],
        Some("Node|Sprite|Label|nil"),
    ),
    f(
        "get_mouse_position",
        "input",
        "Cursor position in render surface pixels.",
        &[],
        Some("integer, integer"),
    ),
    f("is_mouse_down", "input", "Whether the left button is held.", &[], Some("boolean")),
    f(
        "get_setting",
        "util",
        "Read a configuration value as text.",
        &[p("name", "string")],
        Some("string?"),
    ),
    f(
        "join_path",
        "util",
        "Join path segments with '/'.",
        &[p("...", "string")],
        Some("string"),
    ),
    f(
        "split_string",
        "util",
        "Split text on every occurrence of a separator.",
        &[p("text", "string"), p("separator", "string")],
        Some("string[]"),
    ),
];

const NODE_METHODS: &[MethodDoc] = &[
    m("id", "Unique id of the node.", &[], Some("integer")),
    m("get_position", "Offset from the parent.", &[], Some("integer, integer")),
    m("set_position", "Set the offset from the parent.", &[p("x", "integer"), p("y", "integer")], None),
    m("get_world_position", "Sum of offsets up to the root.", &[], Some("integer, integer")),
    m("get_active", "Whether the node updates and renders.", &[], Some("boolean")),
    m("set_active", "Enable or disable update and render for this subtree.", &[p("active", "boolean")], None),
    m("get_visible", "Whether the node renders.", &[], Some("boolean")),
    m("set_visible", "Show or hide this subtree.", &[p("visible", "boolean")], None),
    m("append_child", "Attach a detached node as the last child.", &[p("child", "Node|Sprite|Label")], None),
    m("remove_child", "Detach a direct child.", &[p("child", "Node|Sprite|Label")], None),
    m("remove_all_children", "Detach every child.", &[], None),
    m(
        "find_child",
        "Search this subtree for a node, direct children first.",
        &[p("id", "integer")],
        Some("Node|Sprite|Label|nil"),
    ),
    m("child_count", "Number of direct children.", &[], Some("integer")),
    m("destroy", "Remove the node from the tree at the next update.", &[], None),
];

const SPRITE_METHODS: &[MethodDoc] = &[
    m("node", "Plain node handle for this sprite.", &[], Some("Node")),
    m("get_cell_size", "Frame grid size.", &[], Some("integer, integer")),
    m(
        "set_cell_size",
        "Compose a grid of x by y frames into one image.",
        &[p("x", "integer"), p("y", "integer")],
        None,
    ),
    m("get_sequence", "Current sequence index.", &[], Some("integer")),
    m("set_sequence", "Select a sequence and rewind to frame 0.", &[p("index", "integer")], None),
    m("get_frame", "Current frame index.", &[], Some("integer")),
    m("set_frame", "Select a frame in the current sequence.", &[p("index", "integer")], None),
    m("sequence_count", "Number of sequences.", &[], Some("integer")),
    m("frame_count", "Frames in the current sequence.", &[], Some("integer")),
    m(
        "on_mouse_button_down",
        "Called when the button is pressed over the sprite. Pass nil to clear.",
        &[p("handler", "PointerHandler?")],
        None,
    ),
    m(
        "on_mouse_button_up",
        "Called when the button is released after a press on the sprite. Pass nil to clear.",
        &[p("handler", "PointerHandler?")],
        None,
    ),
    m(
        "on_mouse_over",
        "Called when the cursor enters the sprite. Pass nil to clear.",
        &[p("handler", "PointerHandler?")],
        None,
    ),
    m(
        "on_mouse_leave",
        "Called when the cursor leaves the sprite. Pass nil to clear.",
        &[p("handler", "PointerHandler?")],
        None,
    ),
];

const LABEL_METHODS: &[MethodDoc] = &[
    m("node", "Plain node handle for this label.", &[], Some("Node")),
    m("get_caption", "Current text.", &[], Some("string")),
    m("set_caption", "Replace the text.", &[p("caption", "string")], None),
];

const CLASSES: &[ClassDoc] = &[
    ClassDoc {
        name: "Node",
        description: "A node in the scene tree.",
        methods: &[NODE_METHODS],
    },
    ClassDoc {
        name: "Sprite",
        description: "An animated, palette-indexed sprite node.",
        methods: &[NODE_METHODS, SPRITE_METHODS],
    },
    ClassDoc {
        name: "Label",
        description: "A line of bitmap-font text.",
        methods: &[NODE_METHODS, LABEL_METHODS],
    },
];

const ENUMS: &[(&str, &str, &[&str])] = &[
    ("EngineMode", "Engine mode.", &["boot", "game"]),
    ("LoaderKind", "Resource provider kind.", &["filesystem", "mpq"]),
];

fn params_table(lua: &Lua, params: &[Param]) -> LuaResult<LuaTable> {
    let tbl = lua.create_table()?;
    for param in params {
        let entry = lua.create_table()?;
        entry.set("name", param.name)?;
        entry.set("type", param.ty)?;
        tbl.push(entry)?;
    }
    Ok(tbl)
}

fn returns_table(lua: &Lua, returns: Option<&str>) -> LuaResult<Option<LuaTable>> {
    returns
        .map(|ty| {
            let tbl = lua.create_table()?;
            tbl.set("type", ty)?;
            Ok(tbl)
        })
        .transpose()
}

/// Builds `engine.__meta`. Expects the `engine` global to exist.
pub(super) fn register(lua: &Lua) -> LuaResult<()> {
    let engine: LuaTable = lua.globals().get("engine")?;
    let meta = lua.create_table()?;

    let functions = lua.create_table()?;
    for doc in FUNCTIONS {
        let entry = lua.create_table()?;
        entry.set("description", doc.description)?;
        entry.set("category", doc.category)?;
        entry.set("params", params_table(lua, doc.params)?)?;
        entry.set("returns", returns_table(lua, doc.returns)?)?;
        functions.set(doc.name, entry)?;
    }
    meta.set("functions", functions)?;

    let classes = lua.create_table()?;
    for class in CLASSES {
        let methods = lua.create_table()?;
        for method in class.methods.iter().flat_map(|group| group.iter()) {
            let entry = lua.create_table()?;
            entry.set("description", method.description)?;
            entry.set("params", params_table(lua, method.params)?)?;
            entry.set("returns", returns_table(lua, method.returns)?)?;
            methods.set(method.name, entry)?;
        }
        let entry = lua.create_table()?;
        entry.set("description", class.description)?;
        entry.set("methods", methods)?;
        classes.set(class.name, entry)?;
    }
    meta.set("classes", classes)?;

    let enums = lua.create_table()?;
    for (name, description, values) in ENUMS {
        let entry = lua.create_table()?;
        entry.set("description", *description)?;
        entry.set("values", values.to_vec())?;
        enums.set(*name, entry)?;
    }
    meta.set("enums", enums)?;

    let callbacks = lua.create_table()?;
    let handler = lua.create_table()?;
    handler.set("description", "Pointer handler registered with Sprite:on_mouse_*.")?;
    handler.set("params", params_table(lua, &[p("sprite", "Sprite")])?)?;
    handler.set("context", "Runs after the scene update, once per event.")?;
    handler.set("note", "Handlers of a sprite destroyed earlier in the frame are skipped.")?;
    callbacks.set("PointerHandler", handler)?;
    meta.set("callbacks", callbacks)?;

    engine.set("__meta", meta)?;
    Ok(())
}
