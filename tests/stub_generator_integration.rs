//! Integration tests for the Lua stub and `.luarc.json` generators.
//!
//! # Usage
//!
//! ```sh
//! cargo test --test stub_generator_integration
//! ```

use abyssengine::luarc_generator;
use abyssengine::resources::lua_runtime::LuaRuntime;
use abyssengine::stub_generator;

fn sorted_names(rt: &LuaRuntime, table: &str) -> Vec<String> {
    rt.lua()
        .load(format!(
            r#"
        local names = {{}}
        for name, _ in pairs({table}) do
            table.insert(names, name)
        end
        table.sort(names)
        return names
    "#
        ))
        .eval::<Vec<String>>()
        .unwrap()
}

#[test]
fn generate_stubs_produces_valid_output() {
    let rt = LuaRuntime::default();
    let content = stub_generator::generate_stubs(&rt).unwrap();

    assert!(content.starts_with("---@meta"), "Should start with ---@meta");
    assert!(content.contains("engine = {}"), "Should declare engine table");
    assert!(content.contains("`abyssengine --create-lua-stubs`"));
}

#[test]
fn generated_stubs_contain_representative_signatures() {
    let rt = LuaRuntime::default();
    let content = stub_generator::generate_stubs(&rt).unwrap();

    assert!(content.contains("function engine.log(message)"));
    assert!(content.contains("function engine.add_loader_provider(kind, path)"));
    assert!(content.contains("---@return Sprite\nfunction engine.load_sprite(path, palette)"));
    assert!(content.contains("function engine.join_path(...)"));

    assert!(content.contains("---@class Node"));
    assert!(content.contains("---@class Sprite"));
    assert!(content.contains("---@class Label"));
    assert!(content.contains("function Sprite:set_cell_size(x, y)"));
    assert!(content.contains("---@param handler PointerHandler|nil\nfunction Sprite:on_mouse_over(handler)"));
    assert!(content.contains("function Label:set_caption(caption)"));

    assert!(content.contains("---@alias EngineMode \"boot\" | \"game\""));
    assert!(content.contains("---@alias LoaderKind \"filesystem\" | \"mpq\""));
    assert!(content.contains("---@alias PointerHandler fun(sprite: Sprite)"));
}

#[test]
fn class_methods_list_own_methods_before_shared_node_methods() {
    let rt = LuaRuntime::default();
    let content = stub_generator::generate_stubs(&rt).unwrap();

    let own = content.find("function Sprite:set_cell_size(").unwrap();
    let shared = content.find("function Sprite:set_position(").unwrap();
    assert!(own < shared);
    let node_class = content.find("---@class Node").unwrap();
    let sprite_class = content.find("---@class Sprite").unwrap();
    assert!(node_class < sprite_class);
    assert!(content.find("---@alias PointerHandler").unwrap() < content.find("function engine.log(").unwrap());
}

#[test]
fn generated_function_set_matches_meta() {
    let rt = LuaRuntime::default();
    let content = stub_generator::generate_stubs(&rt).unwrap();

    for name in sorted_names(&rt, "engine.__meta.functions") {
        let pattern = format!("function engine.{}(", name);
        assert!(
            content.contains(&pattern),
            "Meta function '{}' not found in generated stubs",
            name
        );
    }
}

#[test]
fn every_engine_function_is_described() {
    let rt = LuaRuntime::default();
    let described = sorted_names(&rt, "engine.__meta.functions");
    let registered: Vec<String> = sorted_names(&rt, "engine")
        .into_iter()
        .filter(|name| !name.starts_with("__"))
        .collect();
    assert_eq!(registered, described);
}

#[test]
fn sprite_stub_lists_own_methods_before_node_methods() {
    let rt = LuaRuntime::default();
    let content = stub_generator::generate_stubs(&rt).unwrap();

    let own = content.find("function Sprite:set_frame(").unwrap();
    let shared = content.find("function Sprite:set_position(").unwrap();
    assert!(own < shared);
    for name in sorted_names(&rt, "engine.__meta.classes.Sprite.methods") {
        assert!(content.contains(&format!("function Sprite:{}(", name)));
    }
}

#[test]
fn write_stubs_creates_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("engine.lua");

    let rt = LuaRuntime::default();
    let content = stub_generator::generate_stubs(&rt).unwrap();
    stub_generator::write_stubs(&path, &content).unwrap();

    let written = std::fs::read_to_string(&path).unwrap();
    assert_eq!(written, content, "Written content should match generated content");
}

#[test]
fn luarc_points_at_stub_file() {
    let rt = LuaRuntime::default();
    let content = luarc_generator::generate_luarc(&rt, "engine.lua").unwrap();
    let json: serde_json::Value = serde_json::from_str(&content).unwrap();

    assert_eq!(json["runtime.version"], "LuaJIT");
    assert_eq!(json["diagnostics.globals"][0], "engine");
    assert_eq!(json["workspace.library"][0], "engine.lua");
    assert_eq!(json["workspace.checkThirdParty"], false);
}

#[test]
fn luarc_requires_engine_metadata() {
    let rt = LuaRuntime::default();
    rt.run_source("engine.__meta = nil", "strip").unwrap();
    let err = luarc_generator::generate_luarc(&rt, "engine.lua").unwrap_err();
    assert!(err.contains("__meta"));
}
