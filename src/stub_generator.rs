//! EmmyLua stub file for lua-language-server.
//!
//! `--create-lua-stubs` renders `engine.__meta` into an `engine.lua` file
//! that editors load for completion and type checks. The layout is stable
//! so the file diffs cleanly between engine versions:
//!
//! 1. enums and the callback aliases scripts hand to the engine
//! 2. `engine.*` functions grouped by category
//! 3. the `Node`, `Sprite` and `Label` handle classes

use crate::resources::lua_runtime::LuaRuntime;
use mlua::prelude::*;
use std::fmt::Write as FmtWrite;
use std::path::Path;

/// Function categories in the order their sections appear.
const CATEGORIES: &[(&str, &str)] = &[
    ("base", "Logging Functions"),
    ("engine", "Engine Mode & Lifecycle"),
    ("loader", "Resource Loader"),
    ("scene", "Palettes & Scene Tree"),
    ("input", "Cursor Input"),
    ("util", "Settings & Utilities"),
];

/// Handle classes in display order, with their section titles.
const CLASSES: &[(&str, &str)] = &[
    ("Node", "Scene Node"),
    ("Sprite", "Sprite Node"),
    ("Label", "Label Node"),
];

/// Methods every handle class shares. Listed after a class's own methods.
const NODE_METHODS: &[&str] = &[
    "id",
    "get_position",
    "set_position",
    "get_world_position",
    "get_active",
    "set_active",
    "get_visible",
    "set_visible",
    "append_child",
    "remove_child",
    "remove_all_children",
    "find_child",
    "child_count",
    "destroy",
];

/// `T?` in the meta table is written `T|nil` in annotations.
fn annotation(ty: &str) -> String {
    match ty.strip_suffix('?') {
        Some(inner) => format!("{inner}|nil"),
        None => ty.to_string(),
    }
}

/// A function, method or callback signature.
struct Signature {
    name: String,
    description: String,
    params: Vec<(String, String)>,
    returns: Option<String>,
}

impl Signature {
    fn read(name: String, tbl: &LuaTable) -> LuaResult<Self> {
        let mut params = Vec::new();
        for param in tbl.get::<LuaTable>("params")?.sequence_values::<LuaTable>() {
            let param = param?;
            params.push((param.get("name")?, param.get("type")?));
        }
        let returns = tbl
            .get::<Option<LuaTable>>("returns")?
            .map(|r| r.get::<String>("type"))
            .transpose()?;
        Ok(Self {
            name,
            description: tbl.get("description")?,
            params,
            returns,
        })
    }

    fn param_names(&self) -> String {
        let names: Vec<&str> = self.params.iter().map(|(n, _)| n.as_str()).collect();
        names.join(", ")
    }

    /// Description, `@param` and `@return` lines.
    fn write_doc(&self, out: &mut String) {
        for line in self.description.lines() {
            writeln!(out, "---{line}").unwrap();
        }
        for (name, ty) in &self.params {
            writeln!(out, "---@param {name} {}", annotation(ty)).unwrap();
        }
        if let Some(ret) = &self.returns {
            writeln!(out, "---@return {}", annotation(ret)).unwrap();
        }
    }
}

struct Class {
    name: String,
    title: &'static str,
    description: String,
    methods: Vec<Signature>,
}

struct Alias {
    name: String,
    description: String,
    values: Vec<String>,
}

struct Callback {
    signature: Signature,
    context: Option<String>,
    note: Option<String>,
}

/// Renders the stub file from `engine.__meta`.
pub fn generate_stubs(runtime: &LuaRuntime) -> Result<String, String> {
    let meta: LuaTable = runtime
        .lua()
        .load("return engine.__meta")
        .eval()
        .map_err(|e| format!("Failed to get engine.__meta: {e}"))?;

    let functions = read_functions(&meta).map_err(|e| format!("Functions: {e}"))?;
    let classes = read_classes(&meta).map_err(|e| format!("Classes: {e}"))?;
    let enums = read_enums(&meta).map_err(|e| format!("Enums: {e}"))?;
    let callbacks = read_callbacks(&meta).map_err(|e| format!("Callbacks: {e}"))?;

    let mut out = String::with_capacity(32 * 1024);
    writeln!(out, "---@meta").unwrap();
    writeln!(out).unwrap();
    writeln!(out, "-- THIS FILE IS AUTO-GENERATED by `abyssengine --create-lua-stubs`.").unwrap();
    writeln!(out, "-- DO NOT EDIT MANUALLY. Regenerate from engine.__meta instead.").unwrap();
    writeln!(out).unwrap();
    writeln!(out, "---@class engine").unwrap();
    writeln!(out, "---Abyss Engine API, available globally as `engine`").unwrap();
    writeln!(out, "engine = {{}}").unwrap();
    writeln!(out).unwrap();

    write_aliases(&mut out, &enums, &callbacks);
    write_functions(&mut out, &functions);
    for class in &classes {
        write_class(&mut out, class);
    }
    Ok(out)
}

pub fn write_stubs(path: &Path, content: &str) -> Result<(), String> {
    std::fs::write(path, content).map_err(|e| format!("Failed to write {}: {e}", path.display()))
}

fn heading(out: &mut String, title: &str) {
    writeln!(out, "-- ==================== {title} ====================").unwrap();
    writeln!(out).unwrap();
}

fn category_rank(category: &str) -> usize {
    CATEGORIES
        .iter()
        .position(|(c, _)| *c == category)
        .unwrap_or(CATEGORIES.len())
}

fn read_functions(meta: &LuaTable) -> LuaResult<Vec<(String, Signature)>> {
    let mut functions = Vec::new();
    for pair in meta.get::<LuaTable>("functions")?.pairs::<String, LuaTable>() {
        let (name, tbl) = pair?;
        let category: String = tbl.get("category")?;
        functions.push((category, Signature::read(name, &tbl)?));
    }
    functions.sort_by(|(ca, a), (cb, b)| {
        category_rank(ca)
            .cmp(&category_rank(cb))
            .then_with(|| a.name.cmp(&b.name))
    });
    Ok(functions)
}

fn read_classes(meta: &LuaTable) -> LuaResult<Vec<Class>> {
    let classes_tbl: LuaTable = meta.get("classes")?;
    let mut classes = Vec::new();
    for (name, title) in CLASSES {
        let Some(tbl) = classes_tbl.get::<Option<LuaTable>>(*name)? else {
            continue;
        };
        let mut methods = Vec::new();
        for pair in tbl.get::<LuaTable>("methods")?.pairs::<String, LuaTable>() {
            let (method, mtbl) = pair?;
            methods.push(Signature::read(method, &mtbl)?);
        }
        let shared = |m: &Signature| *name != "Node" && NODE_METHODS.contains(&m.name.as_str());
        methods.sort_by(|a, b| (shared(a), &a.name).cmp(&(shared(b), &b.name)));
        classes.push(Class {
            name: name.to_string(),
            title: *title,
            description: tbl.get("description")?,
            methods,
        });
    }
    Ok(classes)
}

fn read_enums(meta: &LuaTable) -> LuaResult<Vec<Alias>> {
    let mut enums = Vec::new();
    for pair in meta.get::<LuaTable>("enums")?.pairs::<String, LuaTable>() {
        let (name, tbl) = pair?;
        enums.push(Alias {
            name,
            description: tbl.get("description")?,
            values: tbl.get("values")?,
        });
    }
    enums.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(enums)
}

fn read_callbacks(meta: &LuaTable) -> LuaResult<Vec<Callback>> {
    let mut callbacks = Vec::new();
    for pair in meta.get::<LuaTable>("callbacks")?.pairs::<String, LuaTable>() {
        let (name, tbl) = pair?;
        callbacks.push(Callback {
            context: tbl.get("context")?,
            note: tbl.get("note")?,
            signature: Signature::read(name, &tbl)?,
        });
    }
    callbacks.sort_by(|a, b| a.signature.name.cmp(&b.signature.name));
    Ok(callbacks)
}

fn write_aliases(out: &mut String, enums: &[Alias], callbacks: &[Callback]) {
    heading(out, "Enums & Callbacks");

    for e in enums {
        let values: Vec<String> = e.values.iter().map(|v| format!("\"{v}\"")).collect();
        writeln!(out, "---{}", e.description).unwrap();
        writeln!(out, "---@alias {} {}", e.name, values.join(" | ")).unwrap();
        writeln!(out).unwrap();
    }

    for cb in callbacks {
        let sig = &cb.signature;
        writeln!(out, "---{}", sig.description).unwrap();
        if let Some(note) = &cb.note {
            writeln!(out, "---NOTE: {note}").unwrap();
        }
        if let Some(context) = &cb.context {
            writeln!(out, "---Context: {context}").unwrap();
        }
        let params: Vec<String> = sig
            .params
            .iter()
            .map(|(n, t)| format!("{n}: {}", annotation(t)))
            .collect();
        let returns = sig
            .returns
            .as_deref()
            .map(|r| format!(": {}", annotation(r)))
            .unwrap_or_default();
        writeln!(out, "---@alias {} fun({}){returns}", sig.name, params.join(", ")).unwrap();
        writeln!(out).unwrap();
    }
}

fn write_functions(out: &mut String, functions: &[(String, Signature)]) {
    let mut current = None;
    for (category, f) in functions {
        if current != Some(category.as_str()) {
            current = Some(category.as_str());
            let title = CATEGORIES
                .iter()
                .find(|(c, _)| *c == category.as_str())
                .map_or(category.as_str(), |(_, t)| *t);
            heading(out, title);
        }
        f.write_doc(out);
        writeln!(out, "function engine.{}({}) end", f.name, f.param_names()).unwrap();
        writeln!(out).unwrap();
    }
}

fn write_class(out: &mut String, class: &Class) {
    heading(out, class.title);
    writeln!(out, "---@class {}", class.name).unwrap();
    writeln!(out, "---{}", class.description).unwrap();
    writeln!(out, "local {} = {{}}", class.name).unwrap();
    writeln!(out).unwrap();

    for m in &class.methods {
        m.write_doc(out);
        writeln!(out, "function {}:{}({}) end", class.name, m.name, m.param_names()).unwrap();
        writeln!(out).unwrap();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optional_types_become_nil_unions() {
        assert_eq!(annotation("string?"), "string|nil");
        assert_eq!(annotation("Node|Sprite|Label|nil"), "Node|Sprite|Label|nil");
        assert_eq!(annotation("string[]"), "string[]");
    }

    #[test]
    fn test_categories_rank_in_section_order() {
        assert!(category_rank("base") < category_rank("util"));
        assert_eq!(category_rank("unknown"), CATEGORIES.len());
    }
}
