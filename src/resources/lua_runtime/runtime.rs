//! Lua runtime core implementation.
//!
//! This module contains the `LuaRuntime` struct which manages the Lua interpreter
//! and provides the `engine` table API to Lua scripts.

use super::commands::EngineCmd;
use super::meta;
use super::snapshot::EngineSnapshot;
use super::userdata::{LuaLabel, LuaNode, LuaSprite, handle_value};
use crate::events::pointer::{CallbackId, PointerEvent};
use crate::resources::enginestate::EngineMode;
use crate::resources::gameconfig::GameConfig;
use crate::resources::loader::{ArchiveProvider, Loader};
use crate::resources::loader::filesystem::FileSystemProvider;
use crate::resources::palette::PaletteRegistry;
use crate::resources::shared::{SharedLoader, SharedPalettes, SharedScene};
use crate::scene::{Label, SceneTree, Sprite};
use mlua::prelude::*;
use rustc_hash::FxHashMap;
use std::cell::{Cell, Ref, RefCell, RefMut};
use std::fmt::Display;

use log::{debug, error, info, warn};

/// Shared state accessible from Lua function closures.
/// This is stored in Lua's app_data and allows Lua functions to queue commands
/// and reach the scene, palettes and loader.
pub(super) struct LuaAppData {
    engine_commands: RefCell<Vec<EngineCmd>>,
    /// Cached cursor and mode (read-only for Lua).
    snapshot: Cell<EngineSnapshot>,
    config: RefCell<GameConfig>,
    scene: SharedScene,
    palettes: SharedPalettes,
    loader: SharedLoader,
    /// Script functions registered as pointer handlers.
    callbacks: RefCell<FxHashMap<CallbackId, LuaRegistryKey>>,
    next_callback: Cell<u64>,
}

impl LuaAppData {
    pub(super) fn scene(&self) -> LuaResult<Ref<'_, SceneTree>> {
        self.scene
            .0
            .try_borrow()
            .map_err(|_| LuaError::runtime("scene tree is busy"))
    }

    pub(super) fn scene_mut(&self) -> LuaResult<RefMut<'_, SceneTree>> {
        self.scene
            .0
            .try_borrow_mut()
            .map_err(|_| LuaError::runtime("scene tree is busy"))
    }

    fn palettes(&self) -> LuaResult<Ref<'_, PaletteRegistry>> {
        self.palettes
            .0
            .try_borrow()
            .map_err(|_| LuaError::runtime("palette registry is busy"))
    }

    fn palettes_mut(&self) -> LuaResult<RefMut<'_, PaletteRegistry>> {
        self.palettes
            .0
            .try_borrow_mut()
            .map_err(|_| LuaError::runtime("palette registry is busy"))
    }

    fn loader(&self) -> LuaResult<Ref<'_, Loader>> {
        self.loader
            .0
            .try_borrow()
            .map_err(|_| LuaError::runtime("loader is busy"))
    }

    fn loader_mut(&self) -> LuaResult<RefMut<'_, Loader>> {
        self.loader
            .0
            .try_borrow_mut()
            .map_err(|_| LuaError::runtime("loader is busy"))
    }

    /// Keeps `func` alive in the registry and returns its handle.
    pub(super) fn register_callback(&self, lua: &Lua, func: LuaFunction) -> LuaResult<CallbackId> {
        let key = lua.create_registry_value(func)?;
        let id = CallbackId(self.next_callback.get() + 1);
        self.next_callback.set(id.0);
        self.callbacks.borrow_mut().insert(id, key);
        Ok(id)
    }

    pub(super) fn forget_callback(&self, lua: &Lua, id: CallbackId) -> LuaResult<()> {
        if let Some(key) = self.callbacks.borrow_mut().remove(&id) {
            lua.remove_registry_value(key)?;
        }
        Ok(())
    }

    /// Drops every callback the scene no longer references.
    pub(super) fn release_dropped_callbacks(&self, lua: &Lua) -> LuaResult<usize> {
        let released = self.scene_mut()?.drain_released_callbacks();
        for id in &released {
            self.forget_callback(lua, *id)?;
        }
        Ok(released.len())
    }
}

/// Fetches the shared app data.
pub(super) fn app_data(lua: &Lua) -> LuaResult<mlua::AppDataRef<'_, LuaAppData>> {
    lua.app_data_ref::<LuaAppData>()
        .ok_or_else(|| LuaError::runtime("LuaAppData not found"))
}

/// Converts an engine error into a Lua runtime error.
pub(super) fn lua_error(e: impl Display) -> LuaError {
    LuaError::runtime(e.to_string())
}

/// Joins path segments with `/`, dropping empty segments and duplicate
/// separators.
pub fn join_path(parts: &[String]) -> String {
    let absolute = parts
        .iter()
        .find(|p| !p.is_empty())
        .is_some_and(|p| p.starts_with('/'));
    let joined = parts
        .iter()
        .flat_map(|p| p.split('/'))
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("/");
    if absolute {
        format!("/{joined}")
    } else {
        joined
    }
}

/// Resource holding the Lua interpreter state.
///
/// This is a `NonSend` resource because the Lua state is not thread-safe.
/// It should be initialized once at startup and reused throughout the game.
pub struct LuaRuntime {
    lua: Lua,
}

/// Registers a Lua function that pushes a command to a queue in `LuaAppData`.
macro_rules! register_cmd {
    ($engine:expr, $lua:expr, $name:expr, $queue:ident,
     |$args:pat_param| $arg_ty:ty, $cmd:expr) => {
        $engine.set(
            $name,
            $lua.create_function(|lua, $args: $arg_ty| {
                lua.app_data_ref::<LuaAppData>()
                    .ok_or_else(|| LuaError::runtime("LuaAppData not found"))?
                    .$queue
                    .borrow_mut()
                    .push($cmd);
                Ok(())
            })?,
        )?;
    };
}

impl LuaRuntime {
    /// Creates a new Lua runtime wired to the shared engine state and
    /// registers the `engine` API.
    ///
    /// # Errors
    ///
    /// Returns an error if Lua initialization or API registration fails.
    pub fn new(
        scene: SharedScene,
        palettes: SharedPalettes,
        loader: SharedLoader,
        config: GameConfig,
    ) -> LuaResult<Self> {
        let lua = Lua::new();

        lua.set_app_data(LuaAppData {
            engine_commands: RefCell::new(Vec::new()),
            snapshot: Cell::new(EngineSnapshot::default()),
            config: RefCell::new(config),
            scene,
            palettes,
            loader,
            callbacks: RefCell::new(FxHashMap::default()),
            next_callback: Cell::new(0),
        });

        let runtime = Self { lua };
        runtime.register_base_api()?;
        runtime.register_engine_api()?;
        runtime.register_loader_api()?;
        runtime.register_scene_api()?;
        runtime.register_input_api()?;
        runtime.register_util_api()?;
        meta::register(&runtime.lua)?;

        Ok(runtime)
    }

    /// Registers the base `engine` table with logging functions.
    fn register_base_api(&self) -> LuaResult<()> {
        let engine = self.lua.create_table()?;

        // engine.log(message) - General purpose logging
        engine.set(
            "log",
            self.lua.create_function(|_, msg: String| {
                info!(target: "lua", "{}", msg);
                Ok(())
            })?,
        )?;

        engine.set(
            "log_info",
            self.lua.create_function(|_, msg: String| {
                info!(target: "lua", "{}", msg);
                Ok(())
            })?,
        )?;

        engine.set(
            "log_warn",
            self.lua.create_function(|_, msg: String| {
                warn!(target: "lua", "{}", msg);
                Ok(())
            })?,
        )?;

        engine.set(
            "log_error",
            self.lua.create_function(|_, msg: String| {
                error!(target: "lua", "{}", msg);
                Ok(())
            })?,
        )?;

        engine.set(
            "log_debug",
            self.lua.create_function(|_, msg: String| {
                debug!(target: "lua", "{}", msg);
                Ok(())
            })?,
        )?;

        self.lua.globals().set("engine", engine)?;
        Ok(())
    }

    /// Registers engine mode and lifecycle functions.
    fn register_engine_api(&self) -> LuaResult<()> {
        let engine: LuaTable = self.lua.globals().get("engine")?;

        register_cmd!(engine, self.lua, "set_boot_text", engine_commands,
            |text| String, EngineCmd::SetBootText { text });
        register_cmd!(engine, self.lua, "shutdown", engine_commands,
            |()| (), EngineCmd::Shutdown);
        register_cmd!(engine, self.lua, "exit_boot_mode", engine_commands,
            |()| (), EngineCmd::SetEngineMode { mode: EngineMode::Game });

        // engine.set_engine_mode("boot" | "game")
        engine.set(
            "set_engine_mode",
            self.lua.create_function(|lua, mode: String| {
                let mode = mode.parse::<EngineMode>().map_err(LuaError::runtime)?;
                app_data(lua)?
                    .engine_commands
                    .borrow_mut()
                    .push(EngineCmd::SetEngineMode { mode });
                Ok(())
            })?,
        )?;

        // engine.get_engine_mode() -> "boot" | "game"
        engine.set(
            "get_engine_mode",
            self.lua.create_function(|lua, ()| {
                Ok(app_data(lua)?.snapshot.get().mode.as_str())
            })?,
        )?;

        Ok(())
    }

    /// Registers resource provider and raw resource access functions.
    fn register_loader_api(&self) -> LuaResult<()> {
        let engine: LuaTable = self.lua.globals().get("engine")?;

        // engine.add_loader_provider(kind, path)
        engine.set(
            "add_loader_provider",
            self.lua
                .create_function(|lua, (kind, path): (String, String)| {
                    let data = app_data(lua)?;
                    match kind.as_str() {
                        "filesystem" => {
                            let root = data
                                .config
                                .borrow()
                                .root_path
                                .join(path.trim_start_matches('/'));
                            data.loader_mut()?
                                .add_provider(Box::new(FileSystemProvider::new(root)));
                            Ok(())
                        }
                        "mpq" => {
                            let archive = data
                                .config
                                .borrow()
                                .root_path
                                .join(path.trim_start_matches('/'));
                            let provider = ArchiveProvider::open_mpq(&archive).map_err(lua_error)?;
                            data.loader_mut()?.add_provider(Box::new(provider));
                            Ok(())
                        }
                        other => Err(LuaError::runtime(format!("unknown loader type: {other}"))),
                    }
                })?,
        )?;

        // engine.load_string(path) -> string
        engine.set(
            "load_string",
            self.lua.create_function(|lua, path: String| {
                app_data(lua)?.loader()?.load_string(&path).map_err(lua_error)
            })?,
        )?;

        Ok(())
    }

    /// Registers palette, sprite, label and root node access.
    fn register_scene_api(&self) -> LuaResult<()> {
        let engine: LuaTable = self.lua.globals().get("engine")?;

        // engine.load_palette(name, path)
        engine.set(
            "load_palette",
            self.lua
                .create_function(|lua, (name, path): (String, String)| {
                    let data = app_data(lua)?;
                    let loader = data.loader()?;
                    data.palettes_mut()?
                        .load_palette(&loader, &name, &path)
                        .map_err(lua_error)
                })?,
        )?;

        // engine.load_sprite(path, palette) -> Sprite
        engine.set(
            "load_sprite",
            self.lua
                .create_function(|lua, (path, palette): (String, String)| {
                    let data = app_data(lua)?;
                    let sprite = {
                        let loader = data.loader()?;
                        let palettes = data.palettes()?;
                        Sprite::load(&loader, &path, &palette, &palettes).map_err(lua_error)?
                    };
                    let mut scene = data.scene_mut()?;
                    let id = scene.insert(sprite);
                    debug!("Loaded sprite {} as node {}", path, id);
                    LuaSprite::new(&scene, id)
                })?,
        )?;

        // engine.load_label(font_path, palette) -> Label
        engine.set(
            "load_label",
            self.lua
                .create_function(|lua, (font, palette): (String, String)| {
                    let data = app_data(lua)?;
                    let label = {
                        let loader = data.loader()?;
                        let palettes = data.palettes()?;
                        Label::load(&loader, &font, &palette, &palettes).map_err(lua_error)?
                    };
                    let mut scene = data.scene_mut()?;
                    let id = scene.insert(label);
                    LuaLabel::new(&scene, id)
                })?,
        )?;

        // engine.create_node() -> Node
        engine.set(
            "create_node",
            self.lua.create_function(|lua, ()| {
                let data = app_data(lua)?;
                let mut scene = data.scene_mut()?;
                let id = scene.create_node();
                LuaNode::new(&scene, id)
            })?,
        )?;

        // engine.get_root_node() -> Node
        engine.set(
            "get_root_node",
            self.lua.create_function(|lua, ()| {
                let data = app_data(lua)?;
                let scene = data.scene()?;
                LuaNode::new(&scene, scene.root())
            })?,
        )?;

        // engine.get_node(id) -> Node | Sprite | Label | nil
        engine.set(
            "get_node",
            self.lua.create_function(|lua, id: u64| {
                let data = app_data(lua)?;
                let scene = data.scene()?;
                handle_value(lua, &scene, crate::scene::NodeId::from_raw(id))
            })?,
        )?;

        Ok(())
    }

    /// Registers cursor reads.
    fn register_input_api(&self) -> LuaResult<()> {
        let engine: LuaTable = self.lua.globals().get("engine")?;

        // engine.get_mouse_position() -> x, y
        engine.set(
            "get_mouse_position",
            self.lua.create_function(|lua, ()| {
                let cursor = app_data(lua)?.snapshot.get().cursor;
                Ok((cursor.x, cursor.y))
            })?,
        )?;

        // engine.is_mouse_down() -> boolean
        engine.set(
            "is_mouse_down",
            self.lua.create_function(|lua, ()| {
                Ok(app_data(lua)?.snapshot.get().cursor.button_down)
            })?,
        )?;

        Ok(())
    }

    /// Registers settings access and string helpers.
    fn register_util_api(&self) -> LuaResult<()> {
        let engine: LuaTable = self.lua.globals().get("engine")?;

        // engine.get_setting(name) -> string | nil
        engine.set(
            "get_setting",
            self.lua.create_function(|lua, name: String| {
                Ok(app_data(lua)?.config.borrow().setting(&name))
            })?,
        )?;

        // engine.join_path(...) -> string
        engine.set(
            "join_path",
            self.lua.create_function(|_, parts: LuaVariadic<String>| {
                Ok(join_path(&parts))
            })?,
        )?;

        // engine.split_string(text, separator) -> string[]
        engine.set(
            "split_string",
            self.lua
                .create_function(|_, (text, separator): (String, String)| {
                    if separator.is_empty() {
                        return Err(LuaError::runtime("separator must not be empty"));
                    }
                    Ok(text
                        .split(separator.as_str())
                        .map(String::from)
                        .collect::<Vec<_>>())
                })?,
        )?;

        Ok(())
    }

    /// Drains all queued engine commands.
    pub fn drain_engine_commands(&self) -> Vec<EngineCmd> {
        self.lua
            .app_data_ref::<LuaAppData>()
            .map(|data| data.engine_commands.borrow_mut().drain(..).collect())
            .unwrap_or_default()
    }

    /// Updates the cached cursor and mode that Lua can read.
    /// Call this before invoking Lua callbacks so they have fresh data.
    pub fn update_snapshot(&self, snapshot: EngineSnapshot) {
        if let Some(data) = self.lua.app_data_ref::<LuaAppData>() {
            data.snapshot.set(snapshot);
        }
    }

    /// Replaces the settings visible to scripts.
    pub fn set_config(&self, config: &GameConfig) {
        if let Some(data) = self.lua.app_data_ref::<LuaAppData>() {
            *data.config.borrow_mut() = config.clone();
        }
    }

    /// Invokes the script function behind a pointer event, passing the
    /// sprite as the only argument. Unknown callbacks are ignored.
    pub fn call_pointer_handler(&self, event: &PointerEvent) -> LuaResult<()> {
        let func: Option<LuaFunction> = {
            let data = app_data(&self.lua)?;
            let callbacks = data.callbacks.borrow();
            match callbacks.get(&event.callback) {
                Some(key) => Some(self.lua.registry_value(key)?),
                None => None,
            }
        };
        let Some(func) = func else {
            return Ok(());
        };
        let sprite = {
            let data = app_data(&self.lua)?;
            let scene = data.scene()?;
            LuaSprite::new(&scene, event.node)?
        };
        func.call::<()>(sprite)
    }

    /// Drops script callbacks that no node references any more.
    pub fn release_callbacks(&self) -> LuaResult<usize> {
        app_data(&self.lua)?.release_dropped_callbacks(&self.lua)
    }

    /// Number of live pointer callbacks.
    pub fn callback_count(&self) -> usize {
        self.lua
            .app_data_ref::<LuaAppData>()
            .map(|data| data.callbacks.borrow().len())
            .unwrap_or(0)
    }

    /// Loads and executes a Lua script through the resource loader.
    ///
    /// # Errors
    ///
    /// Returns an error if the resource cannot be found or the script has
    /// syntax/runtime errors.
    pub fn run_script(&self, path: &str) -> LuaResult<()> {
        let source = app_data(&self.lua)?
            .loader()?
            .load_string(path)
            .map_err(lua_error)?;
        info!("Running script {}", path);
        self.run_source(&source, path)
    }

    /// Executes Lua source text under the given chunk name.
    pub fn run_source(&self, source: &str, name: &str) -> LuaResult<()> {
        self.lua.load(source).set_name(name).exec()
    }

    /// Calls a global Lua function by name with the given arguments.
    ///
    /// # Errors
    ///
    /// Returns an error if the function doesn't exist or execution fails.
    pub fn call_function<A, R>(&self, name: &str, args: A) -> LuaResult<R>
    where
        A: IntoLuaMulti,
        R: FromLuaMulti,
    {
        let func: LuaFunction = self.lua.globals().get(name)?;
        func.call(args)
    }

    /// Checks if a global function exists.
    pub fn has_function(&self, name: &str) -> bool {
        self.lua.globals().get::<LuaFunction>(name).is_ok()
    }

    /// Returns a reference to the underlying Lua state.
    pub fn lua(&self) -> &Lua {
        &self.lua
    }
}

impl Default for LuaRuntime {
    fn default() -> Self {
        Self::new(
            SharedScene::default(),
            SharedPalettes::default(),
            SharedLoader::new(Loader::new()),
            GameConfig::new(),
        )
        .expect("Failed to create Lua runtime")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_path() {
        let parts = |v: &[&str]| v.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        assert_eq!(join_path(&parts(&["/data", "global/", "/ui"])), "/data/global/ui");
        assert_eq!(join_path(&parts(&["data", "", "x.dc6"])), "data/x.dc6");
        assert_eq!(join_path(&parts(&[])), "");
    }

    #[test]
    fn test_commands_are_queued() {
        let runtime = LuaRuntime::default();
        runtime
            .run_source(
                r#"
                engine.set_boot_text("Loading...")
                engine.set_engine_mode("game")
                engine.shutdown()
                "#,
                "test",
            )
            .unwrap();
        assert_eq!(
            runtime.drain_engine_commands(),
            vec![
                EngineCmd::SetBootText { text: "Loading...".into() },
                EngineCmd::SetEngineMode { mode: EngineMode::Game },
                EngineCmd::Shutdown,
            ]
        );
        assert!(runtime.drain_engine_commands().is_empty());
    }

    #[test]
    fn test_bad_engine_mode_is_error() {
        let runtime = LuaRuntime::default();
        assert!(runtime.run_source(r#"engine.set_engine_mode("paused")"#, "test").is_err());
    }

    #[test]
    fn test_snapshot_reads() {
        let runtime = LuaRuntime::default();
        runtime.update_snapshot(EngineSnapshot::new(
            crate::resources::cursor::CursorState::new(12, 34, true),
            EngineMode::Game,
        ));
        let (x, y, down, mode): (i32, i32, bool, String) = runtime
            .lua()
            .load(
                r#"
                local x, y = engine.get_mouse_position()
                return x, y, engine.is_mouse_down(), engine.get_engine_mode()
                "#,
            )
            .eval()
            .unwrap();
        assert_eq!((x, y, down, mode.as_str()), (12, 34, true, "game"));
    }

    #[test]
    fn test_mpq_provider_is_refused() {
        let runtime = LuaRuntime::default();
        let err = runtime
            .run_source(r#"engine.add_loader_provider("mpq", "d2data.mpq")"#, "test")
            .unwrap_err();
        assert!(err.to_string().contains("MPQ"));
    }
}
