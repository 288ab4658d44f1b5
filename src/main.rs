//! Abyss Engine main entry point.
//!
//! A runtime for Diablo II-era game assets written in Rust using:
//! - **raylib** for windowing and graphics
//! - **bevy_ecs** for the frame schedule and engine resources
//! - **mlua + LuaJIT** for game logic scripting
//!
//! The engine itself has no game logic. It mounts a virtual file system,
//! then runs a bootstrap script that registers resource providers, loads
//! palettes and builds the scene tree out of sprites and labels.
//!
//! # Project Structure
//!
//! - [`formats`] – decoders for DAT palettes, DC6/DCC sprites and TBL fonts
//! - [`render`] – texture backend seam, draw list, raylib backend
//! - [`scene`] – node tree, sprite and label nodes
//! - [`events`] – messages (pointer events)
//! - [`resources`] – loader, palettes, config, Lua runtime and other state
//! - [`systems`] – ECS systems (cursor, scene update, pointer dispatch, rendering)
//!
//! # Main Loop
//!
//! 1. Load `config.ini`, open the window, create the render surface
//! 2. Mount the root path as a filesystem provider and run the bootstrap script
//! 3. Each frame:
//!    - Map the cursor into render-surface pixels
//!    - Update the scene: compose textures, hit-test sprites, sweep removed nodes
//!    - Deliver pointer events to Lua callbacks and apply queued engine commands
//!    - Render the scene (or the boot text) and scale it into the window
//! 4. Release GPU textures on exit
//!
//! # Running
//!
//! ```sh
//! cargo run --release -- --config ./config.ini
//! ```

// Do not create console on Windows
#![cfg_attr(target_os = "windows", windows_subsystem = "windows")]

mod events;
mod formats;
mod luarc_generator;
mod render;
mod resources;
mod scene;
mod stub_generator;
mod systems;

use crate::events::pointer::PointerEvent;
use crate::render::RaylibBackend;
use crate::resources::cursor::CursorState;
use crate::resources::enginestate::EngineState;
use crate::resources::gameconfig::GameConfig;
use crate::resources::loader::{LanguageCode, LanguageSource, Loader};
use crate::resources::lua_runtime::LuaRuntime;
use crate::resources::shared::{SharedLoader, SharedPalettes, SharedScene};
use crate::resources::surface::{RenderSurface, WindowSize};
use crate::systems::cursor::update_cursor_state;
use crate::systems::engine::{process_engine_commands, update_lua_snapshot};
use crate::systems::pointer::pointer_dispatch_system;
use crate::systems::render::render_system;
use crate::systems::scene::{in_game_mode, scene_update_system, update_pointer_messages};
use bevy_ecs::prelude::*;
use clap::Parser;
use log::{error, info, warn};
use std::path::PathBuf;
use std::rc::Rc;

/// Abyss Engine
#[derive(Parser)]
#[command(version, about = "A scriptable runtime for Diablo II-era game assets.")]
struct Cli {
    /// Path to the configuration file.
    #[arg(long, value_name = "PATH", default_value = "./config.ini")]
    config: PathBuf,

    /// Generate Lua LSP stubs from engine metadata and exit.
    /// Optionally provide a path (default: scripts/engine.lua).
    #[arg(long, value_name = "PATH")]
    create_lua_stubs: Option<Option<PathBuf>>,

    /// Generate .luarc.json for Lua Language Server and exit.
    /// Optionally provide a path (default: scripts/.luarc.json).
    #[arg(long, value_name = "PATH")]
    create_luarc: Option<Option<PathBuf>>,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    // Early-exit: generate Lua stubs and quit (no window needed)
    if let Some(maybe_path) = cli.create_lua_stubs {
        let path = maybe_path.unwrap_or_else(|| PathBuf::from("scripts/engine.lua"));
        let runtime = LuaRuntime::default();
        match stub_generator::generate_stubs(&runtime) {
            Ok(content) => {
                if let Err(e) = stub_generator::write_stubs(&path, &content) {
                    eprintln!("Error: {e}");
                    std::process::exit(1);
                }
                println!("Lua stubs written to {}", path.display());
            }
            Err(e) => {
                eprintln!("Error generating stubs: {e}");
                std::process::exit(1);
            }
        }
        return;
    }

    // Early-exit: generate .luarc.json and quit (no window needed)
    if let Some(maybe_path) = cli.create_luarc {
        let path = maybe_path.unwrap_or_else(|| PathBuf::from("scripts/.luarc.json"));
        let runtime = LuaRuntime::default();
        match luarc_generator::generate_luarc(&runtime, "engine.lua") {
            Ok(content) => {
                if let Err(e) = luarc_generator::write_luarc(&path, &content) {
                    eprintln!("Error: {e}");
                    std::process::exit(1);
                }
                println!(".luarc.json written to {}", path.display());
            }
            Err(e) => {
                eprintln!("Error generating .luarc.json: {e}");
                std::process::exit(1);
            }
        }
        return;
    }

    info!("Abyss Engine starting");
    let mut config = GameConfig::with_path(&cli.config);
    if let Err(e) = config.load_from_file() {
        warn!("{}; using defaults", e);
    }

    // --------------- Raylib window ---------------
    let mut builder = raylib::init();
    builder
        .size(config.window_width as i32, config.window_height as i32)
        .resizable()
        .title("Abyss Engine");
    if config.vsync {
        builder.vsync();
    }
    if config.fullscreen {
        builder.fullscreen();
    }
    let (mut rl, thread) = builder.build();
    rl.set_target_fps(config.target_fps);
    // Disable ESC to exit
    rl.set_exit_key(None);

    // --------------- Render surface & palette shader ---------------
    let (render_width, render_height) = config.render_size();
    let surface = RenderSurface::new(&mut rl, &thread, render_width, render_height)
        .expect("Failed to create render surface");
    let backend = RaylibBackend::new(&mut rl, &thread).expect("Failed to create palette shader");

    // --------------- Loader ---------------
    // The loader only holds a weak reference; this keeps the language alive.
    let language: Rc<dyn LanguageSource> = Rc::new(LanguageCode::new(config.language.clone()));
    let mut loader = Loader::with_language(&language);
    loader.mount_game_data(&config.root_path, &config.archives);

    let scene = SharedScene::default();
    let palettes = SharedPalettes::default();
    let loader = SharedLoader::new(loader);

    // --------------- Lua runtime & bootstrap ---------------
    let lua_runtime = LuaRuntime::new(
        scene.clone(),
        palettes.clone(),
        loader.clone(),
        config.clone(),
    )
    .expect("Failed to create Lua runtime");
    if let Err(e) = lua_runtime.run_script(&config.bootstrap) {
        error!("Failed to run bootstrap script {}: {}", config.bootstrap, e);
    }

    // --------------- ECS world + resources ---------------
    let mut world = World::new();
    world.insert_resource(WindowSize {
        w: rl.get_screen_width(),
        h: rl.get_screen_height(),
    });
    world.insert_resource(CursorState::default());
    world.insert_resource(EngineState::new());
    world.insert_resource(config);
    world.insert_resource(Messages::<PointerEvent>::default());

    world.insert_non_send_resource(scene.clone());
    world.insert_non_send_resource(palettes.clone());
    world.insert_non_send_resource(loader);
    world.insert_non_send_resource(lua_runtime);
    world.insert_non_send_resource(surface);
    world.insert_non_send_resource(backend);
    world.insert_non_send_resource(rl);
    world.insert_non_send_resource(thread);

    let mut update = Schedule::default();
    update.add_systems(
        (
            update_pointer_messages,
            update_cursor_state,
            update_lua_snapshot,
            scene_update_system::<RaylibBackend>.run_if(in_game_mode),
            pointer_dispatch_system,
            // Commands queued by the bootstrap or by pointer handlers
            process_engine_commands,
            render_system,
        )
            .chain(),
    );

    update
        .initialize(&mut world)
        .expect("Failed to initialize schedule");

    // --------------- Main loop ---------------
    while !world
        .non_send_resource::<raylib::RaylibHandle>()
        .window_should_close()
        && !world.resource::<EngineState>().shutdown_requested()
    {
        update.run(&mut world);

        world.clear_trackers();

        // Update window size each frame (may change due to resize)
        let (new_w, new_h) = {
            let rl = world.non_send_resource::<raylib::RaylibHandle>();
            (rl.get_screen_width(), rl.get_screen_height())
        };
        {
            let mut window_size = world.resource_mut::<WindowSize>();
            window_size.w = new_w;
            window_size.h = new_h;
        }
    }

    // --------------- Shutdown ---------------
    // GPU resources go before the window does.
    if let Some(mut backend) = world.remove_non_send_resource::<RaylibBackend>() {
        scene.0.borrow_mut().release_all(&mut backend);
        palettes.0.borrow_mut().release_all(&mut backend);
        info!("Released textures, {} left", backend.texture_count());
    }
    drop(world.remove_non_send_resource::<RenderSurface>());
    info!("Abyss Engine stopped");
}
