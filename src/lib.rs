//! Abyss Engine library.
//!
//! This module exposes the engine's file formats, resource loader, scene
//! tree, renderer seam, resources, systems and events for use in
//! integration tests and as a reusable library.

pub mod events;
pub mod formats;
pub mod luarc_generator;
pub mod render;
pub mod resources;
pub mod scene;
pub mod stub_generator;
pub mod systems;
