//! Engine systems.
//!
//! This module groups all ECS systems that make up one frame. In schedule
//! order:
//!
//! - [`cursor`] – read the mouse and map it into render-surface pixels
//! - [`engine`] – refresh the script snapshot and apply queued engine commands
//! - [`scene`] – compose textures, hit-test sprites, sweep removed nodes
//! - [`pointer`] – deliver pointer events to script callbacks
//! - [`render`] – draw the scene into the render surface and the surface to the window

pub mod cursor;
pub mod engine;
pub mod pointer;
pub mod render;
pub mod scene;
