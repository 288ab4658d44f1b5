//! Engine configuration resource.
//!
//! Settings are read from an INI file at startup. Every key is optional;
//! anything missing keeps its default, and a missing file leaves the whole
//! configuration at defaults.
//!
//! # Configuration File Format
//!
//! ```ini
//! [engine]
//! root_path = .
//! language = eng
//! archives = patch_d2.mpq,d2exp.mpq,d2data.mpq
//! bootstrap = /data/global/scripts/main.lua
//!
//! [render]
//! width = 800
//! height = 600
//!
//! [window]
//! width = 1024
//! height = 768
//! fullscreen = false
//! vsync = true
//! target_fps = 60
//! ```

use bevy_ecs::prelude::*;
use configparser::ini::Ini;
use log::info;
use std::path::PathBuf;

const DEFAULT_ROOT_PATH: &str = ".";
const DEFAULT_LANGUAGE: &str = "eng";
const DEFAULT_BOOTSTRAP: &str = "/bootstrap.lua";
const DEFAULT_RENDER_WIDTH: u32 = 800;
const DEFAULT_RENDER_HEIGHT: u32 = 600;
const DEFAULT_WINDOW_WIDTH: u32 = 1024;
const DEFAULT_WINDOW_HEIGHT: u32 = 768;
const DEFAULT_TARGET_FPS: u32 = 60;
const DEFAULT_VSYNC: bool = true;
const DEFAULT_FULLSCREEN: bool = false;
const DEFAULT_CONFIG_PATH: &str = "./config.ini";

/// Names accepted by [`GameConfig::setting`].
pub const SETTING_NAMES: [&str; 11] = [
    "root_path",
    "language",
    "archives",
    "bootstrap",
    "render_width",
    "render_height",
    "window_width",
    "window_height",
    "target_fps",
    "vsync",
    "fullscreen",
];

#[derive(Resource, Debug, Clone)]
pub struct GameConfig {
    /// Directory holding the game data; filesystem providers resolve
    /// relative paths against it.
    pub root_path: PathBuf,
    /// Substituted for `{LANG}` in resource paths.
    pub language: String,
    /// Archive files, in lookup priority order.
    pub archives: Vec<String>,
    /// Script run once the loader is set up, resolved through the loader.
    pub bootstrap: String,
    /// Internal render width in pixels.
    pub render_width: u32,
    /// Internal render height in pixels.
    pub render_height: u32,
    pub window_width: u32,
    pub window_height: u32,
    pub target_fps: u32,
    pub vsync: bool,
    pub fullscreen: bool,
    /// Path to the configuration file.
    pub config_path: PathBuf,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl GameConfig {
    /// Create a new configuration with safe default values.
    pub fn new() -> Self {
        Self {
            root_path: PathBuf::from(DEFAULT_ROOT_PATH),
            language: DEFAULT_LANGUAGE.to_string(),
            archives: Vec::new(),
            bootstrap: DEFAULT_BOOTSTRAP.to_string(),
            render_width: DEFAULT_RENDER_WIDTH,
            render_height: DEFAULT_RENDER_HEIGHT,
            window_width: DEFAULT_WINDOW_WIDTH,
            window_height: DEFAULT_WINDOW_HEIGHT,
            target_fps: DEFAULT_TARGET_FPS,
            vsync: DEFAULT_VSYNC,
            fullscreen: DEFAULT_FULLSCREEN,
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
        }
    }

    /// Create a new configuration with a custom config file path.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
            ..Self::new()
        }
    }

    /// Load configuration from the INI file.
    ///
    /// Missing values retain their current values.
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_file(&mut self) -> Result<(), String> {
        let mut config = Ini::new();
        config
            .load(&self.config_path)
            .map_err(|e| format!("Failed to load config file: {}", e))?;
        self.apply(&config);

        info!(
            "Loaded config: root={:?} lang={} {}x{} render, {}x{} window, fps={}, vsync={}, fullscreen={}",
            self.root_path,
            self.language,
            self.render_width,
            self.render_height,
            self.window_width,
            self.window_height,
            self.target_fps,
            self.vsync,
            self.fullscreen
        );

        Ok(())
    }

    /// Parses INI text, as [`GameConfig::load_from_file`] does for a file.
    pub fn load_from_str(&mut self, text: &str) -> Result<(), String> {
        let mut config = Ini::new();
        config
            .read(text.to_string())
            .map_err(|e| format!("Failed to parse config: {}", e))?;
        self.apply(&config);
        Ok(())
    }

    fn apply(&mut self, config: &Ini) {
        // [engine] section
        if let Some(root) = config.get("engine", "root_path") {
            self.root_path = PathBuf::from(root);
        }
        if let Some(language) = config.get("engine", "language") {
            self.language = language;
        }
        if let Some(archives) = config.get("engine", "archives") {
            self.archives = archives
                .split(',')
                .map(str::trim)
                .filter(|a| !a.is_empty())
                .map(String::from)
                .collect();
        }
        if let Some(bootstrap) = config.get("engine", "bootstrap") {
            self.bootstrap = bootstrap;
        }

        // [render] section
        if let Some(width) = config.getuint("render", "width").ok().flatten() {
            self.render_width = width as u32;
        }
        if let Some(height) = config.getuint("render", "height").ok().flatten() {
            self.render_height = height as u32;
        }

        // [window] section
        if let Some(width) = config.getuint("window", "width").ok().flatten() {
            self.window_width = width as u32;
        }
        if let Some(height) = config.getuint("window", "height").ok().flatten() {
            self.window_height = height as u32;
        }
        if let Some(fps) = config.getuint("window", "target_fps").ok().flatten() {
            self.target_fps = fps as u32;
        }
        if let Some(vsync) = config.getbool("window", "vsync").ok().flatten() {
            self.vsync = vsync;
        }
        if let Some(fullscreen) = config.getbool("window", "fullscreen").ok().flatten() {
            self.fullscreen = fullscreen;
        }
    }

    /// Save configuration to the INI file.
    ///
    /// Creates the file if it doesn't exist.
    pub fn save_to_file(&self) -> Result<(), String> {
        let mut config = Ini::new();

        // [engine] section
        config.set("engine", "root_path", Some(self.root_path.display().to_string()));
        config.set("engine", "language", Some(self.language.clone()));
        config.set("engine", "archives", Some(self.archives.join(",")));
        config.set("engine", "bootstrap", Some(self.bootstrap.clone()));

        // [render] section
        config.set("render", "width", Some(self.render_width.to_string()));
        config.set("render", "height", Some(self.render_height.to_string()));

        // [window] section
        config.set("window", "width", Some(self.window_width.to_string()));
        config.set("window", "height", Some(self.window_height.to_string()));
        config.set("window", "target_fps", Some(self.target_fps.to_string()));
        config.set("window", "vsync", Some(self.vsync.to_string()));
        config.set("window", "fullscreen", Some(self.fullscreen.to_string()));

        config
            .write(&self.config_path)
            .map_err(|e| format!("Failed to save config file: {}", e))?;

        info!("Saved config to {:?}", self.config_path);

        Ok(())
    }

    /// Reads one setting by name, formatted as a string. Used by scripts.
    pub fn setting(&self, name: &str) -> Option<String> {
        let value = match name {
            "root_path" => self.root_path.display().to_string(),
            "language" => self.language.clone(),
            "archives" => self.archives.join(","),
            "bootstrap" => self.bootstrap.clone(),
            "render_width" => self.render_width.to_string(),
            "render_height" => self.render_height.to_string(),
            "window_width" => self.window_width.to_string(),
            "window_height" => self.window_height.to_string(),
            "target_fps" => self.target_fps.to_string(),
            "vsync" => self.vsync.to_string(),
            "fullscreen" => self.fullscreen.to_string(),
            _ => return None,
        };
        Some(value)
    }

    /// Render surface size.
    pub fn render_size(&self) -> (u32, u32) {
        (self.render_width, self.render_height)
    }

    /// Get the window size.
    pub fn window_size(&self) -> (u32, u32) {
        (self.window_width, self.window_height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GameConfig::new();
        assert_eq!(config.render_size(), (800, 600));
        assert_eq!(config.window_size(), (1024, 768));
        assert_eq!(config.target_fps, 60);
        assert_eq!(config.language, "eng");
        assert!(config.archives.is_empty());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut config = GameConfig::new();
        config
            .load_from_str("[engine]\nlanguage = deu\narchives = patch_d2.mpq, d2data.mpq\n[window]\nvsync = false\n")
            .unwrap();
        assert_eq!(config.language, "deu");
        assert_eq!(config.archives, vec!["patch_d2.mpq", "d2data.mpq"]);
        assert!(!config.vsync);
        assert_eq!(config.render_size(), (800, 600));
    }

    #[test]
    fn test_setting_lookup() {
        let config = GameConfig::new();
        assert_eq!(config.setting("render_width").as_deref(), Some("800"));
        assert_eq!(config.setting("fullscreen").as_deref(), Some("false"));
        assert_eq!(config.setting("nonsense"), None);
        assert!(SETTING_NAMES.iter().all(|n| config.setting(n).is_some()));
    }

    #[test]
    fn test_missing_file_is_error() {
        let mut config = GameConfig::with_path("/definitely/not/here.ini");
        assert!(config.load_from_file().is_err());
        assert_eq!(config.target_fps, 60);
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.ini");
        let mut config = GameConfig::with_path(&path);
        config.language = "fra".into();
        config.archives = vec!["a.mpq".into()];
        config.save_to_file().unwrap();

        let mut loaded = GameConfig::with_path(&path);
        loaded.load_from_file().unwrap();
        assert_eq!(loaded.language, "fra");
        assert_eq!(loaded.archives, vec!["a.mpq"]);
    }
}
