//! Virtual filesystem over an ordered list of resource providers.
//!
//! A [`Loader`] resolves logical paths such as
//! `/data/local/font/{LANG}/font16` against its providers in insertion order.
//! The first provider reporting that a path exists serves it, so patch
//! archives added first shadow base archives added later, and a plain
//! directory added last acts as fallback.
//!
//! Path normalisation happens once, before any provider is queried:
//! backslashes become forward slashes, one leading slash is stripped and
//! the `{LANG}` token is replaced with the active language code.

pub mod archive;
pub mod filesystem;

use std::cell::RefCell;
use std::io::{self, Read, Seek};
use std::path::Path;
use std::rc::{Rc, Weak};

use log::{debug, info, warn};
use thiserror::Error;

pub use archive::{Archive, ArchiveProvider, MemoryArchive, MpqArchive};
pub use filesystem::FileSystemProvider;

pub const LANGUAGE_TOKEN: &str = "{LANG}";
pub const DEFAULT_LANGUAGE: &str = "eng";

/// A seekable byte stream handed out by providers.
pub trait ReadSeek: Read + Seek {}
impl<T: Read + Seek> ReadSeek for T {}

pub type ResourceStream = Box<dyn ReadSeek>;

#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("empty resource path")]
    EmptyPath,
    #[error("file not found: {0:?}")]
    NotFound(String),
    #[error("failed to read {path:?}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("cannot open archive {path:?}: {message}")]
    Archive { path: String, message: String },
}

/// A pluggable source of named byte resources.
pub trait ResourceProvider {
    /// Human-readable provider name, used in logs.
    fn name(&self) -> &str;
    /// Whether `path` (already normalised) can be served.
    fn exists(&self, path: &str) -> bool;
    /// Opens `path` (already normalised).
    fn load(&self, path: &str) -> Result<ResourceStream, LoaderError>;
}

/// Supplies the language code substituted for `{LANG}`.
pub trait LanguageSource {
    fn language_code(&self) -> String;
}

/// A language code that can be changed at runtime.
#[derive(Debug)]
pub struct LanguageCode(RefCell<String>);

impl LanguageCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(RefCell::new(code.into()))
    }

    pub fn set(&self, code: impl Into<String>) {
        *self.0.borrow_mut() = code.into();
    }
}

impl LanguageSource for LanguageCode {
    fn language_code(&self) -> String {
        self.0.borrow().clone()
    }
}

pub struct Loader {
    providers: Vec<Box<dyn ResourceProvider>>,
    language: Weak<dyn LanguageSource>,
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

impl Loader {
    /// Creates a loader without a language source; `{LANG}` resolves to
    /// [`DEFAULT_LANGUAGE`].
    pub fn new() -> Self {
        let language: Weak<dyn LanguageSource> = Weak::<LanguageCode>::new();
        Self {
            providers: Vec::new(),
            language,
        }
    }

    /// Creates a loader that reads the language code from `source` for as
    /// long as it is alive.
    pub fn with_language(source: &Rc<dyn LanguageSource>) -> Self {
        Self {
            providers: Vec::new(),
            language: Rc::downgrade(source),
        }
    }

    /// Appends a provider. Earlier providers take priority.
    pub fn add_provider(&mut self, provider: Box<dyn ResourceProvider>) {
        info!("Registered resource provider: {}", provider.name());
        self.providers.push(provider);
    }

    /// Mounts the configured archives found under `root`, in order, followed
    /// by `root` itself as the filesystem fallback. Archives that cannot be
    /// opened are logged and skipped; their errors are returned.
    pub fn mount_game_data(&mut self, root: &Path, archives: &[String]) -> Vec<LoaderError> {
        let mut skipped = Vec::new();
        for name in archives {
            match ArchiveProvider::open_mpq(root.join(name)) {
                Ok(provider) => self.add_provider(Box::new(provider)),
                Err(e) => {
                    warn!("Skipping archive {}: {}", name, e);
                    skipped.push(e);
                }
            }
        }
        self.add_provider(Box::new(FileSystemProvider::new(root)));
        skipped
    }

    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    pub fn language_code(&self) -> String {
        self.language
            .upgrade()
            .map(|source| source.language_code())
            .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string())
    }

    /// Applies the path rules described in the module docs.
    pub fn normalize_path(&self, path: &str) -> String {
        let path = path.replace('\\', "/");
        let path = path.strip_prefix('/').unwrap_or(&path);
        path.replace(LANGUAGE_TOKEN, &self.language_code())
    }

    pub fn exists(&self, path: &str) -> bool {
        if path.is_empty() {
            return false;
        }
        let path = self.normalize_path(path);
        self.providers.iter().any(|p| p.exists(&path))
    }

    /// Opens the first match for `path` among the providers.
    pub fn load(&self, path: &str) -> Result<ResourceStream, LoaderError> {
        if path.trim().is_empty() {
            return Err(LoaderError::EmptyPath);
        }
        let normalized = self.normalize_path(path);
        for provider in &self.providers {
            if provider.exists(&normalized) {
                debug!("{} serves {:?}", provider.name(), normalized);
                return provider.load(&normalized);
            }
        }
        Err(LoaderError::NotFound(normalized))
    }

    /// Reads the whole resource into memory.
    pub fn load_bytes(&self, path: &str) -> Result<Vec<u8>, LoaderError> {
        let mut stream = self.load(path)?;
        let mut bytes = Vec::new();
        stream
            .read_to_end(&mut bytes)
            .map_err(|source| LoaderError::Io {
                path: path.to_string(),
                source,
            })?;
        Ok(bytes)
    }

    /// Reads the whole resource as UTF-8 text (lossy).
    pub fn load_string(&self, path: &str) -> Result<String, LoaderError> {
        let bytes = self.load_bytes(path)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path_rules() {
        let loader = Loader::new();
        assert_eq!(
            loader.normalize_path(r"\data\local\{LANG}\font16"),
            "data/local/eng/font16"
        );
        // only one leading slash is stripped
        assert_eq!(loader.normalize_path("//data"), "/data");
    }

    #[test]
    fn test_language_source_is_weak() {
        let source: Rc<dyn LanguageSource> = Rc::new(LanguageCode::new("deu"));
        let loader = Loader::with_language(&source);
        assert_eq!(loader.normalize_path("{LANG}/x"), "deu/x");
        drop(source);
        assert_eq!(loader.normalize_path("{LANG}/x"), "eng/x");
    }

    #[test]
    fn test_empty_path_is_error() {
        let loader = Loader::new();
        assert!(matches!(loader.load(""), Err(LoaderError::EmptyPath)));
        assert!(!loader.exists(""));
    }

    #[test]
    fn test_earlier_providers_shadow_later_ones() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("data/global")).unwrap();
        std::fs::write(dir.path().join("data/global/shared.txt"), b"filesystem").unwrap();
        std::fs::write(dir.path().join("data/global/loose.txt"), b"loose").unwrap();

        let mut loader = Loader::new();
        loader.add_provider(Box::new(ArchiveProvider::with_name(
            "patch",
            MemoryArchive::new().with_entry(r"data\global\shared.txt", b"patch".to_vec()),
        )));
        loader.add_provider(Box::new(ArchiveProvider::with_name(
            "base",
            MemoryArchive::new()
                .with_entry(r"data\global\shared.txt", b"base".to_vec())
                .with_entry(r"data\global\base.txt", b"base only".to_vec()),
        )));
        loader.add_provider(Box::new(FileSystemProvider::new(dir.path())));

        assert_eq!(loader.provider_names(), vec!["patch", "base", "FileSystem Loader"]);
        assert_eq!(loader.load_string("/data/global/shared.txt").unwrap(), "patch");
        assert_eq!(loader.load_string(r"\data\global\base.txt").unwrap(), "base only");
        assert_eq!(loader.load_string("/data/global/loose.txt").unwrap(), "loose");
    }

    #[test]
    fn test_mount_game_data_skips_unreadable_archives() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("broken.mpq"), b"not an archive").unwrap();
        std::fs::write(dir.path().join("readme.txt"), b"fallback").unwrap();

        let mut loader = Loader::new();
        let skipped = loader.mount_game_data(
            dir.path(),
            &["broken.mpq".to_string(), "missing.mpq".to_string()],
        );
        assert_eq!(skipped.len(), 2);
        assert!(skipped.iter().all(|e| matches!(e, LoaderError::Archive { .. })));
        assert_eq!(loader.provider_names(), vec!["FileSystem Loader"]);
        assert_eq!(loader.load_string("/readme.txt").unwrap(), "fallback");
    }

    #[test]
    fn test_not_found_reports_normalized_path() {
        let loader = Loader::new();
        let err = loader.load(r"\missing\file.dc6").err().unwrap();
        assert_eq!(err.to_string(), "file not found: \"missing/file.dc6\"");
    }
}
