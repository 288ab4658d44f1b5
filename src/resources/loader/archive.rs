//! Provider backed by a packed archive.
//!
//! Archive entries use backslash separators, so lookups convert the
//! loader's forward-slash paths before asking the archive. The container
//! parser sits behind the [`Archive`] trait: [`MpqArchive`] reads game MPQ
//! files through `wow-mpq`, [`MemoryArchive`] holds unpacked data and backs
//! the tests.

use std::cell::RefCell;
use std::io::{self, Cursor};
use std::path::{Path, PathBuf};

use log::info;
use rustc_hash::FxHashMap;

use super::{LoaderError, ResourceProvider, ResourceStream};

/// A read-only container of named entries.
pub trait Archive {
    fn contains(&self, path: &str) -> bool;
    fn read(&self, path: &str) -> io::Result<Vec<u8>>;
}

pub struct ArchiveProvider<A: Archive> {
    name: String,
    archive: A,
}

impl<A: Archive> ArchiveProvider<A> {
    pub fn new(archive: A) -> Self {
        Self {
            name: "MPQ Loader".to_string(),
            archive,
        }
    }

    pub fn with_name(name: impl Into<String>, archive: A) -> Self {
        Self {
            name: name.into(),
            archive,
        }
    }

    fn archive_path(path: &str) -> String {
        path.replace('/', "\\")
    }
}

impl ArchiveProvider<MpqArchive> {
    /// Opens an MPQ file from disk.
    pub fn open_mpq(path: impl AsRef<Path>) -> Result<Self, LoaderError> {
        Ok(Self::new(MpqArchive::open(path)?))
    }
}

impl<A: Archive> ResourceProvider for ArchiveProvider<A> {
    fn name(&self) -> &str {
        &self.name
    }

    fn exists(&self, path: &str) -> bool {
        !path.is_empty() && self.archive.contains(&Self::archive_path(path))
    }

    fn load(&self, path: &str) -> Result<ResourceStream, LoaderError> {
        let bytes = self
            .archive
            .read(&Self::archive_path(path))
            .map_err(|source| LoaderError::Io {
                path: path.to_string(),
                source,
            })?;
        Ok(Box::new(Cursor::new(bytes)))
    }
}

/// An MPQ archive opened from disk.
///
/// Reads go through a `RefCell` because the MPQ reader seeks its file
/// handle; providers only ever hand out `&self`.
pub struct MpqArchive {
    path: PathBuf,
    archive: RefCell<wow_mpq::Archive>,
}

impl MpqArchive {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, LoaderError> {
        let path = path.as_ref();
        let archive = wow_mpq::Archive::open(path).map_err(|e| LoaderError::Archive {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        info!("Opened MPQ archive {}", path.display());
        Ok(Self {
            path: path.to_path_buf(),
            archive: RefCell::new(archive),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Archive for MpqArchive {
    fn contains(&self, path: &str) -> bool {
        let Ok(mut archive) = self.archive.try_borrow_mut() else {
            return false;
        };
        matches!(archive.find_file(path), Ok(Some(_)))
    }

    fn read(&self, path: &str) -> io::Result<Vec<u8>> {
        let mut archive = self
            .archive
            .try_borrow_mut()
            .map_err(|_| io::Error::other(format!("{} is already being read", self.path.display())))?;
        archive.read_file(path).map_err(|e| {
            io::Error::other(format!(
                "could not read {path:?} from {}: {e}",
                self.path.display()
            ))
        })
    }
}

/// Archive held entirely in memory. Entry names are case-insensitive.
#[derive(Default, Debug, Clone)]
pub struct MemoryArchive {
    entries: FxHashMap<String, Vec<u8>>,
}

impl MemoryArchive {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(path: &str) -> String {
        path.replace('/', "\\").to_ascii_lowercase()
    }

    pub fn insert(&mut self, path: &str, bytes: impl Into<Vec<u8>>) {
        self.entries.insert(Self::key(path), bytes.into());
    }

    pub fn with_entry(mut self, path: &str, bytes: impl Into<Vec<u8>>) -> Self {
        self.insert(path, bytes);
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Archive for MemoryArchive {
    fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(&Self::key(path))
    }

    fn read(&self, path: &str) -> io::Result<Vec<u8>> {
        self.entries
            .get(&Self::key(path))
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, path.to_string()))
    }
}
