//! Provider backed by a plain directory.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use super::{LoaderError, ResourceProvider, ResourceStream};

pub struct FileSystemProvider {
    root: PathBuf,
}

impl FileSystemProvider {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> PathBuf {
        self.root.join(path)
    }
}

impl ResourceProvider for FileSystemProvider {
    fn name(&self) -> &str {
        "FileSystem Loader"
    }

    fn exists(&self, path: &str) -> bool {
        !path.is_empty() && self.resolve(path).exists()
    }

    fn load(&self, path: &str) -> Result<ResourceStream, LoaderError> {
        let file = File::open(self.resolve(path)).map_err(|source| LoaderError::Io {
            path: path.to_string(),
            source,
        })?;
        Ok(Box::new(BufReader::new(file)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    #[test]
    fn test_reads_file_under_root() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("data/global")).unwrap();
        std::fs::write(dir.path().join("data/global/hello.txt"), b"hi").unwrap();

        let provider = FileSystemProvider::new(dir.path());
        assert!(provider.exists("data/global/hello.txt"));
        assert!(!provider.exists("data/global/missing.txt"));
        assert!(!provider.exists(""));

        let mut text = String::new();
        provider
            .load("data/global/hello.txt")
            .unwrap()
            .read_to_string(&mut text)
            .unwrap();
        assert_eq!(text, "hi");
    }
}
