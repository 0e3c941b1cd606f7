use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use anyhow::Result;

/// Abstraction for file access during the patch cycle.
/// This lets the read-transform-write loop run against an in-memory tree in tests
/// instead of mutating real project files.
pub trait FileOps {
    /// Read the full text of one file.
    ///
    /// Fails on missing files and on content that does not decode as UTF-8.
    fn read_text(&self, path: &Path) -> Result<String>;

    /// Overwrite one file with `content`, truncating whatever was there.
    fn write_text(&self, path: &Path, content: &str) -> Result<()>;
}

/// The real on-disk implementation (production).
pub struct DiskFiles;

impl FileOps for DiskFiles {
    fn read_text(&self, path: &Path) -> Result<String> {
        let content = std::fs::read_to_string(path)?;
        Ok(content)
    }

    fn write_text(&self, path: &Path, content: &str) -> Result<()> {
        std::fs::write(path, content)?;
        Ok(())
    }
}

/// An in-memory file tree for testing.
///
/// `writes` records every path handed to `write_text`, so tests can assert that
/// filtered-out files are never opened for writing.
#[derive(Debug, Default)]
#[allow(dead_code)]
pub struct MockFiles {
    pub files: Mutex<HashMap<PathBuf, String>>,
    pub writes: Mutex<Vec<PathBuf>>,
}

impl MockFiles {
    #[allow(dead_code)]
    pub fn new() -> Self {
        Self::default()
    }

    #[allow(dead_code)]
    pub fn insert(&self, path: &str, content: &str) {
        self.files
            .lock()
            .unwrap()
            .insert(PathBuf::from(path), content.to_string());
    }

    #[allow(dead_code)]
    pub fn contents(&self, path: &str) -> Option<String> {
        self.files.lock().unwrap().get(Path::new(path)).cloned()
    }
}

impl FileOps for MockFiles {
    fn read_text(&self, path: &Path) -> Result<String> {
        let map = self.files.lock().unwrap();
        map.get(path)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("no such file in mock tree: {:?}", path))
    }

    fn write_text(&self, path: &Path, content: &str) -> Result<()> {
        self.writes.lock().unwrap().push(path.to_path_buf());
        self.files
            .lock()
            .unwrap()
            .insert(path.to_path_buf(), content.to_string());
        Ok(())
    }
}
