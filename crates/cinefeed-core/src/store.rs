use anyhow::{Context, Result};
use cinefeed_config::PathManager;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Byte-oriented key-value persistence
pub trait KeyValueStore {
    /// `None` when the key was never written or cannot be read
    fn get(&self, key: &str) -> Option<Vec<u8>>;

    fn set(&mut self, key: &str, value: &[u8]) -> Result<()>;
}

/// One `<key>.json` file per key under a directory
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create store directory {:?}", dir))?;
        Ok(Self { dir })
    }

    pub fn from_paths(path_manager: &PathManager) -> Result<Self> {
        Self::new(path_manager.store_dir())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<Vec<u8>> {
        let path = self.path_for(key);
        match std::fs::read(&path) {
            Ok(bytes) => {
                debug!("Store hit: {} ({} bytes)", key, bytes.len());
                Some(bytes)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("Store miss: {} (file does not exist)", key);
                None
            }
            Err(e) => {
                warn!("Failed to read store file {:?}: {}", path, e);
                None
            }
        }
    }

    fn set(&mut self, key: &str, value: &[u8]) -> Result<()> {
        let path = self.path_for(key);
        // Atomic replace: sibling temp file, then rename
        let tmp = self.dir.join(format!(".{}.json.tmp", key));
        std::fs::write(&tmp, value).with_context(|| format!("Failed to write {:?}", tmp))?;
        std::fs::rename(&tmp, &path)
            .with_context(|| format!("Failed to move {:?} into place", path))?;
        debug!("Store saved: {} ({} bytes)", key, value.len());
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, Vec<u8>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &[u8]) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_vec());
        Ok(())
    }
}
