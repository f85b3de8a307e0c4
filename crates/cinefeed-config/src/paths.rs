use anyhow::Result;
use dirs;
use std::path::{Path, PathBuf};

/// Base directory override, e.g. for containers: `CINEFEED_BASE_PATH=/app`
pub fn base_path_override() -> Option<PathBuf> {
    std::env::var("CINEFEED_BASE_PATH")
        .ok()
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

pub struct PathManager {
    config_dir: PathBuf,
    data_dir: PathBuf,
    log_dir: PathBuf,
}

impl PathManager {
    pub fn new() -> Result<Self> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?
            .join("cinefeed");
        let data_dir = dirs::data_dir()
            .map(|d| d.join("cinefeed"))
            .unwrap_or_else(|| config_dir.join("data"));

        Ok(Self {
            log_dir: data_dir.join("logs"),
            config_dir,
            data_dir,
        })
    }

    /// All directories rooted at one base: config files at the base, data and logs in subdirs
    pub fn with_base(base: impl Into<PathBuf>) -> Self {
        let base = base.into();
        Self {
            config_dir: base.clone(),
            data_dir: base.join("data"),
            log_dir: base.join("logs"),
        }
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    /// Directory backing the key-value store (watchlist lives here)
    pub fn store_dir(&self) -> PathBuf {
        self.data_dir.join("store")
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join("config.toml")
    }

    pub fn credentials_file(&self) -> PathBuf {
        self.config_dir.join("credentials.toml")
    }

    pub fn log_file(&self) -> PathBuf {
        self.log_dir.join("cinefeed.log")
    }

    pub fn ensure_directories(&self) -> Result<()> {
        std::fs::create_dir_all(&self.config_dir)?;
        std::fs::create_dir_all(&self.data_dir)?;
        std::fs::create_dir_all(&self.log_dir)?;
        std::fs::create_dir_all(self.store_dir())?;
        Ok(())
    }
}

impl Default for PathManager {
    fn default() -> Self {
        if let Some(base) = base_path_override() {
            return Self::with_base(base);
        }

        // Platform paths (~/.config/cinefeed on Linux), falling back to the working directory
        Self::new().unwrap_or_else(|_| Self::with_base(".cinefeed"))
    }
}
