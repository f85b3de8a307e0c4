use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_TMDB_BASE_URL: &str = "https://api.themoviedb.org/3";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub tmdb: TmdbConfig,
    #[serde(default)]
    pub network: NetworkConfig,
    #[serde(default)]
    pub feed: FeedConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TmdbConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Connect timeout for a single request
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    /// Overall timeout covering connect, headers and body
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    #[serde(default)]
    pub loading_policy: LoadingPolicy,
    /// Quiet period before a search is sent; newer input restarts it
    #[serde(default = "default_search_debounce_ms")]
    pub search_debounce_ms: u64,
}

/// Decides when an orchestrated load stops reporting `is_loading`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadingPolicy {
    /// Loading ends when every dispatched call has settled
    #[default]
    AllSettled,
    /// Loading ends when the designated primary call settles, whatever the siblings are doing
    PrimaryCall,
}

fn default_base_url() -> String {
    DEFAULT_TMDB_BASE_URL.to_string()
}

fn default_connect_timeout_secs() -> u64 {
    30
}

fn default_request_timeout_secs() -> u64 {
    60
}

fn default_search_debounce_ms() -> u64 {
    500
}

impl Default for TmdbConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: default_connect_timeout_secs(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl NetworkConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            loading_policy: LoadingPolicy::default(),
            search_debounce_ms: default_search_debounce_ms(),
        }
    }
}

impl FeedConfig {
    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }
}

impl Config {
    pub fn load_from_file(path: &PathBuf) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Like `load_from_file`, but a missing file yields the defaults
    pub fn load_or_default(path: &PathBuf) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from_file(path)
    }

    pub fn save_to_file(&self, path: &PathBuf) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        let base_url = self.tmdb.base_url.trim();
        if base_url.is_empty() {
            return Err(anyhow::anyhow!("tmdb.base_url cannot be empty"));
        }
        if !(base_url.starts_with("https://") || base_url.starts_with("http://")) {
            return Err(anyhow::anyhow!("tmdb.base_url must be an http(s) URL: {}", base_url));
        }

        if self.network.connect_timeout_secs == 0 {
            return Err(anyhow::anyhow!("network.connect_timeout_secs must be positive"));
        }
        if self.network.request_timeout_secs < self.network.connect_timeout_secs {
            return Err(anyhow::anyhow!(
                "network.request_timeout_secs ({}) must not be shorter than connect_timeout_secs ({})",
                self.network.request_timeout_secs,
                self.network.connect_timeout_secs
            ));
        }

        Ok(())
    }
}
