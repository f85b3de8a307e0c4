use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variable that takes precedence over the stored API key
pub const TMDB_API_KEY_ENV: &str = "TMDB_API_KEY";

/// On-disk shape of `credentials.toml`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct TmdbCredentials {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tmdb_api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tmdb_api_key_updated: Option<DateTime<Utc>>,
}

/// The TMDB v3 API key, kept apart from `config.toml` so the config can be shared safely.
pub struct CredentialStore {
    path: PathBuf,
    credentials: TmdbCredentials,
}

impl CredentialStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            credentials: TmdbCredentials::default(),
        }
    }

    /// A missing file leaves the store empty
    pub fn load(&mut self) -> Result<()> {
        if !self.path.exists() {
            return Ok(());
        }
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("reading {}", self.path.display()))?;
        self.credentials = toml::from_str(&content)?;
        Ok(())
    }

    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, toml::to_string_pretty(&self.credentials)?)?;
        Ok(())
    }

    pub fn get_tmdb_api_key(&self) -> Option<&str> {
        self.credentials.tmdb_api_key.as_deref()
    }

    /// Stores the key and stamps the update time
    pub fn set_tmdb_api_key(&mut self, api_key: String) {
        self.credentials.tmdb_api_key = Some(api_key);
        self.credentials.tmdb_api_key_updated = Some(Utc::now());
    }

    pub fn get_tmdb_api_key_updated(&self) -> Option<DateTime<Utc>> {
        self.credentials.tmdb_api_key_updated
    }

    pub fn clear_tmdb_api_key(&mut self) {
        self.credentials = TmdbCredentials::default();
    }

    /// API key to use: `TMDB_API_KEY` from the environment, else the stored key.
    /// Blank values count as missing.
    pub fn resolve_tmdb_api_key(&self) -> Option<String> {
        self.resolve_with_env(std::env::var(TMDB_API_KEY_ENV).ok())
    }

    fn resolve_with_env(&self, env_value: Option<String>) -> Option<String> {
        env_value
            .filter(|v| !v.trim().is_empty())
            .or_else(|| {
                self.get_tmdb_api_key()
                    .filter(|v| !v.trim().is_empty())
                    .map(str::to_string)
            })
    }
}
