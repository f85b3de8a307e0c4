pub mod config;
pub mod home;
pub mod movie;
pub mod prompts;
pub mod search;
pub mod watchlist;

use cinefeed_client::TmdbClient;
use cinefeed_config::{Config, CredentialStore, PathManager};
use cinefeed_core::AppError;
use color_eyre::Result;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::IsTerminal;
use std::sync::Arc;
use std::time::Duration;

/// Everything a network-backed command needs
pub struct AppContext {
    pub config: Config,
    pub client: Arc<TmdbClient>,
}

impl AppContext {
    pub fn load(path_manager: &PathManager) -> Result<Self> {
        let config = load_config(path_manager)?;

        let credentials_file = path_manager.credentials_file();
        let mut cred_store = CredentialStore::new(credentials_file.clone());
        cred_store.load().map_err(|e| {
            color_eyre::eyre::eyre!("Failed to load credentials from {}: {}", credentials_file.display(), e)
        })?;

        let api_key = cred_store.resolve_tmdb_api_key().ok_or_else(|| {
            color_eyre::eyre::eyre!(
                "{}. Run 'cinefeed config set-key' or set {}.",
                AppError::ApiKeyMissing,
                cinefeed_config::TMDB_API_KEY_ENV
            )
        })?;

        let client = TmdbClient::from_config(&config, api_key)
            .map_err(|e| color_eyre::eyre::eyre!("Failed to create TMDB client: {}", e))?;
        tracing::debug!(base_url = %config.tmdb.base_url, policy = ?config.feed.loading_policy, "TMDB client ready");

        Ok(Self {
            config,
            client: Arc::new(client),
        })
    }
}

/// `config.toml` if present, defaults otherwise; validated either way
pub fn load_config(path_manager: &PathManager) -> Result<Config> {
    let config_file = path_manager.config_file();
    let config = Config::load_or_default(&config_file).map_err(|e| {
        color_eyre::eyre::eyre!("Failed to load config from {}: {}", config_file.display(), e)
    })?;
    config
        .validate()
        .map_err(|e| color_eyre::eyre::eyre!("Invalid configuration in {}: {}", config_file.display(), e))?;
    Ok(config)
}

pub fn is_interactive() -> bool {
    std::io::stdout().is_terminal() && std::io::stderr().is_terminal()
}

/// Ticking spinner on interactive terminals, hidden otherwise
pub fn spinner(message: impl Into<String>) -> ProgressBar {
    if !is_interactive() {
        return ProgressBar::hidden();
    }
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner()
        .template("{spinner:.green} {msg}")
        .map(|s| s.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ "))
    {
        spinner.set_style(style);
    }
    spinner.set_message(message.into());
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

/// Human hint for an error left on a settled load
pub fn describe_error(error: &AppError) -> String {
    if error.is_retryable() {
        format!("{} (some sections may be incomplete; try again)", error)
    } else {
        format!("{} (some sections may be incomplete)", error)
    }
}
