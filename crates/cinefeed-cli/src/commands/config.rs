use super::{load_config, prompts, spinner};
use crate::output::{mask_secret, Output};
use crate::ConfigCommands;
use cinefeed_client::TmdbClient;
use cinefeed_config::{Config, CredentialStore, PathManager, TMDB_API_KEY_ENV};
use cinefeed_core::AppError;
use color_eyre::Result;
use owo_colors::OwoColorize;
use serde_json::json;

pub async fn run_config(path_manager: &PathManager, cmd: ConfigCommands, output: &Output) -> Result<()> {
    match cmd {
        ConfigCommands::Show { full } => show_config(path_manager, full, output),
        ConfigCommands::SetKey { key, no_verify } => set_key(path_manager, key, no_verify, output).await,
        ConfigCommands::ClearKey => clear_key(path_manager, output),
        ConfigCommands::Init { force } => init_config(path_manager, force, output),
    }
}

fn load_credentials(path_manager: &PathManager) -> Result<CredentialStore> {
    let credentials_file = path_manager.credentials_file();
    let mut cred_store = CredentialStore::new(credentials_file.clone());
    cred_store.load().map_err(|e| {
        color_eyre::eyre::eyre!("Failed to load credentials from {}: {}", credentials_file.display(), e)
    })?;
    Ok(cred_store)
}

/// Where the effective API key comes from
fn key_source(cred_store: &CredentialStore) -> &'static str {
    let from_env = std::env::var(TMDB_API_KEY_ENV)
        .map(|v| !v.trim().is_empty())
        .unwrap_or(false);
    if from_env {
        "environment"
    } else if cred_store.resolve_tmdb_api_key().is_some() {
        "credentials file"
    } else {
        "not set"
    }
}

fn show_config(path_manager: &PathManager, full: bool, output: &Output) -> Result<()> {
    let config_file = path_manager.config_file();
    let config = load_config(path_manager)?;
    let cred_store = load_credentials(path_manager)?;

    let api_key = cred_store.resolve_tmdb_api_key().unwrap_or_default();
    let api_key_display = if full && !api_key.is_empty() { api_key.clone() } else { mask_secret(&api_key) };
    let updated = cred_store.get_tmdb_api_key_updated().map(|dt| dt.to_rfc3339());

    if !output.is_human() {
        output.json(&json!({
            "config_file": config_file.display().to_string(),
            "config_file_exists": config_file.exists(),
            "store_dir": path_manager.store_dir().display().to_string(),
            "log_file": path_manager.log_file().display().to_string(),
            "tmdb": { "base_url": config.tmdb.base_url },
            "network": {
                "connect_timeout_secs": config.network.connect_timeout_secs,
                "request_timeout_secs": config.network.request_timeout_secs,
            },
            "feed": {
                "loading_policy": config.feed.loading_policy,
                "search_debounce_ms": config.feed.search_debounce_ms,
            },
            "api_key": api_key_display,
            "api_key_source": key_source(&cred_store),
            "api_key_updated": updated,
        }));
        return Ok(());
    }

    output.heading("Configuration");
    let exists_note = if config_file.exists() { "" } else { " (not created, using defaults)" };
    output.println(format!("  Config file     {}{}", config_file.display(), exists_note.bright_black()));
    output.println(format!("  Store           {}", path_manager.store_dir().display()));
    output.println(format!("  Log file        {}", path_manager.log_file().display()));

    output.heading("TMDB");
    output.println(format!("  Base URL        {}", config.tmdb.base_url));
    output.println(format!("  API key         {} ({})", api_key_display, key_source(&cred_store)));
    if let Some(updated) = updated {
        output.println(format!("  Key updated     {}", updated));
    }

    output.heading("Network");
    output.println(format!("  Connect timeout {}s", config.network.connect_timeout_secs));
    output.println(format!("  Request timeout {}s", config.network.request_timeout_secs));

    output.heading("Feed");
    output.println(format!("  Loading policy  {:?}", config.feed.loading_policy));
    output.println(format!("  Search debounce {}ms", config.feed.search_debounce_ms));

    Ok(())
}

async fn set_key(path_manager: &PathManager, key_arg: Option<String>, no_verify: bool, output: &Output) -> Result<()> {
    path_manager
        .ensure_directories()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to create configuration directories: {}", e))?;

    let key = match key_arg {
        Some(key) => key,
        None => prompts::prompt_password("TMDB API key (v3)")?,
    };
    let key = key.trim().to_string();
    if key.is_empty() {
        return Err(color_eyre::eyre::eyre!("{}", AppError::ApiKeyMissing));
    }

    if !no_verify {
        let config = load_config(path_manager)?;
        verify_key(&config, &key, output).await?;
    }

    let mut cred_store = load_credentials(path_manager)?;
    cred_store.set_tmdb_api_key(key);
    cred_store.save().map_err(|e| {
        color_eyre::eyre::eyre!(
            "Failed to save credentials to {}: {}",
            path_manager.credentials_file().display(),
            e
        )
    })?;

    output.success("TMDB API key saved");
    if key_source(&cred_store) == "environment" {
        output.warn(format!("{} is set and will be used instead of the saved key", TMDB_API_KEY_ENV));
    }
    Ok(())
}

async fn verify_key(config: &Config, key: &str, output: &Output) -> Result<()> {
    let client = TmdbClient::from_config(config, key.to_string())
        .map_err(|e| color_eyre::eyre::eyre!("Failed to create TMDB client: {}", e))?;

    let progress = spinner("Verifying API key...");
    let result = client.trending(1).await;
    progress.finish_and_clear();

    match result.map_err(AppError::from) {
        Ok(_) => {
            output.success("API key verified");
            Ok(())
        }
        Err(AppError::ApiKeyMissing) => Err(color_eyre::eyre::eyre!(
            "TMDB rejected the key: {}",
            AppError::ApiKeyMissing
        )),
        Err(e) => {
            output.warn(format!("Could not verify key: {}. Saving anyway.", e));
            Ok(())
        }
    }
}

fn clear_key(path_manager: &PathManager, output: &Output) -> Result<()> {
    let mut cred_store = load_credentials(path_manager)?;
    if cred_store.get_tmdb_api_key().is_none() {
        output.info("No stored TMDB API key");
        return Ok(());
    }

    cred_store.clear_tmdb_api_key();
    cred_store.save().map_err(|e| {
        color_eyre::eyre::eyre!(
            "Failed to save credentials to {}: {}",
            path_manager.credentials_file().display(),
            e
        )
    })?;

    output.success("Removed the stored TMDB API key");
    if key_source(&cred_store) == "environment" {
        output.warn(format!("{} is still set in the environment", TMDB_API_KEY_ENV));
    }
    Ok(())
}

fn init_config(path_manager: &PathManager, force: bool, output: &Output) -> Result<()> {
    let config_file = path_manager.config_file();
    if config_file.exists() && !force {
        output.warn(format!(
            "Configuration already exists at {} (use --force to overwrite)",
            config_file.display()
        ));
        return Ok(());
    }

    path_manager
        .ensure_directories()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to create configuration directories: {}", e))?;
    Config::default()
        .save_to_file(&config_file)
        .map_err(|e| color_eyre::eyre::eyre!("Failed to save config to {}: {}", config_file.display(), e))?;

    output.success(format!("Wrote default configuration to {}", config_file.display()));
    Ok(())
}
