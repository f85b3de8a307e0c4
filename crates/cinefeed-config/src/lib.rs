pub mod config;
pub mod credentials;
pub mod paths;

pub use config::{Config, FeedConfig, LoadingPolicy, NetworkConfig, TmdbConfig, DEFAULT_TMDB_BASE_URL};
pub use credentials::{CredentialStore, TMDB_API_KEY_ENV};
pub use paths::{PathManager, base_path_override};
