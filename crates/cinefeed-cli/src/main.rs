use cinefeed_config::PathManager;
use clap::{ArgAction, Parser, Subcommand};
use commands::{config, home, movie, search, watchlist};

mod commands;
mod logging;
mod output;

#[derive(Parser)]
#[command(name = "cinefeed")]
#[command(about = "cinefeed - Discover movies from TMDB, with a focus on Indian cinema")]
#[command(version)]
struct Cli {
    /// Log to stderr instead of the log file (use multiple times for more verbosity: -v, -vv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "human", value_enum)]
    output: output::OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the home feed
    #[command(long_about = "Load every home section concurrently (trending, now playing, popular, top rated, upcoming, Bollywood, South Indian) and print the featured movie followed by each section.")]
    Home {
        /// Movies to print per section
        #[arg(long, default_value_t = 5)]
        limit: usize,
    },
    /// Show details, cast, trailers and related movies for one movie
    Movie {
        /// TMDB movie id
        id: i64,
    },
    /// Search movies by title
    #[command(long_about = "Search TMDB by title. Without a query, starts an interactive prompt where each line replaces the previous search; an empty line exits.")]
    Search {
        /// Words to search for
        query: Vec<String>,

        /// Results to print
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
    /// Manage the local watchlist
    Watchlist {
        #[command(subcommand)]
        cmd: Option<WatchlistCommands>,
    },
    /// View or change configuration and the API key
    Config {
        #[command(subcommand)]
        cmd: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub(crate) enum WatchlistCommands {
    /// List saved movies (default)
    List,
    /// Save a movie by TMDB id
    Add { id: i64 },
    /// Remove a movie by TMDB id
    Remove { id: i64 },
    /// Add the movie if absent, remove it if present
    Toggle { id: i64 },
    /// Remove every saved movie
    Clear {
        /// Skip the confirmation prompt
        #[arg(long, short = 'y', action = ArgAction::SetTrue)]
        yes: bool,
    },
}

#[derive(Subcommand)]
pub(crate) enum ConfigCommands {
    /// Show current configuration (masks the API key)
    Show {
        /// Show the API key unmasked
        #[arg(long, action = ArgAction::SetTrue)]
        full: bool,
    },
    /// Store the TMDB API key
    #[command(long_about = "Store the TMDB v3 API key in the credentials file. The key is checked against TMDB before saving unless --no-verify is given. The TMDB_API_KEY environment variable, when set, takes precedence over the stored key.")]
    SetKey {
        /// API key (prompted with hidden input if omitted)
        #[arg(long)]
        key: Option<String>,

        /// Save without checking the key against TMDB
        #[arg(long, action = ArgAction::SetTrue)]
        no_verify: bool,
    },
    /// Remove the stored TMDB API key
    ClearKey,
    /// Write a default config.toml
    Init {
        /// Overwrite an existing file
        #[arg(long, action = ArgAction::SetTrue)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    let path_manager = PathManager::default();
    let log_target = if cli.verbose > 0 {
        logging::LogTarget::Stderr
    } else {
        logging::LogTarget::File(path_manager.log_file())
    };
    logging::init_logging(cli.verbose, cli.quiet, log_target)
        .map_err(|e| color_eyre::eyre::eyre!("{}", e))?;

    let output = output::Output::new(cli.output, cli.quiet);

    match cli.command {
        Commands::Home { limit } => home::run_home(&path_manager, limit, &output).await,
        Commands::Movie { id } => movie::run_movie(&path_manager, id, &output).await,
        Commands::Search { query, limit } => {
            search::run_search(&path_manager, query.join(" "), limit, &output).await
        }
        Commands::Watchlist { cmd } => {
            let cmd = cmd.unwrap_or(WatchlistCommands::List);
            watchlist::run_watchlist(&path_manager, cmd, &output).await
        }
        Commands::Config { cmd } => config::run_config(&path_manager, cmd, &output).await,
    }
}
