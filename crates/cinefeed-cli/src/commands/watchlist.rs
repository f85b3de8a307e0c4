use super::{prompts, spinner, AppContext};
use crate::output::{movie_line, Output};
use crate::WatchlistCommands;
use cinefeed_config::PathManager;
use cinefeed_core::{AppError, FileStore, Watchlist};
use cinefeed_models::Movie;
use color_eyre::Result;
use serde_json::json;

pub async fn run_watchlist(path_manager: &PathManager, cmd: WatchlistCommands, output: &Output) -> Result<()> {
    let store = FileStore::from_paths(path_manager)
        .map_err(|e| color_eyre::eyre::eyre!("Failed to open watchlist storage: {}", e))?;
    let mut watchlist = Watchlist::load(store);

    match cmd {
        WatchlistCommands::List => list(&watchlist, output),
        WatchlistCommands::Add { id } => {
            if watchlist.contains(id) {
                output.info(format!("Movie {} is already in your watchlist", id));
                return Ok(());
            }
            let movie = fetch_movie(path_manager, id).await?;
            let title = movie.title.clone();
            watchlist.add(movie);
            output.success(format!("Added '{}' to your watchlist", title));
            Ok(())
        }
        WatchlistCommands::Remove { id } => {
            if watchlist.remove(id) {
                output.success(format!("Removed movie {} from your watchlist", id));
            } else {
                output.warn(format!("Movie {} is not in your watchlist", id));
            }
            Ok(())
        }
        WatchlistCommands::Toggle { id } => {
            let saved = watchlist.movies().iter().find(|m| m.id == id).cloned();
            let movie = match saved {
                Some(movie) => movie,
                None => fetch_movie(path_manager, id).await?,
            };
            let title = movie.title.clone();
            if watchlist.toggle(movie) {
                output.success(format!("Added '{}' to your watchlist", title));
            } else {
                output.success(format!("Removed '{}' from your watchlist", title));
            }
            Ok(())
        }
        WatchlistCommands::Clear { yes } => {
            if watchlist.is_empty() {
                output.info("Your watchlist is already empty");
                return Ok(());
            }
            if !yes && !prompts::prompt_yes_no(&format!("Remove all {} movies from your watchlist?", watchlist.len()), false)? {
                output.info("Cancelled");
                return Ok(());
            }
            watchlist.clear();
            output.success("Watchlist cleared");
            Ok(())
        }
    }
}

fn list(watchlist: &Watchlist<FileStore>, output: &Output) -> Result<()> {
    if !output.is_human() {
        output.json(&json!({ "movies": watchlist.movies() }));
        return Ok(());
    }
    if watchlist.is_empty() {
        output.info("Your watchlist is empty. Add movies with 'cinefeed watchlist add <ID>'.");
        return Ok(());
    }
    output.heading(&format!("Watchlist ({})", watchlist.len()));
    for movie in watchlist.movies() {
        output.println(format!("  {}", movie_line(movie)));
    }
    Ok(())
}

async fn fetch_movie(path_manager: &PathManager, id: i64) -> Result<Movie> {
    let ctx = AppContext::load(path_manager)?;
    let progress = spinner(format!("Looking up movie {}...", id));
    let result = ctx.client.movie_details(id).await;
    progress.finish_and_clear();
    let details = result.map_err(|e| color_eyre::eyre::eyre!("{}", AppError::from(e)))?;
    Ok(details.as_movie())
}
