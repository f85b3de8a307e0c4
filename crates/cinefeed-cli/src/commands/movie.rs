use super::{describe_error, spinner, AppContext};
use crate::output::{movie_line, Output};
use cinefeed_config::PathManager;
use cinefeed_core::{AppError, FileStore, MovieDetailLoader, Watchlist};
use color_eyre::Result;
use owo_colors::OwoColorize;
use serde_json::json;

const RELATED_LIMIT: usize = 5;
const CAST_SHOWN: usize = 10;

pub async fn run_movie(path_manager: &PathManager, id: i64, output: &Output) -> Result<()> {
    let ctx = AppContext::load(path_manager)?;
    let loader = MovieDetailLoader::new(ctx.client.clone(), ctx.config.feed.loading_policy);

    let progress = spinner(format!("Loading movie {}...", id));
    loader.load(id);
    let state = loader
        .settled()
        .await
        .ok_or_else(|| color_eyre::eyre::eyre!("Detail load stopped before finishing"))?;
    progress.finish_and_clear();

    let Some(details) = &state.details else {
        let error = state.status.last_error.clone().unwrap_or(AppError::MovieNotFound);
        return Err(color_eyre::eyre::eyre!("{}", error));
    };

    let saved = FileStore::from_paths(path_manager)
        .map(|store| Watchlist::load(store).contains(id))
        .unwrap_or(false);

    if !output.is_human() {
        output.json(&json!({
            "details": details,
            "cast": state.cast(),
            "directors": state.directors(),
            "trailers": state.videos,
            "recommendations": state.recommendations,
            "similar": state.similar,
            "in_watchlist": saved,
            "error": state.status.last_error.as_ref().map(|e| e.to_string()),
        }));
        return Ok(());
    }

    output.heading(&details.title);
    if let Some(tagline) = details.tagline.as_deref().filter(|t| !t.is_empty()) {
        output.println(tagline.italic().to_string());
    }

    let mut facts = vec![
        format!("★ {}", details.formatted_rating()),
        details.formatted_release_date(),
    ];
    if let Some(runtime) = details.formatted_runtime() {
        facts.push(runtime);
    }
    let genres = details.genre_names();
    if !genres.is_empty() {
        facts.push(genres.join(", "));
    }
    output.println(facts.join("  ·  "));
    if saved {
        output.println(format!("{} In your watchlist", "✓".green()));
    }

    if let Some(overview) = details.overview.as_deref().filter(|o| !o.is_empty()) {
        output.println("");
        output.println(overview);
    }

    let directors = state.directors();
    if !directors.is_empty() {
        let names: Vec<&str> = directors.iter().map(|d| d.name.as_str()).collect();
        output.println("");
        output.println(format!("{} {}", "Directed by".bright_black(), names.join(", ")));
    }

    if !state.cast().is_empty() {
        output.heading("Cast");
        for member in state.cast().iter().take(CAST_SHOWN) {
            match member.character.as_deref().filter(|c| !c.is_empty()) {
                Some(character) => output.println(format!("  {} {} {}", member.name, "as".bright_black(), character)),
                None => output.println(format!("  {}", member.name)),
            }
        }
    }

    if !state.videos.is_empty() {
        output.heading("Trailers");
        for video in &state.videos {
            let official = if video.official { " (official)" } else { "" };
            let link = video.youtube_url().unwrap_or_else(|| video.site.clone());
            output.println(format!("  {}{}  {}", video.name, official.bright_black(), link.underline()));
        }
    }

    for (title, movies) in [("Recommended", &state.recommendations), ("Similar", &state.similar)] {
        if movies.is_empty() {
            continue;
        }
        output.heading(title);
        for movie in movies.iter().take(RELATED_LIMIT) {
            output.println(format!("  {}", movie_line(movie)));
        }
    }

    if let Some(error) = &state.status.last_error {
        output.println("");
        output.warn(describe_error(error));
    }

    Ok(())
}
