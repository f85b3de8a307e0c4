use super::{prompts, spinner, AppContext};
use crate::output::{movie_line, Output};
use cinefeed_config::PathManager;
use cinefeed_core::{SearchSession, SearchState};
use color_eyre::Result;
use owo_colors::OwoColorize;
use serde_json::json;
use std::time::Duration;

pub async fn run_search(path_manager: &PathManager, query: String, limit: usize, output: &Output) -> Result<()> {
    let ctx = AppContext::load(path_manager)?;

    if !query.trim().is_empty() {
        // A single query needs no debounce
        let mut session = SearchSession::new(ctx.client.clone(), Duration::ZERO);
        let progress = spinner(format!("Searching for '{}'...", query.trim()));
        session.search(&query);
        let state = wait(&session).await?;
        progress.finish_and_clear();
        return render(&state, limit, output);
    }

    if !super::is_interactive() {
        return Err(color_eyre::eyre::eyre!("No query given; pass one or run from a terminal"));
    }

    let mut session = SearchSession::new(ctx.client.clone(), ctx.config.feed.search_debounce());
    output.info("Type a title to search; an empty line exits.");
    loop {
        let line = prompts::prompt_string("Search")?;
        if line.trim().is_empty() {
            session.clear();
            break;
        }
        session.search(&line);
        let state = wait(&session).await?;
        render(&state, limit, output)?;
        if state.last_error.as_ref().is_some_and(|e| e.is_retryable())
            && prompts::prompt_yes_no("Retry?", true)?
        {
            session.retry();
            let state = wait(&session).await?;
            render(&state, limit, output)?;
        }
    }
    Ok(())
}

async fn wait(session: &SearchSession) -> Result<SearchState> {
    session
        .finished()
        .await
        .ok_or_else(|| color_eyre::eyre::eyre!("Search stopped before finishing"))
}

fn render(state: &SearchState, limit: usize, output: &Output) -> Result<()> {
    if !output.is_human() {
        let results: Vec<_> = state.results.iter().take(limit).collect();
        output.json(&json!({
            "query": state.query,
            "results": results,
            "error": state.last_error.as_ref().map(|e| e.to_string()),
        }));
        return Ok(());
    }

    if let Some(error) = &state.last_error {
        output.error(format!("Search failed: {}", error));
        return Ok(());
    }
    if state.results.is_empty() {
        output.warn(format!("No movies found for '{}'", state.query));
        return Ok(());
    }

    output.heading(&format!("Results for '{}'", state.query));
    for movie in state.results.iter().take(limit) {
        output.println(format!("  {}", movie_line(movie)));
    }
    if state.results.len() > limit {
        output.println(format!("  {}", format!("... and {} more", state.results.len() - limit).bright_black()));
    }
    Ok(())
}
