use super::{describe_error, spinner, AppContext};
use crate::output::{movie_line, Output};
use cinefeed_config::PathManager;
use cinefeed_core::{HomeFeed, HomeSection};
use color_eyre::Result;
use owo_colors::OwoColorize;
use serde_json::json;

pub async fn run_home(path_manager: &PathManager, limit: usize, output: &Output) -> Result<()> {
    let ctx = AppContext::load(path_manager)?;
    let feed = HomeFeed::new(ctx.client.clone(), ctx.config.feed.loading_policy);

    let progress = spinner("Loading home feed...");
    feed.load();
    let state = feed
        .settled()
        .await
        .ok_or_else(|| color_eyre::eyre::eyre!("Home feed stopped before finishing"))?;
    progress.finish_and_clear();

    if !output.is_human() {
        let sections: serde_json::Map<String, serde_json::Value> = HomeSection::ALL
            .iter()
            .map(|section| {
                let movies: Vec<_> = state.section(*section).iter().take(limit).collect();
                (section.title().to_string(), json!(movies))
            })
            .collect();
        output.json(&json!({
            "featured": state.featured,
            "sections": sections,
            "error": state.status.last_error.as_ref().map(|e| e.to_string()),
        }));
        return Ok(());
    }

    if let Some(featured) = &state.featured {
        output.heading("Featured");
        output.println(movie_line(featured));
        if let Some(overview) = featured.overview.as_deref().filter(|o| !o.is_empty()) {
            output.println(format!("  {}", overview.bright_black()));
        }
    }

    for section in HomeSection::ALL {
        let movies = state.section(section);
        output.heading(section.title());
        if movies.is_empty() {
            output.println(format!("  {}", "Nothing to show".bright_black()));
            continue;
        }
        for movie in movies.iter().take(limit) {
            output.println(format!("  {}", movie_line(movie)));
        }
    }

    if let Some(error) = &state.status.last_error {
        output.println("");
        output.warn(describe_error(error));
    }

    Ok(())
}
