use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};
use crate::images::{image_url, ImageSize};

/// One page of movies as returned by every list, search and discover endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovieResponse {
    pub page: u32,
    pub results: Vec<Movie>,
    pub total_pages: u32,
    pub total_results: u32,
}

/// A movie summary as it appears in list results.
///
/// `id` is the only identity key: two records with the same `id` compare equal
/// and hash identically even if their vote counts or other fields have drifted
/// between fetches. The watchlist relies on this for membership.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Movie {
    pub id: i64,
    pub title: String,
    pub original_title: Option<String>,
    pub overview: Option<String>,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    /// ISO `YYYY-MM-DD`; TMDB sends an empty string for unknown dates
    pub release_date: Option<String>,
    pub vote_average: f64,
    pub vote_count: u64,
    pub popularity: f64,
    pub adult: bool,
    pub video: bool,
    pub genre_ids: Option<Vec<i64>>,
}

impl Movie {
    pub fn poster_url(&self) -> Option<String> {
        image_url(self.poster_path.as_deref(), ImageSize::Poster)
    }

    pub fn backdrop_url(&self) -> Option<String> {
        image_url(self.backdrop_path.as_deref(), ImageSize::Backdrop)
    }

    pub fn thumbnail_url(&self) -> Option<String> {
        image_url(self.poster_path.as_deref(), ImageSize::Thumbnail)
    }

    /// Vote average with one decimal place, e.g. `"7.4"`
    pub fn formatted_rating(&self) -> String {
        format!("{:.1}", self.vote_average)
    }

    /// Vote average on a 0-100 scale
    pub fn rating_percentage(&self) -> f64 {
        self.vote_average * 10.0
    }

    pub fn formatted_release_date(&self) -> String {
        format_release_date(self.release_date.as_deref())
    }

    pub fn release_year(&self) -> Option<i32> {
        parse_release_date(self.release_date.as_deref()).map(|d| d.year())
    }
}

impl PartialEq for Movie {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Movie {}

impl Hash for Movie {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

pub(crate) fn parse_release_date(date: Option<&str>) -> Option<NaiveDate> {
    date.and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
}

/// `"Mar 05, 2024"` for parseable dates, the raw string otherwise, `"Unknown"` when absent
pub(crate) fn format_release_date(date: Option<&str>) -> String {
    match date {
        None => "Unknown".to_string(),
        Some(raw) => match parse_release_date(Some(raw)) {
            Some(parsed) => parsed.format("%b %d, %Y").to_string(),
            None => raw.to_string(),
        },
    }
}
