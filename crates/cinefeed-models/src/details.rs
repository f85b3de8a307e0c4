use serde::{Deserialize, Serialize};
use crate::images::{image_url, ImageSize};
use crate::movie::{format_release_date, Movie};

/// Full record for a single movie, fetched lazily for the detail screen.
/// Shares `id` with the `Movie` summary it was opened from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovieDetails {
    pub id: i64,
    pub title: String,
    pub original_title: Option<String>,
    pub overview: Option<String>,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub release_date: Option<String>,
    pub vote_average: f64,
    pub vote_count: u64,
    pub popularity: f64,
    pub adult: bool,
    pub video: bool,
    pub runtime: Option<u32>,
    pub budget: Option<u64>,
    pub revenue: Option<u64>,
    pub status: Option<String>,
    pub tagline: Option<String>,
    pub homepage: Option<String>,
    pub imdb_id: Option<String>,
    pub genres: Option<Vec<Genre>>,
    pub production_companies: Option<Vec<ProductionCompany>>,
    pub production_countries: Option<Vec<ProductionCountry>>,
    pub spoken_languages: Option<Vec<SpokenLanguage>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Genre {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProductionCompany {
    pub id: i64,
    pub name: String,
    pub logo_path: Option<String>,
    pub origin_country: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProductionCountry {
    pub iso_3166_1: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SpokenLanguage {
    pub iso_639_1: String,
    pub name: String,
    pub english_name: Option<String>,
}

impl MovieDetails {
    pub fn poster_url(&self) -> Option<String> {
        image_url(self.poster_path.as_deref(), ImageSize::Poster)
    }

    pub fn backdrop_url(&self) -> Option<String> {
        image_url(self.backdrop_path.as_deref(), ImageSize::Backdrop)
    }

    pub fn formatted_rating(&self) -> String {
        format!("{:.1}", self.vote_average)
    }

    pub fn formatted_release_date(&self) -> String {
        format_release_date(self.release_date.as_deref())
    }

    /// `"2h 15m"`, or `"45m"` under an hour. `None` when runtime is unknown or zero.
    pub fn formatted_runtime(&self) -> Option<String> {
        match self.runtime {
            None | Some(0) => None,
            Some(minutes) if minutes < 60 => Some(format!("{}m", minutes)),
            Some(minutes) => Some(format!("{}h {}m", minutes / 60, minutes % 60)),
        }
    }

    pub fn genre_names(&self) -> Vec<&str> {
        self.genres
            .as_deref()
            .unwrap_or_default()
            .iter()
            .map(|g| g.name.as_str())
            .collect()
    }

    /// Project the details back onto a list summary so the detail screen can
    /// add the movie to the watchlist.
    pub fn as_movie(&self) -> Movie {
        Movie {
            id: self.id,
            title: self.title.clone(),
            original_title: self.original_title.clone(),
            overview: self.overview.clone(),
            poster_path: self.poster_path.clone(),
            backdrop_path: self.backdrop_path.clone(),
            release_date: self.release_date.clone(),
            vote_average: self.vote_average,
            vote_count: self.vote_count,
            popularity: self.popularity,
            adult: self.adult,
            video: self.video,
            genre_ids: self
                .genres
                .as_ref()
                .map(|genres| genres.iter().map(|g| g.id).collect()),
        }
    }
}
