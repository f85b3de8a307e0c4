//! Upstream paths and the fixed regional parameter sets.

use crate::request::{params, QueryParams};

pub const NOW_PLAYING: &str = "/movie/now_playing";
pub const POPULAR: &str = "/movie/popular";
pub const TOP_RATED: &str = "/movie/top_rated";
pub const UPCOMING: &str = "/movie/upcoming";
pub const TRENDING: &str = "/trending/movie/day";
pub const SEARCH: &str = "/search/movie";
pub const DISCOVER: &str = "/discover/movie";

const MOVIE: &str = "/movie";
pub const CREDITS: &str = "/credits";
pub const VIDEOS: &str = "/videos";
pub const RECOMMENDATIONS: &str = "/recommendations";
pub const SIMILAR: &str = "/similar";

/// Region every list and discovery call is scoped to
pub const REGION: &str = "IN";
/// Nine Indian languages plus English
pub const INDIAN_LANGUAGES: &str = "hi,te,ta,ml,kn,bn,gu,mr,pa,en";
pub const HINDI: &str = "hi";
pub const SOUTH_INDIAN_LANGUAGES: &str = "te,ta,ml,kn";
pub const SORT_BY_POPULARITY: &str = "popularity.desc";
/// Minimum vote count for top-rated lists
pub const TOP_RATED_MIN_VOTES: &str = "100";

/// `/movie/{id}` followed by an optional sub-resource such as `/credits`
pub fn movie_path(id: i64, suffix: &str) -> String {
    format!("{}/{}{}", MOVIE, id, suffix)
}

/// region + original-language filter + popularity sort
pub fn regional_params(languages: &str) -> QueryParams {
    params([
        ("region", REGION),
        ("with_original_language", languages),
        ("sort_by", SORT_BY_POPULARITY),
    ])
}

pub fn page_params(page: u32) -> QueryParams {
    let mut params = QueryParams::new();
    params.insert("page".to_string(), page.to_string());
    params
}

pub(crate) fn with_page(mut params: QueryParams, page: u32) -> QueryParams {
    params.insert("page".to_string(), page.to_string());
    params
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_movie_path() {
        assert_eq!(movie_path(550, ""), "/movie/550");
        assert_eq!(movie_path(550, CREDITS), "/movie/550/credits");
        assert_eq!(movie_path(550, SIMILAR), "/movie/550/similar");
    }

    #[test]
    fn test_regional_params() {
        let p = regional_params(SOUTH_INDIAN_LANGUAGES);
        assert_eq!(p.get("region").map(String::as_str), Some("IN"));
        assert_eq!(p.get("with_original_language").map(String::as_str), Some("te,ta,ml,kn"));
        assert_eq!(p.get("sort_by").map(String::as_str), Some("popularity.desc"));
        assert_eq!(p.len(), 3);
    }
}
