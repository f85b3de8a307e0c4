use reqwest::Url;
use std::collections::BTreeMap;
use crate::error::ApiError;

/// Fixed response language sent with every request
pub const LANGUAGE: &str = "en-US";

const API_KEY_PARAM: &str = "api_key";
const LANGUAGE_PARAM: &str = "language";

/// Caller-supplied query parameters. Keys are unique; order is irrelevant upstream.
pub type QueryParams = BTreeMap<String, String>;

/// Build `QueryParams` from string pairs
pub fn params<const N: usize>(pairs: [(&str, &str); N]) -> QueryParams {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Build the fully qualified URL for `endpoint`.
///
/// `api_key` and `language` are always present exactly once. Caller
/// parameters with those names are dropped so the fixed values win.
pub fn build_url(
    base_url: &str,
    endpoint: &str,
    api_key: &str,
    params: &QueryParams,
) -> Result<Url, ApiError> {
    let raw = format!("{}{}", base_url.trim_end_matches('/'), endpoint);
    let mut url = Url::parse(&raw).map_err(|e| ApiError::InvalidUrl(format!("{}: {}", raw, e)))?;

    if url.cannot_be_a_base() || url.host_str().is_none() {
        return Err(ApiError::InvalidUrl(format!("{}: not a host-based URL", raw)));
    }

    {
        let mut query = url.query_pairs_mut();
        query.clear();
        query.append_pair(API_KEY_PARAM, api_key);
        query.append_pair(LANGUAGE_PARAM, LANGUAGE);
        for (key, value) in params {
            if key == API_KEY_PARAM || key == LANGUAGE_PARAM {
                continue;
            }
            query.append_pair(key, value);
        }
    }

    Ok(url)
}

/// Path and query of `url` with the API key removed, for log output
pub fn redacted(url: &Url) -> String {
    let query: Vec<String> = url
        .query_pairs()
        .filter(|(k, _)| k != API_KEY_PARAM)
        .map(|(k, v)| format!("{}={}", k, v))
        .collect();
    if query.is_empty() {
        url.path().to_string()
    } else {
        format!("{}?{}", url.path(), query.join("&"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://api.themoviedb.org/3";

    fn query_pairs(url: &Url) -> Vec<(String, String)> {
        url.query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }

    #[test]
    fn test_fixed_params_always_present_once() {
        let url = build_url(BASE, "/movie/popular", "secret", &QueryParams::new()).unwrap();
        assert_eq!(url.path(), "/3/movie/popular");
        assert_eq!(
            query_pairs(&url),
            vec![
                ("api_key".to_string(), "secret".to_string()),
                ("language".to_string(), "en-US".to_string()),
            ]
        );
    }

    #[test]
    fn test_caller_params_round_trip() {
        let input = params([
            ("query", "Kabhi Khushi Kabhie Gham & more = fun"),
            ("page", "2"),
            ("with_original_language", "hi,te,ta"),
            ("vote_count.gte", "100"),
            ("title", "Amélie / 東京"),
        ]);
        let url = build_url(BASE, "/search/movie", "k", &input).unwrap();

        let pairs = query_pairs(&url);
        assert_eq!(pairs.iter().filter(|(k, _)| k == "api_key").count(), 1);
        assert_eq!(pairs.iter().filter(|(k, _)| k == "language").count(), 1);

        let decoded: QueryParams = pairs
            .into_iter()
            .filter(|(k, _)| k != "api_key" && k != "language")
            .collect();
        assert_eq!(decoded, input);
    }

    #[test]
    fn test_colliding_caller_keys_do_not_duplicate() {
        let input = params([("language", "fr-FR"), ("api_key", "other"), ("page", "1")]);
        let url = build_url(BASE, "/trending/movie/day", "k", &input).unwrap();
        let pairs = query_pairs(&url);
        assert_eq!(pairs.iter().filter(|(k, _)| k == "language").count(), 1);
        assert_eq!(pairs.iter().filter(|(k, _)| k == "api_key").count(), 1);
        assert!(pairs.contains(&("language".to_string(), "en-US".to_string())));
        assert!(pairs.contains(&("api_key".to_string(), "k".to_string())));
    }

    #[test]
    fn test_trailing_slash_on_base_is_ignored() {
        let url = build_url("https://api.themoviedb.org/3/", "/movie/550", "k", &QueryParams::new()).unwrap();
        assert_eq!(url.path(), "/3/movie/550");
    }

    #[test]
    fn test_invalid_base_url() {
        let err = build_url("not a url", "/movie/550", "k", &QueryParams::new()).unwrap_err();
        assert!(matches!(err, ApiError::InvalidUrl(_)));

        let err = build_url("mailto:someone", "/movie/550", "k", &QueryParams::new()).unwrap_err();
        assert!(matches!(err, ApiError::InvalidUrl(_)));
    }

    #[test]
    fn test_redacted_hides_api_key() {
        let url = build_url(BASE, "/movie/550", "secret", &params([("page", "1")])).unwrap();
        let logged = redacted(&url);
        assert!(!logged.contains("secret"));
        assert_eq!(logged, "/3/movie/550?language=en-US&page=1");
    }
}
