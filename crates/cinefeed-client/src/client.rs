use anyhow::Result;
use cinefeed_config::Config;
use cinefeed_models::{CreditsResponse, MovieDetails, MovieResponse, VideosResponse};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};
use crate::decode::decode;
use crate::endpoints::{self, page_params, regional_params, with_page};
use crate::error::ApiError;
use crate::request::{build_url, redacted, QueryParams};
use crate::transport::{ReqwestTransport, Transport};

/// Typed TMDB v3 client.
///
/// Cheap to clone; construct one per process and share it (usually behind an
/// `Arc`) with every orchestrator that needs it.
#[derive(Clone)]
pub struct TmdbClient {
    transport: Arc<dyn Transport>,
    base_url: String,
    api_key: String,
}

impl TmdbClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            transport,
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    /// Client with the production `reqwest` transport configured from `config`
    pub fn from_config(config: &Config, api_key: String) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(anyhow::anyhow!("TMDB API key cannot be empty"));
        }
        let transport = ReqwestTransport::from_config(&config.network)?;
        Ok(Self::new(config.tmdb.base_url.clone(), api_key, Arc::new(transport)))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build, send and decode one request. The first failing stage decides the error.
    pub async fn request<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &QueryParams,
    ) -> Result<T, ApiError> {
        let url = build_url(&self.base_url, endpoint, &self.api_key, params)?;
        let target = redacted(&url);
        debug!(endpoint, "GET {}", target);

        let started = Instant::now();
        let body = self.transport.get(&url).await.map_err(|e| {
            warn!(endpoint, error = %e, "Request failed: {}", target);
            e
        })?;

        let value = decode(&body).map_err(|e| {
            warn!(endpoint, error = %e, bytes = body.len(), "Could not decode response from {}", target);
            e
        })?;

        debug!(endpoint, bytes = body.len(), elapsed_ms = started.elapsed().as_millis() as u64, "Response decoded");
        Ok(value)
    }

    async fn regional_list(&self, endpoint: &str, page: u32) -> Result<MovieResponse, ApiError> {
        let params = with_page(regional_params(endpoints::INDIAN_LANGUAGES), page);
        self.request(endpoint, &params).await
    }

    pub async fn now_playing(&self, page: u32) -> Result<MovieResponse, ApiError> {
        self.regional_list(endpoints::NOW_PLAYING, page).await
    }

    pub async fn popular(&self, page: u32) -> Result<MovieResponse, ApiError> {
        self.regional_list(endpoints::POPULAR, page).await
    }

    pub async fn top_rated(&self, page: u32) -> Result<MovieResponse, ApiError> {
        let mut params = with_page(regional_params(endpoints::INDIAN_LANGUAGES), page);
        params.insert("vote_count.gte".to_string(), endpoints::TOP_RATED_MIN_VOTES.to_string());
        self.request(endpoints::TOP_RATED, &params).await
    }

    pub async fn upcoming(&self, page: u32) -> Result<MovieResponse, ApiError> {
        self.regional_list(endpoints::UPCOMING, page).await
    }

    /// Daily trending list; global, not scoped to the region
    pub async fn trending(&self, page: u32) -> Result<MovieResponse, ApiError> {
        self.request(endpoints::TRENDING, &page_params(page)).await
    }

    pub async fn search(&self, query: &str, page: u32) -> Result<MovieResponse, ApiError> {
        let mut params = page_params(page);
        params.insert("query".to_string(), query.to_string());
        params.insert("region".to_string(), endpoints::REGION.to_string());
        params.insert("include_adult".to_string(), "false".to_string());
        self.request(endpoints::SEARCH, &params).await
    }

    pub async fn movie_details(&self, id: i64) -> Result<MovieDetails, ApiError> {
        self.request(&endpoints::movie_path(id, ""), &QueryParams::new()).await
    }

    pub async fn movie_credits(&self, id: i64) -> Result<CreditsResponse, ApiError> {
        self.request(&endpoints::movie_path(id, endpoints::CREDITS), &QueryParams::new()).await
    }

    pub async fn movie_videos(&self, id: i64) -> Result<VideosResponse, ApiError> {
        self.request(&endpoints::movie_path(id, endpoints::VIDEOS), &QueryParams::new()).await
    }

    pub async fn recommendations(&self, id: i64, page: u32) -> Result<MovieResponse, ApiError> {
        self.request(&endpoints::movie_path(id, endpoints::RECOMMENDATIONS), &page_params(page)).await
    }

    pub async fn similar(&self, id: i64, page: u32) -> Result<MovieResponse, ApiError> {
        self.request(&endpoints::movie_path(id, endpoints::SIMILAR), &page_params(page)).await
    }

    /// Hindi-language discovery
    pub async fn bollywood(&self, page: u32) -> Result<MovieResponse, ApiError> {
        let params = with_page(regional_params(endpoints::HINDI), page);
        self.request(endpoints::DISCOVER, &params).await
    }

    /// Telugu, Tamil, Malayalam and Kannada discovery
    pub async fn south_indian(&self, page: u32) -> Result<MovieResponse, ApiError> {
        let params = with_page(regional_params(endpoints::SOUTH_INDIAN_LANGUAGES), page);
        self.request(endpoints::DISCOVER, &params).await
    }

    pub async fn by_genre(&self, genre_id: i64, page: u32) -> Result<MovieResponse, ApiError> {
        let mut params = with_page(regional_params(endpoints::INDIAN_LANGUAGES), page);
        params.insert("with_genres".to_string(), genre_id.to_string());
        self.request(endpoints::DISCOVER, &params).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::stub::{StubResponse, StubTransport};
    use reqwest::Url;
    use std::collections::HashMap;

    const BASE: &str = "https://api.themoviedb.org/3";
    const EMPTY_PAGE: &str = r#"{"page":1,"results":[],"total_pages":1,"total_results":0}"#;

    fn client_with(stub: StubTransport) -> (TmdbClient, Arc<StubTransport>) {
        let stub = Arc::new(stub);
        (TmdbClient::new(BASE, "test-key", stub.clone()), stub)
    }

    fn query_map(url: &Url) -> HashMap<String, String> {
        url.query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }

    fn last_query(stub: &StubTransport) -> (String, HashMap<String, String>) {
        let url = stub.requests().last().cloned().expect("no request recorded");
        (url.path().to_string(), query_map(&url))
    }

    #[tokio::test]
    async fn test_regional_lists_carry_region_and_languages() {
        let (client, stub) = client_with(
            StubTransport::new()
                .json(endpoints::NOW_PLAYING, EMPTY_PAGE)
                .json(endpoints::POPULAR, EMPTY_PAGE)
                .json(endpoints::UPCOMING, EMPTY_PAGE),
        );

        client.now_playing(3).await.unwrap();
        client.popular(3).await.unwrap();
        client.upcoming(3).await.unwrap();

        for path in ["/3/movie/now_playing", "/3/movie/popular", "/3/movie/upcoming"] {
            let url = stub.requests().into_iter().find(|u| u.path() == path).unwrap();
            let q = query_map(&url);
            assert_eq!(q["region"], "IN");
            assert_eq!(q["with_original_language"], "hi,te,ta,ml,kn,bn,gu,mr,pa,en");
            assert_eq!(q["sort_by"], "popularity.desc");
            assert_eq!(q["page"], "3");
            assert_eq!(q["api_key"], "test-key");
            assert_eq!(q["language"], "en-US");
            assert!(!q.contains_key("vote_count.gte"));
        }
    }

    #[tokio::test]
    async fn test_top_rated_requires_vote_floor() {
        let (client, stub) = client_with(StubTransport::new().json(endpoints::TOP_RATED, EMPTY_PAGE));
        client.top_rated(1).await.unwrap();
        let (path, q) = last_query(&stub);
        assert_eq!(path, "/3/movie/top_rated");
        assert_eq!(q["vote_count.gte"], "100");
        assert_eq!(q["region"], "IN");
    }

    #[tokio::test]
    async fn test_trending_sends_page_only() {
        let (client, stub) = client_with(StubTransport::new().json(endpoints::TRENDING, EMPTY_PAGE));
        client.trending(1).await.unwrap();
        let (path, q) = last_query(&stub);
        assert_eq!(path, "/3/trending/movie/day");
        let mut keys: Vec<_> = q.keys().cloned().collect();
        keys.sort();
        assert_eq!(keys, vec!["api_key", "language", "page"]);
    }

    #[tokio::test]
    async fn test_search_params() {
        let (client, stub) = client_with(StubTransport::new().json(endpoints::SEARCH, EMPTY_PAGE));
        client.search("RRR & Baahubali", 2).await.unwrap();
        let (path, q) = last_query(&stub);
        assert_eq!(path, "/3/search/movie");
        assert_eq!(q["query"], "RRR & Baahubali");
        assert_eq!(q["page"], "2");
        assert_eq!(q["region"], "IN");
        assert_eq!(q["include_adult"], "false");
    }

    #[tokio::test]
    async fn test_per_movie_endpoints() {
        let (client, stub) = client_with(
            StubTransport::new()
                .json("/movie/550/credits", r#"{"id":550,"cast":[],"crew":[]}"#)
                .json("/movie/550/videos", r#"{"id":550,"results":[]}"#)
                .json("/movie/550/recommendations", EMPTY_PAGE)
                .json("/movie/550/similar", EMPTY_PAGE),
        );

        client.movie_credits(550).await.unwrap();
        assert_eq!(last_query(&stub).1.len(), 2);
        client.movie_videos(550).await.unwrap();
        client.recommendations(550, 1).await.unwrap();
        assert_eq!(last_query(&stub).1["page"], "1");
        client.similar(550, 4).await.unwrap();
        let (path, q) = last_query(&stub);
        assert_eq!(path, "/3/movie/550/similar");
        assert_eq!(q["page"], "4");
    }

    #[tokio::test]
    async fn test_discover_language_filters() {
        let (client, stub) = client_with(
            StubTransport::new()
                .json_with_query(endpoints::DISCOVER, &[("with_original_language", "hi")], EMPTY_PAGE)
                .json_with_query(endpoints::DISCOVER, &[("with_original_language", "te,ta,ml,kn")], EMPTY_PAGE)
                .json_with_query(endpoints::DISCOVER, &[("with_genres", "28")], EMPTY_PAGE),
        );

        client.bollywood(1).await.unwrap();
        assert_eq!(last_query(&stub).1["with_original_language"], "hi");

        client.south_indian(1).await.unwrap();
        assert_eq!(last_query(&stub).1["with_original_language"], "te,ta,ml,kn");

        client.by_genre(28, 2).await.unwrap();
        let (path, q) = last_query(&stub);
        assert_eq!(path, "/3/discover/movie");
        assert_eq!(q["with_genres"], "28");
        assert_eq!(q["with_original_language"], "hi,te,ta,ml,kn,bn,gu,mr,pa,en");
        assert_eq!(q["region"], "IN");
        assert_eq!(stub.request_count(endpoints::DISCOVER), 3);
    }

    #[tokio::test]
    async fn test_not_found_is_server_error_even_with_body() {
        let body = r#"{"id":1,"title":"Looks valid","vote_average":1.0,"vote_count":1,"popularity":1.0,"adult":false,"video":false}"#;
        let (client, _) = client_with(
            StubTransport::new().route("/movie/1", StubResponse::Body(404, body.to_string())),
        );
        let err = client.movie_details(1).await.unwrap_err();
        assert_eq!(err, ApiError::ServerError(404));
    }

    #[tokio::test]
    async fn test_decoding_and_network_failures() {
        let (client, _) = client_with(
            StubTransport::new()
                .json("/movie/2", r#"{"id": 2}"#)
                .route("/movie/3", StubResponse::Unreachable),
        );
        assert!(matches!(client.movie_details(2).await, Err(ApiError::DecodingError(_))));
        assert!(matches!(client.movie_details(3).await, Err(ApiError::NetworkUnavailable(_))));
    }

    #[tokio::test]
    async fn test_invalid_base_url_never_reaches_transport() {
        let stub = Arc::new(StubTransport::new());
        let client = TmdbClient::new("::not-a-url::", "k", stub.clone());
        assert!(matches!(client.trending(1).await, Err(ApiError::InvalidUrl(_))));
        assert!(stub.requests().is_empty());
    }

    #[test]
    fn test_from_config_rejects_blank_key() {
        assert!(TmdbClient::from_config(&Config::default(), "  ".to_string()).is_err());
        assert!(TmdbClient::from_config(&Config::default(), "key".to_string()).is_ok());
    }
}
