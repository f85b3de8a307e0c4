use cinefeed_client::TmdbClient;
use cinefeed_models::{Movie, MovieResponse};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn, Instrument};
use crate::actor::{Reducer, StateActor};
use crate::error::AppError;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchState {
    pub query: String,
    pub results: Vec<Movie>,
    pub is_searching: bool,
    pub has_searched: bool,
    pub last_error: Option<AppError>,
    generation: u64,
}

#[derive(Debug, Clone)]
pub enum SearchEvent {
    Started { generation: u64, query: String },
    Finished { generation: u64, outcome: Result<MovieResponse, AppError> },
    Cleared { generation: u64 },
}

impl Reducer for SearchState {
    type Event = SearchEvent;

    fn apply(&mut self, event: SearchEvent) {
        match event {
            SearchEvent::Started { generation, query } => {
                self.generation = generation;
                self.query = query;
                self.is_searching = true;
                self.last_error = None;
            }
            SearchEvent::Finished { generation, outcome } => {
                if generation != self.generation {
                    debug!(generation, current = self.generation, "Discarding stale search result");
                    return;
                }
                self.is_searching = false;
                self.has_searched = true;
                match outcome {
                    Ok(page) => self.results = page.results,
                    Err(error) => self.last_error = Some(error),
                }
            }
            SearchEvent::Cleared { generation } => {
                *self = SearchState {
                    generation,
                    ..SearchState::default()
                };
            }
        }
    }
}

/// Title search with at most one request in flight.
///
/// Each new query aborts the previous task and bumps a generation counter;
/// results carrying an older generation never reach the published state.
pub struct SearchSession {
    client: Arc<TmdbClient>,
    debounce: Duration,
    actor: StateActor<SearchState>,
    generation: u64,
    last_query: Option<String>,
    in_flight: Option<JoinHandle<()>>,
}

impl SearchSession {
    pub fn new(client: Arc<TmdbClient>, debounce: Duration) -> Self {
        Self {
            client,
            debounce,
            actor: StateActor::spawn(SearchState::default()),
            generation: 0,
            last_query: None,
            in_flight: None,
        }
    }

    /// Blank input clears; repeating the last query does nothing.
    pub fn search(&mut self, query: &str) {
        let query = query.trim();
        if query.is_empty() {
            self.clear();
            return;
        }
        if self.last_query.as_deref() == Some(query) {
            debug!(query, "Ignoring repeated query");
            return;
        }
        self.start(query.to_string(), self.debounce);
    }

    /// Re-issue the last query right away, e.g. after a failure
    pub fn retry(&mut self) {
        if let Some(query) = self.last_query.clone() {
            info!(query = %query, "Retrying search");
            self.start(query, Duration::ZERO);
        }
    }

    pub fn clear(&mut self) {
        self.abort_in_flight();
        self.generation += 1;
        self.last_query = None;
        self.actor.send(SearchEvent::Cleared {
            generation: self.generation,
        });
    }

    pub fn snapshot(&self) -> SearchState {
        self.actor.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<SearchState> {
        self.actor.subscribe()
    }

    /// Wait for the most recent search to finish
    pub async fn finished(&self) -> Option<SearchState> {
        let generation = self.generation;
        self.actor
            .wait_for(|s| s.generation == generation && !s.is_searching)
            .await
    }

    fn start(&mut self, query: String, delay: Duration) {
        self.abort_in_flight();
        self.generation += 1;
        let generation = self.generation;
        self.last_query = Some(query.clone());
        self.actor.send(SearchEvent::Started {
            generation,
            query: query.clone(),
        });

        let client = self.client.clone();
        let events = self.actor.sender();
        let task = async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            debug!(generation, "Searching for '{}'", query);
            let outcome = client.search(&query, 1).await.map_err(|e| {
                warn!(error = %e, "Search for '{}' failed", query);
                AppError::from(e)
            });
            let _ = events.send(SearchEvent::Finished { generation, outcome });
        };
        self.in_flight = Some(tokio::spawn(task.in_current_span()));
    }

    fn abort_in_flight(&mut self) {
        if let Some(task) = self.in_flight.take() {
            task.abort();
        }
    }
}

impl Drop for SearchSession {
    fn drop(&mut self) {
        self.abort_in_flight();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cinefeed_client::{endpoints, StubResponse, StubTransport};
    use serde_json::json;

    fn page_json(titles: &[&str]) -> String {
        let results: Vec<_> = titles
            .iter()
            .enumerate()
            .map(|(i, t)| json!({"id": i + 1, "title": t, "vote_average": 7.0, "vote_count": 1, "popularity": 1.0, "adult": false, "video": false}))
            .collect();
        json!({"page": 1, "results": results, "total_pages": 1, "total_results": titles.len()}).to_string()
    }

    fn session(stub: Arc<StubTransport>, debounce: Duration) -> SearchSession {
        let client = TmdbClient::new("https://api.themoviedb.org/3", "k", stub);
        SearchSession::new(Arc::new(client), debounce)
    }

    async fn finished(session: &SearchSession) -> SearchState {
        tokio::time::timeout(Duration::from_secs(5), session.finished())
            .await
            .unwrap()
            .unwrap()
    }

    #[test]
    fn test_stale_generation_is_dropped() {
        let mut state = SearchState::default();
        state.apply(SearchEvent::Started { generation: 1, query: "old".to_string() });
        state.apply(SearchEvent::Started { generation: 2, query: "new".to_string() });
        state.apply(SearchEvent::Finished {
            generation: 1,
            outcome: Err(AppError::Unknown),
        });
        assert!(state.is_searching);
        assert!(state.last_error.is_none());
        assert_eq!(state.query, "new");
    }

    #[test]
    fn test_failure_keeps_previous_results() {
        let mut state = SearchState::default();
        state.apply(SearchEvent::Started { generation: 1, query: "a".to_string() });
        state.apply(SearchEvent::Finished {
            generation: 1,
            outcome: Ok(serde_json::from_str(&page_json(&["A"])).unwrap()),
        });
        state.apply(SearchEvent::Started { generation: 2, query: "b".to_string() });
        state.apply(SearchEvent::Finished {
            generation: 2,
            outcome: Err(AppError::NoInternetConnection),
        });
        assert_eq!(state.results.len(), 1);
        assert!(state.has_searched);
        assert_eq!(state.last_error, Some(AppError::NoInternetConnection));
    }

    #[tokio::test]
    async fn test_search_publishes_results() {
        let stub = Arc::new(
            StubTransport::new().json_with_query(endpoints::SEARCH, &[("query", "RRR")], page_json(&["RRR"])),
        );
        let mut session = session(stub.clone(), Duration::from_millis(10));
        session.search("  RRR ");

        let state = finished(&session).await;
        assert_eq!(state.query, "RRR");
        assert_eq!(state.results[0].title, "RRR");
        assert!(state.has_searched);
        assert!(!state.is_searching);
        assert_eq!(stub.request_count(endpoints::SEARCH), 1);
    }

    #[tokio::test]
    async fn test_newer_query_supersedes_older() {
        let stub = Arc::new(
            StubTransport::new()
                .route_full(
                    endpoints::SEARCH,
                    &[("query", "slow")],
                    StubResponse::Body(200, page_json(&["Slow"])),
                    Some(Duration::from_millis(200)),
                )
                .json_with_query(endpoints::SEARCH, &[("query", "fast")], page_json(&["Fast"])),
        );
        let mut session = session(stub.clone(), Duration::ZERO);
        session.search("slow");
        tokio::time::sleep(Duration::from_millis(20)).await;
        session.search("fast");

        let state = finished(&session).await;
        assert_eq!(state.results[0].title, "Fast");

        tokio::time::sleep(Duration::from_millis(300)).await;
        let state = session.snapshot();
        assert_eq!(state.query, "fast");
        assert_eq!(state.results[0].title, "Fast");
    }

    #[tokio::test]
    async fn test_debounce_swallows_superseded_input() {
        let stub = Arc::new(StubTransport::new().json(endpoints::SEARCH, page_json(&["Any"])));
        let mut session = session(stub.clone(), Duration::from_millis(50));
        session.search("b");
        session.search("ba");
        session.search("baa");

        let state = finished(&session).await;
        assert_eq!(state.query, "baa");
        assert_eq!(stub.request_count(endpoints::SEARCH), 1);
    }

    #[tokio::test]
    async fn test_repeated_query_is_ignored() {
        let stub = Arc::new(StubTransport::new().json(endpoints::SEARCH, page_json(&["Dangal"])));
        let mut session = session(stub.clone(), Duration::ZERO);
        session.search("Dangal");
        finished(&session).await;
        session.search("Dangal ");
        finished(&session).await;
        assert_eq!(stub.request_count(endpoints::SEARCH), 1);
    }

    #[tokio::test]
    async fn test_blank_query_clears() {
        let stub = Arc::new(StubTransport::new().json(endpoints::SEARCH, page_json(&["Lagaan"])));
        let mut session = session(stub.clone(), Duration::ZERO);
        session.search("Lagaan");
        finished(&session).await;

        session.search("   ");
        let state = finished(&session).await;
        assert!(state.results.is_empty());
        assert!(!state.has_searched);
        assert!(state.query.is_empty());

        // Same text again after a clear is a fresh search
        session.search("Lagaan");
        finished(&session).await;
        assert_eq!(stub.request_count(endpoints::SEARCH), 2);
    }

    #[tokio::test]
    async fn test_retry_after_failure() {
        let stub = Arc::new(StubTransport::new().route(endpoints::SEARCH, StubResponse::Body(429, String::new())));
        let mut session = session(stub.clone(), Duration::ZERO);
        session.search("Sholay");
        let state = finished(&session).await;
        assert_eq!(state.last_error, Some(AppError::RateLimitExceeded));
        assert!(state.last_error.as_ref().unwrap().is_retryable());

        session.retry();
        finished(&session).await;
        assert_eq!(stub.request_count(endpoints::SEARCH), 2);
    }
}
