use async_trait::async_trait;
use cinefeed_config::NetworkConfig;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Url};
use std::time::Duration;
use crate::error::ApiError;

/// Executes a single GET and hands back the raw body.
///
/// Implementations map failures onto `ApiError` themselves: no response at all
/// is `NetworkUnavailable`, a non-2xx status is `ServerError` whatever the body
/// says. No retries happen at this layer.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &Url) -> Result<Vec<u8>, ApiError>;
}

/// `reqwest`-backed transport used outside of tests
#[derive(Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(connect_timeout: Duration, request_timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("cinefeed/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(connect_timeout)
            .timeout(request_timeout)
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to create HTTP client: {}", e))?;
        Ok(Self { client })
    }

    pub fn from_config(network: &NetworkConfig) -> anyhow::Result<Self> {
        Self::new(network.connect_timeout(), network.request_timeout())
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn get(&self, url: &Url) -> Result<Vec<u8>, ApiError> {
        // without_url keeps the api_key query parameter out of error messages
        let response = self
            .client
            .get(url.clone())
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await
            .map_err(|e| ApiError::NetworkUnavailable(e.without_url().to_string()))?;

        check_status(response.status().as_u16())?;

        let body = response
            .bytes()
            .await
            .map_err(|e| ApiError::NetworkUnavailable(e.without_url().to_string()))?;
        Ok(body.to_vec())
    }
}

pub(crate) fn check_status(status: u16) -> Result<(), ApiError> {
    if (200..=299).contains(&status) {
        Ok(())
    } else {
        Err(ApiError::ServerError(status))
    }
}

#[cfg(any(test, feature = "test-util"))]
pub mod stub {
    //! In-memory transport with canned responses, for tests.

    use super::*;
    use std::sync::Mutex;

    #[derive(Debug, Clone)]
    pub enum StubResponse {
        /// Status code and body; non-2xx statuses become `ServerError`
        Body(u16, String),
        /// Connection-level failure
        Unreachable,
    }

    struct Route {
        path: String,
        query: Vec<(String, String)>,
        response: StubResponse,
        delay: Option<Duration>,
    }

    /// Routes match when the request path ends with the route path and every
    /// query pair on the route is present. First match wins; anything
    /// unmatched answers 404.
    #[derive(Default)]
    pub struct StubTransport {
        routes: Mutex<Vec<Route>>,
        requests: Mutex<Vec<Url>>,
    }

    impl StubTransport {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn route(self, path: &str, response: StubResponse) -> Self {
            self.route_full(path, &[], response, None)
        }

        pub fn json(self, path: &str, body: impl Into<String>) -> Self {
            self.route(path, StubResponse::Body(200, body.into()))
        }

        pub fn json_with_query(self, path: &str, query: &[(&str, &str)], body: impl Into<String>) -> Self {
            self.route_full(path, query, StubResponse::Body(200, body.into()), None)
        }

        pub fn route_full(
            self,
            path: &str,
            query: &[(&str, &str)],
            response: StubResponse,
            delay: Option<Duration>,
        ) -> Self {
            self.routes.lock().unwrap().push(Route {
                path: path.to_string(),
                query: query.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
                response,
                delay,
            });
            self
        }

        /// Every URL requested so far, in request order
        pub fn requests(&self) -> Vec<Url> {
            self.requests.lock().unwrap().clone()
        }

        pub fn request_count(&self, path: &str) -> usize {
            self.requests
                .lock()
                .unwrap()
                .iter()
                .filter(|u| u.path().ends_with(path))
                .count()
        }

        fn lookup(&self, url: &Url) -> (StubResponse, Option<Duration>) {
            let pairs: Vec<(String, String)> = url
                .query_pairs()
                .map(|(k, v)| (k.into_owned(), v.into_owned()))
                .collect();
            let routes = self.routes.lock().unwrap();
            routes
                .iter()
                .find(|r| url.path().ends_with(&r.path) && r.query.iter().all(|q| pairs.contains(q)))
                .map(|r| (r.response.clone(), r.delay))
                .unwrap_or((StubResponse::Body(404, r#"{"status_code":34}"#.to_string()), None))
        }
    }

    #[async_trait]
    impl Transport for StubTransport {
        async fn get(&self, url: &Url) -> Result<Vec<u8>, ApiError> {
            self.requests.lock().unwrap().push(url.clone());
            let (response, delay) = self.lookup(url);
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            match response {
                StubResponse::Body(status, body) => {
                    check_status(status)?;
                    Ok(body.into_bytes())
                }
                StubResponse::Unreachable => {
                    Err(ApiError::NetworkUnavailable("connection refused".to_string()))
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_status_boundaries() {
        assert!(check_status(200).is_ok());
        assert!(check_status(299).is_ok());
        assert_eq!(check_status(199), Err(ApiError::ServerError(199)));
        assert_eq!(check_status(300), Err(ApiError::ServerError(300)));
        assert_eq!(check_status(404), Err(ApiError::ServerError(404)));
    }

    #[test]
    fn test_reqwest_transport_builds_from_config() {
        assert!(ReqwestTransport::from_config(&NetworkConfig::default()).is_ok());
    }
}
