//! HTTP client abstraction for testability

use std::time::Duration;

use reqwest::StatusCode;

/// Default timeout for HTTP requests in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Result of a GET request that reached the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fetched {
    /// HTTP 200 with the response body.
    Body(Vec<u8>),
    /// HTTP 404. The object legitimately doesn't exist.
    NotFound,
}

/// Errors from a GET request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// The server answered with something other than 200 or 404.
    #[error("[{status}] {url}")]
    UnexpectedStatus { url: String, status: u16 },

    /// The request never produced a usable response.
    #[error("request to {url} failed: {reason}")]
    Transport { url: String, reason: String },

    /// The HTTP client could not be constructed.
    #[error("failed to create HTTP client: {0}")]
    ClientBuild(String),
}

/// Trait for HTTP client operations.
///
/// This abstraction allows for dependency injection and easier testing
/// by enabling mock HTTP clients in tests.
pub trait HttpClient: Send + Sync {
    /// Performs an HTTP GET request.
    ///
    /// # Arguments
    ///
    /// * `url` - The URL to request
    ///
    /// # Returns
    ///
    /// The body on 200, `Fetched::NotFound` on 404, or an error.
    fn get(&self, url: &str) -> Result<Fetched, FetchError>;
}

/// Real HTTP client implementation using reqwest.
#[derive(Debug)]
pub struct ReqwestClient {
    client: reqwest::blocking::Client,
    timeout: Duration,
}

impl ReqwestClient {
    /// Creates a new ReqwestClient with default configuration.
    pub fn new() -> Result<Self, FetchError> {
        Self::with_timeout(DEFAULT_TIMEOUT_SECS)
    }

    /// Creates a new ReqwestClient with custom timeout.
    pub fn with_timeout(timeout_secs: u64) -> Result<Self, FetchError> {
        let timeout = Duration::from_secs(timeout_secs);
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("tilemirror/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FetchError::ClientBuild(e.to_string()))?;

        Ok(Self { client, timeout })
    }

    /// The per-request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl HttpClient for ReqwestClient {
    fn get(&self, url: &str) -> Result<Fetched, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| FetchError::Transport {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        match response.status() {
            StatusCode::OK => response
                .bytes()
                .map(|b| Fetched::Body(b.to_vec()))
                .map_err(|e| FetchError::Transport {
                    url: url.to_string(),
                    reason: format!("failed to read response: {}", e),
                }),
            StatusCode::NOT_FOUND => Ok(Fetched::NotFound),
            status => Err(FetchError::UnexpectedStatus {
                url: url.to_string(),
                status: status.as_u16(),
            }),
        }
    }
}

/// Client for commands that only touch local files.
///
/// Every request fails with [`FetchError::Transport`] without any network
/// access.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineClient;

impl HttpClient for OfflineClient {
    fn get(&self, url: &str) -> Result<Fetched, FetchError> {
        Err(FetchError::Transport {
            url: url.to_string(),
            reason: "offline".to_string(),
        })
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::collections::HashMap;

    /// Mock HTTP client serving a fixed set of URLs.
    ///
    /// Unknown URLs answer 404. Every request is recorded.
    #[derive(Default)]
    pub struct MockHttpClient {
        pub responses: HashMap<String, Result<Fetched, FetchError>>,
        pub requests: Mutex<Vec<String>>,
    }

    impl MockHttpClient {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_body(mut self, url: &str, body: impl Into<Vec<u8>>) -> Self {
            self.responses
                .insert(url.to_string(), Ok(Fetched::Body(body.into())));
            self
        }

        pub fn with_error(mut self, url: &str, error: FetchError) -> Self {
            self.responses.insert(url.to_string(), Err(error));
            self
        }

        pub fn request_count(&self) -> usize {
            self.requests.lock().len()
        }
    }

    impl HttpClient for MockHttpClient {
        fn get(&self, url: &str) -> Result<Fetched, FetchError> {
            self.requests.lock().push(url.to_string());
            self.responses
                .get(url)
                .cloned()
                .unwrap_or(Ok(Fetched::NotFound))
        }
    }

    #[test]
    fn test_mock_client_success() {
        let mock = MockHttpClient::new().with_body("http://example.com/a", vec![1, 2, 3, 4]);

        let result = mock.get("http://example.com/a");
        assert_eq!(result, Ok(Fetched::Body(vec![1, 2, 3, 4])));
    }

    #[test]
    fn test_mock_client_unknown_url_is_not_found() {
        let mock = MockHttpClient::new();
        assert_eq!(mock.get("http://example.com/missing"), Ok(Fetched::NotFound));
        assert_eq!(mock.request_count(), 1);
    }

    #[test]
    fn test_mock_client_error() {
        let mock = MockHttpClient::new().with_error(
            "http://example.com/a",
            FetchError::UnexpectedStatus {
                url: "http://example.com/a".to_string(),
                status: 503,
            },
        );

        let result = mock.get("http://example.com/a");
        assert!(result.is_err());
    }

    #[test]
    fn test_offline_client_refuses_requests() {
        let result = OfflineClient.get("http://example.com/a");
        assert_eq!(
            result,
            Err(FetchError::Transport {
                url: "http://example.com/a".to_string(),
                reason: "offline".to_string(),
            })
        );
    }

    #[test]
    fn test_reqwest_client_timeout() {
        let client = ReqwestClient::with_timeout(5).unwrap();
        assert_eq!(client.timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_fetch_error_display_includes_url() {
        let err = FetchError::UnexpectedStatus {
            url: "https://example.com/8/1/1.png".to_string(),
            status: 500,
        };
        assert_eq!(err.to_string(), "[500] https://example.com/8/1/1.png");
    }
}
