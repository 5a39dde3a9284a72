//! Mock fetcher for testing.
//!
//! Lets traversal logic run against canned responses, with per-URL call
//! counts for verifying visited-set and pagination behavior.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use crate::error::{FetchError, FetchResult};
use crate::fetcher::{Accept, Fetcher};

/// Mock implementation of [`Fetcher`] with canned url -> body responses.
///
/// URLs without a canned response fail with a connection-style error, which
/// doubles as the way to simulate an unreachable source.
///
/// # Example
///
/// ```rust
/// use roleradar::testing::MockFetcher;
///
/// let fetcher = MockFetcher::new()
///     .with_response("https://acme.test/feed.xml", "<rss/>");
/// ```
#[derive(Default)]
pub struct MockFetcher {
    responses: Arc<RwLock<HashMap<String, String>>>,
    /// URLs that fail with a transport error even though they are known
    failures: Arc<RwLock<HashMap<String, u16>>>,
    calls: Arc<RwLock<Vec<String>>>,
}

impl MockFetcher {
    /// Create an empty mock fetcher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a canned response (builder pattern).
    pub fn with_response(self, url: &str, body: &str) -> Self {
        self.add_response(url, body);
        self
    }

    /// Make a URL fail with the given HTTP status (builder pattern).
    pub fn with_status(self, url: &str, status: u16) -> Self {
        self.failures.write().unwrap().insert(url.to_string(), status);
        self
    }

    /// Add a canned response.
    pub fn add_response(&self, url: &str, body: &str) {
        self.responses
            .write()
            .unwrap()
            .insert(url.to_string(), body.to_string());
    }

    /// Total number of fetches performed.
    pub fn call_count(&self) -> usize {
        self.calls.read().unwrap().len()
    }

    /// Number of fetches of one specific URL.
    pub fn calls_for(&self, url: &str) -> usize {
        self.calls.read().unwrap().iter().filter(|u| *u == url).count()
    }

    /// Every fetched URL, in request order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.read().unwrap().clone()
    }
}

impl Clone for MockFetcher {
    fn clone(&self) -> Self {
        Self {
            responses: Arc::clone(&self.responses),
            failures: Arc::clone(&self.failures),
            calls: Arc::clone(&self.calls),
        }
    }
}

#[async_trait]
impl Fetcher for MockFetcher {
    async fn get(&self, url: &str, _accept: Accept) -> FetchResult<String> {
        self.calls.write().unwrap().push(url.to_string());

        if let Some(status) = self.failures.read().unwrap().get(url) {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: *status,
            });
        }

        self.responses
            .read()
            .unwrap()
            .get(url)
            .cloned()
            .ok_or_else(|| {
                FetchError::Http(format!("connection refused: {url}").into())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn canned_responses_and_call_tracking() {
        let fetcher = MockFetcher::new().with_response("https://a.test/x", "body");

        assert_eq!(fetcher.get("https://a.test/x", Accept::Html).await.unwrap(), "body");
        assert!(fetcher.get("https://a.test/missing", Accept::Html).await.is_err());

        assert_eq!(fetcher.call_count(), 2);
        assert_eq!(fetcher.calls_for("https://a.test/x"), 1);
    }

    #[tokio::test]
    async fn status_failures() {
        let fetcher = MockFetcher::new().with_status("https://a.test/x", 503);
        let err = fetcher.get("https://a.test/x", Accept::Json).await.unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 503, .. }));
    }
}
