//! The HTTP fetch boundary.
//!
//! Connectors never talk to `reqwest` directly; they go through the
//! [`Fetcher`] trait so traversal logic can be exercised against the
//! canned [`crate::testing::MockFetcher`] in tests. The trait is the whole
//! transport contract: one GET, a content-type hint, body back as text.
//! Retries, pooling, and redirects live below this line.

use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::{FetchError, FetchResult};

/// Descriptive User-Agent sent with every request.
const USER_AGENT: &str = "roleradar/0.1 (+job aggregation; contact site owner via repo)";

/// Request timeout for a single fetch.
const TIMEOUT: Duration = Duration::from_secs(30);

/// Expected content type of a fetch, mapped to the Accept header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accept {
    Json,
    Html,
    Xml,
}

impl Accept {
    /// Accept header value for this content type.
    pub fn header_value(self) -> &'static str {
        match self {
            Accept::Json => "application/json",
            Accept::Html => "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            Accept::Xml => "application/rss+xml, application/xml;q=0.9, text/xml;q=0.8, */*;q=0.5",
        }
    }
}

/// Blocking-free GET capability used by every connector.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch `url` and return the response body as text.
    ///
    /// Implementations must treat any non-2xx status as an error; connectors
    /// rely on that to tell a reachable source from a broken one.
    async fn get(&self, url: &str, accept: Accept) -> FetchResult<String>;
}

/// Production fetcher backed by a shared `reqwest::Client`.
pub struct HttpFetcher {
    client: reqwest::Client,
    user_agent: String,
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpFetcher {
    /// Create a fetcher with the default client (30s timeout).
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(TIMEOUT)
                .build()
                .expect("Failed to create HTTP client"),
            user_agent: USER_AGENT.to_string(),
        }
    }

    /// Set a custom user agent.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set a custom HTTP client.
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn get(&self, url: &str, accept: Accept) -> FetchResult<String> {
        debug!(url = %url, "HTTP fetch starting");

        let response = self
            .client
            .get(url)
            .header("User-Agent", &self.user_agent)
            .header("Accept", accept.header_value())
            .send()
            .await
            .map_err(|e| {
                warn!(url = %url, error = %e, "HTTP request failed");
                if e.is_timeout() {
                    FetchError::Timeout { url: url.to_string() }
                } else {
                    FetchError::Http(Box::new(e))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(|e| FetchError::Http(Box::new(e)))
    }
}
