//! Typed errors for the aggregation library.
//!
//! Uses `thiserror` for library errors (not `anyhow`) to provide
//! strongly-typed, composable error handling.
//!
//! The error surface mirrors the traversal contract: only the *first*
//! fetch of a traversal propagates as a [`ScrapeError`]; every later
//! per-page, per-sitemap, or per-detail failure is logged and the unit
//! skipped, so partial results survive flaky sources.

use thiserror::Error;

/// Errors from the HTTP fetch boundary.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Transport-level failure (connect, TLS, body read)
    #[error("HTTP error: {0}")]
    Http(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Non-2xx response
    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    /// Connection or read timeout
    #[error("timeout fetching: {url}")]
    Timeout { url: String },
}

/// Errors that can abort a whole traversal run.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// Initial fetch of a traversal failed
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),

    /// Invalid URL format
    #[error("invalid URL: {url}")]
    InvalidUrl { url: String },

    /// Initial response body could not be parsed
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Operation was cancelled
    #[error("operation cancelled")]
    Cancelled,
}

/// Result type alias for traversal operations.
pub type ScrapeResult<T> = std::result::Result<T, ScrapeError>;

/// Result type alias for fetch operations.
pub type FetchResult<T> = std::result::Result<T, FetchError>;
