//! Job Posting Aggregation Library
//!
//! Aggregates job postings from heterogeneous employer sources into one
//! canonical record shape, deduplicated by stable identity and annotated
//! with a normalized location key.
//!
//! # Design Philosophy
//!
//! - One record shape, many traversal algorithms
//! - Sources are not trusted to terminate pagination or report exhaustion;
//!   connectors carry their own termination guarantees
//! - Partial results beat all-or-nothing: only the first fetch of a
//!   traversal is fatal, everything later is skip-and-continue
//! - Transport and parsing stay behind narrow seams ([`Fetcher`], the
//!   `parse` helpers) so traversal logic is testable with canned data
//!
//! # Usage
//!
//! ```rust,ignore
//! use roleradar::{
//!     Aggregator, Connector, FeedConnector, HttpFetcher,
//!     PaginatedApiConnector, ScrapeLimits, SitemapConnector,
//! };
//!
//! let fetcher = HttpFetcher::new();
//! let aggregator = Aggregator::new()
//!     .with_connector(Connector::PaginatedApi(PaginatedApiConnector::new(
//!         "Acme",
//!         "https://jobs.acme.test/search.json",
//!         "https://jobs.acme.test",
//!     )))
//!     .with_connector(Connector::SitemapCrawl(SitemapConnector::new(
//!         "Umbrella",
//!         "https://www.umbrella.test/sitemap/sitemap.xml",
//!         "umbrella.test",
//!     )))
//!     .with_connector(Connector::Feed(FeedConnector::new(
//!         "Initech",
//!         "https://www.initech.test/jobs/rss.xml",
//!     )));
//!
//! let result = aggregator.run(&fetcher, &ScrapeLimits::default()).await;
//! ```
//!
//! # Modules
//!
//! - [`connectors`] - Per-source traversal algorithms (paginated API,
//!   sitemap crawl, RSS feed)
//! - [`aggregate`] - Drives connectors and merges their outputs
//! - [`identity`] - Stable job-id resolution with deterministic hash fallback
//! - [`location`] - Canonical `COUNTRY-STATE-CITY` key and display formatting
//! - [`fetcher`] - HTTP fetch boundary
//! - [`parse`] - HTML/XML/feed parsing collaborators
//! - [`testing`] - Mock fetcher for tests

pub mod aggregate;
pub mod connectors;
pub mod error;
pub mod fetcher;
pub mod identity;
pub mod job;
pub mod location;
pub mod parse;
pub mod testing;

// Re-export core types at crate root
pub use aggregate::{Aggregated, Aggregator, SourceFailure};
pub use connectors::{
    Connector, FeedConnector, PaginatedApiConnector, ScrapeLimits, SitemapConnector,
};
pub use error::{FetchError, FetchResult, ScrapeError, ScrapeResult};
pub use fetcher::{Accept, Fetcher, HttpFetcher};
pub use job::Job;
pub use location::{canonical_country, display, normalize};
