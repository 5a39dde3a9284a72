//! Source connectors.
//!
//! Each connector knows how to traverse one upstream access pattern and
//! emit canonical [`Job`] records:
//!
//! - [`PaginatedApiConnector`] - offset-paginated JSON search APIs
//! - [`SitemapConnector`] - sitemap discovery plus detail-page extraction
//! - [`FeedConnector`] - RSS job feeds
//!
//! The set is closed on purpose: connectors are tagged variants of one
//! capability, not an open plugin surface. Shared behavior (identity
//! resolution, location normalization) lives in free functions, not in a
//! base type.
//!
//! Every connector follows the same failure asymmetry: the first fetch of a
//! traversal propagates as a [`crate::ScrapeError`] (the source is probably
//! unreachable), while later per-page or per-item failures are logged and
//! skipped (one bad item among many good ones).

pub mod feed;
pub mod paginated;
pub mod sitemap;

pub use feed::FeedConnector;
pub use paginated::PaginatedApiConnector;
pub use sitemap::SitemapConnector;

use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::error::{ScrapeError, ScrapeResult};
use crate::fetcher::Fetcher;
use crate::job::Job;

/// Caller-supplied traversal limits and pacing.
///
/// Every field is optional in effect; the defaults run a full sync with a
/// small politeness delay and sequential detail fetches.
#[derive(Debug, Clone)]
pub struct ScrapeLimits {
    /// Items requested per page (paginated APIs)
    pub page_size: usize,

    /// Halt after this many pages regardless of other signals
    pub max_pages: Option<usize>,

    /// Cap on sitemap documents visited during discovery
    pub max_sitemaps: Option<usize>,

    /// Cap on detail pages fetched / feed entries kept
    pub max_items: Option<usize>,

    /// Delay between sequential fetches (politeness, not correctness)
    pub politeness_delay: Duration,

    /// Worker concurrency for the detail-fetch phase of sitemap crawls
    pub detail_concurrency: usize,

    /// Cooperative cancellation, checked before each fetch
    pub cancel: Option<CancellationToken>,
}

impl Default for ScrapeLimits {
    fn default() -> Self {
        Self {
            page_size: 50,
            max_pages: None,
            max_sitemaps: None,
            max_items: None,
            politeness_delay: Duration::from_millis(50),
            detail_concurrency: 1,
            cancel: None,
        }
    }
}

impl ScrapeLimits {
    /// Create limits with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the page size for paginated APIs.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Cap the number of pages fetched.
    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = Some(max_pages);
        self
    }

    /// Cap the number of sitemaps visited.
    pub fn with_max_sitemaps(mut self, max_sitemaps: usize) -> Self {
        self.max_sitemaps = Some(max_sitemaps);
        self
    }

    /// Cap the number of items collected.
    pub fn with_max_items(mut self, max_items: usize) -> Self {
        self.max_items = Some(max_items);
        self
    }

    /// Set the delay between sequential fetches.
    pub fn with_politeness_delay(mut self, delay: Duration) -> Self {
        self.politeness_delay = delay;
        self
    }

    /// Set the worker concurrency for detail fetches.
    pub fn with_detail_concurrency(mut self, workers: usize) -> Self {
        self.detail_concurrency = workers.max(1);
        self
    }

    /// Attach a cancellation token.
    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Error out if the attached token has been cancelled.
    pub(crate) fn ensure_live(&self) -> ScrapeResult<()> {
        match &self.cancel {
            Some(token) if token.is_cancelled() => Err(ScrapeError::Cancelled),
            _ => Ok(()),
        }
    }

    /// Sleep for the politeness delay, if any.
    pub(crate) async fn pause(&self) {
        if !self.politeness_delay.is_zero() {
            tokio::time::sleep(self.politeness_delay).await;
        }
    }
}

/// The closed set of source connectors.
#[derive(Debug)]
pub enum Connector {
    PaginatedApi(PaginatedApiConnector),
    SitemapCrawl(SitemapConnector),
    Feed(FeedConnector),
}

impl Connector {
    /// Source display name for this connector.
    pub fn company(&self) -> &str {
        match self {
            Connector::PaginatedApi(c) => c.company(),
            Connector::SitemapCrawl(c) => c.company(),
            Connector::Feed(c) => c.company(),
        }
    }

    /// Run one full traversal and return the canonical records found.
    pub async fn scrape(
        &self,
        fetcher: &dyn Fetcher,
        limits: &ScrapeLimits,
    ) -> ScrapeResult<Vec<Job>> {
        match self {
            Connector::PaginatedApi(c) => c.scrape(fetcher, limits).await,
            Connector::SitemapCrawl(c) => c.scrape(fetcher, limits).await,
            Connector::Feed(c) => c.scrape(fetcher, limits).await,
        }
    }
}
