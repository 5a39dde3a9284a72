//! Offset-paginated JSON search APIs.
//!
//! The traversal is a small state machine over `(offset, collected,
//! consecutive_stalls, pages_fetched)`. Sources of this shape are not
//! trusted to report exhaustion: some loop forever, some repeat the last
//! page, some report a hit count that never reconciles with what they
//! return. Termination therefore rests on three independent signals:
//!
//! 1. an empty page halts immediately;
//! 2. three consecutive pages that add no *new* unique job ids halt
//!    (stall ceiling), regardless of the reported hit count;
//! 3. the offset advances by the number of items a page actually returned,
//!    so every non-halting iteration makes progress.
//!
//! A reported total hit count and a caller-supplied page cap are honored as
//! optional early exits on top of that.

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};
use url::Url;

use super::ScrapeLimits;
use crate::error::{ScrapeResult, ScrapeError};
use crate::fetcher::{Accept, Fetcher};
use crate::job::Job;
use crate::{identity, location};

/// Number of consecutive no-new-items pages before the traversal halts.
const STALL_CEILING: u32 = 3;

/// One page of the search response.
///
/// Items are kept as raw JSON values: upstream schemas drift, and the
/// extraction code wants to probe alternative field names rather than fail
/// the whole page on one unexpected shape.
#[derive(Debug, Deserialize)]
struct SearchPage {
    #[serde(default)]
    jobs: Vec<Value>,

    /// Total hit count, when the source reports one
    #[serde(default)]
    hits: Option<u64>,
}

/// Connector for offset-paginated JSON search endpoints.
///
/// # Example
///
/// ```rust,ignore
/// let connector = PaginatedApiConnector::new(
///     "Acme",
///     "https://jobs.acme.test/search.json",
///     "https://jobs.acme.test",
/// )
/// .with_param("sort", "recent")
/// .with_param("facets[]", "normalized_country_code");
/// let jobs = connector.scrape(&fetcher, &ScrapeLimits::default()).await?;
/// ```
#[derive(Debug)]
pub struct PaginatedApiConnector {
    company: String,
    endpoint: String,
    link_base: String,
    base_params: Vec<(String, String)>,
}

impl PaginatedApiConnector {
    /// Create a connector for one search endpoint.
    ///
    /// `link_base` is prefixed onto each item's relative job path to form
    /// the canonical detail URL.
    pub fn new(
        company: impl Into<String>,
        endpoint: impl Into<String>,
        link_base: impl Into<String>,
    ) -> Self {
        Self {
            company: company.into(),
            endpoint: endpoint.into(),
            link_base: link_base.into(),
            base_params: Vec::new(),
        }
    }

    /// Add a fixed query parameter sent with every page request.
    /// Repeated keys are allowed (e.g. `facets[]`).
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.base_params.push((key.into(), value.into()));
        self
    }

    /// Source display name.
    pub fn company(&self) -> &str {
        &self.company
    }

    /// Run the paginated traversal.
    pub async fn scrape(
        &self,
        fetcher: &dyn Fetcher,
        limits: &ScrapeLimits,
    ) -> ScrapeResult<Vec<Job>> {
        info!(
            company = %self.company,
            endpoint = %self.endpoint,
            page_size = limits.page_size,
            "paginated traversal starting"
        );

        let mut collected: IndexMap<String, Job> = IndexMap::new();
        let mut offset: u64 = 0;
        let mut pages_fetched: usize = 0;
        let mut consecutive_stalls: u32 = 0;

        loop {
            if let Some(cap) = limits.max_pages {
                if pages_fetched >= cap {
                    debug!(company = %self.company, pages_fetched, "page cap reached");
                    break;
                }
            }
            limits.ensure_live()?;

            let page_url = self.page_url(offset, limits.page_size)?;
            let page = if pages_fetched == 0 {
                // The initial request is fatal on failure: nothing came back
                // at all, so the source is most likely unreachable.
                let body = fetcher.get(&page_url, Accept::Json).await?;
                serde_json::from_str::<SearchPage>(&body)?
            } else {
                match self.fetch_page(fetcher, &page_url).await {
                    Some(page) => page,
                    // A mid-run failure leaves no way to advance the offset
                    // honestly, so the traversal halts with what it has.
                    None => break,
                }
            };
            pages_fetched += 1;

            if page.jobs.is_empty() {
                debug!(company = %self.company, offset, "empty page, source exhausted");
                break;
            }

            let before = collected.len();
            for item in &page.jobs {
                if let Some(job) = self.extract_item(item) {
                    collected.insert(job.job_id.clone(), job);
                }
            }

            if collected.len() == before {
                consecutive_stalls += 1;
                debug!(company = %self.company, offset, consecutive_stalls, "stalled page");
            } else {
                consecutive_stalls = 0;
            }
            if consecutive_stalls >= STALL_CEILING {
                warn!(
                    company = %self.company,
                    offset,
                    "pagination appears stuck, halting"
                );
                break;
            }

            // Advance by what the page actually returned; pages may be short.
            offset += page.jobs.len() as u64;

            if let Some(hits) = page.hits {
                if offset >= hits {
                    debug!(company = %self.company, offset, hits, "reported hits exhausted");
                    break;
                }
            }

            limits.pause().await;
        }

        info!(
            company = %self.company,
            jobs = collected.len(),
            pages_fetched,
            "paginated traversal complete"
        );
        Ok(collected.into_values().collect())
    }

    async fn fetch_page(&self, fetcher: &dyn Fetcher, url: &str) -> Option<SearchPage> {
        let body = match fetcher.get(url, Accept::Json).await {
            Ok(body) => body,
            Err(e) => {
                warn!(company = %self.company, url = %url, error = %e, "page fetch failed, halting");
                return None;
            }
        };
        match serde_json::from_str(&body) {
            Ok(page) => Some(page),
            Err(e) => {
                warn!(company = %self.company, url = %url, error = %e, "page parse failed, halting");
                None
            }
        }
    }

    fn page_url(&self, offset: u64, page_size: usize) -> ScrapeResult<String> {
        let mut url = Url::parse(&self.endpoint).map_err(|_| ScrapeError::InvalidUrl {
            url: self.endpoint.clone(),
        })?;
        {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in &self.base_params {
                pairs.append_pair(key, value);
            }
            pairs.append_pair("offset", &offset.to_string());
            pairs.append_pair("result_limit", &page_size.to_string());
        }
        Ok(url.into())
    }

    /// Turn one response item into a job record. Items missing a title or a
    /// job path are malformed and yield `None`.
    fn extract_item(&self, item: &Value) -> Option<Job> {
        let title = str_field(item, "title").unwrap_or_default();
        let path = str_field(item, "job_path").unwrap_or_default();
        if title.is_empty() || path.is_empty() {
            return None;
        }

        let url = if path.starts_with("http") {
            path.clone()
        } else {
            format!("{}{}", self.link_base, path)
        };

        let upstream_id = id_field(item, "id").or_else(|| id_field(item, "job_id"));
        let job_id = identity::resolve_id(&self.company, &[upstream_id.as_deref()], &url);
        let location = extract_location(item);

        Some(Job::new(&self.company, job_id, title, url).with_location(location))
    }
}

/// Location extraction resilient to the schema drift seen in the wild:
/// `locations` may be a list of objects or a list of JSON-encoded strings,
/// with several competing key spellings. Building codes and internal ids are
/// ignored; flat item-level fields are the fallback.
fn extract_location(item: &Value) -> Option<String> {
    if let Some(first) = item
        .get("locations")
        .and_then(Value::as_array)
        .and_then(|locs| locs.first())
    {
        // A JSON-encoded string decodes to the same object shape.
        let decoded = match first {
            Value::String(s) => serde_json::from_str::<Value>(s).ok(),
            Value::Object(_) => Some(first.clone()),
            _ => None,
        };

        if let Some(loc) = decoded.filter(Value::is_object) {
            let city = str_field(&loc, "normalizedCityName")
                .or_else(|| str_field(&loc, "city"))
                .unwrap_or_default();
            let state = str_field(&loc, "region")
                .or_else(|| str_field(&loc, "normalizedStateName"))
                .unwrap_or_default();
            let country = str_field(&loc, "countryIso2a")
                .or_else(|| str_field(&loc, "normalizedCountryCode"))
                .unwrap_or_default();
            return location::normalize(&country, &state, &city);
        }
    }

    location::normalize(
        &str_field(item, "country_code").unwrap_or_default(),
        &str_field(item, "state").unwrap_or_default(),
        &str_field(item, "city").unwrap_or_default(),
    )
}

fn str_field(value: &Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(Value::as_str)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Upstream ids arrive as either strings or bare numbers.
fn id_field(value: &Value, key: &str) -> Option<String> {
    match value.get(key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
