//! RSS-distributed listings.
//!
//! The simplest traversal: one fetch, one pass over the entries. Feed
//! entries carry no reusable upstream identifier, so identity is always the
//! URL hash. Some feeds ship a pre-formatted location field that is already
//! in canonical form; that is taken verbatim, otherwise the key is built
//! from the separate city/state/country fields.

use std::collections::HashMap;

use tracing::info;

use super::ScrapeLimits;
use crate::error::ScrapeResult;
use crate::fetcher::{Accept, Fetcher};
use crate::job::Job;
use crate::parse::xml;
use crate::{identity, location};

/// Connector for RSS job feeds.
#[derive(Debug)]
pub struct FeedConnector {
    company: String,
    feed_url: String,
}

impl FeedConnector {
    /// Create a connector for one feed URL.
    pub fn new(company: impl Into<String>, feed_url: impl Into<String>) -> Self {
        Self {
            company: company.into(),
            feed_url: feed_url.into(),
        }
    }

    /// Source display name.
    pub fn company(&self) -> &str {
        &self.company
    }

    /// Fetch the feed once and extract every well-formed entry.
    pub async fn scrape(
        &self,
        fetcher: &dyn Fetcher,
        limits: &ScrapeLimits,
    ) -> ScrapeResult<Vec<Job>> {
        info!(company = %self.company, feed_url = %self.feed_url, "feed traversal starting");
        limits.ensure_live()?;

        // The only fetch is the initial one, so any failure is fatal.
        let body = fetcher.get(&self.feed_url, Accept::Xml).await?;
        let entries = xml::feed_entries(&body);

        let mut jobs = Vec::new();
        for entry in &entries {
            if let Some(cap) = limits.max_items {
                if jobs.len() >= cap {
                    break;
                }
            }
            if let Some(job) = self.extract_entry(entry) {
                jobs.push(job);
            }
        }

        info!(
            company = %self.company,
            entries = entries.len(),
            jobs = jobs.len(),
            "feed traversal complete"
        );
        Ok(jobs)
    }

    /// Entries without both a title and a link are malformed and skipped.
    fn extract_entry(&self, entry: &HashMap<String, String>) -> Option<Job> {
        let title = field(entry, "title")?;
        let url = field(entry, "link")?;

        let job_id = identity::resolve_id(&self.company, &[], &url);
        let location = extract_entry_location(entry);

        Some(Job::new(&self.company, job_id, title, url).with_location(location))
    }
}

/// Prefer the pre-formatted location field; otherwise build the key from
/// separate fields.
fn extract_entry_location(entry: &HashMap<String, String>) -> Option<String> {
    if let Some(preformatted) = field(entry, "locationname") {
        return Some(preformatted);
    }

    location::normalize(
        field(entry, "country").as_deref().unwrap_or(""),
        field(entry, "state").as_deref().unwrap_or(""),
        field(entry, "city").as_deref().unwrap_or(""),
    )
}

fn field(entry: &HashMap<String, String>, key: &str) -> Option<String> {
    entry
        .get(key)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
