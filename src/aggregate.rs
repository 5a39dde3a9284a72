//! The aggregation driver.
//!
//! Runs every configured connector, merges their outputs by `job_id`, and
//! returns the deduplicated collection. Connectors share no mutable state,
//! so they run concurrently; each one's accumulation map is local to its
//! own traversal.
//!
//! A connector whose initial fetch fails does not poison the run: partial
//! results (most jobs found) beat an all-or-nothing failure, so per-source
//! errors are collected alongside the merged records.

use futures::future;
use indexmap::IndexMap;
use tracing::{info, warn};

use crate::connectors::{Connector, ScrapeLimits};
use crate::error::ScrapeError;
use crate::fetcher::Fetcher;
use crate::job::Job;

/// One connector's fatal failure, surfaced without aborting the run.
#[derive(Debug)]
pub struct SourceFailure {
    /// Source display name
    pub company: String,
    /// The error that aborted that source's traversal
    pub error: ScrapeError,
}

/// Result of one aggregation pass.
#[derive(Debug, Default)]
pub struct Aggregated {
    /// Deduplicated job records, in first-seen order
    pub jobs: Vec<Job>,
    /// Sources whose traversal failed outright
    pub failures: Vec<SourceFailure>,
}

/// Drives a set of connectors and merges what they find.
#[derive(Debug, Default)]
pub struct Aggregator {
    connectors: Vec<Connector>,
}

impl Aggregator {
    /// Create an empty aggregator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a connector.
    pub fn with_connector(mut self, connector: Connector) -> Self {
        self.connectors.push(connector);
        self
    }

    /// Add several connectors.
    pub fn with_connectors(mut self, connectors: impl IntoIterator<Item = Connector>) -> Self {
        self.connectors.extend(connectors);
        self
    }

    /// Run all connectors and merge their outputs by `job_id`.
    ///
    /// Job ids are source-namespaced, so cross-connector collisions cannot
    /// happen by construction; the map exists to make repeat runs and
    /// overlapping traversals idempotent.
    pub async fn run(&self, fetcher: &dyn Fetcher, limits: &ScrapeLimits) -> Aggregated {
        info!(connectors = self.connectors.len(), "aggregation starting");

        let runs = self
            .connectors
            .iter()
            .map(|connector| async move { (connector.company(), connector.scrape(fetcher, limits).await) });
        let outcomes = future::join_all(runs).await;

        let mut merged: IndexMap<String, Job> = IndexMap::new();
        let mut failures = Vec::new();

        for (company, outcome) in outcomes {
            match outcome {
                Ok(jobs) => {
                    for job in jobs {
                        merged.insert(job.job_id.clone(), job);
                    }
                }
                Err(error) => {
                    warn!(company = %company, error = %error, "source traversal failed");
                    failures.push(SourceFailure {
                        company: company.to_string(),
                        error,
                    });
                }
            }
        }

        info!(
            jobs = merged.len(),
            failed_sources = failures.len(),
            "aggregation complete"
        );
        Aggregated {
            jobs: merged.into_values().collect(),
            failures,
        }
    }
}
