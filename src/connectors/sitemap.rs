//! Sitemap-discovered detail pages.
//!
//! Two-phase breadth-first traversal for sources whose listing pages are
//! JS-rendered and therefore useless to a plain fetch, but whose sitemaps
//! still enumerate every job detail URL:
//!
//! - **Phase 1**: follow the sitemap index breadth-first through nested
//!   sitemaps, collecting URLs that match the job-detail shape. A visited
//!   set guarantees each sitemap is fetched at most once even when linked
//!   from multiple parents.
//! - **Phase 2**: fetch each discovered detail page and extract the title,
//!   a `Ref ID:` token, a `Location:` line, and a numeric URL suffix.
//!
//! The free-text extraction in phase 2 is inherently fragile, so it is
//! isolated in named functions with explicit `Option` results instead of
//! nulls propagating through the traversal.

use std::collections::{HashSet, VecDeque};

use futures::stream::{self, StreamExt};
use indexmap::IndexMap;
use regex::Regex;
use tracing::{debug, info, warn};
use url::Url;

use super::ScrapeLimits;
use crate::error::ScrapeResult;
use crate::fetcher::{Accept, Fetcher};
use crate::job::Job;
use crate::parse::{html, xml};
use crate::{identity, location};

/// Job detail paths look like `/careers/jobs/<slug>-<numeric-id>`, with an
/// optional 2-letter locale segment in front.
const DEFAULT_JOB_PATH: &str = r"^/(?:[a-z]{2}/)?careers/jobs/[^?#/]+-\d+/?$";

/// Connector for sitemap-driven HTML crawls.
///
/// # Example
///
/// ```rust,ignore
/// let connector = SitemapConnector::new(
///     "Acme",
///     "https://www.acme.test/sitemap/sitemap.xml",
///     "acme.test",
/// );
/// let jobs = connector.scrape(&fetcher, &ScrapeLimits::default()).await?;
/// ```
#[derive(Debug)]
pub struct SitemapConnector {
    company: String,
    sitemap_index: String,
    host_suffix: String,
    job_path: Regex,
}

impl SitemapConnector {
    /// Create a connector rooted at one sitemap index URL.
    ///
    /// `host_suffix` restricts job URLs to the source's own hosts
    /// (subdomains included, suffix match).
    pub fn new(
        company: impl Into<String>,
        sitemap_index: impl Into<String>,
        host_suffix: impl Into<String>,
    ) -> Self {
        Self {
            company: company.into(),
            sitemap_index: sitemap_index.into(),
            host_suffix: host_suffix.into().to_lowercase(),
            job_path: Regex::new(&format!("(?i){DEFAULT_JOB_PATH}")).unwrap(),
        }
    }

    /// Override the job-detail path pattern.
    pub fn with_job_path(mut self, pattern: Regex) -> Self {
        self.job_path = pattern;
        self
    }

    /// Source display name.
    pub fn company(&self) -> &str {
        &self.company
    }

    /// Run discovery and detail extraction.
    pub async fn scrape(
        &self,
        fetcher: &dyn Fetcher,
        limits: &ScrapeLimits,
    ) -> ScrapeResult<Vec<Job>> {
        info!(
            company = %self.company,
            sitemap_index = %self.sitemap_index,
            "sitemap traversal starting"
        );

        let job_urls = self.discover_job_urls(fetcher, limits).await?;
        let jobs = self.fetch_details(fetcher, limits, &job_urls).await?;

        info!(
            company = %self.company,
            discovered = job_urls.len(),
            jobs = jobs.len(),
            "sitemap traversal complete"
        );
        Ok(jobs)
    }

    /// Phase 1: breadth-first sitemap walk returning unique job URLs in
    /// discovery order.
    pub(crate) async fn discover_job_urls(
        &self,
        fetcher: &dyn Fetcher,
        limits: &ScrapeLimits,
    ) -> ScrapeResult<Vec<String>> {
        let mut queue: VecDeque<String> = VecDeque::from([self.sitemap_index.clone()]);
        let mut visited: HashSet<String> = HashSet::new();
        let mut seen_jobs: HashSet<String> = HashSet::new();
        let mut job_urls: Vec<String> = Vec::new();
        let mut first_fetch = true;

        while let Some(sitemap_url) = queue.pop_front() {
            if let Some(cap) = limits.max_sitemaps {
                if visited.len() >= cap {
                    debug!(company = %self.company, cap, "sitemap cap reached");
                    break;
                }
            }
            if visited.contains(&sitemap_url) {
                continue;
            }
            limits.ensure_live()?;
            visited.insert(sitemap_url.clone());

            let body = if first_fetch {
                first_fetch = false;
                // The root sitemap being unreachable means the whole source
                // is; that one failure aborts the run.
                fetcher.get(&sitemap_url, Accept::Xml).await?
            } else {
                match fetcher.get(&sitemap_url, Accept::Xml).await {
                    Ok(body) => body,
                    Err(e) => {
                        warn!(company = %self.company, url = %sitemap_url, error = %e, "sitemap fetch failed, skipping");
                        continue;
                    }
                }
            };

            let locs = match xml::sitemap_locs(&body) {
                Ok(locs) => locs,
                Err(e) => {
                    warn!(company = %self.company, url = %sitemap_url, error = %e, "sitemap parse failed, skipping");
                    continue;
                }
            };

            // Each loc is either a nested sitemap or a concrete URL.
            for loc in locs {
                if loc.ends_with(".xml") && loc.contains("/sitemap/") {
                    if !visited.contains(&loc) {
                        queue.push_back(loc);
                    }
                } else if self.is_job_url(&loc) && seen_jobs.insert(loc.clone()) {
                    job_urls.push(loc);
                }
            }

            limits.pause().await;
        }

        debug!(
            company = %self.company,
            sitemaps_visited = visited.len(),
            job_urls = job_urls.len(),
            "sitemap discovery complete"
        );
        Ok(job_urls)
    }

    /// Phase 2: fetch each detail page and extract a job record. Fetch or
    /// extraction failure skips that URL only.
    async fn fetch_details(
        &self,
        fetcher: &dyn Fetcher,
        limits: &ScrapeLimits,
        job_urls: &[String],
    ) -> ScrapeResult<Vec<Job>> {
        let capped: &[String] = match limits.max_items {
            Some(cap) if job_urls.len() > cap => &job_urls[..cap],
            _ => job_urls,
        };

        let mut jobs: IndexMap<String, Job> = IndexMap::new();

        if limits.detail_concurrency > 1 {
            // Detail results are independent and write-once into the map,
            // so they parallelize behind a bounded worker count.
            limits.ensure_live()?;
            let found: Vec<Option<Job>> = stream::iter(capped)
                .map(|url| self.fetch_detail(fetcher, url))
                .buffer_unordered(limits.detail_concurrency)
                .collect()
                .await;
            for job in found.into_iter().flatten() {
                jobs.insert(job.job_id.clone(), job);
            }
        } else {
            for url in capped {
                limits.ensure_live()?;
                if let Some(job) = self.fetch_detail(fetcher, url).await {
                    jobs.insert(job.job_id.clone(), job);
                }
                limits.pause().await;
            }
        }

        Ok(jobs.into_values().collect())
    }

    async fn fetch_detail(&self, fetcher: &dyn Fetcher, url: &str) -> Option<Job> {
        let page_html = match fetcher.get(url, Accept::Html).await {
            Ok(body) => body,
            Err(e) => {
                warn!(company = %self.company, url = %url, error = %e, "detail fetch failed, skipping");
                return None;
            }
        };
        self.parse_detail(&page_html, url)
    }

    /// Extract a job record from one detail page. Pages without a usable
    /// title are malformed and yield `None`.
    fn parse_detail(&self, page_html: &str, url: &str) -> Option<Job> {
        let title = html::extract_title(page_html)?;
        let text = html::extract_text(page_html);

        let ref_id = extract_ref_id(&text);
        let location = extract_location_line(&text).and_then(|line| parse_location_line(&line));
        let url_id = Url::parse(url)
            .ok()
            .and_then(|u| numeric_url_suffix(u.path()));

        let job_id = identity::resolve_id(
            &self.company,
            &[ref_id.as_deref(), url_id.as_deref()],
            url,
        );

        let mut job = Job::new(&self.company, job_id, title, url).with_location(location);
        // This is the one connector that has the full page in hand.
        if !text.is_empty() {
            job = job.with_description(text);
        }
        Some(job)
    }

    /// A job URL: http(s), host under the source's suffix, path matching
    /// the job-detail shape.
    fn is_job_url(&self, raw: &str) -> bool {
        let Ok(url) = Url::parse(raw) else {
            return false;
        };
        if !matches!(url.scheme(), "http" | "https") {
            return false;
        }
        let Some(host) = url.host_str() else {
            return false;
        };
        if !host.to_lowercase().ends_with(&self.host_suffix) {
            return false;
        }
        self.job_path.is_match(url.path())
    }
}

/// Find a `Ref ID:` token in flattened page text.
pub(crate) fn extract_ref_id(text: &str) -> Option<String> {
    let pattern = Regex::new(r"(?i)\bRef\s*ID:\s*([A-Za-z0-9_-]+)").unwrap();
    pattern
        .captures(text)
        .and_then(|cap| cap.get(1))
        .map(|m| m.as_str().trim().to_string())
}

/// Find a `Location:` line in flattened page text, returning the rest of
/// the line.
pub(crate) fn extract_location_line(text: &str) -> Option<String> {
    let pattern = Regex::new(r"(?i)\bLocation:\s*([^\n\r]+)").unwrap();
    pattern
        .captures(text)
        .and_then(|cap| cap.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Last-resort identifier: the numeric suffix of a detail path.
pub(crate) fn numeric_url_suffix(path: &str) -> Option<String> {
    let pattern = Regex::new(r"-(\d+)/?$").unwrap();
    pattern
        .captures(path)
        .and_then(|cap| cap.get(1))
        .map(|m| m.as_str().to_string())
}

/// Parse a free-text location line into the canonical key.
///
/// These lines are comma-separated, country first. United States spellings
/// go through the shared dialect table; for other countries a two-part line
/// is `country, city` and a three-part line is `country, state, city`.
pub(crate) fn parse_location_line(raw: &str) -> Option<String> {
    let parts: Vec<&str> = raw
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();
    let (&country_raw, rest) = parts.split_first()?;

    let country = location::canonical_country(country_raw);
    if country == "US" || rest.len() >= 2 {
        let state = rest.first().copied().unwrap_or("");
        let city = rest.get(1).copied().unwrap_or("");
        location::normalize(&country, state, city)
    } else {
        let city = rest.first().copied().unwrap_or("");
        location::normalize(&country, "", city)
    }
}
