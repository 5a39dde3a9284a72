//! End-to-end traversal scenarios against the mock fetcher.
//!
//! These exercise the full path: traversal -> extraction -> identity and
//! location canonicalization -> merged records.

use std::time::Duration;

use serde_json::json;
use tokio_util::sync::CancellationToken;

use roleradar::testing::MockFetcher;
use roleradar::{
    Aggregator, Connector, FeedConnector, PaginatedApiConnector, ScrapeError, ScrapeLimits,
    SitemapConnector,
};

const SEARCH: &str = "https://jobs.acme.test/search.json";

fn fast_limits() -> ScrapeLimits {
    ScrapeLimits::new().with_politeness_delay(Duration::ZERO)
}

fn search_url(offset: u64, page_size: usize) -> String {
    format!("{SEARCH}?offset={offset}&result_limit={page_size}")
}

fn paginated() -> PaginatedApiConnector {
    PaginatedApiConnector::new("Acme", SEARCH, "https://jobs.acme.test")
}

#[tokio::test]
async fn two_page_source_yields_all_records() {
    let items: Vec<_> = (1..=5)
        .map(|i| {
            json!({
                "title": format!("Engineer {i}"),
                "job_path": format!("/en/jobs/{i}"),
                "id": i,
                "locations": [{"normalizedCityName": "natick", "region": "ma", "countryIso2a": "us"}],
            })
        })
        .collect();

    let fetcher = MockFetcher::new()
        .with_response(&search_url(0, 5), &json!({"jobs": items}).to_string())
        .with_response(&search_url(5, 5), &json!({"jobs": []}).to_string());

    let jobs = paginated()
        .scrape(&fetcher, &fast_limits().with_page_size(5))
        .await
        .unwrap();

    assert_eq!(jobs.len(), 5);
    for job in &jobs {
        assert!(job.job_id.starts_with("Acme:"));
        assert_eq!(job.location.as_deref(), Some("US-MA-Natick"));
    }
    assert_eq!(fetcher.call_count(), 2);
}

#[tokio::test]
async fn repeating_source_halts_on_stall_ceiling() {
    // The source returns the same single item forever and claims a huge hit
    // count. Three consecutive no-new pages stop the traversal anyway.
    let page = json!({
        "jobs": [{"title": "Engineer", "job_path": "/jobs/1", "id": 1}],
        "hits": 10_000,
    })
    .to_string();

    let fetcher = MockFetcher::new();
    for offset in 0..10 {
        fetcher.add_response(&search_url(offset, 5), &page);
    }

    let jobs = paginated()
        .scrape(&fetcher, &fast_limits().with_page_size(5))
        .await
        .unwrap();

    assert_eq!(jobs.len(), 1);
    // Page adding the item, then three stalled pages.
    assert_eq!(fetcher.call_count(), 4);
}

#[tokio::test]
async fn short_page_advances_offset_by_actual_count() {
    let full = json!({
        "jobs": [
            {"title": "A", "job_path": "/jobs/1", "id": 1},
            {"title": "B", "job_path": "/jobs/2", "id": 2},
        ],
    })
    .to_string();
    let short = json!({"jobs": [{"title": "C", "job_path": "/jobs/3", "id": 3}]}).to_string();
    let empty = json!({"jobs": []}).to_string();

    let fetcher = MockFetcher::new()
        .with_response(&search_url(0, 2), &full)
        .with_response(&search_url(2, 2), &short)
        .with_response(&search_url(3, 2), &empty);

    let jobs = paginated()
        .scrape(&fetcher, &fast_limits().with_page_size(2))
        .await
        .unwrap();

    assert_eq!(jobs.len(), 3);
}

#[tokio::test]
async fn reported_hits_halt_early() {
    let page = json!({
        "jobs": [{"title": "A", "job_path": "/jobs/1", "id": 1}],
        "hits": 1,
    })
    .to_string();

    let fetcher = MockFetcher::new().with_response(&search_url(0, 5), &page);

    let jobs = paginated()
        .scrape(&fetcher, &fast_limits().with_page_size(5))
        .await
        .unwrap();

    assert_eq!(jobs.len(), 1);
    assert_eq!(fetcher.call_count(), 1);
}

#[tokio::test]
async fn unreachable_paginated_source_fails_the_run() {
    let fetcher = MockFetcher::new();
    let err = paginated().scrape(&fetcher, &fast_limits()).await.unwrap_err();
    assert!(matches!(err, ScrapeError::Fetch(_)));
}

const SITEMAP_INDEX: &str = "https://www.acme.test/sitemap/sitemap.xml";

fn sitemap() -> SitemapConnector {
    SitemapConnector::new("Acme", SITEMAP_INDEX, "acme.test")
}

#[tokio::test]
async fn sitemap_index_discovers_matching_job_urls_only() {
    let index = r#"<sitemapindex>
        <sitemap><loc>https://www.acme.test/sitemap/careers.xml</loc></sitemap>
    </sitemapindex>"#;
    let nested = r#"<urlset>
        <url><loc>https://www.acme.test/careers/jobs/senior-engineer-546412</loc></url>
        <url><loc>https://www.acme.test/about/leadership</loc></url>
    </urlset>"#;
    let detail = r#"<html><body>
        <h1>Senior Engineer</h1>
        <p>Ref ID: 541999</p>
        <p>Location: United States, MA, Natick</p>
    </body></html>"#;

    let fetcher = MockFetcher::new()
        .with_response(SITEMAP_INDEX, index)
        .with_response("https://www.acme.test/sitemap/careers.xml", nested)
        .with_response("https://www.acme.test/careers/jobs/senior-engineer-546412", detail);

    let jobs = sitemap().scrape(&fetcher, &fast_limits()).await.unwrap();

    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].job_id, "Acme:541999");
    assert_eq!(jobs[0].title, "Senior Engineer");
    assert_eq!(jobs[0].location.as_deref(), Some("US-MA-Natick"));
    // Detail-page sources carry the page text as the description.
    assert!(jobs[0]
        .description
        .as_deref()
        .is_some_and(|d| d.contains("Location: United States, MA, Natick")));
}

#[tokio::test]
async fn sitemap_visited_set_fetches_each_sitemap_once() {
    // Both nested sitemaps link the same third sitemap.
    let index = r#"<sitemapindex>
        <sitemap><loc>https://www.acme.test/sitemap/a.xml</loc></sitemap>
        <sitemap><loc>https://www.acme.test/sitemap/b.xml</loc></sitemap>
    </sitemapindex>"#;
    let links_shared = r#"<sitemapindex>
        <sitemap><loc>https://www.acme.test/sitemap/shared.xml</loc></sitemap>
    </sitemapindex>"#;
    let shared = r#"<urlset>
        <url><loc>https://www.acme.test/careers/jobs/engineer-1</loc></url>
    </urlset>"#;

    let fetcher = MockFetcher::new()
        .with_response(SITEMAP_INDEX, index)
        .with_response("https://www.acme.test/sitemap/a.xml", links_shared)
        .with_response("https://www.acme.test/sitemap/b.xml", links_shared)
        .with_response("https://www.acme.test/sitemap/shared.xml", shared)
        .with_response(
            "https://www.acme.test/careers/jobs/engineer-1",
            "<html><body><h1>Engineer</h1></body></html>",
        );

    let jobs = sitemap().scrape(&fetcher, &fast_limits()).await.unwrap();

    assert_eq!(jobs.len(), 1);
    assert_eq!(fetcher.calls_for("https://www.acme.test/sitemap/shared.xml"), 1);
}

#[tokio::test]
async fn failing_detail_page_skips_that_url_only() {
    let index = r#"<urlset>
        <url><loc>https://www.acme.test/careers/jobs/good-1</loc></url>
        <url><loc>https://www.acme.test/careers/jobs/broken-2</loc></url>
        <url><loc>https://www.acme.test/careers/jobs/untitled-3</loc></url>
    </urlset>"#;

    let fetcher = MockFetcher::new()
        .with_response(SITEMAP_INDEX, index)
        .with_response(
            "https://www.acme.test/careers/jobs/good-1",
            "<html><body><h1>Good Job</h1></body></html>",
        )
        .with_status("https://www.acme.test/careers/jobs/broken-2", 500)
        .with_response(
            "https://www.acme.test/careers/jobs/untitled-3",
            "<html><body><p>no heading or title</p></body></html>",
        );

    let jobs = sitemap().scrape(&fetcher, &fast_limits()).await.unwrap();

    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].title, "Good Job");
    // Identity fell back to the numeric URL suffix.
    assert_eq!(jobs[0].job_id, "Acme:1");
}

#[tokio::test]
async fn detail_phase_supports_bounded_concurrency() {
    let index = r#"<urlset>
        <url><loc>https://www.acme.test/careers/jobs/one-1</loc></url>
        <url><loc>https://www.acme.test/careers/jobs/two-2</loc></url>
        <url><loc>https://www.acme.test/careers/jobs/three-3</loc></url>
    </urlset>"#;

    let fetcher = MockFetcher::new().with_response(SITEMAP_INDEX, index);
    for (slug, n) in [("one", 1), ("two", 2), ("three", 3)] {
        fetcher.add_response(
            &format!("https://www.acme.test/careers/jobs/{slug}-{n}"),
            &format!("<html><body><h1>Job {n}</h1></body></html>"),
        );
    }

    let jobs = sitemap()
        .scrape(&fetcher, &fast_limits().with_detail_concurrency(3))
        .await
        .unwrap();

    assert_eq!(jobs.len(), 3);
}

#[tokio::test]
async fn max_items_caps_detail_fetches() {
    let index = r#"<urlset>
        <url><loc>https://www.acme.test/careers/jobs/one-1</loc></url>
        <url><loc>https://www.acme.test/careers/jobs/two-2</loc></url>
    </urlset>"#;

    let fetcher = MockFetcher::new()
        .with_response(SITEMAP_INDEX, index)
        .with_response(
            "https://www.acme.test/careers/jobs/one-1",
            "<html><body><h1>Job 1</h1></body></html>",
        );

    let jobs = sitemap()
        .scrape(&fetcher, &fast_limits().with_max_items(1))
        .await
        .unwrap();

    assert_eq!(jobs.len(), 1);
    assert_eq!(fetcher.calls_for("https://www.acme.test/careers/jobs/two-2"), 0);
}

#[tokio::test]
async fn cancelled_token_aborts_traversal() {
    let token = CancellationToken::new();
    token.cancel();

    let fetcher = MockFetcher::new();
    let err = sitemap()
        .scrape(&fetcher, &fast_limits().with_cancel(token))
        .await
        .unwrap_err();

    assert!(matches!(err, ScrapeError::Cancelled));
    assert_eq!(fetcher.call_count(), 0);
}

#[tokio::test]
async fn aggregates_all_three_source_kinds() {
    let fetcher = MockFetcher::new()
        // Paginated source: one page, then exhausted.
        .with_response(
            &search_url(0, 50),
            &json!({
                "jobs": [{"title": "API Engineer", "job_path": "/jobs/10", "id": 10}],
                "hits": 1,
            })
            .to_string(),
        )
        // Sitemap source: index straight to one detail page.
        .with_response(
            "https://www.umbrella.test/sitemap/sitemap.xml",
            r#"<urlset><url><loc>https://www.umbrella.test/careers/jobs/crawl-engineer-77</loc></url></urlset>"#,
        )
        .with_response(
            "https://www.umbrella.test/careers/jobs/crawl-engineer-77",
            "<html><body><h1>Crawl Engineer</h1><p>Location: France, Paris</p></body></html>",
        )
        // Feed source.
        .with_response(
            "https://www.initech.test/jobs/rss.xml",
            r#"<rss><channel><item>
                <title>Feed Engineer</title>
                <link>https://www.initech.test/jobs/5</link>
                <locationname>US-MA-Natick</locationname>
            </item></channel></rss>"#,
        );

    let aggregator = Aggregator::new()
        .with_connector(Connector::PaginatedApi(paginated()))
        .with_connector(Connector::SitemapCrawl(SitemapConnector::new(
            "Umbrella",
            "https://www.umbrella.test/sitemap/sitemap.xml",
            "umbrella.test",
        )))
        .with_connector(Connector::Feed(FeedConnector::new(
            "Initech",
            "https://www.initech.test/jobs/rss.xml",
        )));

    let result = aggregator.run(&fetcher, &fast_limits()).await;

    assert!(result.failures.is_empty());
    assert_eq!(result.jobs.len(), 3);

    let by_company: Vec<&str> = result.jobs.iter().map(|j| j.company.as_str()).collect();
    assert!(by_company.contains(&"Acme"));
    assert!(by_company.contains(&"Umbrella"));
    assert!(by_company.contains(&"Initech"));

    let umbrella = result.jobs.iter().find(|j| j.company == "Umbrella").unwrap();
    assert_eq!(umbrella.job_id, "Umbrella:77");
    assert_eq!(umbrella.location.as_deref(), Some("FRANCE--Paris"));
}
