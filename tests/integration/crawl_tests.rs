//! Integration tests for the crawler
//!
//! These tests use wiremock to serve ads.txt files and run the full
//! fetch, parse and store cycle against a temporary database.

use adstxt_crawler::config::{Config, CrawlerConfig, UserAgentConfig};
use adstxt_crawler::crawler::{
    crawl, CrawlDispatcher, DocumentFetcher, DomainCrawler, FetchError, HostOutcome,
};
use adstxt_crawler::record::AccountType;
use adstxt_crawler::storage::{open_shared_storage, SharedStorage, Storage};
use adstxt_crawler::targets::filter_resolvable;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Host (with port) of a mock server, as it appears in a target list
fn host_of(server: &MockServer) -> String {
    server.uri().trim_start_matches("http://").to_string()
}

fn create_test_config() -> Config {
    Config {
        crawler: CrawlerConfig {
            workers: 4,
            request_timeout_secs: 5,
            allow_loopback: true,
        },
        user_agent: UserAgentConfig {
            crawler_name: "TestBot".to_string(),
            crawler_version: "1.0.0".to_string(),
            contact_url: "https://example.com/contact".to_string(),
        },
        ..Config::default()
    }
}

fn create_storage(dir: &TempDir) -> SharedStorage {
    open_shared_storage(&dir.path().join("adstxt.db"), Duration::from_secs(15))
        .expect("Failed to open storage")
}

fn create_crawler(storage: &SharedStorage) -> DomainCrawler {
    let config = create_test_config();
    let fetcher = DocumentFetcher::from_config(&config.user_agent, Duration::from_secs(5))
        .expect("Failed to build fetcher");
    DomainCrawler::new(fetcher, storage.clone())
}

async fn serve_ads_txt(server: &MockServer, body: &str) {
    Mock::given(method("GET"))
        .and(path("/ads.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

fn count(storage: &SharedStorage) -> u64 {
    storage.lock().unwrap().count_records().unwrap()
}

#[tokio::test]
async fn test_crawl_stores_valid_records() {
    let server = MockServer::start().await;
    serve_ads_txt(
        &server,
        "# ads.txt\n\
         exchange.com, 12345, DIRECT, tagA # test\n\
         Other-Exchange.com, 999, Reseller\n\
         exchange.com, 12345, RESOLD\n\
         not a record\n",
    )
    .await;

    let dir = TempDir::new().unwrap();
    let storage = create_storage(&dir);
    let crawler = create_crawler(&storage);
    let host = host_of(&server);

    let result = crawler.crawl_top(&host).await;

    assert!(matches!(result.outcome, HostOutcome::Stored));
    assert_eq!(result.accepted_records, 2);
    assert_eq!(result.total_records(), 2);

    let records = storage.lock().unwrap().get_records_for_site(&host).unwrap();
    assert_eq!(records.len(), 2);

    let first = &records[0];
    assert_eq!(first.site_domain, host);
    assert_eq!(first.exchange_domain, "exchange.com");
    assert_eq!(first.seller_account_id, "12345");
    assert_eq!(first.account_type, AccountType::Direct);
    assert_eq!(first.tag_id.as_deref(), Some("taga"));
    assert_eq!(first.entry_comment.as_deref(), Some("test"));

    let second = &records[1];
    assert_eq!(second.exchange_domain, "other-exchange.com");
    assert_eq!(second.account_type, AccountType::Reseller);
    assert_eq!(second.tag_id, None);
}

#[tokio::test]
async fn test_html_body_yields_no_records() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ads.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            "<html><body>exchange.com, 1, DIRECT</body></html>",
            "text/html",
        ))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let storage = create_storage(&dir);
    let crawler = create_crawler(&storage);

    let result = crawler.crawl_top(&host_of(&server)).await;

    assert_eq!(result.total_records(), 0);
    assert!(matches!(
        result.outcome,
        HostOutcome::NoContent(FetchError::HtmlBody(_))
    ));
    assert_eq!(count(&storage), 0);
}

#[tokio::test]
async fn test_non_text_content_type_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ads.txt"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw("exchange.com, 1, DIRECT", "application/octet-stream"),
        )
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let storage = create_storage(&dir);
    let crawler = create_crawler(&storage);

    let result = crawler.crawl_top(&host_of(&server)).await;

    assert!(matches!(
        result.outcome,
        HostOutcome::NoContent(FetchError::ContentType(_))
    ));
    assert_eq!(count(&storage), 0);
}

#[tokio::test]
async fn test_missing_file_yields_no_records() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ads.txt"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let storage = create_storage(&dir);
    let crawler = create_crawler(&storage);

    let result = crawler.crawl_top(&host_of(&server)).await;

    assert!(matches!(
        result.outcome,
        HostOutcome::NoContent(FetchError::Status(404))
    ));
    assert_eq!(result.total_records(), 0);
}

#[tokio::test]
async fn test_subdomain_is_crawled_exactly_once() {
    let parent = MockServer::start().await;
    let child = MockServer::start().await;
    let parent_host = host_of(&parent);
    let child_host = host_of(&child);

    Mock::given(method("GET"))
        .and(path("/ads.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string(format!(
            "exchange.com, 1, DIRECT\nsubdomain={}\nsubdomain={}\n",
            child_host, child_host
        )))
        .expect(1)
        .mount(&parent)
        .await;

    // The child declares its parent back; this must not be followed
    Mock::given(method("GET"))
        .and(path("/ads.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string(format!(
            "exchange.com, 2, RESELLER\nsubdomain={}\n",
            parent_host
        )))
        .expect(1)
        .mount(&child)
        .await;

    let dir = TempDir::new().unwrap();
    let storage = create_storage(&dir);
    let crawler = create_crawler(&storage);

    let result = crawler.crawl_top(&parent_host).await;

    assert_eq!(result.accepted_records, 1);
    assert_eq!(result.subdomains.len(), 1);
    assert_eq!(result.subdomains[0].host, child_host);
    assert!(result.subdomains[0].subdomains.is_empty());
    assert_eq!(result.total_records(), 2);

    let child_records = storage
        .lock()
        .unwrap()
        .get_records_for_site(&child_host)
        .unwrap();
    assert_eq!(child_records.len(), 1);
    assert_eq!(child_records[0].seller_account_id, "2");
}

#[tokio::test]
async fn test_subdomain_crawl_does_not_recurse() {
    let server = MockServer::start().await;
    serve_ads_txt(&server, "subdomain=foo.example.com\n").await;

    let dir = TempDir::new().unwrap();
    let storage = create_storage(&dir);
    let crawler = create_crawler(&storage);

    let result = crawler.crawl_sub(&host_of(&server)).await;

    assert!(matches!(result.outcome, HostOutcome::Stored));
    assert!(result.subdomains.is_empty());
    assert_eq!(result.total_records(), 0);
}

#[tokio::test]
async fn test_recrawl_is_idempotent() {
    let server = MockServer::start().await;
    serve_ads_txt(
        &server,
        "exchange.com, 1, DIRECT\nexchange.com, 2, RESELLER, tag\n",
    )
    .await;

    let dir = TempDir::new().unwrap();
    let storage = create_storage(&dir);
    let crawler = create_crawler(&storage);
    let host = host_of(&server);

    let first = crawler.crawl_top(&host).await;
    let second = crawler.crawl_top(&host).await;

    // Both runs accept every row, but only the first writes
    assert_eq!(first.total_records(), 2);
    assert_eq!(second.total_records(), 2);
    assert_eq!(count(&storage), 2);
}

#[tokio::test]
async fn test_dispatcher_totals_and_reconciliation() {
    let first = MockServer::start().await;
    let second = MockServer::start().await;
    let empty = MockServer::start().await;

    serve_ads_txt(&first, "known-exchange.com, 1, DIRECT\nother.com, 2, DIRECT\n").await;
    serve_ads_txt(&second, "known-exchange.com, 3, RESELLER\n").await;
    Mock::given(method("GET"))
        .and(path("/ads.txt"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&empty)
        .await;

    let dir = TempDir::new().unwrap();
    let storage = create_storage(&dir);
    let registry_id = storage
        .lock()
        .unwrap()
        .register_adsystem_domain("known-exchange.com")
        .unwrap();

    let dispatcher = CrawlDispatcher::new(create_crawler(&storage), storage.clone(), 2);
    let hosts = vec![host_of(&first), host_of(&second), host_of(&empty)];

    let summary = dispatcher.run(hosts).await;

    assert_eq!(summary.total_urls, 3);
    assert_eq!(summary.total_records, 3);
    assert_eq!(count(&storage), 3);

    let guard = storage.lock().unwrap();
    assert_eq!(
        guard
            .get_adsystem_reference(&host_of(&first), "known-exchange.com")
            .unwrap(),
        Some(registry_id)
    );
    assert_eq!(
        guard
            .get_adsystem_reference(&host_of(&first), "other.com")
            .unwrap(),
        None
    );
    assert_eq!(guard.get_statistics().unwrap().reconciled_records, 2);
}

#[tokio::test]
async fn test_storage_failure_contributes_zero_records() {
    let server = MockServer::start().await;
    serve_ads_txt(&server, "exchange.com, 1, DIRECT\nexchange.com, 2, RESELLER\n").await;

    let dir = TempDir::new().unwrap();
    let storage = create_storage(&dir);

    // Break the store from a second connection
    let conn = rusqlite::Connection::open(dir.path().join("adstxt.db")).unwrap();
    conn.execute_batch("DROP TABLE adstxt").unwrap();

    let dispatcher = CrawlDispatcher::new(create_crawler(&storage), storage.clone(), 2);

    let results = dispatcher.crawl_all(vec![host_of(&server)]).await;
    assert_eq!(results.len(), 1);
    assert!(matches!(results[0].outcome, HostOutcome::StorageFailed(_)));
    assert_eq!(results[0].accepted_records, 0);
    assert_eq!(results[0].total_records(), 0);

    let summary = dispatcher.run(vec![host_of(&server)]).await;
    assert_eq!(summary.total_urls, 1);
    assert_eq!(summary.total_records, 0);
}

#[tokio::test]
async fn test_unresolvable_host_is_excluded() {
    let server = MockServer::start().await;
    serve_ads_txt(&server, "exchange.com, 1, DIRECT\n").await;

    let config = create_test_config();
    let hosts = vec![host_of(&server), "does-not-exist.invalid".to_string()];
    let hosts = filter_resolvable(hosts, config.crawler.allow_loopback, 4).await;
    assert_eq!(hosts, vec![host_of(&server)]);

    let dir = TempDir::new().unwrap();
    let storage = create_storage(&dir);
    let summary = crawl(&config, storage.clone(), hosts).await.unwrap();

    assert_eq!(summary.total_urls, 1);
    assert_eq!(summary.total_records, 1);
    assert_eq!(
        summary.report("adstxt.db"),
        "Wrote 1 records from 1 URLs to adstxt.db"
    );
}
