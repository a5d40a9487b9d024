//! Crawler module: the fetch-and-parse pipeline
//!
//! This module contains the core crawling logic, including:
//! - Fetching and sanitizing ads.txt files
//! - Line parsing with comment carry-over and subdomain directives
//! - Record validation
//! - Per-host crawls with one level of subdomain expansion
//! - Batch dispatch across a bounded worker pool

mod dispatcher;
mod domain;
mod fetcher;
mod parser;
mod validator;

pub use dispatcher::CrawlDispatcher;
pub use domain::{CrawlDepth, CrawlResult, DomainCrawler, HostOutcome};
pub use fetcher::{
    ads_txt_url, build_http_client, find_html_marker, sanitize, DocumentFetcher, FetchError,
    HTML_MARKERS,
};
pub use parser::{
    parse_document, split_quoted, Delimiter, LineKind, LineParser, ParsedDocument, ParsedLine,
};
pub use validator::{validate_record, RejectReason};

use crate::config::Config;
use crate::output::CrawlSummary;
use crate::storage::SharedStorage;
use std::time::Duration;

/// Runs a complete crawl over already filtered hosts
///
/// This is the main entry point for a batch. It will:
/// 1. Build the HTTP client from the configuration
/// 2. Crawl every host with bounded parallelism
/// 3. Reconcile exchange domains against the ad-system registry
///
/// # Arguments
///
/// * `config` - The crawler configuration
/// * `storage` - Storage shared by all workers
/// * `hosts` - Resolvable, deduplicated hosts
///
/// # Returns
///
/// * `Ok(CrawlSummary)` - Batch completed
/// * `Err(AdsTxtError)` - The HTTP client could not be built
pub async fn crawl(
    config: &Config,
    storage: SharedStorage,
    hosts: Vec<String>,
) -> crate::Result<CrawlSummary> {
    let fetcher = DocumentFetcher::from_config(
        &config.user_agent,
        Duration::from_secs(config.crawler.request_timeout_secs),
    )?;
    let crawler = DomainCrawler::new(fetcher, storage.clone());
    let dispatcher = CrawlDispatcher::new(crawler, storage, config.crawler.workers);
    Ok(dispatcher.run(hosts).await)
}
