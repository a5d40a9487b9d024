//! Batch dispatch of host crawls
//!
//! Each target host is crawled by its own task, with at most `workers`
//! crawls in flight. A task runs one host's crawl, subdomains included, to
//! completion. Counts come back as task results and are summed once every
//! task has finished; after that the ad-system reconciliation runs once.

use crate::crawler::domain::{CrawlDepth, CrawlResult, DomainCrawler, HostOutcome};
use crate::output::CrawlSummary;
use crate::storage::{SharedStorage, Storage, StorageError};
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Fans host crawls out over a fixed number of workers
pub struct CrawlDispatcher {
    crawler: Arc<DomainCrawler>,
    storage: SharedStorage,
    workers: usize,
}

impl CrawlDispatcher {
    /// Creates a dispatcher
    ///
    /// # Arguments
    ///
    /// * `crawler` - The per-host crawler shared by all workers
    /// * `storage` - Storage used for the final reconciliation pass
    /// * `workers` - Maximum number of hosts crawled at the same time
    pub fn new(crawler: DomainCrawler, storage: SharedStorage, workers: usize) -> Self {
        Self {
            crawler: Arc::new(crawler),
            storage,
            workers: workers.max(1),
        }
    }

    /// Crawls every host and returns the combined totals
    ///
    /// Hosts are expected to be resolvable and deduplicated already. A host
    /// that fails in any way contributes zero records; no failure stops the
    /// batch.
    pub async fn run(&self, hosts: Vec<String>) -> CrawlSummary {
        let total_urls = hosts.len() as u64;
        tracing::info!(
            "Dispatching {} host(s) over {} worker(s)",
            total_urls,
            self.workers
        );

        let results = self.crawl_all(hosts).await;
        let total_records = results
            .iter()
            .map(|result| result.total_records() as u64)
            .sum();

        for result in &results {
            log_result(result);
        }

        match self.reconcile() {
            Ok(updated) => tracing::info!("Linked {} record(s) to known ad systems", updated),
            Err(e) => tracing::warn!("Ad-system reconciliation failed: {}", e),
        }

        CrawlSummary {
            total_urls,
            total_records,
        }
    }

    /// Runs top-level crawls with bounded parallelism
    ///
    /// Results are returned in completion order.
    pub async fn crawl_all(&self, hosts: Vec<String>) -> Vec<CrawlResult> {
        let semaphore = Arc::new(Semaphore::new(self.workers));
        let mut handles = Vec::with_capacity(hosts.len());

        for host in hosts {
            let semaphore = Arc::clone(&semaphore);
            let crawler = Arc::clone(&self.crawler);

            handles.push(tokio::spawn(async move {
                // The semaphore is never closed while tasks hold a clone
                let _permit = semaphore.acquire_owned().await.ok()?;
                Some(crawler.crawl(&host, CrawlDepth::TopLevel).await)
            }));
        }

        let mut results = Vec::with_capacity(handles.len());
        for handle in handles {
            match handle.await {
                Ok(Some(result)) => results.push(result),
                Ok(None) => tracing::warn!("Crawl task could not acquire a worker"),
                Err(e) => tracing::warn!("Crawl task panicked: {}", e),
            }
        }
        results
    }

    fn reconcile(&self) -> Result<usize, StorageError> {
        let mut storage = self
            .storage
            .lock()
            .map_err(|_| StorageError::LockPoisoned)?;
        storage.reconcile_adsystem_domains()
    }
}

fn log_result(result: &CrawlResult) {
    match &result.outcome {
        HostOutcome::Stored => tracing::debug!(
            "{}: {} record(s) ({} including subdomains)",
            result.host,
            result.accepted_records,
            result.total_records()
        ),
        HostOutcome::NoContent(e) => tracing::debug!("{}: no ads.txt ({})", result.host, e),
        HostOutcome::StorageFailed(e) => {
            tracing::warn!("{}: records not stored ({})", result.host, e)
        }
    }
    for sub in &result.subdomains {
        log_result(sub);
    }
}
