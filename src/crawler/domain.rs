//! Per-host crawl: fetch, parse, validate, store
//!
//! A top-level crawl fetches the host's file, stores its valid records and
//! then crawls every declared subdomain exactly once. Subdomain crawls store
//! their own records but never follow the subdomains they declare, so the
//! expansion is at most one level deep whatever the files contain.

use crate::crawler::fetcher::{DocumentFetcher, FetchError};
use crate::crawler::parser::{parse_document, ParsedDocument};
use crate::record::AdsTxtRecord;
use crate::storage::{SharedStorage, Storage, StorageError};

/// Depth of a crawl invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlDepth {
    /// A host from the target list; its declared subdomains are followed
    TopLevel,
    /// A host declared by a top-level file; nothing further is followed
    Subdomain,
}

/// What happened to one host's document
#[derive(Debug)]
pub enum HostOutcome {
    /// The document was fetched and its records were stored
    Stored,
    /// No usable ads.txt was found
    NoContent(FetchError),
    /// Writing records failed; the host contributes no records
    StorageFailed(StorageError),
}

/// Result of crawling one host, including its subdomain crawls
#[derive(Debug)]
pub struct CrawlResult {
    pub host: String,
    pub depth: CrawlDepth,

    /// Records accepted from this host's own document
    pub accepted_records: usize,

    pub outcome: HostOutcome,

    /// Results of the subdomains this host declared (top-level crawls only)
    pub subdomains: Vec<CrawlResult>,
}

impl CrawlResult {
    /// Accepted records of this host and all of its subdomain crawls
    pub fn total_records(&self) -> usize {
        self.accepted_records
            + self
                .subdomains
                .iter()
                .map(CrawlResult::total_records)
                .sum::<usize>()
    }
}

/// Document-level result before subdomains are followed
struct DocumentCrawl {
    result: CrawlResult,
    declared_subdomains: Vec<String>,
}

/// Crawls single hosts and stores what they publish
pub struct DomainCrawler {
    fetcher: DocumentFetcher,
    storage: SharedStorage,
}

impl DomainCrawler {
    pub fn new(fetcher: DocumentFetcher, storage: SharedStorage) -> Self {
        Self { fetcher, storage }
    }

    /// Crawls a host at the given depth
    pub async fn crawl(&self, host: &str, depth: CrawlDepth) -> CrawlResult {
        match depth {
            CrawlDepth::TopLevel => self.crawl_top(host).await,
            CrawlDepth::Subdomain => self.crawl_sub(host).await,
        }
    }

    /// Crawls a target host and then each subdomain it declares
    pub async fn crawl_top(&self, host: &str) -> CrawlResult {
        let DocumentCrawl {
            mut result,
            declared_subdomains,
        } = self.crawl_document(host, CrawlDepth::TopLevel).await;

        for subdomain in declared_subdomains {
            let sub_result = self.crawl_sub(&subdomain).await;
            result.subdomains.push(sub_result);
        }

        result
    }

    /// Crawls a declared subdomain without following its own declarations
    pub async fn crawl_sub(&self, host: &str) -> CrawlResult {
        let DocumentCrawl {
            result,
            declared_subdomains,
        } = self.crawl_document(host, CrawlDepth::Subdomain).await;

        if !declared_subdomains.is_empty() {
            tracing::debug!(
                "Ignoring {} subdomain declaration(s) in subdomain file of {}",
                declared_subdomains.len(),
                host
            );
        }

        result
    }

    async fn crawl_document(&self, host: &str, depth: CrawlDepth) -> DocumentCrawl {
        let text = match self.fetcher.fetch(host).await {
            Ok(text) => text,
            Err(e) => {
                tracing::debug!("No ads.txt for {}: {}", host, e);
                return DocumentCrawl {
                    result: CrawlResult {
                        host: host.to_string(),
                        depth,
                        accepted_records: 0,
                        outcome: HostOutcome::NoContent(e),
                        subdomains: Vec::new(),
                    },
                    declared_subdomains: Vec::new(),
                };
            }
        };

        let ParsedDocument {
            records,
            subdomains,
            rejected,
        } = parse_document(host, &text);

        if rejected > 0 {
            tracing::debug!("Rejected {} line(s) from {}", rejected, host);
        }

        let (accepted_records, outcome) = match self.persist(&records) {
            Ok(()) => (records.len(), HostOutcome::Stored),
            Err(e) => {
                tracing::warn!("Failed to store records for {}: {}", host, e);
                (0, HostOutcome::StorageFailed(e))
            }
        };

        DocumentCrawl {
            result: CrawlResult {
                host: host.to_string(),
                depth,
                accepted_records,
                outcome,
                subdomains: Vec::new(),
            },
            declared_subdomains: subdomains,
        }
    }

    /// Upserts records one at a time, each in its own transaction
    ///
    /// The lock is taken per record so concurrent workers interleave their
    /// writes. Stops at the first failed write.
    fn persist(&self, records: &[AdsTxtRecord]) -> Result<(), StorageError> {
        for record in records {
            let mut storage = self
                .storage
                .lock()
                .map_err(|_| StorageError::LockPoisoned)?;
            storage.upsert_record(record)?;
        }
        Ok(())
    }
}
