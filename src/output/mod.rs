//! Output module for crawl summaries and reports
//!
//! This module handles:
//! - The end-of-batch summary line
//! - Database statistics for the `--stats` mode

pub mod stats;

pub use stats::{load_statistics, print_statistics, CrawlStatistics};

use std::fmt;

/// Totals of one crawl batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrawlSummary {
    /// Hosts that were dispatched
    pub total_urls: u64,

    /// Accepted records over all hosts and their subdomains
    pub total_records: u64,
}

impl CrawlSummary {
    /// Formats the summary reported to the operator
    pub fn report(&self, database: &str) -> String {
        format!(
            "Wrote {} records from {} URLs to {}",
            self.total_records, self.total_urls, database
        )
    }
}

impl fmt::Display for CrawlSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} records from {} URLs",
            self.total_records, self.total_urls
        )
    }
}
