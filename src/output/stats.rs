//! Statistics generation from the ads.txt database
//!
//! This module provides functionality for extracting and displaying
//! record statistics from the storage layer.

use crate::storage::{RunRecord, Storage, StorageError, StorageStatistics};

/// Database statistics summary
#[derive(Debug, Clone)]
pub struct CrawlStatistics {
    /// Record counts
    pub records: StorageStatistics,

    /// Most recent crawl run, if any
    pub latest_run: Option<RunRecord>,
}

/// Loads statistics from storage
///
/// # Arguments
///
/// * `storage` - The storage backend to query
///
/// # Returns
///
/// * `Ok(CrawlStatistics)` - Successfully loaded statistics
/// * `Err(StorageError)` - Failed to query statistics
pub fn load_statistics(storage: &dyn Storage) -> Result<CrawlStatistics, StorageError> {
    Ok(CrawlStatistics {
        records: storage.get_statistics()?,
        latest_run: storage.get_latest_run()?,
    })
}

fn percentage(part: u64, total: u64) -> f64 {
    if total > 0 {
        (part as f64 / total as f64) * 100.0
    } else {
        0.0
    }
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &CrawlStatistics) {
    let records = &stats.records;

    println!("=== ads.txt Statistics ===\n");

    println!("Overview:");
    println!("  Total records: {}", records.total_records);
    println!("  Sites: {}", records.distinct_sites);
    println!("  Exchanges: {}", records.distinct_exchanges);
    println!();

    println!("Account Types:");
    println!(
        "  direct: {} ({:.1}%)",
        records.direct_records,
        percentage(records.direct_records, records.total_records)
    );
    println!(
        "  reseller: {} ({:.1}%)",
        records.reseller_records,
        percentage(records.reseller_records, records.total_records)
    );
    println!();

    println!(
        "Linked to known ad systems: {} ({:.1}%)",
        records.reconciled_records,
        percentage(records.reconciled_records, records.total_records)
    );

    if let Some(run) = &stats.latest_run {
        println!();
        println!("Latest Run (#{}):", run.id);
        println!("  Started: {}", run.started_at);
        println!(
            "  Finished: {}",
            run.finished_at.as_deref().unwrap_or("did not finish")
        );
        if let (Some(urls), Some(written)) = (run.urls_processed, run.records_written) {
            println!("  Wrote {} records from {} URLs", written, urls);
        }
    }
}
