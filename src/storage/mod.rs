//! Storage module for persisting crawl data
//!
//! This module handles all database operations for the crawler, including:
//! - SQLite database initialization and schema management
//! - Idempotent storage of ads.txt records
//! - The ad-system registry and its reconciliation pass
//! - Run tracking

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStorage;
pub use traits::{Storage, StorageError, StorageResult};

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Storage handle shared by all crawl workers
pub type SharedStorage = Arc<Mutex<SqliteStorage>>;

/// Opens a storage database and wraps it for sharing between workers
///
/// # Arguments
///
/// * `path` - Path to the SQLite database file
/// * `busy_timeout` - How long a write waits for a locked database
pub fn open_shared_storage(path: &Path, busy_timeout: Duration) -> StorageResult<SharedStorage> {
    let storage = SqliteStorage::new(path, busy_timeout)?;
    Ok(Arc::new(Mutex::new(storage)))
}

/// Represents a crawl run
#[derive(Debug, Clone)]
pub struct RunRecord {
    pub id: i64,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub config_hash: String,
    pub urls_processed: Option<u64>,
    pub records_written: Option<u64>,
}

/// Record counts for the statistics report
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StorageStatistics {
    /// Total stored records
    pub total_records: u64,

    /// Number of distinct publishing sites
    pub distinct_sites: u64,

    /// Number of distinct exchange domains
    pub distinct_exchanges: u64,

    /// Records with account type DIRECT
    pub direct_records: u64,

    /// Records with account type RESELLER
    pub reseller_records: u64,

    /// Records linked to the ad-system registry
    pub reconciled_records: u64,
}
