//! Storage traits and error types
//!
//! This module defines the trait interface for storage backends and
//! associated error types.

use crate::record::AdsTxtRecord;
use crate::storage::{RunRecord, StorageStatistics};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Storage lock poisoned")]
    LockPoisoned,

    #[error("Run not found: {0}")]
    RunNotFound(i64),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for storage backend implementations
///
/// Writers may run concurrently against the same database; every write is a
/// self-contained transaction so one failed write never affects another.
pub trait Storage {
    // ===== ads.txt Records =====

    /// Inserts a record unless its natural key is already stored
    ///
    /// # Returns
    ///
    /// `true` if a new row was written, `false` if the record already existed
    fn upsert_record(&mut self, record: &AdsTxtRecord) -> StorageResult<bool>;

    /// Counts all stored records
    fn count_records(&self) -> StorageResult<u64>;

    /// Gets all records published by a site, ordered by insertion
    fn get_records_for_site(&self, site_domain: &str) -> StorageResult<Vec<AdsTxtRecord>>;

    // ===== Ad-System Registry =====

    /// Adds a domain to the ad-system registry, returning its ID
    ///
    /// Registering an existing domain returns the existing ID.
    fn register_adsystem_domain(&mut self, domain: &str) -> StorageResult<i64>;

    /// Links every record whose exchange domain is in the registry
    ///
    /// # Returns
    ///
    /// The number of records updated
    fn reconcile_adsystem_domains(&mut self) -> StorageResult<usize>;

    /// Gets the registry ID a record was reconciled to, if any
    fn get_adsystem_reference(
        &self,
        site_domain: &str,
        exchange_domain: &str,
    ) -> StorageResult<Option<i64>>;

    // ===== Run Management =====

    /// Creates a new crawl run
    ///
    /// # Arguments
    ///
    /// * `config_hash` - Hash of the configuration file
    fn create_run(&mut self, config_hash: &str) -> StorageResult<i64>;

    /// Marks a run as finished and records its totals
    fn complete_run(
        &mut self,
        run_id: i64,
        urls_processed: u64,
        records_written: u64,
    ) -> StorageResult<()>;

    /// Gets the most recent run
    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>>;

    // ===== Statistics =====

    /// Gathers record counts for the statistics report
    fn get_statistics(&self) -> StorageResult<StorageStatistics>;
}
