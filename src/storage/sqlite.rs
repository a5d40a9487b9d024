//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the Storage trait.

use crate::record::{AccountType, AdsTxtRecord};
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{Storage, StorageError, StorageResult};
use crate::storage::{RunRecord, StorageStatistics};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::time::Duration;

const INSERT_RECORD_SQL: &str = "INSERT OR IGNORE INTO adstxt
    (site_domain, exchange_domain, seller_account_id, account_type, tag_id, entry_comment)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6)";

const RECONCILE_SQL: &str = "UPDATE adstxt SET adsystem_domain =
    (SELECT id FROM adsystem_domain WHERE adstxt.exchange_domain = adsystem_domain.domain)
    WHERE EXISTS
    (SELECT 1 FROM adsystem_domain WHERE adstxt.exchange_domain = adsystem_domain.domain)";

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Creates a new SqliteStorage instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    /// * `busy_timeout` - How long a statement waits on a locked database
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(StorageError)` - Failed to open database
    pub fn new(path: &Path, busy_timeout: Duration) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA temp_store = MEMORY;
        ",
        )?;
        conn.busy_timeout(busy_timeout)?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing)
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    fn count(&self, sql: &str) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(sql, [], |row| row.get(0))?;
        Ok(count as u64)
    }
}

/// Empty text stands in for an absent optional column
fn optional_text(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

impl Storage for SqliteStorage {
    // ===== ads.txt Records =====

    fn upsert_record(&mut self, record: &AdsTxtRecord) -> StorageResult<bool> {
        let tx = self.conn.transaction()?;
        let inserted = tx.execute(
            INSERT_RECORD_SQL,
            params![
                record.site_domain,
                record.exchange_domain,
                record.seller_account_id,
                record.account_type.as_str(),
                record.tag_id.as_deref().unwrap_or(""),
                record.entry_comment.as_deref().unwrap_or(""),
            ],
        )?;
        tx.commit()?;
        Ok(inserted > 0)
    }

    fn count_records(&self) -> StorageResult<u64> {
        self.count("SELECT COUNT(*) FROM adstxt")
    }

    fn get_records_for_site(&self, site_domain: &str) -> StorageResult<Vec<AdsTxtRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT site_domain, exchange_domain, seller_account_id, account_type, tag_id, entry_comment
             FROM adstxt WHERE site_domain = ?1 ORDER BY id",
        )?;

        let rows = stmt.query_map(params![site_domain], |row| {
            let account_type: String = row.get(3)?;
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                account_type,
                row.get::<_, String>(4)?,
                row.get::<_, String>(5)?,
            ))
        })?;

        let mut records = Vec::new();
        for row in rows {
            let (site_domain, exchange_domain, seller_account_id, account_type, tag_id, comment) =
                row?;
            // Rows are only ever written with a normalized account type
            let Ok(account_type) = account_type.parse::<AccountType>() else {
                tracing::warn!(
                    "Skipping stored record with unknown account type '{}'",
                    account_type
                );
                continue;
            };
            records.push(AdsTxtRecord {
                site_domain,
                exchange_domain,
                seller_account_id,
                account_type,
                tag_id: optional_text(tag_id),
                entry_comment: optional_text(comment),
            });
        }

        Ok(records)
    }

    // ===== Ad-System Registry =====

    fn register_adsystem_domain(&mut self, domain: &str) -> StorageResult<i64> {
        let domain = domain.trim().to_lowercase();
        self.conn.execute(
            "INSERT OR IGNORE INTO adsystem_domain (domain) VALUES (?1)",
            params![domain],
        )?;
        let id = self.conn.query_row(
            "SELECT id FROM adsystem_domain WHERE domain = ?1",
            params![domain],
            |row| row.get(0),
        )?;
        Ok(id)
    }

    fn reconcile_adsystem_domains(&mut self) -> StorageResult<usize> {
        let tx = self.conn.transaction()?;
        let updated = tx.execute(RECONCILE_SQL, [])?;
        tx.commit()?;
        Ok(updated)
    }

    fn get_adsystem_reference(
        &self,
        site_domain: &str,
        exchange_domain: &str,
    ) -> StorageResult<Option<i64>> {
        let reference = self
            .conn
            .query_row(
                "SELECT adsystem_domain FROM adstxt
                 WHERE site_domain = ?1 AND exchange_domain = ?2
                 ORDER BY id LIMIT 1",
                params![site_domain, exchange_domain],
                |row| row.get::<_, Option<i64>>(0),
            )
            .optional()?;
        Ok(reference.flatten())
    }

    // ===== Run Management =====

    fn create_run(&mut self, config_hash: &str) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO runs (started_at, config_hash) VALUES (?1, ?2)",
            params![now, config_hash],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn complete_run(
        &mut self,
        run_id: i64,
        urls_processed: u64,
        records_written: u64,
    ) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let updated = self.conn.execute(
            "UPDATE runs SET finished_at = ?1, urls_processed = ?2, records_written = ?3
             WHERE id = ?4",
            params![now, urls_processed as i64, records_written as i64, run_id],
        )?;
        if updated == 0 {
            return Err(StorageError::RunNotFound(run_id));
        }
        Ok(())
    }

    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>> {
        let run = self
            .conn
            .query_row(
                "SELECT id, started_at, finished_at, config_hash, urls_processed, records_written
                 FROM runs ORDER BY id DESC LIMIT 1",
                [],
                |row| {
                    Ok(RunRecord {
                        id: row.get(0)?,
                        started_at: row.get(1)?,
                        finished_at: row.get(2)?,
                        config_hash: row.get(3)?,
                        urls_processed: row.get::<_, Option<i64>>(4)?.map(|v| v as u64),
                        records_written: row.get::<_, Option<i64>>(5)?.map(|v| v as u64),
                    })
                },
            )
            .optional()?;

        Ok(run)
    }

    // ===== Statistics =====

    fn get_statistics(&self) -> StorageResult<StorageStatistics> {
        Ok(StorageStatistics {
            total_records: self.count_records()?,
            distinct_sites: self.count("SELECT COUNT(DISTINCT site_domain) FROM adstxt")?,
            distinct_exchanges: self.count("SELECT COUNT(DISTINCT exchange_domain) FROM adstxt")?,
            direct_records: self
                .count("SELECT COUNT(*) FROM adstxt WHERE account_type = 'direct'")?,
            reseller_records: self
                .count("SELECT COUNT(*) FROM adstxt WHERE account_type = 'reseller'")?,
            reconciled_records: self
                .count("SELECT COUNT(*) FROM adstxt WHERE adsystem_domain IS NOT NULL")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(exchange: &str, seller: &str, tag: Option<&str>) -> AdsTxtRecord {
        AdsTxtRecord {
            site_domain: "site.com".to_string(),
            exchange_domain: exchange.to_string(),
            seller_account_id: seller.to_string(),
            account_type: AccountType::Direct,
            tag_id: tag.map(str::to_string),
            entry_comment: None,
        }
    }

    #[test]
    fn test_upsert_record_inserts() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        assert!(storage.upsert_record(&record("exchange.com", "123", None)).unwrap());
        assert_eq!(storage.count_records().unwrap(), 1);
    }

    #[test]
    fn test_upsert_record_is_idempotent() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        let rec = record("exchange.com", "123", Some("abc"));

        assert!(storage.upsert_record(&rec).unwrap());
        assert!(!storage.upsert_record(&rec).unwrap());

        assert_eq!(storage.count_records().unwrap(), 1);
    }

    #[test]
    fn test_upsert_without_tag_is_idempotent() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        let rec = record("exchange.com", "123", None);

        storage.upsert_record(&rec).unwrap();
        storage.upsert_record(&rec).unwrap();

        assert_eq!(storage.count_records().unwrap(), 1);
    }

    #[test]
    fn test_comment_is_not_part_of_natural_key() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        let mut rec = record("exchange.com", "123", None);
        storage.upsert_record(&rec).unwrap();

        rec.entry_comment = Some("another comment".to_string());
        assert!(!storage.upsert_record(&rec).unwrap());
        assert_eq!(storage.count_records().unwrap(), 1);
    }

    #[test]
    fn test_different_account_type_is_a_new_record() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        let mut rec = record("exchange.com", "123", None);
        storage.upsert_record(&rec).unwrap();

        rec.account_type = AccountType::Reseller;
        assert!(storage.upsert_record(&rec).unwrap());
        assert_eq!(storage.count_records().unwrap(), 2);
    }

    #[test]
    fn test_get_records_for_site_round_trips_optional_fields() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        let mut rec = record("exchange.com", "123", Some("taga"));
        rec.entry_comment = Some("test".to_string());
        storage.upsert_record(&rec).unwrap();
        storage.upsert_record(&record("other.com", "9", None)).unwrap();

        let records = storage.get_records_for_site("site.com").unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0], rec);
        assert_eq!(records[1].tag_id, None);
        assert_eq!(records[1].entry_comment, None);

        assert!(storage.get_records_for_site("nobody.com").unwrap().is_empty());
    }

    #[test]
    fn test_register_adsystem_domain_is_idempotent() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        let id1 = storage.register_adsystem_domain("google.com").unwrap();
        let id2 = storage.register_adsystem_domain("Google.com ").unwrap();
        assert_eq!(id1, id2);
    }

    #[test]
    fn test_reconcile_sets_reference_for_known_exchanges() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        let google_id = storage.register_adsystem_domain("google.com").unwrap();

        storage.upsert_record(&record("google.com", "pub-1", None)).unwrap();
        storage.upsert_record(&record("google.com", "pub-2", None)).unwrap();
        storage.upsert_record(&record("unknown.com", "7", None)).unwrap();

        let updated = storage.reconcile_adsystem_domains().unwrap();
        assert_eq!(updated, 2);

        assert_eq!(
            storage.get_adsystem_reference("site.com", "google.com").unwrap(),
            Some(google_id)
        );
        assert_eq!(
            storage.get_adsystem_reference("site.com", "unknown.com").unwrap(),
            None
        );

        let stats = storage.get_statistics().unwrap();
        assert_eq!(stats.reconciled_records, 2);
    }

    #[test]
    fn test_run_lifecycle() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        assert!(storage.get_latest_run().unwrap().is_none());

        let run_id = storage.create_run("abc123").unwrap();
        let run = storage.get_latest_run().unwrap().unwrap();
        assert_eq!(run.id, run_id);
        assert!(run.finished_at.is_none());

        storage.complete_run(run_id, 10, 42).unwrap();
        let run = storage.get_latest_run().unwrap().unwrap();
        assert!(run.finished_at.is_some());
        assert_eq!(run.urls_processed, Some(10));
        assert_eq!(run.records_written, Some(42));
        assert_eq!(run.config_hash, "abc123");
    }

    #[test]
    fn test_complete_unknown_run_fails() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        assert!(matches!(
            storage.complete_run(99, 0, 0),
            Err(StorageError::RunNotFound(99))
        ));
    }

    #[test]
    fn test_statistics() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        storage.upsert_record(&record("a.com", "1", None)).unwrap();
        let mut reseller = record("b.com", "2", None);
        reseller.account_type = AccountType::Reseller;
        reseller.site_domain = "other.com".to_string();
        storage.upsert_record(&reseller).unwrap();

        let stats = storage.get_statistics().unwrap();
        assert_eq!(stats.total_records, 2);
        assert_eq!(stats.distinct_sites, 2);
        assert_eq!(stats.distinct_exchanges, 2);
        assert_eq!(stats.direct_records, 1);
        assert_eq!(stats.reseller_records, 1);
        assert_eq!(stats.reconciled_records, 0);
    }
}
