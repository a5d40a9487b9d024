//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the ads.txt database.

/// SQL schema for the database
///
/// `tag_id` and `entry_comment` are stored as empty text rather than NULL:
/// SQLite treats NULLs as distinct in UNIQUE constraints, which would let
/// the same tag-less record be inserted twice.
pub const SCHEMA_SQL: &str = r#"
-- Registry of known advertising systems
CREATE TABLE IF NOT EXISTS adsystem_domain (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    domain TEXT NOT NULL UNIQUE
);

-- One row per valid ads.txt record
CREATE TABLE IF NOT EXISTS adstxt (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    site_domain TEXT NOT NULL,
    exchange_domain TEXT NOT NULL,
    seller_account_id TEXT NOT NULL,
    account_type TEXT NOT NULL,
    tag_id TEXT NOT NULL DEFAULT '',
    entry_comment TEXT NOT NULL DEFAULT '',
    adsystem_domain INTEGER REFERENCES adsystem_domain(id),
    UNIQUE(site_domain, exchange_domain, seller_account_id, account_type, tag_id)
);

CREATE INDEX IF NOT EXISTS idx_adstxt_site ON adstxt(site_domain);
CREATE INDEX IF NOT EXISTS idx_adstxt_exchange ON adstxt(exchange_domain);

-- Track crawl runs
CREATE TABLE IF NOT EXISTS runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    started_at TEXT NOT NULL,
    finished_at TEXT,
    config_hash TEXT NOT NULL,
    urls_processed INTEGER,
    records_written INTEGER
);
"#;

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
