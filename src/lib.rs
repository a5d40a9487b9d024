//! adstxt-crawler: fetches, validates and stores ads.txt records
//!
//! This crate crawls a list of publisher domains, downloads each domain's
//! `ads.txt` file, parses its records, validates them against the ads.txt
//! grammar and upserts the valid ones into a SQLite database. Subdomains
//! declared with `subdomain=` directives are crawled one level deep.

pub mod config;
pub mod crawler;
pub mod output;
pub mod record;
pub mod storage;
pub mod targets;

use thiserror::Error;

/// Main error type for adstxt-crawler operations
#[derive(Debug, Error)]
pub enum AdsTxtError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid domain pattern: {0}")]
    InvalidPattern(String),
}

/// Errors raised while turning a target list entry into a crawlable host
#[derive(Debug, Error)]
pub enum TargetError {
    #[error("Failed to parse URL: {0}")]
    Parse(#[from] ::url::ParseError),

    #[error("Missing host in URL: {0}")]
    MissingHost(String),

    #[error("Host too short: {0}")]
    HostTooShort(String),
}

/// Result type alias for adstxt-crawler operations
pub type Result<T> = std::result::Result<T, AdsTxtError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{CrawlDispatcher, CrawlResult, DocumentFetcher, DomainCrawler};
pub use output::CrawlSummary;
pub use record::{AccountType, AdsTxtRecord};
