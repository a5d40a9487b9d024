//! Configuration module for adstxt-crawler
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every setting has a default, so the crawler also runs without a file.
//!
//! # Example
//!
//! ```no_run
//! use adstxt_crawler::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("adstxt.toml")).unwrap();
//! println!("Database: {}", config.storage.database_path);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{AdSystemEntry, Config, CrawlerConfig, StorageConfig, UserAgentConfig};

// Re-export parser functions
pub use parser::{hash_content, load_config, load_config_with_hash, parse_config};
