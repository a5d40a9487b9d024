//! adstxt-crawler main entry point
//!
//! This is the command-line interface for the ads.txt crawler.

use adstxt_crawler::config::{load_config_with_hash, Config};
use adstxt_crawler::crawler::crawl;
use adstxt_crawler::output::{load_statistics, print_statistics};
use adstxt_crawler::storage::{open_shared_storage, SharedStorage, SqliteStorage, Storage};
use adstxt_crawler::targets::{filter_resolvable, load_targets};
use anyhow::{anyhow, Context};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// adstxt-crawler: fetch and store ads.txt records
///
/// Crawls the ads.txt file of every host in the target list, validates each
/// record and writes the valid ones to a SQLite database. Subdomains declared
/// in a host's file are crawled one level deep.
#[derive(Parser, Debug)]
#[command(name = "adstxt-crawler")]
#[command(version)]
#[command(about = "Crawl ads.txt files into a SQLite database", long_about = None)]
struct Cli {
    /// List of domains to crawl ads.txt from
    #[arg(short, long, value_name = "FILE", required_unless_present = "stats")]
    targets: Option<PathBuf>,

    /// Database to dump crawled data into (overrides the config file)
    #[arg(short, long, value_name = "FILE")]
    database: Option<PathBuf>,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Show statistics from the database and exit
    #[arg(long, conflicts_with = "targets")]
    stats: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let (config, config_hash) = load_config_with_hash(cli.config.as_deref())
        .context("Failed to load configuration")?;
    tracing::info!("Configuration loaded (hash: {})", config_hash);

    let database = cli
        .database
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.storage.database_path));

    if cli.stats {
        return handle_stats(&config, &database);
    }

    let targets = cli
        .targets
        .as_deref()
        .ok_or_else(|| anyhow!("--targets is required"))?;
    handle_crawl(&config, &config_hash, targets, &database).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("adstxt_crawler=warn,warn"),
            1 => EnvFilter::new("adstxt_crawler=info,warn"),
            2 => EnvFilter::new("adstxt_crawler=debug,info"),
            _ => EnvFilter::new("adstxt_crawler=trace,debug"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Handles the --stats mode: shows statistics from the database
fn handle_stats(config: &Config, database: &Path) -> anyhow::Result<()> {
    println!("Database: {}\n", database.display());

    let storage = SqliteStorage::new(
        database,
        Duration::from_secs(config.storage.busy_timeout_secs),
    )
    .with_context(|| format!("Failed to open database {}", database.display()))?;

    let stats = load_statistics(&storage)?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(
    config: &Config,
    config_hash: &str,
    targets: &Path,
    database: &Path,
) -> anyhow::Result<()> {
    let hosts = load_targets(targets)
        .with_context(|| format!("Failed to read targets from {}", targets.display()))?;
    tracing::info!("Loaded {} target host(s)", hosts.len());

    let hosts = filter_resolvable(
        hosts,
        config.crawler.allow_loopback,
        config.crawler.workers,
    )
    .await;

    let storage = open_shared_storage(
        database,
        Duration::from_secs(config.storage.busy_timeout_secs),
    )
    .with_context(|| format!("Failed to open database {}", database.display()))?;

    seed_registry(config, &storage)?;
    let run_id = with_storage(&storage, |s| s.create_run(config_hash))?;

    let summary = crawl(config, storage.clone(), hosts).await?;

    with_storage(&storage, |s| {
        s.complete_run(run_id, summary.total_urls, summary.total_records)
    })?;

    let report = summary.report(&database.display().to_string());
    println!("{}", report);
    tracing::warn!("{}", report);
    tracing::warn!("Finished.");

    Ok(())
}

/// Adds the configured ad systems to the registry table
fn seed_registry(config: &Config, storage: &SharedStorage) -> anyhow::Result<()> {
    for entry in &config.adsystem {
        let id = with_storage(storage, |s| s.register_adsystem_domain(&entry.domain))?;
        tracing::debug!("Registered ad system {} (id {})", entry.domain, id);
    }
    Ok(())
}

fn with_storage<T>(
    storage: &SharedStorage,
    op: impl FnOnce(&mut SqliteStorage) -> adstxt_crawler::storage::StorageResult<T>,
) -> anyhow::Result<T> {
    let mut guard = storage
        .lock()
        .map_err(|_| anyhow!("storage lock poisoned"))?;
    Ok(op(&mut guard)?)
}
