use serde::Deserialize;

/// Main configuration structure for adstxt-crawler
///
/// Every section is optional; a missing file or section falls back to the
/// defaults below.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default, rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    /// Known advertising systems seeded into the registry table
    #[serde(default)]
    pub adsystem: Vec<AdSystemEntry>,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Number of hosts crawled in parallel (defaults to the CPU count)
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Per-request timeout for the ads.txt fetch (seconds)
    #[serde(default = "default_request_timeout", rename = "request-timeout-secs")]
    pub request_timeout_secs: u64,

    /// Keep targets that resolve to a loopback address
    #[serde(default, rename = "allow-loopback")]
    pub allow_loopback: bool,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            request_timeout_secs: default_request_timeout(),
            allow_loopback: false,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(default = "default_crawler_name", rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(default = "default_crawler_version", rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(default = "default_contact_url", rename = "contact-url")]
    pub contact_url: String,
}

impl UserAgentConfig {
    /// Formats the User-Agent header value: `Name/Version; +ContactURL`
    pub fn header_value(&self) -> String {
        format!(
            "{}/{}; +{}",
            self.crawler_name, self.crawler_version, self.contact_url
        )
    }
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: default_crawler_name(),
            crawler_version: default_crawler_version(),
            contact_url: default_contact_url(),
        }
    }
}

/// Storage configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Path to the SQLite database file
    #[serde(default = "default_database_path", rename = "database-path")]
    pub database_path: String,

    /// How long a writer waits for a locked database (seconds)
    #[serde(default = "default_busy_timeout", rename = "busy-timeout-secs")]
    pub busy_timeout_secs: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            busy_timeout_secs: default_busy_timeout(),
        }
    }
}

/// Entry of the advertising-system registry
#[derive(Debug, Clone, Deserialize)]
pub struct AdSystemEntry {
    /// Canonical domain of the advertising system (e.g., "google.com")
    pub domain: String,
}

fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|p| p.get())
        .unwrap_or(4)
}

fn default_request_timeout() -> u64 {
    5
}

fn default_crawler_name() -> String {
    "AdsTxtCrawler".to_string()
}

fn default_crawler_version() -> String {
    "1.0".to_string()
}

fn default_contact_url() -> String {
    "https://github.com/InteractiveAdvertisingBureau/adstxtcrawler".to_string()
}

fn default_database_path() -> String {
    "adstxt.db".to_string()
}

fn default_busy_timeout() -> u64 {
    15
}
