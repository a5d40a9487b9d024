//! ads.txt fetcher
//!
//! This module retrieves `http://<host>/ads.txt` and turns the response into
//! sanitized text, including:
//! - Building the HTTP client with the crawler's user agent and timeout
//! - Rejecting non-200 responses, non-text content types and empty bodies
//! - Rejecting HTML pages served in place of the file
//! - Stripping the byte-order mark and any non-printable characters
//!
//! Every failure is a `FetchError`. The crawler treats all of them the same
//! way, as "no ads.txt file", and never retries.

use crate::config::UserAgentConfig;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use std::time::Duration;
use thiserror::Error;

/// Substrings (matched case-insensitively) that mark a body as HTML
///
/// Servers frequently answer a missing ads.txt with a 200 landing page. Note
/// that `<b`, `<a`, `<p` and `<h` also match longer tags such as `<br` or
/// `<head`.
pub const HTML_MARKERS: [&str; 11] = [
    "<html", "<title", "<meta", "<script", "<body", "<div", "<span", "<b", "<a", "<p", "<h",
];

/// Content-type prefix an ads.txt response must carry
pub const TEXT_CONTENT_TYPE_PREFIX: &str = "text/";

/// Value of the Accept header sent with every request
pub const ACCEPT_TEXT_PLAIN: &str = "text/plain";

const BYTE_ORDER_MARK: char = '\u{feff}';

/// Why a host produced no ads.txt content
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("unexpected HTTP status {0}")]
    Status(u16),

    #[error("response has no content-type header")]
    MissingContentType,

    #[error("unexpected content type '{0}'")]
    ContentType(String),

    #[error("empty response body")]
    EmptyBody,

    #[error("response body looks like HTML (found '{0}')")]
    HtmlBody(&'static str),
}

/// Builds the URL of a host's ads.txt file
///
/// The host may carry a port (`127.0.0.1:8080`).
pub fn ads_txt_url(host: &str) -> String {
    format!("http://{}/ads.txt", host)
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The user agent configuration
/// * `timeout` - Total time allowed for one request
///
/// # Example
///
/// ```no_run
/// use adstxt_crawler::config::UserAgentConfig;
/// use adstxt_crawler::crawler::build_http_client;
/// use std::time::Duration;
///
/// let client = build_http_client(&UserAgentConfig::default(), Duration::from_secs(5)).unwrap();
/// ```
pub fn build_http_client(
    config: &UserAgentConfig,
    timeout: Duration,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.header_value())
        .timeout(timeout)
        .connect_timeout(timeout)
        .gzip(true)
        .brotli(true)
        .build()
}

/// Returns the first HTML marker found in `body`, if any
pub fn find_html_marker(body: &str) -> Option<&'static str> {
    let lowered = body.to_lowercase();
    HTML_MARKERS
        .iter()
        .copied()
        .find(|marker| lowered.contains(marker))
}

/// Normalizes a response body to printable ASCII plus CR/LF
///
/// A leading byte-order mark is dropped along with every other character
/// outside `0x20..=0x7E`, `\r` and `\n`.
pub fn sanitize(body: &str) -> String {
    body.strip_prefix(BYTE_ORDER_MARK)
        .unwrap_or(body)
        .chars()
        .filter(|c| matches!(c, ' '..='~' | '\r' | '\n'))
        .collect()
}

/// Retrieves and sanitizes ads.txt documents
#[derive(Debug, Clone)]
pub struct DocumentFetcher {
    client: Client,
}

impl DocumentFetcher {
    /// Creates a fetcher around an already configured client
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Creates a fetcher with a client built from the user agent config
    pub fn from_config(config: &UserAgentConfig, timeout: Duration) -> Result<Self, reqwest::Error> {
        Ok(Self::new(build_http_client(config, timeout)?))
    }

    /// Fetches the ads.txt file of `host`
    ///
    /// # Acceptance Rules
    ///
    /// | Check | Failure |
    /// |-------|---------|
    /// | Network, timeout or DNS error | `Request` |
    /// | Status is not 200 | `Status` |
    /// | Content-Type missing | `MissingContentType` |
    /// | Content-Type not `text/*` | `ContentType` |
    /// | Body empty | `EmptyBody` |
    /// | Body contains an HTML marker | `HtmlBody` |
    ///
    /// # Returns
    ///
    /// The sanitized document text
    pub async fn fetch(&self, host: &str) -> Result<String, FetchError> {
        let url = ads_txt_url(host);
        tracing::info!("Crawling {} : {}", url, host);

        let response = self
            .client
            .get(&url)
            .header(ACCEPT, ACCEPT_TEXT_PLAIN)
            .send()
            .await?;

        let status = response.status();
        tracing::info!("  {}", status.as_u16());
        if status != StatusCode::OK {
            return Err(FetchError::Status(status.as_u16()));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .ok_or(FetchError::MissingContentType)?
            .to_str()
            .map_err(|_| FetchError::MissingContentType)?
            .to_string();
        if !content_type.starts_with(TEXT_CONTENT_TYPE_PREFIX) {
            return Err(FetchError::ContentType(content_type));
        }

        let body = response.text().await?;
        if body.is_empty() {
            return Err(FetchError::EmptyBody);
        }

        if let Some(marker) = find_html_marker(&body) {
            return Err(FetchError::HtmlBody(marker));
        }

        let text = sanitize(&body);
        tracing::debug!("-------------\n{}\n-------------", text);
        Ok(text)
    }
}
