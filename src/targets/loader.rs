use crate::crawler::split_quoted;
use crate::record::MIN_DOMAIN_LEN;
use crate::TargetError;
use std::collections::HashSet;
use std::path::Path;
use url::Url;

/// Extracts the network location (host plus explicit port) of a URL
///
/// The host is converted to lowercase.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use adstxt_crawler::targets::extract_netloc;
///
/// let url = Url::parse("https://EXAMPLE.com/path").unwrap();
/// assert_eq!(extract_netloc(&url), Some("example.com".to_string()));
///
/// let url = Url::parse("http://example.com:8080/").unwrap();
/// assert_eq!(extract_netloc(&url), Some("example.com:8080".to_string()));
/// ```
pub fn extract_netloc(url: &Url) -> Option<String> {
    let host = url.host_str()?.to_lowercase();
    Some(match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host,
    })
}

/// Turns one target list line into a host
///
/// # Returns
///
/// * `Ok(None)` - Blank line or comment line
/// * `Ok(Some(host))` - The host to crawl
/// * `Err(TargetError)` - The entry could not be turned into a host
pub fn parse_target_line(line: &str) -> Result<Option<String>, TargetError> {
    let fields = split_quoted(line, ',');
    let Some(first) = fields.first() else {
        return Ok(None);
    };
    if first.starts_with('#') {
        return Ok(None);
    }

    let item = first.trim();
    if item.is_empty() {
        return Ok(None);
    }

    let host = if item.contains("http:") || item.contains("https:") {
        let url = Url::parse(item)?;
        extract_netloc(&url).ok_or_else(|| TargetError::MissingHost(item.to_string()))?
    } else {
        item.to_lowercase()
    };

    if host.len() < MIN_DOMAIN_LEN {
        return Err(TargetError::HostTooShort(host));
    }

    Ok(Some(host))
}

/// Parses a whole target list, deduplicating hosts in first-seen order
///
/// Invalid entries are logged and skipped.
pub fn parse_targets(content: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut hosts = Vec::new();

    for line in content.lines() {
        match parse_target_line(line) {
            Ok(Some(host)) => {
                if seen.insert(host.clone()) {
                    tracing::info!("HOST: {}", host);
                    hosts.push(host);
                }
            }
            Ok(None) => {}
            Err(e) => tracing::warn!("Skipping target {:?}: {}", line, e),
        }
    }

    hosts
}

/// Reads a target list file
pub fn load_targets(path: &Path) -> std::io::Result<Vec<String>> {
    let content = std::fs::read_to_string(path)?;
    Ok(parse_targets(&content))
}
