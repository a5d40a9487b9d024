use crate::config::types::{AdSystemEntry, Config, CrawlerConfig, StorageConfig, UserAgentConfig};
use crate::record::MIN_DOMAIN_LEN;
use crate::ConfigError;
use url::Url;

const MAX_WORKERS: usize = 256;
const MAX_REQUEST_TIMEOUT_SECS: u64 = 120;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_storage_config(&config.storage)?;
    validate_adsystem_domains(&config.adsystem)?;
    Ok(())
}

fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.workers < 1 || config.workers > MAX_WORKERS {
        return Err(ConfigError::Validation(format!(
            "workers must be between 1 and {}, got {}",
            MAX_WORKERS, config.workers
        )));
    }

    if config.request_timeout_secs < 1 || config.request_timeout_secs > MAX_REQUEST_TIMEOUT_SECS {
        return Err(ConfigError::Validation(format!(
            "request_timeout_secs must be between 1 and {}, got {}",
            MAX_REQUEST_TIMEOUT_SECS, config.request_timeout_secs
        )));
    }

    Ok(())
}

fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    // Validate crawler name: non-empty, alphanumeric + hyphens only
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    if config.crawler_version.trim().is_empty() {
        return Err(ConfigError::Validation(
            "crawler_version cannot be empty".to_string(),
        ));
    }

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;

    Ok(())
}

fn validate_storage_config(config: &StorageConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database_path cannot be empty".to_string(),
        ));
    }

    if config.busy_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "busy_timeout_secs must be >= 1, got {}",
            config.busy_timeout_secs
        )));
    }

    Ok(())
}

fn validate_adsystem_domains(entries: &[AdSystemEntry]) -> Result<(), ConfigError> {
    for entry in entries {
        validate_adsystem_domain(&entry.domain)?;
    }
    Ok(())
}

/// Validates a registry domain such as `google.com`
///
/// Exchange domains are stored lower-cased, so a registry entry with
/// uppercase letters could never be linked and is rejected.
fn validate_adsystem_domain(domain: &str) -> Result<(), ConfigError> {
    let invalid = |reason: &str| -> Result<(), ConfigError> {
        Err(ConfigError::InvalidPattern(format!(
            "Ad-system domain '{}' {}",
            domain, reason
        )))
    };

    if domain.len() < MIN_DOMAIN_LEN {
        return invalid("is too short");
    }
    if domain.chars().any(|c| c.is_ascii_uppercase()) {
        return invalid("must be lower-case");
    }

    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 {
        return invalid("must contain at least one dot (e.g., 'google.com')");
    }

    for label in labels {
        if label.is_empty() {
            return invalid("has an empty label");
        }
        if label.starts_with('-') || label.ends_with('-') {
            return invalid("has a label starting or ending with '-'");
        }
        if !label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return invalid("contains invalid characters");
        }
    }

    Ok(())
}
