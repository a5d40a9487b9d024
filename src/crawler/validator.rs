//! ads.txt record validation
//!
//! Fields are taken positionally: exchange domain, seller account ID,
//! account type and, when the line has exactly four fields, a tag ID.

use crate::record::{AccountType, AdsTxtRecord, MIN_DOMAIN_LEN};
use thiserror::Error;

/// Fewest fields a record can have
pub const MIN_RECORD_FIELDS: usize = 3;

/// Field count of a record that carries a tag ID
pub const TAGGED_RECORD_FIELDS: usize = 4;

/// Minimum length of a seller account ID (single-digit IDs exist)
pub const MIN_SELLER_ID_LEN: usize = 1;

/// Why a candidate line was not accepted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RejectReason {
    #[error("fewer than 3 fields")]
    TooFewFields,

    #[error("site domain shorter than 3 characters")]
    HostTooShort,

    #[error("exchange domain shorter than 3 characters")]
    ExchangeTooShort,

    #[error("empty seller account ID")]
    EmptySellerId,

    #[error("account type is neither DIRECT nor RESELLER")]
    UnknownAccountType,
}

/// Validates the raw fields of one line published by `host`
///
/// String fields are trimmed and lower-cased. An empty tag ID or comment is
/// treated as absent.
///
/// # Example
///
/// ```
/// use adstxt_crawler::crawler::validate_record;
/// use adstxt_crawler::AccountType;
///
/// let fields = vec!["Exchange.com".to_string(), " 1".to_string(), " RESELLER".to_string()];
/// let record = validate_record(&fields, "site.com", None).unwrap();
/// assert_eq!(record.exchange_domain, "exchange.com");
/// assert_eq!(record.account_type, AccountType::Reseller);
/// ```
pub fn validate_record(
    fields: &[String],
    host: &str,
    comment: Option<&str>,
) -> Result<AdsTxtRecord, RejectReason> {
    if fields.len() < MIN_RECORD_FIELDS {
        return Err(RejectReason::TooFewFields);
    }

    let normalize = |field: &str| field.trim().to_lowercase();
    let exchange_domain = normalize(&fields[0]);
    let seller_account_id = normalize(&fields[1]);
    let account_type = normalize(&fields[2]);
    let tag_id = if fields.len() == TAGGED_RECORD_FIELDS {
        Some(normalize(&fields[3])).filter(|tag| !tag.is_empty())
    } else {
        None
    };

    if host.len() < MIN_DOMAIN_LEN {
        return Err(RejectReason::HostTooShort);
    }

    if exchange_domain.len() < MIN_DOMAIN_LEN {
        return Err(RejectReason::ExchangeTooShort);
    }

    if seller_account_id.len() < MIN_SELLER_ID_LEN {
        return Err(RejectReason::EmptySellerId);
    }

    let account_type = account_type
        .parse::<AccountType>()
        .map_err(|_| RejectReason::UnknownAccountType)?;

    Ok(AdsTxtRecord {
        site_domain: host.to_string(),
        exchange_domain,
        seller_account_id,
        account_type,
        tag_id,
        entry_comment: comment
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string),
    })
}
