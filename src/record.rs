//! ads.txt record types
//!
//! These are the values produced by the record validator and persisted by
//! the storage layer.

use std::fmt;
use std::str::FromStr;

/// Minimum length of a site or exchange domain
///
/// A domain name needs at least one character plus an extension, e.g. `a.b`.
pub const MIN_DOMAIN_LEN: usize = 3;

/// Relationship between the publisher and the advertising system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccountType {
    /// The publisher controls the seller account directly
    Direct,
    /// The publisher authorized a third party to resell its inventory
    Reseller,
}

impl AccountType {
    /// Returns the normalized lowercase form stored in the database
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::Reseller => "reseller",
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccountType {
    type Err = String;

    /// Parses an account type, ignoring case and surrounding whitespace
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "direct" => Ok(Self::Direct),
            "reseller" => Ok(Self::Reseller),
            other => Err(format!("unknown account type '{}'", other)),
        }
    }
}

/// One validated line of an ads.txt file
///
/// The tuple (site_domain, exchange_domain, seller_account_id, account_type,
/// tag_id) is the natural key: storing the same tuple twice is a no-op.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdsTxtRecord {
    /// The crawled host that published the file
    pub site_domain: String,

    /// Domain of the advertising system
    pub exchange_domain: String,

    /// Publisher's account ID within the advertising system
    pub seller_account_id: String,

    /// DIRECT or RESELLER
    pub account_type: AccountType,

    /// Certification authority ID (optional fourth field)
    pub tag_id: Option<String>,

    /// Comment carried from the source line
    pub entry_comment: Option<String>,
}
