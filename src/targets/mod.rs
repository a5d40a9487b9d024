//! Target list handling
//!
//! This module turns the operator's target file into the host queue:
//! - Parsing host and URL entries, skipping comments
//! - Reducing URLs to their network location
//! - Dropping hosts that do not resolve to a usable address

mod loader;
mod resolve;

pub use loader::{extract_netloc, load_targets, parse_target_line, parse_targets};
pub use resolve::{check_address, check_host, filter_resolvable, resolve_host, Unusable};
