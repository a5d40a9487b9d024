//! ads.txt line parser
//!
//! This module turns sanitized ads.txt text into candidate records:
//! - Splitting each line into a data portion and a comment on `#`
//! - Splitting the data portion into fields on `,`
//! - Recognizing `subdomain=` directives
//! - Carrying comments forward onto later records
//!
//! Both splits are quote-aware with `|` as the quote character, so a quoted
//! field may contain a literal `#` or `,`.

use crate::crawler::validator::{validate_record, RejectReason};
use crate::record::{AdsTxtRecord, MIN_DOMAIN_LEN};

/// Quote character for both the comment split and the field split
pub const QUOTE_CHAR: char = '|';

/// Separates the data portion of a line from its comment
pub const COMMENT_DELIMITER: char = '#';

/// Canonical field separator
pub const FIELD_DELIMITER: char = ',';

/// Prefix of a subdomain directive (`subdomain=<host>`)
pub const SUBDOMAIN_DIRECTIVE: &str = "subdomain";

/// Field delimiter sniffed from a data portion
///
/// Sniffing is informational only: fields are always split on commas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiter {
    Comma,
    Tab,
    Space,
}

impl Delimiter {
    /// Picks the delimiter of one data portion: comma, else tab, else space
    pub fn sniff(data: &str) -> Self {
        if data.contains(',') {
            Self::Comma
        } else if data.contains('\t') {
            Self::Tab
        } else {
            Self::Space
        }
    }
}

/// Splits a line on `delimiter`, honoring `|`-quoted fields
///
/// A field that starts with the quote character runs until the next lone
/// quote; a doubled quote inside it is a literal quote. A quote anywhere else
/// is an ordinary character. An empty line yields no fields at all.
pub fn split_quoted(line: &str, delimiter: char) -> Vec<String> {
    enum State {
        FieldStart,
        Unquoted,
        Quoted,
        QuoteInQuoted,
    }

    let mut fields = Vec::new();
    if line.is_empty() {
        return fields;
    }

    let mut field = String::new();
    let mut state = State::FieldStart;

    for c in line.chars() {
        state = match state {
            State::FieldStart if c == QUOTE_CHAR => State::Quoted,
            State::FieldStart | State::Unquoted => {
                if c == delimiter {
                    fields.push(std::mem::take(&mut field));
                    State::FieldStart
                } else {
                    field.push(c);
                    State::Unquoted
                }
            }
            State::Quoted => {
                if c == QUOTE_CHAR {
                    State::QuoteInQuoted
                } else {
                    field.push(c);
                    State::Quoted
                }
            }
            State::QuoteInQuoted => {
                if c == QUOTE_CHAR {
                    field.push(c);
                    State::Quoted
                } else if c == delimiter {
                    fields.push(std::mem::take(&mut field));
                    State::FieldStart
                } else {
                    field.push(c);
                    State::Unquoted
                }
            }
        };
    }

    fields.push(field);
    fields
}

/// Classification of one physical line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind {
    /// The data portion starts with `#` (only possible via quoting)
    Skip,
    /// A `subdomain=<host>` directive
    Subdomain(String),
    /// A candidate record; may still be rejected by the validator
    Record(Vec<String>),
}

/// Result of parsing one physical line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLine {
    pub kind: LineKind,
    /// Comment in effect for this line (possibly carried from an earlier line)
    pub comment: Option<String>,
    pub delimiter: Delimiter,
}

/// Stateful parser for the lines of one document
///
/// The carried comment is replaced whenever a line has a non-empty comment
/// and is never cleared, so a comment also applies to later lines that have
/// none of their own.
#[derive(Debug, Default)]
pub struct LineParser {
    comment: Option<String>,
}

impl LineParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// The comment currently carried forward
    pub fn carried_comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    /// Parses one physical line (without its line terminator)
    pub fn parse_line(&mut self, line: &str) -> ParsedLine {
        let parts = split_quoted(line, COMMENT_DELIMITER);
        let data = parts.first().map(String::as_str).unwrap_or("");
        let delimiter = Delimiter::sniff(data);
        let fields = split_quoted(data, FIELD_DELIMITER);

        if fields.first().is_some_and(|f| f.starts_with(COMMENT_DELIMITER)) {
            return ParsedLine {
                kind: LineKind::Skip,
                comment: self.comment.clone(),
                delimiter,
            };
        }

        if let Some(comment) = parts.get(1) {
            let comment = comment.trim();
            if !comment.is_empty() {
                self.comment = Some(comment.to_string());
            }
        }

        let subdomain = fields.first().and_then(|f| subdomain_target(f));
        let kind = match subdomain {
            Some(host) => LineKind::Subdomain(host),
            None => LineKind::Record(fields),
        };

        ParsedLine {
            kind,
            comment: self.comment.clone(),
            delimiter,
        }
    }
}

/// Extracts the host of a `subdomain=<host>` field
///
/// A field that starts with `subdomain` but has no `=` is not a directive.
fn subdomain_target(field: &str) -> Option<String> {
    if !field.starts_with(SUBDOMAIN_DIRECTIVE) {
        return None;
    }
    field
        .split('=')
        .nth(1)
        .map(|host| host.trim().to_lowercase())
}

/// Outcome of parsing a complete ads.txt document
#[derive(Debug, Clone, Default)]
pub struct ParsedDocument {
    /// Accepted records in file order
    pub records: Vec<AdsTxtRecord>,

    /// Declared subdomains in order of discovery, without duplicates or the
    /// crawled host itself
    pub subdomains: Vec<String>,

    /// Number of lines rejected by the validator
    pub rejected: usize,
}

/// Parses and validates every line of a sanitized document for `host`
pub fn parse_document(host: &str, text: &str) -> ParsedDocument {
    let mut parser = LineParser::new();
    let mut document = ParsedDocument::default();

    for line in split_lines(text) {
        let parsed = parser.parse_line(line);
        tracing::trace!("DATA: {:?} ({:?})", line, parsed.delimiter);

        match parsed.kind {
            LineKind::Skip => {}
            LineKind::Subdomain(subdomain) => {
                tracing::debug!("SUBDOMAIN: {}", subdomain);
                if subdomain.len() >= MIN_DOMAIN_LEN
                    && subdomain != host
                    && !document.subdomains.contains(&subdomain)
                {
                    document.subdomains.push(subdomain);
                }
            }
            LineKind::Record(fields) => {
                match validate_record(&fields, host, parsed.comment.as_deref()) {
                    Ok(record) => {
                        tracing::debug!(
                            "{} | {} | {} | {} | {} | {}",
                            record.site_domain,
                            record.exchange_domain,
                            record.seller_account_id,
                            record.account_type,
                            record.tag_id.as_deref().unwrap_or(""),
                            record.entry_comment.as_deref().unwrap_or("")
                        );
                        document.records.push(record);
                    }
                    // Nothing before the comment; only lines with data count as rejected
                    Err(RejectReason::TooFewFields) if fields.is_empty() => {}
                    Err(reason) => {
                        tracing::trace!("Rejected line {:?}: {}", line, reason);
                        document.rejected += 1;
                    }
                }
            }
        }
    }

    document
}

/// Splits text on `\r\n`, `\r` or `\n`
fn split_lines(text: &str) -> impl Iterator<Item = &str> {
    text.split('\n')
        .flat_map(|line| line.split('\r'))
        .filter(|line| !line.is_empty())
}
