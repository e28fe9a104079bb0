//! Client IP extraction from the `details` column.
//!
//! Strategy:
//! 1. Parse the cell with the safe literal parser (`literal::parse`).
//! 2. Navigate `details["browser"]["address"]`.
//! 3. Accept the value only if it is a non-blank string.
//!
//! Failures never escape this module as errors: [`extract_ip`] logs the reason
//! at error level and returns `None`, leaving it to the caller to drop the
//! record. [`locate_ip`] exposes the same logic without logging for callers
//! (and tests) that want the reason.

use thiserror::Error;
use tracing::{debug, error};

use crate::errors::ErrorCategory;
use crate::literal::{self, Literal, LiteralError};

const BROWSER_KEY: &str = "browser";
const ADDRESS_KEY: &str = "address";

/// Why a `details` value did not yield an IP address.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExtractionError {
    #[error("details is empty")]
    Empty,

    #[error("malformed details literal: {0}")]
    Malformed(#[from] LiteralError),

    #[error("expected a mapping at '{path}', found {found}")]
    NotAMapping { path: String, found: &'static str },

    #[error("missing key '{path}'")]
    MissingKey { path: String },

    #[error("expected a string at '{path}', found {found}")]
    NotAString { path: String, found: &'static str },

    #[error("blank address at '{path}'")]
    BlankAddress { path: String },
}

impl ExtractionError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ExtractionError::Malformed(e) => e.category(),
            _ => ErrorCategory::Extraction,
        }
    }

    /// An empty cell carries no payload at all; it is not a malformed one.
    pub fn is_blank_cell(&self) -> bool {
        matches!(self, ExtractionError::Empty)
    }
}

/// Extract the client IP from a `details` cell, logging any failure.
///
/// Blank cells are logged at debug level, everything else at error level.
/// `row` is the 1-based data row, used only for diagnostics.
pub fn extract_ip(details: Option<&str>, row: usize) -> Option<String> {
    match details.map_or(Err(ExtractionError::Empty), locate_ip) {
        Ok(ip) => Some(ip),
        Err(e) if e.is_blank_cell() => {
            debug!(row, "Skipping row without details");
            None
        }
        Err(e) => {
            error!(row, category = %e.category(), "Error processing row: {e}");
            None
        }
    }
}

/// Pure variant of [`extract_ip`] returning the failure reason.
pub fn locate_ip(details: &str) -> Result<String, ExtractionError> {
    if details.trim().is_empty() {
        return Err(ExtractionError::Empty);
    }
    let root = literal::parse(details)?;

    let browser = child(&root, "", BROWSER_KEY)?;
    let address_path = format!("{BROWSER_KEY}.{ADDRESS_KEY}");
    let address = child(browser, BROWSER_KEY, ADDRESS_KEY)?;

    let ip = address.as_str().ok_or_else(|| ExtractionError::NotAString {
        path: address_path.clone(),
        found: address.type_name(),
    })?;
    let ip = ip.trim();
    if ip.is_empty() {
        return Err(ExtractionError::BlankAddress { path: address_path });
    }
    Ok(ip.to_string())
}

fn child<'a>(parent: &'a Literal, parent_path: &str, key: &str) -> Result<&'a Literal, ExtractionError> {
    let path = if parent_path.is_empty() {
        key.to_string()
    } else {
        format!("{parent_path}.{key}")
    };
    if !parent.is_dict() {
        return Err(ExtractionError::NotAMapping {
            path: if parent_path.is_empty() {
                "<root>".to_string()
            } else {
                parent_path.to_string()
            },
            found: parent.type_name(),
        });
    }
    parent.get(key).ok_or(ExtractionError::MissingKey { path })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_address() {
        assert_eq!(
            locate_ip("{'browser': {'address': '8.8.8.8'}}").unwrap(),
            "8.8.8.8"
        );
        assert_eq!(
            extract_ip(Some("{'browser': {'address': ' 1.2.3.4 '}}"), 1).as_deref(),
            Some("1.2.3.4")
        );
    }

    #[test]
    fn extracts_from_json_details() {
        let details = r#"{"payload": {"rid": ["abc"]}, "browser": {"address": "2001:db8::1", "user-agent": "curl"}}"#;
        assert_eq!(locate_ip(details).unwrap(), "2001:db8::1");
    }

    #[test]
    fn malformed_details_is_absent() {
        assert!(matches!(
            locate_ip("{'browser': {'address': '1.2.3.4'"),
            Err(ExtractionError::Malformed(_))
        ));
        assert_eq!(extract_ip(Some("not a literal"), 3), None);
    }

    #[test]
    fn missing_path_levels() {
        assert_eq!(
            locate_ip("{'payload': {}}"),
            Err(ExtractionError::MissingKey {
                path: "browser".into()
            })
        );
        assert_eq!(
            locate_ip("{'browser': {'user-agent': 'x'}}"),
            Err(ExtractionError::MissingKey {
                path: "browser.address".into()
            })
        );
    }

    #[test]
    fn wrong_shapes() {
        assert!(matches!(
            locate_ip("['browser']"),
            Err(ExtractionError::NotAMapping { found: "list", .. })
        ));
        assert!(matches!(
            locate_ip("{'browser': 'chrome'}"),
            Err(ExtractionError::NotAMapping { found: "str", .. })
        ));
        assert!(matches!(
            locate_ip("{'browser': {'address': 1234}}"),
            Err(ExtractionError::NotAString { found: "int", .. })
        ));
        assert!(matches!(
            locate_ip("{'browser': {'address': None}}"),
            Err(ExtractionError::NotAString { found: "none", .. })
        ));
    }

    #[test]
    fn empty_inputs() {
        assert_eq!(locate_ip("   "), Err(ExtractionError::Empty));
        assert!(matches!(
            locate_ip("{'browser': {'address': '  '}}"),
            Err(ExtractionError::BlankAddress { .. })
        ));
        assert_eq!(extract_ip(None, 1), None);
        assert_eq!(extract_ip(Some(""), 1), None);
    }

    #[test]
    fn only_blank_cells_count_as_blank() {
        assert!(locate_ip("").unwrap_err().is_blank_cell());
        assert!(locate_ip(" \t").unwrap_err().is_blank_cell());
        assert!(!locate_ip("{'browser': {}}").unwrap_err().is_blank_cell());
        assert!(!locate_ip("{'browser'").unwrap_err().is_blank_cell());
    }

    #[test]
    fn categories() {
        let malformed = locate_ip("{'a': nope}").unwrap_err();
        assert_eq!(malformed.category(), ErrorCategory::Extraction);
        assert_eq!(ExtractionError::Empty.category(), ErrorCategory::Extraction);
    }
}
