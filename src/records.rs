//! Row model shared by the loader, pipeline and writer.

use chrono::{DateTime, Utc};

use crate::errors::{ClickSiftError, Result};

/// Columns every input must carry.
pub const REQUIRED_COLUMNS: [&str; 3] = ["message", "details", "time"];

/// Default grouping column.
pub const DEFAULT_IDENTITY_COLUMN: &str = "email";

/// Derived columns appended to the output, in order.
pub const DERIVED_COLUMNS: [&str; 3] = ["ip", "timestamp", "timestamp_rounded"];

/// Header layout of a loaded file with the positions of the columns the
/// pipeline reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    headers: Vec<String>,
    message: usize,
    details: usize,
    time: usize,
    identity: usize,
}

impl Schema {
    /// Resolve the required columns plus `identity_column` in `headers`.
    pub fn from_headers(headers: Vec<String>, identity_column: &str) -> Result<Self> {
        for (i, h) in headers.iter().enumerate() {
            if headers[..i].contains(h) {
                return Err(ClickSiftError::duplicate_column(h.clone()));
            }
        }

        let position = |name: &str| headers.iter().position(|h| h == name);
        let mut wanted: Vec<&str> = REQUIRED_COLUMNS.to_vec();
        if !wanted.contains(&identity_column) {
            wanted.push(identity_column);
        }
        let missing: Vec<String> = wanted
            .iter()
            .filter(|c| position(c).is_none())
            .map(|c| c.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(ClickSiftError::missing_columns(&wanted, missing));
        }

        let (Some(message), Some(details), Some(time), Some(identity)) = (
            position("message"),
            position("details"),
            position("time"),
            position(identity_column),
        ) else {
            return Err(ClickSiftError::internal("column resolution failed after validation"));
        };

        Ok(Self {
            headers,
            message,
            details,
            time,
            identity,
        })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn identity_column(&self) -> &str {
        &self.headers[self.identity]
    }
}

/// One input row, values aligned with the schema headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    /// 1-based data row number (header excluded).
    pub row: usize,
    pub values: Vec<String>,
}

impl RawRecord {
    pub fn new(row: usize, values: Vec<String>) -> Self {
        Self { row, values }
    }

    fn value(&self, index: usize) -> &str {
        self.values.get(index).map(String::as_str).unwrap_or("")
    }

    pub fn message<'a>(&'a self, schema: &Schema) -> &'a str {
        self.value(schema.message)
    }

    pub fn details<'a>(&'a self, schema: &Schema) -> &'a str {
        self.value(schema.details)
    }

    pub fn time<'a>(&'a self, schema: &Schema) -> &'a str {
        self.value(schema.time)
    }

    pub fn identity<'a>(&'a self, schema: &Schema) -> &'a str {
        self.value(schema.identity)
    }
}

/// A loaded input file.
#[derive(Debug, Clone)]
pub struct RecordTable {
    pub schema: Schema,
    pub records: Vec<RawRecord>,
}

/// A click that survived filtering, with its derived fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClickRecord {
    pub raw: RawRecord,
    pub identity: String,
    pub ip: String,
    pub timestamp: DateTime<Utc>,
    pub timestamp_rounded: DateTime<Utc>,
}

/// Pipeline result ready for writing.
#[derive(Debug, Clone)]
pub struct CleanedTable {
    pub schema: Schema,
    pub records: Vec<ClickRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn resolves_columns_in_any_order() {
        let schema =
            Schema::from_headers(headers(&["time", "email", "extra", "details", "message"]), "email")
                .unwrap();
        let rec = RawRecord::new(1, headers(&["t", "a@x", "e", "d", "m"]));
        assert_eq!(rec.message(&schema), "m");
        assert_eq!(rec.details(&schema), "d");
        assert_eq!(rec.time(&schema), "t");
        assert_eq!(rec.identity(&schema), "a@x");
        assert_eq!(schema.identity_column(), "email");
    }

    #[test]
    fn reports_every_missing_column() {
        let err = Schema::from_headers(headers(&["message", "Time"]), "email").unwrap_err();
        match err {
            ClickSiftError::MissingColumns { missing, .. } => {
                assert_eq!(missing, vec!["details", "time", "email"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn rejects_duplicate_headers() {
        let err = Schema::from_headers(
            headers(&["message", "details", "time", "email", "time"]),
            "email",
        )
        .unwrap_err();
        assert!(matches!(err, ClickSiftError::DuplicateColumn { column } if column == "time"));
    }

    #[test]
    fn short_rows_read_as_empty() {
        let schema =
            Schema::from_headers(headers(&["message", "details", "time", "email"]), "email").unwrap();
        let rec = RawRecord::new(1, headers(&["Clicked Link"]));
        assert_eq!(rec.identity(&schema), "");
    }
}
