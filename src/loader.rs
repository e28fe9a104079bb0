//! CSV input loading.
//!
//! Reads the whole export into memory, resolving the header layout and
//! keeping every column so unknown fields survive to the output.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use tracing::debug;

use crate::errors::{ClickSiftError, Result};
use crate::records::{RawRecord, RecordTable, Schema};

/// Load `path` as CSV and validate its header against the required columns
/// plus `identity_column`.
pub fn load_records(path: &Path, identity_column: &str) -> Result<RecordTable> {
    let shown = path.display().to_string();
    let file = File::open(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied => {
            ClickSiftError::input_not_found(&shown)
        }
        _ => ClickSiftError::io(&shown, "open", e),
    })?;
    let table = read_records(file, &shown, identity_column)?;
    debug!(
        path = %shown,
        columns = table.schema.headers().len(),
        rows = table.records.len(),
        "Loaded input"
    );
    Ok(table)
}

/// Load CSV from any reader. `source` names the input in error messages.
pub fn read_records<R: Read>(reader: R, source: &str, identity_column: &str) -> Result<RecordTable> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .from_reader(reader);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| ClickSiftError::malformed_input(source, e.to_string()))?
        .iter()
        .enumerate()
        .map(|(i, h)| {
            if i == 0 {
                h.trim_start_matches('\u{feff}').to_string()
            } else {
                h.to_string()
            }
        })
        .collect();

    if headers.iter().all(|h| h.trim().is_empty()) {
        return Err(ClickSiftError::empty_input(source));
    }

    let schema = Schema::from_headers(headers, identity_column)?;

    let mut records = Vec::new();
    for (i, result) in reader.records().enumerate() {
        let row = i + 1;
        let record = result.map_err(|e| {
            ClickSiftError::malformed_input(source, format!("data row {row}: {e}"))
        })?;
        records.push(RawRecord::new(row, record.iter().map(str::to_string).collect()));
    }

    Ok(RecordTable { schema, records })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const HEADER: &str = "email,message,details,time,campaign\n";

    fn load_str(content: &str) -> Result<RecordTable> {
        read_records(content.as_bytes(), "test.csv", "email")
    }

    #[test]
    fn loads_rows_and_extra_columns() {
        let csv = format!(
            "{HEADER}a@x.com,Clicked Link,\"{{'browser': {{'address': '8.8.8.8'}}}}\",2024-05-01 12:00:00,Q2\n"
        );
        let table = load_str(&csv).unwrap();
        assert_eq!(table.schema.headers().len(), 5);
        assert_eq!(table.records.len(), 1);
        let rec = &table.records[0];
        assert_eq!(rec.row, 1);
        assert_eq!(rec.values[4], "Q2");
        assert_eq!(rec.details(&table.schema), "{'browser': {'address': '8.8.8.8'}}");
    }

    #[test]
    fn header_only_is_valid() {
        let table = load_str(HEADER).unwrap();
        assert!(table.records.is_empty());
    }

    #[test]
    fn empty_file_is_rejected() {
        assert!(matches!(load_str(""), Err(ClickSiftError::EmptyInput { .. })));
    }

    #[test]
    fn missing_columns_are_rejected() {
        let err = load_str("email,message,time\nx,y,z\n").unwrap_err();
        assert!(matches!(err, ClickSiftError::MissingColumns { .. }));
    }

    #[test]
    fn ragged_rows_are_malformed() {
        let err = load_str(&format!("{HEADER}a,b\n")).unwrap_err();
        match err {
            ClickSiftError::MalformedInput { reason, .. } => assert!(reason.contains("data row 1")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn strips_byte_order_mark() {
        let csv = "\u{feff}message,details,time,email\n";
        assert!(load_str(csv).is_ok());
    }

    #[test]
    fn missing_file_is_input_error() {
        let err = load_records(Path::new("/definitely/not/here.csv"), "email").unwrap_err();
        assert!(matches!(err, ClickSiftError::InputNotFound { .. }));
    }

    #[test]
    fn loads_from_disk() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"message,details,time,email\nOpened,{},2024-01-01,a@x\n")
            .unwrap();
        file.flush().unwrap();
        let table = load_records(file.path(), "email").unwrap();
        assert_eq!(table.records.len(), 1);
    }
}
