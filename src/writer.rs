//! CSV output of the cleaned table.

use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use tracing::debug;

use crate::errors::{ClickSiftError, Result};
use crate::records::{CleanedTable, DERIVED_COLUMNS};

/// Render a timestamp the way it appears in the output file.
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Output header: input columns in their original order, then the derived
/// columns. An input column sharing a derived column's name is replaced by it.
pub fn output_headers(table: &CleanedTable) -> Vec<String> {
    table
        .schema
        .headers()
        .iter()
        .filter(|h| !DERIVED_COLUMNS.contains(&h.as_str()))
        .cloned()
        .chain(DERIVED_COLUMNS.iter().map(|c| c.to_string()))
        .collect()
}

/// Write `table` to `path`, replacing any existing file. The header is written
/// even when there are no records.
pub fn write_records(path: &Path, table: &CleanedTable) -> Result<()> {
    let shown = path.display().to_string();
    let fail = |e: csv::Error| ClickSiftError::output(&shown, e.to_string());

    let keep: Vec<bool> = table
        .schema
        .headers()
        .iter()
        .map(|h| !DERIVED_COLUMNS.contains(&h.as_str()))
        .collect();

    let mut writer = csv::Writer::from_path(path).map_err(fail)?;
    writer.write_record(output_headers(table)).map_err(fail)?;

    for record in &table.records {
        let mut row: Vec<String> = record
            .raw
            .values
            .iter()
            .zip(&keep)
            .filter(|(_, keep)| **keep)
            .map(|(v, _)| v.clone())
            .collect();
        row.push(record.ip.clone());
        row.push(format_timestamp(record.timestamp));
        row.push(format_timestamp(record.timestamp_rounded));
        writer.write_record(&row).map_err(fail)?;
    }

    writer
        .flush()
        .map_err(|e| ClickSiftError::output(&shown, e.to_string()))?;
    debug!(path = %shown, rows = table.records.len(), "Wrote output");
    Ok(())
}
