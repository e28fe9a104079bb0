//! The cleaning pipeline: filter, extract, classify, deduplicate.
//!
//! Stages run strictly in order over an in-memory table:
//!
//! 1. keep `"Clicked Link"` rows ([`filter_clicked`])
//! 2. pull the client IP out of `details`, dropping rows without one
//!    ([`extract_ips`])
//! 3. drop infrastructure addresses ([`exclude_infrastructure`])
//! 4. parse `time` and derive the rounded timestamp ([`to_click_records`])
//! 5. two-stage temporal dedup and identity ordering (`dedup::deduplicate`)

use tracing::{debug, error, info, warn};

use crate::classify::InfrastructureIpSet;
use crate::dedup::{self, round_to_minute};
use crate::errors::{ClickSiftError, Result};
use crate::extract::extract_ip;
use crate::records::{CleanedTable, ClickRecord, RawRecord, RecordTable, Schema};
use crate::timeparse::parse_timestamp;

/// The only `message` value that counts as a click (exact match).
pub const CLICKED_LINK: &str = "Clicked Link";

/// A row with its extracted client IP.
#[derive(Debug, Clone)]
pub struct LocatedRecord {
    pub raw: RawRecord,
    pub ip: String,
}

/// Run every stage over `table`.
pub fn run(table: RecordTable, infra: &InfrastructureIpSet) -> Result<CleanedTable> {
    let RecordTable { schema, records } = table;
    let loaded = records.len();

    let clicked = filter_clicked(records, &schema);
    info!(loaded, clicked = clicked.len(), "Filtered to clicked-link events");

    let located = extract_ips(clicked, &schema);
    info!(with_ip = located.len(), "Extracted client IPs");

    let human = exclude_infrastructure(located, infra);
    info!(remaining = human.len(), "Removed infrastructure IPs");

    let clicks = to_click_records(human, &schema)?;
    let before = clicks.len();
    let records = dedup::deduplicate(clicks);
    info!(
        before,
        after = records.len(),
        "Collapsed repeated clicks"
    );

    Ok(CleanedTable { schema, records })
}

/// Keep rows whose `message` is exactly [`CLICKED_LINK`].
pub fn filter_clicked(records: Vec<RawRecord>, schema: &Schema) -> Vec<RawRecord> {
    records
        .into_iter()
        .filter(|r| r.message(schema) == CLICKED_LINK)
        .collect()
}

/// Attach the client IP to each row; rows without one are dropped (the
/// extractor logs why).
pub fn extract_ips(records: Vec<RawRecord>, schema: &Schema) -> Vec<LocatedRecord> {
    records
        .into_iter()
        .filter_map(|raw| {
            let details = raw.details(schema);
            let cell = (!details.is_empty()).then_some(details);
            let ip = extract_ip(cell, raw.row)?;
            Some(LocatedRecord { raw, ip })
        })
        .collect()
}

/// Drop rows whose IP the classifier marks as infrastructure.
pub fn exclude_infrastructure(
    records: Vec<LocatedRecord>,
    infra: &InfrastructureIpSet,
) -> Vec<LocatedRecord> {
    records
        .into_iter()
        .filter(|r| match infra.classify(&r.ip) {
            Some(reason) => {
                debug!(row = r.raw.row, ip = %r.ip, %reason, "Excluding infrastructure IP");
                false
            }
            None => true,
        })
        .collect()
}

/// Parse `time` and build the final record shape.
///
/// Rows with a blank identity or a blank `time` cannot be grouped and are
/// dropped with a log line. A non-blank `time` that does not parse is a fatal
/// input error.
pub fn to_click_records(records: Vec<LocatedRecord>, schema: &Schema) -> Result<Vec<ClickRecord>> {
    let mut out = Vec::with_capacity(records.len());
    for LocatedRecord { raw, ip } in records {
        let identity = raw.identity(schema).trim();
        if identity.is_empty() {
            warn!(
                row = raw.row,
                column = schema.identity_column(),
                "Dropping click with blank identity"
            );
            continue;
        }

        let time = raw.time(schema);
        if time.trim().is_empty() {
            error!(row = raw.row, "Error processing row: time is empty");
            continue;
        }
        let timestamp = parse_timestamp(time)
            .ok_or_else(|| ClickSiftError::invalid_timestamp(raw.row, time))?;

        out.push(ClickRecord {
            identity: raw.identity(schema).to_string(),
            ip,
            timestamp,
            timestamp_rounded: round_to_minute(timestamp),
            raw,
        });
    }
    Ok(out)
}
