//! Temporal deduplication of click records.
//!
//! Two stages, applied in order:
//!
//! 1. **Exact minute** ([`dedup_exact_minute`]): keep the first record (in
//!    input order) for each `(identity, ip, timestamp_rounded)`. This removes
//!    duplicate webhook deliveries of the same click.
//! 2. **Five-minute window** ([`dedup_five_minute_window`]): sort by
//!    `(identity, ip, timestamp)` and keep the earliest record of each
//!    `(identity, ip)` pair per 5-minute bucket. Buckets are aligned to the
//!    Unix epoch (`:00`, `:05`, `:10`, ...), not to the first click.
//!
//! [`deduplicate`] runs both and then orders the result by identity.

use std::collections::HashSet;

use chrono::{DateTime, Utc};

use crate::records::ClickRecord;

/// Rounding unit for stage one.
pub const ROUNDING_UNIT_SECS: i64 = 60;

/// Bucket width for stage two.
pub const WINDOW_SECS: i64 = 300;

const NANOS_PER_SEC: i64 = 1_000_000_000;

/// Round to the nearest whole minute; exactly half a minute rounds up.
pub fn round_to_minute(ts: DateTime<Utc>) -> DateTime<Utc> {
    let secs = ts.timestamp();
    let floor = secs.div_euclid(ROUNDING_UNIT_SECS) * ROUNDING_UNIT_SECS;
    let into_minute =
        (secs - floor) * NANOS_PER_SEC + i64::from(ts.timestamp_subsec_nanos());
    let half = ROUNDING_UNIT_SECS * NANOS_PER_SEC / 2;
    let rounded = if into_minute >= half {
        floor + ROUNDING_UNIT_SECS
    } else {
        floor
    };
    // Out of range only at the far end of chrono's calendar; keep the input there.
    DateTime::from_timestamp(rounded, 0).unwrap_or(ts)
}

/// Epoch-aligned 5-minute bucket index of `ts`.
pub fn window_bucket(ts: DateTime<Utc>) -> i64 {
    ts.timestamp().div_euclid(WINDOW_SECS)
}

/// Stage one: drop records repeating an `(identity, ip, timestamp_rounded)`
/// already seen. Input order is preserved.
pub fn dedup_exact_minute(records: Vec<ClickRecord>) -> Vec<ClickRecord> {
    let mut seen: HashSet<(String, String, DateTime<Utc>)> = HashSet::with_capacity(records.len());
    records
        .into_iter()
        .filter(|r| seen.insert((r.identity.clone(), r.ip.clone(), r.timestamp_rounded)))
        .collect()
}

/// Stage two: sort by `(identity, ip, timestamp)` and keep the earliest record
/// per `(identity, ip, 5-minute bucket)`.
pub fn dedup_five_minute_window(mut records: Vec<ClickRecord>) -> Vec<ClickRecord> {
    records.sort_by(|a, b| {
        a.identity
            .cmp(&b.identity)
            .then_with(|| a.ip.cmp(&b.ip))
            .then_with(|| a.timestamp.cmp(&b.timestamp))
    });

    let mut kept: Vec<ClickRecord> = Vec::with_capacity(records.len());
    for record in records {
        let same_bucket = kept.last().is_some_and(|prev| {
            prev.identity == record.identity
                && prev.ip == record.ip
                && window_bucket(prev.timestamp) == window_bucket(record.timestamp)
        });
        if !same_bucket {
            kept.push(record);
        }
    }
    kept
}

/// Stable sort by identity; ties keep their current order.
pub fn sort_by_identity(records: &mut [ClickRecord]) {
    records.sort_by(|a, b| a.identity.cmp(&b.identity));
}

/// Run both stages and order the survivors by identity.
pub fn deduplicate(records: Vec<ClickRecord>) -> Vec<ClickRecord> {
    let mut out = dedup_five_minute_window(dedup_exact_minute(records));
    sort_by_identity(&mut out);
    out
}
