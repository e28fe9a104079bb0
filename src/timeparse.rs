//! Parsing of the `time` column into UTC instants.
//!
//! Exports differ in how they print timestamps, so a short list of formats is
//! tried in order. Values carrying an offset are converted to UTC; values
//! without one are taken to already be UTC.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Formats with an explicit offset, tried after RFC 3339 and RFC 2822.
const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f %z",
];

/// Formats without an offset.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S%.f",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %H:%M:%S%.f",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %I:%M %p",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

/// Parse a timestamp string. Returns `None` if no known format matches.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    let value = strip_utc_suffix(value);

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(value) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(value, fmt) {
            return Some(dt.with_timezone(&Utc));
        }
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, fmt) {
            return Some(naive.and_utc());
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(value, fmt) {
            return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
        }
    }
    None
}

/// `2024-05-01 12:00:00 UTC` and `...Z` style suffixes name UTC explicitly;
/// drop the word form so the naive formats apply.
fn strip_utc_suffix(value: &str) -> &str {
    value
        .strip_suffix(" UTC")
        .or_else(|| value.strip_suffix(" GMT"))
        .map(str::trim_end)
        .unwrap_or(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    #[test]
    fn rfc3339_variants() {
        assert_eq!(
            parse_timestamp("2024-05-01T12:03:10Z"),
            Some(utc(2024, 5, 1, 12, 3, 10))
        );
        assert_eq!(
            parse_timestamp("2024-05-01T14:03:10+02:00"),
            Some(utc(2024, 5, 1, 12, 3, 10))
        );
        let frac = parse_timestamp("2024-05-01T12:03:10.250Z").unwrap();
        assert_eq!(frac.timestamp_subsec_millis(), 250);
    }

    #[test]
    fn space_separated_with_offset() {
        assert_eq!(
            parse_timestamp("2024-05-01 12:03:10+00:00"),
            Some(utc(2024, 5, 1, 12, 3, 10))
        );
        assert_eq!(
            parse_timestamp("2024-05-01 07:03:10.000000-0500"),
            Some(utc(2024, 5, 1, 12, 3, 10))
        );
    }

    #[test]
    fn naive_values_are_utc() {
        assert_eq!(
            parse_timestamp("2024-05-01 12:03:10"),
            Some(utc(2024, 5, 1, 12, 3, 10))
        );
        assert_eq!(
            parse_timestamp("2024-05-01 12:03:10 UTC"),
            Some(utc(2024, 5, 1, 12, 3, 10))
        );
        assert_eq!(
            parse_timestamp("05/01/2024 12:03"),
            Some(utc(2024, 5, 1, 12, 3, 0))
        );
        assert_eq!(
            parse_timestamp("05/01/2024 01:03:10 PM"),
            Some(utc(2024, 5, 1, 13, 3, 10))
        );
        assert_eq!(parse_timestamp("2024-05-01"), Some(utc(2024, 5, 1, 0, 0, 0)));
    }

    #[test]
    fn rfc2822() {
        assert_eq!(
            parse_timestamp("Wed, 01 May 2024 12:03:10 +0000"),
            Some(utc(2024, 5, 1, 12, 3, 10))
        );
    }

    #[test]
    fn garbage_is_rejected() {
        assert_eq!(parse_timestamp(""), None);
        assert_eq!(parse_timestamp("yesterday"), None);
        assert_eq!(parse_timestamp("2024-13-01 00:00:00"), None);
    }
}
