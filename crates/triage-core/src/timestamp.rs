//! Lenient timestamp parsing

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde_json::Value;

// Formats carrying their own offset
const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%d/%b/%Y:%H:%M:%S %z",
];

// Formats without an offset; interpreted as UTC
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S%.f",
    "%Y/%m/%d %H:%M:%S",
];

// Epoch values above this are taken as milliseconds
const EPOCH_MILLIS_THRESHOLD: i64 = 100_000_000_000;

/// Parse a timestamp string, returning `None` instead of failing
pub fn parse_lenient(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(raw, fmt) {
            return Some(dt.with_timezone(&Utc));
        }
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(date) = chrono::NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|n| Utc.from_utc_datetime(&n));
    }
    raw.parse::<i64>().ok().and_then(from_epoch)
}

/// Parse a timestamp held in a JSON value (string or epoch number)
pub fn from_json(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => parse_lenient(s),
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .and_then(from_epoch),
        _ => None,
    }
}

fn from_epoch(value: i64) -> Option<DateTime<Utc>> {
    if value.unsigned_abs() >= EPOCH_MILLIS_THRESHOLD.unsigned_abs() {
        Utc.timestamp_millis_opt(value).single()
    } else {
        Utc.timestamp_opt(value, 0).single()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    fn expected() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 10, 29, 9, 32, 0).unwrap()
    }

    #[test]
    fn test_parse_rfc3339_variants() {
        assert_eq!(parse_lenient("2025-10-29T09:32:00Z"), Some(expected()));
        assert_eq!(parse_lenient("2025-10-29T11:32:00+02:00"), Some(expected()));
        assert_eq!(parse_lenient("2025-10-29T09:32:00"), Some(expected()));
    }

    #[test]
    fn test_parse_space_separated() {
        assert_eq!(parse_lenient("2025-10-29 09:32:00"), Some(expected()));
        assert_eq!(
            parse_lenient("2025-10-29 09:32:00.250").map(|d| d.nanosecond()),
            Some(250_000_000)
        );
        assert_eq!(parse_lenient("2025/10/29 09:32:00"), Some(expected()));
    }

    #[test]
    fn test_parse_apache_and_rfc2822() {
        assert_eq!(
            parse_lenient("29/Oct/2025:09:32:00 +0000"),
            Some(expected())
        );
        assert_eq!(
            parse_lenient("Wed, 29 Oct 2025 09:32:00 +0000"),
            Some(expected())
        );
    }

    #[test]
    fn test_parse_epoch() {
        assert_eq!(parse_lenient("1761730320"), Some(expected()));
        assert_eq!(
            from_json(&serde_json::json!(1761730320000_i64)),
            Some(expected())
        );
    }

    #[test]
    fn test_epoch_extremes_are_none() {
        assert_eq!(from_json(&serde_json::json!(i64::MIN)), None);
        assert_eq!(from_json(&serde_json::json!(i64::MAX)), None);
        assert_eq!(parse_lenient("-9223372036854775808"), None);
        assert_eq!(from_json(&serde_json::json!(-1.0e300)), None);
    }

    #[test]
    fn test_unparsable_is_none() {
        assert_eq!(parse_lenient("yesterday-ish"), None);
        assert_eq!(parse_lenient(""), None);
        assert_eq!(from_json(&serde_json::json!(true)), None);
    }
}
