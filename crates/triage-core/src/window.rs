//! Natural-language time window parsing

use crate::timestamp;
use crate::types::Interval;
use chrono::{DateTime, Duration, TimeZone, Utc};
use regex::Regex;
use std::sync::OnceLock;

/// Half width of the window built around a single point in time
pub const WINDOW_HALF_WIDTH_MINUTES: i64 = 5;

static HHMM_RE: OnceLock<Regex> = OnceLock::new();
static ISO_RE: OnceLock<Regex> = OnceLock::new();
static BETWEEN_RE: OnceLock<Regex> = OnceLock::new();
static AROUND_RE: OnceLock<Regex> = OnceLock::new();

const ISO_PATTERN: &str =
    r"\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}(?:\.\d+)?(?:Z|[+-]\d{2}:\d{2})?";

fn hhmm_re() -> &'static Regex {
    HHMM_RE.get_or_init(|| Regex::new(r"\b(\d{1,2}):(\d{2})\b").expect("valid HH:MM regex"))
}

fn iso_re() -> &'static Regex {
    ISO_RE.get_or_init(|| Regex::new(&format!(r"\b{}\b", ISO_PATTERN)).expect("valid ISO regex"))
}

fn between_re() -> &'static Regex {
    BETWEEN_RE.get_or_init(|| {
        Regex::new(r"(?i)\bbetween\s+(\S+)\s+(?:and|to|-|–)\s+(\S+)")
            .expect("valid between regex")
    })
}

fn around_re() -> &'static Regex {
    AROUND_RE.get_or_init(|| {
        Regex::new(r"(?i)(?:\b(?:around|about)\s+|~\s*)(\S+)").expect("valid around regex")
    })
}

fn strip_punctuation(token: &str) -> &str {
    token.trim_end_matches([',', '.', ';', '!', '?', ')', ']'])
}

fn today_at(now: DateTime<Utc>, hour: u32, minute: u32) -> Option<DateTime<Utc>> {
    let naive = now.date_naive().and_hms_opt(hour.min(23), minute.min(59), 0)?;
    Some(Utc.from_utc_datetime(&naive))
}

fn parse_hhmm(token: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let caps = hhmm_re().captures(token)?;
    let whole = caps.get(0)?;
    if whole.start() != 0 || whole.end() != token.len() {
        return None;
    }
    let hour: u32 = caps[1].parse().ok()?;
    let minute: u32 = caps[2].parse().ok()?;
    today_at(now, hour, minute)
}

fn parse_iso(token: &str) -> Option<DateTime<Utc>> {
    let m = iso_re().find(token)?;
    if m.start() != 0 || m.end() != token.len() {
        return None;
    }
    timestamp::parse_lenient(token)
}

/// A single token as a full ISO-8601 timestamp, else as HH:MM today
fn parse_token(token: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let token = strip_punctuation(token);
    parse_iso(token).or_else(|| parse_hhmm(token, now))
}

/// Parse a time reference relative to `now` (used to anchor bare HH:MM times)
pub fn parse_window_at(text: &str, now: DateTime<Utc>) -> Interval {
    let text = text.trim();
    let half = Duration::minutes(WINDOW_HALF_WIDTH_MINUTES);

    if let Some(caps) = between_re().captures(text) {
        let a = parse_token(&caps[1], now);
        let b = parse_token(&caps[2], now);
        if let (Some(a), Some(b)) = (a, b) {
            return Interval::new(Some(a), Some(b));
        }
    }

    if let Some(caps) = around_re().captures(text) {
        if let Some(center) = parse_token(&caps[1], now) {
            return Interval::around(center, half);
        }
    }

    if let Some(center) = iso_re()
        .find(text)
        .and_then(|m| timestamp::parse_lenient(m.as_str()))
    {
        return Interval::around(center, half);
    }

    if let Some(center) = hhmm_re()
        .find(text)
        .and_then(|m| parse_hhmm(m.as_str(), now))
    {
        return Interval::around(center, half);
    }

    Interval::unbounded()
}

/// Parse a time reference, anchoring bare times to the current UTC day
pub fn parse_window(text: &str) -> Interval {
    parse_window_at(text, Utc::now())
}
