//! Log record normalization and signal extraction

use crate::timestamp;
use crate::types::{Level, LogEvent};
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::OnceLock;

static CORRELATION_RE: OnceLock<Regex> = OnceLock::new();
static ENDPOINT_RE: OnceLock<Regex> = OnceLock::new();
static ACCOUNT_RE: OnceLock<Regex> = OnceLock::new();

const MESSAGE_KEYS: &[&str] = &["message", "msg", "log"];
const TIMESTAMP_KEYS: &[&str] = &["timestamp", "@timestamp", "time", "ts"];
const SOURCE_KEYS: &[&str] = &["source", "logger", "service"];

fn correlation_re() -> &'static Regex {
    CORRELATION_RE.get_or_init(|| {
        Regex::new(
            r"(?i)\b(?:[0-9a-f]{8}-[0-9a-f]{4}-[1-5][0-9a-f]{3}-[89ab][0-9a-f]{3}-[0-9a-f]{12}|[0-9a-f]{16,40})\b",
        )
        .expect("valid correlation regex")
    })
}

fn endpoint_re() -> &'static Regex {
    ENDPOINT_RE.get_or_init(|| {
        Regex::new(r"https?://[\w.-]+(?::\d+)?(?:/[\w./%?=&-]+)?").expect("valid endpoint regex")
    })
}

fn account_re() -> &'static Regex {
    ACCOUNT_RE.get_or_init(|| {
        Regex::new(r"(?i)\b(?:corp(?:orate)?|personal|test|svc|service)\b")
            .expect("valid account regex")
    })
}

/// A raw ingestion payload
#[derive(Debug, Clone)]
pub enum Payload {
    /// A sequence of individual records
    Records(Vec<Value>),
    /// One record
    Record(Map<String, Value>),
    /// Newline-delimited text; each line is JSON or plain text
    Text(String),
}

impl Payload {
    /// Classify raw input text: a JSON array, a single JSON object, or line-delimited text
    pub fn from_text(text: &str) -> Self {
        let trimmed = text.trim_start();
        if trimmed.starts_with('[') {
            if let Ok(Value::Array(items)) = serde_json::from_str::<Value>(text) {
                return Payload::Records(items);
            }
        }
        if trimmed.starts_with('{') {
            if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(text) {
                return Payload::Record(map);
            }
        }
        Payload::Text(text.to_string())
    }
}

/// First non-empty scalar found under any of `keys`
fn field_str(raw: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match raw.get(*key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    })
}

fn resolve_level(raw: &Map<String, Value>, message: &str) -> Level {
    field_str(raw, &["level"])
        .and_then(|lvl| Level::from_prefix(&lvl))
        .or_else(|| Level::scan_message(message))
        .unwrap_or_default()
}

/// Normalize one key/value record into a `LogEvent`; never fails
pub fn normalize(raw: &Map<String, Value>) -> LogEvent {
    let message = field_str(raw, MESSAGE_KEYS).unwrap_or_default();

    let serialized = serde_json::to_string(raw).unwrap_or_default();
    let haystack = format!("{} {}", serialized, message);

    let timestamp = TIMESTAMP_KEYS
        .iter()
        .filter_map(|key| raw.get(*key).filter(|v| !v.is_null()))
        .find_map(|value| {
            let parsed = timestamp::from_json(value);
            if parsed.is_none() {
                tracing::debug!(raw = %value, "unparsable timestamp, trying next key");
            }
            parsed
        });

    let correlation_id = field_str(raw, &["correlation_id"]).or_else(|| {
        correlation_re()
            .find(&haystack)
            .map(|m| m.as_str().to_string())
    });
    let endpoint = field_str(raw, &["endpoint"])
        .or_else(|| endpoint_re().find(&haystack).map(|m| m.as_str().to_string()));
    let account = field_str(raw, &["account"]).or_else(|| {
        account_re()
            .find(&haystack)
            .map(|m| m.as_str().to_lowercase())
    });

    LogEvent {
        id: None,
        source: field_str(raw, SOURCE_KEYS),
        timestamp,
        level: resolve_level(raw, &message),
        message,
        correlation_id,
        endpoint,
        account,
        label: None,
    }
}

fn message_record(line: &str) -> Map<String, Value> {
    let mut map = Map::new();
    map.insert("message".to_string(), Value::String(line.to_string()));
    map
}

fn normalize_line(line: &str) -> LogEvent {
    match serde_json::from_str::<Value>(line) {
        Ok(Value::Object(map)) => normalize(&map),
        _ => normalize(&message_record(line)),
    }
}

/// Normalize a payload; output order mirrors input order
pub fn normalize_payload(payload: &Payload) -> Vec<LogEvent> {
    match payload {
        Payload::Records(items) => items
            .iter()
            .filter_map(|item| match item {
                Value::Object(map) => Some(normalize(map)),
                Value::String(line) if !line.trim().is_empty() => Some(normalize_line(line.trim())),
                other => {
                    tracing::debug!(record = %other, "skipping record that is not an object");
                    None
                }
            })
            .collect(),
        Payload::Record(map) => vec![normalize(map)],
        Payload::Text(text) => text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(normalize_line)
            .collect(),
    }
}
