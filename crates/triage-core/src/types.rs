//! Core types for log triage

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Log severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Level {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
    Fatal,
    Exception,
    Critical,
}

/// Levels that qualify an event as a point of failure
pub const HIGH_SEVERITY: [Level; 4] = [
    Level::Error,
    Level::Fatal,
    Level::Exception,
    Level::Critical,
];

// Prefix matching order: error levels first, then the rest
const PREFIX_ORDER: [Level; 8] = [
    Level::Error,
    Level::Fatal,
    Level::Exception,
    Level::Critical,
    Level::Warn,
    Level::Info,
    Level::Debug,
    Level::Trace,
];

impl Level {
    pub fn as_str(self) -> &'static str {
        match self {
            Level::Trace => "TRACE",
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
            Level::Fatal => "FATAL",
            Level::Exception => "EXCEPTION",
            Level::Critical => "CRITICAL",
        }
    }

    pub fn is_high_severity(self) -> bool {
        HIGH_SEVERITY.contains(&self)
    }

    /// Match an explicit level value by prefix ("warning" -> WARN, "Error:" -> ERROR)
    pub fn from_prefix(raw: &str) -> Option<Self> {
        let upper = raw.trim().to_uppercase();
        PREFIX_ORDER
            .iter()
            .copied()
            .find(|level| upper.starts_with(level.as_str()))
    }

    /// Scan free text for an error-level keyword
    pub fn scan_message(message: &str) -> Option<Self> {
        let upper = message.to_uppercase();
        HIGH_SEVERITY
            .iter()
            .copied()
            .find(|level| upper.contains(level.as_str()))
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Closed set of fault categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FaultLabel {
    NetworkTimeout,
    AuthFailure,
    DatabaseError,
    NullPointer,
    ServiceUnavailable,
    BadRequest,
    RateLimitExceeded,
    CacheError,
    ConfigurationError,
    Other,
}

impl FaultLabel {
    pub const ALL: [FaultLabel; 10] = [
        FaultLabel::NetworkTimeout,
        FaultLabel::AuthFailure,
        FaultLabel::DatabaseError,
        FaultLabel::NullPointer,
        FaultLabel::ServiceUnavailable,
        FaultLabel::BadRequest,
        FaultLabel::RateLimitExceeded,
        FaultLabel::CacheError,
        FaultLabel::ConfigurationError,
        FaultLabel::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FaultLabel::NetworkTimeout => "network_timeout",
            FaultLabel::AuthFailure => "auth_failure",
            FaultLabel::DatabaseError => "database_error",
            FaultLabel::NullPointer => "null_pointer",
            FaultLabel::ServiceUnavailable => "service_unavailable",
            FaultLabel::BadRequest => "bad_request",
            FaultLabel::RateLimitExceeded => "rate_limit_exceeded",
            FaultLabel::CacheError => "cache_error",
            FaultLabel::ConfigurationError => "configuration_error",
            FaultLabel::Other => "other",
        }
    }

    /// Exact match against the label names
    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|label| label.as_str() == raw)
    }

    /// Normalize free-form text ("Network Timeout\n") into a label, coercing to `Other`
    pub fn coerce(raw: &str) -> Self {
        let normalized = raw.trim().to_lowercase().replace(' ', "_");
        Self::parse(&normalized).unwrap_or(FaultLabel::Other)
    }
}

impl fmt::Display for FaultLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A normalized log event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEvent {
    /// Assigned by the store on insert
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub level: Level,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub correlation_id: Option<String>,
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub account: Option<String>,
    #[serde(default)]
    pub label: Option<FaultLabel>,
}

impl LogEvent {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            id: None,
            source: None,
            timestamp: None,
            level: Level::Info,
            message: message.into(),
            correlation_id: None,
            endpoint: None,
            account: None,
            label: None,
        }
    }
}

/// Render a timestamp in the single form used for storage and comparison
pub fn canonical_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Inclusive time interval; either bound may be open
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Interval {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl Interval {
    /// Build an interval, swapping out-of-order bounds
    pub fn new(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Self {
        match (start, end) {
            (Some(a), Some(b)) if a > b => Self {
                start: Some(b),
                end: Some(a),
            },
            _ => Self { start, end },
        }
    }

    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn around(center: DateTime<Utc>, half_width: chrono::Duration) -> Self {
        Self {
            start: Some(center - half_width),
            end: Some(center + half_width),
        }
    }

    /// Both bounds present
    pub fn is_concrete(&self) -> bool {
        self.start.is_some() && self.end.is_some()
    }

    pub fn contains(&self, ts: &DateTime<Utc>) -> bool {
        self.start.map_or(true, |s| *ts >= s) && self.end.map_or(true, |e| *ts <= e)
    }

    pub fn start_str(&self) -> Option<String> {
        self.start.as_ref().map(canonical_timestamp)
    }

    pub fn end_str(&self) -> Option<String> {
        self.end.as_ref().map(canonical_timestamp)
    }
}

/// The first high-severity event found in an interval
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evidence {
    pub timestamp: DateTime<Utc>,
    pub message: String,
    pub correlation_id: Option<String>,
    pub endpoint: Option<String>,
}

/// How a session produces its questions; fixed at session creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionMode {
    Scripted,
    Dynamic,
}

impl QuestionMode {
    pub fn as_str(self) -> &'static str {
        match self {
            QuestionMode::Scripted => "scripted",
            QuestionMode::Dynamic => "dynamic",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "scripted" => Some(QuestionMode::Scripted),
            "dynamic" => Some(QuestionMode::Dynamic),
            _ => None,
        }
    }
}

/// One guided triage conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriageSession {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub step: u32,
    pub closed: bool,
    pub initiator: String,
    pub mode: QuestionMode,
    /// Planner asked to stop before the first answer arrived
    #[serde(default)]
    pub stop_pending: bool,
}

/// One question/answer row of a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QaPair {
    pub session_id: String,
    pub step: u32,
    pub question: String,
    pub answer: Option<String>,
    /// Script template that produced the question, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slot: Option<u32>,
}
