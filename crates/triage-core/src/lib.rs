//! Core triage types, log extraction and time window parsing

mod config;
pub mod extract;
mod paths;
pub mod timestamp;
mod types;
pub mod window;

pub use config::{AdvisorSettings, Config, LabelerSettings, Provider, SessionSettings};
pub use extract::{normalize, normalize_payload, Payload};
pub use paths::{atomic_write, Paths};
pub use types::{
    canonical_timestamp, Evidence, FaultLabel, Interval, Level, LogEvent, QaPair, QuestionMode,
    TriageSession, HIGH_SEVERITY,
};
pub use window::{parse_window, parse_window_at};
