//! Persistence contract shared by ingestion, labeling and sessions

use anyhow::Result;
use std::collections::BTreeMap;
use triage_core::{FaultLabel, Interval, LogEvent, QaPair, QuestionMode, TriageSession};

/// Sessions, answers, events and labels
pub trait Store: Send + Sync {
    // Sessions

    fn create_session(&self, id: &str, initiator: &str, mode: QuestionMode) -> Result<()>;

    fn get_session(&self, id: &str) -> Result<Option<TriageSession>>;

    fn advance_step(&self, id: &str, step: u32) -> Result<()>;

    fn close_session(&self, id: &str) -> Result<()>;

    /// Remember that the planner asked to stop before the next answer
    fn set_stop_pending(&self, id: &str, pending: bool) -> Result<()>;

    // Answers

    /// Upsert by (session, step)
    fn put_answer(&self, qa: &QaPair) -> Result<()>;

    /// Ordered by step
    fn get_answers(&self, session_id: &str) -> Result<Vec<QaPair>>;

    /// Store the next question row and move the session to its step as one unit
    fn advance_with_question(&self, next: &QaPair) -> Result<()> {
        self.put_answer(next)?;
        self.advance_step(&next.session_id, next.step)
    }

    // Events

    /// Returns the number of inserted events
    fn insert_events(&self, events: &[LogEvent]) -> Result<usize>;

    /// Events inside the interval, timestamp ascending
    fn fetch_window(&self, interval: &Interval, limit: usize) -> Result<Vec<LogEvent>>;

    /// Most recent events, timestamp descending
    fn fetch_recent(&self, limit: usize) -> Result<Vec<LogEvent>>;

    /// Earliest ERROR/FATAL/EXCEPTION/CRITICAL event with a timestamp inside the interval
    fn find_first_high_severity(&self, interval: &Interval) -> Result<Option<LogEvent>>;

    /// Events sharing a correlation id, timestamp ascending
    fn search_by_correlation(&self, correlation_id: &str, limit: usize) -> Result<Vec<LogEvent>>;

    fn set_label(&self, event_id: i64, label: FaultLabel) -> Result<()>;

    /// Label counts over persisted events; unlabeled events count as `other`
    fn label_histogram(&self) -> Result<BTreeMap<String, usize>>;
}
