#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use triage_advisor::{Advisor, AdvisoryError};
use triage_core::{normalize_payload, Config, Payload};
use triage_session::SessionEngine;
use triage_store::{SqliteStore, Store};

/// Advisor that replays queued replies, then fails
pub struct FakeAdvisor {
    replies: Mutex<VecDeque<String>>,
    prompts: Mutex<Vec<String>>,
    calls: AtomicUsize,
}

impl FakeAdvisor {
    pub fn failing() -> Self {
        Self::with_replies(&[])
    }

    pub fn with_replies(replies: &[&str]) -> Self {
        Self {
            replies: Mutex::new(replies.iter().map(|r| r.to_string()).collect()),
            prompts: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().unwrap().last().cloned()
    }
}

impl Advisor for FakeAdvisor {
    fn generate(&self, prompt: &str) -> Result<String, AdvisoryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .ok_or(AdvisoryError::Timeout(30))
    }

    fn model(&self) -> &str {
        "fake"
    }
}

/// Planner reply in the shape the advisor is asked for
pub fn proposal(question: &str, stop: bool) -> String {
    serde_json::json!({ "question": question, "stop": stop }).to_string()
}

/// Fixed "today" matching the sample log day
pub fn incident_day() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 10, 29, 14, 0, 0).unwrap()
}

pub fn store() -> Arc<SqliteStore> {
    Arc::new(SqliteStore::in_memory().unwrap())
}

pub fn ingest(store: &dyn Store, text: &str) -> usize {
    let events = normalize_payload(&Payload::from_text(text));
    store.insert_events(&events).unwrap()
}

pub fn login_timeout_batch() -> String {
    [
        serde_json::json!({
            "timestamp": "2025-10-29T09:28:00Z",
            "level": "INFO",
            "message": "login page served",
            "endpoint": "/v1/login",
        }),
        serde_json::json!({
            "timestamp": "2025-10-29T09:32:00Z",
            "level": "ERROR",
            "message": "Socket timeout connecting to /v1/login",
            "endpoint": "/v1/login",
            "correlation_id": "9f1c2a7e-3b4d-4c5e-8f60-718293a4b5c6",
        }),
    ]
    .iter()
    .map(|v| v.to_string())
    .collect::<Vec<_>>()
    .join("\n")
}

pub fn engine(store: Arc<SqliteStore>, advisor: Arc<dyn Advisor>) -> SessionEngine {
    let mut config = Config::new();
    config.labeler.throttle_ms = 0;
    SessionEngine::from_config(store, advisor, &config).with_clock(incident_day)
}
