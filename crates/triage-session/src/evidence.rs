//! Point-of-failure lookup and window summaries

use serde::Serialize;
use std::collections::BTreeSet;
use triage_advisor::{prompts, Advisor};
use triage_classify::{Classifier, LabelMemo};
use triage_core::{canonical_timestamp, Evidence, FaultLabel, Interval, LogEvent};
use triage_store::Store;

pub const EMPTY_WINDOW_BRIEF: &str = "No logs found in this time window.";

/// A point of failure plus best-effort advisory extras
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PofReport {
    pub evidence: Evidence,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brief: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<FaultLabel>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WindowSummary {
    pub interval: Interval,
    pub events: Vec<LogEvent>,
    pub brief: String,
}

fn to_evidence(event: LogEvent) -> Option<Evidence> {
    Some(Evidence {
        timestamp: event.timestamp?,
        message: event.message,
        correlation_id: event.correlation_id,
        endpoint: event.endpoint,
    })
}

/// Earliest high-severity event inside the interval
pub fn find_pof(store: &dyn Store, interval: &Interval) -> anyhow::Result<Option<Evidence>> {
    Ok(store.find_first_high_severity(interval)?.and_then(to_evidence))
}

/// [`find_pof`] plus an advisory brief and a classifier label
pub fn find_pof_and_enrich(
    store: &dyn Store,
    advisor: &dyn Advisor,
    classifier: &Classifier,
    memo: &LabelMemo,
    interval: &Interval,
) -> anyhow::Result<Option<PofReport>> {
    let Some(evidence) = find_pof(store, interval)? else {
        return Ok(None);
    };

    let endpoint = evidence.endpoint.as_deref();
    let correlation_id = evidence.correlation_id.as_deref();

    let prompt = prompts::build_brief_prompt(
        &evidence.message,
        endpoint.unwrap_or_default(),
        correlation_id.unwrap_or_default(),
    );
    let brief = match advisor.generate(&prompt) {
        Ok(text) => Some(text),
        Err(e) => {
            tracing::warn!(error = %e, "point-of-failure brief unavailable");
            None
        }
    };

    let label = classifier.label_one(memo, advisor, &evidence.message, endpoint, correlation_id);

    Ok(Some(PofReport {
        evidence,
        brief,
        label: Some(label),
    }))
}

fn window_block(events: &[LogEvent]) -> String {
    events
        .iter()
        .map(|e| {
            format!(
                "{} | {} | {} | {} | {}",
                e.timestamp
                    .as_ref()
                    .map(canonical_timestamp)
                    .unwrap_or_else(|| "-".to_string()),
                e.level,
                e.endpoint.as_deref().unwrap_or("-"),
                e.correlation_id.as_deref().unwrap_or("-"),
                e.message
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn heuristic_brief(events: &[LogEvent]) -> String {
    let levels: BTreeSet<&str> = events.iter().map(|e| e.level.as_str()).collect();
    format!(
        "Window summary (heuristic):\n- {} records\n- levels: {}",
        events.len(),
        levels.into_iter().collect::<Vec<_>>().join(", ")
    )
}

/// Events in the window with an advisory brief, or a heuristic one when the advisor fails
pub fn summarize_window(
    store: &dyn Store,
    advisor: &dyn Advisor,
    interval: &Interval,
    limit: usize,
) -> anyhow::Result<WindowSummary> {
    let events = store.fetch_window(interval, limit)?;
    let brief = if events.is_empty() {
        EMPTY_WINDOW_BRIEF.to_string()
    } else {
        match advisor.generate(&prompts::build_window_prompt(&window_block(&events))) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(error = %e, "window summary unavailable, using heuristic");
                heuristic_brief(&events)
            }
        }
    };

    Ok(WindowSummary {
        interval: *interval,
        events,
        brief,
    })
}
