mod common;

use common::{engine, incident_day, ingest, login_timeout_batch, store, FakeAdvisor};
use std::sync::Arc;
use triage_core::{parse_window_at, FaultLabel, QuestionMode};
use triage_session::{find_pof, summarize_window};

#[test]
fn test_time_reference_answer_finds_point_of_failure() {
    let store = store();
    assert_eq!(ingest(store.as_ref(), &login_timeout_batch()), 2);

    let engine = engine(Arc::clone(&store), Arc::new(FakeAdvisor::failing()));
    let turn = engine.start(QuestionMode::Scripted, "cli").unwrap();

    let turn = engine.submit_answer(&turn.session_id, "around 09:30").unwrap();
    assert!(!turn.closed);
    assert_eq!(turn.step, 1);
    assert_eq!(
        turn.context.pof_timestamp.as_deref(),
        Some("2025-10-29T09:32:00.000Z")
    );
    assert_eq!(turn.context.endpoint.as_deref(), Some("/v1/login"));
    assert_eq!(
        turn.context.pof_message.as_deref(),
        Some("Socket timeout connecting to /v1/login")
    );
    assert!(turn
        .question
        .starts_with("I found a likely point of failure between 2025-10-29T09:25:00.000Z and 2025-10-29T09:35:00.000Z."));

    let answers = engine.transcript(&turn.session_id).unwrap().answers;
    assert_eq!(answers.len(), 2);
    assert_eq!(answers[0].answer.as_deref(), Some("around 09:30"));
    assert_eq!(answers[1].slot, None);
}

#[test]
fn test_window_without_errors_asks_clarifier() {
    let store = store();
    ingest(store.as_ref(), &login_timeout_batch());

    let engine = engine(Arc::clone(&store), Arc::new(FakeAdvisor::failing()));
    let turn = engine.start(QuestionMode::Scripted, "cli").unwrap();
    let turn = engine
        .submit_answer(&turn.session_id, "between 08:00 and 08:30")
        .unwrap();

    assert!(turn.question.starts_with("I didn't see critical errors between"));
    assert!(turn.context.is_empty());
    assert_eq!(turn.step, 1);
}

#[test]
fn test_scripted_evidence_questions_carry_context() {
    let store = store();
    ingest(store.as_ref(), &login_timeout_batch());

    let advisor = Arc::new(FakeAdvisor::with_replies(&["Login requests time out."]));
    let engine = engine(Arc::clone(&store), advisor);
    let id = engine.start(QuestionMode::Scripted, "cli").unwrap().session_id;
    engine.submit_answer(&id, "alice").unwrap();
    let turn = engine.submit_answer(&id, "customer portal").unwrap();

    assert_eq!(turn.step, 2);
    assert!(turn.question.contains("occurred at 2025-10-29T09:32:00.000Z."));
    assert_eq!(turn.context.brief.as_deref(), Some("Login requests time out."));
    assert_eq!(turn.context.label, Some(FaultLabel::NetworkTimeout));

    let turn = engine.submit_answer(&id, "yes").unwrap();
    assert!(turn
        .question
        .contains("9f1c2a7e-3b4d-4c5e-8f60-718293a4b5c6"));
}

#[test]
fn test_window_summary_and_pof_over_ingested_batch() {
    let store = store();
    ingest(store.as_ref(), &login_timeout_batch());

    let interval = parse_window_at("between 09:10 and 09:40", incident_day());
    let summary =
        summarize_window(store.as_ref(), &FakeAdvisor::failing(), &interval, 200).unwrap();
    assert_eq!(summary.events.len(), 2);
    assert!(summary.brief.contains("2 records"));

    let pof = find_pof(store.as_ref(), &interval).unwrap().unwrap();
    assert_eq!(pof.message, "Socket timeout connecting to /v1/login");
}
