mod common;

use common::{engine, ingest, login_timeout_batch, proposal, store, FakeAdvisor};
use std::sync::Arc;
use triage_core::QuestionMode;
use triage_session::{script, TriageError, DYNAMIC_CLOSING, SCRIPTED_CLOSING};

#[test]
fn test_scripted_session_closes_after_last_question() {
    let engine = engine(store(), Arc::new(FakeAdvisor::failing()));
    let id = engine.start(QuestionMode::Scripted, "cli").unwrap().session_id;

    for k in 0..script::len() - 1 {
        let turn = engine.submit_answer(&id, &format!("answer {k}")).unwrap();
        assert!(!turn.closed);
        assert_eq!(turn.step as usize, k + 1);
    }

    let last = engine.submit_answer(&id, "looks right").unwrap();
    assert!(last.closed);
    assert_eq!(last.question, SCRIPTED_CLOSING);

    let transcript = engine.transcript(&id).unwrap();
    assert!(transcript.session.closed);
    assert_eq!(transcript.answers.len(), script::len());
    assert!(transcript.answers.iter().all(|qa| qa.answer.is_some()));

    let err = engine.submit_answer(&id, "one more").unwrap_err();
    assert!(matches!(err, TriageError::SessionClosed(_)));
}

#[test]
fn test_get_answers_is_idempotent() {
    let engine = engine(store(), Arc::new(FakeAdvisor::failing()));
    let id = engine.start(QuestionMode::Scripted, "cli").unwrap().session_id;
    engine.submit_answer(&id, "alice").unwrap();

    let first = engine.transcript(&id).unwrap().answers;
    let second = engine.transcript(&id).unwrap().answers;
    assert_eq!(first, second);
}

#[test]
fn test_steps_stay_contiguous() {
    let engine = engine(store(), Arc::new(FakeAdvisor::failing()));
    let id = engine.start(QuestionMode::Scripted, "cli").unwrap().session_id;
    for answer in ["alice", "between 09:10 and 09:25", "no idea", "portal"] {
        engine.submit_answer(&id, answer).unwrap();
    }

    let steps: Vec<u32> = engine
        .transcript(&id)
        .unwrap()
        .answers
        .iter()
        .map(|qa| qa.step)
        .collect();
    assert_eq!(steps, vec![0, 1, 2, 3, 4]);
}

#[test]
fn test_concurrent_answers_are_serialized() {
    let engine = engine(store(), Arc::new(FakeAdvisor::failing()));
    let id = engine.start(QuestionMode::Scripted, "cli").unwrap().session_id;

    std::thread::scope(|s| {
        for n in 0..4 {
            let engine = &engine;
            let id = id.as_str();
            s.spawn(move || engine.submit_answer(id, &format!("reply {n}")).unwrap());
        }
    });

    let answers = engine.transcript(&id).unwrap().answers;
    let steps: Vec<u32> = answers.iter().map(|qa| qa.step).collect();
    assert_eq!(steps, vec![0, 1, 2, 3, 4]);
    assert!(answers[..4].iter().all(|qa| qa.answer.is_some()));
    assert!(answers[4].answer.is_none());
    assert_eq!(engine.transcript(&id).unwrap().session.step, 4);
}

#[test]
fn test_window_detour_keeps_script_position() {
    let store = store();
    ingest(store.as_ref(), &login_timeout_batch());
    let engine = engine(Arc::clone(&store), Arc::new(FakeAdvisor::failing()));
    let id = engine.start(QuestionMode::Scripted, "cli").unwrap().session_id;

    let detour = engine.submit_answer(&id, "it broke around 09:30").unwrap();
    assert!(detour.question.starts_with("I found a likely point of failure"));

    let back = engine.submit_answer(&id, "yes that's it").unwrap();
    assert_eq!(back.step, 2);
    assert_eq!(back.question, script::QUESTIONS[1]);

    let summary = engine.summary(&id).unwrap();
    assert!(summary.contains("1. Affected User: it broke around 09:30"));
    assert!(summary.contains("2. Point of Failure (timestamp): 2025-10-29T09:32:00.000Z"));
    assert!(summary.contains("5. CorrelationID: 9f1c2a7e-3b4d-4c5e-8f60-718293a4b5c6"));
    assert!(summary.contains("Label: network_timeout"));
}

#[test]
fn test_dynamic_stop_closes_on_answer() {
    let advisor = Arc::new(FakeAdvisor::with_replies(&[
        &proposal("Which account are you using?", false),
        &proposal("unused", true),
    ]));
    let engine = engine(store(), advisor.clone());
    let start = engine.start(QuestionMode::Dynamic, "react-ui").unwrap();
    assert_eq!(start.question, "Which account are you using?");

    let turn = engine.submit_answer(&start.session_id, "corporate").unwrap();
    assert!(turn.closed);
    assert_eq!(turn.question, DYNAMIC_CLOSING);

    let transcript = engine.transcript(&start.session_id).unwrap();
    assert!(transcript.session.closed);
    assert_eq!(transcript.answers.len(), 1);
    assert_eq!(advisor.calls(), 2);
}

#[test]
fn test_dynamic_stop_at_start_closes_on_first_answer() {
    let advisor = Arc::new(FakeAdvisor::with_replies(&[&proposal(
        "Anything else to add?",
        true,
    )]));
    let engine = engine(store(), advisor.clone());
    let start = engine.start(QuestionMode::Dynamic, "cli").unwrap();
    assert!(engine.transcript(&start.session_id).unwrap().session.stop_pending);

    let turn = engine.submit_answer(&start.session_id, "no").unwrap();
    assert!(turn.closed);
    assert_eq!(advisor.calls(), 1);
}

#[test]
fn test_dynamic_planner_failure_uses_default_question() {
    let advisor = Arc::new(FakeAdvisor::with_replies(&["I think you should ask about logs"]));
    let engine = engine(store(), advisor);
    let start = engine.start(QuestionMode::Dynamic, "cli").unwrap();
    assert_eq!(
        start.question,
        "What endpoint or URL were you trying when the error occurred?"
    );

    let turn = engine.submit_answer(&start.session_id, "/v1/login").unwrap();
    assert!(!turn.closed);
    assert_eq!(turn.step, 1);
}

#[test]
fn test_dynamic_summary_recovers_fields_by_topic() {
    let store = store();
    ingest(store.as_ref(), &login_timeout_batch());
    // Each planner question is followed by a brief request for its context
    let advisor = Arc::new(FakeAdvisor::with_replies(&[
        &proposal("What is the name of the affected user?", false),
        "Login requests time out.",
        &proposal("Which account type are you using?", false),
        "Login requests time out.",
        &proposal("done", true),
    ]));
    let engine = engine(Arc::clone(&store), advisor);

    let id = engine.start(QuestionMode::Dynamic, "cli").unwrap().session_id;
    assert!(!engine.submit_answer(&id, "bob").unwrap().closed);
    let closing = engine.submit_answer(&id, "corporate").unwrap();
    assert!(closing.closed);
    assert_eq!(closing.question, DYNAMIC_CLOSING);

    let summary = engine.summary(&id).unwrap();
    assert!(summary.starts_with("Triage Summary\n"));
    assert!(summary.contains("1. Affected User: bob"));
    assert!(summary.contains("4. CHS URL/Endpoint: /v1/login"));
    assert!(summary.contains("6. Account Used: corporate"));
    assert!(summary.contains("7. Last Working Time: -"));
    assert!(summary.contains("Q1: Which account type are you using?\nA1: corporate"));
}

#[test]
fn test_ask_carries_pof_and_session_answers() {
    let store = store();
    ingest(store.as_ref(), &login_timeout_batch());
    let advisor = Arc::new(FakeAdvisor::with_replies(&[
        "  Likely a network timeout on /v1/login.\n",
    ]));
    let engine = engine(Arc::clone(&store), advisor.clone());
    let id = engine.start(QuestionMode::Scripted, "cli").unwrap().session_id;
    engine.submit_answer(&id, "alice").unwrap();

    let reply = engine.ask("What should I check first?", Some(&id)).unwrap();
    assert_eq!(reply, "Likely a network timeout on /v1/login.");

    let prompt = advisor.last_prompt().unwrap();
    assert!(prompt.starts_with("What should I check first?\n\nContext:\n"));
    assert!(prompt.contains("Socket timeout connecting to /v1/login"));
    assert!(prompt.contains("9f1c2a7e-3b4d-4c5e-8f60-718293a4b5c6"));
    assert!(prompt.contains("\"answer\":\"alice\""));

    let err = engine.ask("again?", Some(&id)).unwrap_err();
    assert!(matches!(err, TriageError::Advisory(_)));
}

#[test]
fn test_unknown_session_is_not_found() {
    let engine = engine(store(), Arc::new(FakeAdvisor::failing()));
    assert!(matches!(
        engine.summary("missing"),
        Err(TriageError::SessionNotFound(_))
    ));
    assert!(engine.submit_answer("missing", "hi").unwrap_err().is_not_found());
}
