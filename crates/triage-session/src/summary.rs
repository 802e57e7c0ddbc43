//! Plain-text incident summary

use crate::evidence::PofReport;
use triage_core::{canonical_timestamp, QaPair, QuestionMode};

pub const FIELD_USER: &str = "1. Affected User";
pub const FIELD_POF: &str = "2. Point of Failure (timestamp)";
pub const FIELD_APPLICATION: &str = "3. Front-end Channel Application";
pub const FIELD_ENDPOINT: &str = "4. CHS URL/Endpoint";
pub const FIELD_CORRELATION: &str = "5. CorrelationID";
pub const FIELD_ACCOUNT: &str = "6. Account Used";
pub const FIELD_LAST_WORKING: &str = "7. Last Working Time";
pub const FIELD_TESTED: &str = "8. Tested on Different Machines/Accounts";

pub type FieldMap = Vec<(&'static str, Option<String>)>;

fn answer_for_slot(answers: &[QaPair], slot: u32) -> Option<String> {
    answers
        .iter()
        .find(|qa| qa.slot == Some(slot))
        .and_then(|qa| qa.answer.clone())
}

/// First answered row whose question mentions any keyword, tried keyword by keyword
fn answer_by_topic(answers: &[QaPair], keywords: &[&str]) -> Option<String> {
    keywords.iter().find_map(|kw| {
        answers
            .iter()
            .filter(|qa| qa.question.to_lowercase().contains(kw))
            .find_map(|qa| qa.answer.clone().filter(|a| !a.trim().is_empty()))
    })
}

/// Fixed-order fields; point-of-failure values come from the live report
pub fn field_map(mode: QuestionMode, answers: &[QaPair], pof: Option<&PofReport>) -> FieldMap {
    let pof_ts = pof.map(|r| canonical_timestamp(&r.evidence.timestamp));
    let pof_cid = pof.and_then(|r| r.evidence.correlation_id.clone());
    let pof_endpoint = pof.and_then(|r| r.evidence.endpoint.clone());

    match mode {
        QuestionMode::Scripted => vec![
            (FIELD_USER, answer_for_slot(answers, 0)),
            (FIELD_POF, pof_ts),
            (FIELD_APPLICATION, answer_for_slot(answers, 1)),
            (FIELD_ENDPOINT, answer_for_slot(answers, 4)),
            (FIELD_CORRELATION, pof_cid),
            (FIELD_ACCOUNT, answer_for_slot(answers, 5)),
            (FIELD_LAST_WORKING, answer_for_slot(answers, 6)),
            (FIELD_TESTED, answer_for_slot(answers, 7)),
        ],
        QuestionMode::Dynamic => vec![
            (FIELD_USER, answer_by_topic(answers, &["name", "user"])),
            (FIELD_POF, pof_ts),
            (
                FIELD_APPLICATION,
                answer_by_topic(answers, &["front-end", "application", "app"]),
            ),
            (
                FIELD_ENDPOINT,
                answer_by_topic(answers, &["endpoint"]).or(pof_endpoint),
            ),
            (
                FIELD_CORRELATION,
                answer_by_topic(answers, &["correlation"]).or(pof_cid),
            ),
            (FIELD_ACCOUNT, answer_by_topic(answers, &["account"])),
            (
                FIELD_LAST_WORKING,
                answer_by_topic(answers, &["last time", "last known"]),
            ),
            (
                FIELD_TESTED,
                answer_by_topic(
                    answers,
                    &["different machines", "different accounts", "tested"],
                ),
            ),
        ],
    }
}

pub fn render(fields: &FieldMap, pof: Option<&PofReport>, answers: &[QaPair]) -> String {
    let mut lines = vec!["Triage Summary".to_string(), "--------------".to_string()];
    for (name, value) in fields {
        lines.push(format!("{name}: {}", value.as_deref().unwrap_or("-")));
    }

    let label = pof.and_then(|r| r.label);
    let brief = pof.and_then(|r| r.brief.as_deref());
    if label.is_some() || brief.is_some() {
        lines.push(String::new());
        if let Some(label) = label {
            lines.push(format!("Label: {label}"));
        }
        if let Some(brief) = brief {
            lines.push("Brief:".to_string());
            lines.push(brief.to_string());
        }
    }

    lines.push(String::new());
    lines.push("Conversation Details:".to_string());
    for qa in answers {
        lines.push(format!("Q{}: {}", qa.step, qa.question));
        lines.push(format!("A{}: {}", qa.step, qa.answer.as_deref().unwrap_or("-")));
    }
    lines.join("\n")
}
