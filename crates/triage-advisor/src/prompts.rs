//! Prompt builders for every advisory call

use triage_core::FaultLabel;

const MAX_INPUT_CHARS: usize = 10000;

pub const PING_PROMPT: &str = "ping";

/// Instructions for the dynamic question planner
pub const PLANNER_HINT: &str = "You are an incident triage copilot. Ask ONE best next question at a time, \
based on recent errors and answers so far. Prefer concrete, high-signal questions. \
Examples: ask for endpoint, correlation id, last known good time, account type, env/machine checks, \
repro steps, auth token freshness, etc. Do NOT ask yes/no if more specific is better.\n\
Return JSON with keys: {\"question\": str, \"stop\": bool}. If enough info is gathered, set stop=true.";

fn truncate(input: &str) -> &str {
    match input.char_indices().nth(MAX_INPUT_CHARS) {
        Some((idx, _)) => &input[..idx],
        None => input,
    }
}

pub fn build_label_prompt(message: &str, endpoint: &str, correlation_id: &str) -> String {
    let labels: Vec<&str> = FaultLabel::ALL.iter().map(|l| l.as_str()).collect();
    format!(
        "Classify the issue message into ONE label from this list: {}.\n\
         Return only the label.\n\n\
         Message: {}\nEndpoint: {}\nCorrelationID: {}",
        labels.join(", "),
        truncate(message),
        endpoint,
        correlation_id
    )
}

/// Short brief for a single point of failure
pub fn build_brief_prompt(message: &str, endpoint: &str, correlation_id: &str) -> String {
    format!(
        "Summarize the application issue in at most 3 short lines. \
         Use plain English, no PII. Include likely cause keywords (timeout/auth/db/internal-error/network).\n\n\
         POF Message: {}\nEndpoint: {}\nCorrelation ID: {}",
        truncate(message),
        endpoint,
        correlation_id
    )
}

/// Brief over a `ts | level | endpoint | correlation | message` block
pub fn build_window_prompt(block: &str) -> String {
    format!(
        "Summarize the following application log lines in at most 3 short lines. \
         Use plain English, no PII. Name the most likely failure and when it started.\n\n{}",
        truncate(block)
    )
}

/// Planner prompt; both arguments are pre-rendered JSON arrays
pub fn build_planner_prompt(recent_events: &str, answers: &str) -> String {
    format!(
        "{PLANNER_HINT}\n\nRecent labeled logs (most recent first):\n{}\n\n\
         Answers so far (in order):\n{}\n\n\
         Return ONLY a compact JSON object: {{\"question\": str, \"stop\": bool}}.",
        truncate(recent_events),
        truncate(answers)
    )
}

/// Free-form question, with rendered triage context appended when there is any
pub fn build_chat_prompt(message: &str, context: &str) -> String {
    if context.trim().is_empty() {
        truncate(message).to_string()
    } else {
        format!("{}\n\nContext:\n{}", truncate(message), truncate(context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_prompt_lists_closed_set() {
        let prompt = build_label_prompt("disk full", "/v1/upload", "abc");
        assert!(prompt.contains("network_timeout"));
        assert!(prompt.contains("configuration_error, other"));
        assert!(prompt.contains("Message: disk full"));
        assert!(prompt.contains("Endpoint: /v1/upload"));
    }

    #[test]
    fn test_planner_prompt_embeds_context() {
        let prompt = build_planner_prompt("[{\"level\":\"ERROR\"}]", "[]");
        assert!(prompt.starts_with("You are an incident triage copilot"));
        assert!(prompt.contains("[{\"level\":\"ERROR\"}]"));
        assert!(prompt.ends_with("{\"question\": str, \"stop\": bool}."));
    }

    #[test]
    fn test_chat_prompt_context_is_optional() {
        assert_eq!(build_chat_prompt("why?", "  "), "why?");
        assert_eq!(
            build_chat_prompt("why?", "{\"pof\":null}"),
            "why?\n\nContext:\n{\"pof\":null}"
        );
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        let long = "é".repeat(MAX_INPUT_CHARS + 5);
        assert_eq!(truncate(&long).chars().count(), MAX_INPUT_CHARS);
        assert_eq!(truncate("short"), "short");
    }
}
