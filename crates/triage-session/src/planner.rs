//! Dynamic next-question proposals

use triage_advisor::{prompts, Advisor};
use triage_core::{canonical_timestamp, QaPair};
use triage_store::Store;

pub const DEFAULT_QUESTION: &str = "What endpoint or URL were you trying when the error occurred?";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Proposal {
    pub question: String,
    pub stop: bool,
}

impl Proposal {
    pub fn fallback() -> Self {
        Self {
            question: DEFAULT_QUESTION.to_string(),
            stop: false,
        }
    }
}

/// Recover `{question, stop}` from the first `{` to the last `}` of a reply
pub fn parse_proposal(text: &str) -> Option<Proposal> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end <= start {
        return None;
    }
    let value: serde_json::Value = serde_json::from_str(&text[start..=end]).ok()?;
    let question = value.get("question")?.as_str()?.trim();
    if question.is_empty() {
        return None;
    }
    Some(Proposal {
        question: question.to_string(),
        stop: value.get("stop").and_then(|v| v.as_bool()).unwrap_or(false),
    })
}

fn recent_context(store: &dyn Store, limit: usize) -> anyhow::Result<String> {
    let rows: Vec<serde_json::Value> = store
        .fetch_recent(limit)?
        .into_iter()
        .map(|e| {
            serde_json::json!({
                "ts": e.timestamp.as_ref().map(canonical_timestamp),
                "level": e.level,
                "message": e.message,
                "correlation_id": e.correlation_id,
                "endpoint": e.endpoint,
                "label": e.label,
            })
        })
        .collect();
    Ok(serde_json::to_string(&rows)?)
}

fn answers_context(answers: &[QaPair]) -> anyhow::Result<String> {
    let rows: Vec<serde_json::Value> = answers
        .iter()
        .map(|qa| {
            serde_json::json!({
                "step": qa.step,
                "question": qa.question,
                "answer": qa.answer,
            })
        })
        .collect();
    Ok(serde_json::to_string(&rows)?)
}

/// Ask the advisor for the next question; any advisory problem yields the default
pub fn propose(
    store: &dyn Store,
    advisor: &dyn Advisor,
    answers: &[QaPair],
    recent_limit: usize,
) -> anyhow::Result<Proposal> {
    let prompt = prompts::build_planner_prompt(
        &recent_context(store, recent_limit)?,
        &answers_context(answers)?,
    );

    let proposal = match advisor.generate(&prompt) {
        Ok(text) => parse_proposal(&text).unwrap_or_else(|| {
            tracing::warn!("planner reply had no usable question, using default");
            Proposal::fallback()
        }),
        Err(e) => {
            tracing::warn!(error = %e, "planner unavailable, using default question");
            Proposal::fallback()
        }
    };
    Ok(proposal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use triage_advisor::{AdvisoryError, DisabledAdvisor};
    use triage_core::{Level, LogEvent};
    use triage_store::SqliteStore;

    struct Recording {
        reply: &'static str,
        prompts: Mutex<Vec<String>>,
    }

    impl Advisor for Recording {
        fn generate(&self, prompt: &str) -> Result<String, AdvisoryError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            Ok(self.reply.to_string())
        }

        fn model(&self) -> &str {
            "recording"
        }
    }

    #[test]
    fn test_parse_fenced_reply() {
        let reply = "```json\n{\"question\": \"Which account?\", \"stop\": true}\n```";
        assert_eq!(
            parse_proposal(reply),
            Some(Proposal {
                question: "Which account?".to_string(),
                stop: true
            })
        );
    }

    #[test]
    fn test_parse_rejects_missing_question() {
        assert_eq!(parse_proposal("{\"stop\": true}"), None);
        assert_eq!(parse_proposal("no json at all"), None);
        assert_eq!(parse_proposal("} backwards {"), None);
        assert_eq!(
            parse_proposal("{\"question\": \"Why?\", \"stop\": \"yes\"}").map(|p| p.stop),
            Some(false)
        );
    }

    #[test]
    fn test_propose_falls_back_on_failure() {
        let store = SqliteStore::in_memory().unwrap();
        let proposal = propose(&store, &DisabledAdvisor::new("m"), &[], 25).unwrap();
        assert_eq!(proposal, Proposal::fallback());
    }

    #[test]
    fn test_propose_sends_context() {
        let store = SqliteStore::in_memory().unwrap();
        let mut event = LogEvent::new("Socket timeout");
        event.level = Level::Error;
        store.insert_events(&[event]).unwrap();

        let advisor = Recording {
            reply: "{\"question\": \"When did it last work?\", \"stop\": false}",
            prompts: Mutex::new(Vec::new()),
        };
        let answers = vec![QaPair {
            session_id: "s".to_string(),
            step: 0,
            question: "Who is affected?".to_string(),
            answer: Some("bob".to_string()),
            slot: None,
        }];

        let proposal = propose(&store, &advisor, &answers, 25).unwrap();
        assert_eq!(proposal.question, "When did it last work?");

        let prompts = advisor.prompts.lock().unwrap();
        assert!(prompts[0].contains("Socket timeout"));
        assert!(prompts[0].contains("\"answer\":\"bob\""));
    }
}
