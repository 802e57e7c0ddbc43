//! The fixed question script

use triage_core::{canonical_timestamp, Evidence};

pub const QUESTIONS: [&str; 10] = [
    "Hello! I'm here to help you with your issue today. Could you please start by providing your name or the name of the affected user?",
    "What is the front-end channel application that's displaying the error?",
    "Let me check our logs for relevant details... (Scanning). I found some details in the logs. One major point of failure (POF) occurred at {POF_TS}. Does this sound familiar as the issue you're facing?",
    "I've also pulled a CorrelationID from the logs: {CORR_ID}. Can you confirm if this is the same one you're seeing?",
    "Please provide the CHS URL or endpoint that you are trying to access.",
    "Which account are you using to access this service? Is it a personal or a corporate account?",
    "When was the last time this system/application worked for you? Please provide the date or duration since then.",
    "Have you tested this issue on different machines or with different accounts/users? If so, what were the results?",
    "The development team has mentioned that a full log analysis is required. Are you able to access these logs, or would you like me to assist with that?",
    "To summarize the information we've gathered, I'll prepare a SNOW-ready summary. Please confirm if everything looks correct.",
];

/// Slots whose text embeds the current point of failure
pub const EVIDENCE_SLOTS: [usize; 2] = [2, 3];

pub fn len() -> usize {
    QUESTIONS.len()
}

pub fn needs_evidence(slot: usize) -> bool {
    EVIDENCE_SLOTS.contains(&slot)
}

/// Question text for a slot, or `None` past the end of the script
pub fn render(slot: usize, pof: Option<&Evidence>) -> Option<String> {
    let template = QUESTIONS.get(slot)?;
    if !needs_evidence(slot) {
        return Some(template.to_string());
    }
    let ts = pof
        .map(|e| canonical_timestamp(&e.timestamp))
        .unwrap_or_else(|| "-".to_string());
    let cid = pof
        .and_then(|e| e.correlation_id.as_deref())
        .unwrap_or("-");
    Some(template.replace("{POF_TS}", &ts).replace("{CORR_ID}", cid))
}
