use crate::context::TurnContext;
use crate::error::TriageError;
use crate::evidence::{find_pof, find_pof_and_enrich, PofReport};
use crate::{planner, script, summary};
use anyhow::anyhow;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use triage_advisor::{prompts, Advisor};
use triage_classify::{Classifier, LabelMemo};
use triage_core::{
    parse_window_at, Config, Evidence, Interval, QaPair, QuestionMode, SessionSettings,
    TriageSession,
};
use triage_store::Store;

pub const SCRIPTED_CLOSING: &str = "Session complete. Retrieve the summary.";
pub const DYNAMIC_CLOSING: &str = "Thanks. I have enough details. Fetch the summary when ready.";

const NO_QUESTION: &str = "(no question)";

/// Source of "today" for time references in answers
pub type Clock = fn() -> DateTime<Utc>;

/// What the caller sees after starting a session or answering
#[derive(Debug, Clone, Serialize)]
pub struct Turn {
    pub session_id: String,
    pub step: u32,
    pub question: String,
    pub closed: bool,
    pub context: TurnContext,
}

#[derive(Debug, Clone, Serialize)]
pub struct Transcript {
    pub session: TriageSession,
    pub answers: Vec<QaPair>,
}

/// Drives triage conversations over a store and an advisor
pub struct SessionEngine {
    store: Arc<dyn Store>,
    advisor: Arc<dyn Advisor>,
    classifier: Classifier,
    memo: Arc<LabelMemo>,
    settings: SessionSettings,
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
    clock: Clock,
}

impl SessionEngine {
    pub fn new(
        store: Arc<dyn Store>,
        advisor: Arc<dyn Advisor>,
        classifier: Classifier,
        memo: Arc<LabelMemo>,
        settings: SessionSettings,
    ) -> Self {
        Self {
            store,
            advisor,
            classifier,
            memo,
            settings,
            locks: Mutex::new(HashMap::new()),
            clock: Utc::now,
        }
    }

    pub fn from_config(store: Arc<dyn Store>, advisor: Arc<dyn Advisor>, config: &Config) -> Self {
        Self::new(
            store,
            advisor,
            Classifier::from_settings(&config.labeler),
            Arc::new(LabelMemo::new(config.labeler.max_advisory_calls)),
            config.session.clone(),
        )
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    fn session_lock(&self, id: &str) -> Result<Arc<Mutex<()>>, TriageError> {
        let mut locks = self
            .locks
            .lock()
            .map_err(|_| anyhow!("session lock table poisoned"))?;
        Ok(Arc::clone(locks.entry(id.to_string()).or_default()))
    }

    // Closed and unknown sessions never take another answer, so their entry can go
    fn release_lock(&self, id: &str) {
        if let Ok(mut locks) = self.locks.lock() {
            locks.remove(id);
        }
    }

    #[cfg(test)]
    fn tracked_locks(&self) -> usize {
        self.locks.lock().map(|l| l.len()).unwrap_or_default()
    }

    fn pof_report(&self) -> Result<Option<PofReport>, TriageError> {
        Ok(find_pof_and_enrich(
            self.store.as_ref(),
            self.advisor.as_ref(),
            &self.classifier,
            &self.memo,
            &Interval::unbounded(),
        )?)
    }

    fn enriched_context(&self) -> Result<TurnContext, TriageError> {
        Ok(self
            .pof_report()?
            .as_ref()
            .map(TurnContext::from)
            .unwrap_or_default())
    }

    fn load_open(&self, id: &str) -> Result<TriageSession, TriageError> {
        match self.store.get_session(id)? {
            None => Err(TriageError::SessionNotFound(id.to_string())),
            Some(s) if s.closed => Err(TriageError::SessionClosed(id.to_string())),
            Some(s) => Ok(s),
        }
    }

    /// Create a session and ask its first question
    pub fn start(&self, mode: QuestionMode, initiator: &str) -> Result<Turn, TriageError> {
        let id = uuid::Uuid::new_v4().to_string();
        self.store.create_session(&id, initiator, mode)?;

        let (question, slot, context) = match mode {
            QuestionMode::Scripted => (
                script::QUESTIONS[0].to_string(),
                Some(0),
                TurnContext::default(),
            ),
            QuestionMode::Dynamic => {
                let proposal = planner::propose(
                    self.store.as_ref(),
                    self.advisor.as_ref(),
                    &[],
                    self.settings.recent_context_limit,
                )?;
                if proposal.stop {
                    self.store.set_stop_pending(&id, true)?;
                }
                (proposal.question, None, self.enriched_context()?)
            }
        };

        self.store.put_answer(&QaPair {
            session_id: id.clone(),
            step: 0,
            question: question.clone(),
            answer: None,
            slot,
        })?;
        tracing::info!(session = %id, mode = mode.as_str(), initiator, "session started");

        Ok(Turn {
            session_id: id,
            step: 0,
            question,
            closed: false,
            context,
        })
    }

    /// Record an answer for the current step and produce the next question or close
    pub fn submit_answer(&self, id: &str, answer: &str) -> Result<Turn, TriageError> {
        let lock = self.session_lock(id)?;
        let _guard = lock.lock().map_err(|_| anyhow!("session lock poisoned"))?;

        let result = self.answer_locked(id, answer);
        match &result {
            Ok(turn) if turn.closed => self.release_lock(id),
            Err(TriageError::SessionNotFound(_)) | Err(TriageError::SessionClosed(_)) => {
                self.release_lock(id)
            }
            _ => {}
        }
        result
    }

    fn answer_locked(&self, id: &str, answer: &str) -> Result<Turn, TriageError> {
        let session = self.load_open(id)?;
        let answers = self.store.get_answers(id)?;
        let mut current = answers
            .iter()
            .find(|qa| qa.step == session.step)
            .or_else(|| answers.last())
            .cloned()
            .unwrap_or_else(|| QaPair {
                session_id: id.to_string(),
                step: session.step,
                question: NO_QUESTION.to_string(),
                answer: None,
                slot: None,
            });
        current.answer = Some(answer.to_string());
        self.store.put_answer(&current)?;
        let step = current.step;

        if session.mode == QuestionMode::Dynamic && session.stop_pending {
            return self.close(&session, step);
        }

        let interval = parse_window_at(answer, (self.clock)());
        if interval.is_concrete() {
            return self.window_follow_up(id, step, &interval);
        }

        let answers = self.store.get_answers(id)?;
        match session.mode {
            QuestionMode::Scripted => self.next_scripted(&session, step, &answers),
            QuestionMode::Dynamic => self.next_dynamic(&session, step, &answers),
        }
    }

    fn window_follow_up(
        &self,
        id: &str,
        step: u32,
        interval: &Interval,
    ) -> Result<Turn, TriageError> {
        let start = interval.start_str().unwrap_or_else(|| "-".to_string());
        let end = interval.end_str().unwrap_or_else(|| "-".to_string());

        match find_pof(self.store.as_ref(), interval)? {
            Some(evidence) => {
                let context = TurnContext::from(&evidence);
                let question = follow_up_question(&start, &end, &evidence);
                tracing::info!(session = %id, %start, %end, "point of failure found in window");
                self.ask_question(id, step + 1, question, None, context)
            }
            None => {
                let question = format!(
                    "I didn't see critical errors between {start} and {end}. \
                     Do you have a correlation ID or endpoint I should focus on?"
                );
                tracing::info!(session = %id, %start, %end, "no point of failure in window");
                self.ask_question(id, step + 1, question, None, TurnContext::default())
            }
        }
    }

    fn next_scripted(
        &self,
        session: &TriageSession,
        step: u32,
        answers: &[QaPair],
    ) -> Result<Turn, TriageError> {
        let next_slot = answers
            .iter()
            .filter_map(|qa| qa.slot)
            .max()
            .map_or(0, |s| s + 1) as usize;
        if next_slot >= script::len() {
            return self.close(session, step);
        }

        let (pof, context) = if script::needs_evidence(next_slot) {
            let report = self.pof_report()?;
            let context = report.as_ref().map(TurnContext::from).unwrap_or_default();
            (report.map(|r| r.evidence), context)
        } else {
            (None, TurnContext::default())
        };

        let question = script::render(next_slot, pof.as_ref())
            .ok_or_else(|| anyhow!("script slot {next_slot} out of range"))?;
        self.ask_question(&session.id, step + 1, question, Some(next_slot as u32), context)
    }

    fn next_dynamic(
        &self,
        session: &TriageSession,
        step: u32,
        answers: &[QaPair],
    ) -> Result<Turn, TriageError> {
        let proposal = planner::propose(
            self.store.as_ref(),
            self.advisor.as_ref(),
            answers,
            self.settings.recent_context_limit,
        )?;
        if proposal.stop {
            return self.close(session, step);
        }
        let context = self.enriched_context()?;
        self.ask_question(&session.id, step + 1, proposal.question, None, context)
    }

    fn ask_question(
        &self,
        id: &str,
        step: u32,
        question: String,
        slot: Option<u32>,
        context: TurnContext,
    ) -> Result<Turn, TriageError> {
        self.store.advance_with_question(&QaPair {
            session_id: id.to_string(),
            step,
            question: question.clone(),
            answer: None,
            slot,
        })?;
        tracing::debug!(session = %id, step, "question asked");
        Ok(Turn {
            session_id: id.to_string(),
            step,
            question,
            closed: false,
            context,
        })
    }

    fn close(&self, session: &TriageSession, step: u32) -> Result<Turn, TriageError> {
        self.store.close_session(&session.id)?;
        tracing::info!(session = %session.id, step, "session closed");
        let message = match session.mode {
            QuestionMode::Scripted => SCRIPTED_CLOSING,
            QuestionMode::Dynamic => DYNAMIC_CLOSING,
        };
        Ok(Turn {
            session_id: session.id.clone(),
            step,
            question: message.to_string(),
            closed: true,
            context: TurnContext::default(),
        })
    }

    /// Session row plus its ordered question/answer rows
    pub fn transcript(&self, id: &str) -> Result<Transcript, TriageError> {
        let session = self
            .store
            .get_session(id)?
            .ok_or_else(|| TriageError::SessionNotFound(id.to_string()))?;
        let answers = self.store.get_answers(id)?;
        Ok(Transcript { session, answers })
    }

    /// Free-form question to the advisor, grounded on the current point of failure and,
    /// when a session is named, its questions and answers so far
    pub fn ask(&self, message: &str, session_id: Option<&str>) -> Result<String, TriageError> {
        let answers = match session_id {
            Some(id) => self.transcript(id)?.answers,
            None => Vec::new(),
        };
        let pof = find_pof(self.store.as_ref(), &Interval::unbounded())?;
        let context = chat_context(pof.as_ref(), &answers);
        let prompt = prompts::build_chat_prompt(message, &context);

        let reply = self.advisor.generate(&prompt)?;
        tracing::info!(session = session_id.unwrap_or("-"), "advisory chat answered");
        Ok(reply.trim().to_string())
    }

    /// Render the summary document; valid for open and closed sessions
    pub fn summary(&self, id: &str) -> Result<String, TriageError> {
        let Transcript { session, answers } = self.transcript(id)?;
        let report = self.pof_report()?;
        let fields = summary::field_map(session.mode, &answers, report.as_ref());
        Ok(summary::render(&fields, report.as_ref(), &answers))
    }
}

fn chat_context(pof: Option<&Evidence>, answers: &[QaPair]) -> String {
    if pof.is_none() && answers.is_empty() {
        return String::new();
    }
    let qa: Vec<serde_json::Value> = answers
        .iter()
        .filter(|qa| qa.answer.is_some())
        .map(|qa| serde_json::json!({ "question": qa.question, "answer": qa.answer }))
        .collect();
    serde_json::json!({
        "pof": pof.map(TurnContext::from),
        "answers": qa,
    })
    .to_string()
}

fn follow_up_question(start: &str, end: &str, evidence: &Evidence) -> String {
    format!(
        "I found a likely point of failure between {start} and {end}.\n\
         POF: {}\n\
         Message: {}\n\
         CorrelationID: {}\n\
         Endpoint: {}\n\n\
         Does this align with what you observed?",
        triage_core::canonical_timestamp(&evidence.timestamp),
        if evidence.message.is_empty() {
            "-"
        } else {
            evidence.message.as_str()
        },
        evidence.correlation_id.as_deref().unwrap_or("-"),
        evidence.endpoint.as_deref().unwrap_or("-"),
    )
}
