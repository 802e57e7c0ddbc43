use thiserror::Error;
use triage_advisor::AdvisoryError;

#[derive(Debug, Error)]
pub enum TriageError {
    #[error("session not found: {0}")]
    SessionNotFound(String),

    #[error("session is closed: {0}")]
    SessionClosed(String),

    #[error("advisor unavailable: {0}")]
    Advisory(#[from] AdvisoryError),

    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

impl TriageError {
    /// Unknown or closed session, as opposed to an infrastructure failure
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            TriageError::SessionNotFound(_) | TriageError::SessionClosed(_)
        )
    }
}
