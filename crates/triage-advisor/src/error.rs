use thiserror::Error;

/// Any failure of the advisory service; callers degrade, never retry
#[derive(Debug, Error)]
pub enum AdvisoryError {
    #[error("advisor is not configured (set GEMINI_API_KEY or LLM_API_KEY)")]
    NotConfigured,

    #[error("advisor request timed out after {0}s")]
    Timeout(u64),

    #[error("advisor transport error: {0}")]
    Transport(String),

    #[error("advisor returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("advisor returned an empty response")]
    Empty,

    #[error("advisor response could not be decoded: {0}")]
    Decode(String),
}
