//! Advisory text generation: trait, HTTP client and prompts

mod advisor;
mod error;
mod http;
pub mod prompts;

pub use advisor::{ping, Advisor, DisabledAdvisor};
pub use error::AdvisoryError;
pub use http::HttpAdvisor;

use std::sync::Arc;
use triage_core::AdvisorSettings;

/// HTTP advisor when a key is configured, otherwise a disabled one
pub fn connect(settings: &AdvisorSettings) -> Arc<dyn Advisor> {
    match HttpAdvisor::new(settings) {
        Ok(advisor) => Arc::new(advisor),
        Err(AdvisoryError::NotConfigured) => {
            tracing::debug!("no advisor key configured");
            Arc::new(DisabledAdvisor::new(settings.model.clone()))
        }
        Err(e) => {
            tracing::warn!(error = %e, "advisor unavailable");
            Arc::new(DisabledAdvisor::new(settings.model.clone()))
        }
    }
}
