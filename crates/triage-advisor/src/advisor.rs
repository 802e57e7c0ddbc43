use crate::error::AdvisoryError;
use crate::prompts::PING_PROMPT;

/// Opaque text generation capability
pub trait Advisor: Send + Sync {
    fn generate(&self, prompt: &str) -> Result<String, AdvisoryError>;

    /// Model identifier reported by health checks
    fn model(&self) -> &str;
}

/// Stand-in used when no API key is configured; every call fails
pub struct DisabledAdvisor {
    model: String,
}

impl DisabledAdvisor {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
        }
    }
}

impl Advisor for DisabledAdvisor {
    fn generate(&self, _prompt: &str) -> Result<String, AdvisoryError> {
        Err(AdvisoryError::NotConfigured)
    }

    fn model(&self) -> &str {
        &self.model
    }
}

/// Health check: `{ok, model, response}` on success, `{ok, model, error}` otherwise
pub fn ping(advisor: &dyn Advisor) -> serde_json::Value {
    match advisor.generate(PING_PROMPT) {
        Ok(text) => serde_json::json!({
            "ok": true,
            "model": advisor.model(),
            "response": text.chars().take(200).collect::<String>(),
        }),
        Err(e) => serde_json::json!({
            "ok": false,
            "model": advisor.model(),
            "error": e.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Echo;

    impl Advisor for Echo {
        fn generate(&self, prompt: &str) -> Result<String, AdvisoryError> {
            Ok(format!("pong: {prompt}"))
        }

        fn model(&self) -> &str {
            "echo-1"
        }
    }

    #[test]
    fn test_disabled_advisor_fails() {
        let advisor = DisabledAdvisor::new("gemini-2.5-flash");
        assert!(matches!(
            advisor.generate("hi"),
            Err(AdvisoryError::NotConfigured)
        ));
    }

    #[test]
    fn test_ping_reports_success() {
        let out = ping(&Echo);
        assert_eq!(out["ok"], true);
        assert_eq!(out["model"], "echo-1");
        assert_eq!(out["response"], "pong: ping");
    }

    #[test]
    fn test_ping_reports_error() {
        let out = ping(&DisabledAdvisor::new("m"));
        assert_eq!(out["ok"], false);
        assert!(out["error"].as_str().unwrap().contains("not configured"));
        assert!(out.get("response").is_none());
    }
}
