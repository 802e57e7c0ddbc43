use crate::advisor::Advisor;
use crate::error::AdvisoryError;
use std::time::Duration;
use triage_core::{AdvisorSettings, Provider};

const GEMINI_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const ANTHROPIC_URL: &str = "https://api.anthropic.com/v1/messages";

/// Advisor backed by a hosted model API
pub struct HttpAdvisor {
    client: reqwest::Client,
    runtime: tokio::runtime::Runtime,
    provider: Provider,
    model: String,
    api_key: String,
    timeout_secs: u64,
}

impl HttpAdvisor {
    pub fn new(settings: &AdvisorSettings) -> Result<Self, AdvisoryError> {
        let api_key = settings
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or(AdvisoryError::NotConfigured)?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| AdvisoryError::Transport(e.to_string()))?;

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| AdvisoryError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            runtime,
            provider: settings.provider,
            model: settings.model.clone(),
            api_key,
            timeout_secs: settings.timeout_secs,
        })
    }

    fn map_transport(&self, e: reqwest::Error) -> AdvisoryError {
        if e.is_timeout() {
            AdvisoryError::Timeout(self.timeout_secs)
        } else {
            AdvisoryError::Transport(e.to_string())
        }
    }

    async fn send(&self, prompt: &str) -> Result<serde_json::Value, AdvisoryError> {
        let request = match self.provider {
            Provider::Gemini => self
                .client
                .post(format!("{GEMINI_BASE}/{}:generateContent", self.model))
                .header("x-goog-api-key", &self.api_key)
                .json(&gemini_body(prompt)),
            Provider::Anthropic => self
                .client
                .post(ANTHROPIC_URL)
                .header("x-api-key", &self.api_key)
                .header("anthropic-version", "2023-06-01")
                .json(&anthropic_body(&self.model, prompt)),
        };

        let response = request.send().await.map_err(|e| self.map_transport(e))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AdvisoryError::Status {
                status: status.as_u16(),
                body: body.chars().take(120).collect(),
            });
        }

        response.json().await.map_err(|e| {
            if e.is_timeout() {
                AdvisoryError::Timeout(self.timeout_secs)
            } else {
                AdvisoryError::Decode(e.to_string())
            }
        })
    }
}

impl Advisor for HttpAdvisor {
    fn generate(&self, prompt: &str) -> Result<String, AdvisoryError> {
        let body = self.runtime.block_on(self.send(prompt))?;
        let text = match self.provider {
            Provider::Gemini => gemini_text(&body)?,
            Provider::Anthropic => anthropic_text(&body)?,
        };
        tracing::debug!(model = %self.model, chars = text.len(), "advisor responded");
        Ok(text)
    }

    fn model(&self) -> &str {
        &self.model
    }
}

pub(crate) fn gemini_body(prompt: &str) -> serde_json::Value {
    serde_json::json!({
        "contents": [{"parts": [{"text": prompt}]}]
    })
}

pub(crate) fn anthropic_body(model: &str, prompt: &str) -> serde_json::Value {
    serde_json::json!({
        "model": model,
        "max_tokens": 1024,
        "messages": [{"role": "user", "content": prompt}]
    })
}

fn non_empty(text: Option<&str>) -> Result<String, AdvisoryError> {
    match text.map(str::trim) {
        Some(t) if !t.is_empty() => Ok(t.to_string()),
        Some(_) => Err(AdvisoryError::Empty),
        None => Err(AdvisoryError::Decode("missing text field".to_string())),
    }
}

pub(crate) fn gemini_text(body: &serde_json::Value) -> Result<String, AdvisoryError> {
    non_empty(body["candidates"][0]["content"]["parts"][0]["text"].as_str())
}

pub(crate) fn anthropic_text(body: &serde_json::Value) -> Result<String, AdvisoryError> {
    non_empty(body["content"][0]["text"].as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gemini_text_extraction() {
        let body = serde_json::json!({
            "candidates": [{"content": {"parts": [{"text": " network_timeout\n"}]}}]
        });
        assert_eq!(gemini_text(&body).unwrap(), "network_timeout");
    }

    #[test]
    fn test_gemini_missing_candidates() {
        let body = serde_json::json!({"promptFeedback": {"blockReason": "SAFETY"}});
        assert!(matches!(gemini_text(&body), Err(AdvisoryError::Decode(_))));
    }

    #[test]
    fn test_anthropic_empty_text() {
        let body = serde_json::json!({"content": [{"type": "text", "text": "   "}]});
        assert!(matches!(anthropic_text(&body), Err(AdvisoryError::Empty)));
    }

    #[test]
    fn test_request_bodies() {
        let body = gemini_body("hello");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "hello");

        let body = anthropic_body("claude-3-haiku-20240307", "hello");
        assert_eq!(body["model"], "claude-3-haiku-20240307");
        assert_eq!(body["messages"][0]["content"], "hello");
    }

    #[test]
    fn test_new_requires_key() {
        let settings = AdvisorSettings::default();
        assert!(matches!(
            HttpAdvisor::new(&settings),
            Err(AdvisoryError::NotConfigured)
        ));
    }
}
