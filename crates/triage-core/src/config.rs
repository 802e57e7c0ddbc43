//! Configuration for ingestion, labeling and sessions

use crate::paths::{atomic_write, Paths};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Which advisory service to call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Gemini,
    Anthropic,
}

/// Advisory capability settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvisorSettings {
    pub provider: Provider,
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Per-call timeout; a timed-out call is a failure, never retried
    pub timeout_secs: u64,
}

impl Default for AdvisorSettings {
    fn default() -> Self {
        Self {
            provider: Provider::Gemini,
            model: "gemini-2.5-flash".to_string(),
            api_key: None,
            timeout_secs: 30,
        }
    }
}

/// Classifier settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelerSettings {
    /// Advisory calls allowed per process run
    pub max_advisory_calls: usize,
    /// Pause after each advisory call
    pub throttle_ms: u64,
    /// Default number of recent events to relabel
    pub relabel_limit: usize,
}

impl Default for LabelerSettings {
    fn default() -> Self {
        Self {
            max_advisory_calls: 10,
            throttle_ms: 200,
            relabel_limit: 300,
        }
    }
}

/// Session engine settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    /// Recent labeled events shown to the question planner
    pub recent_context_limit: usize,
    /// Max events fetched for a window summary
    pub window_fetch_limit: usize,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            recent_context_limit: 25,
            window_fetch_limit: 200,
        }
    }
}

/// Triage configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub db_path: Option<PathBuf>,
    pub advisor: AdvisorSettings,
    pub labeler: LabelerSettings,
    pub session: SessionSettings,
}

fn env_value(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    let raw = env_value(key)?;
    match raw.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            tracing::warn!(key, value = %raw, "ignoring unparsable environment override");
            None
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load config.json (defaults when missing or malformed), then apply env overrides
    pub fn load(paths: &Paths) -> Self {
        let path = paths.config_file();
        let mut config = if path.exists() {
            match std::fs::read_to_string(&path)
                .map_err(anyhow::Error::from)
                .and_then(|c| serde_json::from_str::<Config>(&c).map_err(Into::into))
            {
                Ok(c) => c,
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "unreadable config, using defaults"
                    );
                    Config::new()
                }
            }
        } else {
            Config::new()
        };
        config.apply_env();
        config
    }

    /// Environment variables override file values
    pub fn apply_env(&mut self) {
        if let Some(key) = env_value("GEMINI_API_KEY")
            .or_else(|| env_value("LLM_API_KEY"))
            .or_else(|| env_value("ANTHROPIC_API_KEY"))
        {
            self.advisor.api_key = Some(key);
        }
        if let Some(model) = env_value("GEMINI_MODEL") {
            self.advisor.model = model;
        }
        if let Some(secs) = env_parse("TRIAGE_ADVISOR_TIMEOUT_SECS") {
            self.advisor.timeout_secs = secs;
        }
        if let Some(max) = env_parse("LABELER_MAX_AI_CALLS") {
            self.labeler.max_advisory_calls = max;
        }
        if let Some(ms) = env_parse("LABELER_AI_SLEEP_MS") {
            self.labeler.throttle_ms = ms;
        }
        if let Some(db) = env_value("TRIAGE_DB") {
            self.db_path = Some(PathBuf::from(db));
        }
    }

    /// Database location: `TRIAGE_DB`, then the config value, else the data directory default
    pub fn db_path(&self, paths: &Paths) -> PathBuf {
        self.db_path.clone().unwrap_or_else(|| paths.db_file())
    }

    /// Write config.json if it does not exist yet; returns whether it was written
    pub fn write_default(paths: &Paths) -> anyhow::Result<bool> {
        let path = paths.config_file();
        if path.exists() {
            return Ok(false);
        }
        let json = serde_json::to_string_pretty(&Config::new())?;
        atomic_write(&path, json.as_bytes())?;
        Ok(true)
    }
}
