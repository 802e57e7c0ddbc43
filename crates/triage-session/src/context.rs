use crate::evidence::PofReport;
use serde::Serialize;
use triage_core::{canonical_timestamp, Evidence, FaultLabel};

/// Evidence surfaced alongside a turn; never persisted
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TurnContext {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pof_timestamp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pof_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brief: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<FaultLabel>,
}

impl TurnContext {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl From<&Evidence> for TurnContext {
    fn from(evidence: &Evidence) -> Self {
        Self {
            pof_timestamp: Some(canonical_timestamp(&evidence.timestamp)),
            pof_message: Some(evidence.message.clone()).filter(|m| !m.is_empty()),
            correlation_id: evidence.correlation_id.clone(),
            endpoint: evidence.endpoint.clone(),
            brief: None,
            label: None,
        }
    }
}

impl From<&PofReport> for TurnContext {
    fn from(report: &PofReport) -> Self {
        Self {
            brief: report.brief.clone(),
            label: report.label,
            ..Self::from(&report.evidence)
        }
    }
}
