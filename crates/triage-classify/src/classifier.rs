use crate::memo::LabelMemo;
use crate::rules::rule_label;
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;
use triage_advisor::{prompts, Advisor};
use triage_core::{FaultLabel, LabelerSettings, LogEvent};
use triage_store::Store;

/// Rule-first classifier with an advisory fallback
pub struct Classifier {
    throttle: Duration,
}

impl Classifier {
    pub fn new(throttle: Duration) -> Self {
        Self { throttle }
    }

    pub fn from_settings(settings: &LabelerSettings) -> Self {
        Self::new(Duration::from_millis(settings.throttle_ms))
    }

    /// Label one message; advisory failures and budget exhaustion yield `other`
    pub fn label_one(
        &self,
        memo: &LabelMemo,
        advisor: &dyn Advisor,
        message: &str,
        endpoint: Option<&str>,
        correlation_id: Option<&str>,
    ) -> FaultLabel {
        if let Some(label) = rule_label(message) {
            return label;
        }

        let key = LabelMemo::key(message);
        if let Some(label) = memo.cached(&key) {
            return label;
        }

        if !memo.try_acquire() {
            tracing::debug!("advisory budget spent, labeling as other");
            return FaultLabel::Other;
        }

        let prompt = prompts::build_label_prompt(
            message,
            endpoint.unwrap_or_default(),
            correlation_id.unwrap_or_default(),
        );
        let result = advisor.generate(&prompt);
        if !self.throttle.is_zero() {
            std::thread::sleep(self.throttle);
        }

        match result {
            Ok(text) => {
                let label = FaultLabel::coerce(&text);
                memo.remember(key, label);
                label
            }
            Err(e) => {
                tracing::warn!(error = %e, "advisory labeling failed");
                FaultLabel::Other
            }
        }
    }

    /// Label every event, then apply the per-correlation majority
    pub fn label_batch(&self, memo: &LabelMemo, advisor: &dyn Advisor, events: &mut [LogEvent]) {
        for event in events.iter_mut() {
            event.label = Some(self.label_one(
                memo,
                advisor,
                &event.message,
                event.endpoint.as_deref(),
                event.correlation_id.as_deref(),
            ));
        }
        consolidate_by_correlation(events);
    }

    /// Relabel the most recent persisted events and store the results
    pub fn label_recent(
        &self,
        store: &dyn Store,
        memo: &LabelMemo,
        advisor: &dyn Advisor,
        limit: usize,
    ) -> anyhow::Result<Vec<(i64, FaultLabel)>> {
        let mut events = store.fetch_recent(limit)?;
        self.label_batch(memo, advisor, &mut events);

        let mut out = Vec::with_capacity(events.len());
        for event in &events {
            if let (Some(id), Some(label)) = (event.id, event.label) {
                store.set_label(id, label)?;
                out.push((id, label));
            }
        }
        tracing::info!(
            labeled = out.len(),
            advisory_calls = memo.calls_used(),
            "relabeled recent events"
        );
        Ok(out)
    }
}

/// Winner by count, then non-`other`, then lexically smallest name
pub fn majority_label(labels: &[FaultLabel]) -> Option<FaultLabel> {
    let mut counts: BTreeMap<&'static str, (usize, FaultLabel)> = BTreeMap::new();
    for label in labels {
        counts.entry(label.as_str()).or_insert((0, *label)).0 += 1;
    }
    counts
        .into_iter()
        .max_by(|(name_a, (count_a, label_a)), (name_b, (count_b, label_b))| {
            count_a
                .cmp(count_b)
                .then_with(|| {
                    (*label_a != FaultLabel::Other).cmp(&(*label_b != FaultLabel::Other))
                })
                .then_with(|| name_b.cmp(name_a))
        })
        .map(|(_, (_, label))| label)
}

/// Give every event sharing a correlation id the group's majority label
pub fn consolidate_by_correlation(events: &mut [LogEvent]) {
    let mut groups: HashMap<String, Vec<usize>> = HashMap::new();
    for (idx, event) in events.iter().enumerate() {
        if let Some(cid) = event.correlation_id.as_deref().filter(|c| !c.is_empty()) {
            groups.entry(cid.to_string()).or_default().push(idx);
        }
    }

    for indices in groups.values() {
        let labels: Vec<FaultLabel> = indices.iter().filter_map(|&i| events[i].label).collect();
        if let Some(winner) = majority_label(&labels) {
            for &i in indices {
                events[i].label = Some(winner);
            }
        }
    }
}

/// Label counts over persisted events
pub fn histogram(store: &dyn Store) -> anyhow::Result<BTreeMap<String, usize>> {
    store.label_histogram()
}
