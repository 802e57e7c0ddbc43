use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use triage_core::FaultLabel;

/// Advisory label cache plus call budget, owned by the caller and shared across requests
pub struct LabelMemo {
    cache: Mutex<HashMap<String, FaultLabel>>,
    calls: AtomicUsize,
    max_calls: usize,
}

impl LabelMemo {
    pub fn new(max_calls: usize) -> Self {
        Self {
            cache: Mutex::new(HashMap::new()),
            calls: AtomicUsize::new(0),
            max_calls,
        }
    }

    /// Cache key: trimmed, lower-cased message
    pub fn key(message: &str) -> String {
        message.trim().to_lowercase()
    }

    pub fn cached(&self, key: &str) -> Option<FaultLabel> {
        self.cache
            .lock()
            .ok()
            .and_then(|cache| cache.get(key).copied())
    }

    pub fn remember(&self, key: String, label: FaultLabel) {
        if let Ok(mut cache) = self.cache.lock() {
            cache.insert(key, label);
        }
    }

    /// Take one call from the budget; false once it is spent
    pub fn try_acquire(&self) -> bool {
        self.calls
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |used| {
                (used < self.max_calls).then_some(used + 1)
            })
            .is_ok()
    }

    pub fn calls_used(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}
