//! Fault classification: keyword rules, advisory fallback, majority consolidation

mod classifier;
mod memo;
mod rules;

pub use classifier::{consolidate_by_correlation, histogram, majority_label, Classifier};
pub use memo::LabelMemo;
pub use rules::rule_label;
