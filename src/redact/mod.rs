//! Sensitive-data redaction for diffs before they leave the machine.
//!
//! The engine is an ordered list of regex rules folded over the input text.
//! Each rule replaces its matches with a fixed placeholder, so the output of
//! one rule is the input of the next. Placeholders never match any rule,
//! which keeps [`redact`] idempotent.
//!
//! This is a best-effort filter: false negatives are possible, and where rule
//! shapes overlap the engine prefers redacting too much over too little.

pub mod rules;

use std::collections::BTreeMap;

pub use rules::{RedactionKind, RedactionRule, RULES};

/// Per-rule match counts from a redaction pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RedactionReport {
    counts: BTreeMap<RedactionKind, usize>,
}

impl RedactionReport {
    /// Number of values replaced by the given rule.
    pub fn count(&self, kind: RedactionKind) -> usize {
        self.counts.get(&kind).copied().unwrap_or(0)
    }

    /// Total number of values replaced.
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Human-readable summary, e.g. `2 sensitive values (email, key-value secret)`.
    pub fn summary(&self) -> String {
        let total = self.total();
        let kinds: Vec<&str> = self.counts.keys().map(|k| k.as_str()).collect();
        let noun = if total == 1 { "value" } else { "values" };
        format!("{} sensitive {} ({})", total, noun, kinds.join(", "))
    }

    fn record(&mut self, kind: RedactionKind, matches: usize) {
        if matches > 0 {
            *self.counts.entry(kind).or_insert(0) += matches;
        }
    }
}

/// Replace sensitive substrings in `diff` with placeholder markers.
pub fn redact(diff: &str) -> String {
    RULES.iter().fold(diff.to_string(), |text, rule| {
        rule.pattern.replace_all(&text, rule.replacement).into_owned()
    })
}

/// Like [`redact`], also reporting how many values each rule replaced.
pub fn redact_with_report(diff: &str) -> (String, RedactionReport) {
    let mut report = RedactionReport::default();

    let redacted = RULES.iter().fold(diff.to_string(), |text, rule| {
        report.record(rule.kind, rule.pattern.find_iter(&text).count());
        rule.pattern.replace_all(&text, rule.replacement).into_owned()
    });

    (redacted, report)
}
