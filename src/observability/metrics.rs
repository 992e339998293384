//! Translation counters
//!
//! Counters only, monotonic, reset on process start. Relaxed atomics: the
//! values are exact once callers are quiescent, which is all a snapshot needs.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

use crate::translator::{RuleId, RULE_COUNT};

/// Registry shared by every front-end in the process
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    translations_total: AtomicU64,
    translations_matched: AtomicU64,
    translations_unmatched: AtomicU64,
    malformed_signals: AtomicU64,
    replies_sentinel: AtomicU64,
    execution_failures: AtomicU64,
    /// Indexed by `RuleId::index`
    rule_hits: [AtomicU64; RULE_COUNT],
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one translation outcome
    pub fn record_translation(&self, rule: Option<RuleId>) {
        self.translations_total.fetch_add(1, Ordering::Relaxed);
        match rule {
            Some(rule) => {
                self.translations_matched.fetch_add(1, Ordering::Relaxed);
                self.rule_hits[rule.index()].fetch_add(1, Ordering::Relaxed);
            }
            None => {
                self.translations_unmatched.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    pub fn add_malformed_signals(&self, count: u64) {
        self.malformed_signals.fetch_add(count, Ordering::Relaxed);
    }

    pub fn increment_replies_sentinel(&self) {
        self.replies_sentinel.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_execution_failures(&self) {
        self.execution_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn rule_hits(&self, rule: RuleId) -> u64 {
        self.rule_hits[rule.index()].load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let rules = RuleId::ALL
            .iter()
            .map(|rule| (rule.as_str(), self.rule_hits(*rule)))
            .collect();

        MetricsSnapshot {
            translations_total: self.translations_total.load(Ordering::Relaxed),
            translations_matched: self.translations_matched.load(Ordering::Relaxed),
            translations_unmatched: self.translations_unmatched.load(Ordering::Relaxed),
            malformed_signals: self.malformed_signals.load(Ordering::Relaxed),
            replies_sentinel: self.replies_sentinel.load(Ordering::Relaxed),
            execution_failures: self.execution_failures.load(Ordering::Relaxed),
            rules,
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(&self.snapshot()).unwrap_or_else(|_| "{}".to_string())
    }
}

/// Point-in-time copy of every counter
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub translations_total: u64,
    pub translations_matched: u64,
    pub translations_unmatched: u64,
    pub malformed_signals: u64,
    pub replies_sentinel: u64,
    pub execution_failures: u64,
    /// Hits per rule name
    pub rules: BTreeMap<&'static str, u64>,
}
