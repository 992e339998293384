//! Observability for the translation front-ends
//!
//! - Structured logging (JSON lines)
//! - Counters
//! - Scoped lifecycle events
//!
//! The translator itself never logs. Front-ends report each translation
//! through `observe_translation`, which writes the events and bumps the
//! counters in one place.
//!
//! ```ignore
//! use vidquery::observability::{observe_translation, MetricsRegistry};
//!
//! let metrics = MetricsRegistry::new();
//! let translation = translator.translate_detailed(text);
//! observe_translation(&metrics, &request_id, &translation);
//! ```

mod logger;
mod metrics;
mod scope;

pub use logger::{Logger, Severity};
pub use metrics::{MetricsRegistry, MetricsSnapshot};
pub use scope::ObservationScope;

use crate::translator::Translation;

/// Logs the outcome of one translation and updates the counters
pub fn observe_translation(metrics: &MetricsRegistry, request_id: &str, translation: &Translation) {
    let diagnostics = &translation.signals.diagnostics;
    if !diagnostics.is_empty() {
        metrics.add_malformed_signals(diagnostics.len() as u64);
    }
    for diagnostic in diagnostics {
        Logger::warn(
            "SIGNAL_MALFORMED",
            &[
                ("code", diagnostic.code().code()),
                ("message", diagnostic.message()),
                ("request_id", request_id),
                ("signal", diagnostic.signal()),
            ],
        );
    }

    match &translation.plan {
        Some(plan) => {
            metrics.record_translation(Some(plan.rule()));
            let arguments = plan.arguments().len().to_string();
            Logger::info(
                "TRANSLATION_MATCHED",
                &[
                    ("arguments", arguments.as_str()),
                    ("request_id", request_id),
                    ("rule", plan.rule().as_str()),
                ],
            );
        }
        None => {
            metrics.record_translation(None);
            Logger::info(
                "TRANSLATION_UNMATCHED",
                &[("request_id", request_id), ("text", translation.normalized.as_str())],
            );
        }
    }
}
