//! Reply front-end
//!
//! Answers one incoming chat message with exactly one short text reply:
//!
//! - `/start` → `OK`
//! - no matching rule → sentinel
//! - matched → the single `value` the executor fetched, or the sentinel when
//!   the value is NULL or execution failed
//!
//! Execution is delegated to a `PlanExecutor`; pooling, timeouts and retries
//! live behind that trait.

mod errors;

pub use errors::{ExecutionError, ExecutionResult};

use std::sync::Arc;

use uuid::Uuid;

use crate::observability::{observe_translation, Logger, MetricsRegistry};
use crate::translator::{QueryPlan, Translator};

/// Reply sent when nothing better can be said
pub const DEFAULT_SENTINEL: &str = "0";

/// Greeting command
pub const START_COMMAND: &str = "/start";

/// The single `value` column of a plan's result row
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScalarValue {
    Integer(i64),
    /// Ranking text from the legacy extension
    Text(String),
}

/// Runs a plan and fetches its `value` column
///
/// `Ok(None)` means no row or a NULL value.
pub trait PlanExecutor {
    fn fetch_value(&self, plan: &QueryPlan) -> ExecutionResult<Option<ScalarValue>>;
}

impl<E: PlanExecutor + ?Sized> PlanExecutor for Arc<E> {
    fn fetch_value(&self, plan: &QueryPlan) -> ExecutionResult<Option<ScalarValue>> {
        (**self).fetch_value(plan)
    }
}

/// Turns messages into replies
pub struct Responder<E> {
    translator: Translator,
    executor: E,
    metrics: Arc<MetricsRegistry>,
    sentinel: String,
}

impl<E: PlanExecutor> Responder<E> {
    pub fn new(translator: Translator, executor: E, metrics: Arc<MetricsRegistry>) -> Self {
        Self {
            translator,
            executor,
            metrics,
            sentinel: DEFAULT_SENTINEL.to_string(),
        }
    }

    pub fn with_sentinel(mut self, sentinel: impl Into<String>) -> Self {
        self.sentinel = sentinel.into();
        self
    }

    pub fn sentinel(&self) -> &str {
        &self.sentinel
    }

    /// Produces the reply for one message. Never fails.
    pub fn reply(&self, text: &str) -> String {
        if text.trim() == START_COMMAND {
            return "OK".to_string();
        }

        let request_id = Uuid::new_v4().to_string();
        let translation = self.translator.translate_detailed(text);
        observe_translation(&self.metrics, &request_id, &translation);

        let Some(plan) = translation.plan else {
            return self.sentinel_reply();
        };

        match self.executor.fetch_value(&plan) {
            Ok(Some(ScalarValue::Integer(n))) => n.to_string(),
            Ok(Some(ScalarValue::Text(s))) => s,
            Ok(None) => self.sentinel_reply(),
            Err(err) => {
                self.metrics.increment_execution_failures();
                let error = err.to_string();
                Logger::error(
                    "EXECUTION_FAILED",
                    &[
                        ("error", error.as_str()),
                        ("kind", err.kind()),
                        ("request_id", request_id.as_str()),
                        ("rule", plan.rule().as_str()),
                    ],
                );
                self.sentinel_reply()
            }
        }
    }

    fn sentinel_reply(&self) -> String {
        self.metrics.increment_replies_sentinel();
        self.sentinel.clone()
    }
}
