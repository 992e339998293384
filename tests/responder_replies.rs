//! Responder Reply Tests
//!
//! The chat-facing contract:
//! - "/start" is acknowledged without translation
//! - Any unanswerable question degrades to the sentinel
//! - Execution failures never leak to the reply

use std::sync::{Arc, Mutex};

use vidquery::observability::MetricsRegistry;
use vidquery::responder::{ExecutionError, ExecutionResult, PlanExecutor, Responder, ScalarValue};
use vidquery::translator::{QueryPlan, RuleId, Translator};

// =============================================================================
// Helper Functions
// =============================================================================

/// Records every plan it sees and answers with a fixed result
struct RecordingExecutor {
    answer: ExecutionResult<Option<ScalarValue>>,
    seen: Mutex<Vec<QueryPlan>>,
}

impl RecordingExecutor {
    fn answering(answer: ExecutionResult<Option<ScalarValue>>) -> Arc<Self> {
        Arc::new(Self {
            answer,
            seen: Mutex::new(Vec::new()),
        })
    }

    fn seen_rules(&self) -> Vec<RuleId> {
        self.seen.lock().unwrap().iter().map(|p| p.rule()).collect()
    }
}

impl PlanExecutor for RecordingExecutor {
    fn fetch_value(&self, plan: &QueryPlan) -> ExecutionResult<Option<ScalarValue>> {
        self.seen.lock().unwrap().push(plan.clone());
        self.answer.clone()
    }
}

fn responder(
    executor: Arc<RecordingExecutor>,
) -> (Responder<Arc<RecordingExecutor>>, Arc<MetricsRegistry>) {
    let metrics = Arc::new(MetricsRegistry::new());
    let responder = Responder::new(Translator::default(), executor, metrics.clone());
    (responder, metrics)
}

// =============================================================================
// Replies
// =============================================================================

#[test]
fn test_start_command_skips_translation() {
    let executor = RecordingExecutor::answering(Ok(Some(ScalarValue::Integer(1))));
    let (responder, metrics) = responder(executor.clone());

    assert_eq!(responder.reply("/start"), "OK");
    assert!(executor.seen_rules().is_empty());
    assert_eq!(metrics.snapshot().translations_total, 0);
}

#[test]
fn test_numeric_reply() {
    let executor = RecordingExecutor::answering(Ok(Some(ScalarValue::Integer(358))));
    let (responder, metrics) = responder(executor.clone());

    assert_eq!(responder.reply("Сколько всего видео в системе?"), "358");
    assert_eq!(executor.seen_rules(), vec![RuleId::TotalVideos]);
    assert_eq!(metrics.rule_hits(RuleId::TotalVideos), 1);
}

#[test]
fn test_unknown_question_gets_sentinel() {
    let executor = RecordingExecutor::answering(Ok(Some(ScalarValue::Integer(7))));
    let (responder, metrics) = responder(executor.clone());

    assert_eq!(responder.reply("Как дела?"), "0");
    assert!(executor.seen_rules().is_empty());

    let snapshot = metrics.snapshot();
    assert_eq!(snapshot.translations_unmatched, 1);
    assert_eq!(snapshot.replies_sentinel, 1);
}

#[test]
fn test_null_value_gets_sentinel() {
    let executor = RecordingExecutor::answering(Ok(None));
    let (responder, _metrics) = responder(executor);
    assert_eq!(responder.reply("Сколько всего лайков в системе?"), "0");
}

#[test]
fn test_execution_failure_gets_sentinel() {
    let executor =
        RecordingExecutor::answering(Err(ExecutionError::Unavailable("pool closed".into())));
    let (responder, metrics) = responder(executor);

    let reply = responder.reply("Сколько всего лайков в системе?");
    assert_eq!(reply, "0");
    assert!(!reply.contains("pool closed"));
    assert_eq!(metrics.snapshot().execution_failures, 1);
}

#[test]
fn test_custom_sentinel() {
    let executor = RecordingExecutor::answering(Ok(None));
    let metrics = Arc::new(MetricsRegistry::new());
    let responder =
        Responder::new(Translator::default(), executor, metrics).with_sentinel("нет данных");

    assert_eq!(responder.sentinel(), "нет данных");
    assert_eq!(responder.reply("???"), "нет данных");
}

#[test]
fn test_ranking_text_reply() {
    let executor =
        RecordingExecutor::answering(Ok(Some(ScalarValue::Text("abc: 12\nxyz: 4".into()))));
    let metrics = Arc::new(MetricsRegistry::new());
    let responder = Responder::new(
        Translator::new().with_legacy_ranking(true),
        executor.clone(),
        metrics,
    );

    assert_eq!(responder.reply("Топ 2 авторов"), "abc: 12\nxyz: 4");
    assert_eq!(executor.seen_rules(), vec![RuleId::TopCreatorsByVideoCount]);
}
