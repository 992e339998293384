//! Question translation
//!
//! Turns a Russian analytics question into a parameterized statement over the
//! `videos` / `video_snapshots` schema:
//!
//! ```text
//! question -> normalize -> extract signals -> match rule -> emit -> QueryPlan
//! ```
//!
//! The translation is pure and synchronous. It performs no I/O and keeps no
//! state between calls, so a `Translator` can be shared freely.
//!
//! Statement text is built only from fixed fragments and the closed
//! `Table`/`Column` enums. Every value taken from the question is bound
//! positionally through the argument tuple.

mod emitter;
mod errors;
mod explain;
mod extract;
mod lexicon;
mod metric;
mod normalize;
mod plan;
mod rules;
mod sql;

pub use emitter::emit;
pub use errors::{SignalError, SignalErrorCode, SignalResult};
pub use explain::ExplainTranslation;
pub use extract::{
    creator_id, date_range, explicit_date, month_year, threshold, time_range, top_limit,
    Comparison, DateRange, ExtractedSignals, MonthYear, Threshold, TimeRange,
};
pub use lexicon::{genitive_month, locative_month};
pub use metric::Metric;
pub use normalize::normalize;
pub use plan::{QueryPlan, ResultShape};
pub use rules::{
    candidate_rules, match_intent, Intent, Question, RuleId, CORE_RULE_COUNT, RULES,
    RULE_COUNT,
};
pub use sql::{Column, SqlArg, StatementBuilder, Table};

/// Result of one translation, with its intermediate state
#[derive(Debug, Clone)]
pub struct Translation {
    pub normalized: String,
    pub signals: ExtractedSignals,
    pub plan: Option<QueryPlan>,
}

/// Translator configuration
#[derive(Debug, Clone, Copy, Default)]
pub struct Translator {
    legacy_ranking: bool,
}

impl Translator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables the multi-row ranking rules
    pub fn with_legacy_ranking(mut self, enabled: bool) -> Self {
        self.legacy_ranking = enabled;
        self
    }

    pub fn legacy_ranking(&self) -> bool {
        self.legacy_ranking
    }

    /// Translates a question, `None` when no rule matches
    pub fn translate<'a>(&self, raw: impl Into<Option<&'a str>>) -> Option<QueryPlan> {
        self.translate_detailed(raw).plan
    }

    /// Translates a question and keeps the normalized text and signals
    pub fn translate_detailed<'a>(&self, raw: impl Into<Option<&'a str>>) -> Translation {
        let normalized = normalize(raw);
        let signals = ExtractedSignals::extract(&normalized);
        let plan = match_intent(&Question::new(&normalized, &signals), self.legacy_ranking)
            .map(|intent| emit(&intent));

        Translation {
            normalized,
            signals,
            plan,
        }
    }

    /// Translates a question and reports every rule whose guard held
    pub fn explain<'a>(&self, raw: impl Into<Option<&'a str>>) -> ExplainTranslation {
        let Translation {
            normalized,
            signals,
            plan,
        } = self.translate_detailed(raw);
        let candidates = candidate_rules(&Question::new(&normalized, &signals), self.legacy_ranking);
        ExplainTranslation::new(normalized, signals, candidates, plan.as_ref())
    }
}

/// Translates with the default configuration
pub fn translate<'a>(raw: impl Into<Option<&'a str>>) -> Option<QueryPlan> {
    Translator::default().translate(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translate_is_deterministic() {
        let q = "Сколько видео у креатора abc123 набрало больше 1000 просмотров?";
        assert_eq!(translate(q), translate(q));
    }

    #[test]
    fn test_absent_input() {
        assert!(translate(None::<&str>).is_none());
        assert!(translate("").is_none());
    }

    #[test]
    fn test_legacy_flag() {
        let q = "Топ 3 видео по лайкам";
        assert!(Translator::new().translate(q).is_none());

        let plan = Translator::new().with_legacy_ranking(true).translate(q).unwrap();
        assert_eq!(plan.shape(), ResultShape::Text);
    }

    #[test]
    fn test_detailed_keeps_signals() {
        let t = Translator::new().translate_detailed("  Сколько ЛАЙКОВ у автора X1?");
        assert_eq!(t.normalized, "сколько лайков у автора x1?");
        assert_eq!(t.signals.metric, Some(Metric::Likes));
        assert_eq!(t.plan.map(|p| p.rule()), Some(RuleId::CreatorMetricSum));
    }
}
