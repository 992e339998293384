//! Explain output for a translation
//!
//! Produces deterministic, human-readable output showing the normalized text,
//! every signal found, every rule whose guard held and the emitted plan.

use std::fmt;

use serde::Serialize;

use super::extract::ExtractedSignals;
use super::plan::QueryPlan;
use super::rules::RuleId;
use super::sql::SqlArg;

/// Explain output
#[derive(Debug, Clone, Serialize)]
pub struct ExplainTranslation {
    /// Text the rules were evaluated against
    pub normalized: String,
    /// Whether any rule matched
    pub matched: bool,
    /// Winning rule (if matched)
    pub rule: Option<RuleId>,
    /// Every rule whose guard held, in priority order
    pub candidates: Vec<RuleId>,
    /// Extracted signals
    pub signals: ExtractedSignals,
    /// Malformed signals, as "CODE [signal]: message"
    pub diagnostics: Vec<String>,
    /// Statement text (if matched)
    pub statement: Option<String>,
    /// Bound arguments (if matched)
    pub arguments: Vec<SqlArg>,
}

impl ExplainTranslation {
    pub fn new(
        normalized: String,
        signals: ExtractedSignals,
        candidates: Vec<RuleId>,
        plan: Option<&QueryPlan>,
    ) -> Self {
        let diagnostics = signals.diagnostics.iter().map(|d| d.to_string()).collect();
        Self {
            normalized,
            matched: plan.is_some(),
            rule: plan.map(|p| p.rule()),
            candidates,
            signals,
            diagnostics,
            statement: plan.map(|p| p.statement().to_string()),
            arguments: plan.map(|p| p.arguments().to_vec()).unwrap_or_default(),
        }
    }
}

impl fmt::Display for ExplainTranslation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== EXPLAIN TRANSLATION ===")?;
        writeln!(f, "Text: {}", self.normalized)?;

        let s = &self.signals;
        writeln!(f, "Signals:")?;
        if let Some(metric) = s.metric {
            writeln!(f, "  - metric: {}", metric.as_str())?;
        }
        if let Some(creator) = &s.creator_id {
            writeln!(f, "  - creator_id: {}", creator)?;
        }
        if let Some(t) = s.threshold {
            writeln!(f, "  - threshold:{}{}", t.op.as_sql(), t.value)?;
        }
        if let Some(date) = s.date {
            writeln!(f, "  - date: {}", date)?;
        }
        if let Some(range) = s.date_range {
            writeln!(f, "  - date_range: {} .. {}", range.start, range.end)?;
        }
        if let Some(month) = s.month_year {
            writeln!(f, "  - month: {:04}-{:02}", month.year, month.month)?;
        }
        if let Some(hours) = s.time_range {
            writeln!(f, "  - time_range: [{}, {})", hours.from.format("%H:%M"), hours.to.format("%H:%M"))?;
        }
        if let Some(limit) = s.top_limit {
            writeln!(f, "  - top: {}", limit)?;
        }
        for diagnostic in &self.diagnostics {
            writeln!(f, "  ! {}", diagnostic)?;
        }

        if !self.candidates.is_empty() {
            writeln!(f, "Candidates:")?;
            for rule in &self.candidates {
                writeln!(f, "  {}. {}", rule.priority(), rule.as_str())?;
            }
        }

        match (&self.rule, &self.statement) {
            (Some(rule), Some(statement)) => {
                writeln!(f, "Status: MATCHED")?;
                writeln!(f, "Rule: {}", rule.as_str())?;
                writeln!(f, "Statement: {}", statement)?;
                for (position, arg) in self.arguments.iter().enumerate() {
                    writeln!(f, "  ${} {} = {}", position + 1, arg.type_name(), display_arg(arg))?;
                }
            }
            _ => writeln!(f, "Status: NO MATCH")?,
        }

        Ok(())
    }
}

fn display_arg(arg: &SqlArg) -> String {
    match arg {
        SqlArg::Text(s) => format!("'{}'", s),
        SqlArg::Integer(n) => n.to_string(),
        SqlArg::Date(d) => d.to_string(),
        SqlArg::Time(t) => t.format("%H:%M").to_string(),
        SqlArg::Timestamp(ts) => ts.to_rfc3339(),
        SqlArg::Null => "NULL".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translator::Translator;

    #[test]
    fn test_explain_matched() {
        let explain = Translator::default()
            .explain("Сколько видео у креатора abc123 набрало больше 1000 просмотров?");
        assert!(explain.matched);
        assert_eq!(explain.rule, Some(RuleId::MetricThreshold));

        let output = explain.to_string();
        assert!(output.contains("=== EXPLAIN TRANSLATION ==="));
        assert!(output.contains("Status: MATCHED"));
        assert!(output.contains("Rule: metric_threshold"));
        assert!(output.contains("  - creator_id: abc123"));
        assert!(output.contains("  $1 text = 'abc123'"));
        assert!(output.contains("  $2 integer = 1000"));
    }

    #[test]
    fn test_explain_unmatched() {
        let explain = Translator::default().explain("как дела?");
        assert!(!explain.matched);
        assert!(explain.candidates.is_empty());

        let output = explain.to_string();
        assert!(output.contains("Status: NO MATCH"));
        assert!(!output.contains("Statement:"));
    }

    #[test]
    fn test_explain_lists_diagnostics() {
        let explain = Translator::default()
            .explain("На сколько выросли просмотры 28 ноября 2025 с 10:00 до 25:00?");
        assert_eq!(explain.rule, Some(RuleId::DeltaSumForDate));
        assert_eq!(explain.diagnostics.len(), 1);
        assert!(explain.to_string().contains("! VQ_SIGNAL_MALFORMED_TIME"));
    }

    #[test]
    fn test_explain_json() {
        let explain = Translator::default().explain("Сколько всего видео в системе?");
        let json = serde_json::to_value(&explain).unwrap();
        assert_eq!(json["matched"], true);
        assert_eq!(json["rule"], "total_videos");
        assert_eq!(json["candidates"][0], "total_videos");
    }
}
