//! Query plans

use serde::Serialize;

use super::rules::RuleId;
use super::sql::{SqlArg, StatementBuilder};

/// Shape of the single `value` column a plan yields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultShape {
    /// Numeric count or sum
    Scalar,
    /// Newline-joined ranking text
    Text,
}

/// A parameterized statement plus its ordered argument tuple.
///
/// Immutable once built. The placeholder count of `statement` always equals
/// `arguments.len()`, because both come out of one `StatementBuilder`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryPlan {
    rule: RuleId,
    statement: String,
    arguments: Vec<SqlArg>,
    shape: ResultShape,
}

impl QueryPlan {
    pub(crate) fn build(rule: RuleId, shape: ResultShape, builder: StatementBuilder) -> Self {
        let (statement, arguments) = builder.finish();
        Self {
            rule,
            statement,
            arguments,
            shape,
        }
    }

    /// Rule that produced this plan
    pub fn rule(&self) -> RuleId {
        self.rule
    }

    pub fn statement(&self) -> &str {
        &self.statement
    }

    pub fn arguments(&self) -> &[SqlArg] {
        &self.arguments
    }

    pub fn shape(&self) -> ResultShape {
        self.shape
    }

    /// Number of distinct `$k` placeholders in the statement
    pub fn placeholder_count(&self) -> usize {
        let mut highest = 0;
        let mut rest = self.statement.as_str();
        while let Some(pos) = rest.find('$') {
            rest = &rest[pos + 1..];
            let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
            if let Ok(k) = digits.parse::<usize>() {
                highest = highest.max(k);
            }
        }
        highest
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translator::sql::{Column, Table};

    #[test]
    fn test_placeholder_count_matches_arguments() {
        let builder = StatementBuilder::new()
            .push("SELECT COUNT(*)::bigint AS value FROM ")
            .table(Table::Videos)
            .filter()
            .column(Column::CreatorId)
            .push(" = ")
            .bind("abc")
            .filter()
            .column(Column::LikesCount)
            .push(" > ")
            .bind(10_i64);
        let plan = QueryPlan::build(RuleId::MetricThreshold, ResultShape::Scalar, builder);

        assert_eq!(plan.placeholder_count(), 2);
        assert_eq!(plan.arguments().len(), 2);
        assert_eq!(plan.rule(), RuleId::MetricThreshold);
    }

    #[test]
    fn test_no_placeholders() {
        let builder = StatementBuilder::new()
            .push("SELECT COUNT(*)::bigint AS value FROM ")
            .table(Table::Videos);
        let plan = QueryPlan::build(RuleId::TotalVideos, ResultShape::Scalar, builder);
        assert_eq!(plan.placeholder_count(), 0);
        assert!(plan.arguments().is_empty());
    }

    #[test]
    fn test_json_shape() {
        let builder = StatementBuilder::new().push("SELECT 1 AS value");
        let plan = QueryPlan::build(RuleId::TotalVideos, ResultShape::Scalar, builder);
        let json = serde_json::to_value(&plan).unwrap();
        assert_eq!(json["rule"], "total_videos");
        assert_eq!(json["shape"], "scalar");
        assert_eq!(json["statement"], "SELECT 1 AS value");
        assert!(json["arguments"].as_array().unwrap().is_empty());
    }
}
