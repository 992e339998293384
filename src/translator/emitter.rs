//! Query emission
//!
//! Turns a matched `Intent` into a `QueryPlan`. Every statement yields one
//! row with one column aliased `value`; sums are coalesced to zero.

use chrono::NaiveDate;

use super::extract::TimeRange;
use super::metric::Metric;
use super::plan::{QueryPlan, ResultShape};
use super::rules::Intent;
use super::sql::{Column, StatementBuilder, Table};

const COUNT: &str = "SELECT COUNT(*)::bigint AS value FROM ";
const SUM_OPEN: &str = "SELECT COALESCE(SUM(";
const SUM_CLOSE: &str = "), 0)::bigint AS value FROM ";

/// Snapshot alias used by the per-event statements
const S: &str = "s";
/// Video alias used when a per-event statement is scoped by creator
const V: &str = "v";

/// Builds the plan for a matched intent
pub fn emit(intent: &Intent) -> QueryPlan {
    let rule = intent.rule();
    let scalar = |builder| QueryPlan::build(rule, ResultShape::Scalar, builder);
    let ranking = |builder| QueryPlan::build(rule, ResultShape::Text, builder);

    match intent {
        Intent::NegativeDeltaSnapshots { metric } => scalar(
            StatementBuilder::new()
                .push(COUNT)
                .table(Table::VideoSnapshots)
                .filter()
                .column(metric.delta_column())
                .push(" < 0"),
        ),

        Intent::TotalVideos => scalar(StatementBuilder::new().push(COUNT).table(Table::Videos)),

        Intent::CreatorVideos { creator_id } => scalar(
            by_creator(StatementBuilder::new().push(COUNT).table(Table::Videos), creator_id),
        ),

        Intent::CreatorVideosPublishedBetween { creator_id, range } => scalar(
            by_creator(StatementBuilder::new().push(COUNT).table(Table::Videos), creator_id)
                .filter()
                .column(Column::VideoCreatedAt)
                .push("::date >= ")
                .bind(range.start)
                .filter()
                .column(Column::VideoCreatedAt)
                .push("::date <= ")
                .bind(range.end),
        ),

        Intent::MetricPositive { metric, creator_id } => scalar(
            maybe_creator(
                StatementBuilder::new().push(COUNT).table(Table::Videos),
                creator_id.as_deref(),
            )
            .filter()
            .column(metric.value_column())
            .push(" > 0"),
        ),

        Intent::MetricThreshold {
            metric,
            threshold,
            creator_id,
        } => scalar(
            maybe_creator(
                StatementBuilder::new().push(COUNT).table(Table::Videos),
                creator_id.as_deref(),
            )
            .filter()
            .column(metric.value_column())
            .push(threshold.op.as_sql())
            .bind(threshold.value),
        ),

        Intent::MonthlyMetricSum { metric, start, end } => scalar(
            sum_videos(*metric)
                .filter()
                .column(Column::VideoCreatedAt)
                .push("::date >= ")
                .bind(*start)
                .filter()
                .column(Column::VideoCreatedAt)
                .push("::date < ")
                .bind(*end),
        ),

        Intent::GlobalMetricSum { metric } => scalar(sum_videos(*metric)),

        Intent::CreatorMetricSum { metric, creator_id } => {
            scalar(by_creator(sum_videos(*metric), creator_id))
        }

        Intent::DeltaSumWithinHours {
            metric,
            date,
            hours,
            creator_id,
        } => scalar(within_hours(
            on_date(sum_deltas(*metric, creator_id.as_deref()), *date),
            hours,
        )),

        Intent::DeltaSumForDate {
            metric,
            date,
            creator_id,
        } => scalar(on_date(sum_deltas(*metric, creator_id.as_deref()), *date)),

        Intent::DistinctVideosWithNewMetric {
            metric,
            date,
            creator_id,
        } => {
            let builder = StatementBuilder::new()
                .push("SELECT COUNT(DISTINCT ")
                .qualified(S, Column::VideoId)
                .push(")::bigint AS value FROM ");
            scalar(
                on_date(snapshots(builder, creator_id.as_deref()), *date)
                    .filter()
                    .qualified(S, metric.delta_column())
                    .push(" > 0"),
            )
        }

        Intent::TopCreatorsByVideoCount { limit } => ranking(
            StatementBuilder::new()
                .push("SELECT string_agg(t.creator_id || ': ' || t.total::text, E'\\n' ORDER BY t.total DESC, t.creator_id) AS value FROM (SELECT ")
                .column(Column::CreatorId)
                .push(", COUNT(*)::bigint AS total FROM ")
                .table(Table::Videos)
                .push(" GROUP BY ")
                .column(Column::CreatorId)
                .push(" ORDER BY total DESC, ")
                .column(Column::CreatorId)
                .push(" LIMIT ")
                .bind(*limit)
                .push(") t"),
        ),

        Intent::TopVideosByMetric { metric, limit } => ranking(
            StatementBuilder::new()
                .push("SELECT string_agg(t.id::text || ': ' || t.total::text, E'\\n' ORDER BY t.total DESC, t.id) AS value FROM (SELECT ")
                .column(Column::Id)
                .push(", ")
                .column(metric.value_column())
                .push("::bigint AS total FROM ")
                .table(Table::Videos)
                .push(" ORDER BY total DESC, ")
                .column(Column::Id)
                .push(" LIMIT ")
                .bind(*limit)
                .push(") t"),
        ),

        Intent::TopCreatorsByMetric { metric, limit } => ranking(
            StatementBuilder::new()
                .push("SELECT string_agg(t.creator_id || ': ' || t.total::text, E'\\n' ORDER BY t.total DESC, t.creator_id) AS value FROM (SELECT ")
                .column(Column::CreatorId)
                .push(", COALESCE(SUM(")
                .column(metric.value_column())
                .push("), 0)::bigint AS total FROM ")
                .table(Table::Videos)
                .push(" GROUP BY ")
                .column(Column::CreatorId)
                .push(" ORDER BY total DESC, ")
                .column(Column::CreatorId)
                .push(" LIMIT ")
                .bind(*limit)
                .push(") t"),
        ),
    }
}

fn by_creator(builder: StatementBuilder, creator_id: &str) -> StatementBuilder {
    builder
        .filter()
        .column(Column::CreatorId)
        .push(" = ")
        .bind(creator_id)
}

fn maybe_creator(builder: StatementBuilder, creator_id: Option<&str>) -> StatementBuilder {
    match creator_id {
        Some(id) => by_creator(builder, id),
        None => builder,
    }
}

fn sum_videos(metric: Metric) -> StatementBuilder {
    StatementBuilder::new()
        .push(SUM_OPEN)
        .column(metric.value_column())
        .push(SUM_CLOSE)
        .table(Table::Videos)
}

fn sum_deltas(metric: Metric, creator_id: Option<&str>) -> StatementBuilder {
    let builder = StatementBuilder::new()
        .push(SUM_OPEN)
        .qualified(S, metric.delta_column())
        .push(SUM_CLOSE);
    snapshots(builder, creator_id)
}

/// `video_snapshots s`, joined to `videos v` when scoped by creator
fn snapshots(builder: StatementBuilder, creator_id: Option<&str>) -> StatementBuilder {
    let builder = builder.table(Table::VideoSnapshots).push(" ").push(S);
    match creator_id {
        Some(id) => builder
            .push(" JOIN ")
            .table(Table::Videos)
            .push(" ")
            .push(V)
            .push(" ON ")
            .qualified(V, Column::Id)
            .push(" = ")
            .qualified(S, Column::VideoId)
            .filter()
            .qualified(V, Column::CreatorId)
            .push(" = ")
            .bind(id),
        None => builder,
    }
}

fn on_date(builder: StatementBuilder, date: NaiveDate) -> StatementBuilder {
    builder
        .filter()
        .qualified(S, Column::CreatedAt)
        .push("::date = ")
        .bind(date)
}

fn within_hours(builder: StatementBuilder, hours: &TimeRange) -> StatementBuilder {
    builder
        .filter()
        .qualified(S, Column::CreatedAt)
        .push("::time >= ")
        .bind(hours.from)
        .filter()
        .qualified(S, Column::CreatedAt)
        .push("::time < ")
        .bind(hours.to)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translator::extract::{Comparison, DateRange, Threshold};
    use crate::translator::rules::RuleId;
    use crate::translator::sql::SqlArg;
    use chrono::NaiveTime;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn hm(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_negative_delta_count() {
        let plan = emit(&Intent::NegativeDeltaSnapshots { metric: Metric::Views });
        assert_eq!(
            plan.statement(),
            "SELECT COUNT(*)::bigint AS value FROM video_snapshots WHERE delta_views_count < 0"
        );
        assert!(plan.arguments().is_empty());
    }

    #[test]
    fn test_total_videos() {
        let plan = emit(&Intent::TotalVideos);
        assert_eq!(plan.statement(), "SELECT COUNT(*)::bigint AS value FROM videos");
        assert_eq!(plan.rule(), RuleId::TotalVideos);
    }

    #[test]
    fn test_creator_publish_range() {
        let plan = emit(&Intent::CreatorVideosPublishedBetween {
            creator_id: "abc".into(),
            range: DateRange { start: ymd(2025, 11, 1), end: ymd(2025, 11, 5) },
        });
        assert_eq!(
            plan.statement(),
            "SELECT COUNT(*)::bigint AS value FROM videos WHERE creator_id = $1 \
             AND video_created_at::date >= $2 AND video_created_at::date <= $3"
        );
        assert_eq!(
            plan.arguments(),
            &[
                SqlArg::Text("abc".into()),
                SqlArg::Date(ymd(2025, 11, 1)),
                SqlArg::Date(ymd(2025, 11, 5)),
            ]
        );
    }

    #[test]
    fn test_metric_positive_without_creator() {
        let plan = emit(&Intent::MetricPositive { metric: Metric::Comments, creator_id: None });
        assert_eq!(
            plan.statement(),
            "SELECT COUNT(*)::bigint AS value FROM videos WHERE comments_count > 0"
        );
        assert!(plan.arguments().is_empty());
    }

    #[test]
    fn test_threshold_numbering_shifts_with_creator() {
        let threshold = Threshold { op: Comparison::GreaterOrEqual, value: 50 };

        let plan = emit(&Intent::MetricThreshold {
            metric: Metric::Likes,
            threshold,
            creator_id: None,
        });
        assert_eq!(
            plan.statement(),
            "SELECT COUNT(*)::bigint AS value FROM videos WHERE likes_count >= $1"
        );

        let plan = emit(&Intent::MetricThreshold {
            metric: Metric::Likes,
            threshold,
            creator_id: Some("abc".into()),
        });
        assert_eq!(
            plan.statement(),
            "SELECT COUNT(*)::bigint AS value FROM videos WHERE creator_id = $1 AND likes_count >= $2"
        );
        assert_eq!(plan.arguments(), &[SqlArg::Text("abc".into()), SqlArg::Integer(50)]);
    }

    #[test]
    fn test_monthly_sum_is_half_open() {
        let plan = emit(&Intent::MonthlyMetricSum {
            metric: Metric::Views,
            start: ymd(2025, 12, 1),
            end: ymd(2026, 1, 1),
        });
        assert_eq!(
            plan.statement(),
            "SELECT COALESCE(SUM(views_count), 0)::bigint AS value FROM videos \
             WHERE video_created_at::date >= $1 AND video_created_at::date < $2"
        );
    }

    #[test]
    fn test_delta_sum_within_hours_with_creator_joins() {
        let plan = emit(&Intent::DeltaSumWithinHours {
            metric: Metric::Views,
            date: ymd(2025, 11, 28),
            hours: TimeRange { from: hm(10, 0), to: hm(15, 0) },
            creator_id: Some("abc".into()),
        });
        assert_eq!(
            plan.statement(),
            "SELECT COALESCE(SUM(s.delta_views_count), 0)::bigint AS value \
             FROM video_snapshots s JOIN videos v ON v.id = s.video_id \
             WHERE v.creator_id = $1 AND s.created_at::date = $2 \
             AND s.created_at::time >= $3 AND s.created_at::time < $4"
        );
        assert_eq!(plan.arguments().len(), 4);
        assert_eq!(plan.placeholder_count(), 4);
    }

    #[test]
    fn test_delta_sum_for_date_without_creator() {
        let plan = emit(&Intent::DeltaSumForDate {
            metric: Metric::Likes,
            date: ymd(2025, 11, 28),
            creator_id: None,
        });
        assert_eq!(
            plan.statement(),
            "SELECT COALESCE(SUM(s.delta_likes_count), 0)::bigint AS value \
             FROM video_snapshots s WHERE s.created_at::date = $1"
        );
        assert_eq!(plan.arguments(), &[SqlArg::Date(ymd(2025, 11, 28))]);
    }

    #[test]
    fn test_distinct_videos() {
        let plan = emit(&Intent::DistinctVideosWithNewMetric {
            metric: Metric::Reports,
            date: ymd(2025, 11, 27),
            creator_id: None,
        });
        assert_eq!(
            plan.statement(),
            "SELECT COUNT(DISTINCT s.video_id)::bigint AS value FROM video_snapshots s \
             WHERE s.created_at::date = $1 AND s.delta_reports_count > 0"
        );
    }

    #[test]
    fn test_ranking_plans_are_text() {
        let plan = emit(&Intent::TopVideosByMetric { metric: Metric::Views, limit: 5 });
        assert_eq!(plan.shape(), ResultShape::Text);
        assert!(plan.statement().contains("LIMIT $1) t"));
        assert!(plan.statement().contains("AS value"));
        assert_eq!(plan.arguments(), &[SqlArg::Integer(5)]);

        let plan = emit(&Intent::TopCreatorsByMetric { metric: Metric::Likes, limit: 3 });
        assert!(plan.statement().contains("SUM(likes_count)"));
        assert!(plan.statement().contains("GROUP BY creator_id"));
    }

    #[test]
    fn test_scalar_plans_alias_value() {
        let intents = [
            Intent::TotalVideos,
            Intent::GlobalMetricSum { metric: Metric::Reports },
            Intent::CreatorMetricSum { metric: Metric::Views, creator_id: "x".into() },
            Intent::CreatorVideos { creator_id: "x".into() },
        ];
        for intent in &intents {
            let plan = emit(intent);
            assert_eq!(plan.shape(), ResultShape::Scalar);
            assert!(plan.statement().contains(" AS value FROM "));
            assert_eq!(plan.placeholder_count(), plan.arguments().len());
        }
    }
}
