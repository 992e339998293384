//! Statement vocabulary and builder
//!
//! Statement text is assembled only from `&'static str` fragments and the
//! closed `Table`/`Column` enums. Anything derived from a question travels
//! as a `SqlArg` and is referenced through a positional `$k` placeholder.

use std::fmt::Write as _;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::Serialize;

/// Tables of the analytics schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    /// One row per video with cumulative totals
    Videos,
    /// One row per periodic measurement of a video
    VideoSnapshots,
}

impl Table {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Table::Videos => "videos",
            Table::VideoSnapshots => "video_snapshots",
        }
    }
}

/// Columns of the analytics schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Id,
    CreatorId,
    VideoCreatedAt,
    VideoId,
    ViewsCount,
    LikesCount,
    CommentsCount,
    ReportsCount,
    DeltaViewsCount,
    DeltaLikesCount,
    DeltaCommentsCount,
    DeltaReportsCount,
    CreatedAt,
    UpdatedAt,
}

impl Column {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Column::Id => "id",
            Column::CreatorId => "creator_id",
            Column::VideoCreatedAt => "video_created_at",
            Column::VideoId => "video_id",
            Column::ViewsCount => "views_count",
            Column::LikesCount => "likes_count",
            Column::CommentsCount => "comments_count",
            Column::ReportsCount => "reports_count",
            Column::DeltaViewsCount => "delta_views_count",
            Column::DeltaLikesCount => "delta_likes_count",
            Column::DeltaCommentsCount => "delta_comments_count",
            Column::DeltaReportsCount => "delta_reports_count",
            Column::CreatedAt => "created_at",
            Column::UpdatedAt => "updated_at",
        }
    }
}

/// A bound statement argument
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum SqlArg {
    Text(String),
    Integer(i64),
    Date(NaiveDate),
    Time(NaiveTime),
    Timestamp(DateTime<Utc>),
    Null,
}

impl SqlArg {
    /// Type tag used in JSON output
    pub fn type_name(&self) -> &'static str {
        match self {
            SqlArg::Text(_) => "text",
            SqlArg::Integer(_) => "integer",
            SqlArg::Date(_) => "date",
            SqlArg::Time(_) => "time",
            SqlArg::Timestamp(_) => "timestamp",
            SqlArg::Null => "null",
        }
    }
}

impl From<String> for SqlArg {
    fn from(value: String) -> Self {
        SqlArg::Text(value)
    }
}

impl From<&str> for SqlArg {
    fn from(value: &str) -> Self {
        SqlArg::Text(value.to_string())
    }
}

impl From<i64> for SqlArg {
    fn from(value: i64) -> Self {
        SqlArg::Integer(value)
    }
}

impl From<NaiveDate> for SqlArg {
    fn from(value: NaiveDate) -> Self {
        SqlArg::Date(value)
    }
}

impl From<NaiveTime> for SqlArg {
    fn from(value: NaiveTime) -> Self {
        SqlArg::Time(value)
    }
}

impl From<Option<DateTime<Utc>>> for SqlArg {
    fn from(value: Option<DateTime<Utc>>) -> Self {
        value.map_or(SqlArg::Null, SqlArg::Timestamp)
    }
}

/// Accumulates statement text and its positional arguments together, so
/// that placeholder numbering always matches the argument tuple.
#[derive(Debug, Default)]
pub struct StatementBuilder {
    sql: String,
    arguments: Vec<SqlArg>,
    filtering: bool,
}

impl StatementBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends fixed statement text
    pub fn push(mut self, fragment: &'static str) -> Self {
        self.sql.push_str(fragment);
        self
    }

    pub fn table(self, table: Table) -> Self {
        self.push(table.as_sql())
    }

    pub fn column(self, column: Column) -> Self {
        self.push(column.as_sql())
    }

    /// Appends `alias.column`
    pub fn qualified(self, alias: &'static str, column: Column) -> Self {
        self.push(alias).push(".").column(column)
    }

    /// Starts the next predicate: ` WHERE ` the first time, ` AND ` after
    pub fn filter(mut self) -> Self {
        let joiner = if self.filtering { " AND " } else { " WHERE " };
        self.filtering = true;
        self.push(joiner)
    }

    /// Binds an argument and appends its `$k` placeholder
    pub fn bind(mut self, argument: impl Into<SqlArg>) -> Self {
        self.arguments.push(argument.into());
        let _ = write!(self.sql, "${}", self.arguments.len());
        self
    }

    pub fn finish(self) -> (String, Vec<SqlArg>) {
        (self.sql, self.arguments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholders_follow_bind_order() {
        let (sql, args) = StatementBuilder::new()
            .push("SELECT COUNT(*) AS value FROM ")
            .table(Table::Videos)
            .filter()
            .column(Column::CreatorId)
            .push(" = ")
            .bind("abc")
            .filter()
            .column(Column::ViewsCount)
            .push(" > ")
            .bind(10_i64)
            .finish();

        assert_eq!(
            sql,
            "SELECT COUNT(*) AS value FROM videos WHERE creator_id = $1 AND views_count > $2"
        );
        assert_eq!(args, vec![SqlArg::Text("abc".into()), SqlArg::Integer(10)]);
    }

    #[test]
    fn test_qualified_column() {
        let (sql, args) = StatementBuilder::new()
            .qualified("s", Column::DeltaLikesCount)
            .finish();
        assert_eq!(sql, "s.delta_likes_count");
        assert!(args.is_empty());
    }

    #[test]
    fn test_arg_json_shape() {
        let date = NaiveDate::from_ymd_opt(2025, 11, 28).unwrap();
        let json = serde_json::to_value(SqlArg::Date(date)).unwrap();
        assert_eq!(json["type"], "date");
        assert_eq!(json["value"], "2025-11-28");

        let json = serde_json::to_value(SqlArg::Integer(5)).unwrap();
        assert_eq!(json["type"], "integer");
        assert_eq!(json["value"], 5);
    }

    #[test]
    fn test_missing_timestamp_is_null() {
        assert_eq!(SqlArg::from(None::<DateTime<Utc>>), SqlArg::Null);
        assert_eq!(SqlArg::Null.type_name(), "null");
    }
}
