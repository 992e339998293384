//! Metric keyword resolution
//!
//! Maps keyword stems to the column pair that carries a metric: the
//! cumulative total on `videos` and the per-snapshot delta on
//! `video_snapshots`.

use serde::Serialize;

use super::sql::Column;

/// A video metric
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Views,
    Likes,
    Comments,
    Reports,
}

impl Metric {
    /// Resolution order. Views win when several metrics are mentioned.
    pub const ALL: [Metric; 4] = [Metric::Views, Metric::Likes, Metric::Comments, Metric::Reports];

    fn stems(&self) -> &'static [&'static str] {
        match self {
            Metric::Views => &["просмотр"],
            Metric::Likes => &["лайк"],
            Metric::Comments => &["коммент"],
            Metric::Reports => &["репорт", "жалоб"],
        }
    }

    /// First metric whose stem occurs in the normalized text
    pub fn resolve(text: &str) -> Option<Metric> {
        Self::ALL
            .into_iter()
            .find(|metric| metric.stems().iter().any(|stem| text.contains(stem)))
    }

    /// Cumulative column on the entity table
    pub fn value_column(&self) -> Column {
        match self {
            Metric::Views => Column::ViewsCount,
            Metric::Likes => Column::LikesCount,
            Metric::Comments => Column::CommentsCount,
            Metric::Reports => Column::ReportsCount,
        }
    }

    /// Signed change column on the per-event table
    pub fn delta_column(&self) -> Column {
        match self {
            Metric::Views => Column::DeltaViewsCount,
            Metric::Likes => Column::DeltaLikesCount,
            Metric::Comments => Column::DeltaCommentsCount,
            Metric::Reports => Column::DeltaReportsCount,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::Views => "views",
            Metric::Likes => "likes",
            Metric::Comments => "comments",
            Metric::Reports => "reports",
        }
    }
}
