//! Dump records
//!
//! `{"videos": [{..., "snapshots": [...]}]}`. Counters that are missing or
//! null read as 0; timestamps are RFC 3339 or null.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};

use crate::translator::SqlArg;

/// Whole dump file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub videos: Vec<VideoRecord>,
}

/// One `videos` row with its snapshots
#[derive(Debug, Clone, Deserialize)]
pub struct VideoRecord {
    pub id: String,
    pub creator_id: String,
    #[serde(default)]
    pub video_created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub views_count: i64,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub likes_count: i64,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub comments_count: i64,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub reports_count: i64,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub snapshots: Vec<SnapshotRecord>,
}

/// One `video_snapshots` row
#[derive(Debug, Clone, Deserialize)]
pub struct SnapshotRecord {
    pub id: String,
    /// Falls back to the enclosing video's id
    #[serde(default)]
    pub video_id: Option<String>,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub views_count: i64,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub likes_count: i64,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub comments_count: i64,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub reports_count: i64,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub delta_views_count: i64,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub delta_likes_count: i64,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub delta_comments_count: i64,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub delta_reports_count: i64,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl VideoRecord {
    /// Row in `VIDEO_COLUMNS` order
    pub fn row(&self) -> Vec<SqlArg> {
        vec![
            SqlArg::from(self.id.as_str()),
            SqlArg::from(self.creator_id.as_str()),
            SqlArg::from(self.video_created_at),
            SqlArg::from(self.views_count),
            SqlArg::from(self.likes_count),
            SqlArg::from(self.comments_count),
            SqlArg::from(self.reports_count),
            SqlArg::from(self.created_at),
            SqlArg::from(self.updated_at),
        ]
    }
}

impl SnapshotRecord {
    /// Row in `SNAPSHOT_COLUMNS` order
    pub fn row(&self, parent_id: &str) -> Vec<SqlArg> {
        let video_id = self.video_id.as_deref().unwrap_or(parent_id);
        vec![
            SqlArg::from(self.id.as_str()),
            SqlArg::from(video_id),
            SqlArg::from(self.views_count),
            SqlArg::from(self.likes_count),
            SqlArg::from(self.comments_count),
            SqlArg::from(self.reports_count),
            SqlArg::from(self.delta_views_count),
            SqlArg::from(self.delta_likes_count),
            SqlArg::from(self.delta_comments_count),
            SqlArg::from(self.delta_reports_count),
            SqlArg::from(self.created_at),
            SqlArg::from(self.updated_at),
        ]
    }
}

fn null_as_zero<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<i64>::deserialize(deserializer)?.unwrap_or(0))
}
