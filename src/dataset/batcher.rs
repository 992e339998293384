//! Upsert batching
//!
//! Videos are buffered up to `video_batch_size`. When the buffer fills it is
//! flushed first, then every full chunk of the snapshots gathered so far, so
//! a snapshot batch never precedes the video batch holding its parent. At the
//! end the remaining videos go out, then the remaining snapshots.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use super::errors::{DatasetError, DatasetResult};
use super::records::VideoRecord;
use crate::translator::{Column, SqlArg, Table};

/// Column order of video rows
pub const VIDEO_COLUMNS: [Column; 9] = [
    Column::Id,
    Column::CreatorId,
    Column::VideoCreatedAt,
    Column::ViewsCount,
    Column::LikesCount,
    Column::CommentsCount,
    Column::ReportsCount,
    Column::CreatedAt,
    Column::UpdatedAt,
];

/// Column order of snapshot rows
pub const SNAPSHOT_COLUMNS: [Column; 12] = [
    Column::Id,
    Column::VideoId,
    Column::ViewsCount,
    Column::LikesCount,
    Column::CommentsCount,
    Column::ReportsCount,
    Column::DeltaViewsCount,
    Column::DeltaLikesCount,
    Column::DeltaCommentsCount,
    Column::DeltaReportsCount,
    Column::CreatedAt,
    Column::UpdatedAt,
];

/// What happens when a row with the same id already exists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictPolicy {
    /// Overwrite every non-key column
    #[default]
    Update,
    /// Keep the existing row
    Ignore,
}

/// Loader settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoaderConfig {
    #[serde(default = "default_video_batch_size")]
    pub video_batch_size: usize,
    #[serde(default = "default_snapshot_batch_size")]
    pub snapshot_batch_size: usize,
    #[serde(default)]
    pub on_conflict: ConflictPolicy,
}

fn default_video_batch_size() -> usize {
    500
}

fn default_snapshot_batch_size() -> usize {
    2000
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            video_batch_size: default_video_batch_size(),
            snapshot_batch_size: default_snapshot_batch_size(),
            on_conflict: ConflictPolicy::default(),
        }
    }
}

impl LoaderConfig {
    pub fn validate(&self) -> DatasetResult<()> {
        if self.video_batch_size == 0 {
            return Err(DatasetError::InvalidBatchSize("videos"));
        }
        if self.snapshot_batch_size == 0 {
            return Err(DatasetError::InvalidBatchSize("snapshots"));
        }
        Ok(())
    }
}

/// Target table of a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchKind {
    VideoUpsert,
    SnapshotUpsert,
}

/// One statement to execute once per row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpsertBatch {
    pub kind: BatchKind,
    pub statement: String,
    pub rows: Vec<Vec<SqlArg>>,
}

/// Builds the insert statement for a table and its column order
pub fn upsert_statement(table: Table, columns: &[Column], policy: ConflictPolicy) -> String {
    let names: Vec<&str> = columns.iter().map(|c| c.as_sql()).collect();

    let mut sql = String::with_capacity(256);
    let _ = write!(sql, "INSERT INTO {} ({}) VALUES (", table.as_sql(), names.join(", "));
    for position in 1..=columns.len() {
        if position > 1 {
            sql.push_str(", ");
        }
        let _ = write!(sql, "${}", position);
    }
    sql.push_str(") ON CONFLICT (id) DO ");

    match policy {
        ConflictPolicy::Ignore => sql.push_str("NOTHING"),
        ConflictPolicy::Update => {
            sql.push_str("UPDATE SET ");
            let updates: Vec<String> = names
                .iter()
                .filter(|name| **name != Column::Id.as_sql())
                .map(|name| format!("{name} = EXCLUDED.{name}"))
                .collect();
            sql.push_str(&updates.join(", "));
        }
    }
    sql
}

/// Accumulates rows and cuts them into ordered batches
#[derive(Debug)]
pub struct Batcher {
    config: LoaderConfig,
    video_statement: String,
    snapshot_statement: String,
    videos: Vec<Vec<SqlArg>>,
    snapshots: Vec<Vec<SqlArg>>,
    video_rows: usize,
    snapshot_rows: usize,
}

impl Batcher {
    pub fn new(config: LoaderConfig) -> DatasetResult<Self> {
        config.validate()?;
        Ok(Self {
            video_statement: upsert_statement(Table::Videos, &VIDEO_COLUMNS, config.on_conflict),
            snapshot_statement: upsert_statement(
                Table::VideoSnapshots,
                &SNAPSHOT_COLUMNS,
                config.on_conflict,
            ),
            config,
            videos: Vec::new(),
            snapshots: Vec::new(),
            video_rows: 0,
            snapshot_rows: 0,
        })
    }

    /// Adds one video with its snapshots, returning any batches that filled
    pub fn push(&mut self, video: &VideoRecord) -> Vec<UpsertBatch> {
        self.videos.push(video.row());
        self.video_rows += 1;
        for snapshot in &video.snapshots {
            self.snapshots.push(snapshot.row(&video.id));
            self.snapshot_rows += 1;
        }

        let mut ready = Vec::new();
        if self.videos.len() >= self.config.video_batch_size {
            ready.push(self.video_batch());
            while self.snapshots.len() >= self.config.snapshot_batch_size {
                ready.push(self.snapshot_batch(self.config.snapshot_batch_size));
            }
        }
        ready
    }

    /// Flushes what is left: videos first, then snapshots in full-size chunks
    pub fn finish(mut self) -> (Vec<UpsertBatch>, usize, usize) {
        let mut ready = Vec::new();
        if !self.videos.is_empty() {
            ready.push(self.video_batch());
        }
        while !self.snapshots.is_empty() {
            let size = self.snapshots.len().min(self.config.snapshot_batch_size);
            ready.push(self.snapshot_batch(size));
        }
        (ready, self.video_rows, self.snapshot_rows)
    }

    fn video_batch(&mut self) -> UpsertBatch {
        UpsertBatch {
            kind: BatchKind::VideoUpsert,
            statement: self.video_statement.clone(),
            rows: std::mem::take(&mut self.videos),
        }
    }

    fn snapshot_batch(&mut self, size: usize) -> UpsertBatch {
        let rest = self.snapshots.split_off(size);
        UpsertBatch {
            kind: BatchKind::SnapshotUpsert,
            statement: self.snapshot_statement.clone(),
            rows: std::mem::replace(&mut self.snapshots, rest),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn video(id: &str, snapshots: usize) -> VideoRecord {
        let snaps: Vec<String> = (0..snapshots)
            .map(|n| format!(r#"{{"id":"{id}-s{n}"}}"#))
            .collect();
        serde_json::from_str(&format!(
            r#"{{"id":"{id}","creator_id":"c","snapshots":[{}]}}"#,
            snaps.join(",")
        ))
        .unwrap()
    }

    fn config(videos: usize, snapshots: usize) -> LoaderConfig {
        LoaderConfig {
            video_batch_size: videos,
            snapshot_batch_size: snapshots,
            on_conflict: ConflictPolicy::Update,
        }
    }

    #[test]
    fn test_update_statement() {
        let sql = upsert_statement(Table::Videos, &VIDEO_COLUMNS, ConflictPolicy::Update);
        assert!(sql.starts_with("INSERT INTO videos (id, creator_id, video_created_at,"));
        assert!(sql.contains("VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)"));
        assert!(sql.contains("ON CONFLICT (id) DO UPDATE SET creator_id = EXCLUDED.creator_id"));
        assert!(!sql.contains("id = EXCLUDED.id,"));
        assert!(sql.ends_with("updated_at = EXCLUDED.updated_at"));
    }

    #[test]
    fn test_ignore_statement() {
        let sql = upsert_statement(Table::VideoSnapshots, &SNAPSHOT_COLUMNS, ConflictPolicy::Ignore);
        assert!(sql.contains("$12)"));
        assert!(sql.ends_with("ON CONFLICT (id) DO NOTHING"));
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        assert!(Batcher::new(config(0, 10)).is_err());
        assert!(Batcher::new(config(10, 0)).is_err());
    }

    #[test]
    fn test_videos_flush_before_snapshots() {
        let mut batcher = Batcher::new(config(2, 3)).unwrap();

        assert!(batcher.push(&video("a", 2)).is_empty());
        let ready = batcher.push(&video("b", 2));

        let kinds: Vec<BatchKind> = ready.iter().map(|b| b.kind).collect();
        assert_eq!(kinds, vec![BatchKind::VideoUpsert, BatchKind::SnapshotUpsert]);
        assert_eq!(ready[0].rows.len(), 2);
        assert_eq!(ready[1].rows.len(), 3);

        let (rest, videos, snapshots) = batcher.finish();
        assert_eq!(rest.len(), 1);
        assert_eq!(rest[0].kind, BatchKind::SnapshotUpsert);
        assert_eq!(rest[0].rows.len(), 1);
        assert_eq!((videos, snapshots), (2, 4));
    }

    #[test]
    fn test_snapshots_wait_for_video_flush() {
        let mut batcher = Batcher::new(config(10, 2)).unwrap();
        // Plenty of snapshots, but their videos are still buffered
        assert!(batcher.push(&video("a", 5)).is_empty());

        let (ready, _, _) = batcher.finish();
        let sizes: Vec<(BatchKind, usize)> = ready.iter().map(|b| (b.kind, b.rows.len())).collect();
        assert_eq!(
            sizes,
            vec![
                (BatchKind::VideoUpsert, 1),
                (BatchKind::SnapshotUpsert, 2),
                (BatchKind::SnapshotUpsert, 2),
                (BatchKind::SnapshotUpsert, 1),
            ]
        );
    }

    #[test]
    fn test_empty_finish() {
        let batcher = Batcher::new(LoaderConfig::default()).unwrap();
        let (ready, videos, snapshots) = batcher.finish();
        assert!(ready.is_empty());
        assert_eq!((videos, snapshots), (0, 0));
    }
}
