//! Dataset loading
//!
//! Reads a JSON dump of videos and their snapshots and turns it into ordered
//! upsert batches for the execution collaborator. Nothing here talks to a
//! database; the batches carry the statement and the bound rows.

mod batcher;
mod errors;
mod records;

pub use batcher::{
    upsert_statement, BatchKind, Batcher, ConflictPolicy, LoaderConfig, UpsertBatch,
    SNAPSHOT_COLUMNS, VIDEO_COLUMNS,
};
pub use errors::{DatasetError, DatasetResult};
pub use records::{Dataset, SnapshotRecord, VideoRecord};

use std::fs;
use std::path::Path;

/// Batches produced from one dump, in execution order
#[derive(Debug, Clone)]
pub struct LoadOutcome {
    pub batches: Vec<UpsertBatch>,
    pub videos: usize,
    pub snapshots: usize,
}

/// Parses dump text
pub fn parse(text: &str) -> DatasetResult<Dataset> {
    Ok(serde_json::from_str(text)?)
}

/// Cuts a parsed dump into batches
pub fn plan(dataset: &Dataset, config: &LoaderConfig) -> DatasetResult<LoadOutcome> {
    let mut batcher = Batcher::new(config.clone())?;
    let mut batches = Vec::new();
    for video in &dataset.videos {
        batches.extend(batcher.push(video));
    }
    let (rest, videos, snapshots) = batcher.finish();
    batches.extend(rest);

    Ok(LoadOutcome {
        batches,
        videos,
        snapshots,
    })
}

/// Reads, parses and batches a dump file
pub fn load_file(path: &Path, config: &LoaderConfig) -> DatasetResult<LoadOutcome> {
    let text = fs::read_to_string(path).map_err(|source| DatasetError::Read {
        path: path.display().to_string(),
        source,
    })?;
    plan(&parse(&text)?, config)
}
