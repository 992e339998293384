//! # Dataset Errors

use std::io;

use thiserror::Error;

/// Result type for dataset loading
pub type DatasetResult<T> = Result<T, DatasetError>;

/// Dataset loading errors
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("Cannot read dataset {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("Malformed dataset: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Batch size for {0} must be greater than zero")]
    InvalidBatchSize(&'static str),
}
