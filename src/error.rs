//! Error types for the training pipeline

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when loading dataset splits from disk
#[derive(Error, Debug)]
pub enum DataLoadError {
    #[error("split file not found: {0}")]
    Missing(PathBuf),

    #[error("failed to read split file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed split file {path}: {reason}")]
    Malformed { path: PathBuf, reason: String },
}

/// Errors that can occur when fitting or scoring the model
#[derive(Error, Debug)]
pub enum FitError {
    #[error("feature matrix has {rows} rows but target vector has {targets} entries")]
    ShapeMismatch { rows: usize, targets: usize },

    #[error("{0} split is empty")]
    EmptySplit(&'static str),

    #[error("{0} split contains non-finite values")]
    NonFinite(&'static str),

    #[error("validation rows have {val} features, training rows have {train}")]
    FeatureWidthMismatch { train: usize, val: usize },
}

/// Errors that can occur when reporting a metric to the tracking sink
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("failed to persist run record: {0}")]
    Storage(#[from] std::io::Error),

    #[error("failed to serialize run record: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("metric rejected: {0}")]
    Rejected(String),
}

/// Top-level error for a training run
#[derive(Error, Debug)]
pub enum TrainError {
    #[error(transparent)]
    Data(#[from] DataLoadError),

    #[error(transparent)]
    Fit(#[from] FitError),

    #[error(transparent)]
    Report(#[from] ReportError),
}

/// Result type alias for training runs
pub type TrainResult<T> = Result<T, TrainError>;
