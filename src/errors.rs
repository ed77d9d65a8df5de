//! Errors
//!
//! Custom error types used throughout the `driftwatch` crate.
use thiserror::Error;

/// Errors that can occur across the pipeline stages.
#[derive(Debug, Error)]
pub enum DriftError {
    /// A zero-length sample was handed to a distribution statistic.
    #[error("Empty samples passed to {0} calculation")]
    EmptySample(&'static str),
    /// Input dataset file does not exist.
    #[error("Dataset not found at {0}")]
    DatasetNotFound(String),
    /// Input dataset exists but lacks required columns.
    #[error("Dataset {path} is missing feature columns: {columns}")]
    MissingColumns { path: String, columns: String },
    /// A model or report artifact required by the stage does not exist.
    #[error("Artifact not found at {0}")]
    ArtifactNotFound(String),
    /// The evaluation report does not carry the requested metric.
    #[error("Metric '{0}' not found in report {1}")]
    MissingMetric(String, String),
    /// Registration gate refused the model.
    #[error("Metric {metric}={value:.4} is below threshold {threshold:.4}")]
    BelowThreshold {
        metric: String,
        value: f64,
        threshold: f64,
    },
    /// Unable to read an artifact from file.
    #[error("Unable to read {0}")]
    UnableToRead(String),
    /// Unable to write an artifact to file.
    #[error("Unable to write {0}")]
    UnableToWrite(String),
    /// Every download source strategy failed.
    #[error("No dataset source succeeded: {0}")]
    DownloadFailed(String),
}
