//! Error taxonomy for the sentiment pipeline
//!
//! Startup-time failures (`ArtifactNotFound`, `ArtifactCorrupt`, `Config`) are
//! fatal for the process. Everything else is fatal only for the request (or
//! batch item) that produced it.

use std::path::PathBuf;
use thiserror::Error;

/// Common result type for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while loading artifacts or analyzing text
#[derive(Error, Debug)]
pub enum Error {
    /// Artifact path does not resolve to a readable file
    #[error("Artifact not found: {}", path.display())]
    ArtifactNotFound { path: PathBuf },

    /// Artifact file exists but could not be deserialized or failed validation
    #[error("Artifact corrupt: {}: {reason}", path.display())]
    ArtifactCorrupt { path: PathBuf, reason: String },

    /// Component used before an artifact was bound to it
    #[error("{0} not loaded")]
    NotLoaded(&'static str),

    /// Feature vector width disagrees with the model's input width
    #[error("Dimension mismatch: model expects {expected} features, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Predictor produced a label outside {0, 1}
    #[error("Model returned unexpected value: {0}. Expected 0 or 1")]
    InvariantViolation(i64),

    /// Unexpected downstream fault during analysis
    #[error("Analysis failed: {0}")]
    AnalysisFailure(String),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Build an `ArtifactCorrupt` error for `path`
    pub fn corrupt(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Error::ArtifactCorrupt {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// True for failures that must stop the service from starting
    pub fn is_startup_fatal(&self) -> bool {
        matches!(
            self,
            Error::ArtifactNotFound { .. } | Error::ArtifactCorrupt { .. } | Error::Config(_)
        )
    }
}
