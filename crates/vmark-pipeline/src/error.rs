//! Pipeline error types.
//!
//! Only run-fatal conditions appear here. Per-segment service and parse
//! failures, cache problems, and validation rejections are recovered
//! inside the pipeline and logged instead.

use thiserror::Error;

use vmark_media::MediaError;
use vmark_models::PolicyError;
use vmark_storage::StorageError;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Run-fatal pipeline errors.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Invalid segmentation policy: {0}")]
    Config(#[from] PolicyError),

    #[error("Duration probe failed: {0}")]
    Probe(#[source] MediaError),

    #[error("Segmentation failed: {0}")]
    Segmentation(String),

    #[error("Analysis succeeded but the report could not be persisted: {0}")]
    Persist(#[source] StorageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    /// Machine-checkable error kind for API callers.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Config(_) => "config",
            Self::Probe(_) => "probe",
            Self::Segmentation(_) => "segmentation",
            Self::Persist(_) => "persist",
            Self::Io(_) => "io",
        }
    }
}
