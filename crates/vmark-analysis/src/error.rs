//! Analysis client error types.

use thiserror::Error;

/// Result type for analysis service calls.
pub type AnalysisResult<T> = Result<T, AnalysisError>;

/// Errors from the external analysis service adapter.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Upload failed: {0}")]
    Upload(String),

    #[error("Service call failed: {0}")]
    Service(String),

    #[error("Failed to parse service response: {0}")]
    Parse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AnalysisError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn upload(msg: impl Into<String>) -> Self {
        Self::Upload(msg.into())
    }

    pub fn service(msg: impl Into<String>) -> Self {
        Self::Service(msg.into())
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }
}
