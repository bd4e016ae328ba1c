//! API error types.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use vmark_media::MediaError;
use vmark_pipeline::PipelineError;
use vmark_storage::StorageError;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Media error: {0}")]
    Media(#[from] MediaError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),
}

impl ApiError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            // Client-caused media problems keep 4xx statuses.
            ApiError::Media(MediaError::FileNotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Media(MediaError::InvalidRange(_)) => StatusCode::BAD_REQUEST,
            ApiError::Media(MediaError::InvalidVideo(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Media(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Storage(StorageError::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Storage(StorageError::InvalidName(_)) => StatusCode::BAD_REQUEST,
            ApiError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Pipeline(PipelineError::Config(_)) => StatusCode::BAD_REQUEST,
            ApiError::Pipeline(PipelineError::Probe(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Pipeline(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    detail: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Don't expose internal error details in production
        let detail = if status == StatusCode::INTERNAL_SERVER_ERROR
            && std::env::var("ENVIRONMENT").unwrap_or_default() == "production"
        {
            "An internal error occurred".to_string()
        } else {
            self.to_string()
        };

        (status, Json(ErrorResponse { detail })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::not_found("x").status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::bad_request("x").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(StorageError::not_found("v.mp4")).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(MediaError::invalid_range("start after end")).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(MediaError::FileNotFound(PathBuf::from("/x"))).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(PipelineError::Segmentation("split failed".into())).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
