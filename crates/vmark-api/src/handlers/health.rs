//! Health check handlers.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Serialize;

use crate::state::AppState;

/// Health response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: String,
}

/// Health check endpoint (liveness probe).
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now().to_rfc3339(),
    })
}

/// Readiness check response.
#[derive(Serialize)]
pub struct ReadinessResponse {
    pub status: String,
    pub checks: ReadinessChecks,
}

#[derive(Serialize)]
pub struct ReadinessChecks {
    pub ffmpeg: CheckStatus,
    pub ffprobe: CheckStatus,
    pub data_dir: CheckStatus,
}

#[derive(Serialize)]
pub struct CheckStatus {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CheckStatus {
    fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            error: None,
        }
    }

    fn error(msg: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            error: Some(msg.into()),
        }
    }

    fn from_which(binary: &str) -> Self {
        match which::which(binary) {
            Ok(_) => Self::ok(),
            Err(e) => Self::error(format!("{} not found: {}", binary, e)),
        }
    }
}

/// Readiness check endpoint (readiness probe).
/// Checks the encoder binaries and the data directory.
pub async fn ready(
    State(state): State<AppState>,
) -> Result<Json<ReadinessResponse>, (StatusCode, Json<ReadinessResponse>)> {
    let ffmpeg_check = CheckStatus::from_which("ffmpeg");
    let ffprobe_check = CheckStatus::from_which("ffprobe");

    let data_dir_check = match tokio::fs::metadata(&state.config.data_dir).await {
        Ok(meta) if meta.is_dir() => CheckStatus::ok(),
        Ok(_) => CheckStatus::error("data dir is not a directory"),
        Err(e) => CheckStatus::error(e.to_string()),
    };

    let all_ok = ffmpeg_check.status == "ok"
        && ffprobe_check.status == "ok"
        && data_dir_check.status == "ok";

    let response = ReadinessResponse {
        status: if all_ok { "ready" } else { "degraded" }.to_string(),
        checks: ReadinessChecks {
            ffmpeg: ffmpeg_check,
            ffprobe: ffprobe_check,
            data_dir: data_dir_check,
        },
    };

    if all_ok {
        Ok(Json(response))
    } else {
        Err((StatusCode::SERVICE_UNAVAILABLE, Json(response)))
    }
}
