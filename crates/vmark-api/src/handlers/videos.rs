//! Video library API handlers.

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use vmark_media::{get_duration, trim_video};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Response to a successful upload.
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub video_id: String,
    pub size_bytes: usize,
}

/// Accept a multipart video upload and store it in the library.
///
/// The uploaded video becomes the current working video; any analysis
/// context from a previous video is cleared.
pub async fn upload_video(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<(StatusCode, Json<UploadResponse>)> {
    let mut upload: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Malformed multipart body: {}", e)))?
    {
        let Some(filename) = field.file_name().map(String::from) else {
            continue;
        };
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::bad_request(format!("Failed to read upload: {}", e)))?;
        upload = Some((filename, bytes.to_vec()));
        break;
    }

    let (filename, bytes) = upload
        .ok_or_else(|| ApiError::bad_request("Multipart body contains no file field"))?;

    if bytes.is_empty() {
        return Err(ApiError::bad_request("Uploaded file is empty"));
    }

    let video_id = state.library.save_upload(&filename, &bytes).await?;

    state
        .update_workspace(|w| {
            w.video_in = Some(video_id.clone());
            w.context = None;
        })
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to persist workspace record");
            ApiError::internal("Failed to persist workspace record")
        })?;

    info!(video_id = %video_id, bytes = bytes.len(), "Video uploaded");

    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            size_bytes: bytes.len(),
            video_id,
        }),
    ))
}

/// Video metadata response.
#[derive(Debug, Serialize)]
pub struct VideoInfoResponse {
    pub video_id: String,
    pub size_bytes: u64,
    pub duration: f64,
}

/// Return metadata for a stored video.
pub async fn get_video(
    State(state): State<AppState>,
    Path(video_id): Path<String>,
) -> ApiResult<Json<VideoInfoResponse>> {
    let path = state.library.resolve(&video_id).await?;
    let meta = tokio::fs::metadata(&path)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to stat video: {}", e)))?;
    let duration = get_duration(&path).await?;

    Ok(Json(VideoInfoResponse {
        video_id,
        size_bytes: meta.len(),
        duration,
    }))
}

/// Request to trim a stored video.
#[derive(Debug, Deserialize)]
pub struct TrimRequest {
    /// Trim start in seconds.
    pub start: f64,
    /// Trim end in seconds (exclusive).
    pub end: f64,
}

/// Response to a successful trim.
#[derive(Debug, Serialize)]
pub struct TrimResponse {
    pub video_id: String,
    pub output_id: String,
}

/// Cut `[start, end)` from a stored video into a `_trimmed` sibling in
/// the library. Bounds are validated against the probed duration and
/// surface as a client error.
pub async fn trim_stored_video(
    State(state): State<AppState>,
    Path(video_id): Path<String>,
    Json(request): Json<TrimRequest>,
) -> ApiResult<Json<TrimResponse>> {
    let input = state.library.resolve(&video_id).await?;

    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| ApiError::bad_request("Video has no usable filename"))?;
    let ext = input
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("mp4");
    let output_id = format!("{}_trimmed.{}", stem, ext);
    let output = state.library.root().join(&output_id);

    trim_video(&input, &output, request.start, request.end).await?;

    info!(
        video_id = %video_id,
        output_id = %output_id,
        start = request.start,
        end = request.end,
        "Trimmed video"
    );

    Ok(Json(TrimResponse { video_id, output_id }))
}
