//! Analysis API handlers.

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;
use tracing::{info, warn};

use vmark_models::AnalysisReport;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Response to an analysis request.
#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub run_id: String,
    pub report: AnalysisReport,
}

/// Run the full analysis pipeline on a stored video.
///
/// Blocks until the run completes; a repeat of an identical upload is
/// answered from the content-hash cache without touching the analysis
/// service.
pub async fn analyze_video(
    State(state): State<AppState>,
    Path(video_id): Path<String>,
) -> ApiResult<Json<AnalyzeResponse>> {
    let source = state.library.resolve(&video_id).await?;

    let outcome = state.pipeline.run(&video_id, &source).await?;

    // The finished report becomes the working context for this video.
    let context = outcome.report_path.display().to_string();
    if let Err(e) = state
        .update_workspace(|w| {
            w.video_in = Some(video_id.clone());
            w.context = Some(context);
        })
        .await
    {
        // The report itself is already durable.
        warn!(error = %e, "Failed to persist workspace record after analysis");
    }

    info!(
        video_id = %video_id,
        run_id = %outcome.run_id,
        moments = outcome.report.metadata.total_moments,
        cached = outcome.report.metadata.cached,
        "Analysis finished"
    );

    Ok(Json(AnalyzeResponse {
        run_id: outcome.run_id.to_string(),
        report: outcome.report,
    }))
}

/// Fetch the persisted report of an earlier run.
pub async fn get_run_report(
    State(state): State<AppState>,
    Path(run_id): Path<String>,
) -> ApiResult<Json<AnalysisReport>> {
    let run_id = vmark_models::RunId::from_string(run_id);
    let report = state
        .reports
        .read(&run_id)
        .await
        .map_err(ApiError::from)?;
    Ok(Json(report))
}
