//! Workspace record handler.

use axum::extract::State;
use axum::Json;

use crate::state::AppState;
use crate::workspace::Workspace;

/// Return the current workspace record.
pub async fn get_workspace(State(state): State<AppState>) -> Json<Workspace> {
    Json(state.workspace.read().await.clone())
}
