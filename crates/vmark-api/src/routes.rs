//! API routes.

use axum::extract::DefaultBodyLimit;
use axum::http::HeaderValue;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::analysis::{analyze_video, get_run_report};
use crate::handlers::health::{health, ready};
use crate::handlers::videos::{get_video, trim_stored_video, upload_video};
use crate::handlers::workspace::get_workspace;
use crate::state::AppState;

/// Create the API router.
pub fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/videos", post(upload_video))
        .route("/videos/:video_id", get(get_video))
        .route("/videos/:video_id/trim", post(trim_stored_video))
        .route("/videos/:video_id/analyze", post(analyze_video))
        .route("/runs/:run_id", get(get_run_report))
        .route("/workspace", get(get_workspace));

    let health_routes = Router::new()
        .route("/health", get(health))
        .route("/healthz", get(health))
        .route("/ready", get(ready));

    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        // Uploads are whole videos; anything beyond the limit is refused
        // before it reaches a handler. Axum's default 2MB limit is
        // raised to match.
        .layer(DefaultBodyLimit::max(state.config.max_body_size))
        .layer(RequestBodyLimitLayer::new(state.config.max_body_size))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&state.config.cors_origins))
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_methods(Any)
            .allow_headers(Any)
            .allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
        CorsLayer::new()
            .allow_methods(Any)
            .allow_headers(Any)
            .allow_origin(origins)
    }
}
