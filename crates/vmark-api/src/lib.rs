//! Axum HTTP API server.
//!
//! This crate provides:
//! - Multipart video upload into the library
//! - Trim and metadata endpoints over stored videos
//! - The analysis trigger and report retrieval
//! - The persisted workspace record

pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;
pub mod workspace;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
pub use workspace::{Workspace, WorkspaceStore};
