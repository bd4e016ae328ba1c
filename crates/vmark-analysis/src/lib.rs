//! Client for the external multimodal analysis service.
//!
//! This crate wraps one service interaction: upload a segment's media,
//! request structured moment extraction against a fixed schema, parse
//! and coerce the response, and delete the uploaded artifact.

pub mod client;
pub mod error;

pub use client::GeminiClient;
pub use error::{AnalysisError, AnalysisResult};
