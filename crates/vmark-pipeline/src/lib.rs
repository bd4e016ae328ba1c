//! The segmentation-analysis-reconciliation pipeline.
//!
//! This crate provides:
//! - Pure segment planning over a windowing policy
//! - Best-effort segment materialization
//! - Sequential per-segment analysis with isolated failure handling
//! - Timestamp rebasing into the source timeline and range validation
//! - Content-hash caching and report assembly/persistence

pub mod analyzer;
pub mod config;
pub mod error;
pub mod media;
pub mod pipeline;
pub mod segmenter;
pub mod timeline;

pub use analyzer::SegmentAnalyzer;
pub use config::PipelineConfig;
pub use error::{PipelineError, PipelineResult};
pub use media::{FfmpegMediaSource, MediaSource};
pub use pipeline::{AnalysisPipeline, RunOutcome};
pub use segmenter::{materialize_segments, plan_segments};
pub use timeline::{rebase_moments, validate_moments};
