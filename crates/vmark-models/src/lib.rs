//! Shared data models for the vmark backend.
//!
//! This crate provides Serde-serializable types for:
//! - Detected moments and their (possibly unparsed) timestamps
//! - Segment planning and materialized segment clips
//! - The final analysis report and its metadata
//! - Run identifiers

pub mod moment;
pub mod report;
pub mod run;
pub mod segment;

// Re-export common types
pub use moment::{Moment, TimeField};
pub use report::{AnalysisReport, ReportMetadata};
pub use run::RunId;
pub use segment::{PolicyError, SegmentClip, SegmentPolicy, SegmentWindow};
