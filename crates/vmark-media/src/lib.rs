//! FFmpeg CLI wrapper for video processing.
//!
//! This crate provides:
//! - Type-safe FFmpeg command building
//! - Duration/stream probing via ffprobe
//! - Sub-range extraction with a fixed re-encode codec pair
//! - Trim operation with bounds validation

pub mod command;
pub mod encode;
pub mod error;
pub mod probe;

pub use command::{FfmpegCommand, FfmpegRunner};
pub use encode::{encode_subrange, trim_video};
pub use error::{MediaError, MediaResult};
pub use probe::{get_duration, probe_video, VideoInfo};
