//! Segment planning models.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default segment length: 25 minutes.
pub const DEFAULT_WINDOW_SECS: f64 = 1500.0;

/// Default overlap between consecutive segments: 3 minutes.
pub const DEFAULT_OVERLAP_SECS: f64 = 180.0;

/// Default minimum duration above which a video is split at all.
pub const DEFAULT_SPLIT_THRESHOLD_SECS: f64 = 1500.0;

/// Invalid segmentation policy.
#[derive(Debug, Error, PartialEq)]
pub enum PolicyError {
    #[error("segment window must be positive, got {0}s")]
    NonPositiveWindow(f64),

    #[error("overlap ({overlap}s) must be smaller than window ({window}s)")]
    OverlapTooLarge { window: f64, overlap: f64 },
}

/// Windowing policy for splitting long videos.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SegmentPolicy {
    /// Segment length in seconds.
    pub window: f64,
    /// Overlap between consecutive segments in seconds.
    pub overlap: f64,
    /// Videos shorter than this are analyzed whole.
    pub split_threshold: f64,
}

impl Default for SegmentPolicy {
    fn default() -> Self {
        Self {
            window: DEFAULT_WINDOW_SECS,
            overlap: DEFAULT_OVERLAP_SECS,
            split_threshold: DEFAULT_SPLIT_THRESHOLD_SECS,
        }
    }
}

impl SegmentPolicy {
    /// Validate the policy and return the advance step between segment starts.
    pub fn step(&self) -> Result<f64, PolicyError> {
        if self.window <= 0.0 {
            return Err(PolicyError::NonPositiveWindow(self.window));
        }
        if self.overlap >= self.window {
            return Err(PolicyError::OverlapTooLarge {
                window: self.window,
                overlap: self.overlap,
            });
        }
        Ok(self.window - self.overlap)
    }
}

/// A planned sub-range of the source timeline, before materialization.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SegmentWindow {
    /// Absolute start in the source video, seconds.
    pub start: f64,
    /// Absolute end in the source video, seconds.
    pub end: f64,
}

impl SegmentWindow {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    /// Length of this window in seconds.
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// A materialized segment: an encoded media artifact plus the absolute
/// bounds it covers in the source video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentClip {
    /// Path to the segment's media file.
    pub path: PathBuf,
    /// Absolute start in the source video, seconds.
    pub start: f64,
    /// Absolute end in the source video, seconds.
    pub end: f64,
}

impl SegmentClip {
    pub fn new(path: impl Into<PathBuf>, window: SegmentWindow) -> Self {
        Self {
            path: path.into(),
            start: window.start,
            end: window.end,
        }
    }

    /// The window this clip covers.
    pub fn window(&self) -> SegmentWindow {
        SegmentWindow::new(self.start, self.end)
    }
}
