//! Media capability seam.
//!
//! The pipeline consumes duration probing and sub-range encoding as a
//! capability rather than calling FFmpeg directly, which keeps the
//! orchestration logic testable without media files.

use std::path::Path;

use async_trait::async_trait;

use vmark_media::MediaResult;

/// Duration probing and sub-range encoding.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MediaSource: Send + Sync {
    /// Total playable duration of the container, in seconds.
    async fn probe_duration(&self, path: &Path) -> MediaResult<f64>;

    /// Encode `[start, end)` of `input` into a standalone artifact at `output`.
    async fn encode_subrange(
        &self,
        input: &Path,
        output: &Path,
        start: f64,
        end: f64,
    ) -> MediaResult<()>;
}

/// Production media source backed by ffprobe/FFmpeg.
#[derive(Debug, Clone, Default)]
pub struct FfmpegMediaSource;

impl FfmpegMediaSource {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl MediaSource for FfmpegMediaSource {
    async fn probe_duration(&self, path: &Path) -> MediaResult<f64> {
        vmark_media::get_duration(path).await
    }

    async fn encode_subrange(
        &self,
        input: &Path,
        output: &Path,
        start: f64,
        end: f64,
    ) -> MediaResult<()> {
        vmark_media::encode_subrange(input, output, start, end).await
    }
}
