//! Sub-range extraction and trimming.

use std::path::Path;
use tracing::info;

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::{MediaError, MediaResult};
use crate::probe::get_duration;

/// Fixed codec pair for all produced artifacts.
const VIDEO_CODEC: &str = "libx264";
const AUDIO_CODEC: &str = "aac";

/// Re-encode the `[start, end)` sub-range of `input` into `output`.
///
/// Segments fed to the analysis service must be standalone playable
/// files, so this always re-encodes instead of stream-copying.
pub async fn encode_subrange(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    start: f64,
    end: f64,
) -> MediaResult<()> {
    let input = input.as_ref();
    let output = output.as_ref();

    if end < start {
        return Err(MediaError::invalid_range(format!(
            "end ({end:.3}s) precedes start ({start:.3}s)"
        )));
    }

    info!(
        input = %input.display(),
        output = %output.display(),
        start,
        end,
        "Encoding sub-range"
    );

    let cmd = FfmpegCommand::new(input, output)
        .seek(start)
        .duration(end - start)
        .video_codec(VIDEO_CODEC)
        .audio_codec(AUDIO_CODEC)
        .preset("veryfast");

    FfmpegRunner::new().run(&cmd).await?;

    info!(output = %output.display(), "Sub-range encoded");
    Ok(())
}

/// Trim `[start, end)` out of a stored video into a new artifact.
///
/// Unlike [`encode_subrange`], the requested range is validated against
/// the probed duration so callers can surface a client error.
pub async fn trim_video(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    start: f64,
    end: f64,
) -> MediaResult<()> {
    let input = input.as_ref();

    if start < 0.0 || end < 0.0 {
        return Err(MediaError::invalid_range(
            "start and end times cannot be negative".to_string(),
        ));
    }
    if start >= end {
        return Err(MediaError::invalid_range(format!(
            "start ({start:.3}s) must be before end ({end:.3}s)"
        )));
    }

    let duration = get_duration(input).await?;
    if start >= duration || end > duration {
        return Err(MediaError::invalid_range(format!(
            "range {start:.3}-{end:.3}s is outside the video's {duration:.3}s duration"
        )));
    }

    encode_subrange(input, output, start, end).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_subrange_rejects_inverted_range() {
        let err = encode_subrange("in.mp4", "out.mp4", 10.0, 5.0)
            .await
            .unwrap_err();
        assert!(matches!(err, MediaError::InvalidRange(_)));
    }

    #[tokio::test]
    async fn test_trim_rejects_negative_times() {
        let err = trim_video("in.mp4", "out.mp4", -1.0, 5.0).await.unwrap_err();
        assert!(matches!(err, MediaError::InvalidRange(_)));
    }

    #[tokio::test]
    async fn test_trim_rejects_start_after_end() {
        let err = trim_video("in.mp4", "out.mp4", 5.0, 5.0).await.unwrap_err();
        assert!(matches!(err, MediaError::InvalidRange(_)));
    }
}
