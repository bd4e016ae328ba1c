//! Segment planning and materialization.

use std::path::Path;

use tracing::{info, warn};

use vmark_models::{PolicyError, SegmentClip, SegmentPolicy, SegmentWindow};

use crate::media::MediaSource;

/// Plan the sub-ranges a video of `duration` seconds is analyzed in.
///
/// Videos below the policy's split threshold are analyzed whole. Above
/// it, windows of `policy.window` seconds advance by
/// `window - overlap`, so consecutive windows share exactly
/// `policy.overlap` seconds; the final window's end is clamped to the
/// video duration.
pub fn plan_segments(
    duration: f64,
    policy: &SegmentPolicy,
) -> Result<Vec<SegmentWindow>, PolicyError> {
    if duration < policy.split_threshold {
        return Ok(vec![SegmentWindow::new(0.0, duration)]);
    }

    let step = policy.step()?;

    let mut windows = Vec::new();
    let mut start = 0.0;
    while start < duration {
        windows.push(SegmentWindow::new(start, (start + policy.window).min(duration)));
        start += step;
    }

    Ok(windows)
}

/// Cut each planned window into its own media artifact under `work_dir`.
///
/// Materialization is best-effort: a window that fails to encode is
/// logged and dropped, and the remaining windows still produce clips.
pub async fn materialize_segments(
    media: &dyn MediaSource,
    source: &Path,
    windows: &[SegmentWindow],
    work_dir: &Path,
) -> Vec<SegmentClip> {
    let mut clips = Vec::with_capacity(windows.len());

    for (index, window) in windows.iter().enumerate() {
        let output = work_dir.join(format!("segment_{}.mp4", index + 1));

        match media
            .encode_subrange(source, &output, window.start, window.end)
            .await
        {
            Ok(()) => {
                info!(
                    segment = index + 1,
                    start = window.start,
                    end = window.end,
                    path = %output.display(),
                    "Materialized segment"
                );
                clips.push(SegmentClip::new(output, *window));
            }
            Err(e) => {
                warn!(
                    segment = index + 1,
                    start = window.start,
                    end = window.end,
                    error = %e,
                    "Failed to materialize segment, dropping it from the plan"
                );
            }
        }
    }

    clips
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::MockMediaSource;
    use vmark_media::MediaError;

    fn policy(window: f64, overlap: f64, split_threshold: f64) -> SegmentPolicy {
        SegmentPolicy {
            window,
            overlap,
            split_threshold,
        }
    }

    #[test]
    fn test_short_video_is_a_single_segment() {
        let windows = plan_segments(900.0, &SegmentPolicy::default()).unwrap();
        assert_eq!(windows, vec![SegmentWindow::new(0.0, 900.0)]);
    }

    #[test]
    fn test_zero_duration_yields_one_empty_segment() {
        let windows = plan_segments(0.0, &SegmentPolicy::default()).unwrap();
        assert_eq!(windows, vec![SegmentWindow::new(0.0, 0.0)]);
    }

    #[test]
    fn test_hour_long_video_produces_three_overlapping_segments() {
        let windows = plan_segments(3600.0, &SegmentPolicy::default()).unwrap();

        let starts: Vec<f64> = windows.iter().map(|w| w.start).collect();
        let ends: Vec<f64> = windows.iter().map(|w| w.end).collect();
        assert_eq!(starts, vec![0.0, 1320.0, 2640.0]);
        assert_eq!(ends, vec![1500.0, 2820.0, 3600.0]);
    }

    #[test]
    fn test_consecutive_starts_advance_by_step() {
        let windows = plan_segments(10_000.0, &SegmentPolicy::default()).unwrap();

        for pair in windows.windows(2) {
            assert_eq!(pair[1].start - pair[0].start, 1320.0);
        }
        assert_eq!(windows.last().unwrap().end, 10_000.0);
    }

    #[test]
    fn test_duration_at_threshold_splits() {
        let windows = plan_segments(1500.0, &SegmentPolicy::default()).unwrap();
        assert_eq!(
            windows,
            vec![
                SegmentWindow::new(0.0, 1500.0),
                SegmentWindow::new(1320.0, 1500.0),
            ]
        );
    }

    #[test]
    fn test_invalid_overlap_is_config_error() {
        let err = plan_segments(5000.0, &policy(100.0, 150.0, 1000.0)).unwrap_err();
        assert!(matches!(err, PolicyError::OverlapTooLarge { .. }));
    }

    #[tokio::test]
    async fn test_materialize_drops_failed_windows() {
        let dir = tempfile::tempdir().unwrap();
        let windows = vec![
            SegmentWindow::new(0.0, 1500.0),
            SegmentWindow::new(1320.0, 2820.0),
            SegmentWindow::new(2640.0, 3600.0),
        ];

        let mut media = MockMediaSource::new();
        media
            .expect_encode_subrange()
            .times(3)
            .returning(|_, output, start, _| {
                if start == 1320.0 {
                    Err(MediaError::ffmpeg_failed("encode blew up", None, Some(1)))
                } else {
                    std::fs::write(output, b"clip").unwrap();
                    Ok(())
                }
            });

        let clips =
            materialize_segments(&media, Path::new("source.mp4"), &windows, dir.path()).await;

        assert_eq!(clips.len(), 2);
        assert_eq!(clips[0].start, 0.0);
        assert_eq!(clips[1].start, 2640.0);
        assert!(clips.iter().all(|c| c.path.exists()));
    }
}
