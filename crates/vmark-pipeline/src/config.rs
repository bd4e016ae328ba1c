//! Pipeline configuration.

use std::path::PathBuf;

use vmark_models::SegmentPolicy;

/// Pipeline configuration.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Windowing policy for long videos.
    pub policy: SegmentPolicy,
    /// Directory for disposable segment media, one subdirectory per run.
    pub work_dir: PathBuf,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            policy: SegmentPolicy::default(),
            work_dir: PathBuf::from("/tmp/vmark"),
        }
    }
}

impl PipelineConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = SegmentPolicy::default();

        Self {
            policy: SegmentPolicy {
                window: env_f64("VMARK_SEGMENT_WINDOW_SECS", defaults.window),
                overlap: env_f64("VMARK_SEGMENT_OVERLAP_SECS", defaults.overlap),
                split_threshold: env_f64("VMARK_SPLIT_THRESHOLD_SECS", defaults.split_threshold),
            },
            work_dir: std::env::var("VMARK_WORK_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("/tmp/vmark")),
        }
    }
}

fn env_f64(name: &str, default: f64) -> f64 {
    std::env::var(name)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}
