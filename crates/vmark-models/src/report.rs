//! Analysis report models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::moment::Moment;
use crate::segment::SegmentWindow;

/// Metadata attached to an analysis report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Number of moments in the report. Always equals `moments.len()`.
    pub total_moments: usize,

    /// When the report was assembled.
    pub processed_at: DateTime<Utc>,

    /// Absolute bounds of each segment the video was analyzed in.
    pub segmentation: Vec<SegmentWindow>,

    /// Duration of the source video in seconds.
    pub original_duration: f64,

    /// Logical identifier of the source video.
    pub video_id: String,

    /// True if this report was served from the content-hash cache.
    #[serde(default)]
    pub cached: bool,
}

/// The terminal artifact of a pipeline run.
///
/// Immutable after assembly; persisted as a JSON document in the report
/// store and, when a content hash was computed, in the cache store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Validated moments in segment order.
    pub moments: Vec<Moment>,

    /// Run metadata.
    pub metadata: ReportMetadata,
}

impl AnalysisReport {
    /// Assemble a report. The moment count invariant is enforced here.
    pub fn new(
        video_id: impl Into<String>,
        moments: Vec<Moment>,
        segmentation: Vec<SegmentWindow>,
        original_duration: f64,
    ) -> Self {
        let total_moments = moments.len();
        Self {
            moments,
            metadata: ReportMetadata {
                total_moments,
                processed_at: Utc::now(),
                segmentation,
                original_duration,
                video_id: video_id.into(),
                cached: false,
            },
        }
    }

    /// Mark the report as served from cache.
    pub fn into_cached(mut self) -> Self {
        self.metadata.cached = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_enforces_count_invariant() {
        let moments = vec![Moment::new("a", 1.0, 2.0), Moment::new("b", 3.0, 4.0)];
        let report = AnalysisReport::new("video.mp4", moments, vec![], 3600.0);
        assert_eq!(report.metadata.total_moments, report.moments.len());
        assert!(!report.metadata.cached);
    }

    #[test]
    fn test_into_cached() {
        let report = AnalysisReport::new("video.mp4", vec![], vec![], 10.0);
        assert!(report.into_cached().metadata.cached);
    }

    #[test]
    fn test_report_json_roundtrip() {
        let report = AnalysisReport::new(
            "game.mkv",
            vec![Moment::new("clutch", 30.0, 40.0)],
            vec![SegmentWindow::new(0.0, 1500.0)],
            1400.0,
        );
        let json = serde_json::to_string_pretty(&report).unwrap();
        let back: AnalysisReport = serde_json::from_str(&json).unwrap();
        assert_eq!(report, back);
    }
}
