//! Pipeline orchestration.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{info, warn};

use vmark_models::{AnalysisReport, Moment, RunId, SegmentClip, SegmentWindow};
use vmark_storage::{hash_file, CacheStore, ReportStore};

use crate::analyzer::SegmentAnalyzer;
use crate::config::PipelineConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::media::MediaSource;
use crate::segmenter::{materialize_segments, plan_segments};
use crate::timeline::{rebase_moments, validate_moments};

/// Result of a completed pipeline run.
#[derive(Debug)]
pub struct RunOutcome {
    /// Identifier of this run.
    pub run_id: RunId,
    /// The assembled (or cache-served) report.
    pub report: AnalysisReport,
    /// Where the report document lives on disk.
    pub report_path: PathBuf,
}

/// One video analysis pipeline.
///
/// A pipeline value is cheap to clone and safe to share; each `run` is
/// an independent unit of work. The cache store is the only resource
/// shared between concurrent runs, and its writes are deterministic per
/// key, so races are harmless.
#[derive(Clone)]
pub struct AnalysisPipeline {
    config: PipelineConfig,
    media: Arc<dyn MediaSource>,
    analyzer: Arc<dyn SegmentAnalyzer>,
    reports: ReportStore,
    cache: CacheStore,
}

impl AnalysisPipeline {
    pub fn new(
        config: PipelineConfig,
        media: Arc<dyn MediaSource>,
        analyzer: Arc<dyn SegmentAnalyzer>,
        reports: ReportStore,
        cache: CacheStore,
    ) -> Self {
        Self {
            config,
            media,
            analyzer,
            reports,
            cache,
        }
    }

    /// Run the full pipeline for one video.
    ///
    /// Fatal errors are the probe, an invalid policy, a split that
    /// produced nothing, and report persistence. Everything else
    /// degrades: per-segment analysis failures contribute zero moments,
    /// a hash failure disables caching for the run, and a cache write
    /// failure is logged only.
    pub async fn run(&self, video_id: &str, source: &Path) -> PipelineResult<RunOutcome> {
        let run_id = RunId::new();
        info!(run_id = %run_id, video_id = %video_id, "Starting video analysis");

        // HASHING: failure downgrades to an uncached run.
        let content_hash = match hash_file(source).await {
            Ok(digest) => Some(digest),
            Err(e) => {
                warn!(run_id = %run_id, error = %e, "Hashing failed, caching disabled for this run");
                None
            }
        };

        // CACHE_CHECK: a hit short-circuits the entire run.
        if let Some(hash) = &content_hash {
            if let Some(report) = self.cache.load(hash).await {
                info!(run_id = %run_id, hash = %hash, "Cache hit, skipping analysis");
                return Ok(RunOutcome {
                    report: report.into_cached(),
                    report_path: self.cache.entry_path(hash),
                    run_id,
                });
            }
        }

        // DURATION_PROBE: fatal on failure, nothing downstream works
        // without a duration.
        let duration = self
            .media
            .probe_duration(source)
            .await
            .map_err(PipelineError::Probe)?;
        info!(run_id = %run_id, duration, "Probed video duration");

        // SEGMENTING
        let windows = plan_segments(duration, &self.config.policy)?;

        let run_dir = self.config.work_dir.join(run_id.as_str());
        let (clips, materialized) = if duration < self.config.policy.split_threshold {
            // Below the threshold the source itself is the one segment.
            (vec![SegmentClip::new(source, windows[0])], false)
        } else {
            info!(run_id = %run_id, segments = windows.len(), "Splitting video");
            tokio::fs::create_dir_all(&run_dir).await?;
            let clips =
                materialize_segments(self.media.as_ref(), source, &windows, &run_dir).await;
            if clips.is_empty() {
                let _ = tokio::fs::remove_dir_all(&run_dir).await;
                return Err(PipelineError::Segmentation(
                    "no planned segment could be materialized".to_string(),
                ));
            }
            (clips, true)
        };

        // ANALYZING + RECONCILING
        let moments = self.analyze_segments(&run_id, &clips).await;

        // VALIDATING
        let moments = validate_moments(moments, duration);

        // ASSEMBLING
        let segmentation: Vec<SegmentWindow> = clips.iter().map(|c| c.window()).collect();
        let report = AnalysisReport::new(video_id, moments, segmentation, duration);

        // Segment media is disposable once analysis is done.
        if materialized {
            if let Err(e) = tokio::fs::remove_dir_all(&run_dir).await {
                warn!(run_id = %run_id, error = %e, "Failed to clean up segment media");
            }
        }

        // PERSISTING: the report write is fatal, the cache write is not.
        let report_path = self
            .reports
            .write(&run_id, &report)
            .await
            .map_err(PipelineError::Persist)?;

        if let Some(hash) = &content_hash {
            if let Err(e) = self.cache.store(hash, &report).await {
                warn!(run_id = %run_id, hash = %hash, error = %e, "Failed to write cache entry");
            }
        }

        info!(
            run_id = %run_id,
            moments = report.metadata.total_moments,
            "Video analysis complete"
        );

        Ok(RunOutcome {
            run_id,
            report,
            report_path,
        })
    }

    /// Analyze clips one at a time, in ascending start order.
    ///
    /// Strictly sequential: the external service rate-limits aggressively,
    /// so segments are never analyzed concurrently. A failed segment
    /// contributes zero moments and the loop continues.
    async fn analyze_segments(&self, run_id: &RunId, clips: &[SegmentClip]) -> Vec<Moment> {
        let mut all_moments = Vec::new();

        for (index, clip) in clips.iter().enumerate() {
            info!(
                run_id = %run_id,
                segment = index + 1,
                total = clips.len(),
                path = %clip.path.display(),
                "Analyzing segment"
            );

            match self.analyzer.analyze_segment(&clip.path).await {
                Ok(local_moments) => {
                    all_moments.extend(rebase_moments(local_moments, clip.start));
                }
                Err(e) => {
                    warn!(
                        run_id = %run_id,
                        segment = index + 1,
                        error = %e,
                        "Segment analysis failed, contributing zero moments"
                    );
                }
            }
        }

        all_moments
    }
}
