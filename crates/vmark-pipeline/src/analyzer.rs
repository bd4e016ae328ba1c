//! Analysis capability seam.

use std::path::Path;

use async_trait::async_trait;

use vmark_analysis::{AnalysisResult, GeminiClient};
use vmark_models::Moment;

/// Per-segment moment extraction.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SegmentAnalyzer: Send + Sync {
    /// Analyze one segment's media, returning segment-local moments.
    async fn analyze_segment(&self, media: &Path) -> AnalysisResult<Vec<Moment>>;
}

#[async_trait]
impl SegmentAnalyzer for GeminiClient {
    async fn analyze_segment(&self, media: &Path) -> AnalysisResult<Vec<Moment>> {
        GeminiClient::analyze_segment(self, media).await
    }
}
