//! Durable report store.

use std::path::{Path, PathBuf};

use tracing::info;

use vmark_models::{AnalysisReport, RunId};

use crate::error::{StorageError, StorageResult};

/// Filesystem-backed store of finished analysis reports.
///
/// Each run writes exactly one JSON document at a run-identified
/// location.
#[derive(Debug, Clone)]
pub struct ReportStore {
    dir: PathBuf,
}

impl ReportStore {
    /// Open a report store rooted at `dir`, creating it if needed.
    pub async fn open(dir: impl Into<PathBuf>) -> StorageResult<Self> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await?;
        Ok(Self { dir })
    }

    /// Path a run's report is written to.
    pub fn report_path(&self, run_id: &RunId) -> PathBuf {
        self.dir.join(format!("analysis-{}.json", run_id))
    }

    /// Persist a report for `run_id`, returning the written path.
    pub async fn write(&self, run_id: &RunId, report: &AnalysisReport) -> StorageResult<PathBuf> {
        let path = self.report_path(run_id);
        let json = serde_json::to_string_pretty(report)?;

        tokio::fs::write(&path, json)
            .await
            .map_err(|e| StorageError::write_failed(format!("{}: {}", path.display(), e)))?;

        info!(
            run_id = %run_id,
            path = %path.display(),
            moments = report.metadata.total_moments,
            "Persisted analysis report"
        );
        Ok(path)
    }

    /// Load a previously written report.
    pub async fn read(&self, run_id: &RunId) -> StorageResult<AnalysisReport> {
        let path = self.report_path(run_id);
        let data = tokio::fs::read(&path).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => StorageError::not_found(run_id.as_str()),
            _ => StorageError::Io(e),
        })?;
        Ok(serde_json::from_slice(&data)?)
    }

    /// Store directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}
