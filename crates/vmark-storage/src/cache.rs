//! Content-hash report cache.
//!
//! Stores a full `AnalysisReport` keyed by the SHA-256 digest of the
//! source file's bytes. Identical bytes resolve to the same entry, so
//! repeated analysis of the same upload is answered without touching
//! the analysis service. Two runs racing on the same key write the same
//! deterministic value, so last-writer-wins needs no locking.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use vmark_models::AnalysisReport;

use crate::error::StorageResult;

/// Filesystem-backed cache of analysis reports.
#[derive(Debug, Clone)]
pub struct CacheStore {
    dir: PathBuf,
}

impl CacheStore {
    /// Open a cache rooted at `dir`, creating it if needed.
    pub async fn open(dir: impl Into<PathBuf>) -> StorageResult<Self> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await?;
        Ok(Self { dir })
    }

    /// Path of the entry for a content hash.
    pub fn entry_path(&self, content_hash: &str) -> PathBuf {
        self.dir.join(format!("{}.json", content_hash))
    }

    /// Look up a cached report.
    ///
    /// Returns `None` if:
    /// - No entry exists for the hash
    /// - The entry fails to read or deserialize (corrupt data)
    ///
    /// All of these cases are treated as cache misses.
    pub async fn load(&self, content_hash: &str) -> Option<AnalysisReport> {
        let path = self.entry_path(content_hash);

        let data = match tokio::fs::read(&path).await {
            Ok(data) => data,
            Err(e) => {
                debug!(hash = %content_hash, error = %e, "Cache miss (read failed)");
                return None;
            }
        };

        match serde_json::from_slice::<AnalysisReport>(&data) {
            Ok(report) => {
                debug!(hash = %content_hash, "Cache hit");
                Some(report)
            }
            Err(e) => {
                warn!(hash = %content_hash, error = %e, "Cache miss (corrupt entry)");
                None
            }
        }
    }

    /// Write a report under a content hash.
    pub async fn store(&self, content_hash: &str, report: &AnalysisReport) -> StorageResult<()> {
        let path = self.entry_path(content_hash);
        let json = serde_json::to_string_pretty(report)?;
        tokio::fs::write(&path, json).await?;

        debug!(hash = %content_hash, path = %path.display(), "Cached analysis report");
        Ok(())
    }

    /// Check whether an entry exists.
    pub async fn contains(&self, content_hash: &str) -> bool {
        tokio::fs::try_exists(self.entry_path(content_hash))
            .await
            .unwrap_or(false)
    }

    /// Cache directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vmark_models::Moment;

    fn sample_report() -> AnalysisReport {
        AnalysisReport::new(
            "vod.mkv",
            vec![Moment::new("pentakill", 100.0, 130.0)],
            vec![],
            2000.0,
        )
    }

    #[tokio::test]
    async fn test_store_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let cache = CacheStore::open(dir.path()).await.unwrap();

        let report = sample_report();
        cache.store("abc123", &report).await.unwrap();

        assert!(cache.contains("abc123").await);
        assert_eq!(cache.load("abc123").await.unwrap(), report);
    }

    #[tokio::test]
    async fn test_missing_entry_is_miss() {
        let dir = tempfile::tempdir().unwrap();
        let cache = CacheStore::open(dir.path()).await.unwrap();

        assert!(cache.load("deadbeef").await.is_none());
        assert!(!cache.contains("deadbeef").await);
    }

    #[tokio::test]
    async fn test_corrupt_entry_is_miss() {
        let dir = tempfile::tempdir().unwrap();
        let cache = CacheStore::open(dir.path()).await.unwrap();

        tokio::fs::write(cache.entry_path("bad"), b"{ not json }")
            .await
            .unwrap();

        assert!(cache.load("bad").await.is_none());
    }

    #[tokio::test]
    async fn test_overwrite_same_key() {
        let dir = tempfile::tempdir().unwrap();
        let cache = CacheStore::open(dir.path()).await.unwrap();

        let report = sample_report();
        cache.store("k", &report).await.unwrap();
        cache.store("k", &report).await.unwrap();

        assert_eq!(cache.load("k").await.unwrap(), report);
    }
}
