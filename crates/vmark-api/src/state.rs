//! Application state.

use std::sync::Arc;

use tokio::sync::RwLock;

use vmark_analysis::GeminiClient;
use vmark_pipeline::{AnalysisPipeline, FfmpegMediaSource, PipelineConfig};
use vmark_storage::{CacheStore, ReportStore, VideoLibrary};

use crate::config::ApiConfig;
use crate::workspace::{Workspace, WorkspaceStore};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub library: VideoLibrary,
    pub reports: ReportStore,
    pub pipeline: Arc<AnalysisPipeline>,
    pub workspace: Arc<RwLock<Workspace>>,
    pub workspace_store: WorkspaceStore,
}

impl AppState {
    /// Create new application state.
    pub async fn new(config: ApiConfig) -> Result<Self, Box<dyn std::error::Error>> {
        tokio::fs::create_dir_all(&config.data_dir).await?;

        let library = VideoLibrary::open(config.media_dir()).await?;
        let reports = ReportStore::open(config.reports_dir()).await?;
        let cache = CacheStore::open(config.cache_dir()).await?;

        let analyzer = GeminiClient::new()?;
        let pipeline = AnalysisPipeline::new(
            PipelineConfig::from_env(),
            Arc::new(FfmpegMediaSource::new()),
            Arc::new(analyzer),
            reports.clone(),
            cache,
        );

        let workspace_store = WorkspaceStore::new(config.workspace_path());
        let workspace = workspace_store.load().await;

        Ok(Self {
            config,
            library,
            reports,
            pipeline: Arc::new(pipeline),
            workspace: Arc::new(RwLock::new(workspace)),
            workspace_store,
        })
    }

    /// Mutate the workspace record and persist it.
    ///
    /// A failed write keeps the in-memory record authoritative and is
    /// surfaced to the caller.
    pub async fn update_workspace<F>(&self, mutate: F) -> std::io::Result<Workspace>
    where
        F: FnOnce(&mut Workspace),
    {
        let mut guard = self.workspace.write().await;
        mutate(&mut guard);
        let snapshot = guard.clone();
        drop(guard);

        self.workspace_store.save(&snapshot).await?;
        Ok(snapshot)
    }
}
