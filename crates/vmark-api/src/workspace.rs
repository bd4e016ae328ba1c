//! Persisted workspace record.
//!
//! Tracks the video currently being worked on and the context produced
//! by its last analysis. The record is an explicit state object owned
//! by the API state and passed by handle, with a JSON document backing
//! it across restarts.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// The current working state of the service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Workspace {
    /// Identifier of the video currently loaded, if any.
    pub video_in: Option<String>,
    /// Context from the most recent analysis of that video, if any.
    pub context: Option<String>,
}

/// JSON-document store for the workspace record.
#[derive(Debug, Clone)]
pub struct WorkspaceStore {
    path: PathBuf,
}

impl WorkspaceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Load the persisted record, or a fresh one if the document is
    /// missing or unreadable. A corrupt record is logged and discarded,
    /// never fatal.
    pub async fn load(&self) -> Workspace {
        let data = match tokio::fs::read(&self.path).await {
            Ok(data) => data,
            Err(e) => {
                debug!(path = %self.path.display(), error = %e, "No workspace record, starting fresh");
                return Workspace::default();
            }
        };

        match serde_json::from_slice(&data) {
            Ok(workspace) => workspace,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Corrupt workspace record, starting fresh");
                Workspace::default()
            }
        }
    }

    /// Persist the record.
    pub async fn save(&self, workspace: &Workspace) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(workspace)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        tokio::fs::write(&self.path, json).await
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
