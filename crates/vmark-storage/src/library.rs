//! Video library: upload saving and identifier resolution.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::error::{StorageError, StorageResult};

/// Video container extensions accepted for upload.
const ALLOWED_EXTENSIONS: [&str; 4] = ["mp4", "mov", "avi", "mkv"];

/// Filesystem-backed library of uploaded videos.
///
/// A logical video identifier is its sanitized filename inside the
/// library root.
#[derive(Debug, Clone)]
pub struct VideoLibrary {
    root: PathBuf,
}

impl VideoLibrary {
    /// Open a library rooted at `root`, creating the directory if needed.
    pub async fn open(root: impl Into<PathBuf>) -> StorageResult<Self> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await?;
        Ok(Self { root })
    }

    /// Library root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Save an uploaded video under its (sanitized) filename.
    ///
    /// Returns the identifier the video is stored under.
    pub async fn save_upload(&self, filename: &str, bytes: &[u8]) -> StorageResult<String> {
        let name = sanitize_filename(filename)?;

        if !has_allowed_extension(&name) {
            return Err(StorageError::invalid_name(format!(
                "unsupported extension on '{}', allowed: {}",
                name,
                ALLOWED_EXTENSIONS.join(", ")
            )));
        }

        let path = self.root.join(&name);
        tokio::fs::write(&path, bytes).await?;

        info!(path = %path.display(), bytes = bytes.len(), "Saved uploaded video");
        Ok(name)
    }

    /// Resolve a logical identifier to the stored file's path.
    pub async fn resolve(&self, video_id: &str) -> StorageResult<PathBuf> {
        let name = sanitize_filename(video_id)?;
        let path = self.root.join(&name);

        if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
            warn!(video_id = %video_id, "Video not found in library");
            return Err(StorageError::not_found(video_id));
        }

        Ok(path)
    }
}

/// Strip any path components, keeping the bare filename.
fn sanitize_filename(filename: &str) -> StorageResult<String> {
    let name = Path::new(filename)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();

    if name.is_empty() || name.starts_with('.') {
        return Err(StorageError::invalid_name(filename));
    }

    Ok(name.to_string())
}

fn has_allowed_extension(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| ALLOWED_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_save_and_resolve_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let library = VideoLibrary::open(dir.path()).await.unwrap();

        let id = library.save_upload("stream.mp4", b"fake video").await.unwrap();
        assert_eq!(id, "stream.mp4");

        let path = library.resolve(&id).await.unwrap();
        assert_eq!(tokio::fs::read(&path).await.unwrap(), b"fake video");
    }

    #[tokio::test]
    async fn test_upload_strips_path_components() {
        let dir = tempfile::tempdir().unwrap();
        let library = VideoLibrary::open(dir.path()).await.unwrap();

        let id = library
            .save_upload("../../etc/evil.mp4", b"data")
            .await
            .unwrap();
        assert_eq!(id, "evil.mp4");
        assert!(dir.path().join("evil.mp4").exists());
    }

    #[tokio::test]
    async fn test_upload_rejects_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let library = VideoLibrary::open(dir.path()).await.unwrap();

        let err = library.save_upload("notes.txt", b"data").await.unwrap_err();
        assert!(matches!(err, StorageError::InvalidName(_)));
    }

    #[tokio::test]
    async fn test_resolve_missing_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let library = VideoLibrary::open(dir.path()).await.unwrap();

        let err = library.resolve("absent.mp4").await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound(_)));
    }
}
