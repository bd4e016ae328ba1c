//! Content hashing for cache keys.

use std::path::Path;

use sha2::{Digest, Sha256};
use tokio::fs::File;
use tokio::io::AsyncReadExt;
use tracing::debug;

use crate::error::StorageResult;

/// Read buffer size for hashing. Keeps memory bounded on multi-GB videos.
const HASH_CHUNK_BYTES: usize = 64 * 1024;

/// Compute the SHA-256 digest of a file's bytes as lowercase hex.
///
/// The digest depends on file content only, never on the path or
/// metadata, so identical uploads under different names share a cache
/// entry.
pub async fn hash_file(path: impl AsRef<Path>) -> StorageResult<String> {
    let path = path.as_ref();

    let mut file = File::open(path).await?;
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; HASH_CHUNK_BYTES];

    loop {
        let n = file.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }

    let digest = format!("{:x}", hasher.finalize());
    debug!(path = %path.display(), digest = %digest, "Hashed file");
    Ok(digest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_hash_is_deterministic() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"same bytes every time").unwrap();

        let first = hash_file(file.path()).await.unwrap();
        let second = hash_file(file.path()).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 64);
        assert!(first.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[tokio::test]
    async fn test_hash_depends_on_content_not_name() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("first.mp4");
        let b = dir.path().join("second.mkv");
        tokio::fs::write(&a, b"identical payload").await.unwrap();
        tokio::fs::write(&b, b"identical payload").await.unwrap();

        assert_eq!(
            hash_file(&a).await.unwrap(),
            hash_file(&b).await.unwrap()
        );
    }

    #[tokio::test]
    async fn test_hash_changes_with_content() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.bin");
        let b = dir.path().join("b.bin");
        tokio::fs::write(&a, b"payload one").await.unwrap();
        tokio::fs::write(&b, b"payload two").await.unwrap();

        assert_ne!(
            hash_file(&a).await.unwrap(),
            hash_file(&b).await.unwrap()
        );
    }

    #[tokio::test]
    async fn test_hash_unreadable_file_errors() {
        let err = hash_file("/nonexistent/video.mp4").await.unwrap_err();
        assert!(matches!(err, crate::StorageError::Io(_)));
    }

    #[tokio::test]
    async fn test_hash_spans_multiple_chunks() {
        let dir = tempfile::tempdir().unwrap();
        let big = dir.path().join("big.bin");
        tokio::fs::write(&big, vec![0xabu8; HASH_CHUNK_BYTES * 3 + 17])
            .await
            .unwrap();

        let digest = hash_file(&big).await.unwrap();
        assert_eq!(digest.len(), 64);
    }
}
