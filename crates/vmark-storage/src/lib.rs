//! Local durable storage for the vmark backend.
//!
//! This crate provides:
//! - Chunked SHA-256 content hashing (cache-key derivation)
//! - The video library (upload saving and identifier resolution)
//! - The report store (run-identified JSON documents)
//! - The cache store (content-hash-keyed JSON documents)

pub mod cache;
pub mod error;
pub mod hash;
pub mod library;
pub mod reports;

pub use cache::CacheStore;
pub use error::{StorageError, StorageResult};
pub use hash::hash_file;
pub use library::VideoLibrary;
pub use reports::ReportStore;
