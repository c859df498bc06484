//! Document store trait and error types
//!
//! This module defines the interface the importer uses to read and write notes.
//! The store owns persistence; the importer only calls these primitives.

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur during document store operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Document not found: {0}")]
    NotFound(String),

    #[error("Document already exists: {0}")]
    AlreadyExists(String),

    #[error("Invalid document path: {0}")]
    InvalidPath(String),

    #[error("Store rejected write to {0}")]
    Rejected(String),

    #[error("IO error at {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Interface to a note vault
///
/// All paths are vault-relative, use `/` separators, and must pass
/// [`validate_path`]. Implementations must be safe to share across tasks, but
/// the importer itself only ever issues one operation at a time.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Returns true if a document or folder exists at `path`
    async fn exists(&self, path: &str) -> StorageResult<bool>;

    /// Reads a document's full text
    async fn read(&self, path: &str) -> StorageResult<String>;

    /// Creates a new document; fails with `AlreadyExists` if one is present
    async fn create(&self, path: &str, content: &str) -> StorageResult<()>;

    /// Replaces an existing document's text; fails with `NotFound` if absent
    async fn modify(&self, path: &str, content: &str) -> StorageResult<()>;

    /// Creates a folder and any missing parents; succeeds if it already exists
    async fn create_folder(&self, path: &str) -> StorageResult<()>;

    /// Lists document paths starting with `prefix`, sorted
    async fn list(&self, prefix: &str) -> StorageResult<Vec<String>>;
}

/// Checks that a path is a clean vault-relative path
///
/// Rejects empty paths, absolute paths, backslashes, and empty or `.`/`..`
/// segments. A single trailing slash is tolerated and removed.
pub fn validate_path(path: &str) -> StorageResult<String> {
    let trimmed = path.strip_suffix('/').unwrap_or(path);

    if trimmed.is_empty() || trimmed.starts_with('/') || trimmed.contains('\\') {
        return Err(StorageError::InvalidPath(path.to_string()));
    }

    if trimmed
        .split('/')
        .any(|segment| segment.is_empty() || segment == "." || segment == "..")
    {
        return Err(StorageError::InvalidPath(path.to_string()));
    }

    Ok(trimmed.to_string())
}

/// Returns the parent folder of a vault path, if it has one
pub fn parent_folder(path: &str) -> Option<&str> {
    path.rsplit_once('/').map(|(parent, _)| parent)
}
