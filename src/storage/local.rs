//! Filesystem document store rooted at a vault directory

use crate::storage::traits::{validate_path, DocumentStore, StorageError, StorageResult};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Document store backed by a directory on the local filesystem
#[derive(Debug, Clone)]
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> StorageResult<(String, PathBuf)> {
        let validated = validate_path(path)?;
        let full = validated
            .split('/')
            .fold(self.root.clone(), |acc, segment| acc.join(segment));
        Ok((validated, full))
    }
}

fn io_error(path: &str, source: std::io::Error) -> StorageError {
    match source.kind() {
        ErrorKind::NotFound => StorageError::NotFound(path.to_string()),
        ErrorKind::AlreadyExists => StorageError::AlreadyExists(path.to_string()),
        _ => StorageError::Io {
            path: path.to_string(),
            source,
        },
    }
}

#[async_trait]
impl DocumentStore for LocalStore {
    async fn exists(&self, path: &str) -> StorageResult<bool> {
        let (path, full) = self.resolve(path)?;
        fs::try_exists(&full).await.map_err(|e| io_error(&path, e))
    }

    async fn read(&self, path: &str) -> StorageResult<String> {
        let (path, full) = self.resolve(path)?;
        fs::read_to_string(&full)
            .await
            .map_err(|e| io_error(&path, e))
    }

    async fn create(&self, path: &str, content: &str) -> StorageResult<()> {
        let (path, full) = self.resolve(path)?;
        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&full)
            .await
            .map_err(|e| io_error(&path, e))?;
        file.write_all(content.as_bytes())
            .await
            .map_err(|e| io_error(&path, e))?;
        file.flush().await.map_err(|e| io_error(&path, e))
    }

    async fn modify(&self, path: &str, content: &str) -> StorageResult<()> {
        let (path, full) = self.resolve(path)?;
        if !fs::try_exists(&full).await.map_err(|e| io_error(&path, e))? {
            return Err(StorageError::NotFound(path));
        }
        fs::write(&full, content)
            .await
            .map_err(|e| io_error(&path, e))
    }

    async fn create_folder(&self, path: &str) -> StorageResult<()> {
        let (path, full) = self.resolve(path)?;
        fs::create_dir_all(&full)
            .await
            .map_err(|e| io_error(&path, e))
    }

    async fn list(&self, prefix: &str) -> StorageResult<Vec<String>> {
        // Walk from the deepest folder fully named by the prefix
        let start = match prefix.rsplit_once('/') {
            Some((folder, _)) if !folder.is_empty() => self.resolve(folder)?.1,
            _ => self.root.clone(),
        };

        let mut found = Vec::new();
        let mut pending = vec![start];
        while let Some(dir) = pending.pop() {
            let mut entries = match fs::read_dir(&dir).await {
                Ok(entries) => entries,
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => return Err(io_error(&dir.display().to_string(), e)),
            };

            while let Some(entry) = entries
                .next_entry()
                .await
                .map_err(|e| io_error(&dir.display().to_string(), e))?
            {
                let file_type = entry
                    .file_type()
                    .await
                    .map_err(|e| io_error(&entry.path().display().to_string(), e))?;
                if file_type.is_dir() {
                    pending.push(entry.path());
                } else if let Some(relative) = self.relative(&entry.path()) {
                    if relative.starts_with(prefix) {
                        found.push(relative);
                    }
                }
            }
        }

        found.sort();
        Ok(found)
    }
}

impl LocalStore {
    fn relative(&self, full: &Path) -> Option<String> {
        let relative = full.strip_prefix(&self.root).ok()?;
        let segments: Option<Vec<&str>> = relative
            .components()
            .map(|component| component.as_os_str().to_str())
            .collect();
        Some(segments?.join("/"))
    }
}
