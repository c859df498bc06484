//! In-memory document store

use crate::storage::traits::{parent_folder, validate_path, DocumentStore, StorageError, StorageResult};
use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};
use tokio::sync::RwLock;

/// In-memory document store
///
/// Documents live in a `BTreeMap` behind a [`RwLock`] so all trait methods work
/// on `&self`. Like a filesystem, creating a document requires its parent folder
/// to exist. Writes under a read-only prefix are rejected, which lets tests
/// exercise write failures.
#[derive(Debug, Default)]
pub struct MemoryStore {
    files: RwLock<BTreeMap<String, String>>,
    folders: RwLock<BTreeSet<String>>,
    read_only: Vec<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with documents (and their parent folders)
    ///
    /// Panics on an invalid path; test setup that is wrong should not pass.
    pub fn with_files<P, C>(files: impl IntoIterator<Item = (P, C)>) -> Self
    where
        P: Into<String>,
        C: Into<String>,
    {
        let mut map = BTreeMap::new();
        let mut folders = BTreeSet::new();
        for (path, content) in files {
            let path = path.into();
            let Ok(validated) = validate_path(&path) else {
                panic!("MemoryStore::with_files: invalid path {}", path);
            };
            add_ancestors(&mut folders, &validated);
            map.insert(validated, content.into());
        }
        Self {
            files: RwLock::new(map),
            folders: RwLock::new(folders),
            read_only: Vec::new(),
        }
    }

    /// Rejects every create/modify under `prefix`
    pub fn with_read_only_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.read_only.push(prefix.into());
        self
    }

    /// Snapshot of every document, for assertions
    pub async fn snapshot(&self) -> BTreeMap<String, String> {
        self.files.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.files.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.files.read().await.is_empty()
    }

    fn check_writable(&self, path: &str) -> StorageResult<()> {
        if self.read_only.iter().any(|prefix| path.starts_with(prefix)) {
            return Err(StorageError::Rejected(path.to_string()));
        }
        Ok(())
    }
}

fn add_ancestors(folders: &mut BTreeSet<String>, path: &str) {
    let mut current = parent_folder(path);
    while let Some(folder) = current {
        folders.insert(folder.to_string());
        current = parent_folder(folder);
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn exists(&self, path: &str) -> StorageResult<bool> {
        let path = validate_path(path)?;
        if self.files.read().await.contains_key(&path) {
            return Ok(true);
        }
        Ok(self.folders.read().await.contains(&path))
    }

    async fn read(&self, path: &str) -> StorageResult<String> {
        let path = validate_path(path)?;
        self.files
            .read()
            .await
            .get(&path)
            .cloned()
            .ok_or(StorageError::NotFound(path))
    }

    async fn create(&self, path: &str, content: &str) -> StorageResult<()> {
        let path = validate_path(path)?;
        self.check_writable(&path)?;

        if let Some(parent) = parent_folder(&path) {
            if !self.folders.read().await.contains(parent) {
                return Err(StorageError::NotFound(parent.to_string()));
            }
        }

        let mut files = self.files.write().await;
        if files.contains_key(&path) {
            return Err(StorageError::AlreadyExists(path));
        }
        files.insert(path, content.to_string());
        Ok(())
    }

    async fn modify(&self, path: &str, content: &str) -> StorageResult<()> {
        let path = validate_path(path)?;
        self.check_writable(&path)?;

        let mut files = self.files.write().await;
        match files.get_mut(&path) {
            Some(existing) => {
                *existing = content.to_string();
                Ok(())
            }
            None => Err(StorageError::NotFound(path)),
        }
    }

    async fn create_folder(&self, path: &str) -> StorageResult<()> {
        let path = validate_path(path)?;
        let mut folders = self.folders.write().await;
        add_ancestors(&mut folders, &path);
        folders.insert(path);
        Ok(())
    }

    async fn list(&self, prefix: &str) -> StorageResult<Vec<String>> {
        Ok(self
            .files
            .read()
            .await
            .keys()
            .filter(|path| path.starts_with(prefix))
            .cloned()
            .collect())
    }
}
