//! Output module for writing imported entries into the note vault
//!
//! This module handles:
//! - Rendering new entry, placeholder and verse notes
//! - Merging fresh section content into existing notes
//! - Reading and editing note headers
//! - Accumulating and printing run results

pub mod frontmatter;
mod markdown;
mod merge;
pub mod stats;

pub use markdown::{
    build_title, entry_link, link_scripture, render_new, render_placeholder, render_verse,
    sanitize_title, section_block, verse_link,
};
pub use merge::{merge_into_file, merge_section, owned_span};
pub use stats::{print_result, CrawlResult};

use crate::config::Recipe;
use crate::ids::StrongsId;
use crate::state::{Entry, ScriptureRef};
use crate::storage::{join_path, parent_folder, DocumentStore, StorageError};
use thiserror::Error;

/// Errors raised when the document store rejects a write
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("Failed to write {path}: {source}")]
    Store { path: String, source: StorageError },
}

impl WriteError {
    fn store(path: &str, source: StorageError) -> Self {
        Self::Store {
            path: path.to_string(),
            source,
        }
    }
}

/// A note as written to the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub path: String,
    pub content: String,
}

/// Whether an upsert created a new note or merged into an existing one
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created(Document),
    Merged(Document),
}

impl UpsertOutcome {
    pub fn created(&self) -> bool {
        matches!(self, Self::Created(_))
    }

    pub fn document(&self) -> &Document {
        match self {
            Self::Created(document) | Self::Merged(document) => document,
        }
    }
}

/// Renders entries into notes and writes them through a document store
///
/// The writer owns rendering and merge rules; persistence belongs to the store.
pub struct Writer<'a, S: ?Sized> {
    store: &'a S,
    recipe: &'a Recipe,
}

impl<'a, S: DocumentStore + ?Sized> Writer<'a, S> {
    pub fn new(store: &'a S, recipe: &'a Recipe) -> Self {
        Self { store, recipe }
    }

    pub fn recipe(&self) -> &Recipe {
        self.recipe
    }

    /// Title of an entry's note from the recipe's title pattern
    pub fn build_title(&self, entry: &Entry) -> String {
        build_title(&self.recipe.note_title_pattern, entry)
    }

    /// Deterministic path of an entry's note under the root folder
    pub fn file_path(&self, entry: &Entry) -> String {
        join_path(&[
            &self.recipe.root_folder,
            &format!("{}.md", self.build_title(entry)),
        ])
    }

    /// Path a placeholder for `id` would get, titled as if `term` were its lemma
    pub fn placeholder_path(&self, id: StrongsId, term: Option<&str>) -> String {
        let mut stub = Entry::new(id, "");
        stub.lemma = term.map(str::to_string);
        self.file_path(&stub)
    }

    /// Path of a verse's companion note
    pub fn verse_path(&self, reference: &ScriptureRef) -> String {
        join_path(&[
            &self.recipe.scripture_root_folder,
            &format!("{}.md", sanitize_title(&reference.note_title())),
        ])
    }

    /// Creates or merges the entry's note at its deterministic path
    pub async fn upsert(&self, entry: &Entry) -> Result<UpsertOutcome, WriteError> {
        let path = self.file_path(entry);
        self.upsert_at(&path, entry).await
    }

    /// Creates or merges the entry's note at `path`
    ///
    /// # Behavior
    ///
    /// 1. Ensure the destination folder exists
    /// 2. If a note exists at `path`, merge the enabled sections into it
    /// 3. Otherwise render a new note and create it
    ///
    /// # Returns
    ///
    /// * `Ok(UpsertOutcome)` - Which branch was taken and the written note
    /// * `Err(WriteError)` - The store rejected a read or write
    pub async fn upsert_at(&self, path: &str, entry: &Entry) -> Result<UpsertOutcome, WriteError> {
        self.ensure_folder(path).await?;

        let exists = self
            .store
            .exists(path)
            .await
            .map_err(|e| WriteError::store(path, e))?;

        if exists {
            let existing = self
                .store
                .read(path)
                .await
                .map_err(|e| WriteError::store(path, e))?;
            let merged = merge_into_file(&existing, entry, self.recipe);
            if merged != existing {
                self.store
                    .modify(path, &merged)
                    .await
                    .map_err(|e| WriteError::store(path, e))?;
                tracing::debug!("Merged {} into {}", entry.id, path);
            } else {
                tracing::debug!("{} already up to date", path);
            }
            return Ok(UpsertOutcome::Merged(Document {
                path: path.to_string(),
                content: merged,
            }));
        }

        let imported_at = chrono::Utc::now().to_rfc3339();
        let content = render_new(entry, self.recipe, &imported_at);
        self.store
            .create(path, &content)
            .await
            .map_err(|e| WriteError::store(path, e))?;
        tracing::debug!("Created {} for {}", path, entry.id);

        Ok(UpsertOutcome::Created(Document {
            path: path.to_string(),
            content,
        }))
    }

    /// Creates a placeholder note unless something already exists at `path`
    ///
    /// # Returns
    ///
    /// The created note, or None if the path was taken
    pub async fn create_placeholder(
        &self,
        path: &str,
        id: StrongsId,
        term: Option<&str>,
    ) -> Result<Option<Document>, WriteError> {
        let content = render_placeholder(&id, term, self.recipe);
        let created = self.create_if_absent(path, content).await?;
        if created.is_some() {
            tracing::debug!("Created placeholder {} for {}", path, id);
        }
        Ok(created)
    }

    /// Records `term` as an alias of the note at `path`
    ///
    /// # Returns
    ///
    /// True if the note was changed, false if the alias was already there or
    /// the note's header could not be parsed
    pub async fn ensure_alias(&self, path: &str, term: &str) -> Result<bool, WriteError> {
        let existing = self
            .store
            .read(path)
            .await
            .map_err(|e| WriteError::store(path, e))?;

        let Some(edited) = frontmatter::ensure_alias(&existing, term) else {
            return Ok(false);
        };
        self.store
            .modify(path, &edited)
            .await
            .map_err(|e| WriteError::store(path, e))?;
        tracing::debug!("Added alias '{}' to {}", term, path);
        Ok(true)
    }

    /// Creates a verse's companion note; an existing note is left untouched
    pub async fn ensure_verse(
        &self,
        reference: &ScriptureRef,
    ) -> Result<Option<Document>, WriteError> {
        let path = self.verse_path(reference);
        self.create_if_absent(&path, render_verse(reference)).await
    }

    async fn create_if_absent(
        &self,
        path: &str,
        content: String,
    ) -> Result<Option<Document>, WriteError> {
        self.ensure_folder(path).await?;
        let exists = self
            .store
            .exists(path)
            .await
            .map_err(|e| WriteError::store(path, e))?;
        if exists {
            return Ok(None);
        }

        self.store
            .create(path, &content)
            .await
            .map_err(|e| WriteError::store(path, e))?;
        Ok(Some(Document {
            path: path.to_string(),
            content,
        }))
    }

    async fn ensure_folder(&self, path: &str) -> Result<(), WriteError> {
        let Some(folder) = parent_folder(path) else {
            return Ok(());
        };
        let exists = self
            .store
            .exists(folder)
            .await
            .map_err(|e| WriteError::store(folder, e))?;
        if !exists {
            self.store
                .create_folder(folder)
                .await
                .map_err(|e| WriteError::store(folder, e))?;
        }
        Ok(())
    }
}
