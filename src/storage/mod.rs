//! Storage module for persisting imported notes
//!
//! This module defines the document store interface the importer writes through,
//! plus two implementations:
//! - `LocalStore`: a vault directory on the local filesystem
//! - `MemoryStore`: an in-memory vault, used by tests and dry runs

mod local;
mod memory;
mod traits;

pub use local::LocalStore;
pub use memory::MemoryStore;
pub use traits::{parent_folder, validate_path, DocumentStore, StorageError, StorageResult};

/// Joins vault path segments with `/`, ignoring empty segments and stray slashes
///
/// # Examples
///
/// ```
/// use strongs_graph::storage::join_path;
///
/// assert_eq!(join_path(&["Lexicon/Strongs/", "G1.md"]), "Lexicon/Strongs/G1.md");
/// ```
pub fn join_path(segments: &[&str]) -> String {
    segments
        .iter()
        .map(|segment| segment.trim_matches('/'))
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}
