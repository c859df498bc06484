//! Run-scoped indexes over the vault and same-script term linking
//!
//! This module handles:
//! - `LemmaIndex`: lemma (and alias) text to entry id
//! - `DocumentIndex`: entry id to the note already holding it
//! - Building both from one scan of the root folder
//! - Finding runs of an alphabet in text and rewriting them into links

use crate::ids::{Language, StrongsId};
use crate::output::frontmatter::read_header;
use crate::storage::{DocumentStore, StorageResult};
use std::collections::HashMap;

/// Normalized lookup key for a lemma or term
///
/// Lowercases and drops Hebrew points and cantillation marks, so pointed and
/// unpointed spellings of a Hebrew word share one key.
pub fn lemma_key(term: &str) -> String {
    term.trim()
        .chars()
        .filter(|c| !matches!(c, '\u{0591}'..='\u{05C7}'))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Maps lemma text to the entry that defines it
#[derive(Debug, Clone, Default)]
pub struct LemmaIndex {
    map: HashMap<String, StrongsId>,
}

impl LemmaIndex {
    /// Maps `lemma` to `id`, replacing any previous mapping
    pub fn insert(&mut self, lemma: &str, id: StrongsId) {
        let key = lemma_key(lemma);
        if !key.is_empty() {
            self.map.insert(key, id);
        }
    }

    /// Maps `term` to `id` unless the term is already mapped
    pub fn insert_alias(&mut self, term: &str, id: StrongsId) {
        let key = lemma_key(term);
        if !key.is_empty() {
            self.map.entry(key).or_insert(id);
        }
    }

    pub fn get(&self, term: &str) -> Option<StrongsId> {
        self.map.get(&lemma_key(term)).copied()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// Where an entry's note lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedDocument {
    pub path: String,
    /// True for stand-in notes created by term linking
    pub placeholder: bool,
}

/// Maps entry ids to their notes in the vault
#[derive(Debug, Clone, Default)]
pub struct DocumentIndex {
    map: HashMap<StrongsId, IndexedDocument>,
}

impl DocumentIndex {
    pub fn get(&self, id: &StrongsId) -> Option<&IndexedDocument> {
        self.map.get(id)
    }

    /// Records a note; an id that is already indexed keeps its first note
    pub fn insert(&mut self, id: StrongsId, path: impl Into<String>, placeholder: bool) -> bool {
        if self.map.contains_key(&id) {
            return false;
        }
        self.map.insert(
            id,
            IndexedDocument {
                path: path.into(),
                placeholder,
            },
        );
        true
    }

    /// Records that `id` now has a fully imported note at `path`
    pub fn mark_imported(&mut self, id: StrongsId, path: impl Into<String>) {
        self.map.insert(
            id,
            IndexedDocument {
                path: path.into(),
                placeholder: false,
            },
        );
    }

    /// True if a non-placeholder note exists for `id`
    pub fn has_import(&self, id: &StrongsId) -> bool {
        self.map.get(id).is_some_and(|doc| !doc.placeholder)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// Builds both indexes from the notes under `root_folder`
///
/// Reads the `id`, `lemma`, `aliases` and `placeholder` header keys of every
/// `.md` note. Notes without a parseable `id` are ignored; unreadable notes are
/// logged and skipped.
///
/// # Returns
///
/// * `Ok((LemmaIndex, DocumentIndex))` - The indexes
/// * `Err(StorageError)` - The folder could not be listed
pub async fn scan_vault<S: DocumentStore + ?Sized>(
    store: &S,
    root_folder: &str,
) -> StorageResult<(LemmaIndex, DocumentIndex)> {
    let mut lemmas = LemmaIndex::default();
    let mut documents = DocumentIndex::default();

    let prefix = format!("{}/", root_folder.trim_matches('/'));
    for path in store.list(&prefix).await? {
        if !path.ends_with(".md") {
            continue;
        }
        let content = match store.read(&path).await {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!("Skipping unreadable note {}: {}", path, e);
                continue;
            }
        };

        let Some(header) = read_header(&content) else {
            continue;
        };
        let Some(id) = header
            .id
            .as_deref()
            .and_then(|raw| raw.trim().parse::<StrongsId>().ok())
        else {
            continue;
        };
        if !documents.insert(id, path.clone(), header.placeholder) {
            tracing::warn!("{} has more than one note; ignoring {}", id, path);
            continue;
        }

        if let Some(lemma) = &header.lemma {
            lemmas.insert(lemma, id);
        }
        for alias in &header.aliases {
            lemmas.insert_alias(alias, id);
        }
    }

    tracing::debug!(
        "Indexed {} notes and {} lemmas under {}",
        documents.len(),
        lemmas.len(),
        prefix
    );
    Ok((lemmas, documents))
}

/// Distinct runs of `language`'s own alphabet at least two characters long,
/// in first-seen order
pub fn script_terms(text: &str, language: Language) -> Vec<&str> {
    let mut terms: Vec<&str> = Vec::new();
    for (term, _) in script_runs(text, language) {
        if term.chars().count() >= 2 && !terms.contains(&term) {
            terms.push(term);
        }
    }
    terms
}

/// Every maximal run of script characters with its byte offset
fn script_runs(text: &str, language: Language) -> Vec<(&str, usize)> {
    let mut runs = Vec::new();
    let mut start: Option<usize> = None;
    for (offset, c) in text.char_indices() {
        match (language.is_script_char(c), start) {
            (true, None) => start = Some(offset),
            (false, Some(begin)) => {
                runs.push((&text[begin..offset], begin));
                start = None;
            }
            _ => {}
        }
    }
    if let Some(begin) = start {
        runs.push((&text[begin..], begin));
    }
    runs
}

/// Rewrites every occurrence of a resolved term into a link to its entry
///
/// Only whole runs are rewritten, so a term never matches inside a longer word.
pub fn link_terms(text: &str, language: Language, resolved: &HashMap<String, StrongsId>) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for (term, offset) in script_runs(text, language) {
        if let Some(id) = resolved.get(term) {
            out.push_str(&text[last..offset]);
            out.push_str(&format!("[[{}|{}]]", id, term));
            last = offset + term.len();
        }
    }
    out.push_str(&text[last..]);
    out
}
