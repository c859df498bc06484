//! Crawl coordinator - breadth-first import orchestration
//!
//! This module contains the main crawl loop that coordinates one import run:
//! - Indexing the notes already in the vault
//! - Managing the frontier queue and visited set
//! - Fetching, parsing and writing each entry
//! - Linking same-script terms and maintaining aliases
//! - Creating verse notes and discovering the next hop
//! - Enforcing the depth and node budgets and honoring cancellation

use crate::config::{AliasMode, LinkType, Recipe};
use crate::crawler::frontier::{Frontier, QueueItem};
use crate::crawler::lemma::{link_terms, scan_vault, script_terms, DocumentIndex, LemmaIndex};
use crate::crawler::{Extractor, Fetcher};
use crate::ids::{SourceUrls, StrongsId};
use crate::output::{CrawlResult, Writer};
use crate::state::{Entry, NodeState};
use crate::storage::DocumentStore;
use std::collections::{HashMap, HashSet};
use tokio_util::sync::CancellationToken;

/// State that lives for exactly one run
#[derive(Default)]
struct RunState {
    frontier: Frontier,
    lemmas: LemmaIndex,
    documents: DocumentIndex,
    /// Verse keys already handled this run
    verses: HashSet<(String, u32, u32)>,
    result: CrawlResult,
}

/// Breadth-first importer
///
/// The crawler borrows the process-wide [`Fetcher`] so its cache and rate-limit
/// clock outlive the run. Everything else it tracks is dropped when
/// [`Crawler::run`] returns.
pub struct Crawler<'a, S: ?Sized> {
    recipe: &'a Recipe,
    fetcher: &'a mut Fetcher,
    store: &'a S,
    urls: SourceUrls,
    extractor: Extractor,
    cancel: Option<CancellationToken>,
}

impl<'a, S: DocumentStore + ?Sized> Crawler<'a, S> {
    /// Creates a crawler for one recipe
    ///
    /// # Arguments
    ///
    /// * `recipe` - Settings for the run
    /// * `fetcher` - The shared fetcher; its interval is set from the recipe
    /// * `store` - The vault to read and write notes
    /// * `urls` - Derives source URLs from ids
    pub fn new(
        recipe: &'a Recipe,
        fetcher: &'a mut Fetcher,
        store: &'a S,
        urls: SourceUrls,
    ) -> Self {
        Self {
            recipe,
            fetcher,
            store,
            extractor: Extractor::new(urls.clone()),
            urls,
            cancel: None,
        }
    }

    /// Installs a token checked before each queue item
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Runs a complete import starting at `seed`
    ///
    /// Node failures are recorded in the result and never stop the run. The run
    /// ends when the queue is empty, the node budget is spent, or the
    /// cancellation token fires.
    pub async fn run(&mut self, seed: StrongsId) -> CrawlResult {
        self.fetcher.set_min_interval(self.recipe.rate_limit());
        tracing::info!(
            "Starting import from {} (recipe '{}', max depth {}, max nodes {}, {:?} between fetches)",
            seed,
            self.recipe.id,
            self.recipe.max_depth,
            self.recipe.max_nodes,
            self.fetcher.min_interval()
        );

        let mut run = RunState {
            frontier: Frontier::with_seed(seed),
            ..RunState::default()
        };
        match scan_vault(self.store, &self.recipe.root_folder).await {
            Ok((lemmas, documents)) => {
                run.lemmas = lemmas;
                run.documents = documents;
            }
            Err(e) => tracing::warn!("Could not index existing notes: {}", e),
        }

        let max_nodes = self.recipe.max_nodes as usize;
        loop {
            if self.cancel.as_ref().is_some_and(|token| token.is_cancelled()) {
                tracing::info!("Import cancelled");
                run.result.cancelled = true;
                break;
            }

            if run.result.processed_count() >= max_nodes {
                tracing::info!("Node budget of {} reached", max_nodes);
                break;
            }

            let Some(item) = run.frontier.pop() else {
                tracing::info!("Queue is empty, import complete");
                break;
            };

            if !run.frontier.visit(item.id) {
                tracing::trace!("{} already visited, discarding", item.id);
                continue;
            }

            self.process(&mut run, item).await;
        }

        let result = run.result;
        tracing::info!(
            "Import finished: {} created, {} updated, {} skipped, {} errors ({} ids visited)",
            result.created,
            result.updated,
            result.skipped,
            result.errors.len(),
            run.frontier.visited_count()
        );
        result
    }

    /// Takes one visited item to a terminal state
    async fn process(&mut self, run: &mut RunState, item: QueueItem) {
        let QueueItem { id, depth } = item;
        tracing::debug!("{} -> {} (depth {})", id, NodeState::Processing, depth);

        let existing = match self.existing_import(run, id).await {
            Ok(existing) => existing,
            Err(e) => {
                self.fail(run, id, e);
                return;
            }
        };
        if existing && self.recipe.skip_existing {
            tracing::info!("{} skipped (already imported)", id);
            run.result.record(id, NodeState::Skipped);
            return;
        }

        let (entry, state) = match self.import(run, id).await {
            Ok(imported) => imported,
            Err(e) => {
                self.fail(run, id, e);
                return;
            }
        };
        tracing::info!(
            "[{}/{}] {} {}",
            run.result.processed_count() + 1,
            self.recipe.max_nodes,
            id,
            state
        );
        run.result.record(id, state);

        if let Err(e) = self.write_verses(run, &entry).await {
            tracing::error!("Error writing verse notes for {}: {}", id, e);
            run.result.errors.push((id, e.to_string()));
            return;
        }

        if depth < self.recipe.max_depth {
            let targets = entry.edge_targets(&self.recipe.follow_edges);
            let added = run.frontier.enqueue_unvisited(targets, depth + 1);
            tracing::debug!(
                "{} queued {} ids at depth {} ({} waiting)",
                id,
                added,
                depth + 1,
                run.frontier.len()
            );
        }
    }

    fn fail(&self, run: &mut RunState, id: StrongsId, error: crate::LexiconError) {
        tracing::error!("Error importing {}: {}", id, error);
        run.result.record_error(id, error.to_string());
    }

    /// True if `id` already has a fully imported note
    ///
    /// Answers from the vault index, falling back to the note's default path
    /// for notes the index could not attribute to an id.
    async fn existing_import(&self, run: &RunState, id: StrongsId) -> crate::Result<bool> {
        if let Some(doc) = run.documents.get(&id) {
            return Ok(!doc.placeholder);
        }
        let writer = Writer::new(self.store, self.recipe);
        let path = writer.file_path(&Entry::new(id, ""));
        Ok(self.store.exists(&path).await?)
    }

    /// Fetches, parses, links and writes one entry
    async fn import(&mut self, run: &mut RunState, id: StrongsId) -> crate::Result<(Entry, NodeState)> {
        let url = self.urls.entry(&id);
        let raw = self.fetcher.get(&url, true).await?;
        let mut entry = self.extractor.parse(id, &url, &raw);

        if let Some(lemma) = &entry.lemma {
            run.lemmas.insert(lemma, id);
        }

        let writer = Writer::new(self.store, self.recipe);
        if self.recipe.link_greek_hebrew {
            let resolved = link_entry_terms(&mut entry, &run.lemmas);
            if self.recipe.lemma_alias_mode == AliasMode::All {
                for (term, target) in &resolved {
                    self.alias_target(run, &writer, *target, term).await?;
                }
            }
        }

        let path = match run.documents.get(&id) {
            Some(doc) => doc.path.clone(),
            None => writer.file_path(&entry),
        };
        let outcome = writer.upsert_at(&path, &entry).await?;
        run.documents.mark_imported(id, path.as_str());

        if self.recipe.link_greek_hebrew {
            if let Some(lemma) = &entry.lemma {
                writer.ensure_alias(&path, lemma).await?;
            }
        }

        let state = if outcome.created() {
            NodeState::Created
        } else {
            NodeState::Updated
        };
        Ok((entry, state))
    }

    /// Records `term` as an alias on `target`'s note, creating a placeholder
    /// note when the target has none
    async fn alias_target(
        &self,
        run: &mut RunState,
        writer: &Writer<'_, S>,
        target: StrongsId,
        term: &str,
    ) -> crate::Result<()> {
        let path = match run.documents.get(&target) {
            Some(doc) => doc.path.clone(),
            None => {
                let path = writer.placeholder_path(target, Some(term));
                writer.create_placeholder(&path, target, Some(term)).await?;
                run.documents.insert(target, path.as_str(), true);
                path
            }
        };
        writer.ensure_alias(&path, term).await?;
        Ok(())
    }

    /// Creates a note for every verse the entry cites, once per verse per run
    async fn write_verses(&self, run: &mut RunState, entry: &Entry) -> crate::Result<()> {
        if !self.recipe.renders(LinkType::Scripture) {
            return Ok(());
        }

        let writer = Writer::new(self.store, self.recipe);
        for reference in &entry.links.scripture {
            let key = (reference.slug.clone(), reference.chapter, reference.verse);
            if run.verses.contains(&key) {
                continue;
            }
            if let Some(doc) = writer.ensure_verse(reference).await? {
                tracing::debug!("Created verse note {}", doc.path);
            }
            run.verses.insert(key);
        }
        Ok(())
    }
}

/// Rewrites same-script terms that resolve to other entries into links
///
/// # Returns
///
/// Each resolved term with the entry it links to, in first-seen order
fn link_entry_terms(entry: &mut Entry, lemmas: &LemmaIndex) -> Vec<(String, StrongsId)> {
    let language = entry.language();
    let mut resolved: Vec<(String, StrongsId)> = Vec::new();
    for text in entry.blocks.values() {
        for term in script_terms(text, language) {
            if resolved.iter().any(|(seen, _)| seen == term) {
                continue;
            }
            if let Some(target) = lemmas.get(term).filter(|target| *target != entry.id) {
                resolved.push((term.to_string(), target));
            }
        }
    }

    if !resolved.is_empty() {
        let lookup: HashMap<String, StrongsId> = resolved.iter().cloned().collect();
        for text in entry.blocks.values_mut() {
            *text = link_terms(text, language, &lookup);
        }
        tracing::debug!("{} links {} terms", entry.id, resolved.len());
    }
    resolved
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::SectionKey;

    fn id(s: &str) -> StrongsId {
        s.parse().unwrap()
    }

    #[test]
    fn test_link_entry_terms_skips_self_and_unknown() {
        let mut lemmas = LemmaIndex::default();
        lemmas.insert("λόγος", id("G3056"));
        lemmas.insert("λέγω", id("G3004"));

        let mut entry = Entry::new(id("G3056"), "");
        entry.set_block(SectionKey::WordOrigin, "λόγος from λέγω, compare ῥῆμα");
        entry.set_block(SectionKey::Thayers, "λέγω again");

        let resolved = link_entry_terms(&mut entry, &lemmas);
        assert_eq!(resolved, vec![("λέγω".to_string(), id("G3004"))]);
        assert_eq!(
            entry.block(SectionKey::WordOrigin),
            "λόγος from [[G3004|λέγω]], compare ῥῆμα"
        );
        assert_eq!(entry.block(SectionKey::Thayers), "[[G3004|λέγω]] again");
    }
}
