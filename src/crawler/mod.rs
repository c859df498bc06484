//! Crawler module for fetching, parsing and importing lexicon entries
//!
//! This module contains the core import logic, including:
//! - Rate-limited, cached HTTP fetching
//! - Heuristic extraction of fields, sections and links
//! - The breadth-first frontier and visited set
//! - Lemma and note indexes with same-script term linking
//! - Overall crawl coordination

mod coordinator;
mod fetcher;
mod frontier;
pub mod lemma;
mod parser;

pub use coordinator::Crawler;
pub use fetcher::{build_http_client, Fetcher};
pub use frontier::{Frontier, QueueItem};
pub use lemma::{lemma_key, DocumentIndex, LemmaIndex};
pub use parser::{citations, html_to_text, Extractor, SECTION_WINDOW_CHARS};

use crate::config::Config;
use crate::ids::{SourceUrls, StrongsId};
use crate::storage::DocumentStore;
use crate::{ConfigError, LexiconError};
use tokio_util::sync::CancellationToken;

/// Runs a complete import from one seed with settings from a config file
///
/// This is the main entry point for a one-shot import. It will:
/// 1. Derive source URLs from the configured base URL
/// 2. Build the HTTP client and fetcher
/// 3. Crawl breadth-first from the seed, writing notes into `store`
///
/// # Arguments
///
/// * `config` - The validated configuration
/// * `store` - The vault to write into
/// * `seed` - The normalized seed id
/// * `cancel` - Fires to stop the run before the next queue item
///
/// # Returns
///
/// * `Ok(CrawlResult)` - The run's counts and per-node errors
/// * `Err(LexiconError)` - The run could not start
pub async fn import<S: DocumentStore + ?Sized>(
    config: &Config,
    store: &S,
    seed: StrongsId,
    cancel: CancellationToken,
) -> Result<crate::output::CrawlResult, LexiconError> {
    let urls = SourceUrls::new(&config.source.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("{}: {}", config.source.base_url, e)))?;
    let mut fetcher = Fetcher::from_user_agent(&config.user_agent, config.recipe.rate_limit())
        .map_err(|source| crate::FetchError::Http {
            url: config.source.base_url.clone(),
            source,
        })?;

    let mut crawler =
        Crawler::new(&config.recipe, &mut fetcher, store, urls).with_cancellation(cancel);
    Ok(crawler.run(seed).await)
}
