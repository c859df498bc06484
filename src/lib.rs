//! Strongs-Graph: a lexicon knowledge-graph importer
//!
//! This crate fetches Strong's lexicon entries, extracts their lexical fields and
//! typed cross-references, and writes them as interlinked markdown notes. New
//! entries are discovered by following relations out of already-imported ones
//! under a bounded breadth-first crawl.

pub mod config;
pub mod crawler;
pub mod ids;
pub mod output;
pub mod state;
pub mod storage;

use thiserror::Error;

/// Main error type for Strongs-Graph operations
#[derive(Debug, Error)]
pub enum LexiconError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid seed: {0}")]
    Seed(#[from] SeedError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Write error: {0}")]
    Write(#[from] output::WriteError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Errors raised while turning a raw seed string into an entry id
///
/// These are reported before any network activity takes place.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SeedError {
    #[error("Seed is empty")]
    Empty,

    #[error("Cannot interpret '{0}' as a Strong's number")]
    Malformed(String),

    #[error("Bare number '{0}' needs a language hint (greek or hebrew)")]
    MissingLanguage(String),

    #[error("Strong's numbers start at 1, got '{0}'")]
    ZeroNumber(String),
}

/// Errors raised by the fetch layer
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("Unexpected status {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Strongs-Graph operations
pub type Result<T> = std::result::Result<T, LexiconError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for seed normalization
pub type SeedResult<T> = std::result::Result<T, SeedError>;

// Re-export commonly used types
pub use config::{Config, Recipe};
pub use crawler::{Crawler, Extractor, Fetcher};
pub use ids::{normalize_seed, Language, SourceUrls, StrongsId};
pub use output::{CrawlResult, UpsertOutcome, Writer};
pub use state::{Entry, NodeState, ScriptureRef, SectionKey};
pub use storage::{DocumentStore, LocalStore, MemoryStore};
