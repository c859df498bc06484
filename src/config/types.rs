use crate::ids::DEFAULT_BASE_URL;
use crate::state::{EdgeType, SectionKey};
use serde::Deserialize;
use std::collections::BTreeSet;
use std::time::Duration;

/// Main configuration structure for Strongs-Graph
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
    #[serde(default)]
    pub recipe: Recipe,
}

/// Where lexicon and verse pages are fetched from
#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    /// Base URL every entry, verse and interlinear URL is derived from
    #[serde(rename = "base-url", default = "default_base_url")]
    pub base_url: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Root directory of the note vault on disk
    #[serde(rename = "vault-path")]
    pub vault_path: String,
}

/// Link categories that may be rendered as note links
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkType {
    /// Links between lexicon entries (see-also, related, topical)
    Strongs,
    /// Links to verse notes
    Scripture,
}

/// Which resolved terms are recorded as aliases on their target notes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AliasMode {
    /// Only the entry's own lemma
    #[default]
    Primary,
    /// Every resolved term found in the entry's text
    All,
}

/// Immutable settings governing one crawl and render run
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Recipe {
    pub id: String,
    pub include_sections: BTreeSet<SectionKey>,
    pub follow_edges: BTreeSet<EdgeType>,
    pub link_types: BTreeSet<LinkType>,
    /// Rewrite same-script terms into links to the entries defining them
    pub link_greek_hebrew: bool,
    pub lemma_alias_mode: AliasMode,
    /// Maximum depth of any enqueued id; the seed is depth 0
    pub max_depth: u32,
    /// Maximum number of ids processed in one run
    pub max_nodes: u32,
    /// Minimum time between two network fetches (milliseconds)
    pub rate_limit_ms: u64,
    pub skip_existing: bool,
    pub root_folder: String,
    pub scripture_root_folder: String,
    /// Note title template; supports `{id}`, `{lemma}` and `{transliteration}`
    pub note_title_pattern: String,
}

impl Default for Recipe {
    fn default() -> Self {
        Self {
            id: "default".to_string(),
            include_sections: SectionKey::ALL.into_iter().collect(),
            follow_edges: [EdgeType::SeeAlso, EdgeType::RelatedIds]
                .into_iter()
                .collect(),
            link_types: [LinkType::Strongs, LinkType::Scripture]
                .into_iter()
                .collect(),
            link_greek_hebrew: false,
            lemma_alias_mode: AliasMode::Primary,
            max_depth: 1,
            max_nodes: 25,
            rate_limit_ms: 1000,
            skip_existing: false,
            root_folder: "Lexicon/Strongs".to_string(),
            scripture_root_folder: "Lexicon/Scripture".to_string(),
            note_title_pattern: "{id}".to_string(),
        }
    }
}

impl Recipe {
    pub fn includes(&self, section: SectionKey) -> bool {
        self.include_sections.contains(&section)
    }

    pub fn follows(&self, edge: EdgeType) -> bool {
        self.follow_edges.contains(&edge)
    }

    pub fn renders(&self, link: LinkType) -> bool {
        self.link_types.contains(&link)
    }

    /// Enabled sections in canonical order
    pub fn sections(&self) -> impl Iterator<Item = SectionKey> + '_ {
        self.include_sections.iter().copied()
    }

    pub fn rate_limit(&self) -> Duration {
        Duration::from_millis(self.rate_limit_ms)
    }
}
