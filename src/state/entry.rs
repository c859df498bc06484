//! Structured lexicon entries and their typed links

use crate::ids::{verse_display, verse_note_title, Language, SourceUrls, StrongsId};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

/// Fixed set of content sections a lexicon note may contain
///
/// Variants are declared in canonical render order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKey {
    /// Synthesized from the labelled lexical fields
    LexicalSummary,
    StrongsExhaustive,
    NasExhaustive,
    Thayers,
    BrownDriverBriggs,
    WordOrigin,
    TopicalLexicon,
    Englishmans,
}

impl SectionKey {
    /// All section keys in canonical order
    pub const ALL: [SectionKey; 8] = [
        Self::LexicalSummary,
        Self::StrongsExhaustive,
        Self::NasExhaustive,
        Self::Thayers,
        Self::BrownDriverBriggs,
        Self::WordOrigin,
        Self::TopicalLexicon,
        Self::Englishmans,
    ];

    /// Key used inside document markers and the `sections` header list
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LexicalSummary => "lexical_summary",
            Self::StrongsExhaustive => "strongs_exhaustive",
            Self::NasExhaustive => "nas_exhaustive",
            Self::Thayers => "thayers",
            Self::BrownDriverBriggs => "brown_driver_briggs",
            Self::WordOrigin => "word_origin",
            Self::TopicalLexicon => "topical_lexicon",
            Self::Englishmans => "englishmans",
        }
    }

    /// Header text searched for in the source page
    ///
    /// Returns None for the synthesized summary, which has no source header.
    pub fn source_header(&self) -> Option<&'static str> {
        match self {
            Self::LexicalSummary => None,
            Self::StrongsExhaustive => Some("Strong's Exhaustive Concordance"),
            Self::NasExhaustive => Some("NAS Exhaustive Concordance"),
            Self::Thayers => Some("Thayer's Greek Lexicon"),
            Self::BrownDriverBriggs => Some("Brown-Driver-Briggs"),
            Self::WordOrigin => Some("Word Origin"),
            Self::TopicalLexicon => Some("Topical Lexicon"),
            Self::Englishmans => Some("Englishman's Concordance"),
        }
    }

    /// Heading shown above the section in a rendered note
    pub fn heading(&self) -> &'static str {
        match self {
            Self::LexicalSummary => "Lexical Summary",
            other => other.source_header().unwrap_or("Section"),
        }
    }

    /// Machine marker delimiting the section's imported span
    pub fn marker(&self) -> String {
        format!("<!-- imported: {} -->", self.as_str())
    }
}

impl fmt::Display for SectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SectionKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| format!("unknown section key '{}'", s))
    }
}

/// Named relation categories that drive discovery
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EdgeType {
    #[serde(rename = "seeAlso")]
    SeeAlso,
    #[serde(rename = "relatedIds")]
    RelatedIds,
    #[serde(rename = "topical")]
    Topical,
}

impl EdgeType {
    pub const ALL: [EdgeType; 3] = [Self::SeeAlso, Self::RelatedIds, Self::Topical];
}

/// A verse reference found on an entry page
///
/// Equality, hashing and ordering only consider `(slug, chapter, verse)`; the
/// display string and URLs are derived from that key.
#[derive(Debug, Clone)]
pub struct ScriptureRef {
    pub slug: String,
    pub chapter: u32,
    pub verse: u32,
    /// Human-readable form, e.g. `John 3:16`
    pub display: String,
    pub verse_url: String,
    pub interlinear_url: String,
}

impl ScriptureRef {
    pub fn new(slug: &str, chapter: u32, verse: u32, urls: &SourceUrls) -> Self {
        let slug = slug.to_ascii_lowercase();
        Self {
            display: verse_display(&slug, chapter, verse),
            verse_url: urls.verse(&slug, chapter, verse),
            interlinear_url: urls.interlinear(&slug, chapter, verse),
            slug,
            chapter,
            verse,
        }
    }

    pub fn key(&self) -> (&str, u32, u32) {
        (&self.slug, self.chapter, self.verse)
    }

    /// Title of the companion verse note
    pub fn note_title(&self) -> String {
        verse_note_title(&self.slug, self.chapter, self.verse)
    }
}

impl PartialEq for ScriptureRef {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for ScriptureRef {}

impl std::hash::Hash for ScriptureRef {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl Ord for ScriptureRef {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

impl PartialOrd for ScriptureRef {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// The four typed link sets of an entry
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryLinks {
    pub see_also: BTreeSet<StrongsId>,
    pub related_ids: BTreeSet<StrongsId>,
    pub topical: BTreeSet<StrongsId>,
    /// Verse references in first-seen order, unique by `(slug, chapter, verse)`
    pub scripture: Vec<ScriptureRef>,
}

impl EntryLinks {
    /// Returns the id set behind an edge type
    pub fn edges(&self, edge: EdgeType) -> &BTreeSet<StrongsId> {
        match edge {
            EdgeType::SeeAlso => &self.see_also,
            EdgeType::RelatedIds => &self.related_ids,
            EdgeType::Topical => &self.topical,
        }
    }

    /// Adds a verse reference unless one with the same key is already present
    pub fn add_scripture(&mut self, reference: ScriptureRef) -> bool {
        if self.scripture.contains(&reference) {
            return false;
        }
        self.scripture.push(reference);
        true
    }
}

/// One imported lexicon entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub id: StrongsId,
    pub lemma: Option<String>,
    pub transliteration: Option<String>,
    pub phonetic: Option<String>,
    pub pronunciation: Option<String>,
    pub part_of_speech: Option<String>,
    pub definition: Option<String>,
    pub source_primary: String,
    pub source_alternates: Vec<String>,
    /// Every section key is present; sections not found map to empty text
    pub blocks: BTreeMap<SectionKey, String>,
    pub links: EntryLinks,
}

impl Entry {
    /// Creates an entry with every field unset and every section empty
    pub fn new(id: StrongsId, source_primary: impl Into<String>) -> Self {
        Self {
            id,
            lemma: None,
            transliteration: None,
            phonetic: None,
            pronunciation: None,
            part_of_speech: None,
            definition: None,
            source_primary: source_primary.into(),
            source_alternates: Vec::new(),
            blocks: SectionKey::ALL
                .into_iter()
                .map(|key| (key, String::new()))
                .collect(),
            links: EntryLinks::default(),
        }
    }

    pub fn language(&self) -> Language {
        self.id.language()
    }

    /// Text of a section, empty when the section was not found
    pub fn block(&self, key: SectionKey) -> &str {
        self.blocks.get(&key).map(String::as_str).unwrap_or("")
    }

    pub fn set_block(&mut self, key: SectionKey, text: impl Into<String>) {
        self.blocks.insert(key, text.into());
    }

    /// Union of the edge targets for the given edge types, without duplicates
    pub fn edge_targets(&self, edges: &BTreeSet<EdgeType>) -> BTreeSet<StrongsId> {
        edges
            .iter()
            .flat_map(|edge| self.links.edges(*edge).iter().copied())
            .collect()
    }
}
