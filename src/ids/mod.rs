//! Identifier handling module for Strongs-Graph
//!
//! This module provides the Strong's number type, seed normalization, source URL
//! derivation, and scripture book naming.

mod normalize;
mod scripture;

use std::fmt;
use std::str::FromStr;
use url::Url;

// Re-export main functions
pub use normalize::{id_from_url, normalize_seed};
pub use scripture::{book_display_name, verse_display, verse_note_title};

/// Default host serving lexicon and verse pages
pub const DEFAULT_BASE_URL: &str = "https://biblehub.com";

/// Source language of a lexicon entry, derived from the id prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Language {
    /// Greek entries, prefix `G`
    Greek,
    /// Hebrew (and Aramaic) entries, prefix `H`
    Hebrew,
}

impl Language {
    /// Returns the single-letter id prefix for this language
    pub fn prefix(&self) -> char {
        match self {
            Self::Greek => 'G',
            Self::Hebrew => 'H',
        }
    }

    /// Returns the path segment used by the source site
    pub fn slug(&self) -> &'static str {
        match self {
            Self::Greek => "greek",
            Self::Hebrew => "hebrew",
        }
    }

    /// Maps an id prefix letter (either case) back to a language
    pub fn from_prefix(prefix: char) -> Option<Self> {
        match prefix.to_ascii_uppercase() {
            'G' => Some(Self::Greek),
            'H' => Some(Self::Hebrew),
            _ => None,
        }
    }

    /// Returns true if `c` belongs to this language's own alphabet
    ///
    /// Greek covers the Greek and Coptic block plus Greek Extended (polytonic).
    /// Hebrew covers the Hebrew block including points and cantillation marks,
    /// plus the presentation forms used for precomposed letters.
    pub fn is_script_char(&self, c: char) -> bool {
        match self {
            Self::Greek => matches!(c, '\u{0370}'..='\u{03FF}' | '\u{1F00}'..='\u{1FFF}'),
            Self::Hebrew => matches!(c, '\u{0591}'..='\u{05F4}' | '\u{FB1D}'..='\u{FB4F}'),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "greek" | "g" | "grc" => Ok(Self::Greek),
            "hebrew" | "h" | "heb" => Ok(Self::Hebrew),
            other => Err(format!("unknown language '{}'", other)),
        }
    }
}

/// A Strong's number: language prefix plus a positive numeric code
///
/// The textual form is the prefix letter followed by the number without leading
/// zeros, e.g. `G3056` or `H1254`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StrongsId {
    language: Language,
    number: u32,
}

impl StrongsId {
    /// Creates an id, returning None for the invalid number zero
    pub fn new(language: Language, number: u32) -> Option<Self> {
        (number > 0).then_some(Self { language, number })
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn number(&self) -> u32 {
        self.number
    }
}

impl fmt::Display for StrongsId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.language.prefix(), self.number)
    }
}

impl FromStr for StrongsId {
    type Err = crate::SeedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        normalize_seed(s, None)
    }
}

/// Derives every external URL the importer touches from one base URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceUrls {
    base: Url,
}

impl SourceUrls {
    /// Creates a URL deriver rooted at `base`
    ///
    /// A trailing slash is added to the base path so that relative joins keep
    /// any path prefix (useful for mirrors served under a sub-path).
    ///
    /// # Examples
    ///
    /// ```
    /// use strongs_graph::ids::{Language, SourceUrls, StrongsId};
    ///
    /// let urls = SourceUrls::new("https://biblehub.com").unwrap();
    /// let id = StrongsId::new(Language::Greek, 3056).unwrap();
    /// assert_eq!(urls.entry(&id), "https://biblehub.com/greek/3056.htm");
    /// ```
    pub fn new(base: &str) -> Result<Self, url::ParseError> {
        let mut base = Url::parse(base)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(Self { base })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Primary entry page for an id
    pub fn entry(&self, id: &StrongsId) -> String {
        self.join(&format!("{}/{}.htm", id.language().slug(), id.number()))
    }

    /// Secondary pages for an id, in a fixed order: the concordance page, then
    /// the Englishman's concordance page
    pub fn alternates(&self, id: &StrongsId) -> Vec<String> {
        let lang = id.language().slug();
        vec![
            self.join(&format!("strongs/{}/{}.htm", lang, id.number())),
            self.join(&format!("{}/strongs_{}.htm", lang, id.number())),
        ]
    }

    /// Verse text page
    pub fn verse(&self, slug: &str, chapter: u32, verse: u32) -> String {
        self.join(&format!("{}/{}-{}.htm", slug, chapter, verse))
    }

    /// Interlinear page for a verse
    pub fn interlinear(&self, slug: &str, chapter: u32, verse: u32) -> String {
        self.join(&format!("interlinear/{}/{}-{}.htm", slug, chapter, verse))
    }

    fn join(&self, relative: &str) -> String {
        match self.base.join(relative) {
            Ok(url) => url.to_string(),
            // Relative paths built above never fail to join onto a valid base
            Err(_) => format!("{}{}", self.base, relative),
        }
    }
}

impl Default for SourceUrls {
    fn default() -> Self {
        Self {
            base: Url::parse(DEFAULT_BASE_URL).expect("default base URL is valid"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn greek(n: u32) -> StrongsId {
        StrongsId::new(Language::Greek, n).unwrap()
    }

    #[test]
    fn test_id_display() {
        assert_eq!(greek(3056).to_string(), "G3056");
        assert_eq!(
            StrongsId::new(Language::Hebrew, 1254).unwrap().to_string(),
            "H1254"
        );
    }

    #[test]
    fn test_zero_is_not_an_id() {
        assert!(StrongsId::new(Language::Greek, 0).is_none());
    }

    #[test]
    fn test_language_from_prefix() {
        assert_eq!(Language::from_prefix('g'), Some(Language::Greek));
        assert_eq!(Language::from_prefix('H'), Some(Language::Hebrew));
        assert_eq!(Language::from_prefix('X'), None);
    }

    #[test]
    fn test_language_from_str() {
        assert_eq!("Greek".parse::<Language>().unwrap(), Language::Greek);
        assert_eq!("heb".parse::<Language>().unwrap(), Language::Hebrew);
        assert!("latin".parse::<Language>().is_err());
    }

    #[test]
    fn test_script_chars() {
        assert!(Language::Greek.is_script_char('λ'));
        assert!(Language::Greek.is_script_char('ῶ'));
        assert!(!Language::Greek.is_script_char('a'));
        assert!(Language::Hebrew.is_script_char('ב'));
        assert!(!Language::Hebrew.is_script_char('λ'));
    }

    #[test]
    fn test_entry_url() {
        let urls = SourceUrls::default();
        assert_eq!(urls.entry(&greek(1)), "https://biblehub.com/greek/1.htm");
    }

    #[test]
    fn test_alternate_urls() {
        let urls = SourceUrls::default();
        let id = StrongsId::new(Language::Hebrew, 430).unwrap();
        assert_eq!(
            urls.alternates(&id),
            vec![
                "https://biblehub.com/strongs/hebrew/430.htm".to_string(),
                "https://biblehub.com/hebrew/strongs_430.htm".to_string(),
            ]
        );
    }

    #[test]
    fn test_verse_urls() {
        let urls = SourceUrls::default();
        assert_eq!(urls.verse("john", 3, 16), "https://biblehub.com/john/3-16.htm");
        assert_eq!(
            urls.interlinear("1_john", 4, 8),
            "https://biblehub.com/interlinear/1_john/4-8.htm"
        );
    }

    #[test]
    fn test_base_with_sub_path_keeps_prefix() {
        let urls = SourceUrls::new("http://127.0.0.1:8080/mirror").unwrap();
        assert_eq!(urls.entry(&greek(2)), "http://127.0.0.1:8080/mirror/greek/2.htm");
    }
}
