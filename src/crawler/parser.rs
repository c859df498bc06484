//! Heuristic extractor turning a lexicon entry page into an [`Entry`]
//!
//! This module handles:
//! - Stripping markup to line-oriented plain text
//! - Reading labelled lexical fields ("Original Word: ...")
//! - Slicing each source section as a fixed window after its header
//! - Collecting see-also, related, topical and scripture links
//!
//! Extraction is best-effort and never fails. Section boundaries are not known,
//! so a window may run into the next section or into unrelated page text.

use crate::ids::{Language, SourceUrls, StrongsId};
use crate::state::{Entry, ScriptureRef, SectionKey};
use regex::Regex;
use scraper::{ElementRef, Html};
use std::collections::BTreeSet;
use std::sync::LazyLock;

/// Number of characters kept after a section header
///
/// Sections have no reliable end marker in the source page, so a section is
/// this many characters of text after its header. A short section picks up the
/// start of the one after it.
pub const SECTION_WINDOW_CHARS: usize = 1200;

macro_rules! regex {
    ($name:ident, $regex:expr) => {
        static $name: LazyLock<Regex> = LazyLock::new(|| Regex::new($regex).unwrap());
    };
}

macro_rules! label {
    ($name:ident, $label:literal) => {
        regex!($name, concat!(r"(?im)^[ \t]*", $label, r"[ \t]*:[ \t]*(.+)$"));
    };
}

label!(ORIGINAL_WORD, "Original Word");
label!(TRANSLITERATION, "Transliteration");
label!(PHONETIC, "Phonetic Spelling");
label!(PRONUNCIATION, "Pronunciation");
label!(PART_OF_SPEECH, "Part of Speech");
label!(DEFINITION, r"(?:Short\s+)?Definition");

regex!(SEE_ALSO, r"(?i)\bsee\s+(?:also\s+)?([GH])?\s?(\d{1,5})\b");
regex!(PREFIXED_CITATION, r"\b([GH])(\d{1,5})\b");
regex!(NAMED_CITATION, r"(?i)\bstrong['’]?s\s+(greek|hebrew)\s+(\d{1,5})\b");
regex!(BARE_CITATION, r"(?i)\b(?:from|of|and|see|compare|cf\.?)\s+(\d{1,5})\b");
regex!(INTERLINEAR_LINK, r"(?i)interlinear/([a-z0-9_]+)/(\d{1,3})-(\d{1,3})\.htm");

/// One header pattern per non-synthesized section, matched case-insensitively
/// and tolerant of typographic apostrophes
static SECTION_HEADERS: LazyLock<Vec<(SectionKey, Regex)>> = LazyLock::new(|| {
    SectionKey::ALL
        .into_iter()
        .filter_map(|key| {
            let header = key.source_header()?;
            let pattern = format!("(?i){}", regex::escape(header).replace('\'', "['’]"));
            Some((key, Regex::new(&pattern).unwrap()))
        })
        .collect()
});

/// Elements whose text never reaches the output
const SKIPPED_ELEMENTS: &[&str] = &["head", "script", "style", "noscript", "template"];

/// Elements that end a line of text
const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "blockquote", "dd", "div", "dl", "dt", "footer", "form",
    "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "li", "main", "nav", "ol", "p", "pre",
    "section", "table", "tr", "ul",
];

/// Parses lexicon entry pages for one source site
#[derive(Debug, Clone, Default)]
pub struct Extractor {
    urls: SourceUrls,
}

impl Extractor {
    pub fn new(urls: SourceUrls) -> Self {
        Self { urls }
    }

    /// Extracts a structured entry from a raw page
    ///
    /// # Arguments
    ///
    /// * `id` - The id the page was fetched for
    /// * `source_url` - Where the page came from; stored as the primary source
    /// * `raw` - The page's markup
    ///
    /// # Returns
    ///
    /// An entry with every field it could find. Missing labels stay unset,
    /// missing sections are empty, and an empty page yields an empty entry.
    ///
    /// # Example
    ///
    /// ```
    /// use strongs_graph::crawler::Extractor;
    /// use strongs_graph::StrongsId;
    ///
    /// let id: StrongsId = "G3056".parse().unwrap();
    /// let html = "<p>Original Word: λόγος</p><p>Strong's Exhaustive Concordance: word. From 3004.</p>";
    /// let entry = Extractor::default().parse(id, "https://biblehub.com/greek/3056.htm", html);
    /// assert_eq!(entry.lemma.as_deref(), Some("λόγος"));
    /// assert_eq!(entry.links.related_ids.iter().next().unwrap().to_string(), "G3004");
    /// ```
    pub fn parse(&self, id: StrongsId, source_url: &str, raw: &str) -> Entry {
        let text = html_to_text(raw);
        let language = id.language();

        let mut entry = Entry::new(id, source_url);
        entry.source_alternates = self.urls.alternates(&id);
        entry.lemma = label_value(&ORIGINAL_WORD, &text);
        entry.transliteration = label_value(&TRANSLITERATION, &text);
        entry.phonetic = label_value(&PHONETIC, &text);
        entry.pronunciation = label_value(&PRONUNCIATION, &text);
        entry.part_of_speech = label_value(&PART_OF_SPEECH, &text);
        entry.definition = label_value(&DEFINITION, &text);

        entry.set_block(SectionKey::LexicalSummary, lexical_summary(&entry));
        for (key, header) in SECTION_HEADERS.iter() {
            entry.set_block(*key, section_window(header, &text));
        }

        entry.links.see_also = see_also(&text, language);

        let mut related = BTreeSet::new();
        for (key, block) in &entry.blocks {
            if *key != SectionKey::LexicalSummary {
                related.extend(citations(block, language));
            }
        }
        entry.links.related_ids = related;
        entry.links.topical = citations(entry.block(SectionKey::TopicalLexicon), language);

        // An entry never links to itself
        entry.links.see_also.remove(&id);
        entry.links.related_ids.remove(&id);
        entry.links.topical.remove(&id);

        for reference in scripture_refs(raw, &self.urls) {
            entry.links.add_scripture(reference);
        }

        tracing::trace!(
            "Parsed {}: lemma={:?}, {} see-also, {} related, {} topical, {} verses",
            id,
            entry.lemma,
            entry.links.see_also.len(),
            entry.links.related_ids.len(),
            entry.links.topical.len(),
            entry.links.scripture.len()
        );

        entry
    }
}

/// Strips markup from a page, keeping one line per block element
///
/// Whitespace inside each line is collapsed to single spaces and blank lines
/// are dropped. Text in `<head>`, scripts and styles is ignored.
pub fn html_to_text(raw: &str) -> String {
    let document = Html::parse_document(raw);
    let mut flat = String::new();
    collect_text(document.root_element(), &mut flat);

    flat.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            // Source line breaks are not significant in markup
            out.extend(text.chars().map(|c| if c == '\n' || c == '\r' { ' ' } else { c }));
        } else if let Some(child) = ElementRef::wrap(child) {
            let name = child.value().name();
            if SKIPPED_ELEMENTS.contains(&name) {
                continue;
            }
            if name == "br" {
                out.push('\n');
                continue;
            }
            if BLOCK_ELEMENTS.contains(&name) {
                out.push('\n');
            }
            collect_text(child, out);
            match name {
                "td" | "th" => out.push(' '),
                _ if BLOCK_ELEMENTS.contains(&name) => out.push('\n'),
                _ => {}
            }
        }
    }
}

/// First non-empty value for a "Label: value" line
fn label_value(pattern: &Regex, text: &str) -> Option<String> {
    pattern
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|value| value.as_str().trim().to_string())
        .find(|value| !value.is_empty())
}

/// Lists the labelled fields that were found, one per line
fn lexical_summary(entry: &Entry) -> String {
    [
        ("Original Word", &entry.lemma),
        ("Transliteration", &entry.transliteration),
        ("Phonetic Spelling", &entry.phonetic),
        ("Pronunciation", &entry.pronunciation),
        ("Part of Speech", &entry.part_of_speech),
        ("Definition", &entry.definition),
    ]
    .into_iter()
    .filter_map(|(label, value)| value.as_ref().map(|v| format!("- {}: {}", label, v)))
    .collect::<Vec<_>>()
    .join("\n")
}

/// Text following the first occurrence of a header, capped at the window size
fn section_window(header: &Regex, text: &str) -> String {
    let Some(found) = header.find(text) else {
        return String::new();
    };
    let rest = text[found.end()..].trim_start_matches([':', ' ', '\n']);
    rest.chars()
        .take(SECTION_WINDOW_CHARS)
        .collect::<String>()
        .trim()
        .to_string()
}

/// Ids named by "See 3004", "see also G3004" and similar phrases
fn see_also(text: &str, language: Language) -> BTreeSet<StrongsId> {
    SEE_ALSO
        .captures_iter(text)
        .filter_map(|caps| {
            let language = match caps.get(1) {
                Some(prefix) => prefix.as_str().chars().next().and_then(Language::from_prefix)?,
                None => language,
            };
            let number = caps.get(2)?.as_str().parse().ok()?;
            StrongsId::new(language, number)
        })
        .collect()
}

/// Strong's citations in a block of text
///
/// Recognizes prefixed ids (`G3004`), named citations (`Strong's Hebrew 1254`)
/// and bare numbers after a connecting word (`from 3004`). Bare numbers take the
/// entry's own language.
pub fn citations(text: &str, language: Language) -> BTreeSet<StrongsId> {
    let mut found = BTreeSet::new();

    for caps in PREFIXED_CITATION.captures_iter(text) {
        let prefix = caps[1].chars().next().and_then(Language::from_prefix);
        if let (Some(lang), Ok(number)) = (prefix, caps[2].parse()) {
            found.extend(StrongsId::new(lang, number));
        }
    }

    for caps in NAMED_CITATION.captures_iter(text) {
        if let (Ok(lang), Ok(number)) = (caps[1].parse::<Language>(), caps[2].parse()) {
            found.extend(StrongsId::new(lang, number));
        }
    }

    for caps in BARE_CITATION.captures_iter(text) {
        if let Ok(number) = caps[1].parse() {
            found.extend(StrongsId::new(language, number));
        }
    }

    found
}

/// Verse references from interlinear links in the raw markup, first-seen order
fn scripture_refs(raw: &str, urls: &SourceUrls) -> Vec<ScriptureRef> {
    let mut refs: Vec<ScriptureRef> = Vec::new();
    for caps in INTERLINEAR_LINK.captures_iter(raw) {
        let (Ok(chapter), Ok(verse)) = (caps[2].parse::<u32>(), caps[3].parse::<u32>()) else {
            continue;
        };
        if chapter == 0 || verse == 0 {
            continue;
        }
        let reference = ScriptureRef::new(&caps[1], chapter, verse, urls);
        if !refs.contains(&reference) {
            refs.push(reference);
        }
    }
    refs
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOGOS_PAGE: &str = r#"<html>
<head><title>Strong's Greek: 3056</title><script>var x = "Original Word: nope";</script></head>
<body>
<div class="vheading">Lexical Summary</div>
<span class="tophdg">Original Word: </span>λόγος<br>
<span class="tophdg">Part of Speech: </span>Noun, Masculine<br>
<span class="tophdg">Transliteration: </span>logos<br>
<span class="tophdg">Phonetic Spelling: </span>(log'-os)<br>
<span class="tophdg">Definition: </span>a word, speech, divine utterance<br>
<p><b>Strong's Exhaustive Concordance</b></p>
<p>account, cause. From 3004; something said (including the thought). See also G4487.</p>
<p><b>Topical Lexicon</b></p>
<p>The Word is linked with Strong's Hebrew 1697 and with H559.</p>
<p><a href="/interlinear/john/1-1.htm">John 1:1</a>
<a href="https://biblehub.com/interlinear/John/1-1.htm">John 1:1</a>
<a href='../interlinear/1_john/1-1.htm'>1 John 1:1</a></p>
</body></html>"#;

    fn id(s: &str) -> StrongsId {
        s.parse().unwrap()
    }

    fn parse(html: &str) -> Entry {
        Extractor::default().parse(id("G3056"), "https://biblehub.com/greek/3056.htm", html)
    }

    #[test]
    fn test_html_to_text_lines() {
        let text = html_to_text("<div>one\n  two</div><p>three<br>four</p><script>x</script>");
        assert_eq!(text, "one two\nthree\nfour");
    }

    #[test]
    fn test_labels() {
        let entry = parse(LOGOS_PAGE);
        assert_eq!(entry.lemma.as_deref(), Some("λόγος"));
        assert_eq!(entry.transliteration.as_deref(), Some("logos"));
        assert_eq!(entry.phonetic.as_deref(), Some("(log'-os)"));
        assert_eq!(entry.part_of_speech.as_deref(), Some("Noun, Masculine"));
        assert_eq!(
            entry.definition.as_deref(),
            Some("a word, speech, divine utterance")
        );
        assert!(entry.pronunciation.is_none());
    }

    #[test]
    fn test_summary_lists_found_fields() {
        let entry = parse(LOGOS_PAGE);
        let summary = entry.block(SectionKey::LexicalSummary);
        assert!(summary.starts_with("- Original Word: λόγος"));
        assert!(!summary.contains("Pronunciation"));
    }

    #[test]
    fn test_section_window_follows_header() {
        let entry = parse(LOGOS_PAGE);
        assert!(entry
            .block(SectionKey::StrongsExhaustive)
            .starts_with("account, cause."));
        assert!(entry.block(SectionKey::Thayers).is_empty());
    }

    #[test]
    fn test_section_window_is_capped() {
        let long = "x".repeat(SECTION_WINDOW_CHARS * 2);
        let entry = parse(&format!("<p>Word Origin</p><p>{}</p>", long));
        assert_eq!(
            entry.block(SectionKey::WordOrigin).chars().count(),
            SECTION_WINDOW_CHARS
        );
    }

    #[test]
    fn test_header_match_ignores_case_and_curly_apostrophe() {
        let entry = parse("<p>THAYER’S GREEK LEXICON</p><p>body</p>");
        assert_eq!(entry.block(SectionKey::Thayers), "body");
    }

    #[test]
    fn test_links() {
        let entry = parse(LOGOS_PAGE);
        assert_eq!(
            entry.links.see_also.iter().collect::<Vec<_>>(),
            vec![&id("G4487")]
        );
        assert!(entry.links.related_ids.contains(&id("G3004")));
        assert!(entry.links.related_ids.contains(&id("H1697")));
        assert_eq!(
            entry.links.topical,
            [id("H1697"), id("H559")].into_iter().collect()
        );
    }

    #[test]
    fn test_related_ids_exclude_self() {
        let entry = parse("<p>Word Origin</p><p>from 3056 and G3056 and 3004</p>");
        assert!(!entry.links.related_ids.contains(&id("G3056")));
        assert!(entry.links.related_ids.contains(&id("G3004")));
    }

    #[test]
    fn test_bare_numbers_take_entry_language() {
        let found = citations("from 1254", Language::Hebrew);
        assert_eq!(found.into_iter().collect::<Vec<_>>(), vec![id("H1254")]);
    }

    #[test]
    fn test_scripture_refs_deduplicate_across_forms() {
        let entry = parse(LOGOS_PAGE);
        let keys: Vec<_> = entry.links.scripture.iter().map(|r| r.key()).collect();
        assert_eq!(keys, vec![("john", 1, 1), ("1_john", 1, 1)]);
        assert_eq!(entry.links.scripture[0].display, "John 1:1");
    }

    #[test]
    fn test_empty_document_yields_empty_entry() {
        let entry = parse("");
        assert!(entry.lemma.is_none());
        assert!(entry.definition.is_none());
        assert!(entry.blocks.values().all(String::is_empty));
        assert!(entry.links.related_ids.is_empty());
        assert!(entry.links.scripture.is_empty());
        assert_eq!(entry.source_alternates.len(), 2);
    }
}
