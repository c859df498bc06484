//! Note rendering
//!
//! This module renders the three kinds of notes the importer creates:
//! - Entry notes: header, title, summary callout, marked sections, outbound links
//! - Placeholder notes: a minimal header plus empty marked sections
//! - Verse notes: a header and links to the verse and interlinear pages

use crate::config::{LinkType, Recipe};
use crate::ids::StrongsId;
use crate::output::frontmatter::HeaderBuilder;
use crate::state::{Entry, ScriptureRef, SectionKey};
use regex::Regex;
use std::collections::{BTreeSet, HashMap};

/// Characters that may not appear in a note title
const ILLEGAL_TITLE_CHARS: &[char] = &[
    '\\', '/', ':', '*', '?', '"', '<', '>', '|', '#', '^', '[', ']',
];

/// Substitutes `{id}`, `{lemma}` and `{transliteration}` and sanitizes the result
///
/// Missing fields substitute as empty text. Characters illegal in a file name
/// are removed and whitespace is collapsed. A title that sanitizes to nothing
/// falls back to the id.
///
/// # Example
///
/// ```
/// use strongs_graph::output::build_title;
/// use strongs_graph::Entry;
///
/// let mut entry = Entry::new("G3056".parse().unwrap(), "");
/// entry.lemma = Some("λόγος".to_string());
/// assert_eq!(build_title("{id} {lemma}", &entry), "G3056 λόγος");
/// assert_eq!(build_title("{id}: {transliteration}", &entry), "G3056");
/// ```
pub fn build_title(pattern: &str, entry: &Entry) -> String {
    let id = entry.id.to_string();
    let raw = pattern
        .replace("{id}", &id)
        .replace("{lemma}", entry.lemma.as_deref().unwrap_or(""))
        .replace("{transliteration}", entry.transliteration.as_deref().unwrap_or(""));

    let title = sanitize_title(&raw);
    if title.is_empty() {
        id
    } else {
        title
    }
}

/// Removes characters illegal in file names and collapses whitespace
pub fn sanitize_title(raw: &str) -> String {
    raw.chars()
        .filter(|c| !ILLEGAL_TITLE_CHARS.contains(c))
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Note link to a lexicon entry
pub fn entry_link(id: &StrongsId) -> String {
    format!("[[{}]]", id)
}

/// Note link to a verse note, displayed as the verse reference
pub fn verse_link(reference: &ScriptureRef) -> String {
    format!("[[{}|{}]]", reference.note_title(), reference.display)
}

/// Machine-owned text of a section, exactly as it follows the section marker
///
/// The text is trimmed and closed by a rule. Lines that would read as
/// headings and anything that would read as a marker are escaped, so a section
/// can never end another section's span early.
pub fn section_block(text: &str) -> String {
    let text = text.trim();
    if text.is_empty() {
        return "---".to_string();
    }

    let escaped = text
        .lines()
        .map(|line| {
            let line = line.replace("<!--", "&lt;!--");
            if line.trim_start().starts_with('#') {
                format!("\\{}", line.trim_start())
            } else {
                line
            }
        })
        .collect::<Vec<_>>()
        .join("\n");
    format!("{}\n\n---", escaped)
}

/// Rewrites verse references in `text` into verse note links
///
/// All references are matched in one pass, longest display first, so
/// `1 John 1:1` is never split into `1 ` plus a link to `John 1:1`, and
/// `John 1:1` does not match inside `John 1:10`. A reference right after a
/// book number is left alone when only the unnumbered book is known.
pub fn link_scripture(text: &str, references: &[ScriptureRef]) -> String {
    if references.is_empty() || text.is_empty() {
        return text.to_string();
    }

    let links: HashMap<&str, String> = references
        .iter()
        .map(|reference| (reference.display.as_str(), verse_link(reference)))
        .collect();

    let mut displays: Vec<&str> = links.keys().copied().collect();
    displays.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
    let alternation = displays
        .iter()
        .map(|display| regex::escape(display))
        .collect::<Vec<_>>()
        .join("|");

    let Ok(pattern) = Regex::new(&format!(r"\b(?:{})\b", alternation)) else {
        return text.to_string();
    };
    pattern
        .replace_all(text, |caps: &regex::Captures<'_>| {
            let found = &caps[0];
            let start = caps.get(0).map_or(0, |m| m.start());
            if follows_book_number(&text[..start]) {
                return found.to_string();
            }
            links.get(found).cloned().unwrap_or_else(|| found.to_string())
        })
        .into_owned()
}

/// True if `before` ends in a book number such as the `1 ` of `1 John`
fn follows_book_number(before: &str) -> bool {
    let trimmed = before.trim_end_matches([' ', '\u{a0}']);
    trimmed.len() < before.len() && trimmed.ends_with(|c: char| c.is_ascii_digit())
}

/// Text of a section as it will be written, before marker-block escaping
pub fn section_text(entry: &Entry, key: SectionKey, recipe: &Recipe) -> String {
    let text = entry.block(key);
    if recipe.renders(LinkType::Scripture) {
        link_scripture(text, &entry.links.scripture)
    } else {
        text.to_string()
    }
}

/// One marked section: heading, marker, then the section block
fn render_section(key: SectionKey, block: &str) -> String {
    format!("## {}\n{}\n{}\n\n", key.heading(), key.marker(), block)
}

fn strongs_items(ids: &BTreeSet<StrongsId>, linked: bool) -> Vec<String> {
    ids.iter()
        .map(|id| if linked { entry_link(id) } else { id.to_string() })
        .collect()
}

fn scripture_items(references: &[ScriptureRef], linked: bool) -> Vec<String> {
    references
        .iter()
        .map(|r| if linked { verse_link(r) } else { r.display.clone() })
        .collect()
}

/// Renders a complete entry note
///
/// # Arguments
///
/// * `entry` - The extracted entry
/// * `recipe` - Decides sections, link rendering and the title
/// * `imported_at` - Timestamp recorded in the header
pub fn render_new(entry: &Entry, recipe: &Recipe, imported_at: &str) -> String {
    let strongs = recipe.renders(LinkType::Strongs);
    let scripture = recipe.renders(LinkType::Scripture);
    let language = entry.language();

    let header = HeaderBuilder::new()
        .scalar("id", &entry.id.to_string())
        .scalar("language", language.slug())
        .optional("lemma", entry.lemma.as_deref())
        .optional("transliteration", entry.transliteration.as_deref())
        .optional("phonetic", entry.phonetic.as_deref())
        .optional("pronunciation", entry.pronunciation.as_deref())
        .optional("part_of_speech", entry.part_of_speech.as_deref())
        .optional("definition", entry.definition.as_deref())
        .scalar("source_primary", &entry.source_primary)
        .list("source_alternates", &entry.source_alternates)
        .scalar("imported_at", imported_at)
        .scalar("recipe", &recipe.id)
        .list("sections", recipe.sections().map(|key| key.as_str()))
        .list("see_also", strongs_items(&entry.links.see_also, strongs))
        .list("related_ids", strongs_items(&entry.links.related_ids, strongs))
        .list("topical", strongs_items(&entry.links.topical, strongs))
        .list("scripture", scripture_items(&entry.links.scripture, scripture))
        .list("aliases", entry.lemma.iter())
        .list("tags", ["strongs".to_string(), format!("strongs/{}", language.slug())])
        .finish();

    let mut doc = header;
    doc.push_str(&format!("# {}\n\n", build_title(&recipe.note_title_pattern, entry)));
    doc.push_str(&summary_callout(entry));

    for key in recipe.sections() {
        doc.push_str(&render_section(
            key,
            &section_block(&section_text(entry, key, recipe)),
        ));
    }

    doc.push_str(&outbound_links(entry, recipe));
    doc
}

fn summary_callout(entry: &Entry) -> String {
    let mut title = entry
        .lemma
        .clone()
        .unwrap_or_else(|| entry.id.to_string());
    if let Some(transliteration) = &entry.transliteration {
        title.push_str(&format!(" ({})", transliteration));
    }

    let mut callout = format!("> [!summary] {}\n", title);
    if let Some(line) = entry.definition.as_ref().or(entry.part_of_speech.as_ref()) {
        callout.push_str(&format!("> {}\n", line));
    }
    callout.push('\n');
    callout
}

/// Human navigation block grouping the four link categories
fn outbound_links(entry: &Entry, recipe: &Recipe) -> String {
    let mut groups: Vec<(&str, Vec<String>)> = Vec::new();
    if recipe.renders(LinkType::Strongs) {
        groups.push(("See Also", strongs_items(&entry.links.see_also, true)));
        groups.push(("Related", strongs_items(&entry.links.related_ids, true)));
        groups.push(("Topical", strongs_items(&entry.links.topical, true)));
    }
    if recipe.renders(LinkType::Scripture) {
        groups.push(("Scripture", scripture_items(&entry.links.scripture, true)));
    }

    let mut out = "## Outbound Links\n\n".to_string();
    let mut any = false;
    for (heading, items) in groups.into_iter().filter(|(_, items)| !items.is_empty()) {
        any = true;
        out.push_str(&format!("### {}\n", heading));
        for item in items {
            out.push_str(&format!("- {}\n", item));
        }
        out.push('\n');
    }
    if !any {
        out.push_str("_No outbound links._\n");
    }
    out
}

/// Renders a stand-in note for an entry that has not been imported yet
///
/// Every enabled section gets an empty marked span so a later import can fill
/// it by merging.
pub fn render_placeholder(id: &StrongsId, term: Option<&str>, recipe: &Recipe) -> String {
    let mut doc = HeaderBuilder::new()
        .scalar("id", &id.to_string())
        .scalar("language", id.language().slug())
        .optional("lemma", term)
        .list("aliases", term.iter())
        .bare("placeholder", true)
        .finish();

    doc.push_str(&format!("# {}\n\n", id));
    for key in recipe.sections() {
        doc.push_str(&render_section(key, &section_block("")));
    }
    doc
}

/// Renders a companion note for one verse
pub fn render_verse(reference: &ScriptureRef) -> String {
    let book = reference
        .display
        .rsplit_once(' ')
        .map(|(book, _)| book)
        .unwrap_or(&reference.display);

    let mut doc = HeaderBuilder::new()
        .scalar("book", book)
        .scalar("slug", &reference.slug)
        .bare("chapter", reference.chapter)
        .bare("verse", reference.verse)
        .scalar("verse_url", &reference.verse_url)
        .scalar("interlinear_url", &reference.interlinear_url)
        .list("tags", ["scripture"])
        .finish();

    doc.push_str(&format!("# {}\n\n", reference.display));
    doc.push_str(&format!("- [Verse text]({})\n", reference.verse_url));
    doc.push_str(&format!("- [Interlinear]({})\n", reference.interlinear_url));
    doc
}
