//! Metadata header rendering, reading and alias editing
//!
//! Headers are the `---` delimited YAML block at the top of a note. Scalars are
//! written as double-quoted strings (or bare for booleans and numbers) and
//! lists as indented dash lists. Reading goes through `serde_yaml`, so headers
//! that users have edited by hand read the same way any YAML tool reads them.
//! Edits are line splices, which leave every untouched line as it was.

use serde::{Deserialize, Deserializer};
use serde_yaml::{Mapping, Value};
use std::fmt::Display;

/// Byte offsets of a header inside a document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderSpan {
    /// First byte after the opening `---` line
    pub start: usize,
    /// First byte of the closing `---` line
    pub end: usize,
    /// First byte after the closing `---` line
    pub after: usize,
}

/// Incrementally renders a header
#[derive(Debug)]
pub struct HeaderBuilder {
    out: String,
}

impl Default for HeaderBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl HeaderBuilder {
    pub fn new() -> Self {
        Self {
            out: "---\n".to_string(),
        }
    }

    /// Adds a quoted string value
    pub fn scalar(mut self, key: &str, value: &str) -> Self {
        self.out.push_str(&format!("{}: {}\n", key, quote(value)));
        self
    }

    /// Adds a quoted string value when present
    pub fn optional(self, key: &str, value: Option<&str>) -> Self {
        match value {
            Some(value) => self.scalar(key, value),
            None => self,
        }
    }

    /// Adds an unquoted value such as a number or boolean
    pub fn bare(mut self, key: &str, value: impl Display) -> Self {
        self.out.push_str(&format!("{}: {}\n", key, value));
        self
    }

    /// Adds a list; an empty list is written inline as `[]`
    pub fn list<I, T>(mut self, key: &str, items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let items: Vec<String> = items
            .into_iter()
            .map(|item| format!("  - {}\n", quote(item.as_ref())))
            .collect();
        if items.is_empty() {
            self.out.push_str(&format!("{}: []\n", key));
        } else {
            self.out.push_str(&format!("{}:\n", key));
            items.iter().for_each(|item| self.out.push_str(item));
        }
        self
    }

    pub fn finish(mut self) -> String {
        self.out.push_str("---\n");
        self.out
    }
}

/// Double-quotes a string as a YAML double-quoted scalar
pub fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Locates the header block, tolerating a leading byte order mark
pub fn header_span(document: &str) -> Option<HeaderSpan> {
    let bom = if document.starts_with('\u{feff}') {
        '\u{feff}'.len_utf8()
    } else {
        0
    };

    let mut lines = document[bom..].split_inclusive('\n');
    let first = lines.next()?;
    if first.trim_end() != "---" {
        return None;
    }

    let start = bom + first.len();
    let mut offset = start;
    for line in lines {
        if line.trim_end() == "---" {
            return Some(HeaderSpan {
                start,
                end: offset,
                after: offset + line.len(),
            });
        }
        offset += line.len();
    }
    None
}

/// Text of the header between its delimiters, if the document has one
pub fn header(document: &str) -> Option<&str> {
    header_span(document).map(|span| &document[span.start..span.end])
}

/// Everything after the header, or the whole document if it has none
pub fn body(document: &str) -> &str {
    match header_span(document) {
        Some(span) => &document[span.after..],
        None => document,
    }
}

/// The header keys the importer reads back from existing notes
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct NoteHeader {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub lemma: Option<String>,
    #[serde(default, deserialize_with = "string_list")]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub placeholder: bool,
}

/// Parses the importer's keys out of a document's header
///
/// # Returns
///
/// * `Some(NoteHeader)` - The header parsed; unknown keys are ignored
/// * `None` - The document has no header, or the header is not valid YAML
pub fn read_header(document: &str) -> Option<NoteHeader> {
    let header = header(document)?;
    if header.trim().is_empty() {
        return Some(NoteHeader::default());
    }
    match serde_yaml::from_str(header) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            tracing::debug!("Unreadable header: {}", e);
            None
        }
    }
}

fn string_list<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().map(value_list).unwrap_or_default())
}

/// The whole header as a YAML mapping
fn header_mapping(document: &str) -> Option<Mapping> {
    let header = header(document)?;
    if header.trim().is_empty() {
        return Some(Mapping::new());
    }
    match serde_yaml::from_str::<Value>(header) {
        Ok(Value::Mapping(mapping)) => Some(mapping),
        Ok(_) => None,
        Err(e) => {
            tracing::debug!("Unreadable header: {}", e);
            None
        }
    }
}

/// Text of a scalar value; numbers and booleans are formatted
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Tagged(tagged) => scalar_text(&tagged.value),
        _ => None,
    }
}

/// A sequence of scalars, or a single scalar read as a one-item list
fn value_list(value: &Value) -> Vec<String> {
    let items = match value {
        Value::Sequence(items) => items.iter().filter_map(scalar_text).collect(),
        other => scalar_text(other).into_iter().collect::<Vec<_>>(),
    };
    items
        .into_iter()
        .filter(|item| !item.trim().is_empty())
        .collect()
}

/// Reads a scalar header value
///
/// Returns None if the key is absent, empty or holds a list.
pub fn read_scalar(document: &str, key: &str) -> Option<String> {
    header_mapping(document)?
        .get(key)
        .and_then(scalar_text)
        .filter(|value| !value.is_empty())
}

/// Reads a list header value; absent keys read as an empty list
pub fn read_list(document: &str, key: &str) -> Vec<String> {
    header_mapping(document)
        .and_then(|mapping| mapping.get(key).map(value_list))
        .unwrap_or_default()
}

/// Value part of a `key: value` line with any trailing comment removed
fn key_value<'a>(line: &'a str, key: &str) -> Option<&'a str> {
    let rest = line.strip_prefix(key)?.strip_prefix(':')?.trim();
    Some(if rest.starts_with('#') { "" } else { rest })
}

/// Leading whitespace of a block list item line
fn list_item_indent(line: &str) -> Option<&str> {
    let trimmed = line.trim_start();
    let is_item = trimmed.starts_with("- ") || trimmed.trim_end() == "-";
    is_item.then(|| &line[..line.len() - trimmed.len()])
}

/// True for lines that still belong to the value of the key above them
fn continues_value(line: &str) -> bool {
    line.starts_with(' ') || line.starts_with('\t') || line.starts_with('-')
}

/// Adds `term` to the document's `aliases` list
///
/// Existing aliases are read through the YAML parser. A block list gets the
/// new item appended at its own indentation, so its lines stay byte for byte.
/// Any other form of the key (an inline list, a single value) is rewritten as
/// a block list holding the same aliases. A missing key is added, and a
/// document without a header gets one. Nothing outside the `aliases` key
/// changes.
///
/// # Returns
///
/// * `Some(String)` - The edited document
/// * `None` - The alias was already present, or the header is not valid YAML
pub fn ensure_alias(document: &str, term: &str) -> Option<String> {
    let Some(span) = header_span(document) else {
        return Some(format!("---\naliases:\n  - {}\n---\n{}", quote(term), document));
    };

    let existing = read_list(document, "aliases");
    if header_mapping(document).is_none() || existing.iter().any(|alias| alias == term) {
        return None;
    }

    let mut offset = span.start;
    let mut lines = document[span.start..span.end].split_inclusive('\n').peekable();
    while let Some(line) = lines.next() {
        let line_end = offset + line.len();
        let Some(value) = key_value(line, "aliases") else {
            offset = line_end;
            continue;
        };

        let mut value_end = line_end;
        let mut indent: Option<&str> = None;
        let mut block = value.is_empty();
        while let Some(next) = lines.next_if(|next| continues_value(next)) {
            value_end += next.len();
            match list_item_indent(next) {
                Some(found) => {
                    indent.get_or_insert(found);
                }
                None if next.trim().is_empty() || next.trim_start().starts_with('#') => {}
                None => block = false,
            }
        }

        if block {
            let item = format!("{}- {}\n", indent.unwrap_or("  "), quote(term));
            return Some(splice(document, value_end, value_end, &item));
        }

        let rendered: String = existing
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(term))
            .map(|alias| format!("  - {}\n", quote(alias)))
            .collect();
        return Some(splice(
            document,
            offset,
            value_end,
            &format!("aliases:\n{}", rendered),
        ));
    }

    Some(splice(
        document,
        span.end,
        span.end,
        &format!("aliases:\n  - {}\n", quote(term)),
    ))
}

fn splice(document: &str, from: usize, to: usize, insert: &str) -> String {
    format!("{}{}{}", &document[..from], insert, &document[to..])
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOTE: &str = "---\nid: \"G3056\"\nlemma: \"λόγος\"\naliases:\n  - \"λόγος\"\nplaceholder: true\n---\n# G3056\n";

    #[test]
    fn test_builder_output() {
        let header = HeaderBuilder::new()
            .scalar("id", "G1")
            .optional("lemma", None)
            .bare("chapter", 3)
            .list("aliases", ["a \"b\""])
            .list("tags", Vec::<String>::new())
            .finish();
        assert_eq!(
            header,
            "---\nid: \"G1\"\nchapter: 3\naliases:\n  - \"a \\\"b\\\"\"\ntags: []\n---\n"
        );
    }

    #[test]
    fn test_quoted_values_read_back() {
        for value in ["plain", "with \"quotes\"", "back\\slash", "[[G1]]", "a: b # c", "tab\there"] {
            let doc = HeaderBuilder::new().scalar("v", value).finish();
            assert_eq!(read_scalar(&doc, "v").as_deref(), Some(value));
        }
    }

    #[test]
    fn test_header_span() {
        let span = header_span(NOTE).unwrap();
        assert!(NOTE[span.start..span.end].starts_with("id:"));
        assert_eq!(&NOTE[span.after..], "# G3056\n");
        assert!(header_span("# no header\n").is_none());
        assert!(header_span("---\nunterminated\n").is_none());
        assert!(header_span("\u{feff}---\na: 1\n---\n").is_some());
    }

    #[test]
    fn test_read_values() {
        assert_eq!(read_scalar(NOTE, "id").as_deref(), Some("G3056"));
        assert_eq!(read_scalar(NOTE, "placeholder").as_deref(), Some("true"));
        assert_eq!(read_scalar(NOTE, "aliases"), None);
        assert_eq!(read_scalar(NOTE, "missing"), None);
        assert_eq!(read_list(NOTE, "aliases"), vec!["λόγος".to_string()]);
        assert_eq!(
            read_list("---\naliases: [one, \"two\"]\n---\n", "aliases"),
            vec!["one".to_string(), "two".to_string()]
        );
        assert!(read_list("---\naliases: []\n---\n", "aliases").is_empty());
    }

    #[test]
    fn test_read_hand_edited_values() {
        let doc = "---\nid: G3056 # my word study\naliases: [\"a, b\", 'it''s']\n---\nbody";
        assert_eq!(read_scalar(doc, "id").as_deref(), Some("G3056"));
        assert_eq!(
            read_list(doc, "aliases"),
            vec!["a, b".to_string(), "it's".to_string()]
        );
        assert_eq!(read_list("---\naliases: single\n---\n", "aliases"), vec!["single".to_string()]);
        assert_eq!(read_scalar("---\nid: [unclosed\n---\n", "id"), None);
    }

    #[test]
    fn test_read_header() {
        let header = read_header(NOTE).unwrap();
        assert_eq!(header.id.as_deref(), Some("G3056"));
        assert_eq!(header.lemma.as_deref(), Some("λόγος"));
        assert_eq!(header.aliases, vec!["λόγος".to_string()]);
        assert!(header.placeholder);

        let edited = read_header("---\nid: G1 # note\ncustom: {a: 1}\naliases:\n---\n").unwrap();
        assert_eq!(edited.id.as_deref(), Some("G1"));
        assert!(edited.aliases.is_empty());
        assert!(!edited.placeholder);

        assert_eq!(read_header("---\n---\n"), Some(NoteHeader::default()));
        assert!(read_header("no header").is_none());
        assert!(read_header("---\nid: [\n---\n").is_none());
    }

    #[test]
    fn test_ensure_alias_appends_to_block_list() {
        let edited = ensure_alias(NOTE, "λόγον").unwrap();
        assert_eq!(
            read_list(&edited, "aliases"),
            vec!["λόγος".to_string(), "λόγον".to_string()]
        );
        assert_eq!(body(&edited), body(NOTE));
        assert_eq!(read_scalar(&edited, "placeholder").as_deref(), Some("true"));
    }

    #[test]
    fn test_ensure_alias_is_noop_when_present() {
        assert!(ensure_alias(NOTE, "λόγος").is_none());
    }

    #[test]
    fn test_ensure_alias_rewrites_inline_list() {
        let edited = ensure_alias("---\naliases: [a]\nid: \"G1\"\n---\nbody", "b").unwrap();
        assert_eq!(
            edited,
            "---\naliases:\n  - \"a\"\n  - \"b\"\nid: \"G1\"\n---\nbody"
        );
    }

    #[test]
    fn test_ensure_alias_adds_missing_key_or_header() {
        let edited = ensure_alias("---\nid: \"G1\"\n---\nbody", "x").unwrap();
        assert_eq!(edited, "---\nid: \"G1\"\naliases:\n  - \"x\"\n---\nbody");

        let edited = ensure_alias("just text\n", "x").unwrap();
        assert_eq!(edited, "---\naliases:\n  - \"x\"\n---\njust text\n");
    }

    #[test]
    fn test_ensure_alias_keeps_quoted_commas() {
        let edited = ensure_alias("---\naliases: [\"a, b\"]\n---\nbody", "c").unwrap();
        assert_eq!(edited, "---\naliases:\n  - \"a, b\"\n  - \"c\"\n---\nbody");
        assert_eq!(
            read_list(&edited, "aliases"),
            vec!["a, b".to_string(), "c".to_string()]
        );
    }

    #[test]
    fn test_ensure_alias_matches_block_indent_and_comments() {
        let doc = "---\naliases: # mine\n    - one  # first\n    - two\ntags: []\n---\nbody";
        let edited = ensure_alias(doc, "three").unwrap();
        assert_eq!(
            edited,
            "---\naliases: # mine\n    - one  # first\n    - two\n    - \"three\"\ntags: []\n---\nbody"
        );
        assert_eq!(
            read_list(&edited, "aliases"),
            vec!["one".to_string(), "two".to_string(), "three".to_string()]
        );
        assert!(ensure_alias(&edited, "one").is_none());
    }

    #[test]
    fn test_ensure_alias_leaves_invalid_header_alone() {
        assert!(ensure_alias("---\nid: [\n---\nbody", "x").is_none());
    }
}
