//! Marker-scoped merge of fresh section content into an existing note
//!
//! Each imported section owns the text from the end of its marker up to the
//! next section marker or heading line, or the end of the note. Merge replaces
//! only those spans and leaves every other byte alone, including the header.

use crate::config::Recipe;
use crate::output::markdown::{section_block, section_text};
use crate::state::{Entry, SectionKey};
use regex::Regex;
use std::sync::LazyLock;

/// Start of any section marker
const MARKER_PREFIX: &str = "<!-- imported: ";

static HEADING_LINE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^#{1,6}\s").unwrap());

/// Byte range of the span a section marker owns, if the marker is present
///
/// The range starts right after the marker and ends at the next marker or
/// heading line, or at the end of the document.
pub fn owned_span(document: &str, key: SectionKey) -> Option<(usize, usize)> {
    let marker = key.marker();
    let start = document.find(&marker)? + marker.len();
    let rest = &document[start..];

    let next_marker = rest.find(MARKER_PREFIX);
    // A heading only counts at the start of a line after the marker's own line
    let next_heading = rest
        .find('\n')
        .and_then(|newline| {
            HEADING_LINE
                .find(&rest[newline + 1..])
                .map(|m| newline + 1 + m.start())
        });

    let end = match (next_marker, next_heading) {
        (Some(a), Some(b)) => a.min(b),
        (Some(a), None) => a,
        (None, Some(b)) => b,
        (None, None) => rest.len(),
    };
    Some((start, start + end))
}

/// Replaces one section's span with `block`
///
/// # Returns
///
/// The merged document, or None if the marker is absent
pub fn merge_section(document: &str, key: SectionKey, block: &str) -> Option<String> {
    let (start, end) = owned_span(document, key)?;
    Some(format!(
        "{}\n{}\n\n{}",
        &document[..start],
        block,
        &document[end..]
    ))
}

/// Merges every enabled section of `entry` into an existing note
///
/// Sections whose marker is missing are left as they are. Merging the same
/// entry twice gives the same document as merging it once, and a note created
/// by `render_new` is unchanged by merging the entry it was rendered from.
pub fn merge_into_file(existing: &str, entry: &Entry, recipe: &Recipe) -> String {
    let mut document = existing.to_string();
    for key in recipe.sections() {
        let block = section_block(&section_text(entry, key, recipe));
        match merge_section(&document, key, &block) {
            Some(merged) => document = merged,
            None => tracing::debug!(
                "{}: no marker for section '{}', leaving it untouched",
                entry.id,
                key
            ),
        }
    }
    document
}
