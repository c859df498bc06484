/// Words kept lowercase inside multi-word book names ("Song of Solomon")
const MINOR_WORDS: &[&str] = &["of", "the", "and"];

/// Converts a source book slug into a human-readable book name
///
/// Slugs use underscores between words and may start with an ordinal digit:
/// `1_john` becomes `1 John`, `song_of_solomon` becomes `Song of Solomon`.
pub fn book_display_name(slug: &str) -> String {
    slug.split(['_', '-'])
        .filter(|word| !word.is_empty())
        .enumerate()
        .map(|(i, word)| {
            if i > 0 && MINOR_WORDS.contains(&word) {
                word.to_string()
            } else {
                capitalize(word)
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Display form of a verse reference, e.g. `John 3:16`
pub fn verse_display(slug: &str, chapter: u32, verse: u32) -> String {
    format!("{} {}:{}", book_display_name(slug), chapter, verse)
}

/// File-name-safe title of a verse note, e.g. `John 3.16`
pub fn verse_note_title(slug: &str, chapter: u32, verse: u32) -> String {
    format!("{} {}.{}", book_display_name(slug), chapter, verse)
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
