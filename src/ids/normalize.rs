use crate::ids::{Language, StrongsId};
use crate::{SeedError, SeedResult};
use regex::Regex;
use std::sync::LazyLock;

/// Bare id or bare number: optional prefix letter, optional spaces, digits
static BARE_SEED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^([gh])?\s*(\d{1,6})$").unwrap());

/// Entry, concordance and Englishman's pages all carry language and number in the path
static SOURCE_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(greek|hebrew)/(?:strongs_)?(\d{1,6})\.htm").unwrap());

/// Normalizes a raw seed string into a Strong's id
///
/// # Accepted Shapes
///
/// 1. A bare id: `G3056`, `h1254`, `G 03056`
/// 2. A bare number with a language hint: `3056` + `Some(Language::Greek)`
/// 3. A full source URL: `https://biblehub.com/greek/3056.htm`, including the
///    concordance (`/strongs/greek/3056.htm`) and Englishman's
///    (`/greek/strongs_3056.htm`) pages
///
/// Leading zeros are dropped and the prefix is upper-cased, so normalizing the
/// textual form of an already-normalized id returns the same id.
///
/// # Arguments
///
/// * `raw` - The seed as typed by a user
/// * `hint` - Language to use when the seed is a bare number
///
/// # Returns
///
/// * `Ok(StrongsId)` - The normalized id
/// * `Err(SeedError)` - The seed cannot be interpreted
///
/// # Examples
///
/// ```
/// use strongs_graph::ids::{normalize_seed, Language};
///
/// let id = normalize_seed("g03056", None).unwrap();
/// assert_eq!(id.to_string(), "G3056");
///
/// let id = normalize_seed("1254", Some(Language::Hebrew)).unwrap();
/// assert_eq!(id.to_string(), "H1254");
/// ```
pub fn normalize_seed(raw: &str, hint: Option<Language>) -> SeedResult<StrongsId> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(SeedError::Empty);
    }

    if looks_like_url(trimmed) {
        return id_from_url(trimmed).ok_or_else(|| SeedError::Malformed(trimmed.to_string()));
    }

    let caps = BARE_SEED
        .captures(trimmed)
        .ok_or_else(|| SeedError::Malformed(trimmed.to_string()))?;

    let language = match caps.get(1) {
        Some(prefix) => prefix
            .as_str()
            .chars()
            .next()
            .and_then(Language::from_prefix)
            .ok_or_else(|| SeedError::Malformed(trimmed.to_string()))?,
        None => hint.ok_or_else(|| SeedError::MissingLanguage(trimmed.to_string()))?,
    };

    let number: u32 = caps[2]
        .parse()
        .map_err(|_| SeedError::Malformed(trimmed.to_string()))?;

    StrongsId::new(language, number).ok_or_else(|| SeedError::ZeroNumber(trimmed.to_string()))
}

/// Extracts an id from a source page URL or path
///
/// Returns None if the URL does not point at an entry, concordance, or
/// Englishman's page, or if the number is zero.
pub fn id_from_url(url: &str) -> Option<StrongsId> {
    let caps = SOURCE_PATH.captures(url)?;
    let language: Language = caps[1].parse().ok()?;
    let number: u32 = caps[2].parse().ok()?;
    StrongsId::new(language, number)
}

fn looks_like_url(s: &str) -> bool {
    s.contains("://") || s.starts_with('/') || s.contains(".htm")
}
