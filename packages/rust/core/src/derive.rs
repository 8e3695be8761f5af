//! Field derivation: identifiers, categories, difficulty, summaries,
//! mitigations and content hashes.
//!
//! Everything here is a pure function of the metadata and Markdown body.

use std::sync::LazyLock;

use regex::Regex;
use sha2::{Digest, Sha512};

use writeups_shared::{Difficulty, MetaValue};

/// Category used when neither the title nor the metadata names one.
pub const DEFAULT_CATEGORY: &str = "general";

/// Maximum identifier length, in characters.
pub const SLUG_MAX_LEN: usize = 50;

/// Maximum length of a summary taken from the body, in characters.
pub const SUMMARY_MAX_CHARS: usize = 300;

/// Maximum number of mitigations collected from one document.
pub const MAX_MITIGATIONS: usize = 10;

/// Prefix of every content hash string.
pub const HASH_PREFIX: &str = "sha512:";

/// Number of hex digits kept from the digest.
pub const HASH_HEX_LEN: usize = 12;

/// Substituted when a document has no mitigation section (or an empty one).
pub const FALLBACK_MITIGATIONS: [&str; 3] = [
    "Review and validate security controls",
    "Implement proper input validation",
    "Enable security monitoring and logging",
];

// ---------------------------------------------------------------------------
// Identifier
// ---------------------------------------------------------------------------

/// Turn a title into a lowercase, hyphen-separated identifier.
pub fn slugify(title: &str) -> String {
    static NON_ALNUM_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"[^a-z0-9]+").expect("valid regex"));

    let lower = title.to_lowercase();
    let slug = NON_ALNUM_RE.replace_all(&lower, "-");
    slug.trim_matches('-').chars().take(SLUG_MAX_LEN).collect()
}

// ---------------------------------------------------------------------------
// Title / category
// ---------------------------------------------------------------------------

/// Display title and category resolved from the metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleParts {
    pub title: String,
    pub category: String,
}

/// Resolve the display title and category.
///
/// A title shaped like `word/rest` names its own category: `word` (lowercased)
/// wins over the metadata `category`, and `rest` becomes the title. Only a
/// single leading word is recognized: the match is anchored at the start of
/// the title, so a `/` later in the title (`Intro to TCP/IP`) never splits.
pub fn split_category(title: &str, category: Option<&str>, default_category: &str) -> TitleParts {
    static PREFIXED_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"^([A-Za-z0-9_]+)/(.+)$").expect("valid regex"));

    if let Some(caps) = PREFIXED_RE.captures(title) {
        return TitleParts {
            title: caps[2].trim().to_string(),
            category: caps[1].to_lowercase(),
        };
    }

    TitleParts {
        title: title.to_string(),
        category: category
            .filter(|c| !c.is_empty())
            .unwrap_or(default_category)
            .to_string(),
    }
}

// ---------------------------------------------------------------------------
// Tags / difficulty
// ---------------------------------------------------------------------------

/// Normalize the `tags` metadata value into a list.
///
/// A scalar is read as a comma-separated list with any brackets or quotes
/// removed.
pub fn normalize_tags(value: Option<&MetaValue>) -> Vec<String> {
    match value {
        None => Vec::new(),
        Some(MetaValue::List(items)) => items.clone(),
        Some(MetaValue::Scalar(raw)) => raw
            .replace(|c: char| matches!(c, '[' | ']' | '"' | '\''), "")
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(String::from)
            .collect(),
    }
}

/// Pull the difficulty out of the tag list.
///
/// The first vocabulary tag decides the difficulty; every vocabulary tag and
/// every empty tag is dropped from the returned list.
pub fn extract_difficulty(tags: Vec<String>) -> (Difficulty, Vec<String>) {
    let difficulty = tags
        .iter()
        .find_map(|t| Difficulty::from_tag(t))
        .unwrap_or_default();

    let remaining = tags
        .into_iter()
        .filter(|t| !t.is_empty() && Difficulty::from_tag(t).is_none())
        .collect();

    (difficulty, remaining)
}

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

/// The subtitle when present, else the first body line, truncated.
pub fn summarize(subtitle: Option<&str>, body: &str) -> String {
    if let Some(subtitle) = subtitle.filter(|s| !s.is_empty()) {
        return subtitle.to_string();
    }

    body.lines()
        .next()
        .unwrap_or_default()
        .chars()
        .take(SUMMARY_MAX_CHARS)
        .collect()
}

// ---------------------------------------------------------------------------
// Mitigations
// ---------------------------------------------------------------------------

/// Collect bullet points from the first mitigation-style section.
///
/// The section starts at a heading beginning with one of `mitigation`,
/// `defense`, `protection`, `countermeasure` or `remediation` (any case) and
/// ends at the next other heading.
pub fn extract_mitigations(body: &str) -> Vec<String> {
    static SECTION_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"(?i)^#+\s*(?:mitigation|defense|protection|countermeasure|remediation)")
            .expect("valid regex")
    });
    static HEADING_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"^#+\s").expect("valid regex"));
    static BULLET_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"^[-*]\s+(.*)$").expect("valid regex"));

    let mut mitigations = Vec::new();
    let mut in_section = false;

    for line in body.lines() {
        if SECTION_RE.is_match(line) {
            in_section = true;
            continue;
        }
        if !in_section {
            continue;
        }
        if HEADING_RE.is_match(line) {
            break;
        }
        if let Some(caps) = BULLET_RE.captures(line) {
            let item = caps[1].trim();
            if !item.is_empty() && mitigations.len() < MAX_MITIGATIONS {
                mitigations.push(item.to_string());
            }
        }
    }

    if mitigations.is_empty() {
        return FALLBACK_MITIGATIONS.iter().map(|m| m.to_string()).collect();
    }
    mitigations
}

// ---------------------------------------------------------------------------
// Hash
// ---------------------------------------------------------------------------

/// Integrity fingerprint of the body: `sha512:` plus the first 12 hex digits.
pub fn content_hash(body: &str) -> String {
    let mut hasher = Sha512::new();
    hasher.update(body.as_bytes());
    let hex = format!("{:x}", hasher.finalize());
    format!("{HASH_PREFIX}{}", &hex[..HASH_HEX_LEN])
}
