//! Core domain types for the writeup feed.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Metadata
// ---------------------------------------------------------------------------

/// A single frontmatter value: either a plain string or a bracketed list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetaValue {
    Scalar(String),
    List(Vec<String>),
}

impl MetaValue {
    /// The value as a string, if it is a scalar.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Scalar(s) => Some(s),
            Self::List(_) => None,
        }
    }
}

impl From<&str> for MetaValue {
    fn from(s: &str) -> Self {
        Self::Scalar(s.to_string())
    }
}

impl From<Vec<String>> for MetaValue {
    fn from(items: Vec<String>) -> Self {
        Self::List(items)
    }
}

/// Key/value metadata parsed from a document's frontmatter block.
///
/// Keys are kept sorted; inserting an existing key replaces its value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Metadata(BTreeMap<String, MetaValue>);

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value, replacing any earlier value under the same key.
    pub fn insert(&mut self, key: impl Into<String>, value: MetaValue) {
        self.0.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&MetaValue> {
        self.0.get(key)
    }

    /// Scalar value for `key`. List values are not coerced.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(MetaValue::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &MetaValue)> {
        self.0.iter()
    }
}

// ---------------------------------------------------------------------------
// Difficulty
// ---------------------------------------------------------------------------

/// Difficulty classification, taken from the closed tag vocabulary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Init,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    /// Match a tag against the vocabulary, ignoring case.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.to_lowercase().as_str() {
            "init" => Some(Self::Init),
            "medium" => Some(Self::Medium),
            "hard" => Some(Self::Hard),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ContentRecord
// ---------------------------------------------------------------------------

/// One entry of the JSON feed consumed by the site.
///
/// Every field is always serialized; the site indexes records by `id` and
/// filters on `category`, `difficulty` and `tags`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentRecord {
    /// Slug derived from the title.
    pub id: String,
    /// Display title, without any `category/` prefix.
    pub title: String,
    pub category: String,
    pub difficulty: Difficulty,
    /// Subtitle, or the first body line truncated.
    pub summary: String,
    /// Rendered HTML fragment.
    pub content: String,
    pub tags: Vec<String>,
    /// `sha512:` followed by a truncated hex digest of the body.
    pub hash: String,
    pub mitigations: Vec<String>,
    /// ISO-8601 date string.
    pub date: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metadata_last_insert_wins() {
        let mut meta = Metadata::new();
        meta.insert("title", "First".into());
        meta.insert("title", "Second".into());
        assert_eq!(meta.len(), 1);
        assert_eq!(meta.get_str("title"), Some("Second"));
    }

    #[test]
    fn list_values_are_not_scalars() {
        let mut meta = Metadata::new();
        meta.insert("tags", vec!["web".to_string()].into());
        assert_eq!(meta.get_str("tags"), None);
        assert!(matches!(meta.get("tags"), Some(MetaValue::List(v)) if v == &["web"]));
    }

    #[test]
    fn difficulty_from_tag_is_case_insensitive() {
        assert_eq!(Difficulty::from_tag("HARD"), Some(Difficulty::Hard));
        assert_eq!(Difficulty::from_tag("Init"), Some(Difficulty::Init));
        assert_eq!(Difficulty::from_tag("easy"), None);
        assert_eq!(Difficulty::default(), Difficulty::Medium);
    }

    #[test]
    fn record_serializes_every_field() {
        let record = ContentRecord {
            id: "sqli".into(),
            title: "SQLi".into(),
            category: "web".into(),
            difficulty: Difficulty::Hard,
            summary: String::new(),
            content: "<p>x</p>".into(),
            tags: vec![],
            hash: "sha512:000000000000".into(),
            mitigations: vec![],
            date: "2024-01-01".into(),
        };
        let value = serde_json::to_value(&record).expect("serialize");
        let obj = value.as_object().expect("object");
        for key in [
            "id", "title", "category", "difficulty", "summary", "content", "tags", "hash",
            "mitigations", "date",
        ] {
            assert!(obj.contains_key(key), "missing {key}");
        }
        assert_eq!(obj["difficulty"], "hard");
        assert_eq!(obj["tags"], serde_json::json!([]));
    }
}
