//! Frontmatter extraction.
//!
//! A document may open with a metadata block of `key: value` lines fenced by
//! `---` lines:
//!
//! ```text
//! ---
//! title: "web/SQL Injection Basics"
//! tags: [sqli, "hard"]
//! ---
//!
//! # Body starts here
//! ```
//!
//! This is not YAML. Values are plain strings, optionally quoted, or a
//! single-line bracketed list.

use std::sync::LazyLock;

use regex::Regex;

use writeups_shared::{MetaValue, Metadata};

/// Result of splitting a document into metadata and body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frontmatter<'a> {
    /// Parsed metadata (empty when no block was found).
    pub metadata: Metadata,
    /// Document body. Trimmed when a block was found, otherwise the full input.
    pub body: &'a str,
    /// Whether a frontmatter block was found at the start of the document.
    pub had_frontmatter: bool,
}

/// Split `raw` into frontmatter metadata and body.
///
/// The block is only recognized at the very start of the text.
pub fn parse_frontmatter(raw: &str) -> Frontmatter<'_> {
    static BLOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"(?s)\A---[ \t]*\r?\n(?:(.*?)\r?\n)?---[ \t]*(?:\r?\n|\z)")
            .expect("valid regex")
    });

    let Some(caps) = BLOCK_RE.captures(raw) else {
        return Frontmatter {
            metadata: Metadata::new(),
            body: raw,
            had_frontmatter: false,
        };
    };

    let block = caps.get(1).map_or("", |m| m.as_str());
    let end = caps.get(0).map_or(0, |m| m.end());

    Frontmatter {
        metadata: parse_block(block),
        body: raw[end..].trim(),
        had_frontmatter: true,
    }
}

/// Parse the lines between the `---` fences.
fn parse_block(block: &str) -> Metadata {
    let mut metadata = Metadata::new();

    for line in block.lines() {
        let (key, value) = line.split_once(':').unwrap_or((line, ""));
        let key = key.trim();
        if key.is_empty() {
            continue;
        }
        metadata.insert(key, parse_value(value.trim()));
    }

    metadata
}

fn parse_value(value: &str) -> MetaValue {
    let value = strip_matching_quotes(value);

    match value
        .strip_prefix('[')
        .and_then(|v| v.strip_suffix(']'))
    {
        Some(inner) if inner.trim().is_empty() => MetaValue::List(Vec::new()),
        Some(inner) => MetaValue::List(
            inner
                .split(',')
                .map(|item| strip_edge_quotes(item.trim()).to_string())
                .collect(),
        ),
        None => MetaValue::Scalar(value.to_string()),
    }
}

/// Strip one pair of matching `"` or `'` wrapping the whole value.
fn strip_matching_quotes(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}

/// Strip at most one quote character from each end, matching or not.
fn strip_edge_quotes(item: &str) -> &str {
    let is_quote = |c: char| c == '"' || c == '\'';
    let item = item.strip_prefix(is_quote).unwrap_or(item);
    item.strip_suffix(is_quote).unwrap_or(item)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_block_returns_input_unchanged() {
        for raw in [
            "# Heading\n\nText",
            "",
            "  ---\ntitle: x\n---\n",
            "text\n---\ntitle: x\n---\n",
        ] {
            let fm = parse_frontmatter(raw);
            assert!(fm.metadata.is_empty());
            assert_eq!(fm.body, raw);
            assert!(!fm.had_frontmatter);
        }
    }

    #[test]
    fn parses_scalars_quotes_and_lists() {
        let raw = "---\n\
                   title: \"web/SQL Injection Basics\"\n\
                   subtitle: 'A primer'\n\
                   date: 2024-03-01\n\
                   tags: [sqli, \"web\", 'hard']\n\
                   ---\n\n# Intro\n";
        let fm = parse_frontmatter(raw);

        assert!(fm.had_frontmatter);
        assert_eq!(fm.metadata.len(), 4);
        assert_eq!(fm.metadata.get_str("title"), Some("web/SQL Injection Basics"));
        assert_eq!(fm.metadata.get_str("subtitle"), Some("A primer"));
        assert_eq!(fm.metadata.get_str("date"), Some("2024-03-01"));
        assert_eq!(
            fm.metadata.get("tags"),
            Some(&MetaValue::List(vec![
                "sqli".to_string(),
                "web".to_string(),
                "hard".to_string()
            ]))
        );
        assert_eq!(fm.body, "# Intro");
    }

    #[test]
    fn value_keeps_text_after_first_colon() {
        let fm = parse_frontmatter("---\ndate: 2024-01-15T10:30:00Z\n---\nbody");
        assert_eq!(fm.metadata.get_str("date"), Some("2024-01-15T10:30:00Z"));
        assert_eq!(fm.body, "body");
    }

    #[test]
    fn empty_keys_are_skipped_and_duplicates_overwrite() {
        let raw = "---\n: orphan\n\ntitle: one\ntitle: two\n---\n";
        let fm = parse_frontmatter(raw);
        assert_eq!(fm.metadata.len(), 1);
        assert_eq!(fm.metadata.get_str("title"), Some("two"));
        assert_eq!(fm.body, "");
    }

    #[test]
    fn line_without_colon_is_key_with_empty_value() {
        let fm = parse_frontmatter("---\ndraft\n---\n");
        assert_eq!(fm.metadata.get_str("draft"), Some(""));
    }

    #[test]
    fn empty_block_is_recognized() {
        let fm = parse_frontmatter("---\n---\nHello");
        assert!(fm.had_frontmatter);
        assert!(fm.metadata.is_empty());
        assert_eq!(fm.body, "Hello");
    }

    #[test]
    fn lone_quote_is_not_a_pair() {
        let fm = parse_frontmatter("---\nsubtitle: \"\n---\n");
        assert_eq!(fm.metadata.get_str("subtitle"), Some("\""));
    }

    #[test]
    fn empty_brackets_are_empty_list() {
        let fm = parse_frontmatter("---\ntags: []\n---\n");
        assert_eq!(fm.metadata.get("tags"), Some(&MetaValue::List(vec![])));
    }

    #[test]
    fn crlf_documents_parse() {
        let fm = parse_frontmatter("---\r\ntitle: Win\r\n---\r\nBody\r\n");
        assert_eq!(fm.metadata.get_str("title"), Some("Win"));
        assert_eq!(fm.body, "Body");
    }

    #[test]
    fn entry_count_matches_distinct_lines() {
        let keys = ["a", "b", "c", "d", "e"];
        let block: String = keys.iter().map(|k| format!("{k}: value-{k}\n")).collect();
        let raw = format!("---\n{block}---\nbody");
        let fm = parse_frontmatter(&raw);
        assert_eq!(fm.metadata.len(), keys.len());
        for k in keys {
            assert_eq!(fm.metadata.get_str(k), Some(format!("value-{k}").as_str()));
        }
    }
}
