//! Document assembler.
//!
//! Takes one raw source document, splits off its frontmatter, renders the
//! body and derives the remaining fields into a [`ContentRecord`].

use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use tracing::{debug, instrument};

use writeups_markdown::{parse_frontmatter, render};
use writeups_shared::{ContentRecord, MetaValue, Result, WriteupError};

use crate::derive::{
    DEFAULT_CATEGORY, content_hash, extract_difficulty, extract_mitigations, normalize_tags,
    slugify, split_category, summarize,
};

/// Builds records for one conversion run.
///
/// All records of a run share the same fallback date, the run's start time.
#[derive(Debug, Clone)]
pub struct Assembler {
    default_category: String,
    generated_at: String,
}

impl Assembler {
    /// Create an assembler stamping undated documents with `now`.
    pub fn new(default_category: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            default_category: default_category.into(),
            generated_at: now.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }

    /// Fallback date for documents without a `date` key.
    pub fn generated_at(&self) -> &str {
        &self.generated_at
    }

    /// Assemble a record from raw document text.
    pub fn assemble(&self, raw: &str) -> Result<ContentRecord> {
        let doc = parse_frontmatter(raw);
        let meta = &doc.metadata;

        let raw_title = match meta.get("title") {
            Some(MetaValue::Scalar(title)) => title.as_str(),
            Some(MetaValue::List(_)) => {
                return Err(WriteupError::parse("`title` must be a single value, not a list"));
            }
            None => return Err(WriteupError::missing_field("title")),
        };

        let parts = split_category(raw_title, meta.get_str("category"), &self.default_category);
        let (difficulty, tags) = extract_difficulty(normalize_tags(meta.get("tags")));

        let date = meta
            .get_str("date")
            .filter(|d| !d.is_empty())
            .unwrap_or(&self.generated_at)
            .to_string();

        let record = ContentRecord {
            id: slugify(&parts.title),
            summary: summarize(meta.get_str("subtitle"), doc.body),
            content: render(doc.body),
            hash: content_hash(doc.body),
            mitigations: extract_mitigations(doc.body),
            title: parts.title,
            category: parts.category,
            difficulty,
            tags,
            date,
        };

        debug!(
            id = %record.id,
            category = %record.category,
            difficulty = %record.difficulty,
            tags = record.tags.len(),
            "record assembled"
        );

        Ok(record)
    }

    /// Read and assemble a single source file.
    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn parse_file(&self, path: &Path) -> Result<ContentRecord> {
        let raw = std::fs::read_to_string(path).map_err(|e| WriteupError::io(path, e))?;
        self.assemble(&raw)
    }
}

/// Convenience wrapper: assemble `raw` with default settings.
pub fn assemble(raw: &str, now: DateTime<Utc>) -> Result<ContentRecord> {
    Assembler::new(DEFAULT_CATEGORY, now).assemble(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use writeups_shared::Difficulty;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    const FULL_DOC: &str = "---\n\
title: \"web/SQL Injection Basics\"\n\
subtitle: Breaking login forms\n\
date: 2024-02-10\n\
tags: [sqli, Hard, auth]\n\
author: someone\n\
---\n\
\n\
# Overview\n\
\n\
Attackers abuse **unsanitized** input.\n\
\n\
## Mitigations\n\
\n\
- Use parameterized queries\n\
- Apply least privilege\n\
\n\
## References\n\
\n\
- OWASP\n";

    #[test]
    fn assembles_full_document() {
        let record = assemble(FULL_DOC, fixed_now()).unwrap();

        assert_eq!(record.id, "sql-injection-basics");
        assert_eq!(record.title, "SQL Injection Basics");
        assert_eq!(record.category, "web");
        assert_eq!(record.difficulty, Difficulty::Hard);
        assert_eq!(record.tags, vec!["sqli", "auth"]);
        assert_eq!(record.summary, "Breaking login forms");
        assert_eq!(record.date, "2024-02-10");
        assert_eq!(
            record.mitigations,
            vec!["Use parameterized queries", "Apply least privilege"]
        );
        assert!(record.content.starts_with("<h1>Overview</h1>"));
        assert!(record.content.contains("<strong>unsanitized</strong>"));
        assert!(record.hash.starts_with("sha512:"));
        assert_eq!(record.hash.len(), "sha512:".len() + 12);
    }

    #[test]
    fn hash_covers_body_only() {
        let a = assemble("---\ntitle: A\n---\nsame body", fixed_now()).unwrap();
        let b = assemble("---\ntitle: B\ndate: 2020-01-01\n---\n\nsame body\n", fixed_now()).unwrap();
        assert_eq!(a.hash, b.hash);
        assert_eq!(a.hash, content_hash("same body"));
    }

    #[test]
    fn defaults_fill_missing_fields() {
        let record = assemble("---\ntitle: Bare\n---\nFirst line here.\nSecond.", fixed_now()).unwrap();

        assert_eq!(record.category, "general");
        assert_eq!(record.difficulty, Difficulty::Medium);
        assert!(record.tags.is_empty());
        assert_eq!(record.summary, "First line here.");
        assert_eq!(record.date, "2024-05-01T12:00:00.000Z");
        assert_eq!(record.mitigations.len(), 3);
    }

    #[test]
    fn explicit_category_used_without_prefix() {
        let record = assemble("---\ntitle: Kernel UAF\ncategory: pwn\n---\nx", fixed_now()).unwrap();
        assert_eq!(record.category, "pwn");
        assert_eq!(record.title, "Kernel UAF");
        assert_eq!(record.id, "kernel-uaf");
    }

    #[test]
    fn custom_default_category() {
        let assembler = Assembler::new("blog", fixed_now());
        let record = assembler.assemble("---\ntitle: Notes\n---\nx").unwrap();
        assert_eq!(record.category, "blog");
        assert_eq!(record.date, assembler.generated_at());
    }

    #[test]
    fn missing_title_is_an_error() {
        let err = assemble("---\nsubtitle: no title\n---\nbody", fixed_now()).unwrap_err();
        assert!(matches!(err, WriteupError::MissingField { ref field } if field == "title"));

        let err = assemble("# No frontmatter at all", fixed_now()).unwrap_err();
        assert!(matches!(err, WriteupError::MissingField { .. }));
    }

    #[test]
    fn list_title_is_an_error() {
        let err = assemble("---\ntitle: [a, b]\n---\n", fixed_now()).unwrap_err();
        assert!(matches!(err, WriteupError::Parse { .. }));
    }

    #[test]
    fn scalar_tags_accepted() {
        let record = assemble("---\ntitle: T\ntags: rev, init\n---\nx", fixed_now()).unwrap();
        assert_eq!(record.difficulty, Difficulty::Init);
        assert_eq!(record.tags, vec!["rev"]);
    }

    #[test]
    fn parse_file_reports_path() {
        let assembler = Assembler::new(DEFAULT_CATEGORY, fixed_now());
        let err = assembler
            .parse_file(Path::new("/definitely/not/here.md"))
            .unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.md"));
    }
}
