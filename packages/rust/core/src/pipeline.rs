//! Batch conversion: source directory → records → sorted JSON feed.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use tracing::{debug, info, instrument, warn};

use writeups_shared::{ContentRecord, ConvertConfig, Result, WriteupError};

use crate::assembler::Assembler;

/// A source file that could not be converted.
#[derive(Debug, Clone)]
pub struct FileFailure {
    /// File name (without directory).
    pub file: String,
    pub message: String,
}

/// Result of a conversion run that wrote a feed.
#[derive(Debug)]
pub struct ConvertSummary {
    /// Number of eligible source files found.
    pub found: usize,
    /// Number of records written.
    pub converted: usize,
    /// Files skipped because of an error.
    pub failures: Vec<FileFailure>,
    /// Records whose id was suffixed to avoid a collision.
    pub renamed_ids: usize,
    /// Where the feed was written.
    pub output_file: PathBuf,
    /// Total elapsed time.
    pub elapsed: Duration,
}

/// Outcome of [`convert_directory`].
#[derive(Debug)]
pub enum ConvertOutcome {
    /// The input directory holds no eligible files; nothing was written.
    NoInput { input_dir: PathBuf },
    Converted(ConvertSummary),
}

/// Progress callback for reporting conversion status.
pub trait ProgressReporter: Send + Sync {
    /// Called once the source files have been enumerated.
    fn found(&self, total: usize);
    /// Called when a file was converted.
    fn parsed(&self, file: &str, id: &str);
    /// Called when a file was skipped.
    fn failed(&self, file: &str, error: &WriteupError);
    /// Called when the feed has been written.
    fn done(&self, summary: &ConvertSummary);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn found(&self, _total: usize) {}
    fn parsed(&self, _file: &str, _id: &str) {}
    fn failed(&self, _file: &str, _error: &WriteupError) {}
    fn done(&self, _summary: &ConvertSummary) {}
}

/// Convert every eligible file in the input directory and write the feed.
///
/// 1. Enumerate source files (fatal if the directory is missing)
/// 2. Assemble each file; failures are reported and skipped
/// 3. Resolve id collisions
/// 4. Sort by date, newest first
/// 5. Write pretty-printed JSON
#[instrument(skip_all, fields(input = %config.input_dir.display(), output = %config.output_file.display()))]
pub fn convert_directory(
    config: &ConvertConfig,
    progress: &dyn ProgressReporter,
) -> Result<ConvertOutcome> {
    let start = Instant::now();

    if !config.input_dir.is_dir() {
        return Err(WriteupError::InputDirMissing {
            path: config.input_dir.clone(),
        });
    }

    let files = list_sources(&config.input_dir, &config.extension)?;
    if files.is_empty() {
        warn!(extension = %config.extension, "no source files found");
        return Ok(ConvertOutcome::NoInput {
            input_dir: config.input_dir.clone(),
        });
    }

    info!(count = files.len(), "found source files");
    progress.found(files.len());

    let assembler = Assembler::new(&config.default_category, Utc::now());
    let (mut records, failures) = convert_files(&assembler, &files, progress);

    let renamed_ids = resolve_id_collisions(&mut records);
    sort_by_date_desc(&mut records);
    write_feed(&config.output_file, &records)?;

    let summary = ConvertSummary {
        found: files.len(),
        converted: records.len(),
        failures,
        renamed_ids,
        output_file: config.output_file.clone(),
        elapsed: start.elapsed(),
    };

    info!(
        converted = summary.converted,
        failed = summary.failures.len(),
        elapsed_ms = summary.elapsed.as_millis() as u64,
        "conversion complete"
    );
    progress.done(&summary);

    Ok(ConvertOutcome::Converted(summary))
}

/// List files in `dir` with the given extension, sorted by file name.
pub fn list_sources(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir).map_err(|e| WriteupError::io(dir, e))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| WriteupError::io(dir, e))?.path();
        if path.is_file() && path.extension() == Some(OsStr::new(extension)) {
            files.push(path);
        }
    }
    files.sort();

    debug!(count = files.len(), "enumerated source files");
    Ok(files)
}

/// Assemble each file, collecting successes and failures in input order.
pub fn convert_files(
    assembler: &Assembler,
    files: &[PathBuf],
    progress: &dyn ProgressReporter,
) -> (Vec<ContentRecord>, Vec<FileFailure>) {
    let mut records = Vec::with_capacity(files.len());
    let mut failures = Vec::new();

    for path in files {
        let file = display_name(path);
        match assembler.parse_file(path) {
            Ok(record) => {
                progress.parsed(&file, &record.id);
                records.push(record);
            }
            Err(e) => {
                // Reported to the user through `progress.failed`.
                info!(file = %file, error = %e, "skipping file");
                progress.failed(&file, &e);
                failures.push(FileFailure {
                    file,
                    message: e.to_string(),
                });
            }
        }
    }

    (records, failures)
}

/// Make ids unique: the first record keeps its id, later duplicates get
/// `-2`, `-3`, ... Returns the number of records renamed.
pub fn resolve_id_collisions(records: &mut [ContentRecord]) -> usize {
    let mut seen: HashSet<String> = HashSet::with_capacity(records.len());
    let mut renamed = 0;

    for record in records.iter_mut() {
        if seen.insert(record.id.clone()) {
            continue;
        }

        let mut n = 2;
        let candidate = loop {
            let candidate = format!("{}-{n}", record.id);
            if !seen.contains(&candidate) {
                break candidate;
            }
            n += 1;
        };

        warn!(id = %record.id, renamed = %candidate, title = %record.title, "duplicate id");
        seen.insert(candidate.clone());
        record.id = candidate;
        renamed += 1;
    }

    renamed
}

/// Stable sort, newest first. Dates that cannot be parsed go last.
pub fn sort_by_date_desc(records: &mut [ContentRecord]) {
    records.sort_by(|a, b| match (parse_date(&a.date), parse_date(&b.date)) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}

/// Parse the date formats found in source metadata. Zone-less values are UTC.
pub fn parse_date(date: &str) -> Option<DateTime<Utc>> {
    let date = date.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(date) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(date, format) {
            return Some(dt.and_utc());
        }
    }
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

/// Write the feed as pretty-printed JSON, creating parent directories.
pub fn write_feed(path: &Path, records: &[ContentRecord]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| WriteupError::io(parent, e))?;
    }

    let json = serde_json::to_string_pretty(records)
        .map_err(|e| WriteupError::validation(format!("JSON serialization failed: {e}")))?;
    std::fs::write(path, json).map_err(|e| WriteupError::io(path, e))?;

    debug!(path = %path.display(), records = records.len(), "wrote feed");
    Ok(())
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
