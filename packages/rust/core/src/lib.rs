//! Conversion pipeline for the writeup feed.
//!
//! Ties frontmatter parsing, Markdown rendering and field derivation into
//! per-document records, and drives batch conversion of a source directory
//! into the site's JSON feed.

pub mod assembler;
pub mod derive;
pub mod pipeline;

pub use assembler::{Assembler, assemble};
pub use pipeline::{
    ConvertOutcome, ConvertSummary, FileFailure, ProgressReporter, SilentProgress,
    convert_directory,
};
