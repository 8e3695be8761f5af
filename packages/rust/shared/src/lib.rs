//! Shared types, error model, and configuration for the writeup converter.
//!
//! This crate is the foundation depended on by all other workspace crates.
//! It provides:
//! - [`WriteupError`] — the unified error type
//! - Domain types ([`Metadata`], [`MetaValue`], [`ContentRecord`], [`Difficulty`])
//! - Configuration ([`AppConfig`], [`ConvertConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, CONFIG_FILE_NAME, ConvertConfig, ConvertSection, default_config_path, init_config,
    load_config, load_config_from,
};
pub use error::{Result, WriteupError};
pub use types::{ContentRecord, Difficulty, MetaValue, Metadata};
