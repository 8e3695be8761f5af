//! Converter configuration.
//!
//! An optional `writeups.toml` in the working directory (or a path given with
//! `--config`) supplies defaults. CLI arguments override config file values,
//! which override built-in defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, WriteupError};

/// Default configuration file name, looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "writeups.toml";

// ---------------------------------------------------------------------------
// Config structs (matching writeups.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Conversion settings.
    #[serde(default)]
    pub convert: ConvertSection,
}

/// `[convert]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvertSection {
    /// Directory holding the Markdown sources.
    #[serde(default = "default_input_dir")]
    pub input_dir: String,

    /// Path of the JSON feed to write.
    #[serde(default = "default_output_file")]
    pub output_file: String,

    /// File extension (without the dot) of eligible source files.
    #[serde(default = "default_extension")]
    pub extension: String,

    /// Category used when neither the title nor the metadata supplies one.
    #[serde(default = "default_category")]
    pub default_category: String,
}

impl Default for ConvertSection {
    fn default() -> Self {
        Self {
            input_dir: default_input_dir(),
            output_file: default_output_file(),
            extension: default_extension(),
            default_category: default_category(),
        }
    }
}

fn default_input_dir() -> String {
    "./writeups-md".into()
}
fn default_output_file() -> String {
    "./assets/data/writeups.json".into()
}
fn default_extension() -> String {
    "md".into()
}
fn default_category() -> String {
    "general".into()
}

// ---------------------------------------------------------------------------
// Runtime config (merged from config file + CLI arguments)
// ---------------------------------------------------------------------------

/// Runtime conversion configuration.
#[derive(Debug, Clone)]
pub struct ConvertConfig {
    pub input_dir: PathBuf,
    pub output_file: PathBuf,
    pub extension: String,
    pub default_category: String,
}

impl ConvertConfig {
    /// Apply positional CLI overrides on top of the file/default values.
    pub fn with_overrides(mut self, input_dir: Option<PathBuf>, output_file: Option<PathBuf>) -> Self {
        if let Some(dir) = input_dir {
            self.input_dir = dir;
        }
        if let Some(file) = output_file {
            self.output_file = file;
        }
        self
    }
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

impl From<&AppConfig> for ConvertConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            input_dir: PathBuf::from(&config.convert.input_dir),
            output_file: PathBuf::from(&config.convert.output_file),
            extension: config.convert.extension.trim_start_matches('.').to_string(),
            default_category: config.convert.default_category.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Path of the config file in the current working directory.
pub fn default_config_path() -> PathBuf {
    PathBuf::from(CONFIG_FILE_NAME)
}

/// Load the application config.
///
/// An explicit path must exist. Without one, `./writeups.toml` is used when
/// present and built-in defaults otherwise.
pub fn load_config(explicit: Option<&Path>) -> Result<AppConfig> {
    if let Some(path) = explicit {
        return load_config_from(path);
    }

    let path = default_config_path();
    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| WriteupError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| WriteupError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Write a default config file to `path`. Refuses to overwrite an existing file.
pub fn init_config(path: &Path) -> Result<PathBuf> {
    if path.exists() {
        return Err(WriteupError::config(format!(
            "{} already exists",
            path.display()
        )));
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| WriteupError::io(parent, e))?;
    }

    let content = toml::to_string_pretty(&AppConfig::default())
        .map_err(|e| WriteupError::config(e.to_string()))?;

    std::fs::write(path, content).map_err(|e| WriteupError::io(path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path.to_path_buf())
}
