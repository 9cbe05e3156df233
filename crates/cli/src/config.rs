//! # Application Configuration
//!
//! This module defines the configuration structure for `autotag` and the logic
//! for loading it from an optional `autotag.yml` file and environment variables.
//! Command-line flags are applied on top by the caller.

use autotag::constants::{
    DEFAULT_CAPTION_THRESHOLD, DEFAULT_CATEGORY_THRESHOLD, DEFAULT_RESIZE_WIDTH,
    DEFAULT_TAG_THRESHOLD, DEFAULT_VISION_API_URL,
};
use autotag::{MetadataFields, ReconciliationMode};
use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use regex::Regex;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::info;

/// The configuration file picked up from the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "autotag.yml";

/// A custom error type for configuration issues.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Indicates an error from the underlying `config` crate.
    #[error("Configuration error: {0}")]
    General(#[from] config::ConfigError),
    /// Indicates an explicitly requested configuration file was not found.
    #[error("Config file not found at '{0}'")]
    NotFound(String),
    #[error("Failed to read config file '{path}': {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
}

/// The root configuration structure, mapping directly to `autotag.yml`.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// The vision API subscription key. Loaded from `AUTOTAG_API_KEY`.
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default = "default_caption_threshold")]
    pub caption_threshold: f64,
    #[serde(default = "default_category_threshold")]
    pub category_threshold: f64,
    #[serde(default = "default_tag_threshold")]
    pub tag_threshold: f64,
    #[serde(default)]
    pub reconciliation_mode: ReconciliationMode,
    /// Width images are shrunk to before upload; `0` disables resizing.
    #[serde(default = "default_resize_width")]
    pub resize_width: u32,
    /// Maximum number of files processed concurrently.
    #[serde(default = "default_jobs")]
    pub jobs: usize,
    /// Target XMP properties for caption, categories and tags.
    #[serde(default)]
    pub fields: MetadataFields,
}

fn default_api_url() -> String {
    DEFAULT_VISION_API_URL.to_string()
}

fn default_caption_threshold() -> f64 {
    DEFAULT_CAPTION_THRESHOLD
}

fn default_category_threshold() -> f64 {
    DEFAULT_CATEGORY_THRESHOLD
}

fn default_tag_threshold() -> f64 {
    DEFAULT_TAG_THRESHOLD
}

fn default_resize_width() -> u32 {
    DEFAULT_RESIZE_WIDTH
}

fn default_jobs() -> usize {
    1
}

// Helper to read a file and substitute `${VAR}` references from the environment.
// Returns Ok(None) if the file does not exist, or an error if it fails to read.
fn read_and_substitute(path: &Path) -> Result<Option<String>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })?;

    Ok(Some(substitute_env(&content)))
}

/// Replaces `${VAR}` with the value of the environment variable, or an empty string.
fn substitute_env(content: &str) -> String {
    let re = Regex::new(r"\$\{(?P<var>[A-Z0-9_]+)\}").expect("static regex is valid");
    re.replace_all(content, |caps: &regex::Captures| {
        env::var(&caps["var"]).unwrap_or_default()
    })
    .into_owned()
}

/// Loads the application configuration from a file and environment variables.
///
/// Layers, lowest priority first:
/// 1. built-in defaults,
/// 2. `config_path`, or `autotag.yml` in the working directory if present,
/// 3. `AUTOTAG_`-prefixed environment variables (`AUTOTAG_TAG_THRESHOLD`,
///    `AUTOTAG_FIELDS__TAG__NAME`, ...).
pub fn get_config(config_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = ConfigBuilder::builder();

    let content = match config_path {
        Some(path) => Some(
            read_and_substitute(path)?
                .ok_or_else(|| ConfigError::NotFound(path.display().to_string()))?,
        ),
        None => read_and_substitute(Path::new(DEFAULT_CONFIG_FILE))?,
    };
    if let Some(content) = content {
        info!("Loading configuration file.");
        builder = builder.add_source(File::from_str(&content, FileFormat::Yaml));
    }

    let settings = builder
        .add_source(
            Environment::with_prefix("AUTOTAG")
                .prefix_separator("_")
                .try_parsing(true)
                .separator("__"),
        )
        .build()?;

    Ok(settings.try_deserialize()?)
}
