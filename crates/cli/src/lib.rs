//! # `autotag-cli` Library Crate
//!
//! This crate contains the logic behind the `autotag` binary: argument parsing,
//! configuration resolution and the batch run that tags every input file.

pub mod config;

use anyhow::{anyhow, Result};
use autotag::constants::MAXIMUM_RESIZE_WIDTH;
use autotag::providers::vision::azure::AzureVisionProvider;
use autotag::types::check_threshold;
use autotag::upload::check_resize_width;
use autotag::{
    BatchReport, ConfidencePolicy, MetadataFields, ReconciliationMode, Reconciler, TaggerBuilder,
};
use autotag_xmp::XmpStore;
use clap::Parser;
use crate::config::{get_config, AppConfig};
use std::path::PathBuf;
use tracing::info;

// --- CLI Definition ---

#[derive(Parser, Debug)]
#[command(author, version, long_about = None)]
#[command(about = "Add XMP metadata based on a Computer Vision image analysis.")]
pub struct Cli {
    /// Computer Vision API key (also read from AUTOTAG_API_KEY or the config file)
    #[arg(long)]
    pub key: Option<String>,
    /// Confidence level for adding the caption [default: 0.1]
    #[arg(long, alias = "captionConfidenceLevel", value_parser = parse_confidence)]
    pub caption_confidence_level: Option<f64>,
    /// Confidence level for adding tags [default: 0.1]
    #[arg(long, alias = "tagConfidenceLevel", value_parser = parse_confidence)]
    pub tag_confidence_level: Option<f64>,
    /// Confidence level for adding categories [default: 0.0]
    #[arg(long, alias = "categoryConfidenceLevel", value_parser = parse_confidence)]
    pub category_confidence_level: Option<f64>,
    /// Temporarily resize to this width before uploading; 0 disables [default: 800]
    #[arg(long, alias = "azureResizeWidth", value_parser = parse_resize_width)]
    pub resize_width: Option<u32>,
    /// How categories are merged: replace-top or append-all [default: append-all]
    #[arg(long, value_parser = parse_mode)]
    pub reconciliation_mode: Option<ReconciliationMode>,
    /// Vision API endpoint
    #[arg(long)]
    pub api_url: Option<String>,
    /// Number of files processed concurrently [default: 1]
    #[arg(long, value_parser = clap::value_parser!(u16).range(1..))]
    pub jobs: Option<u16>,
    /// Path to a YAML config file [default: ./autotag.yml if present]
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Input image files
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
}

fn parse_confidence(value: &str) -> Result<f64, String> {
    let parsed: f64 = value
        .parse()
        .map_err(|_| format!("'{value}' is not a number"))?;
    check_threshold("confidence", parsed).map_err(|e| e.to_string())
}

fn parse_resize_width(value: &str) -> Result<u32, String> {
    let parsed: u32 = value.parse().map_err(|_| {
        format!("'{value}' is an invalid width - must be between 0 and {MAXIMUM_RESIZE_WIDTH}")
    })?;
    check_resize_width(parsed).map_err(|e| e.to_string())
}

fn parse_mode(value: &str) -> Result<ReconciliationMode, String> {
    value.parse()
}

// --- Settings Resolution ---

/// Fully resolved run settings: config file and environment, overridden by flags.
#[derive(Debug, Clone)]
pub struct Settings {
    pub api_key: String,
    pub api_url: String,
    pub policy: ConfidencePolicy,
    pub mode: ReconciliationMode,
    pub resize_width: u32,
    pub jobs: usize,
    pub fields: MetadataFields,
}

impl Settings {
    /// Merges command-line overrides into the loaded configuration and validates the result.
    pub fn resolve(cli: &Cli, config: AppConfig) -> Result<Self> {
        let api_key = cli
            .key
            .clone()
            .or(config.api_key)
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                anyhow!("An API key is required: pass --key, set AUTOTAG_API_KEY or add api_key to the config file")
            })?;

        let policy = ConfidencePolicy::new(
            cli.caption_confidence_level.unwrap_or(config.caption_threshold),
            cli.category_confidence_level.unwrap_or(config.category_threshold),
            cli.tag_confidence_level.unwrap_or(config.tag_threshold),
        )?;
        let resize_width = check_resize_width(cli.resize_width.unwrap_or(config.resize_width))?;

        Ok(Self {
            api_key,
            api_url: cli.api_url.clone().unwrap_or(config.api_url),
            policy,
            mode: cli.reconciliation_mode.unwrap_or(config.reconciliation_mode),
            resize_width,
            jobs: cli.jobs.map(usize::from).unwrap_or(config.jobs).max(1),
            fields: config.fields,
        })
    }
}

// --- Public Entrypoint ---

/// Tags every input file and returns the per-file report.
///
/// Configuration problems (invalid thresholds, missing key) fail before any
/// file is touched; per-file failures are only reported.
pub async fn run(cli: Cli) -> Result<BatchReport> {
    let config = get_config(cli.config.as_deref())?;
    let settings = Settings::resolve(&cli, config)?;
    info!(
        "Thresholds: caption {:.2}, category {:.2}, tag {:.2}; mode {}",
        settings.policy.caption, settings.policy.category, settings.policy.tag, settings.mode
    );

    let reconciler = Reconciler::new(settings.policy, settings.mode, settings.fields.clone())?;
    let provider = AzureVisionProvider::new(settings.api_url, settings.api_key)?;
    let store = XmpStore::new(settings.fields)?;
    let tagger = TaggerBuilder::new()
        .vision_provider(Box::new(provider))
        .metadata_store(Box::new(store))
        .reconciler(reconciler)
        .resize_width(settings.resize_width)
        .build()?;

    let report = tagger.process_batch(&cli.files, settings.jobs).await;
    print_report(&report);
    Ok(report)
}

fn print_report(report: &BatchReport) {
    for file in &report.files {
        match &file.result {
            Ok(outcome) if outcome.is_unchanged() => {
                println!("➖ {}: nothing new above the thresholds", file.path.display());
            }
            Ok(outcome) => {
                let caption = outcome.caption.as_deref().unwrap_or("-");
                println!(
                    "✅ {}: caption '{}', +{} categories, +{} tags",
                    file.path.display(),
                    caption,
                    outcome.categories_added.len(),
                    outcome.tags_added.len()
                );
            }
            Err(e) => println!("❌ {}: {}", file.path.display(), e),
        }
    }
    println!(
        "Tagged {} of {} files.",
        report.succeeded(),
        report.files.len()
    );
}
