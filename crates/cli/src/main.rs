//! # autotag: Computer Vision Metadata Tagger
//!
//! This is the main entry point for the `autotag` command-line interface.
//! All logic is delegated to the `autotag_cli` library crate.

use anyhow::Result;
use autotag_cli::{run, Cli};
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

// --- Main Application Entry ---

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // 1. Setup logging to stderr, keeping stdout for the per-file summary.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = fmt::Subscriber::builder()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_ansi(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // 2. Parse CLI arguments
    let cli = Cli::parse();

    // 3. Run the batch and turn failures into a non-zero exit status
    match run(cli).await {
        Ok(report) if report.is_success() => Ok(()),
        Ok(report) => {
            eprintln!(
                "[autotag] {} of {} files failed",
                report.failed(),
                report.files.len()
            );
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("[autotag error] {:?}", e);
            std::process::exit(1);
        }
    }
}
