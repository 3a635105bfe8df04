//! PDF Merger CLI - Command line tool for merging PDF documents.

use anyhow::{Context, Result};
use clap::Parser;
use pdf_merger_core::{merge_files, util::merged_filename, AppConfig};
use std::path::{Path, PathBuf};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "pdf-merge")]
#[command(author, version, about = "Merge two PDF documents", long_about = None)]
struct Args {
    /// Top page PDF (its pages come first in the output)
    #[arg(required = true)]
    top: PathBuf,

    /// Script page PDF (its pages follow the top pages)
    #[arg(required = true)]
    script: PathBuf,

    /// Output PDF file (default: <prefix>_<top>_<script>.pdf next to the top file)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Overwrite the output file if it already exists
    #[arg(long)]
    force: bool,

    /// Config file path
    #[arg(short, long, env = "PDF_MERGER_CONFIG")]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Default output path: derived name, placed next to the top input.
fn default_output(config: &AppConfig, top: &Path, script: &Path) -> PathBuf {
    let name_of = |path: &Path| {
        path.file_name()
            .map_or_else(|| "document.pdf".to_string(), |n| n.to_string_lossy().into_owned())
    };

    let file_name = merged_filename(&config.download_prefix, &name_of(top), &name_of(script));
    top.with_file_name(file_name)
}

fn main() -> Result<()> {
    // Load .env file if present (before parsing args so env vars are available)
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Setup logging
    let log_level = match args.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .init();

    // Load or create config
    let config = if let Some(config_path) = &args.config {
        AppConfig::from_file(config_path).context("Failed to load config file")?
    } else {
        AppConfig::load()
    };

    let output_path = args
        .output
        .clone()
        .unwrap_or_else(|| default_output(&config, &args.top, &args.script));

    if output_path.exists() && !args.force {
        anyhow::bail!(
            "Output file {} already exists (use --force to overwrite)",
            output_path.display()
        );
    }

    info!(
        "Merging {} and {}",
        args.top.display(),
        args.script.display()
    );

    let merged = merge_files(&args.top, &args.script).with_context(|| {
        format!(
            "Failed to merge {} and {}",
            args.top.display(),
            args.script.display()
        )
    })?;

    std::fs::write(&output_path, merged.bytes())
        .context(format!("Failed to write output: {}", output_path.display()))?;

    // CLI output is intentional
    #[allow(clippy::print_stdout)]
    {
        println!(
            "Merged PDF saved to: {} ({} pages)",
            output_path.display(),
            merged.page_count()
        );
    }

    Ok(())
}
