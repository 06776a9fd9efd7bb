//! Clean command - normalize and re-bucket a batch crawl result file.

use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;
use console::style;
use glob::glob;
use tracing::{debug, info};

use healthcrawl_core::clean::BatchCleaner;

use super::load_config;

/// Arguments for the clean command.
#[derive(Args)]
pub struct CleanArgs {
    /// Batch result file (default: newest batch_crawl_results_*.json in the output directory)
    input: Option<PathBuf>,

    /// Records below this confidence go to unverified_resources
    #[arg(long)]
    cutoff: Option<f64>,

    /// Directory for the cleaned file
    #[arg(short, long)]
    output_dir: Option<PathBuf>,
}

/// Newest batch result file in `dir`, by file name.
fn latest_batch_file(dir: &Path) -> anyhow::Result<Option<PathBuf>> {
    let pattern = dir.join("batch_crawl_results_*.json");
    let mut files: Vec<PathBuf> = glob(&pattern.to_string_lossy())?
        .filter_map(|r| r.ok())
        .collect();
    files.sort();
    Ok(files.pop())
}

pub async fn run(args: CleanArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;

    let input = match args.input {
        Some(path) => path,
        None => match latest_batch_file(&config.output.dir)? {
            Some(path) => path,
            None => {
                println!(
                    "{} No batch results found in {}",
                    style("ℹ").blue(),
                    config.output.dir.display()
                );
                return Ok(());
            }
        },
    };

    if !input.exists() {
        println!("{} Input file not found: {}", style("✗").red(), input.display());
        return Ok(());
    }

    println!("{} Reading {}", style("ℹ").blue(), input.display());
    let content = fs::read_to_string(&input)?;

    let cleaner = BatchCleaner::new(args.cutoff.unwrap_or(config.extraction.confidence_cutoff));
    let report = cleaner.clean_json(&content)?;

    let unverified: usize = report
        .results
        .iter()
        .filter_map(|site| site.unverified_resources.as_ref())
        .map(Vec::len)
        .sum();
    info!(
        "Kept {} resources, {} unverified (cutoff {})",
        report.summary.total_resources,
        unverified,
        cleaner.cutoff()
    );

    let dest = args.output_dir.unwrap_or_else(|| config.output.cleaned_dir.clone());
    fs::create_dir_all(&dest)?;

    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("batch_crawl_results");
    let out_path = dest.join(format!("{}.cleaned.json", stem));
    fs::write(&out_path, serde_json::to_string_pretty(&report)?)?;
    debug!("Wrote {} bytes", fs::metadata(&out_path)?.len());

    println!(
        "{} Wrote cleaned file to {} ({} verified, {} unverified)",
        style("✓").green(),
        out_path.display(),
        report.summary.total_resources,
        unverified
    );

    Ok(())
}
