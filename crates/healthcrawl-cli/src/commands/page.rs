//! Page command - extract categorized resources from a single page.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{ArgGroup, Args};
use console::style;
use tracing::info;

use healthcrawl_core::report::group_by_category;
use healthcrawl_core::{Lexicon, PageAggregator, PageCrawlResult};

use super::{file_timestamp, load_config, write_output};
use crate::fetch::PageFetcher;

/// Arguments for the page command.
#[derive(Args)]
#[command(group(ArgGroup::new("input").required(true).args(["url", "file"])))]
pub struct PageArgs {
    /// Page URL to fetch
    url: Option<String>,

    /// Read HTML from a local file instead of fetching
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Save the results as JSON in the output directory
    #[arg(long)]
    save: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// Resources grouped by category
    Text,
    /// JSON output
    Json,
}

pub async fn run(args: PageArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;

    let (url, html) = match (&args.file, &args.url) {
        (Some(path), _) => {
            if !path.exists() {
                anyhow::bail!("Input file not found: {}", path.display());
            }
            (path.display().to_string(), fs::read_to_string(path)?)
        }
        (None, Some(url)) => {
            let fetcher = PageFetcher::new(&config.crawl)?;
            let outcome = fetcher.fetch(url).await;
            match outcome.html {
                Some(html) => (url.clone(), html),
                None => anyhow::bail!(
                    "Failed to fetch {}: {}",
                    url,
                    outcome.error.as_deref().unwrap_or("unknown error")
                ),
            }
        }
        (None, None) => anyhow::bail!("Either a URL or --file is required"),
    };

    info!("Extracting resources from {}", url);
    let lexicon = Arc::new(Lexicon::standard()?);
    let aggregator = PageAggregator::new(lexicon, config.extraction.uncertain_rule);
    let result = aggregator.crawl_html(&url, &html);

    match args.format {
        OutputFormat::Text => print_results(&result),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
    }

    if let Some(error) = &result.error {
        eprintln!("{} Extraction errors: {}", style("⚠").yellow(), error);
    }

    if args.save {
        write_output(
            &config.output.dir,
            &format!("categorized_results_{}.json", file_timestamp()),
            &serde_json::to_string_pretty(&result)?,
            "Results",
        );
    }

    Ok(())
}

fn print_results(result: &PageCrawlResult) {
    println!();
    println!("{}", style(format!("--- Categorized Results for {} ---", result.url)).bold());
    println!("Crawled at: {}", result.timestamp);

    if result.resources.is_empty() {
        println!("  No categorized resources found.");
        return;
    }

    for (category, items) in group_by_category(&result.resources) {
        println!();
        println!("{} ({} items):", style(category).cyan().bold(), items.len());
        for item in items {
            println!("  • {}", item.value);
            println!("    Tags: {}", item.tags.iter().collect::<Vec<_>>().join(", "));
            println!("    Confidence: {}", item.confidence);
        }
    }
}
