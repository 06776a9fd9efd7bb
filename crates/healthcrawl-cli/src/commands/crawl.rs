//! Crawl command - extract resources from every site of a site list.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::{ArgGroup, Args};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use healthcrawl_core::report::{render_summary_report, top_organizations};
use healthcrawl_core::{
    CrawlInfo, CrawlLogEntry, CrawlReport, Lexicon, PageAggregator, SiteResult, iso_timestamp,
};

use super::{file_timestamp, load_config, write_output};
use crate::fetch::PageFetcher;
use crate::sites::load_sites;

/// Arguments for the crawl command.
#[derive(Args)]
#[command(group(ArgGroup::new("source").required(true).args(["state", "sites"])))]
pub struct CrawlArgs {
    /// Two-letter state code; reads `<data_dir>/us-<state>.csv`
    #[arg(short, long)]
    state: Option<String>,

    /// Explicit site list file
    #[arg(long)]
    sites: Option<PathBuf>,

    /// Maximum number of sites to crawl
    #[arg(short, long)]
    max_sites: Option<usize>,

    /// Seconds to wait between sites
    #[arg(short, long)]
    delay: Option<u64>,
}

pub async fn run(args: CrawlArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    let list_path = match (&args.sites, &args.state) {
        (Some(path), _) => path.clone(),
        (None, Some(state)) => config.site_list_path(state),
        (None, None) => anyhow::bail!("Either --state or --sites is required"),
    };

    let mut sites = match load_sites(&list_path) {
        Ok(sites) => sites,
        Err(e) => {
            eprintln!("{} Site list not found or unreadable: {:#}", style("✗").red(), e);
            return Ok(());
        }
    };
    sites.truncate(args.max_sites.unwrap_or(config.crawl.max_sites));
    if sites.is_empty() {
        println!("{} No sites to crawl in {}", style("ℹ").blue(), list_path.display());
        return Ok(());
    }

    let label = args
        .state
        .as_deref()
        .map(str::to_uppercase)
        .unwrap_or_else(|| list_path.display().to_string());
    println!(
        "{} Crawling {} health departments from {}",
        style("ℹ").blue(),
        sites.len(),
        style(label).cyan().bold()
    );

    let delay = Duration::from_secs(args.delay.unwrap_or(config.crawl.delay_secs));
    let lexicon = Arc::new(Lexicon::standard()?);
    let aggregator = PageAggregator::new(lexicon, config.extraction.uncertain_rule);
    let fetcher = PageFetcher::new(&config.crawl)?;

    let pb = ProgressBar::new(sites.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} sites {msg}")?
            .progress_chars("=>-"),
    );

    let total = sites.len();
    let mut results = Vec::with_capacity(total);
    let mut log = Vec::with_capacity(total);

    for (i, site) in sites.into_iter().enumerate() {
        pb.set_message(site.metadata.name.clone());
        pb.println(format!(
            "[{}/{}] {} ({}) {}",
            i + 1,
            total,
            style(&site.metadata.name).bold(),
            site.metadata.category,
            site.url
        ));

        let outcome = fetcher.fetch(&site.url).await;
        let success = outcome.is_success();

        let (page, error) = match outcome.html.as_deref() {
            Some(html) => {
                let page = aggregator.crawl_html(&site.url, html);
                let error = page.error.clone();
                (Some(page), error)
            }
            None => (None, outcome.error.clone()),
        };

        log.push(CrawlLogEntry {
            url: site.url.clone(),
            success,
            status_code: outcome.status_code,
            error,
        });

        let result = SiteResult {
            url: page.as_ref().map(|p| p.url.clone()).unwrap_or_else(|| site.url.clone()),
            timestamp: page.as_ref().map(|p| p.timestamp.clone()),
            metadata: site.metadata,
            crawled_at: iso_timestamp(),
            resources: page.map(|p| p.resources).unwrap_or_default(),
            unverified_resources: None,
        };
        pb.println(format!("    Found {} resources", result.resources.len()));
        info!("{}: {} resources", result.metadata.name, result.resources.len());
        results.push(result);
        pb.inc(1);

        if i + 1 < total && !delay.is_zero() {
            debug!("Waiting {:?}", delay);
            tokio::time::sleep(delay).await;
        }
    }

    pb.finish_with_message("Complete");

    let crawl_info = CrawlInfo::from_log(log, iso_timestamp(), config.output.student_name.clone());
    let report = CrawlReport::new(results, Some(crawl_info));

    print_summary(&report);

    let stamp = file_timestamp();
    write_output(
        &config.output.dir,
        &format!("batch_crawl_results_{}.json", stamp),
        &serde_json::to_string_pretty(&report)?,
        "Results",
    );
    write_output(
        &config.output.summary_dir,
        &format!("summary_report_{}.txt", stamp),
        &render_summary_report(&report, &iso_timestamp()),
        "Summary report",
    );

    println!(
        "{} Crawled {} sites in {:?}",
        style("✓").green(),
        report.results.len(),
        start.elapsed()
    );

    Ok(())
}

fn print_summary(report: &CrawlReport) {
    println!();
    println!("{}", style("=== CRAWLING SUMMARY ===").bold());
    println!("Total sites crawled: {}", report.results.len());
    println!("Total resources found: {}", report.summary.total_resources);

    println!();
    println!("Resources by category:");
    for (category, count) in &report.summary.by_category {
        println!("  {}: {}", category, count);
    }

    println!();
    println!("Top organizations by resources found:");
    for (name, count) in top_organizations(&report.results) {
        println!("  {}: {} resources", name, count);
    }

    if let Some(info) = &report.summary.crawl_info {
        println!();
        println!(
            "   {} successful, {} failed",
            style(info.successful_crawls).green(),
            style(info.failed_crawls()).red()
        );
    }
}
