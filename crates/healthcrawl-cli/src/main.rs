//! CLI application for health-department resource crawling.

mod commands;
mod fetch;
mod sites;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use commands::{clean, config, crawl, page};

/// healthcrawl - Extract phone numbers, addresses and facilities from health-department sites
#[derive(Parser)]
#[command(name = "healthcrawl")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Crawl the sites of a state site list
    Crawl(crawl::CrawlArgs),

    /// Extract resources from a single page
    Page(page::PageArgs),

    /// Clean a batch crawl result file
    Clean(clean::CleanArgs),

    /// Manage configuration
    Config(config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Crawl(args) => crawl::run(args, cli.config.as_deref()).await,
        Commands::Page(args) => page::run(args, cli.config.as_deref()).await,
        Commands::Clean(args) => clean::run(args, cli.config.as_deref()).await,
        Commands::Config(args) => config::run(args).await,
    }
}
