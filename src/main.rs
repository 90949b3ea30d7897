//! Meetup-Events main entry point
//!
//! This is the command-line interface for the Meetup-Events scraper.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use meetup_events::config::{load_config_with_hash, validate, Config};
use meetup_events::output::{prepare, render, OutputFormat, SortOrder};
use meetup_events::{Crawler, HttpFetcher};
use tracing_subscriber::EnvFilter;

/// Meetup-Events: upcoming events of a meetup group as structured records
///
/// Crawls the group's events page, fetches every upcoming event and prints
/// the extracted records, ordered and limited the way the events API serves
/// them.
#[derive(Parser, Debug)]
#[command(name = "meetup-events")]
#[command(version = "1.0.0")]
#[command(about = "Scrapes a meetup group's upcoming events", long_about = None)]
struct Cli {
    /// Events page to crawl (overrides the configured group url)
    #[arg(value_name = "URL")]
    url: Option<String>,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Date order of the printed events
    #[arg(long, value_enum)]
    sort: Option<SortOrder>,

    /// Maximum number of events to print
    #[arg(long, value_name = "N")]
    limit: Option<usize>,

    /// Output format
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,

    /// Dump the events page's embedded state tree to PATH and exit
    #[arg(long, value_name = "PATH")]
    dump_json: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = resolve_config(&cli)?;
    let crawler = Crawler::new(HttpFetcher::new(&config.http)?);

    if let Some(path) = &cli.dump_json {
        return handle_dump(&crawler, &config.group.url, path).await;
    }

    handle_crawl(&crawler, &config).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// Logs go to stderr so that stdout carries only the rendered events.
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("meetup_events=info,warn"),
            1 => EnvFilter::new("meetup_events=debug,info"),
            2 => EnvFilter::new("meetup_events=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads the configuration file (if any) and layers CLI overrides on top
fn resolve_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };

    if let Some(url) = &cli.url {
        config.group.url = url.clone();
    }
    if let Some(sort) = cli.sort {
        config.output.sort = sort;
    }
    if cli.limit.is_some() {
        config.output.limit = cli.limit;
    }
    if let Some(format) = cli.format {
        config.output.format = format;
    }

    validate(&config).context("Invalid configuration")?;
    Ok(config)
}

/// Handles the --dump-json mode: saves the listing's state tree for inspection
async fn handle_dump(crawler: &Crawler<HttpFetcher>, url: &str, path: &Path) -> anyhow::Result<()> {
    tracing::info!("Fetching {} for inspection", url);
    if !crawler.dump_page(url, path).await? {
        anyhow::bail!("No state tree written to {}", path.display());
    }
    Ok(())
}

/// Handles the default mode: crawl, order, limit and print
async fn handle_crawl(crawler: &Crawler<HttpFetcher>, config: &Config) -> anyhow::Result<()> {
    let events = crawler
        .crawl(&config.group.url)
        .await
        .with_context(|| format!("Crawl of {} failed", config.group.url))?;

    let events = prepare(events, config.output.sort, config.output.limit);
    println!("{}", render(&events, config.output.format)?);

    Ok(())
}
