//! Book-Harvest main entry point
//!
//! This is the command-line interface for the Book-Harvest crawler.

use anyhow::Context;
use book_harvest::config::{load_config_with_hash, validate, Config};
use book_harvest::crawler::Coordinator;
use book_harvest::output::{print_manifest, print_report};
use book_harvest::storage::{Manifest, SqliteManifest};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Book-Harvest: fetch every book linked from an aggregator index page
///
/// Visits each subpage linked from the index, follows its download button
/// and saves the file unless it is already present. Partial files left by an
/// interrupted run are removed first.
#[derive(Parser, Debug)]
#[command(name = "book-harvest")]
#[command(version)]
#[command(about = "Download every book linked from an index page", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults are used when omitted)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Override the destination directory
    #[arg(short, long, value_name = "DIR")]
    dest: Option<PathBuf>,

    /// Override the index page URL
    #[arg(long, value_name = "URL")]
    index_url: Option<String>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without crawling
    #[arg(long, conflicts_with = "manifest")]
    dry_run: bool,

    /// Show the downloads recorded in the manifest and exit
    #[arg(long, conflicts_with = "dry_run")]
    manifest: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let (mut config, config_hash) = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (config, hash)
        }
        None => {
            tracing::debug!("No configuration file given, using defaults");
            (Config::default(), String::new())
        }
    };

    if let Some(dest) = cli.dest {
        config.download.destination_dir = dest;
    }
    if let Some(index_url) = cli.index_url {
        config.site.index_url = index_url;
    }
    validate(&config).context("Invalid configuration")?;

    if cli.dry_run {
        handle_dry_run(&config);
    } else if cli.manifest {
        handle_manifest(&config)?;
    } else {
        handle_crawl(config, config_hash).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("book_harvest=info,warn"),
            1 => EnvFilter::new("book_harvest=debug,info"),
            2 => EnvFilter::new("book_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: shows the effective configuration
fn handle_dry_run(config: &Config) {
    println!("=== Book-Harvest Dry Run ===\n");

    println!("Site:");
    println!("  Index URL: {}", config.site.index_url);
    println!(
        "  Download button selector: {}",
        config.site.download_button_selector
    );

    println!("\nDownload:");
    println!(
        "  Destination: {}",
        config.download.destination_dir.display()
    );
    println!(
        "  Partial suffix: .{}",
        config.download.normalized_suffix()
    );
    match &config.download.manifest_path {
        Some(path) => println!("  Manifest: {}", path.display()),
        None => println!("  Manifest: disabled"),
    }

    println!("\nHTTP:");
    println!("  User agent: {}", config.http.user_agent);
    println!(
        "  Timeouts: request {}s, connect {}s, download {}s",
        config.http.request_timeout_secs,
        config.http.connect_timeout_secs,
        config.http.download_timeout_secs
    );

    println!("\n✓ Configuration is valid");
}

/// Handles the --manifest mode: lists recorded downloads
fn handle_manifest(config: &Config) -> anyhow::Result<()> {
    let path = config
        .download
        .manifest_path
        .as_ref()
        .context("No manifest-path configured")?;

    let manifest = SqliteManifest::new(path)
        .with_context(|| format!("Failed to open manifest {}", path.display()))?;
    let records = manifest.list_downloads()?;
    print_manifest(&records);

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config, config_hash: String) -> anyhow::Result<()> {
    tracing::info!(
        "Harvesting {} into {}",
        config.site.index_url,
        config.download.destination_dir.display()
    );

    let mut coordinator = Coordinator::new(config)?.with_config_hash(config_hash);

    match coordinator.run().await {
        Ok(report) => {
            print_report(&report);
            println!(
                "Time taken in seconds : {:.3}",
                report.elapsed.as_secs_f64()
            );
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}
