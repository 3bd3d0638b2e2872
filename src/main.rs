//! Threadsift main entry point
//!
//! Command-line interface for the threadsift extraction tool.

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use threadsift::config::{load_config_with_hash, Config};
use threadsift::crawl::Orchestrator;
use threadsift::fetch::Fetcher;
use threadsift::model::Sort;
use threadsift::news::search_news;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Threadsift: discussion-thread and news-listing extraction
///
/// Threadsift pulls posts and nested comment trees out of a discussion
/// source, and article rows out of a news listing, pacing its requests and
/// degrading gracefully when individual items fail.
#[derive(Parser, Debug)]
#[command(name = "threadsift")]
#[command(version = "1.0.0")]
#[command(about = "Discussion-thread and news-listing extractor", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults apply when omitted)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract one item and its full comment tree
    Post {
        /// Item URL on the canonical host
        url: String,

        /// Comment sort order: hot, new, top, controversial
        #[arg(long, default_value = "new")]
        sort: Sort,
    },
    /// Run a listing-mode extraction for a source
    Listing {
        /// Source name (the part after /r/)
        source: String,

        /// Listing sort order: hot, new, top, controversial
        #[arg(long, default_value = "hot")]
        sort: Sort,

        /// Override the configured time window (days)
        #[arg(long)]
        days: Option<u32>,

        /// Override the configured per-run item cap
        #[arg(long)]
        max_items: Option<usize>,
    },
    /// Search the news listing for a query
    News {
        /// Search query
        query: String,

        /// Country code for locale parameters
        #[arg(long, default_value = "US")]
        country: String,

        /// Maximum article rows to collect
        #[arg(long, default_value_t = 100)]
        max_articles: usize,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) =
                load_config_with_hash(path).context("failed to load configuration")?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };

    let cancel = CancellationToken::new();
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, finishing up");
            signal_cancel.cancel();
        }
    });

    match cli.command {
        Command::Post { url, sort } => handle_post(config, cancel, &url, sort).await,
        Command::Listing {
            source,
            sort,
            days,
            max_items,
        } => handle_listing(config, cancel, &source, sort, days, max_items).await,
        Command::News {
            query,
            country,
            max_articles,
        } => handle_news(config, cancel, &query, &country, max_articles).await,
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("threadsift=info,warn"),
            1 => EnvFilter::new("threadsift=debug,info"),
            2 => EnvFilter::new("threadsift=trace,debug"),
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

/// Handles the `post` subcommand: single-item extraction
async fn handle_post(
    config: Config,
    cancel: CancellationToken,
    url: &str,
    sort: Sort,
) -> anyhow::Result<()> {
    let mut orchestrator = Orchestrator::new(&config, cancel)?;
    let result = orchestrator.run_post(url, sort).await?;

    tracing::info!(
        "Extracted \"{}\" with {} comments",
        result.info.title,
        result.comments.len()
    );
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

/// Handles the `listing` subcommand: full listing-mode run
async fn handle_listing(
    mut config: Config,
    cancel: CancellationToken,
    source: &str,
    sort: Sort,
    days: Option<u32>,
    max_items: Option<usize>,
) -> anyhow::Result<()> {
    if let Some(days) = days {
        config.crawl.time_window_days = days;
    }
    if let Some(max_items) = max_items {
        config.crawl.max_items = max_items;
    }

    let mut orchestrator = Orchestrator::new(&config, cancel)?.with_progress(|fraction, message| {
        tracing::info!("[{:>3.0}%] {}", fraction * 100.0, message);
    });
    let extraction = orchestrator.run_listing(source, sort).await;

    println!("{}", serde_json::to_string_pretty(&extraction)?);

    if let Some(error) = extraction.error {
        anyhow::bail!("listing run failed: {}", error);
    }
    Ok(())
}

/// Handles the `news` subcommand: query-driven news search
async fn handle_news(
    config: Config,
    cancel: CancellationToken,
    query: &str,
    country: &str,
    max_articles: usize,
) -> anyhow::Result<()> {
    let mut fetcher = Fetcher::new(&config, cancel)?;
    let articles = search_news(&mut fetcher, query, country, max_articles).await?;

    tracing::info!("Collected {} articles", articles.len());
    println!("{}", serde_json::to_string_pretty(&articles)?);
    Ok(())
}
