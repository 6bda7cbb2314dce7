//! Shelfmirror main entry point
//!
//! This is the command-line interface for the shelfmirror profile backup
//! tool.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use scraper::Html;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use shelfmirror::crawler::{
    build_fetcher, is_bot_check_page, PaginationCrawler, RetryPolicy, RetryingFetcher,
};
use shelfmirror::{
    merge, BackupStore, Book, ConfigError, DelayBounds, Identity, ListingKind, MirrorError, Quote,
    ReadingStatus, RunConfig, TableRecord, Transport,
};

/// Shelfmirror: incremental backup of a LiveLib reader profile
///
/// Shelfmirror walks the paginated listings of a public reader profile
/// (books per reading status, highlighted quotes) with polite randomized
/// pacing and appends anything not already present in the local backup
/// tables.
#[derive(Parser, Debug)]
#[command(name = "shelfmirror")]
#[command(version = "1.0.0")]
#[command(about = "Incremental backup of a LiveLib reader profile", long_about = None)]
struct Cli {
    /// Profile username as it appears in the page address
    #[arg(value_name = "USER")]
    user: String,

    /// Minimum delay between page fetches, in seconds
    #[arg(long, value_name = "SECONDS", default_value_t = 5)]
    min_delay: u64,

    /// Maximum delay between page fetches, in seconds; -1 disables the
    /// upper bound so every wait is exactly the minimum
    #[arg(long, value_name = "SECONDS", default_value_t = 15, allow_hyphen_values = true)]
    max_delay: i64,

    /// Books backup table, .csv or .xlsx (default: <USER>_books.csv)
    #[arg(short = 'b', long, value_name = "PATH")]
    books_backup: Option<PathBuf>,

    /// Quotes backup table, .csv or .xlsx (default: <USER>_quotes.csv)
    #[arg(short = 'q', long, value_name = "PATH")]
    quotes_backup: Option<PathBuf>,

    /// Stop each book listing after this many pages
    #[arg(long, value_name = "N")]
    book_pages: Option<u32>,

    /// Stop the quotes listing after this many pages
    #[arg(long, value_name = "N")]
    quote_pages: Option<u32>,

    /// Discard existing backups and write the freshly crawled batch as-is
    #[arg(short = 'R', long)]
    rewrite_all: bool,

    /// Skip one listing kind entirely ('books' or 'quotes')
    #[arg(long, value_name = "KIND")]
    skip: Option<String>,

    /// Transport backend for page fetches
    #[arg(long, value_name = "BACKEND", default_value = "http")]
    transport: String,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = match build_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {}", e);
            return Err(e.into());
        }
    };

    match run_backup(config).await {
        Ok(()) => {
            tracing::info!("Backup completed successfully");
            Ok(())
        }
        Err(e) => {
            tracing::error!("Backup failed: {}", e);
            Err(e.into())
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("shelfmirror=info,warn"),
            1 => EnvFilter::new("shelfmirror=debug,info"),
            2 => EnvFilter::new("shelfmirror=trace,debug"),
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

/// Collects the validated run configuration from the command line
fn build_config(cli: &Cli) -> Result<RunConfig, ConfigError> {
    let max_delay = match cli.max_delay {
        -1 => None,
        value if value < 0 => {
            return Err(ConfigError::Validation(format!(
                "max delay must be non-negative or exactly -1, got {}",
                value
            )));
        }
        value => Some(value as u64),
    };

    let skip = cli
        .skip
        .as_deref()
        .map(str::parse::<ListingKind>)
        .transpose()?;
    let transport = cli.transport.parse::<Transport>()?;

    let books_backup = cli
        .books_backup
        .clone()
        .unwrap_or_else(|| PathBuf::from(format!("{}_books.csv", cli.user)));
    let quotes_backup = cli
        .quotes_backup
        .clone()
        .unwrap_or_else(|| PathBuf::from(format!("{}_quotes.csv", cli.user)));

    let config = RunConfig {
        profile_url: RunConfig::profile_url_for(&cli.user),
        user: cli.user.clone(),
        delay: DelayBounds {
            min: cli.min_delay,
            max: max_delay,
        },
        book_page_limit: cli.book_pages,
        quote_page_limit: cli.quote_pages,
        books_backup,
        quotes_backup,
        rewrite_all: cli.rewrite_all,
        skip,
        transport,
    };

    shelfmirror::config::validate(&config)?;
    Ok(config)
}

/// Confirms the profile root answers before any listing is crawled
///
/// The probe gets the same retry budget as every listing fetch; only final
/// exhaustion (or the bot-check page) aborts the run. A wrong username and
/// a blocked client look the same to the rest of the run, so both abort
/// here with a clear message.
async fn probe_profile_root(fetcher: &RetryingFetcher, url: &str) -> Result<(), MirrorError> {
    tracing::info!("Checking profile: {}", url);

    let body = fetcher
        .fetch(url)
        .await
        .map_err(|e| MirrorError::ProfileUnreachable(e.to_string()))?;

    let page = Html::parse_document(&body);
    if is_bot_check_page(&page) {
        return Err(MirrorError::ProfileUnreachable(format!(
            "{} answered with the automated-access check page",
            url
        )));
    }

    tracing::info!("Profile found");
    Ok(())
}

/// Handles the main backup operation
async fn run_backup(config: RunConfig) -> Result<(), MirrorError> {
    let config = Arc::new(config);
    let fetcher = build_fetcher(config.transport)?;

    let probe_fetcher = RetryingFetcher::new(fetcher.clone(), RetryPolicy::default());
    probe_profile_root(&probe_fetcher, &config.profile_url).await?;

    // First ctrl-c finishes the current page and stops cleanly; everything
    // collected so far is still merged and written.
    let cancel = CancellationToken::new();
    let watcher = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupt received, finishing the current page...");
            watcher.cancel();
        }
    });

    let crawler = PaginationCrawler::new(config.clone(), fetcher, cancel);

    if config.skip == Some(ListingKind::Books) {
        tracing::info!("Skipping book listings");
    } else {
        let mut books: Vec<Book> = Vec::new();
        for status in ReadingStatus::ALL {
            books.extend(crawler.crawl_books(status).await);
        }
        let store = BackupStore::open(&config.books_backup)?;
        persist(&store, &books, config.rewrite_all, "Books")?;
    }

    if config.skip == Some(ListingKind::Quotes) {
        tracing::info!("Skipping quotes listing");
    } else {
        let quotes: Vec<Quote> = crawler.crawl_quotes().await;
        let store = BackupStore::open(&config.quotes_backup)?;
        persist(&store, &quotes, config.rewrite_all, "Quotes")?;
    }

    Ok(())
}

/// Merges a crawled batch into its backup table
fn persist<T: TableRecord + Identity>(
    store: &BackupStore,
    crawled: &[T],
    rewrite: bool,
    label: &str,
) -> Result<(), MirrorError> {
    if rewrite {
        store.rewrite(crawled)?;
        tracing::info!(
            "{}: backup rewritten with {} records ({})",
            label,
            crawled.len(),
            store.path().display()
        );
        return Ok(());
    }

    let baseline: Vec<T> = store.read_existing()?;
    let fresh = merge::new_items(&baseline, crawled);
    store.append(&fresh)?;
    tracing::info!(
        "{}: {} new records appended, {} already backed up ({})",
        label,
        fresh.len(),
        baseline.len(),
        store.path().display()
    );
    Ok(())
}
