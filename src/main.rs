//! Discount-Harvest main entry point
//!
//! This is the command-line interface an external scheduler invokes. `scrape`
//! and `load` are the two pipeline steps; `run` chains them.

use clap::{Parser, Subcommand};
use discount_harvest::config::{load_config_with_hash, Config};
use discount_harvest::storage::{ListingQuery, QueryService, DEFAULT_PER_PAGE};
use discount_harvest::HarvestError;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Discount-Harvest: crawl a paginated listing for discounted products
///
/// Scrapes every listing page up to the configured ceiling, stages the
/// discounted items to CSV and appends them to a SQLite catalog.
#[derive(Parser, Debug)]
#[command(name = "discount-harvest")]
#[command(version)]
#[command(about = "Scheduled crawler for discounted listings", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Crawl the listing and overwrite the staging file
    Scrape,

    /// Append the staging file to the catalog
    Load,

    /// Scrape, then load if the crawl did not stop on a fetch error
    Run,

    /// Print one page of catalog results, highest discount first
    Query {
        /// Substring to match in product names
        #[arg(short, long, default_value = "")]
        search: String,

        /// 1-based result page
        #[arg(short, long, default_value_t = 1)]
        page: u32,

        /// Results per page
        #[arg(long, default_value_t = DEFAULT_PER_PAGE)]
        per_page: u32,
    },

    /// Validate the configuration and print the effective settings
    Check,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    match execute(cli).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

async fn execute(cli: Cli) -> Result<ExitCode, HarvestError> {
    // Credentials and paths may come from a .env file next to the scheduler
    if let Ok(path) = dotenvy::dotenv() {
        tracing::debug!("Loaded environment from {}", path.display());
    }

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    match cli.command {
        Command::Scrape => Ok(scrape_exit_code(handle_scrape(&config).await?)),
        Command::Load => handle_load(&config),
        Command::Run => {
            if handle_scrape(&config).await? {
                handle_load(&config)
            } else {
                tracing::warn!("Skipping load because the scrape was incomplete");
                Ok(scrape_exit_code(false))
            }
        }
        Command::Query {
            search,
            page,
            per_page,
        } => {
            let query = ListingQuery {
                search,
                page,
                per_page,
            };
            handle_query(&config, &query)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Check => {
            handle_check(&config);
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("discount_harvest=info,warn"),
            1 => EnvFilter::new("discount_harvest=debug,info"),
            2 => EnvFilter::new("discount_harvest=trace,debug"),
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

/// A crawl that stopped on a fetch error exits non-zero so the scheduler
/// retries the whole run
fn scrape_exit_code(complete: bool) -> ExitCode {
    if complete {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(2)
    }
}

/// Handles `scrape`; returns whether the crawl ran to a normal stop
async fn handle_scrape(config: &Config) -> Result<bool, HarvestError> {
    let report = discount_harvest::scrape(config).await?;
    let elapsed = report.finished_at - report.started_at;

    tracing::info!(
        "Scrape finished in {}s: {} pages, {} records staged, {} items skipped, stop reason: {}",
        elapsed.num_seconds(),
        report.pages_fetched,
        report.staged,
        report.items_skipped,
        report.stop.label()
    );

    if report.is_partial() {
        tracing::error!("Scrape incomplete: {}", report.stop);
        return Ok(false);
    }

    Ok(true)
}

/// Handles `load`
fn handle_load(config: &Config) -> Result<ExitCode, HarvestError> {
    let rows = discount_harvest::load(config)?;
    tracing::info!("Load finished: {} rows written", rows);
    Ok(ExitCode::SUCCESS)
}

/// Handles `query`: prints one page of results
fn handle_query(config: &Config, query: &ListingQuery) -> Result<(), HarvestError> {
    let service = QueryService::open(Path::new(&config.storage.database_path))?;
    let page = service.search(query)?;

    println!(
        "Page {} of {} ({} products matching \"{}\")\n",
        page.current_page, page.total_pages, page.total_products, query.search
    );

    for row in &page.rows {
        println!(
            "{:>5}  {}\n       now {} (was {})",
            row.discount_label,
            row.product_name,
            row.price_after_discount,
            row.price_before_discount
        );
    }

    if !page.visible_pages.is_empty() {
        let links: Vec<String> = page
            .visible_pages
            .clone()
            .map(|p| {
                if p == page.current_page {
                    format!("[{}]", p)
                } else {
                    p.to_string()
                }
            })
            .collect();
        println!("\nPages: {}", links.join(" "));
    }

    Ok(())
}

/// Handles `check`: validates config and shows what would be crawled
fn handle_check(config: &Config) {
    println!("=== Discount-Harvest Configuration ===\n");

    println!("Listing:");
    println!("  Base URL: {}", config.listing.base_url);
    println!("  Max pages: {}", config.listing.max_pages);
    println!("  Page delay: {}ms", config.listing.page_delay_ms);
    println!("  Request timeout: {}s", config.listing.request_timeout_secs);

    println!("\nSelectors:");
    println!("  Item: {}", config.selectors.item);
    println!("  Name: {}", config.selectors.name);
    println!("  Price: {}", config.selectors.price);
    println!("  Old price attribute: {}", config.selectors.old_price_attribute);
    println!("  Discount badge: {}", config.selectors.discount);

    println!("\nUser Agent:");
    println!(
        "  {}",
        discount_harvest::crawler::user_agent_string(&config.user_agent)
    );

    println!("\nStorage:");
    println!("  Staging file: {}", config.storage.staging_path);
    println!("  Database: {}", config.storage.database_path);

    println!("\n✓ Configuration is valid");
    println!(
        "✓ Would fetch {}1 through {}{}",
        config.listing.base_url, config.listing.base_url, config.listing.max_pages
    );
}
