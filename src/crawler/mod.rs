//! Crawler module for listing page fetching and extraction
//!
//! This module contains the scrape half of the pipeline:
//! - HTTP fetching of numbered listing pages
//! - Per-item HTML extraction of discount records
//! - The pagination controller and its stop conditions

mod controller;
mod extractor;
mod fetcher;

pub use controller::{CrawlController, CrawlOutcome};
pub use extractor::{ItemExtractionError, ItemOutcome, PageExtraction, ProductExtractor};
pub use fetcher::{build_http_client, user_agent_string, FetchError, PageFetcher, RawPage};

use crate::config::Config;
use crate::staging::write_staged;
use crate::state::StopReason;
use chrono::{DateTime, Utc};
use std::path::Path;

/// Summary of a scrape run
#[derive(Debug)]
pub struct ScrapeReport {
    /// Records written to the staging file
    pub staged: usize,

    /// Which stop condition ended pagination
    pub stop: StopReason,

    /// Pages successfully fetched
    pub pages_fetched: u32,

    /// Items dropped because of extraction errors
    pub items_skipped: usize,

    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl ScrapeReport {
    /// Returns true if pagination ended on a fetch error
    ///
    /// The staged snapshot then holds only the pages before the failure.
    pub fn is_partial(&self) -> bool {
        self.stop.is_error()
    }
}

/// Runs the scrape step: crawl the listing and stage the result
///
/// The staging file is overwritten even when the crawl stopped on a fetch
/// error; the report says so through `stop`.
///
/// # Returns
///
/// * `Ok(ScrapeReport)` - Crawl finished and its records were staged
/// * `Err(HarvestError)` - The client could not be built or staging failed
///
/// # Example
///
/// ```no_run
/// use discount_harvest::config::load_config;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("harvest.toml"))?;
/// let report = discount_harvest::scrape(&config).await?;
/// println!("Staged {} records", report.staged);
/// # Ok(())
/// # }
/// ```
pub async fn scrape(config: &Config) -> crate::Result<ScrapeReport> {
    let started_at = Utc::now();
    let controller = CrawlController::from_config(config)?;

    let outcome = controller.run().await;
    let staged = write_staged(Path::new(&config.storage.staging_path), &outcome.records)?;

    tracing::info!("Total discounted products found: {}", staged);

    Ok(ScrapeReport {
        staged,
        stop: outcome.stop,
        pages_fetched: outcome.pages_fetched,
        items_skipped: outcome.items_skipped,
        started_at,
        finished_at: Utc::now(),
    })
}
