//! Crawl controller - drives the pagination state machine
//!
//! The controller owns a fetcher and an extractor and walks the listing
//! strictly in page order:
//! - check the page ceiling
//! - fetch the page (a failure stops the run)
//! - extract it (zero items stops the run)
//! - accumulate and advance

use crate::config::Config;
use crate::crawler::extractor::ProductExtractor;
use crate::crawler::fetcher::PageFetcher;
use crate::record::DiscountRecord;
use crate::state::{CrawlState, StopReason};
use std::time::Duration;

/// Final result of a crawl run
#[derive(Debug)]
pub struct CrawlOutcome {
    /// Every record accumulated before the run stopped, in page order
    pub records: Vec<DiscountRecord>,

    /// Which stop condition ended the run
    pub stop: StopReason,

    /// Number of pages successfully fetched
    pub pages_fetched: u32,

    /// Items dropped because of extraction errors, over all pages
    pub items_skipped: usize,
}

/// Drives one crawl run over a paginated listing
pub struct CrawlController {
    fetcher: PageFetcher,
    extractor: ProductExtractor,
    max_pages: u32,
    page_delay: Duration,
}

impl CrawlController {
    /// Creates a controller from its parts
    pub fn new(
        fetcher: PageFetcher,
        extractor: ProductExtractor,
        max_pages: u32,
        page_delay: Duration,
    ) -> Self {
        Self {
            fetcher,
            extractor,
            max_pages,
            page_delay,
        }
    }

    /// Builds the fetcher and extractor from configuration
    pub fn from_config(config: &Config) -> crate::Result<Self> {
        let fetcher = PageFetcher::from_config(&config.listing, &config.user_agent)?;
        let extractor = ProductExtractor::new(&config.selectors)?;
        Ok(Self::new(
            fetcher,
            extractor,
            config.listing.max_pages,
            Duration::from_millis(config.listing.page_delay_ms),
        ))
    }

    /// Runs the crawl until a stop condition fires
    ///
    /// Never fails: a fetch error is reported through `CrawlOutcome::stop`
    /// alongside the records gathered before it.
    pub async fn run(&self) -> CrawlOutcome {
        let mut state = CrawlState::start();
        let mut pages_fetched = 0;
        let mut items_skipped = 0;

        let (reason, accumulated) = loop {
            state = match state.check_ceiling(self.max_pages) {
                CrawlState::Stopped {
                    reason,
                    accumulated,
                } => break (reason, accumulated),
                running => running,
            };

            let page = match &state {
                CrawlState::Running { page, .. } => *page,
                CrawlState::Stopped { .. } => continue,
            };

            if page > 1 && !self.page_delay.is_zero() {
                tokio::time::sleep(self.page_delay).await;
            }

            tracing::info!("Scraping page {}", page);

            match self.fetcher.fetch(page).await {
                Err(e) => {
                    tracing::error!("Error fetching page {}: {}", page, e);
                    state = state.fetch_failed(e);
                }
                Ok(raw) => {
                    pages_fetched += 1;
                    let extraction = self.extractor.extract(&raw);
                    items_skipped += extraction.skipped;

                    tracing::info!(
                        "Page {}: {} items, {} discounted",
                        page,
                        extraction.item_count,
                        extraction.records.len()
                    );

                    state = state.page_extracted(extraction.item_count, extraction.records);
                }
            }
        };

        if reason.is_error() {
            tracing::error!(
                "Crawl stopped early ({}), keeping {} records",
                reason,
                accumulated.len()
            );
        } else {
            tracing::info!("Crawl stopped: {}", reason);
        }

        CrawlOutcome {
            records: accumulated,
            stop: reason,
            pages_fetched,
            items_skipped,
        }
    }
}
