//! Product extraction from listing markup
//!
//! Each listing page holds a number of product "cards". Every card is
//! examined on its own: a broken card is skipped and logged, it never aborts
//! the page. Only cards carrying a discount badge become records.

use crate::config::{compile_selector, SelectorConfig};
use crate::crawler::fetcher::RawPage;
use crate::record::{DiscountRecord, NO_OLD_PRICE};
use crate::ConfigError;
use scraper::{ElementRef, Html, Selector};
use thiserror::Error;

/// An item-level failure; recoverable, the item is dropped
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ItemExtractionError {
    #[error("required field '{field}' is missing or empty")]
    MissingField { field: &'static str },
}

/// What became of a single item node
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    /// The item had a discount badge and all required fields
    Record(DiscountRecord),

    /// Well-formed item without a discount badge
    NoDiscount,

    /// A required field could not be read
    Skipped(ItemExtractionError),
}

/// Result of extracting one page
#[derive(Debug, Clone, Default)]
pub struct PageExtraction {
    /// Discounted records in document order
    pub records: Vec<DiscountRecord>,

    /// Number of item nodes found, discounted or not; zero marks the end of
    /// the listing
    pub item_count: usize,

    /// Items dropped because of an extraction error
    pub skipped: usize,
}

/// Parses listing pages into discount records
///
/// Selectors are compiled once and reused for every page of a run.
#[derive(Debug, Clone)]
pub struct ProductExtractor {
    item: Selector,
    name: Selector,
    price: Selector,
    discount: Selector,
    old_price_attribute: String,
}

impl ProductExtractor {
    /// Compiles the configured selectors
    pub fn new(config: &SelectorConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            item: compile_selector("item", &config.item)?,
            name: compile_selector("name", &config.name)?,
            price: compile_selector("price", &config.price)?,
            discount: compile_selector("discount", &config.discount)?,
            old_price_attribute: config.old_price_attribute.clone(),
        })
    }

    /// Extracts all discounted records from a fetched page
    pub fn extract(&self, page: &RawPage) -> PageExtraction {
        let extraction = self.extract_html(&page.body);
        if extraction.skipped > 0 {
            tracing::warn!(
                "Page {}: skipped {} of {} items",
                page.page,
                extraction.skipped,
                extraction.item_count
            );
        }
        extraction
    }

    /// Extracts records from raw markup
    pub fn extract_html(&self, html: &str) -> PageExtraction {
        let document = Html::parse_document(html);
        let mut extraction = PageExtraction::default();

        for (index, item) in document.select(&self.item).enumerate() {
            extraction.item_count += 1;

            match self.extract_item(item) {
                ItemOutcome::Record(record) => extraction.records.push(record),
                ItemOutcome::NoDiscount => {}
                ItemOutcome::Skipped(e) => {
                    tracing::warn!("Skipping item {}: {}", index, e);
                    extraction.skipped += 1;
                }
            }
        }

        extraction
    }

    /// Classifies a single item node
    pub fn extract_item(&self, item: ElementRef<'_>) -> ItemOutcome {
        let product_name = match required_text(item, &self.name, "name") {
            Ok(text) => text,
            Err(e) => return ItemOutcome::Skipped(e),
        };

        let price_node = match item.select(&self.price).next() {
            Some(node) => node,
            None => {
                return ItemOutcome::Skipped(ItemExtractionError::MissingField { field: "price" })
            }
        };

        let price_after_discount = element_text(price_node);
        if price_after_discount.is_empty() {
            return ItemOutcome::Skipped(ItemExtractionError::MissingField { field: "price" });
        }

        let price_before_discount = price_node
            .value()
            .attr(&self.old_price_attribute)
            .map(|v| v.trim().to_string())
            .unwrap_or_else(|| NO_OLD_PRICE.to_string());

        // Badge presence, not its value, decides inclusion
        let badge = match item.select(&self.discount).next() {
            Some(badge) => badge,
            None => return ItemOutcome::NoDiscount,
        };

        let discount_label = element_text(badge);
        if discount_label.is_empty() {
            return ItemOutcome::Skipped(ItemExtractionError::MissingField { field: "discount" });
        }

        ItemOutcome::Record(DiscountRecord {
            product_name,
            price_before_discount,
            price_after_discount,
            discount_label,
        })
    }
}

/// Trimmed text of the first match of `selector` inside `item`
fn required_text(
    item: ElementRef<'_>,
    selector: &Selector,
    field: &'static str,
) -> Result<String, ItemExtractionError> {
    item.select(selector)
        .next()
        .map(element_text)
        .filter(|text| !text.is_empty())
        .ok_or(ItemExtractionError::MissingField { field })
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}
