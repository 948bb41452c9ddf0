use serde::Deserialize;

/// Main configuration structure for Discount-Harvest
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub listing: ListingConfig,
    #[serde(default)]
    pub selectors: SelectorConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub storage: StorageConfig,
}

/// Listing pagination and fetch behavior
#[derive(Debug, Clone, Deserialize)]
pub struct ListingConfig {
    /// Listing URL prefix; the 1-based page number is appended verbatim
    #[serde(rename = "base-url", default = "default_base_url")]
    pub base_url: String,

    /// Hard page ceiling for one run
    #[serde(rename = "max-pages", default = "default_max_pages")]
    pub max_pages: u32,

    /// Pause between consecutive page fetches (milliseconds)
    #[serde(rename = "page-delay-ms", default)]
    pub page_delay_ms: u64,

    /// Whole-request timeout (seconds)
    #[serde(rename = "request-timeout-secs", default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

/// CSS selectors locating the product card and its fields
///
/// The upstream markup changes from time to time, so none of these are
/// hardcoded in the extractor.
#[derive(Debug, Clone, Deserialize)]
pub struct SelectorConfig {
    /// One listing "card" per product
    #[serde(default = "default_item_selector")]
    pub item: String,

    #[serde(default = "default_name_selector")]
    pub name: String,

    /// Current price node; also carries the prior-price attribute
    #[serde(default = "default_price_selector")]
    pub price: String,

    #[serde(rename = "old-price-attribute", default = "default_old_price_attribute")]
    pub old_price_attribute: String,

    /// Discount badge; its presence gates record inclusion
    #[serde(default = "default_discount_selector")]
    pub discount: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            item: default_item_selector(),
            name: default_name_selector(),
            price: default_price_selector(),
            old_price_attribute: default_old_price_attribute(),
            discount: default_discount_selector(),
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,
}

/// Staging and catalog locations
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// CSV snapshot overwritten by every scrape
    #[serde(rename = "staging-path")]
    pub staging_path: String,

    /// SQLite catalog file
    #[serde(rename = "database-path")]
    pub database_path: String,
}

pub const DEFAULT_BASE_URL: &str = "https://www.jumia.co.ke/?page=";
pub const DEFAULT_MAX_PAGES: u32 = 25;

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_max_pages() -> u32 {
    DEFAULT_MAX_PAGES
}

fn default_request_timeout() -> u64 {
    30
}

fn default_item_selector() -> String {
    "article.prd".to_string()
}

fn default_name_selector() -> String {
    "div.name".to_string()
}

fn default_price_selector() -> String {
    "div.prc".to_string()
}

fn default_old_price_attribute() -> String {
    "data-oprc".to_string()
}

fn default_discount_selector() -> String {
    "div.bdg._dsct".to_string()
}
