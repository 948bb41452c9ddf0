//! Discount-Harvest: a scheduled crawler for discounted listings
//!
//! This crate crawls a paginated e-commerce listing, extracts products that
//! carry a discount badge, stages them to a CSV snapshot and appends them to a
//! SQLite catalog that a display layer can query.

pub mod config;
pub mod crawler;
pub mod record;
pub mod staging;
pub mod state;
pub mod storage;

use thiserror::Error;

/// Main error type for Discount-Harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Staging error: {0}")]
    Staging(#[from] staging::StagingError),

    #[error("Load error: {0}")]
    Load(#[from] storage::LoadError),

    #[error("Query error: {0}")]
    Query(#[from] storage::QueryError),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid CSS selector for {field}: {selector}")]
    InvalidSelector { field: &'static str, selector: String },
}

/// Result type alias for Discount-Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{scrape, ScrapeReport};
pub use storage::load;
pub use record::DiscountRecord;
pub use state::{CrawlState, StopReason};
