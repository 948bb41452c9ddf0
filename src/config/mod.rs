//! Configuration module for Discount-Harvest
//!
//! This module handles loading, parsing, and validating TOML configuration files,
//! plus the small set of environment overrides a scheduler may inject.
//!
//! # Example
//!
//! ```no_run
//! use discount_harvest::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvest.toml")).unwrap();
//! println!("Crawling at most {} pages", config.listing.max_pages);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, ListingConfig, SelectorConfig, StorageConfig, UserAgentConfig, DEFAULT_BASE_URL,
    DEFAULT_MAX_PAGES,
};

// Re-export parser functions
pub use parser::{
    apply_env_overrides, compute_config_hash, load_config, load_config_with_hash, parse_config,
    ENV_BASE_URL, ENV_DATABASE_PATH, ENV_STAGING_PATH,
};

pub use validation::validate;
pub(crate) use validation::compile_selector;
