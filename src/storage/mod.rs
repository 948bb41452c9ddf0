//! Storage module for the discount catalog
//!
//! This module handles all database operations, including:
//! - SQLite catalog initialization and schema management
//! - Atomic bulk appends of staged records
//! - The paginated, discount-ordered read path used for display

mod loader;
mod query;
mod schema;
mod sqlite;
mod traits;

pub use loader::CatalogLoader;
pub use query::{
    page_window, ListingPage, ListingQuery, QueryService, DEFAULT_PER_PAGE, MAX_VISIBLE_PAGES,
};
pub use schema::TABLE_NAME;
pub use sqlite::{register_functions, SqliteCatalog};
pub use traits::{Catalog, LoadError, LoadResult, QueryError, QueryResult};

use crate::config::Config;
use crate::staging::read_staged;
use std::path::Path;

/// Runs the load step: reads the staged snapshot and appends it to the catalog
///
/// # Returns
///
/// * `Ok(usize)` - Rows written
/// * `Err(HarvestError)` - Staging could not be read, or the load failed and
///   nothing was written
///
/// # Example
///
/// ```no_run
/// use discount_harvest::config::load_config;
/// use std::path::Path;
///
/// let config = load_config(Path::new("harvest.toml")).unwrap();
/// let rows = discount_harvest::load(&config).unwrap();
/// println!("Loaded {} rows", rows);
/// ```
pub fn load(config: &Config) -> crate::Result<usize> {
    let staged = read_staged(Path::new(&config.storage.staging_path))?;
    tracing::info!(
        "Loading {} staged records into {}",
        staged.len(),
        config.storage.database_path
    );

    let loader = CatalogLoader::new(&config.storage.database_path);
    Ok(loader.load(&staged)?)
}
