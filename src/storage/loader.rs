//! Catalog loader - the bulk append step of the pipeline
//!
//! A loader holds only the database location. Each `load` call opens its own
//! connection, ensures the table, appends the batch in a single transaction
//! and closes the connection again, whether the batch committed or not.

use crate::record::DiscountRecord;
use crate::storage::schema::TABLE_NAME;
use crate::storage::sqlite::SqliteCatalog;
use crate::storage::traits::{Catalog, LoadResult};
use std::path::PathBuf;

/// Appends staged records to the SQLite catalog
#[derive(Debug, Clone)]
pub struct CatalogLoader {
    database_path: PathBuf,
}

impl CatalogLoader {
    /// Creates a loader for the catalog at `database_path`
    pub fn new(database_path: impl Into<PathBuf>) -> Self {
        Self {
            database_path: database_path.into(),
        }
    }

    /// Appends all records atomically
    ///
    /// # Returns
    ///
    /// * `Ok(usize)` - Number of rows written
    /// * `Err(LoadError)` - Nothing was written
    pub fn load(&self, records: &[DiscountRecord]) -> LoadResult<usize> {
        let mut catalog = SqliteCatalog::open(&self.database_path)?;

        let result = append_all(&mut catalog, records);

        // Release the connection on both paths; a close failure only matters
        // when the batch itself succeeded
        let closed = catalog.close();
        let written = result?;
        closed?;

        tracing::info!(
            "The table {} has been updated with {} records",
            TABLE_NAME,
            written
        );
        Ok(written)
    }
}

fn append_all(catalog: &mut dyn Catalog, records: &[DiscountRecord]) -> LoadResult<usize> {
    catalog.ensure_table()?;
    catalog.append_records(records).map_err(|e| {
        tracing::error!("Failed to insert data into the catalog: {}", e);
        e
    })
}
