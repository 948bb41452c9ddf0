//! Storage traits and error types
//!
//! This module defines the trait interface for catalog backends and the
//! errors raised by the load and query paths.

use crate::record::DiscountRecord;
use thiserror::Error;

/// Errors raised while creating the table or inserting a batch
///
/// A load that fails commits nothing.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Batch insert failed at row {row}: {source}")]
    Insert {
        row: usize,
        #[source]
        source: rusqlite::Error,
    },
}

/// Errors raised by the read path
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for load operations
pub type LoadResult<T> = Result<T, LoadError>;

/// Result type for query operations
pub type QueryResult<T> = Result<T, QueryError>;

/// Trait for catalog backend implementations
pub trait Catalog {
    /// Creates the destination table if it does not exist
    fn ensure_table(&self) -> LoadResult<()>;

    /// Appends every record in one transaction
    ///
    /// Either all rows commit or none do.
    ///
    /// # Returns
    ///
    /// The number of rows written
    fn append_records(&mut self, records: &[DiscountRecord]) -> LoadResult<usize>;

    /// Counts all rows currently stored
    fn count_rows(&self) -> LoadResult<u64>;
}
