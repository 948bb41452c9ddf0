//! CSV staging between the crawl and load steps
//!
//! A scrape writes its whole result set here, replacing whatever the previous
//! run left. The load step reads it back once. The header is fixed and is
//! written even when a run produced no records.

use crate::record::DiscountRecord;
use std::path::Path;
use thiserror::Error;

/// Column order of the staging file
pub const STAGING_HEADER: [&str; 4] = [
    "Product Name",
    "Price Before Discount",
    "Current Price After Discount",
    "Discount",
];

/// Errors that can occur while writing or reading the staging file
#[derive(Debug, Error)]
pub enum StagingError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unexpected staging header: expected {expected:?}, found {found:?}")]
    Header {
        expected: Vec<String>,
        found: Vec<String>,
    },
}

/// Result type for staging operations
pub type StagingResult<T> = Result<T, StagingError>;

/// Overwrites the staging file with `records`
///
/// # Returns
///
/// The number of records written
pub fn write_staged(path: &Path, records: &[DiscountRecord]) -> StagingResult<usize> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)?;

    writer.write_record(STAGING_HEADER)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;

    tracing::info!("Staged {} records to {}", records.len(), path.display());
    Ok(records.len())
}

/// Reads every record from the staging file
pub fn read_staged(path: &Path) -> StagingResult<Vec<DiscountRecord>> {
    let mut reader = csv::Reader::from_path(path)?;

    let found: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    if found != STAGING_HEADER {
        return Err(StagingError::Header {
            expected: STAGING_HEADER.iter().map(|h| h.to_string()).collect(),
            found,
        });
    }

    let records = reader
        .deserialize()
        .collect::<Result<Vec<DiscountRecord>, csv::Error>>()?;

    tracing::debug!("Read {} staged records from {}", records.len(), path.display());
    Ok(records)
}
