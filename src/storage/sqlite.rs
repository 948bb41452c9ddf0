//! SQLite catalog implementation
//!
//! This module provides a SQLite-based implementation of the Catalog trait and
//! registers the `discount_value()` SQL function the read path sorts by.

use crate::record::{parse_discount_percent, DiscountRecord};
use crate::storage::schema::{initialize_schema, INSERT_SQL, TABLE_NAME};
use crate::storage::traits::{Catalog, LoadError, LoadResult};
use rusqlite::functions::FunctionFlags;
use rusqlite::{params, Connection};
use std::path::Path;

/// SQLite catalog backend
pub struct SqliteCatalog {
    conn: Connection,
}

impl SqliteCatalog {
    /// Opens (or creates) the catalog database at `path`
    pub fn open(path: &Path) -> Result<Self, rusqlite::Error> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
        ",
        )?;

        Self::from_connection(conn)
    }

    /// Creates an in-memory catalog (for testing)
    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self, rusqlite::Error> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, rusqlite::Error> {
        register_functions(&conn)?;
        Ok(Self { conn })
    }

    /// Borrow the underlying connection
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Closes the connection, surfacing any error SQLite reports on close
    pub fn close(self) -> Result<(), rusqlite::Error> {
        self.conn.close().map_err(|(_, e)| e)
    }
}

impl Catalog for SqliteCatalog {
    fn ensure_table(&self) -> LoadResult<()> {
        initialize_schema(&self.conn)?;
        Ok(())
    }

    fn append_records(&mut self, records: &[DiscountRecord]) -> LoadResult<usize> {
        // Dropping the transaction without commit rolls it back
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(INSERT_SQL)?;
            for (row, record) in records.iter().enumerate() {
                stmt.execute(params![
                    record.product_name,
                    record.price_before_discount,
                    record.price_after_discount,
                    record.discount_label,
                ])
                .map_err(|source| LoadError::Insert { row, source })?;
            }
        }
        tx.commit()?;
        Ok(records.len())
    }

    fn count_rows(&self) -> LoadResult<u64> {
        let sql = format!("SELECT COUNT(*) FROM {}", TABLE_NAME);
        let count: i64 = self.conn.query_row(&sql, [], |row| row.get(0))?;
        Ok(count as u64)
    }
}

/// Registers `discount_value(text) -> integer`
///
/// Keeps only the digits of a discount label so `"15%"` sorts above `"7%"`.
pub fn register_functions(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.create_scalar_function(
        "discount_value",
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let label: Option<String> = ctx.get(0)?;
            Ok(label.map_or(0, |l| i64::from(parse_discount_percent(&l))))
        },
    )
}
