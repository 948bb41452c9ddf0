//! Catalog schema definitions
//!
//! The catalog is an append log: no primary key, no uniqueness constraint.
//! Every load appends its full staged set again.

/// Name of the destination table
pub const TABLE_NAME: &str = "discountedproducts";

/// SQL schema for the catalog
pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS discountedproducts (
    "Product Name" VARCHAR(255),
    "Price Before Discount" VARCHAR(255),
    "Current Price After Discount" VARCHAR(255),
    "Discount" VARCHAR(255)
);
"#;

/// Parameterized insert of one record
pub const INSERT_SQL: &str = r#"
INSERT INTO discountedproducts
    ("Product Name", "Price Before Discount", "Current Price After Discount", "Discount")
VALUES (?1, ?2, ?3, ?4)
"#;

/// Initializes the catalog schema; a no-op when the table already exists
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
