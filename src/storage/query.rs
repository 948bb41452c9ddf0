//! Read path for the display layer
//!
//! Search by product-name substring, distinct rows, highest numeric discount
//! first, fixed-size pages. The distinct product-name count drives the page
//! total.

use crate::record::DiscountRecord;
use crate::storage::schema::TABLE_NAME;
use crate::storage::sqlite::SqliteCatalog;
use crate::storage::traits::QueryResult;
use rusqlite::params;
use std::ops::RangeInclusive;
use std::path::Path;

/// Default page size of the listing view
pub const DEFAULT_PER_PAGE: u32 = 5;

/// Maximum number of page links shown around the current page
pub const MAX_VISIBLE_PAGES: u32 = 10;

/// A search request
#[derive(Debug, Clone)]
pub struct ListingQuery {
    /// Substring matched against product names; empty matches everything
    pub search: String,
    /// 1-based page number
    pub page: u32,
    pub per_page: u32,
}

impl Default for ListingQuery {
    fn default() -> Self {
        Self {
            search: String::new(),
            page: 1,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

/// One page of search results
#[derive(Debug, Clone)]
pub struct ListingPage {
    pub rows: Vec<DiscountRecord>,
    /// Page actually served (after clamping to >= 1)
    pub current_page: u32,
    /// Distinct product names matching the search
    pub total_products: u64,
    pub total_pages: u32,
    /// Page numbers to offer as navigation links
    pub visible_pages: RangeInclusive<u32>,
}

/// Read-only query client over the catalog
pub struct QueryService {
    catalog: SqliteCatalog,
}

impl QueryService {
    /// Opens the catalog at `path` for querying
    pub fn open(path: &Path) -> QueryResult<Self> {
        let catalog = SqliteCatalog::open(path)?;
        Ok(Self::new(catalog))
    }

    /// Wraps an already open catalog
    pub fn new(catalog: SqliteCatalog) -> Self {
        Self { catalog }
    }

    /// Runs a search and returns one page of results
    pub fn search(&self, query: &ListingQuery) -> QueryResult<ListingPage> {
        let conn = self.catalog.connection();

        // A catalog nobody has loaded into yet is simply empty
        if !table_exists(conn)? {
            return Ok(ListingPage {
                rows: Vec::new(),
                current_page: query.page.max(1),
                total_products: 0,
                total_pages: 0,
                visible_pages: page_window(query.page.max(1), 0),
            });
        }

        let pattern = like_pattern(&query.search);
        let per_page = query.per_page.max(1);
        let current_page = query.page.max(1);
        let offset = u64::from(current_page - 1) * u64::from(per_page);

        let total_products: i64 = conn.query_row(
            &format!(
                r#"SELECT COUNT(DISTINCT "Product Name")
                   FROM {}
                   WHERE "Product Name" LIKE ?1 ESCAPE '\'"#,
                TABLE_NAME
            ),
            params![pattern],
            |row| row.get(0),
        )?;

        let mut stmt = conn.prepare(&format!(
            r#"SELECT DISTINCT "Product Name", "Price Before Discount",
                      "Current Price After Discount", "Discount"
               FROM {}
               WHERE "Product Name" LIKE ?1 ESCAPE '\'
               ORDER BY discount_value("Discount") DESC, "Product Name" ASC
               LIMIT ?2 OFFSET ?3"#,
            TABLE_NAME
        ))?;

        let rows = stmt
            .query_map(params![pattern, per_page, offset as i64], |row| {
                Ok(DiscountRecord {
                    product_name: row.get(0)?,
                    price_before_discount: row.get(1)?,
                    price_after_discount: row.get(2)?,
                    discount_label: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let total_products = total_products.max(0) as u64;
        let total_pages = total_products.div_ceil(u64::from(per_page)) as u32;

        Ok(ListingPage {
            rows,
            current_page,
            total_products,
            total_pages,
            visible_pages: page_window(current_page, total_pages),
        })
    }

    /// Counts all stored rows, duplicates included
    pub fn count_rows(&self) -> QueryResult<u64> {
        if !table_exists(self.catalog.connection())? {
            return Ok(0);
        }
        let sql = format!("SELECT COUNT(*) FROM {}", TABLE_NAME);
        let count: i64 = self.catalog.connection().query_row(&sql, [], |row| row.get(0))?;
        Ok(count.max(0) as u64)
    }
}

fn table_exists(conn: &rusqlite::Connection) -> Result<bool, rusqlite::Error> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
        params![TABLE_NAME],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

/// Builds a `LIKE` pattern matching `search` anywhere, with wildcards escaped
fn like_pattern(search: &str) -> String {
    let mut pattern = String::with_capacity(search.len() + 2);
    pattern.push('%');
    for c in search.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Window of at most `MAX_VISIBLE_PAGES` page numbers around `current`
///
/// Empty (`1..=0`) when there are no pages.
pub fn page_window(current: u32, total_pages: u32) -> RangeInclusive<u32> {
    let mut start = current.saturating_sub(MAX_VISIBLE_PAGES / 2).max(1);
    let end = total_pages.min(start.saturating_add(MAX_VISIBLE_PAGES - 1));
    if end.saturating_sub(start) + 1 < MAX_VISIBLE_PAGES {
        start = end.saturating_sub(MAX_VISIBLE_PAGES - 1).max(1);
    }
    start..=end
}
