//! The discount record produced by the extractor and carried through staging
//! into the catalog.

use serde::{Deserialize, Serialize};

/// Value substituted when a listing item has no prior-price attribute
pub const NO_OLD_PRICE: &str = "No old price";

/// One discounted product scraped from a listing page
///
/// Field names are renamed to the staging header / catalog column names so the
/// same struct serializes straight into the CSV snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscountRecord {
    #[serde(rename = "Product Name")]
    pub product_name: String,

    #[serde(rename = "Price Before Discount")]
    pub price_before_discount: String,

    #[serde(rename = "Current Price After Discount")]
    pub price_after_discount: String,

    #[serde(rename = "Discount")]
    pub discount_label: String,
}

impl DiscountRecord {
    /// Numeric value of the discount label, e.g. `"23%"` -> 23
    pub fn discount_percent(&self) -> u32 {
        parse_discount_percent(&self.discount_label)
    }
}

/// Parses a discount label by keeping only its ASCII digits
///
/// Labels without digits (or absurdly long ones) yield 0. The SQL
/// `discount_value()` function used for sorting applies this same rule.
pub fn parse_discount_percent(label: &str) -> u32 {
    let digits: String = label.chars().filter(|c| c.is_ascii_digit()).collect();
    digits.parse().unwrap_or(0)
}
