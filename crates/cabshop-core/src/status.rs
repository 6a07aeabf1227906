//! # Stock Status
//!
//! Status of a cab or accessory is never set by callers; it is derived from
//! the stored quantity every time quantity changes.
//!
//! ```text
//! quantity:  ≤0     1   2     3   4   5     6   7   ...
//!           ├────┼─────────┼─────────────┼──────────────►
//!           OutOf  LowStock    InStock      Available
//!           Stock
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

/// Upper bound (inclusive) of the "Low Stock" band.
pub const LOW_STOCK_MAX: i64 = 2;

/// Upper bound (inclusive) of the "In Stock" band.
pub const IN_STOCK_MAX: i64 = 5;

/// Stock level label for an inventory item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[ts(export)]
pub enum StockStatus {
    #[serde(rename = "Out of Stock")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "Out of Stock"))]
    OutOfStock,
    #[serde(rename = "Low Stock")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "Low Stock"))]
    LowStock,
    #[serde(rename = "In Stock")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "In Stock"))]
    InStock,
    #[serde(rename = "Available")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "Available"))]
    Available,
}

impl StockStatus {
    /// Derives the status for a quantity.
    ///
    /// Total over `i64`: a quantity driven below zero by an oversell is
    /// reported as out of stock.
    pub const fn from_quantity(quantity: i64) -> Self {
        if quantity <= 0 {
            StockStatus::OutOfStock
        } else if quantity <= LOW_STOCK_MAX {
            StockStatus::LowStock
        } else if quantity <= IN_STOCK_MAX {
            StockStatus::InStock
        } else {
            StockStatus::Available
        }
    }

    /// The label stored in the `status` column and sent over JSON.
    pub const fn label(&self) -> &'static str {
        match self {
            StockStatus::OutOfStock => "Out of Stock",
            StockStatus::LowStock => "Low Stock",
            StockStatus::InStock => "In Stock",
            StockStatus::Available => "Available",
        }
    }

    /// SQL `CASE` expression deriving the status from `quantity_expr`.
    ///
    /// Lets an `UPDATE ... SET quantity = quantity - ?` recompute status in
    /// the same statement. `quantity_expr` is spliced verbatim and must not
    /// contain user input; bind values through its placeholders instead.
    ///
    /// ```rust
    /// use cabshop_core::StockStatus;
    ///
    /// let sql = StockStatus::sql_case("quantity - ?");
    /// assert!(sql.starts_with("CASE WHEN (quantity - ?) <= 0"));
    /// ```
    pub fn sql_case(quantity_expr: &str) -> String {
        format!(
            "CASE WHEN ({q}) <= 0 THEN '{out}' \
             WHEN ({q}) <= {low_max} THEN '{low}' \
             WHEN ({q}) <= {in_max} THEN '{in_stock}' \
             ELSE '{available}' END",
            q = quantity_expr,
            out = StockStatus::OutOfStock.label(),
            low_max = LOW_STOCK_MAX,
            low = StockStatus::LowStock.label(),
            in_max = IN_STOCK_MAX,
            in_stock = StockStatus::InStock.label(),
            available = StockStatus::Available.label(),
        )
    }
}

impl fmt::Display for StockStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_table() {
        assert_eq!(StockStatus::from_quantity(0), StockStatus::OutOfStock);
        assert_eq!(StockStatus::from_quantity(1), StockStatus::LowStock);
        assert_eq!(StockStatus::from_quantity(2), StockStatus::LowStock);
        assert_eq!(StockStatus::from_quantity(3), StockStatus::InStock);
        assert_eq!(StockStatus::from_quantity(5), StockStatus::InStock);
        assert_eq!(StockStatus::from_quantity(6), StockStatus::Available);
        assert_eq!(StockStatus::from_quantity(10_000), StockStatus::Available);
    }

    #[test]
    fn test_negative_quantity_is_out_of_stock() {
        assert_eq!(StockStatus::from_quantity(-3), StockStatus::OutOfStock);
    }

    #[test]
    fn test_deterministic_over_range() {
        for n in 0..100 {
            assert_eq!(StockStatus::from_quantity(n), StockStatus::from_quantity(n));
        }
    }

    #[test]
    fn test_serialized_labels() {
        let json = serde_json::to_string(&StockStatus::OutOfStock).unwrap();
        assert_eq!(json, "\"Out of Stock\"");

        let parsed: StockStatus = serde_json::from_str("\"Low Stock\"").unwrap();
        assert_eq!(parsed, StockStatus::LowStock);
        assert_eq!(StockStatus::InStock.to_string(), "In Stock");
    }

    #[test]
    fn test_sql_case_mentions_every_label() {
        let sql = StockStatus::sql_case("quantity");
        for status in [
            StockStatus::OutOfStock,
            StockStatus::LowStock,
            StockStatus::InStock,
            StockStatus::Available,
        ] {
            assert!(sql.contains(status.label()), "missing {}", status);
        }
    }
}
