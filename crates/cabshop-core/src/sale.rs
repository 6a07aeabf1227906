//! # Sale Composition
//!
//! The pure half of selling a cab: the order a caller submits, its
//! validation, and the line/total arithmetic. The database half (lookups,
//! inserts, decrements inside one transaction) lives in `cabshop-db`.
//!
//! ## Flow
//! ```text
//! CabSaleOrder ──validate()──► (Err → nothing touched)
//!      │
//!      ▼  inside the transaction
//! SaleComposition::new(cab line)
//!      ├── push_accessory(line)   for every accessory that resolved
//!      └── skip_accessory(id)     for every accessory that did not
//!      │
//!      ▼
//! total() = cab.subtotal() + Σ accessory.subtotal()
//! ```
//!
//! Subtotals and the total use checked arithmetic. A price times quantity
//! that does not fit in `i64` is an `OutOfRange` validation error, never a
//! wrapped value.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::SaleItemType;
use crate::validation::{
    validate_line_quantity, validate_quantity, validate_required, ValidationResult,
};

// =============================================================================
// Order
// =============================================================================

/// An accessory requested alongside a cab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AccessoryOrder {
    pub id: i64,
    pub quantity: i64,
}

/// A request to sell `quantity` units of one cab plus optional accessories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CabSaleOrder {
    pub cab_id: i64,
    pub customer_id: String,
    pub quantity: i64,
    /// User id of the seller.
    pub sold_by: String,
    pub accessories: Vec<AccessoryOrder>,
}

impl CabSaleOrder {
    /// Checks the order before any lookup or write happens.
    ///
    /// ## Rules
    /// - `customer_id` must not be blank (existence is not checked)
    /// - `1 <= quantity <= MAX_ITEM_QUANTITY`
    /// - every accessory quantity within the same bounds
    pub fn validate(&self) -> ValidationResult<()> {
        validate_required("customerID", &self.customer_id)?;
        validate_quantity(self.quantity)?;

        for accessory in &self.accessories {
            let field = format!("quantity of accessory {}", accessory.id);
            validate_line_quantity(&field, accessory.quantity)?;
        }

        Ok(())
    }
}

// =============================================================================
// Priced Line
// =============================================================================

/// A sale line with its unit price resolved at sale time.
///
/// The subtotal is computed once, at construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PricedLine {
    pub item_type: SaleItemType,
    pub item_id: i64,
    pub name: String,
    pub unit_price: Money,
    pub quantity: i64,
    subtotal: Money,
}

impl PricedLine {
    pub fn cab(
        id: i64,
        name: impl Into<String>,
        unit_price_cents: i64,
        quantity: i64,
    ) -> ValidationResult<Self> {
        Self::priced(SaleItemType::Cab, id, name.into(), unit_price_cents, quantity)
    }

    pub fn accessory(
        id: i64,
        name: impl Into<String>,
        unit_price_cents: i64,
        quantity: i64,
    ) -> ValidationResult<Self> {
        Self::priced(SaleItemType::Accessory, id, name.into(), unit_price_cents, quantity)
    }

    fn priced(
        item_type: SaleItemType,
        item_id: i64,
        name: String,
        unit_price_cents: i64,
        quantity: i64,
    ) -> ValidationResult<Self> {
        let unit_price = Money::from_cents(unit_price_cents);
        let subtotal = unit_price
            .multiply_quantity(quantity)
            .ok_or_else(|| overflow(format!("subtotal of {}", name)))?;

        Ok(PricedLine {
            item_type,
            item_id,
            name,
            unit_price,
            quantity,
            subtotal,
        })
    }

    #[inline]
    pub fn subtotal(&self) -> Money {
        self.subtotal
    }
}

fn overflow(field: String) -> ValidationError {
    ValidationError::OutOfRange {
        field,
        min: 0,
        max: i64::MAX,
    }
}

// =============================================================================
// Composition
// =============================================================================

/// All lines of one sale: exactly one cab, zero or more accessories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaleComposition {
    cab: PricedLine,
    accessories: Vec<PricedLine>,
    skipped: Vec<i64>,
}

impl SaleComposition {
    pub fn new(cab: PricedLine) -> Self {
        SaleComposition {
            cab,
            accessories: Vec::new(),
            skipped: Vec::new(),
        }
    }

    pub fn push_accessory(&mut self, line: PricedLine) {
        self.accessories.push(line);
    }

    /// Records an accessory id that could not be resolved.
    pub fn skip_accessory(&mut self, id: i64) {
        self.skipped.push(id);
    }

    pub fn cab(&self) -> &PricedLine {
        &self.cab
    }

    pub fn accessories(&self) -> &[PricedLine] {
        &self.accessories
    }

    pub fn skipped(&self) -> &[i64] {
        &self.skipped
    }

    /// Cab line first, then accessories in request order.
    pub fn lines(&self) -> impl Iterator<Item = &PricedLine> {
        std::iter::once(&self.cab).chain(self.accessories.iter())
    }

    /// Sum of every line's subtotal. `OutOfRange` if it overflows.
    pub fn total(&self) -> ValidationResult<Money> {
        Money::checked_sum(self.lines().map(PricedLine::subtotal))
            .ok_or_else(|| overflow("total".to_string()))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MAX_ITEM_QUANTITY;

    fn order(customer_id: &str, quantity: i64, accessories: Vec<AccessoryOrder>) -> CabSaleOrder {
        CabSaleOrder {
            cab_id: 1,
            customer_id: customer_id.to_string(),
            quantity,
            sold_by: "user-1".to_string(),
            accessories,
        }
    }

    #[test]
    fn test_valid_order() {
        let order = order("cust-1", 2, vec![AccessoryOrder { id: 4, quantity: 1 }]);
        assert!(order.validate().is_ok());
    }

    #[test]
    fn test_zero_quantity_rejected() {
        let err = order("cust-1", 0, vec![]).validate().unwrap_err();
        assert_eq!(
            err,
            ValidationError::MustBePositive {
                field: "quantity".to_string()
            }
        );
    }

    #[test]
    fn test_blank_customer_rejected() {
        let err = order("  ", 1, vec![]).validate().unwrap_err();
        assert_eq!(err, ValidationError::required("customerID"));
    }

    #[test]
    fn test_non_positive_accessory_quantity_rejected() {
        let order = order("cust-1", 1, vec![AccessoryOrder { id: 9, quantity: 0 }]);
        assert!(matches!(
            order.validate(),
            Err(ValidationError::MustBePositive { field }) if field.contains('9')
        ));
    }

    #[test]
    fn test_quantity_ceiling() {
        assert!(order("cust-1", MAX_ITEM_QUANTITY, vec![]).validate().is_ok());

        let err = order("cust-1", MAX_ITEM_QUANTITY + 1, vec![])
            .validate()
            .unwrap_err();
        assert!(matches!(err, ValidationError::OutOfRange { max: MAX_ITEM_QUANTITY, .. }));

        let huge_accessory = order(
            "cust-1",
            1,
            vec![AccessoryOrder {
                id: 7,
                quantity: 500_000_000_000,
            }],
        );
        assert!(matches!(
            huge_accessory.validate(),
            Err(ValidationError::OutOfRange { field, .. }) if field.contains('7')
        ));
    }

    #[test]
    fn test_subtotal_overflow_is_rejected() {
        let err = PricedLine::cab(1, "Multicab", 20_000_000, 500_000_000_000).unwrap_err();
        assert!(matches!(err, ValidationError::OutOfRange { field, .. } if field.contains("Multicab")));
    }

    #[test]
    fn test_total_overflow_is_rejected() {
        let half = i64::MAX / 2 + 1;
        let mut sale = SaleComposition::new(PricedLine::cab(1, "Multicab", half, 1).unwrap());
        sale.push_accessory(PricedLine::accessory(10, "Roof rack", half, 1).unwrap());

        assert!(matches!(
            sale.total(),
            Err(ValidationError::OutOfRange { field, .. }) if field == "total"
        ));
    }

    #[test]
    fn test_total_is_sum_of_subtotals() {
        let mut sale =
            SaleComposition::new(PricedLine::cab(1, "Multicab", 15_000_000, 2).unwrap());
        sale.push_accessory(PricedLine::accessory(10, "Roof rack", 450_000, 1).unwrap());
        sale.push_accessory(PricedLine::accessory(11, "Seat cover", 1_250, 4).unwrap());
        sale.skip_accessory(99);

        assert_eq!(sale.cab().subtotal().cents(), 30_000_000);
        assert_eq!(
            sale.total().unwrap().cents(),
            15_000_000 * 2 + 450_000 + 1_250 * 4
        );
        assert_eq!(sale.lines().count(), 3);
        assert_eq!(sale.skipped(), &[99]);
    }

    #[test]
    fn test_cab_only_total() {
        let sale = SaleComposition::new(PricedLine::cab(1, "Multicab", 999, 3).unwrap());
        assert_eq!(sale.total(), Ok(Money::from_cents(2_997)));
        assert!(sale.accessories().is_empty());
    }
}
