//! # Domain Types
//!
//! Entities stored by Cabshop and the payloads used to create or change them.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  Inventory                  Sales                      People          │
//! │  ─────────                  ─────                      ──────          │
//! │  Cab        (multicabs)     Sale        (sales)        Customer        │
//! │  Accessory  (accessories)   SaleItem    (sale_items)   User            │
//! │  Material   (materials)       └─ item_type: cab|accessory              │
//! │                                                                         │
//! │  Audit: ActivityLog (activity_logs)                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Identity
//! Inventory rows use integer autoincrement ids. Sales, sale items, people
//! and log entries use UUID v4 strings generated by the application.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::{CoreError, ValidationError};
use crate::money::Money;
use crate::status::StockStatus;
use crate::validation::{
    validate_email, validate_name, validate_non_negative, validate_optional_text,
    validate_password, validate_price_cents, validate_required, validate_sale_date,
    ValidationResult,
};

// =============================================================================
// Cab
// =============================================================================

/// A vehicle in inventory.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Cab {
    pub id: i64,
    pub name: String,
    pub make: String,
    pub unit_color: String,
    /// Current unit price in cents.
    pub price_cents: i64,
    pub quantity: i64,
    /// Derived from `quantity`, see [`StockStatus::from_quantity`].
    pub status: StockStatus,
    pub image: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Cab {
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }
}

// =============================================================================
// Accessory
// =============================================================================

/// A non-vehicle item sellable alone or alongside a cab.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Accessory {
    pub id: i64,
    pub name: String,
    pub make: String,
    pub unit_color: String,
    pub price_cents: i64,
    pub quantity: i64,
    pub status: StockStatus,
    pub image: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Accessory {
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }
}

/// Create payload shared by cabs and accessories.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewStockItem {
    pub name: String,
    #[serde(default)]
    pub make: String,
    #[serde(default)]
    pub unit_color: String,
    pub price_cents: i64,
    #[serde(default)]
    pub quantity: i64,
    #[serde(default)]
    pub image: Option<String>,
}

impl NewStockItem {
    pub fn validate(&self) -> ValidationResult<()> {
        validate_name(&self.name)?;
        validate_optional_text("make", Some(&self.make), 100)?;
        validate_optional_text("unit_color", Some(&self.unit_color), 50)?;
        validate_price_cents(self.price_cents)?;
        validate_non_negative("quantity", self.quantity)?;
        Ok(())
    }

    /// Status the new row is stored with.
    pub fn status(&self) -> StockStatus {
        StockStatus::from_quantity(self.quantity)
    }
}

/// Partial update for cabs and accessories. `None` leaves a column as is.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StockItemChanges {
    pub name: Option<String>,
    pub make: Option<String>,
    pub unit_color: Option<String>,
    pub price_cents: Option<i64>,
    pub quantity: Option<i64>,
    pub image: Option<String>,
}

impl StockItemChanges {
    pub fn validate(&self) -> ValidationResult<()> {
        if let Some(name) = &self.name {
            validate_name(name)?;
        }
        validate_optional_text("make", self.make.as_deref(), 100)?;
        validate_optional_text("unit_color", self.unit_color.as_deref(), 50)?;
        if let Some(price) = self.price_cents {
            validate_price_cents(price)?;
        }
        if let Some(quantity) = self.quantity {
            validate_non_negative("quantity", quantity)?;
        }
        Ok(())
    }

    /// New status when quantity is part of the change.
    pub fn status(&self) -> Option<StockStatus> {
        self.quantity.map(StockStatus::from_quantity)
    }
}

// =============================================================================
// Material
// =============================================================================

/// Workshop material (paint, parts, consumables). Not sold through sales.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Material {
    pub id: i64,
    pub name: String,
    pub category: String,
    pub supplier: String,
    /// Unit of measure ("pcs", "liters", ...).
    pub unit: String,
    pub quantity: i64,
    pub cost_cents: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewMaterial {
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub supplier: String,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub quantity: i64,
    #[serde(default)]
    pub cost_cents: i64,
}

impl NewMaterial {
    pub fn validate(&self) -> ValidationResult<()> {
        validate_name(&self.name)?;
        validate_optional_text("category", Some(&self.category), 100)?;
        validate_optional_text("supplier", Some(&self.supplier), 100)?;
        validate_optional_text("unit", Some(&self.unit), 20)?;
        validate_non_negative("quantity", self.quantity)?;
        validate_price_cents(self.cost_cents)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MaterialChanges {
    pub name: Option<String>,
    pub category: Option<String>,
    pub supplier: Option<String>,
    pub unit: Option<String>,
    pub quantity: Option<i64>,
    pub cost_cents: Option<i64>,
}

impl MaterialChanges {
    pub fn validate(&self) -> ValidationResult<()> {
        if let Some(name) = &self.name {
            validate_name(name)?;
        }
        validate_optional_text("category", self.category.as_deref(), 100)?;
        validate_optional_text("supplier", self.supplier.as_deref(), 100)?;
        validate_optional_text("unit", self.unit.as_deref(), 20)?;
        if let Some(quantity) = self.quantity {
            validate_non_negative("quantity", quantity)?;
        }
        if let Some(cost) = self.cost_cents {
            validate_price_cents(cost)?;
        }
        Ok(())
    }
}

// =============================================================================
// Customer
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewCustomer {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

impl NewCustomer {
    pub fn validate(&self) -> ValidationResult<()> {
        validate_name(&self.name)?;
        if let Some(email) = &self.email {
            validate_email(email)?;
        }
        validate_optional_text("phone", self.phone.as_deref(), 30)?;
        validate_optional_text("address", self.address.as_deref(), 300)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CustomerChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

impl CustomerChanges {
    pub fn validate(&self) -> ValidationResult<()> {
        if let Some(name) = &self.name {
            validate_name(name)?;
        }
        if let Some(email) = &self.email {
            validate_email(email)?;
        }
        validate_optional_text("phone", self.phone.as_deref(), 30)?;
        validate_optional_text("address", self.address.as_deref(), 300)?;
        Ok(())
    }
}

// =============================================================================
// Sale
// =============================================================================

/// Header row of a sale.
///
/// `total_price_cents` is computed once by the sale workflow as the sum of
/// its items' subtotals and is never set through an update.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Sale {
    pub id: String,
    pub customer_id: String,
    /// User id of the seller.
    pub sold_by: String,
    /// Calendar date, `YYYY-MM-DD`.
    pub sale_date: String,
    pub total_price_cents: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Sale {
    #[inline]
    pub fn total_price(&self) -> Money {
        Money::from_cents(self.total_price_cents)
    }
}

/// Fields of a sale that may change after creation.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleChanges {
    pub customer_id: Option<String>,
    pub sold_by: Option<String>,
    pub sale_date: Option<String>,
}

impl SaleChanges {
    pub fn validate(&self) -> ValidationResult<()> {
        if let Some(customer_id) = &self.customer_id {
            validate_required("customer_id", customer_id)?;
        }
        if let Some(sold_by) = &self.sold_by {
            validate_required("sold_by", sold_by)?;
        }
        if let Some(date) = &self.sale_date {
            validate_sale_date(date)?;
        }
        Ok(())
    }
}

// =============================================================================
// Sale Item
// =============================================================================

/// What a sale line refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum SaleItemType {
    Cab,
    Accessory,
}

impl SaleItemType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            SaleItemType::Cab => "cab",
            SaleItemType::Accessory => "accessory",
        }
    }
}

impl fmt::Display for SaleItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SaleItemType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cab" => Ok(SaleItemType::Cab),
            "accessory" => Ok(SaleItemType::Accessory),
            other => Err(CoreError::UnknownTag {
                field: "item_type".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

/// One line of a sale with a frozen unit price.
///
/// Exactly one of `multi_cab_id` / `accessory_id` is set, matching
/// `item_type`.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct SaleItem {
    pub id: String,
    pub sale_id: String,
    pub item_type: SaleItemType,
    pub multi_cab_id: Option<i64>,
    pub accessory_id: Option<i64>,
    pub quantity: i64,
    /// Unit price at time of sale (snapshot, not a live reference).
    pub unit_price_cents: i64,
    /// `unit_price_cents × quantity`.
    pub subtotal_cents: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl SaleItem {
    /// Id of the referenced inventory row, if the row is well-formed.
    pub fn item_id(&self) -> Result<i64, CoreError> {
        let id = match self.item_type {
            SaleItemType::Cab if self.accessory_id.is_none() => self.multi_cab_id,
            SaleItemType::Accessory if self.multi_cab_id.is_none() => self.accessory_id,
            _ => None,
        };
        id.ok_or_else(|| CoreError::InvalidSaleItem {
            item_id: self.id.clone(),
        })
    }

    #[inline]
    pub fn subtotal(&self) -> Money {
        Money::from_cents(self.subtotal_cents)
    }
}

// =============================================================================
// User
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Staff,
}

impl UserRole {
    pub const fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Staff => "staff",
        }
    }
}

impl Default for UserRole {
    fn default() -> Self {
        UserRole::Staff
    }
}

impl FromStr for UserRole {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(UserRole::Admin),
            "staff" => Ok(UserRole::Staff),
            other => Err(CoreError::UnknownTag {
                field: "role".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

/// An account that can sign in and record sales.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    /// Argon2 PHC string. Never leaves the server.
    #[serde(skip_serializing, default)]
    #[ts(skip)]
    pub password_hash: String,
    pub role: UserRole,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// Registration payload.
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl NewUser {
    pub fn validate(&self) -> ValidationResult<()> {
        validate_name(&self.name)?;
        validate_email(&self.email)?;
        validate_password(&self.password)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct UserChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<UserRole>,
}

impl UserChanges {
    pub fn validate(&self) -> ValidationResult<()> {
        if let Some(name) = &self.name {
            validate_name(name)?;
        }
        if let Some(email) = &self.email {
            validate_email(email)?;
        }
        Ok(())
    }
}

// =============================================================================
// Activity Log
// =============================================================================

/// Append-only audit entry.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct ActivityLog {
    pub id: String,
    pub user_id: String,
    /// `create`, `update`, `delete`, `sell`, `login`, ...
    pub action: String,
    pub entity_type: String,
    pub entity_id: Option<String>,
    pub details: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// What to append to the activity log.
#[derive(Debug, Clone)]
pub struct NewActivityLog {
    pub user_id: String,
    pub action: String,
    pub entity_type: String,
    pub entity_id: Option<String>,
    pub details: Option<String>,
}

impl NewActivityLog {
    pub fn new(
        user_id: impl Into<String>,
        action: impl Into<String>,
        entity_type: impl Into<String>,
    ) -> Self {
        NewActivityLog {
            user_id: user_id.into(),
            action: action.into(),
            entity_type: entity_type.into(),
            entity_id: None,
            details: None,
        }
    }

    pub fn entity_id(mut self, id: impl ToString) -> Self {
        self.entity_id = Some(id.to_string());
        self
    }

    pub fn details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_required("user_id", &self.user_id)?;
        validate_required("action", &self.action)?;
        validate_required("entity_type", &self.entity_type)?;
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sale_item(item_type: SaleItemType, cab: Option<i64>, acc: Option<i64>) -> SaleItem {
        let now = Utc::now();
        SaleItem {
            id: "item-1".to_string(),
            sale_id: "sale-1".to_string(),
            item_type,
            multi_cab_id: cab,
            accessory_id: acc,
            quantity: 1,
            unit_price_cents: 100,
            subtotal_cents: 100,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_sale_item_type_round_trips_through_str() {
        assert_eq!("cab".parse::<SaleItemType>().unwrap(), SaleItemType::Cab);
        assert_eq!(SaleItemType::Accessory.to_string(), "accessory");
        assert!("truck".parse::<SaleItemType>().is_err());
    }

    #[test]
    fn test_sale_item_id_requires_matching_reference() {
        assert_eq!(sale_item(SaleItemType::Cab, Some(7), None).item_id().unwrap(), 7);
        assert_eq!(
            sale_item(SaleItemType::Accessory, None, Some(3)).item_id().unwrap(),
            3
        );
        assert!(sale_item(SaleItemType::Cab, None, Some(3)).item_id().is_err());
        assert!(sale_item(SaleItemType::Cab, Some(1), Some(3)).item_id().is_err());
    }

    #[test]
    fn test_new_stock_item_derives_status() {
        let item = NewStockItem {
            name: "Multicab Scrum".to_string(),
            make: "Suzuki".to_string(),
            unit_color: "white".to_string(),
            price_cents: 18_000_000,
            quantity: 2,
            image: None,
        };
        assert!(item.validate().is_ok());
        assert_eq!(item.status(), StockStatus::LowStock);
    }

    #[test]
    fn test_stock_changes_status_only_when_quantity_given() {
        let changes = StockItemChanges {
            price_cents: Some(10),
            ..Default::default()
        };
        assert_eq!(changes.status(), None);

        let changes = StockItemChanges {
            quantity: Some(0),
            ..Default::default()
        };
        assert_eq!(changes.status(), Some(StockStatus::OutOfStock));
    }

    #[test]
    fn test_negative_price_rejected() {
        let changes = StockItemChanges {
            price_cents: Some(-1),
            ..Default::default()
        };
        assert!(changes.validate().is_err());
    }

    #[test]
    fn test_user_password_hash_not_serialized() {
        let now = Utc::now();
        let user = User {
            id: "u1".to_string(),
            name: "Ana".to_string(),
            email: "ana@example.com".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            role: UserRole::Admin,
            created_at: now,
            updated_at: now,
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("argon2"));
        assert!(json.contains("\"role\":\"admin\""));
    }

    #[test]
    fn test_sale_changes_reject_bad_date() {
        let changes = SaleChanges {
            sale_date: Some("16/10/2026".to_string()),
            ..Default::default()
        };
        assert!(changes.validate().is_err());
    }
}
