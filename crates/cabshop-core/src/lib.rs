//! # cabshop-core: Pure Domain Logic for Cabshop
//!
//! Everything in this crate is deterministic and free of I/O. The database
//! and HTTP layers call into it; it never calls out.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Cabshop Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    apps/api (axum)                              │   │
//! │  │    /api/cabs ──► /api/cabs/{id}/sell ──► /api/sales            │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ cabshop-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐  │   │
//! │  │   │  types  │ │  money  │ │ status  │ │ filter  │ │  sale   │  │   │
//! │  │   └─────────┘ └─────────┘ └─────────┘ └─────────┘ └─────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    cabshop-db (Database Layer)                  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Entities (Cab, Accessory, Material, Customer, Sale, ...)
//! - [`money`] - Integer money (cents)
//! - [`status`] - Quantity → stock status derivation
//! - [`filter`] - Optional-filter → parameterized WHERE clause
//! - [`sale`] - Sale orders, validation and line-item math
//! - [`validation`] - Field validators
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use cabshop_core::status::StockStatus;
//!
//! assert_eq!(StockStatus::from_quantity(0), StockStatus::OutOfStock);
//! assert_eq!(StockStatus::from_quantity(6), StockStatus::Available);
//! ```

pub mod error;
pub mod filter;
pub mod money;
pub mod sale;
pub mod status;
pub mod types;
pub mod validation;

pub use error::{CoreError, ValidationError};
pub use filter::{FilterKind, FilterQuery, FilterSpec, Page, WhereClause};
pub use money::Money;
pub use sale::{AccessoryOrder, CabSaleOrder, PricedLine, SaleComposition};
pub use status::StockStatus;
pub use types::*;

/// Default page size for list endpoints.
pub const DEFAULT_PAGE_SIZE: u32 = 50;

/// Upper bound on a single list page.
pub const MAX_PAGE_SIZE: u32 = 500;

/// Most units of one item a single sale line may carry.
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Highest accepted unit price, in cents.
pub const MAX_PRICE_CENTS: i64 = 1_000_000_000_000;
