//! # Repository Module
//!
//! One repository per table, each holding a clone of the injected pool.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  axum handler                                                           │
//! │       │                                                                 │
//! │       │  state.db.cabs().list(&filters, page)                           │
//! │       ▼                                                                 │
//! │  CabRepository (StockRepository<Cab>)                                  │
//! │  ├── list(&self, filters, page)                                        │
//! │  ├── get_by_id(&self, id)                                              │
//! │  ├── create(&self, item)                                               │
//! │  ├── update(&self, id, changes)                                        │
//! │  └── delete(&self, id)                                                 │
//! │       │                                                                 │
//! │       │  Parameterized SQL                                             │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`CabRepository`] / [`AccessoryRepository`] - Stock CRUD with status derivation
//! - [`MaterialRepository`] - Workshop materials
//! - [`CustomerRepository`] - Customers
//! - [`SaleRepository`] - Sales, sale items, and the sell-cab transaction
//! - [`UserRepository`] - Accounts
//! - [`ActivityLogRepository`] - Append-only audit trail

pub mod activity_log;
pub mod customer;
pub mod material;
pub mod sale;
pub mod stock;
pub mod user;

pub use activity_log::ActivityLogRepository;
pub use customer::CustomerRepository;
pub use material::MaterialRepository;
pub use sale::{CabSaleReceipt, SaleRepository};
pub use stock::{AccessoryRepository, CabRepository, StockRepository, StockTable};
pub use user::UserRepository;
