//! Service layer between handlers and repositories.
//!
//! Handlers that only pass a payload through call the repositories
//! directly. Workflows with rules of their own live here.

pub mod sale_service;

pub use sale_service::{CabSales, SaleService};
