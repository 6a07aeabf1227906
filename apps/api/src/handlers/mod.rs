//! # HTTP Handlers
//!
//! ## Handler Organization
//! ```text
//! handlers/
//! ├── mod.rs           ◄─── You are here (list parameters, exports)
//! ├── health.rs        ◄─── GET /health
//! ├── auth.rs          ◄─── register, login
//! ├── stock.rs         ◄─── cabs and accessories (generic over StockTable)
//! ├── material.rs      ◄─── workshop materials
//! ├── customer.rs      ◄─── customers
//! ├── sale.rs          ◄─── sell-cab, sales, sale items
//! ├── user.rs          ◄─── user management (admin writes)
//! └── activity_log.rs  ◄─── audit trail
//! ```
//!
//! ## How Handlers Work
//! ```text
//! GET /api/cabs?make=Toyota&status=Available&limit=20
//!        │
//!        ▼  axum extractors
//! async fn list<Cab>(
//!     State(state): State<AppState>,              ◄── pool + JWT manager
//!     Query(params): Query<Vec<(String, String)>>, ◄── order preserved
//! ) -> ApiResult<Json<Vec<Cab>>>
//!        │
//!        ▼  ListParams::from_pairs
//! FilterQuery [("make","Toyota"), ("status","Available")] + Page { 20, 0 }
//! ```

pub mod activity_log;
pub mod auth;
pub mod customer;
pub mod health;
pub mod material;
pub mod sale;
pub mod stock;
pub mod user;

use cabshop_core::{FilterQuery, Page};

use crate::error::ApiError;

/// Filters and paging parsed from a list request's query string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListParams {
    pub filters: FilterQuery,
    pub page: Page,
}

impl ListParams {
    /// Splits raw query pairs into paging and filters.
    ///
    /// `limit` and `offset` must be non-negative integers. Every other pair
    /// becomes a filter in the order it appeared; each table ignores names
    /// it doesn't know.
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Result<Self, ApiError> {
        let mut limit = None;
        let mut offset = None;
        let mut filters = FilterQuery::new();

        for (name, value) in pairs {
            match name.as_str() {
                "limit" => limit = Some(parse_paging("limit", &value)?),
                "offset" => offset = Some(parse_paging("offset", &value)?),
                _ => filters.push(name, Some(value)),
            }
        }

        Ok(ListParams {
            filters,
            page: Page::new(limit, offset),
        })
    }
}

fn parse_paging(name: &str, value: &str) -> Result<u32, ApiError> {
    value
        .trim()
        .parse()
        .map_err(|_| ApiError::validation(format!("{} must be a non-negative integer", name)))
}

#[cfg(test)]
pub(crate) mod test_support {
    use cabshop_core::UserRole;
    use cabshop_db::{Database, DbConfig};

    use crate::auth::{AuthUser, JwtManager};
    use crate::state::AppState;

    pub async fn test_state() -> AppState {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        AppState::new(db, JwtManager::new("test-secret", 3600))
    }

    pub fn admin() -> AuthUser {
        AuthUser {
            user_id: "admin-1".to_string(),
            role: UserRole::Admin,
        }
    }

    pub fn staff() -> AuthUser {
        AuthUser {
            user_id: "staff-1".to_string(),
            role: UserRole::Staff,
        }
    }
}
