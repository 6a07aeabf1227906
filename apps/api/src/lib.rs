//! # Cabshop API
//!
//! REST server for cab, accessory and material inventory and cab sales.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Cabshop API                                     │
//! │                                                                         │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────────────────┐│
//! │  │  Public        │  │  Inventory     │  │  Sales                     ││
//! │  │                │  │                │  │                            ││
//! │  │ • /health      │  │ • cabs         │  │ • POST /api/cabs/{id}/sell ││
//! │  │ • register     │  │ • accessories  │  │ • /api/sales               ││
//! │  │ • login        │  │ • materials    │  │ • /api/sales/{id}/items    ││
//! │  └────────────────┘  │ • customers    │  └────────────────────────────┘│
//! │                      └────────────────┘                                │
//! │  ┌────────────────┐  ┌────────────────┐                                │
//! │  │  Users (admin) │  │  Activity logs │                                │
//! │  └────────────────┘  └────────────────┘                                │
//! │                                                                         │
//! │  Everything under /api except /api/auth/* sits behind require_auth.    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! Environment variables:
//! - `CABSHOP_HOST` - bind address (default: 0.0.0.0)
//! - `CABSHOP_PORT` - HTTP port (default: 8080)
//! - `CABSHOP_DB_PATH` - SQLite file (default: ./cabshop.db)
//! - `CABSHOP_DB_MAX_CONNECTIONS` - pool size (default: 5)
//! - `JWT_SECRET` - Secret for JWT signing
//! - `JWT_LIFETIME_SECS` - Token lifetime (default: 86400)

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod services;
pub mod state;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use cabshop_core::{Accessory, Cab};

use crate::handlers::{
    activity_log, auth as auth_handlers, customer, health, material, sale, stock, user,
};

// Re-exports
pub use config::ApiConfig;
pub use error::{ApiError, ErrorCode};
pub use state::AppState;

/// Builds the full router with state attached.
pub fn build_router(state: AppState) -> Router {
    let public = Router::new()
        .route("/health", get(health::health))
        .route("/api/auth/register", post(auth_handlers::register))
        .route("/api/auth/login", post(auth_handlers::login));

    let protected = Router::new()
        // Cabs
        .route(
            "/api/cabs",
            get(stock::list::<Cab>).post(stock::create::<Cab>),
        )
        .route(
            "/api/cabs/{id}",
            get(stock::get::<Cab>)
                .put(stock::update::<Cab>)
                .delete(stock::delete::<Cab>),
        )
        .route("/api/cabs/{id}/sell", post(sale::sell_cab))
        // Accessories
        .route(
            "/api/accessories",
            get(stock::list::<Accessory>).post(stock::create::<Accessory>),
        )
        .route(
            "/api/accessories/{id}",
            get(stock::get::<Accessory>)
                .put(stock::update::<Accessory>)
                .delete(stock::delete::<Accessory>),
        )
        // Materials
        .route(
            "/api/materials",
            get(material::list_materials).post(material::create_material),
        )
        .route(
            "/api/materials/{id}",
            get(material::get_material)
                .put(material::update_material)
                .delete(material::delete_material),
        )
        // Customers
        .route(
            "/api/customers",
            get(customer::list_customers).post(customer::create_customer),
        )
        .route(
            "/api/customers/{id}",
            get(customer::get_customer)
                .put(customer::update_customer)
                .delete(customer::delete_customer),
        )
        // Sales
        .route("/api/sales", get(sale::list_sales))
        .route(
            "/api/sales/{id}",
            get(sale::get_sale)
                .put(sale::update_sale)
                .delete(sale::delete_sale),
        )
        .route("/api/sales/{id}/items", get(sale::get_sale_items))
        // Users
        .route("/api/users", get(user::list_users))
        .route(
            "/api/users/{id}",
            get(user::get_user)
                .put(user::update_user)
                .delete(user::delete_user),
        )
        // Activity logs
        .route("/api/activity-logs", get(activity_log::list_activity_logs))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_auth,
        ));

    public.merge(protected).with_state(state)
}
