//! # Sale Handlers
//!
//! ## Sell Flow
//! ```text
//! POST /api/cabs/7/sell
//! { "customerID": "c-1", "quantity": 2, "accessories": [{ "id": 3, "quantity": 1 }] }
//!        │
//!        ▼  sold_by = caller from the bearer token
//! CabSaleOrder ──► SaleService::sell ──► SaleRepository::sell_cab (one transaction)
//!        │
//!        ▼
//! 201 { success, message, cabId, customerId, quantity, accessories,
//!       skippedAccessories, totalPrice, saleDate, saleId }
//! ```

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use cabshop_core::{AccessoryOrder, CabSaleOrder, NewActivityLog, PricedLine, Sale, SaleChanges, SaleItem};
use cabshop_db::CabSaleReceipt;

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::handlers::ListParams;
use crate::services::SaleService;
use crate::state::AppState;

/// Body of `POST /api/cabs/{id}/sell`.
///
/// Missing fields fall back to empty values so that they surface as
/// validation errors (400) rather than body rejections.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SellCabRequest {
    #[serde(rename = "customerID", default)]
    pub customer_id: String,
    #[serde(default)]
    pub quantity: i64,
    #[serde(default)]
    pub accessories: Vec<AccessoryOrder>,
}

/// One accessory line of the sell response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SoldAccessory {
    pub id: i64,
    pub name: String,
    pub quantity: i64,
    /// Cents
    pub unit_price: i64,
    /// Cents
    pub subtotal: i64,
}

impl From<&PricedLine> for SoldAccessory {
    fn from(line: &PricedLine) -> Self {
        SoldAccessory {
            id: line.item_id,
            name: line.name.clone(),
            quantity: line.quantity,
            unit_price: line.unit_price.cents(),
            subtotal: line.subtotal().cents(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SellCabResponse {
    pub success: bool,
    pub message: String,
    pub cab_id: i64,
    pub customer_id: String,
    pub quantity: i64,
    pub accessories: Vec<SoldAccessory>,
    /// Requested accessories that could not be found and were left out.
    pub skipped_accessories: Vec<i64>,
    /// Cents
    pub total_price: i64,
    pub sale_date: String,
    pub sale_id: String,
}

impl From<CabSaleReceipt> for SellCabResponse {
    fn from(receipt: CabSaleReceipt) -> Self {
        let message = if receipt.skipped_accessories.is_empty() {
            "Cab sold successfully".to_string()
        } else {
            format!(
                "Cab sold successfully; {} accessory line(s) skipped",
                receipt.skipped_accessories.len()
            )
        };

        SellCabResponse {
            success: true,
            message,
            cab_id: receipt.cab.item_id,
            customer_id: receipt.sale.customer_id.clone(),
            quantity: receipt.cab.quantity,
            accessories: receipt.accessories.iter().map(SoldAccessory::from).collect(),
            skipped_accessories: receipt.skipped_accessories.clone(),
            total_price: receipt.total().cents(),
            sale_date: receipt.sale.sale_date.clone(),
            sale_id: receipt.sale.id.clone(),
        }
    }
}

/// `POST /api/cabs/{id}/sell`
pub async fn sell_cab(
    State(state): State<AppState>,
    user: AuthUser,
    Path(cab_id): Path<i64>,
    Json(request): Json<SellCabRequest>,
) -> ApiResult<(StatusCode, Json<SellCabResponse>)> {
    let order = CabSaleOrder {
        cab_id,
        customer_id: request.customer_id.trim().to_string(),
        quantity: request.quantity,
        sold_by: user.user_id.clone(),
        accessories: request.accessories,
    };

    let receipt = SaleService::new(state.db.sales()).sell(&order).await?;

    state
        .record_activity(
            NewActivityLog::new(&user.user_id, "sell", "sale")
                .entity_id(&receipt.sale.id)
                .details(format!(
                    "cab {} x{} to customer {}, total {}",
                    cab_id,
                    order.quantity,
                    order.customer_id,
                    receipt.total()
                )),
        )
        .await;

    Ok((StatusCode::CREATED, Json(SellCabResponse::from(receipt))))
}

/// `GET /api/sales?customer_id=&sold_by=&sale_date=&limit=&offset=`
pub async fn list_sales(
    State(state): State<AppState>,
    Query(params): Query<Vec<(String, String)>>,
) -> ApiResult<Json<Vec<Sale>>> {
    let params = ListParams::from_pairs(params)?;
    let sales = state.db.sales().list(&params.filters, params.page).await?;
    Ok(Json(sales))
}

pub async fn get_sale(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Sale>> {
    state
        .db
        .sales()
        .get_by_id(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Sale", &id))
}

/// `GET /api/sales/{id}/items`, cab line first.
pub async fn get_sale_items(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<SaleItem>>> {
    let sales = state.db.sales();
    if sales.get_by_id(&id).await?.is_none() {
        return Err(ApiError::not_found("Sale", &id));
    }
    Ok(Json(sales.get_items(&id).await?))
}

/// Only customer, seller and sale date can change; the total and the
/// items stay as sold.
pub async fn update_sale(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    Json(changes): Json<SaleChanges>,
) -> ApiResult<Json<Sale>> {
    let sale = state.db.sales().update(&id, &changes).await?;

    info!(sale_id = %id, "Sale updated");
    state
        .record_activity(NewActivityLog::new(&user.user_id, "update", "sale").entity_id(&id))
        .await;

    Ok(Json(sale))
}

/// Deletes the sale and its items. Stock is not restored.
pub async fn delete_sale(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.db.sales().delete(&id).await?;

    info!(sale_id = %id, "Sale deleted");
    state
        .record_activity(NewActivityLog::new(&user.user_id, "delete", "sale").entity_id(&id))
        .await;

    Ok(StatusCode::NO_CONTENT)
}
