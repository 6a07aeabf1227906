//! # Stock Handlers
//!
//! Cabs and accessories share one set of handlers, instantiated per table:
//!
//! ```rust,ignore
//! .route("/api/cabs", get(stock::list::<Cab>).post(stock::create::<Cab>))
//! .route("/api/accessories", get(stock::list::<Accessory>).post(stock::create::<Accessory>))
//! ```
//!
//! `status` is never accepted from the client; the repository derives it
//! whenever a quantity is written.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use tracing::info;

use cabshop_core::{NewActivityLog, NewStockItem, StockItemChanges};
use cabshop_db::{StockRepository, StockTable};

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::handlers::ListParams;
use crate::state::AppState;

fn repo<T: StockTable>(state: &AppState) -> StockRepository<T> {
    StockRepository::new(state.db.pool().clone())
}

fn entity_type<T: StockTable>() -> String {
    T::ENTITY.to_lowercase()
}

/// `GET /api/{cabs,accessories}?search=&make=&status=&unit_color=&limit=&offset=`
pub async fn list<T>(
    State(state): State<AppState>,
    Query(params): Query<Vec<(String, String)>>,
) -> ApiResult<Json<Vec<T>>>
where
    T: StockTable + Serialize + 'static,
{
    let params = ListParams::from_pairs(params)?;
    let items = repo::<T>(&state).list(&params.filters, params.page).await?;
    Ok(Json(items))
}

/// `GET /api/{cabs,accessories}/{id}`
pub async fn get<T>(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Json<T>>
where
    T: StockTable + Serialize + 'static,
{
    repo::<T>(&state)
        .get_by_id(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(T::ENTITY, &id.to_string()))
}

/// `POST /api/{cabs,accessories}`
pub async fn create<T>(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<NewStockItem>,
) -> ApiResult<(StatusCode, Json<T>)>
where
    T: StockTable + Serialize + 'static,
{
    let item = repo::<T>(&state).create(&payload).await?;

    info!(entity = T::ENTITY, id = item.id(), user_id = %user.user_id, "Stock item created");
    state
        .record_activity(
            NewActivityLog::new(&user.user_id, "create", entity_type::<T>())
                .entity_id(item.id())
                .details(format!("{} (qty {})", payload.name, payload.quantity)),
        )
        .await;

    Ok((StatusCode::CREATED, Json(item)))
}

/// `PUT /api/{cabs,accessories}/{id}`
pub async fn update<T>(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
    Json(changes): Json<StockItemChanges>,
) -> ApiResult<Json<T>>
where
    T: StockTable + Serialize + 'static,
{
    let item = repo::<T>(&state).update(id, &changes).await?;

    info!(entity = T::ENTITY, id, user_id = %user.user_id, "Stock item updated");
    state
        .record_activity(NewActivityLog::new(&user.user_id, "update", entity_type::<T>()).entity_id(id))
        .await;

    Ok(Json(item))
}

/// `DELETE /api/{cabs,accessories}/{id}`
///
/// 409 while sale items still reference the row.
pub async fn delete<T>(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode>
where
    T: StockTable + Serialize + 'static,
{
    repo::<T>(&state).delete(id).await?;

    info!(entity = T::ENTITY, id, user_id = %user.user_id, "Stock item deleted");
    state
        .record_activity(NewActivityLog::new(&user.user_id, "delete", entity_type::<T>()).entity_id(id))
        .await;

    Ok(StatusCode::NO_CONTENT)
}
