//! Read access to the audit trail.

use axum::{
    extract::{Query, State},
    Json,
};

use cabshop_core::ActivityLog;

use crate::error::ApiResult;
use crate::handlers::ListParams;
use crate::state::AppState;

/// `GET /api/activity-logs?user_id=&action=&entity_type=&search=&limit=&offset=`
///
/// Newest first.
pub async fn list_activity_logs(
    State(state): State<AppState>,
    Query(params): Query<Vec<(String, String)>>,
) -> ApiResult<Json<Vec<ActivityLog>>> {
    let params = ListParams::from_pairs(params)?;
    let logs = state
        .db
        .activity_logs()
        .list(&params.filters, params.page)
        .await?;
    Ok(Json(logs))
}
