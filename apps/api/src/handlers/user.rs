//! User management. Reads are open to any signed-in user; writes need
//! the admin role.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use tracing::info;

use cabshop_core::{NewActivityLog, User, UserChanges};

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::handlers::ListParams;
use crate::state::AppState;

/// `GET /api/users?limit=&offset=`
pub async fn list_users(
    State(state): State<AppState>,
    Query(params): Query<Vec<(String, String)>>,
) -> ApiResult<Json<Vec<User>>> {
    let params = ListParams::from_pairs(params)?;
    Ok(Json(state.db.users().list(params.page).await?))
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<User>> {
    state
        .db
        .users()
        .get_by_id(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("User", &id))
}

/// Admin only.
pub async fn update_user(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    Json(changes): Json<UserChanges>,
) -> ApiResult<Json<User>> {
    user.require_admin()?;

    let updated = state.db.users().update(&id, &changes).await?;

    info!(user_id = %id, role = updated.role.as_str(), by = %user.user_id, "User updated");
    state
        .record_activity(NewActivityLog::new(&user.user_id, "update", "user").entity_id(&id))
        .await;

    Ok(Json(updated))
}

/// Admin only. Admins cannot delete their own account.
pub async fn delete_user(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    user.require_admin()?;

    if id == user.user_id {
        return Err(ApiError::validation("Cannot delete your own account"));
    }

    state.db.users().delete(&id).await?;

    info!(user_id = %id, by = %user.user_id, "User deleted");
    state
        .record_activity(NewActivityLog::new(&user.user_id, "delete", "user").entity_id(&id))
        .await;

    Ok(StatusCode::NO_CONTENT)
}
