//! Workshop material handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use tracing::info;

use cabshop_core::{Material, MaterialChanges, NewActivityLog, NewMaterial};

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::handlers::ListParams;
use crate::state::AppState;

/// `GET /api/materials?search=&category=&supplier=&limit=&offset=`
pub async fn list_materials(
    State(state): State<AppState>,
    Query(params): Query<Vec<(String, String)>>,
) -> ApiResult<Json<Vec<Material>>> {
    let params = ListParams::from_pairs(params)?;
    let materials = state
        .db
        .materials()
        .list(&params.filters, params.page)
        .await?;
    Ok(Json(materials))
}

pub async fn get_material(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Material>> {
    state
        .db
        .materials()
        .get_by_id(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Material", &id.to_string()))
}

pub async fn create_material(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<NewMaterial>,
) -> ApiResult<(StatusCode, Json<Material>)> {
    let material = state.db.materials().create(&payload).await?;

    info!(id = material.id, name = %material.name, "Material created");
    state
        .record_activity(
            NewActivityLog::new(&user.user_id, "create", "material")
                .entity_id(material.id)
                .details(&material.name),
        )
        .await;

    Ok((StatusCode::CREATED, Json(material)))
}

pub async fn update_material(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
    Json(changes): Json<MaterialChanges>,
) -> ApiResult<Json<Material>> {
    let material = state.db.materials().update(id, &changes).await?;

    info!(id, "Material updated");
    state
        .record_activity(NewActivityLog::new(&user.user_id, "update", "material").entity_id(id))
        .await;

    Ok(Json(material))
}

pub async fn delete_material(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    state.db.materials().delete(id).await?;

    info!(id, "Material deleted");
    state
        .record_activity(NewActivityLog::new(&user.user_id, "delete", "material").entity_id(id))
        .await;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::handlers::test_support::{staff, test_state};

    fn primer() -> NewMaterial {
        NewMaterial {
            name: "Epoxy Primer".to_string(),
            category: "paint".to_string(),
            supplier: "Boysen".to_string(),
            unit: "liters".to_string(),
            quantity: 40,
            cost_cents: 65_000,
        }
    }

    #[tokio::test]
    async fn test_material_lifecycle() {
        let state = test_state().await;

        let (code, Json(created)) =
            create_material(State(state.clone()), staff(), Json(primer()))
                .await
                .unwrap();
        assert_eq!(code, StatusCode::CREATED);

        let Json(updated) = update_material(
            State(state.clone()),
            staff(),
            Path(created.id),
            Json(MaterialChanges {
                quantity: Some(12),
                ..Default::default()
            }),
        )
        .await
        .unwrap();
        assert_eq!(updated.quantity, 12);
        assert_eq!(updated.supplier, "Boysen");

        let Json(found) = list_materials(
            State(state.clone()),
            Query(vec![("category".to_string(), "PAINT".to_string())]),
        )
        .await
        .unwrap();
        assert_eq!(found.len(), 1);

        delete_material(State(state.clone()), staff(), Path(created.id))
            .await
            .unwrap();
        let err = get_material(State(state), Path(created.id))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_update_missing_material() {
        let state = test_state().await;

        let err = update_material(
            State(state),
            staff(),
            Path(77),
            Json(MaterialChanges::default()),
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }
}
