//! Customer handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use tracing::info;

use cabshop_core::{Customer, CustomerChanges, NewActivityLog, NewCustomer};

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::handlers::ListParams;
use crate::state::AppState;

/// `GET /api/customers?search=&limit=&offset=`
pub async fn list_customers(
    State(state): State<AppState>,
    Query(params): Query<Vec<(String, String)>>,
) -> ApiResult<Json<Vec<Customer>>> {
    let params = ListParams::from_pairs(params)?;
    let customers = state
        .db
        .customers()
        .list(&params.filters, params.page)
        .await?;
    Ok(Json(customers))
}

pub async fn get_customer(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Customer>> {
    state
        .db
        .customers()
        .get_by_id(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Customer", &id))
}

/// 409 when the email belongs to another customer.
pub async fn create_customer(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<NewCustomer>,
) -> ApiResult<(StatusCode, Json<Customer>)> {
    let customer = state.db.customers().create(&payload).await?;

    info!(id = %customer.id, "Customer created");
    state
        .record_activity(
            NewActivityLog::new(&user.user_id, "create", "customer")
                .entity_id(&customer.id)
                .details(&customer.name),
        )
        .await;

    Ok((StatusCode::CREATED, Json(customer)))
}

pub async fn update_customer(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    Json(changes): Json<CustomerChanges>,
) -> ApiResult<Json<Customer>> {
    let customer = state.db.customers().update(&id, &changes).await?;

    info!(id = %id, "Customer updated");
    state
        .record_activity(NewActivityLog::new(&user.user_id, "update", "customer").entity_id(&id))
        .await;

    Ok(Json(customer))
}

pub async fn delete_customer(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.db.customers().delete(&id).await?;

    info!(id = %id, "Customer deleted");
    state
        .record_activity(NewActivityLog::new(&user.user_id, "delete", "customer").entity_id(&id))
        .await;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::handlers::test_support::{staff, test_state};

    fn customer(name: &str, email: Option<&str>) -> NewCustomer {
        NewCustomer {
            name: name.to_string(),
            email: email.map(str::to_string),
            phone: Some("0917-555-0101".to_string()),
            address: None,
        }
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let state = test_state().await;
        create_customer(
            State(state.clone()),
            staff(),
            Json(customer("Juan Dela Cruz", Some("juan@example.com"))),
        )
        .await
        .unwrap();

        let err = create_customer(
            State(state),
            staff(),
            Json(customer("Another Juan", Some("juan@example.com"))),
        )
        .await
        .unwrap_err();

        assert_eq!(err.code, ErrorCode::Conflict);
        assert!(err.message.contains("juan@example.com"));
    }

    #[tokio::test]
    async fn test_search_and_update() {
        let state = test_state().await;
        let (_, Json(maria)) = create_customer(
            State(state.clone()),
            staff(),
            Json(customer("Maria Santos", None)),
        )
        .await
        .unwrap();
        create_customer(
            State(state.clone()),
            staff(),
            Json(customer("Jose Rizal", None)),
        )
        .await
        .unwrap();

        let Json(found) = list_customers(
            State(state.clone()),
            Query(vec![("search".to_string(), "santos".to_string())]),
        )
        .await
        .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, maria.id);

        let Json(updated) = update_customer(
            State(state),
            staff(),
            Path(maria.id.clone()),
            Json(CustomerChanges {
                address: Some("Cebu City".to_string()),
                ..Default::default()
            }),
        )
        .await
        .unwrap();
        assert_eq!(updated.address.as_deref(), Some("Cebu City"));
        assert_eq!(updated.name, "Maria Santos");
    }

    #[tokio::test]
    async fn test_get_missing_customer() {
        let state = test_state().await;
        let err = get_customer(State(state), Path("nope".to_string()))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }
}
