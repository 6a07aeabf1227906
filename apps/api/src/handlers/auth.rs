//! Registration and login.
//!
//! Both endpoints are public and answer with a bearer token plus the user
//! (without its password hash).

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use cabshop_core::{NewActivityLog, NewUser, User};

use crate::auth::{hash_password, verify_password};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
    pub user: User,
}

impl AuthResponse {
    fn issue(state: &AppState, user: User) -> ApiResult<Self> {
        Ok(AuthResponse {
            token: state.jwt.issue(&user)?,
            token_type: "Bearer",
            expires_in: state.jwt.lifetime_secs(),
            user,
        })
    }
}

/// `POST /api/auth/register`
///
/// The first account ever registered becomes `admin`; every later one
/// starts as `staff`.
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<NewUser>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    payload.validate()?;

    // argon2 is deliberately slow; keep it off the async workers
    let password = payload.password.clone();
    let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| ApiError::internal(format!("Password hashing task failed: {}", e)))??;

    let user = state
        .db
        .users()
        .register(payload.name.trim(), payload.email.trim(), &password_hash)
        .await?;

    info!(user_id = %user.id, role = user.role.as_str(), "User registered");

    state
        .record_activity(NewActivityLog::new(&user.id, "register", "user").entity_id(&user.id))
        .await;

    Ok((StatusCode::CREATED, Json(AuthResponse::issue(&state, user)?)))
}

/// `POST /api/auth/login`
///
/// Unknown email and wrong password produce the same 401.
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let invalid = || ApiError::unauthorized("Invalid email or password");

    let user = state
        .db
        .users()
        .find_by_email(payload.email.trim())
        .await?
        .ok_or_else(invalid)?;

    let password = payload.password;
    let stored_hash = user.password_hash.clone();
    let verified = tokio::task::spawn_blocking(move || verify_password(&password, &stored_hash))
        .await
        .map_err(|e| ApiError::internal(format!("Password verification task failed: {}", e)))?;

    if !verified {
        return Err(invalid());
    }

    info!(user_id = %user.id, "User logged in");

    state
        .record_activity(NewActivityLog::new(&user.id, "login", "user").entity_id(&user.id))
        .await;

    Ok(Json(AuthResponse::issue(&state, user)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::handlers::test_support::test_state;
    use cabshop_core::{FilterQuery, Page, UserRole};

    fn new_user(email: &str) -> NewUser {
        NewUser {
            name: "Ana Reyes".to_string(),
            email: email.to_string(),
            password: "s3cure-pass".to_string(),
        }
    }

    fn login_request(email: &str, password: &str) -> LoginRequest {
        LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let state = test_state().await;

        let (code, Json(registered)) =
            register(State(state.clone()), Json(new_user("ana@example.com")))
                .await
                .unwrap();
        assert_eq!(code, StatusCode::CREATED);
        assert_eq!(registered.user.role, UserRole::Admin);

        let claims = state.jwt.validate(&registered.token).unwrap();
        assert_eq!(claims.sub, registered.user.id);

        let Json(logged_in) = login(
            State(state.clone()),
            Json(login_request("ANA@example.com", "s3cure-pass")),
        )
        .await
        .unwrap();
        assert_eq!(logged_in.user.id, registered.user.id);

        let logs = state
            .db
            .activity_logs()
            .list(&FilterQuery::new().with("action", "login"), Page::default())
            .await
            .unwrap();
        assert_eq!(logs.len(), 1);
    }

    #[tokio::test]
    async fn test_second_user_is_staff() {
        let state = test_state().await;
        register(State(state.clone()), Json(new_user("first@example.com")))
            .await
            .unwrap();

        let (_, Json(second)) = register(State(state), Json(new_user("second@example.com")))
            .await
            .unwrap();
        assert_eq!(second.user.role, UserRole::Staff);
    }

    #[tokio::test]
    async fn test_register_rejects_short_password() {
        let state = test_state().await;
        let mut payload = new_user("ana@example.com");
        payload.password = "short".to_string();

        let err = register(State(state), Json(payload)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn test_register_duplicate_email_conflicts() {
        let state = test_state().await;
        register(State(state.clone()), Json(new_user("ana@example.com")))
            .await
            .unwrap();

        let err = register(State(state), Json(new_user("ana@example.com")))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Conflict);
    }

    #[tokio::test]
    async fn test_login_failures_are_uniform() {
        let state = test_state().await;
        register(State(state.clone()), Json(new_user("ana@example.com")))
            .await
            .unwrap();

        let wrong_password = login(
            State(state.clone()),
            Json(login_request("ana@example.com", "not-the-password")),
        )
        .await
        .unwrap_err();
        let unknown_email = login(
            State(state),
            Json(login_request("nobody@example.com", "s3cure-pass")),
        )
        .await
        .unwrap_err();

        assert_eq!(wrong_password.code, ErrorCode::Unauthorized);
        assert_eq!(wrong_password.message, unknown_email.message);
    }
}
