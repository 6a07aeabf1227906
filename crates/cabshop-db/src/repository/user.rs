//! # User Repository
//!
//! Accounts that sign in to the API. Password hashing happens in the API
//! layer; this repository only ever sees the PHC hash string.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

use cabshop_core::{Page, User, UserChanges, UserRole};

use crate::error::{DbError, DbResult};

const USER_COLUMNS: &str = "id, name, email, password_hash, role, created_at, updated_at";

/// Repository for user database operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    pub async fn list(&self, page: Page) -> DbResult<Vec<User>> {
        let sql = format!(
            "SELECT {} FROM users ORDER BY created_at, id LIMIT ? OFFSET ?",
            USER_COLUMNS
        );
        let rows = sqlx::query_as::<_, User>(&sql)
            .bind(i64::from(page.limit))
            .bind(i64::from(page.offset))
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<User>> {
        let sql = format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS);
        let row = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }

    /// Looks up a user by email, ignoring case.
    pub async fn find_by_email(&self, email: &str) -> DbResult<Option<User>> {
        let sql = format!(
            "SELECT {} FROM users WHERE LOWER(email) = LOWER(?)",
            USER_COLUMNS
        );
        let row = sqlx::query_as::<_, User>(&sql)
            .bind(email.trim())
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }

    /// Creates an account. The very first account becomes `admin`, every
    /// later one `staff`; the decision is made inside the INSERT itself.
    pub async fn register(&self, name: &str, email: &str, password_hash: &str) -> DbResult<User> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();
        let email = email.trim().to_lowercase();

        let sql = format!(
            "INSERT INTO users (id, name, email, password_hash, role, created_at, updated_at) \
             SELECT ?1, ?2, ?3, ?4, \
                    CASE WHEN EXISTS (SELECT 1 FROM users) THEN ?5 ELSE ?6 END, \
                    ?7, ?7 \
             RETURNING {}",
            USER_COLUMNS
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(&id)
            .bind(name.trim())
            .bind(&email)
            .bind(password_hash)
            .bind(UserRole::Staff)
            .bind(UserRole::Admin)
            .bind(now)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DbError::from(e).with_duplicate_value(&email))?;

        info!(id = %user.id, role = user.role.as_str(), "User registered");
        Ok(user)
    }

    pub async fn update(&self, id: &str, changes: &UserChanges) -> DbResult<User> {
        changes.validate()?;
        let email = changes.email.as_deref().map(|e| e.trim().to_lowercase());

        let sql = format!(
            "UPDATE users SET \
                name = COALESCE(?1, name), \
                email = COALESCE(?2, email), \
                role = COALESCE(?3, role), \
                updated_at = ?4 \
             WHERE id = ?5 RETURNING {}",
            USER_COLUMNS
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(changes.name.as_deref().map(str::trim))
            .bind(&email)
            .bind(changes.role)
            .bind(Utc::now())
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DbError::from(e).with_duplicate_value(email.as_deref().unwrap_or_default()))?
            .ok_or_else(|| DbError::not_found("User", id))?;

        info!(id, "User updated");
        Ok(user)
    }

    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("User", id));
        }

        info!(id, "User deleted");
        Ok(())
    }
}
