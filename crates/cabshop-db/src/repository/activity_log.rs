//! # Activity Log Repository
//!
//! Append-only audit trail. Entries are never updated or deleted.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use cabshop_core::filter::ACTIVITY_LOG_FILTERS;
use cabshop_core::{ActivityLog, FilterQuery, NewActivityLog, Page};

use crate::error::DbResult;

const LOG_COLUMNS: &str = "id, user_id, action, entity_type, entity_id, details, created_at";

#[derive(Debug, Clone)]
pub struct ActivityLogRepository {
    pool: SqlitePool,
}

impl ActivityLogRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ActivityLogRepository { pool }
    }

    /// Appends an entry.
    pub async fn record(&self, entry: &NewActivityLog) -> DbResult<ActivityLog> {
        entry.validate()?;

        let sql = format!(
            "INSERT INTO activity_logs (id, user_id, action, entity_type, entity_id, details, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?) RETURNING {}",
            LOG_COLUMNS
        );
        let row = sqlx::query_as::<_, ActivityLog>(&sql)
            .bind(Uuid::new_v4().to_string())
            .bind(&entry.user_id)
            .bind(&entry.action)
            .bind(&entry.entity_type)
            .bind(&entry.entity_id)
            .bind(&entry.details)
            .bind(Utc::now())
            .fetch_one(&self.pool)
            .await?;

        debug!(
            action = %row.action,
            entity_type = %row.entity_type,
            entity_id = ?row.entity_id,
            "Activity recorded"
        );
        Ok(row)
    }

    /// Lists entries, newest first.
    pub async fn list(&self, query: &FilterQuery, page: Page) -> DbResult<Vec<ActivityLog>> {
        let clause = ACTIVITY_LOG_FILTERS.build(query);
        let sql = format!(
            "SELECT {} FROM activity_logs{} ORDER BY created_at DESC, id LIMIT ? OFFSET ?",
            LOG_COLUMNS,
            clause.to_sql()
        );

        let mut q = sqlx::query_as::<_, ActivityLog>(&sql);
        for arg in &clause.args {
            q = q.bind(arg);
        }
        let rows = q
            .bind(i64::from(page.limit))
            .bind(i64::from(page.offset))
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }
}
