//! Shared application state handed to every handler.

use std::sync::Arc;

use cabshop_core::NewActivityLog;
use cabshop_db::Database;
use tracing::warn;

use crate::auth::JwtManager;

/// Cloned per request; the pool and the token manager are shared.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub jwt: Arc<JwtManager>,
}

impl AppState {
    pub fn new(db: Database, jwt: JwtManager) -> Self {
        AppState {
            db,
            jwt: Arc::new(jwt),
        }
    }

    /// Appends to the activity log.
    ///
    /// Failures are logged and swallowed: the operation being audited has
    /// already completed.
    pub async fn record_activity(&self, entry: NewActivityLog) {
        if let Err(e) = self.db.activity_logs().record(&entry).await {
            warn!(
                action = %entry.action,
                entity_type = %entry.entity_type,
                error = %e,
                "Failed to record activity"
            );
        }
    }
}
