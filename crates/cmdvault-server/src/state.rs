use sqlx::SqlitePool;

use crate::session::SessionStore;

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub sessions: SessionStore,
}

impl AppState {
    pub fn new(pool: SqlitePool, secret_key: Option<&str>) -> Self {
        Self {
            pool,
            sessions: SessionStore::new(secret_key),
        }
    }
}
