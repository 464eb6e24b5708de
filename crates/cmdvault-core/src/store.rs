//! SQLite storage: pool setup, schema creation, and additive migration.
//!
//! The pool is the storage client handed to every service operation; nothing
//! here holds global state. Multi-statement mutations elsewhere open an
//! explicit transaction on this pool.

use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use crate::error::Result;

/// Open (creating if missing) the database at `url`, e.g. `sqlite:cmdvault.db`.
///
/// WAL journal mode and a busy timeout keep concurrent process instances from
/// failing with transient "database is locked" errors. Foreign keys are
/// enforced per connection.
pub async fn connect(url: &str) -> Result<SqlitePool> {
    let opts = SqliteConnectOptions::from_str(url)?
        .create_if_missing(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
        .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
        .foreign_keys(true)
        .busy_timeout(Duration::from_secs(5));

    // SQLite permits only one writer; a single pooled connection sidesteps
    // writer contention entirely at this tool's scale.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(opts)
        .await?;

    Ok(pool)
}

/// Create all tables if absent. Never destructive; safe to run on every start.
pub async fn ensure_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS users (
            id            INTEGER PRIMARY KEY AUTOINCREMENT,
            username      TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS groups (
            id         INTEGER PRIMARY KEY AUTOINCREMENT,
            name       TEXT NOT NULL UNIQUE,
            sort_order INTEGER NOT NULL DEFAULT 0
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS commands (
            id         INTEGER PRIMARY KEY AUTOINCREMENT,
            title      TEXT NOT NULL,
            content    TEXT NOT NULL,
            sort_order INTEGER NOT NULL DEFAULT 0,
            is_execute INTEGER NOT NULL DEFAULT 0,
            group_id   INTEGER NOT NULL REFERENCES groups(id)
        )",
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Additive migration: bring a pre-existing `commands` table up to the
/// current schema.
///
/// Databases created before the execute flag existed lack the `is_execute`
/// column. Column presence is introspected via `PRAGMA table_info`; when the
/// column is already there this is a no-op, so the migration is idempotent.
pub async fn migrate(pool: &SqlitePool) -> Result<()> {
    if column_exists(pool, "commands", "is_execute").await? {
        return Ok(());
    }

    tracing::info!("migrating: adding commands.is_execute column");
    sqlx::query("ALTER TABLE commands ADD COLUMN is_execute INTEGER NOT NULL DEFAULT 0")
        .execute(pool)
        .await?;

    Ok(())
}

async fn column_exists(pool: &SqlitePool, table: &str, column: &str) -> Result<bool> {
    // PRAGMA table_info columns: cid, name, type, notnull, dflt_value, pk
    let rows: Vec<(i64, String, String, i64, Option<String>, i64)> =
        sqlx::query_as(&format!("PRAGMA table_info({table})"))
            .fetch_all(pool)
            .await?;
    Ok(rows.iter().any(|(_, name, ..)| name == column))
}

#[cfg(test)]
pub async fn connect_memory() -> SqlitePool {
    connect("sqlite::memory:").await.unwrap()
}
