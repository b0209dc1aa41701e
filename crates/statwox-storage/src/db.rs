use std::str::FromStr;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use tracing::{debug, info};

use crate::error::StorageError;

const SCHEMA: &str = include_str!("schema.sql");

const MAX_CONNECTIONS: u32 = 8;

/// Connect to the database at `database_url`, creating the file if needed.
pub async fn connect(database_url: &str) -> Result<SqlitePool, StorageError> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal);

    let pool = SqlitePoolOptions::new()
        .max_connections(MAX_CONNECTIONS)
        .connect_with(options)
        .await?;

    info!(url = database_url, "connected to database");
    Ok(pool)
}

/// Connect to a private in-memory database.
///
/// The pool holds exactly one connection that never expires: every
/// connection to `sqlite::memory:` is a separate database.
pub async fn connect_memory() -> Result<SqlitePool, StorageError> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .min_connections(1)
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;

    debug!("connected to in-memory database");
    Ok(pool)
}

/// Create any missing tables and indexes. Safe to run on every start.
pub async fn migrate(pool: &SqlitePool) -> Result<(), StorageError> {
    sqlx::raw_sql(SCHEMA).execute(pool).await?;
    debug!("schema up to date");
    Ok(())
}

/// Round-trip a trivial query.
pub async fn ping(pool: &SqlitePool) -> Result<(), StorageError> {
    sqlx::query_scalar::<_, i64>("SELECT 1")
        .fetch_one(pool)
        .await?;
    Ok(())
}
