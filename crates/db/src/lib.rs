//! PostgreSQL access for the route worker: a single long-lived storage
//! handle, the `posts` model, and its repository.

use std::time::Duration;

use sqlx::postgres::PgPoolOptions;

pub mod error;
pub mod models;
pub mod repositories;

pub use error::StoreError;

pub type DbPool = sqlx::PgPool;

/// The worker handles one request at a time, so one connection is enough.
const MAX_CONNECTIONS: u32 = 1;

/// Create the storage handle from a database URL.
///
/// The connection is opened lazily on first use and re-opened on demand
/// after it drops, so an unreachable database does not prevent startup.
/// Fails only when `database_url` cannot be parsed.
pub fn create_pool(database_url: &str, acquire_timeout: Duration) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(MAX_CONNECTIONS)
        .acquire_timeout(acquire_timeout)
        .connect_lazy(database_url)
}

/// Round-trip a trivial query to confirm the database is reachable.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}
