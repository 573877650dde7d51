//! Postgres connectivity for the ledger.

use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::info;

use crate::config::AppConfig;
use crate::ledger::{LedgerError, LedgerResult};

/// Embedded migrations from `migrations/`.
static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

/// Open the pool described by `config`.
pub async fn connect(config: &AppConfig) -> LedgerResult<PgPool> {
    let url = config
        .database_url
        .as_deref()
        .ok_or_else(|| LedgerError::Store("DATABASE_URL is not configured".to_string()))?;

    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(config.db_acquire_timeout)
        .connect(url)
        .await
        .map_err(|e| LedgerError::Transient(format!("failed to connect to Postgres: {e}")))?;

    info!(max_connections = config.db_max_connections, "connected to Postgres");
    Ok(pool)
}

/// Apply pending migrations. Idempotent.
pub async fn migrate(pool: &PgPool) -> LedgerResult<()> {
    info!("checking for pending migrations");

    MIGRATOR
        .run(pool)
        .await
        .map_err(|e| LedgerError::Store(format!("migration failed: {e}")))?;

    info!("all migrations applied");
    Ok(())
}
