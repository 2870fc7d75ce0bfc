use crate::core::config::DatabaseConfig;
use crate::core::error::{AppError, Result};
use sqlx::{postgres::PgPoolOptions, PgPool, Postgres, Transaction};
use std::time::Duration;

pub type PgTransaction = Transaction<'static, Postgres>;

pub async fn create_pool(config: &DatabaseConfig) -> std::result::Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
        .max_lifetime(Duration::from_secs(config.max_lifetime_secs))
        .connect(&config.url)
        .await
}

/// Start a transaction; every admin write runs inside one so that the
/// document change and the election timestamp touch land together.
pub async fn begin(pool: &PgPool) -> Result<PgTransaction> {
    pool.begin().await.map_err(|e| {
        tracing::error!("Failed to begin transaction: {:?}", e);
        AppError::Database(e)
    })
}

pub async fn commit(tx: PgTransaction) -> Result<()> {
    tx.commit().await.map_err(|e| {
        tracing::error!("Failed to commit transaction: {:?}", e);
        AppError::Database(e)
    })
}
