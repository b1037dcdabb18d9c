//! Optional relational mirror of upstream monitors and their logs.

pub mod models;
pub mod services;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

/// Connects to the mirror store with a bounded pool.
pub async fn connect(database_url: &str) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await
}

/// Creates the mirror tables if they do not exist yet. Monitors and their
/// logs are keyed by the upstream's own ids; this system never generates
/// ids of its own.
pub async fn init_database(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS monitors (
            id BIGINT PRIMARY KEY,
            friendly_name VARCHAR(255),
            url TEXT,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS monitor_logs (
            id BIGINT PRIMARY KEY,
            monitor_id BIGINT REFERENCES monitors(id),
            type INT,
            datetime BIGINT,
            duration INT,
            reason_code VARCHAR(50),
            reason_detail TEXT,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await?;

    info!("mirror tables checked and ready");
    Ok(())
}
