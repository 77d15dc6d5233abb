use std::future::Future;
use std::time::Duration;

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};
use tracing::{info, warn};

use crate::config::AppConfig;

/// Runs `attempt` until it succeeds, sleeping `interval` after each failure.
/// There is no retry ceiling.
pub async fn retry_forever<T, E, F, Fut>(interval: Duration, mut attempt: F) -> T
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    loop {
        match attempt().await {
            Ok(v) => return v,
            Err(e) => {
                warn!(error = %e, wait_ms = interval.as_millis() as u64, "database unavailable, retrying");
                tokio::time::sleep(interval).await;
            }
        }
    }
}

/// Blocks until the database accepts a connection, then returns the pool.
pub async fn wait_for_db(config: &AppConfig) -> PgPool {
    info!("waiting for database");
    let pool = retry_forever(config.db_wait_interval, || {
        PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.database_url)
    })
    .await;
    info!("database available");
    pool
}

pub async fn migrate(db: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations")
        .run(db)
        .await
        .context("run migrations")?;
    Ok(())
}
