use std::time::Duration;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub max_connections: u32,
    /// Fixed pause between connection attempts while waiting for the database.
    pub db_wait_interval: Duration,
    /// Minimum accepted password length on the user endpoints.
    pub password_min_length: usize,
}

impl AppConfig {
    pub const DEFAULT_PASSWORD_MIN_LENGTH: usize = 5;

    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let max_connections = env_parse("DB_MAX_CONNECTIONS").unwrap_or(10);
        let db_wait_interval =
            Duration::from_millis(env_parse("DB_WAIT_INTERVAL_MS").unwrap_or(1000));
        let password_min_length =
            env_parse("PASSWORD_MIN_LENGTH").unwrap_or(Self::DEFAULT_PASSWORD_MIN_LENGTH);
        Ok(Self {
            database_url,
            max_connections,
            db_wait_interval,
            password_min_length,
        })
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse::<T>().ok())
}
