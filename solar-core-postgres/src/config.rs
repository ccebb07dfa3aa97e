use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_ALLOCATION_RETRY_ATTEMPTS: u32 = 3;

/// Connection settings read from the environment (and `.env`, when present).
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
    /// How often an allocation is retried when the consumer moved between
    /// the unlocked read and the lock.
    pub allocation_retry_attempts: u32,
}

impl DatabaseConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            database_url: std::env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL environment variable required"))
                .and_then(|url| {
                    if url.trim().is_empty() {
                        anyhow::bail!("DATABASE_URL cannot be empty");
                    }
                    if !url.starts_with("postgresql://") && !url.starts_with("postgres://") {
                        anyhow::bail!("DATABASE_URL must start with postgresql:// or postgres://");
                    }
                    Ok(url)
                })?,
            max_connections: parse_var("DATABASE_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS)?,
            acquire_timeout_secs: parse_var("DATABASE_ACQUIRE_TIMEOUT_SECS", DEFAULT_ACQUIRE_TIMEOUT_SECS)?,
            allocation_retry_attempts: parse_var("ALLOCATION_RETRY_ATTEMPTS", DEFAULT_ALLOCATION_RETRY_ATTEMPTS)?,
        };

        if config.max_connections == 0 {
            anyhow::bail!("DATABASE_MAX_CONNECTIONS must be at least 1");
        }
        if config.allocation_retry_attempts == 0 {
            anyhow::bail!("ALLOCATION_RETRY_ATTEMPTS must be at least 1");
        }

        Ok(config)
    }

    pub async fn connect(&self) -> anyhow::Result<PgPool> {
        let pool = PgPoolOptions::new()
            .max_connections(self.max_connections)
            .acquire_timeout(Duration::from_secs(self.acquire_timeout_secs))
            .connect(&self.database_url)
            .await?;
        Ok(pool)
    }
}

fn parse_var<T: FromStr>(name: &str, default: T) -> anyhow::Result<T> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => value
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("{name} must be a valid number")),
        _ => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_var_falls_back_to_default() {
        let value: u32 = parse_var("SOLAR_CORE_TEST_UNSET_VARIABLE", 7).unwrap();
        assert_eq!(value, 7);
    }

    #[test]
    #[serial_test::serial]
    fn test_parse_var_rejects_garbage() {
        std::env::set_var("SOLAR_CORE_TEST_GARBAGE", "three");
        let parsed: anyhow::Result<u32> = parse_var("SOLAR_CORE_TEST_GARBAGE", 3);
        std::env::remove_var("SOLAR_CORE_TEST_GARBAGE");
        assert!(parsed.is_err());
    }
}
