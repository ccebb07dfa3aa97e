//! Generates commissions for every eligible consumer and prints the report.
//!
//! Meant to be run by an operator or a scheduler; each consumer is processed
//! independently, so a failing consumer never stops the batch.

use std::sync::Arc;

use solar_core_postgres::{DatabaseConfig, PostgresRepositories};
use solar_core_service::{CachedKwhPriceProvider, CommissionCalculator, DEFAULT_PRICE_CACHE_TTL};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = DatabaseConfig::from_env()?;
    let pool = Arc::new(config.connect().await?);
    let postgres_repositories = PostgresRepositories::from_config(pool, &config);
    postgres_repositories.migrate().await?;
    let repositories = postgres_repositories.create_all_repositories();

    tracing::info!("Connected to database. Generating commissions for eligible consumers...");

    let prices = Arc::new(CachedKwhPriceProvider::new(&repositories, DEFAULT_PRICE_CACHE_TTL));
    let calculator = CommissionCalculator::new(&repositories, prices);
    let report = calculator.generate_for_all_eligible().await?;

    tracing::info!(
        total_processed = report.total_processed,
        successful = report.successful,
        errors = report.errors,
        "Commission generation complete"
    );
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
