use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::models::kwh_price::KwhPriceModel;
use crate::repository::error::RepositoryResult;

/// Storage of the configured kWh price and its history.
#[async_trait]
pub trait KwhPriceSettings: Send + Sync {
    async fn current_kwh_price(&self) -> RepositoryResult<Option<Decimal>>;

    /// Replaces the current price and appends a history entry.
    async fn set_kwh_price(&self, price: Decimal, effective_from: DateTime<Utc>) -> RepositoryResult<KwhPriceModel>;

    /// Most recent entries first.
    async fn kwh_price_history(&self, limit: usize) -> RepositoryResult<Vec<KwhPriceModel>>;
}
