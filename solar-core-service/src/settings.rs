use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use moka::future::Cache;
use rust_decimal::Decimal;
use tracing::{debug, info};

use solar_core_api::error::{ApiError, ApiResult};
use solar_core_api::service::KwhPriceProvider;
use solar_core_db::models::kwh_price::KwhPriceModel;
use solar_core_db::repository::{Repositories, SettingsRepository};

pub const DEFAULT_PRICE_CACHE_TTL: Duration = Duration::from_secs(60);

const KWH_PRICE_KEY: &str = "kwh_price";

/// kWh price provider backed by the settings repository.
///
/// The current price is cached for `ttl`; updates made through this provider
/// invalidate the cache once the write is stored. A load that overlaps an
/// update is served to its caller but never left in the cache.
#[derive(Clone)]
pub struct CachedKwhPriceProvider {
    settings: Arc<dyn SettingsRepository>,
    cache: Cache<&'static str, Option<Decimal>>,
    updates: Arc<AtomicU64>,
}

impl CachedKwhPriceProvider {
    pub fn new(repositories: &Repositories, ttl: Duration) -> Self {
        Self {
            settings: repositories.settings.clone(),
            cache: Cache::builder().max_capacity(1).time_to_live(ttl).build(),
            updates: Arc::new(AtomicU64::new(0)),
        }
    }

    pub async fn update_kwh_price(&self, price: Decimal) -> ApiResult<KwhPriceModel> {
        if price <= Decimal::ZERO {
            return Err(ApiError::ValidationError(
                "kWh price must be greater than zero".to_string(),
            ));
        }

        let entry = self.settings.set_kwh_price(price, Utc::now()).await?;
        self.updates.fetch_add(1, Ordering::AcqRel);
        self.cache.invalidate(KWH_PRICE_KEY).await;

        info!(kwh_price = %price, "kWh price updated");
        Ok(entry)
    }

    pub async fn kwh_price_history(&self, limit: usize) -> ApiResult<Vec<KwhPriceModel>> {
        Ok(self.settings.kwh_price_history(limit).await?)
    }
}

#[async_trait]
impl KwhPriceProvider for CachedKwhPriceProvider {
    async fn current_kwh_price(&self) -> ApiResult<Option<Decimal>> {
        let seen = self.updates.load(Ordering::Acquire);
        let price = self
            .cache
            .try_get_with(KWH_PRICE_KEY, async {
                let price = self.settings.current_kwh_price().await?;
                debug!(kwh_price = ?price, "kWh price loaded");
                Ok::<_, ApiError>(price)
            })
            .await
            .map_err(|e| ApiError::clone(&e))?;

        // An update landed while loading; the value may predate it.
        if self.updates.load(Ordering::Acquire) != seen {
            self.cache.invalidate(KWH_PRICE_KEY).await;
        }
        Ok(price)
    }
}
