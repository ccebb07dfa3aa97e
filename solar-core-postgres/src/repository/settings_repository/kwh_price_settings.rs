use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use solar_core_db::models::kwh_price::KwhPriceModel;
use solar_core_db::repository::error::{RepositoryError, RepositoryResult};
use solar_core_db::repository::kwh_price_settings::KwhPriceSettings;
use crate::utils::rows_into;
use std::str::FromStr;
use uuid::Uuid;

use super::repo_impl::{SettingsRepositoryImpl, KWH_PRICE_SETTING_KEY};

impl SettingsRepositoryImpl {
    pub(super) async fn current_kwh_price_impl(repo: &SettingsRepositoryImpl) -> RepositoryResult<Option<Decimal>> {
        let value: Option<String> = sqlx::query_scalar(r#"SELECT value FROM system_setting WHERE key = $1"#)
            .bind(KWH_PRICE_SETTING_KEY)
            .fetch_optional(&*repo.pool)
            .await?;

        value
            .map(|raw| {
                Decimal::from_str(raw.trim()).map_err(|e| {
                    RepositoryError::storage(format!("Setting '{KWH_PRICE_SETTING_KEY}' is not a number: {e}"))
                })
            })
            .transpose()
    }

    /// Upserts the setting and appends the history row in one transaction.
    pub(super) async fn set_kwh_price_impl(
        repo: &SettingsRepositoryImpl,
        price: Decimal,
        effective_from: DateTime<Utc>,
    ) -> RepositoryResult<KwhPriceModel> {
        let entry = KwhPriceModel {
            id: Uuid::new_v4(),
            price,
            effective_from,
        };

        let mut tx = repo.pool.begin().await?;
        sqlx::query(
            r#"
            INSERT INTO system_setting (key, value, updated_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value, updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(KWH_PRICE_SETTING_KEY)
        .bind(price.to_string())
        .bind(effective_from)
        .execute(&mut *tx)
        .await?;

        sqlx::query(r#"INSERT INTO kwh_price_history (id, price, effective_from) VALUES ($1, $2, $3)"#)
            .bind(entry.id)
            .bind(entry.price)
            .bind(entry.effective_from)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        Ok(entry)
    }

    pub(super) async fn kwh_price_history_impl(
        repo: &SettingsRepositoryImpl,
        limit: usize,
    ) -> RepositoryResult<Vec<KwhPriceModel>> {
        let rows = sqlx::query(
            r#"
            SELECT id, price, effective_from FROM kwh_price_history
            ORDER BY effective_from DESC, recorded_seq DESC
            LIMIT $1
            "#,
        )
        .bind(limit as i64)
        .fetch_all(&*repo.pool)
        .await?;
        rows_into(&rows).map_err(RepositoryError::Storage)
    }
}

#[async_trait]
impl KwhPriceSettings for SettingsRepositoryImpl {
    async fn current_kwh_price(&self) -> RepositoryResult<Option<Decimal>> {
        Self::current_kwh_price_impl(self).await
    }

    async fn set_kwh_price(&self, price: Decimal, effective_from: DateTime<Utc>) -> RepositoryResult<KwhPriceModel> {
        Self::set_kwh_price_impl(self, price, effective_from).await
    }

    async fn kwh_price_history(&self, limit: usize) -> RepositoryResult<Vec<KwhPriceModel>> {
        Self::kwh_price_history_impl(self, limit).await
    }
}
