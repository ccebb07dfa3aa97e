use solar_core_db::models::kwh_price::KwhPriceModel;
use crate::utils::TryFromRow;
use sqlx::{postgres::PgRow, PgPool, Row};
use std::error::Error;
use std::sync::Arc;

/// Key of the current kWh price in `system_setting`.
pub const KWH_PRICE_SETTING_KEY: &str = "kwh_price";

pub struct SettingsRepositoryImpl {
    pub pool: Arc<PgPool>,
}

impl SettingsRepositoryImpl {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

impl TryFromRow<PgRow> for KwhPriceModel {
    fn try_from_row(row: &PgRow) -> Result<Self, Box<dyn Error + Send + Sync>> {
        Ok(KwhPriceModel {
            id: row.try_get("id")?,
            price: row.try_get("price")?,
            effective_from: row.try_get("effective_from")?,
        })
    }
}
