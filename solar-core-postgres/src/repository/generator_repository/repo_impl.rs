use solar_core_db::models::generator::GeneratorModel;
use crate::utils::{get_heapless_string, TryFromRow};
use sqlx::{postgres::PgRow, PgPool, Row};
use std::error::Error;
use std::sync::Arc;

pub struct GeneratorRepositoryImpl {
    pub pool: Arc<PgPool>,
}

impl GeneratorRepositoryImpl {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

impl TryFromRow<PgRow> for GeneratorModel {
    fn try_from_row(row: &PgRow) -> Result<Self, Box<dyn Error + Send + Sync>> {
        Ok(GeneratorModel {
            id: row.try_get("id")?,
            owner_name: get_heapless_string(row, "owner_name")?,
            installed_power: row.try_get("installed_power")?,
            source_type: get_heapless_string(row, "source_type")?,
            manually_set_status: row.try_get("manually_set_status")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
            version: row.try_get("version")?,
        })
    }
}
