use serde_json::{Map, Value};
use solar_core_db::models::change_request::ChangeRequestModel;
use crate::utils::TryFromRow;
use sqlx::types::Json;
use sqlx::{postgres::PgRow, PgPool, Row};
use std::error::Error;
use std::sync::Arc;

pub struct ChangeRequestRepositoryImpl {
    pub pool: Arc<PgPool>,
}

impl ChangeRequestRepositoryImpl {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

impl TryFromRow<PgRow> for ChangeRequestModel {
    fn try_from_row(row: &PgRow) -> Result<Self, Box<dyn Error + Send + Sync>> {
        let old_values: Json<Map<String, Value>> = row.try_get("old_values")?;
        let new_values: Json<Map<String, Value>> = row.try_get("new_values")?;
        Ok(ChangeRequestModel {
            id: row.try_get("id")?,
            consumer_id: row.try_get("consumer_id")?,
            representative_id: row.try_get("representative_id")?,
            old_values: old_values.0,
            new_values: new_values.0,
            changed_fields: row.try_get("changed_fields")?,
            status: row.try_get("status")?,
            requested_at: row.try_get("requested_at")?,
            reviewed_at: row.try_get("reviewed_at")?,
            rejection_reason: row.try_get("rejection_reason")?,
            version: row.try_get("version")?,
        })
    }
}
