use solar_core_db::models::consumer::ConsumerModel;
use crate::utils::{get_heapless_string, get_optional_heapless_string, TryFromRow};
use sqlx::{postgres::PgRow, PgPool, Row};
use std::error::Error;
use std::sync::Arc;

pub struct ConsumerRepositoryImpl {
    pub pool: Arc<PgPool>,
    pub allocation_retry_attempts: u32,
}

impl ConsumerRepositoryImpl {
    pub fn new(pool: Arc<PgPool>, allocation_retry_attempts: u32) -> Self {
        Self {
            pool,
            allocation_retry_attempts: allocation_retry_attempts.max(1),
        }
    }
}

impl TryFromRow<PgRow> for ConsumerModel {
    fn try_from_row(row: &PgRow) -> Result<Self, Box<dyn Error + Send + Sync>> {
        Ok(ConsumerModel {
            id: row.try_get("id")?,
            name: get_heapless_string(row, "name")?,
            email: get_optional_heapless_string(row, "email")?,
            phone: get_optional_heapless_string(row, "phone")?,
            document: get_optional_heapless_string(row, "document")?,
            consumer_unit: get_optional_heapless_string(row, "consumer_unit")?,
            address: get_optional_heapless_string(row, "address")?,
            city: get_optional_heapless_string(row, "city")?,
            state: get_optional_heapless_string(row, "state")?,
            average_monthly_consumption: row.try_get("average_monthly_consumption")?,
            status: row.try_get("status")?,
            generator_id: row.try_get("generator_id")?,
            allocated_percentage: row.try_get("allocated_percentage")?,
            representative_id: row.try_get("representative_id")?,
            discount_offered: row.try_get("discount_offered")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
            approved_at: row.try_get("approved_at")?,
            rejected_at: row.try_get("rejected_at")?,
            rejection_reason: get_optional_heapless_string(row, "rejection_reason")?,
            version: row.try_get("version")?,
        })
    }
}
