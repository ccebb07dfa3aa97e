use chrono::{DateTime, Utc};
use solar_core_db::models::commission::{CommissionModel, PaymentProofModel};
use crate::utils::{get_optional_heapless_string, TryFromRow};
use sqlx::{postgres::PgRow, PgPool, Row};
use std::error::Error;
use std::sync::Arc;

pub struct CommissionRepositoryImpl {
    pub pool: Arc<PgPool>,
}

impl CommissionRepositoryImpl {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

impl TryFromRow<PgRow> for CommissionModel {
    fn try_from_row(row: &PgRow) -> Result<Self, Box<dyn Error + Send + Sync>> {
        let url = get_optional_heapless_string(row, "payment_proof_url")?;
        let file_name = get_optional_heapless_string(row, "payment_proof_file_name")?;
        let uploaded_at: Option<DateTime<Utc>> = row.try_get("payment_proof_uploaded_at")?;
        let payment_proof = match (url, file_name, uploaded_at) {
            (Some(url), Some(file_name), Some(uploaded_at)) => Some(PaymentProofModel {
                url,
                file_name,
                uploaded_at,
            }),
            (None, None, None) => None,
            _ => return Err("Payment proof columns must be all set or all empty".into()),
        };

        Ok(CommissionModel {
            id: row.try_get("id")?,
            representative_id: row.try_get("representative_id")?,
            consumer_id: row.try_get("consumer_id")?,
            kwh: row.try_get("kwh")?,
            kwh_price: row.try_get("kwh_price")?,
            commission_value: row.try_get("commission_value")?,
            status: row.try_get("status")?,
            payment_proof,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
            paid_at: row.try_get("paid_at")?,
            version: row.try_get("version")?,
        })
    }
}
