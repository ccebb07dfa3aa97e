//! Interfaces of the collaborators the core calls out to.
//!
//! File storage and the price setting live outside the core; the core only
//! validates what it hands them and records what they return.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::payment_proof::PaymentProofFile;
use crate::error::ApiResult;

/// Where a payment proof ended up after upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredProof {
    pub url: String,
    pub file_name: String,
    pub uploaded_at: DateTime<Utc>,
}

#[async_trait]
pub trait PaymentProofStorage: Send + Sync {
    /// Stores an already validated file and returns its location.
    async fn upload(&self, commission_id: Uuid, file: &PaymentProofFile) -> ApiResult<StoredProof>;

    /// Removes a previously stored file. Unknown URLs are not an error.
    async fn delete(&self, url: &str) -> ApiResult<()>;
}

#[async_trait]
pub trait KwhPriceProvider: Send + Sync {
    /// Current system kWh price, `None` when it was never configured.
    async fn current_kwh_price(&self) -> ApiResult<Option<Decimal>>;
}
