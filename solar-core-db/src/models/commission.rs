use chrono::{DateTime, Utc};
use heapless::String as HeaplessString;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use solar_core_api::domain::commission::CommissionQuote;
use solar_core_api::domain::status::CommissionStatus;

use crate::models::identifiable::Identifiable;
use crate::models::versioned::Versioned;

/// Metadata of a stored payment proof. The three values always travel together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentProofModel {
    pub url: HeaplessString<500>,
    pub file_name: HeaplessString<255>,
    pub uploaded_at: DateTime<Utc>,
}

/// Database model for a representative's commission on one consumer.
///
/// `kwh` and `kwh_price` are snapshots taken when the commission was
/// generated; `commission_value` never changes afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommissionModel {
    pub id: Uuid,
    pub representative_id: Uuid,
    pub consumer_id: Uuid,
    pub kwh: Decimal,
    pub kwh_price: Decimal,
    pub commission_value: Decimal,
    pub status: CommissionStatus,
    pub payment_proof: Option<PaymentProofModel>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub paid_at: Option<DateTime<Utc>>,
    pub version: i32,
}

impl CommissionModel {
    /// A freshly calculated commission built from a quote.
    pub fn calculated(quote: &CommissionQuote, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            representative_id: quote.representative_id,
            consumer_id: quote.consumer_id,
            kwh: quote.kwh,
            kwh_price: quote.kwh_price,
            commission_value: quote.commission_value,
            status: CommissionStatus::Calculated,
            payment_proof: None,
            created_at: now,
            updated_at: now,
            paid_at: None,
            version: 0,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }
}

impl Identifiable for CommissionModel {
    fn get_id(&self) -> Uuid {
        self.id
    }
}

impl Versioned for CommissionModel {
    fn get_version(&self) -> i32 {
        self.version
    }
}
