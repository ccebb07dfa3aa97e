use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::identifiable::Identifiable;

/// One entry of the kWh price history. The newest entry is the current price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct KwhPriceModel {
    pub id: Uuid,
    pub price: Decimal,
    pub effective_from: DateTime<Utc>,
}

impl Identifiable for KwhPriceModel {
    fn get_id(&self) -> Uuid {
        self.id
    }
}
