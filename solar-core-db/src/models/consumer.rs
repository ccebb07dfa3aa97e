use chrono::{DateTime, Utc};
use heapless::String as HeaplessString;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use solar_core_api::domain::change_set::{ChangeSet, EDITABLE_CONSUMER_FIELDS};
use solar_core_api::domain::commission::CommissionCandidate;
use solar_core_api::domain::status::ConsumerStatus;
use solar_core_api::error::{ApiError, ApiResult};

use crate::models::identifiable::Identifiable;
use crate::models::versioned::Versioned;

/// Database model for an energy consumer.
///
/// `generator_id` and `allocated_percentage` are set exactly when the status
/// is ALLOCATED.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsumerModel {
    pub id: Uuid,
    pub name: HeaplessString<100>,
    pub email: Option<HeaplessString<100>>,
    pub phone: Option<HeaplessString<20>>,
    /// CPF or CNPJ
    pub document: Option<HeaplessString<20>>,
    /// Utility consumer unit number
    pub consumer_unit: Option<HeaplessString<30>>,
    pub address: Option<HeaplessString<200>>,
    pub city: Option<HeaplessString<100>>,
    pub state: Option<HeaplessString<2>>,
    /// Average monthly consumption in kWh
    pub average_monthly_consumption: Decimal,
    pub status: ConsumerStatus,
    pub generator_id: Option<Uuid>,
    pub allocated_percentage: Option<Decimal>,
    pub representative_id: Option<Uuid>,
    /// Discount offered to the consumer, in percent
    pub discount_offered: Option<Decimal>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub approved_at: Option<DateTime<Utc>>,
    pub rejected_at: Option<DateTime<Utc>>,
    pub rejection_reason: Option<HeaplessString<500>>,
    pub version: i32,
}

impl ConsumerModel {
    /// `status = ALLOCATED <=> generator_id != null <=> allocated_percentage != null`
    pub fn has_consistent_allocation(&self) -> bool {
        let allocated = self.status == ConsumerStatus::Allocated;
        allocated == self.generator_id.is_some() && allocated == self.allocated_percentage.is_some()
    }

    /// The percentage this consumer draws from `generator_id`, if any.
    pub fn allocation_on(&self, generator_id: Uuid) -> Option<Decimal> {
        match (self.status, self.generator_id, self.allocated_percentage) {
            (ConsumerStatus::Allocated, Some(id), Some(pct)) if id == generator_id => Some(pct),
            _ => None,
        }
    }

    pub fn commission_candidate(&self) -> CommissionCandidate {
        CommissionCandidate {
            consumer_id: self.id,
            representative_id: self.representative_id,
            average_monthly_consumption: self.average_monthly_consumption,
            status: self.status,
        }
    }

    /// The fields a change request may touch, keyed by field name.
    pub fn editable_values(&self) -> ApiResult<Map<String, Value>> {
        let mut all = self.to_json_map()?;
        all.retain(|field, _| EDITABLE_CONSUMER_FIELDS.contains(&field.as_str()));
        Ok(all)
    }

    /// Returns a copy of this consumer with the change set applied.
    ///
    /// Fields outside the change set keep their values; the result is
    /// re-validated so an edit cannot produce an invalid record.
    pub fn with_changes(&self, change_set: &ChangeSet) -> ApiResult<ConsumerModel> {
        let mut values = self.to_json_map()?;
        change_set.apply_to(&mut values)?;

        let updated: ConsumerModel = serde_json::from_value(Value::Object(values))
            .map_err(|e| ApiError::ValidationError(format!("Invalid consumer change: {e}")))?;
        updated.validate_fields()?;
        Ok(updated)
    }

    pub fn validate_fields(&self) -> ApiResult<()> {
        if self.name.trim().is_empty() {
            return Err(ApiError::ValidationError("Consumer name must not be empty".to_string()));
        }
        if self.average_monthly_consumption <= Decimal::ZERO {
            return Err(ApiError::ValidationError(
                "Average monthly consumption must be greater than zero".to_string(),
            ));
        }
        if let Some(discount) = self.discount_offered {
            if discount < Decimal::ZERO || discount > Decimal::ONE_HUNDRED {
                return Err(ApiError::ValidationError(
                    "Discount offered must be between 0 and 100".to_string(),
                ));
            }
        }
        Ok(())
    }

    fn to_json_map(&self) -> ApiResult<Map<String, Value>> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Err(ApiError::InternalError("Consumer did not serialize to an object".to_string())),
            Err(e) => Err(ApiError::InternalError(format!("Failed to serialize consumer: {e}"))),
        }
    }
}

impl Identifiable for ConsumerModel {
    fn get_id(&self) -> Uuid {
        self.id
    }
}

impl Versioned for ConsumerModel {
    fn get_version(&self) -> i32 {
        self.version
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::str::FromStr;

    fn consumer() -> ConsumerModel {
        let now = Utc::now();
        ConsumerModel {
            id: Uuid::new_v4(),
            name: HeaplessString::try_from("Maria Souza").unwrap(),
            email: Some(HeaplessString::try_from("maria@example.com").unwrap()),
            phone: Some(HeaplessString::try_from("4833334444").unwrap()),
            document: None,
            consumer_unit: None,
            address: None,
            city: Some(HeaplessString::try_from("Florianopolis").unwrap()),
            state: Some(HeaplessString::try_from("SC").unwrap()),
            average_monthly_consumption: Decimal::from(300),
            status: ConsumerStatus::Available,
            generator_id: None,
            allocated_percentage: None,
            representative_id: Some(Uuid::new_v4()),
            discount_offered: Some(Decimal::from_str("15.5").unwrap()),
            created_at: now,
            updated_at: now,
            approved_at: Some(now),
            rejected_at: None,
            rejection_reason: None,
            version: 1,
        }
    }

    #[test]
    fn test_allocation_consistency() {
        let mut c = consumer();
        assert!(c.has_consistent_allocation());

        c.status = ConsumerStatus::Allocated;
        assert!(!c.has_consistent_allocation());

        c.generator_id = Some(Uuid::new_v4());
        c.allocated_percentage = Some(Decimal::from(40));
        assert!(c.has_consistent_allocation());
        assert_eq!(c.allocation_on(c.generator_id.unwrap()), Some(Decimal::from(40)));
        assert_eq!(c.allocation_on(Uuid::new_v4()), None);
    }

    #[test]
    fn test_editable_values_excludes_protected_fields() {
        let values = consumer().editable_values().unwrap();
        assert!(values.contains_key("phone"));
        assert!(values.contains_key("average_monthly_consumption"));
        assert!(!values.contains_key("status"));
        assert!(!values.contains_key("generator_id"));
        assert!(!values.contains_key("representative_id"));
    }

    #[test]
    fn test_with_changes_only_touches_changed_fields() {
        let before = consumer();
        let current = before.editable_values().unwrap();
        let proposed = match json!({"phone": "48999999999"}) {
            Value::Object(map) => map,
            _ => unreachable!(),
        };
        let change_set = ChangeSet::diff(&current, &proposed).unwrap();

        let after = before.with_changes(&change_set).unwrap();
        assert_eq!(after.phone.as_deref(), Some("48999999999"));
        assert_eq!(after.name, before.name);
        assert_eq!(after.email, before.email);
        assert_eq!(after.average_monthly_consumption, before.average_monthly_consumption);
        assert_eq!(after.discount_offered, before.discount_offered);
        assert_eq!(after.status, before.status);
        assert_eq!(after.version, before.version);
    }

    #[test]
    fn test_with_changes_rejects_invalid_result() {
        let before = consumer();
        let current = before.editable_values().unwrap();
        let proposed = match json!({"average_monthly_consumption": 0}) {
            Value::Object(map) => map,
            _ => unreachable!(),
        };
        let change_set = ChangeSet::diff(&current, &proposed).unwrap();
        assert!(matches!(before.with_changes(&change_set), Err(ApiError::ValidationError(_))));

        let proposed = match json!({"state": "Santa Catarina"}) {
            Value::Object(map) => map,
            _ => unreachable!(),
        };
        let change_set = ChangeSet::diff(&current, &proposed).unwrap();
        assert!(before.with_changes(&change_set).is_err());
    }
}
