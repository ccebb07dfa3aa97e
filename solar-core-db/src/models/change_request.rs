use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use solar_core_api::domain::change_set::ChangeSet;
use solar_core_api::domain::status::ChangeRequestStatus;

use crate::models::identifiable::Identifiable;
use crate::models::versioned::Versioned;

/// Database model for a proposed edit of an approved consumer.
///
/// Resolved exactly once; `rejection_reason` is set exactly when the request
/// was rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeRequestModel {
    pub id: Uuid,
    pub consumer_id: Uuid,
    pub representative_id: Uuid,
    pub old_values: Map<String, Value>,
    pub new_values: Map<String, Value>,
    pub changed_fields: Vec<String>,
    pub status: ChangeRequestStatus,
    pub requested_at: DateTime<Utc>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub rejection_reason: Option<String>,
    pub version: i32,
}

impl ChangeRequestModel {
    pub fn pending(consumer_id: Uuid, representative_id: Uuid, change_set: ChangeSet, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            consumer_id,
            representative_id,
            old_values: change_set.old_values,
            new_values: change_set.new_values,
            changed_fields: change_set.changed_fields,
            status: ChangeRequestStatus::Pending,
            requested_at: now,
            reviewed_at: None,
            rejection_reason: None,
            version: 0,
        }
    }

    pub fn change_set(&self) -> ChangeSet {
        ChangeSet {
            old_values: self.old_values.clone(),
            new_values: self.new_values.clone(),
            changed_fields: self.changed_fields.clone(),
        }
    }
}

impl Identifiable for ChangeRequestModel {
    fn get_id(&self) -> Uuid {
        self.id
    }
}

impl Versioned for ChangeRequestModel {
    fn get_version(&self) -> i32 {
        self.version
    }
}
