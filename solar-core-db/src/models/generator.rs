use chrono::{DateTime, Utc};
use heapless::String as HeaplessString;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use solar_core_api::domain::status::GeneratorStatus;

use crate::models::identifiable::Identifiable;
use crate::models::versioned::Versioned;

/// Database model for a solar generator.
///
/// The allocated percentage and the FULLY_ALLOCATED status are not stored
/// here; they are projected from the generator's consumers on every read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorModel {
    pub id: Uuid,
    pub owner_name: HeaplessString<100>,
    /// Installed power in kW
    pub installed_power: Decimal,
    /// e.g. "SOLAR", "WIND", "HYBRID"
    pub source_type: HeaplessString<50>,
    pub manually_set_status: GeneratorStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub version: i32,
}

impl Identifiable for GeneratorModel {
    fn get_id(&self) -> Uuid {
        self.id
    }
}

impl Versioned for GeneratorModel {
    fn get_version(&self) -> i32 {
        self.version
    }
}
