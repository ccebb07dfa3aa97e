use std::sync::Arc;

use uuid::Uuid;

use solar_core_api::domain::capacity::CapacitySnapshot;
use solar_core_api::error::{ApiError, ApiResult};
use solar_core_db::models::consumer::ConsumerModel;
use solar_core_db::repository::{ConsumerRepository, GeneratorRepository, Repositories};

/// Sums the ALLOCATED consumers of `generator_id` into a capacity snapshot.
pub fn capacity_from_consumers(generator_id: Uuid, consumers: &[ConsumerModel]) -> CapacitySnapshot {
    CapacitySnapshot::from_allocations(
        generator_id,
        consumers.iter().filter_map(|c| c.allocation_on(generator_id)),
    )
}

/// Read side of generator capacity. Never writes.
#[derive(Clone)]
pub struct CapacityLedger {
    generators: Arc<dyn GeneratorRepository>,
    consumers: Arc<dyn ConsumerRepository>,
}

impl CapacityLedger {
    pub fn new(repositories: &Repositories) -> Self {
        Self {
            generators: repositories.generators.clone(),
            consumers: repositories.consumers.clone(),
        }
    }

    pub async fn capacity_of(&self, generator_id: Uuid) -> ApiResult<CapacitySnapshot> {
        let exists = self
            .generators
            .exist_by_ids(&[generator_id])
            .await?
            .first()
            .is_some_and(|(_, exists)| *exists);
        if !exists {
            return Err(ApiError::not_found("Generator", generator_id));
        }

        let consumers = self.consumers.find_by_generator_id(generator_id).await?;
        Ok(capacity_from_consumers(generator_id, &consumers))
    }
}
