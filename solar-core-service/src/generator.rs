use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use solar_core_api::domain::capacity::CapacitySnapshot;
use solar_core_api::domain::status::{derive_generator_status, GeneratorDisplayStatus, GeneratorStatus};
use solar_core_api::error::{ApiError, ApiResult};
use solar_core_db::models::generator::GeneratorModel;
use solar_core_db::repository::{ConsumerRepository, GeneratorRepository, Page, PageRequest, Repositories};

use crate::capacity::capacity_from_consumers;
use crate::fields::bounded;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewGenerator {
    #[validate(length(min = 1, max = 100))]
    pub owner_name: String,
    /// Installed power in kW
    pub installed_power: Decimal,
    #[validate(length(min = 1, max = 50))]
    pub source_type: String,
    /// Defaults to UNDER_ANALYSIS
    pub manually_set_status: Option<GeneratorStatus>,
}

/// A generator as readers see it: stored fields plus the derived status.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneratorView {
    pub generator: GeneratorModel,
    pub capacity: CapacitySnapshot,
    pub status: GeneratorDisplayStatus,
}

impl GeneratorView {
    pub fn project(generator: GeneratorModel, capacity: CapacitySnapshot) -> Self {
        let status = derive_generator_status(generator.manually_set_status, &capacity);
        Self {
            generator,
            capacity,
            status,
        }
    }
}

#[derive(Clone)]
pub struct GeneratorService {
    generators: Arc<dyn GeneratorRepository>,
    consumers: Arc<dyn ConsumerRepository>,
}

impl GeneratorService {
    pub fn new(repositories: &Repositories) -> Self {
        Self {
            generators: repositories.generators.clone(),
            consumers: repositories.consumers.clone(),
        }
    }

    pub async fn create_generator(&self, new: NewGenerator) -> ApiResult<GeneratorModel> {
        new.validate()?;
        if new.installed_power <= Decimal::ZERO {
            return Err(ApiError::ValidationError(
                "Installed power must be greater than zero".to_string(),
            ));
        }

        let now = Utc::now();
        let generator = GeneratorModel {
            id: Uuid::new_v4(),
            owner_name: bounded("owner_name", new.owner_name.trim())?,
            installed_power: new.installed_power,
            source_type: bounded("source_type", new.source_type.trim())?,
            manually_set_status: new.manually_set_status.unwrap_or(GeneratorStatus::UnderAnalysis),
            created_at: now,
            updated_at: now,
            version: 0,
        };
        let created = self
            .generators
            .create_batch(vec![generator])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| ApiError::InternalError("Generator was not created".to_string()))?;

        info!(generator_id = %created.id, installed_power = %created.installed_power, "generator created");
        Ok(created)
    }

    /// Changes the operator-set status. FULLY_ALLOCATED still wins on read
    /// while the generator is full.
    pub async fn update_manual_status(&self, generator_id: Uuid, status: GeneratorStatus) -> ApiResult<GeneratorModel> {
        let mut generator = self.generators.load(generator_id).await?;
        if generator.manually_set_status == status {
            return Ok(generator);
        }
        generator.manually_set_status = status;
        generator.updated_at = Utc::now();

        let updated = self
            .generators
            .update_batch(vec![generator])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| ApiError::InternalError("Generator was not updated".to_string()))?;
        info!(generator_id = %generator_id, status = ?status, "generator status updated");
        Ok(updated)
    }

    /// Refused while any consumer is allocated to the generator.
    pub async fn delete_generator(&self, generator_id: Uuid) -> ApiResult<()> {
        let generator = self.generators.load(generator_id).await?;
        let consumers = self.consumers.find_by_generator_id(generator.id).await?;
        let capacity = capacity_from_consumers(generator.id, &consumers);
        if capacity.consumer_count > 0 {
            return Err(ApiError::InvalidState(format!(
                "Generator {} still has {} allocated consumer(s)",
                generator.id, capacity.consumer_count
            )));
        }

        self.generators.delete_batch(&[generator.id]).await?;
        info!(generator_id = %generator_id, "generator deleted");
        Ok(())
    }

    pub async fn generator_view(&self, generator_id: Uuid) -> ApiResult<GeneratorView> {
        let generator = self.generators.load(generator_id).await?;
        self.project(generator).await
    }

    pub async fn list_generator_views(&self, request: PageRequest) -> ApiResult<Page<GeneratorView>> {
        let page = self.generators.list_page(request).await?;
        let mut views = Vec::with_capacity(page.items.len());
        for generator in page.items {
            views.push(self.project(generator).await?);
        }
        Ok(Page::new(views, page.total, page.limit, page.offset))
    }

    async fn project(&self, generator: GeneratorModel) -> ApiResult<GeneratorView> {
        let consumers = self.consumers.find_by_generator_id(generator.id).await?;
        let capacity = capacity_from_consumers(generator.id, &consumers);
        Ok(GeneratorView::project(generator, capacity))
    }
}
