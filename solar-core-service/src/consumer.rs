use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use solar_core_api::domain::status::ConsumerStatus;
use solar_core_api::error::{ApiError, ApiResult};
use solar_core_db::models::consumer::ConsumerModel;
use solar_core_db::repository::{
    ChangeRequestRepository, CommissionRepository, ConsumerRepository, Repositories,
};

use crate::fields::{bounded, bounded_opt};

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct NewConsumer {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(email, length(max = 100))]
    pub email: Option<String>,
    #[validate(length(max = 20))]
    pub phone: Option<String>,
    #[validate(length(max = 20))]
    pub document: Option<String>,
    #[validate(length(max = 30))]
    pub consumer_unit: Option<String>,
    #[validate(length(max = 200))]
    pub address: Option<String>,
    #[validate(length(max = 100))]
    pub city: Option<String>,
    #[validate(length(equal = 2))]
    pub state: Option<String>,
    pub average_monthly_consumption: Decimal,
    pub discount_offered: Option<Decimal>,
    pub representative_id: Option<Uuid>,
}

#[derive(Clone)]
pub struct ConsumerService {
    consumers: Arc<dyn ConsumerRepository>,
    commissions: Arc<dyn CommissionRepository>,
    change_requests: Arc<dyn ChangeRequestRepository>,
}

impl ConsumerService {
    pub fn new(repositories: &Repositories) -> Self {
        Self {
            consumers: repositories.consumers.clone(),
            commissions: repositories.commissions.clone(),
            change_requests: repositories.change_requests.clone(),
        }
    }

    /// Operator registration. The consumer is approved on creation.
    pub async fn register_consumer(&self, new: NewConsumer) -> ApiResult<ConsumerModel> {
        let representative_id = new.representative_id;
        self.create(new, ConsumerStatus::Available, representative_id).await
    }

    /// Representative submission. The consumer waits for approval.
    pub async fn submit_consumer(&self, new: NewConsumer, representative_id: Uuid) -> ApiResult<ConsumerModel> {
        self.create(new, ConsumerStatus::PendingApproval, Some(representative_id))
            .await
    }

    /// Refused while the consumer is allocated or referenced by commissions
    /// or change requests.
    pub async fn delete_consumer(&self, consumer_id: Uuid) -> ApiResult<()> {
        let consumer = self.consumers.load(consumer_id).await?;
        if consumer.status == ConsumerStatus::Allocated {
            return Err(ApiError::InvalidState(format!(
                "Consumer {consumer_id} is allocated; deallocate it first"
            )));
        }
        if !self.commissions.find_by_consumer_id(consumer_id).await?.is_empty() {
            return Err(ApiError::InvalidState(format!(
                "Consumer {consumer_id} has commissions and cannot be deleted"
            )));
        }
        if !self.change_requests.find_by_consumer_id(consumer_id).await?.is_empty() {
            return Err(ApiError::InvalidState(format!(
                "Consumer {consumer_id} has change requests and cannot be deleted"
            )));
        }

        self.consumers.delete_batch(&[consumer_id]).await?;
        info!(consumer_id = %consumer_id, "consumer deleted");
        Ok(())
    }

    async fn create(
        &self,
        new: NewConsumer,
        status: ConsumerStatus,
        representative_id: Option<Uuid>,
    ) -> ApiResult<ConsumerModel> {
        new.validate()?;

        let now = Utc::now();
        let consumer = ConsumerModel {
            id: Uuid::new_v4(),
            name: bounded("name", new.name.trim())?,
            email: bounded_opt("email", new.email.as_deref())?,
            phone: bounded_opt("phone", new.phone.as_deref())?,
            document: bounded_opt("document", new.document.as_deref())?,
            consumer_unit: bounded_opt("consumer_unit", new.consumer_unit.as_deref())?,
            address: bounded_opt("address", new.address.as_deref())?,
            city: bounded_opt("city", new.city.as_deref())?,
            state: bounded_opt("state", new.state.as_deref())?,
            average_monthly_consumption: new.average_monthly_consumption,
            status,
            generator_id: None,
            allocated_percentage: None,
            representative_id,
            discount_offered: new.discount_offered,
            created_at: now,
            updated_at: now,
            approved_at: (status == ConsumerStatus::Available).then_some(now),
            rejected_at: None,
            rejection_reason: None,
            version: 0,
        };
        consumer.validate_fields()?;

        let created = self
            .consumers
            .create_batch(vec![consumer])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| ApiError::InternalError("Consumer was not created".to_string()))?;

        info!(
            consumer_id = %created.id,
            status = created.status.as_str(),
            representative_id = ?created.representative_id,
            "consumer created"
        );
        Ok(created)
    }
}
