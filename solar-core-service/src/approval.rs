use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use solar_core_api::domain::status::ConsumerStatus;
use solar_core_api::error::{ApiError, ApiResult};
use solar_core_db::models::consumer::ConsumerModel;
use solar_core_db::repository::{ConsumerRepository, Repositories};

use crate::commission::{CommissionAttempt, CommissionCalculator};
use crate::fields::{bounded_opt, non_blank};

/// The approved consumer and what happened to its commission.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApprovalOutcome {
    pub consumer: ConsumerModel,
    pub commission: CommissionAttempt,
}

#[derive(Clone)]
pub struct ApprovalWorkflow {
    consumers: Arc<dyn ConsumerRepository>,
    calculator: CommissionCalculator,
}

impl ApprovalWorkflow {
    pub fn new(repositories: &Repositories, calculator: CommissionCalculator) -> Self {
        Self {
            consumers: repositories.consumers.clone(),
            calculator,
        }
    }

    /// PENDING_APPROVAL to AVAILABLE, then a commission attempt. The approval
    /// is committed first and stands whatever the attempt reports.
    pub async fn approve_consumer(&self, consumer_id: Uuid) -> ApiResult<ApprovalOutcome> {
        let mut consumer = self.load_pending(consumer_id, ConsumerStatus::Available).await?;
        let now = Utc::now();
        consumer.status = ConsumerStatus::Available;
        consumer.approved_at = Some(now);
        consumer.updated_at = now;
        let consumer = self.save(consumer).await?;
        info!(consumer_id = %consumer_id, "consumer approved");

        let commission = CommissionAttempt::from(self.calculator.generate_for_consumer(consumer_id).await);
        Ok(ApprovalOutcome { consumer, commission })
    }

    pub async fn reject_consumer(&self, consumer_id: Uuid, reason: Option<&str>) -> ApiResult<ConsumerModel> {
        let mut consumer = self.load_pending(consumer_id, ConsumerStatus::Rejected).await?;
        let now = Utc::now();
        consumer.status = ConsumerStatus::Rejected;
        consumer.rejected_at = Some(now);
        consumer.rejection_reason = bounded_opt("rejection_reason", non_blank(reason))?;
        consumer.updated_at = now;

        let rejected = self.save(consumer).await?;
        info!(consumer_id = %consumer_id, "consumer rejected");
        Ok(rejected)
    }

    async fn load_pending(&self, consumer_id: Uuid, next: ConsumerStatus) -> ApiResult<ConsumerModel> {
        let consumer = self.consumers.load(consumer_id).await?;
        if consumer.status != ConsumerStatus::PendingApproval || !consumer.status.can_transition_to(next) {
            return Err(ApiError::InvalidState(format!(
                "Consumer {consumer_id} is {} and not awaiting approval",
                consumer.status.as_str()
            )));
        }
        Ok(consumer)
    }

    async fn save(&self, consumer: ConsumerModel) -> ApiResult<ConsumerModel> {
        self.consumers
            .update_batch(vec![consumer])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| ApiError::InternalError("Consumer was not updated".to_string()))
    }
}
