use std::sync::Arc;

use chrono::Utc;
use serde_json::{Map, Value};
use tracing::info;
use uuid::Uuid;

use solar_core_api::domain::change_set::ChangeSet;
use solar_core_api::domain::status::ChangeRequestStatus;
use solar_core_api::error::{ApiError, ApiResult};
use solar_core_db::models::change_request::ChangeRequestModel;
use solar_core_db::models::consumer::ConsumerModel;
use solar_core_db::repository::{ChangeRequestRepository, ConsumerRepository, RepositoryError, Repositories};

use crate::fields::non_blank;

/// Proposed edits to approved consumers, resolved exactly once.
#[derive(Clone)]
pub struct ChangeRequestWorkflow {
    consumers: Arc<dyn ConsumerRepository>,
    change_requests: Arc<dyn ChangeRequestRepository>,
}

impl ChangeRequestWorkflow {
    pub fn new(repositories: &Repositories) -> Self {
        Self {
            consumers: repositories.consumers.clone(),
            change_requests: repositories.change_requests.clone(),
        }
    }

    /// Diffs `proposed` against the live consumer and stores the result as a
    /// PENDING request. Only the consumer's representative may propose edits.
    pub async fn submit_change_request(
        &self,
        consumer_id: Uuid,
        representative_id: Uuid,
        proposed: Map<String, Value>,
    ) -> ApiResult<ChangeRequestModel> {
        let consumer = self.consumers.load(consumer_id).await?;
        if !consumer.status.is_approved() {
            return Err(ApiError::InvalidState(format!(
                "Consumer {consumer_id} is {} and cannot be edited through a change request",
                consumer.status.as_str()
            )));
        }
        if consumer.representative_id != Some(representative_id) {
            return Err(ApiError::InvalidState(format!(
                "Consumer {consumer_id} is not represented by {representative_id}"
            )));
        }

        let change_set = ChangeSet::diff(&consumer.editable_values()?, &proposed)?;
        consumer.with_changes(&change_set)?;

        let request = ChangeRequestModel::pending(consumer_id, representative_id, change_set, Utc::now());
        let created = match self.change_requests.create_batch(vec![request]).await {
            Ok(created) => created,
            Err(RepositoryError::UniqueViolation(_)) => {
                return Err(ApiError::Conflict(format!(
                    "Consumer {consumer_id} already has a pending change request"
                )))
            }
            Err(e) => return Err(e.into()),
        };
        let created = created
            .into_iter()
            .next()
            .ok_or_else(|| ApiError::InternalError("Change request was not created".to_string()))?;

        info!(
            change_request_id = %created.id,
            consumer_id = %consumer_id,
            changed_fields = ?created.changed_fields,
            "change request submitted"
        );
        Ok(created)
    }

    /// Applies the changed fields to the consumer; every other field keeps
    /// its current value.
    pub async fn approve(&self, change_request_id: Uuid) -> ApiResult<ConsumerModel> {
        let mut request = self.load_pending(change_request_id).await?;
        let change_set = request.change_set();
        change_set.validate()?;

        let consumer = self.consumers.load(request.consumer_id).await?;
        let now = Utc::now();
        let mut updated = consumer.with_changes(&change_set)?;
        updated.updated_at = now;

        request.status = ChangeRequestStatus::Approved;
        request.reviewed_at = Some(now);

        let (_, consumer) = self
            .change_requests
            .resolve_change_request(request, Some(updated))
            .await?;
        let consumer = consumer
            .ok_or_else(|| ApiError::InternalError("Consumer was not updated".to_string()))?;

        info!(
            change_request_id = %change_request_id,
            consumer_id = %consumer.id,
            "change request approved"
        );
        Ok(consumer)
    }

    /// Leaves the consumer untouched. `reason` must not be blank.
    pub async fn reject(&self, change_request_id: Uuid, reason: &str) -> ApiResult<ChangeRequestModel> {
        let reason = non_blank(Some(reason))
            .ok_or_else(|| ApiError::ValidationError("A rejection reason is required".to_string()))?;
        let mut request = self.load_pending(change_request_id).await?;

        request.status = ChangeRequestStatus::Rejected;
        request.rejection_reason = Some(reason.to_string());
        request.reviewed_at = Some(Utc::now());

        let (rejected, _) = self.change_requests.resolve_change_request(request, None).await?;
        info!(change_request_id = %change_request_id, "change request rejected");
        Ok(rejected)
    }

    async fn load_pending(&self, change_request_id: Uuid) -> ApiResult<ChangeRequestModel> {
        let request = self.change_requests.load(change_request_id).await?;
        if request.status.is_resolved() {
            return Err(ApiError::InvalidState(format!(
                "Change request {change_request_id} was already resolved"
            )));
        }
        Ok(request)
    }
}
