use async_trait::async_trait;
use solar_core_api::error::ApiError;
use solar_core_db::models::change_request::ChangeRequestModel;
use solar_core_db::models::consumer::ConsumerModel;
use solar_core_db::repository::error::{RepositoryError, RepositoryResult};
use solar_core_db::repository::resolve_change_request::ResolveChangeRequest;
use crate::repository::consumer_repository::update_batch::update_consumer_row;
use crate::utils::stale_write_error;

use super::repo_impl::ChangeRequestRepositoryImpl;

impl ChangeRequestRepositoryImpl {
    pub(super) async fn resolve_change_request_impl(
        repo: &ChangeRequestRepositoryImpl,
        mut request: ChangeRequestModel,
        consumer: Option<ConsumerModel>,
    ) -> RepositoryResult<(ChangeRequestModel, Option<ConsumerModel>)> {
        if let Some(consumer) = &consumer {
            if consumer.id != request.consumer_id {
                return Err(RepositoryError::Rejected(ApiError::InternalError(
                    "Change request resolved against another consumer".to_string(),
                )));
            }
        }

        let mut tx = repo.pool.begin().await?;

        let new_version: Option<i32> = sqlx::query_scalar(
            r#"
            UPDATE change_request SET
                status = $2, reviewed_at = $3, rejection_reason = $4, version = version + 1
            WHERE id = $1 AND version = $5
            RETURNING version
            "#,
        )
        .bind(request.id)
        .bind(request.status)
        .bind(request.reviewed_at)
        .bind(request.rejection_reason.as_deref())
        .bind(request.version)
        .fetch_optional(&mut *tx)
        .await?;
        match new_version {
            Some(version) => request.version = version,
            None => return Err(stale_write_error(&mut *tx, "change_request", request.id).await),
        }

        let consumer = match consumer {
            Some(consumer) => Some(update_consumer_row(&mut *tx, consumer).await?),
            None => None,
        };

        tx.commit().await?;
        Ok((request, consumer))
    }
}

#[async_trait]
impl ResolveChangeRequest for ChangeRequestRepositoryImpl {
    async fn resolve_change_request(
        &self,
        request: ChangeRequestModel,
        consumer: Option<ConsumerModel>,
    ) -> RepositoryResult<(ChangeRequestModel, Option<ConsumerModel>)> {
        Self::resolve_change_request_impl(self, request, consumer).await
    }
}

#[cfg(test)]
mod tests {
    use crate::repository::consumer_repository::test_utils::test_utils::create_test_consumer;
    use crate::test_helper::setup_test_context;
    use serde_json::{json, Value};
    use solar_core_api::domain::status::{ChangeRequestStatus, ConsumerStatus};
    use solar_core_api::error::ApiError;
    use solar_core_db::repository::error::RepositoryError;
    use solar_core_service::ChangeRequestWorkflow;

    fn proposal(value: Value) -> serde_json::Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[tokio::test]
    #[ignore = "requires PostgreSQL"]
    #[serial_test::serial]
    async fn test_approve_writes_request_and_consumer() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let ctx = setup_test_context().await?;
        let repos = &ctx.repositories;
        let workflow = ChangeRequestWorkflow::new(repos);

        let consumer = repos
            .consumers
            .create_batch(vec![create_test_consumer(ConsumerStatus::Available)])
            .await?
            .remove(0);
        let representative_id = consumer.representative_id.unwrap();

        let request = workflow
            .submit_change_request(consumer.id, representative_id, proposal(json!({"phone": "48999999999"})))
            .await?;

        let second = workflow
            .submit_change_request(consumer.id, representative_id, proposal(json!({"city": "Joinville"})))
            .await;
        assert!(matches!(second, Err(ApiError::Conflict(_))));

        let updated = workflow.approve(request.id).await?;
        assert_eq!(updated.phone.as_deref(), Some("48999999999"));

        let resolved = repos.change_requests.load(request.id).await?;
        assert_eq!(resolved.status, ChangeRequestStatus::Approved);
        assert_eq!(resolved.version, request.version + 1);

        let stored = repos.consumers.load(consumer.id).await?;
        assert_eq!(stored.phone.as_deref(), Some("48999999999"));
        assert_eq!(stored.name, consumer.name);
        assert_eq!(stored.version, consumer.version + 1);

        let replay = repos.change_requests.resolve_change_request(request, None).await;
        assert!(matches!(replay, Err(RepositoryError::ConcurrentModification { .. })));

        Ok(())
    }
}
