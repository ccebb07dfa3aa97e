use async_trait::async_trait;
use solar_core_db::models::commission::CommissionModel;
use solar_core_db::repository::create_active_commission::CreateActiveCommission;
use solar_core_db::repository::error::RepositoryResult;

use super::repo_impl::CommissionRepositoryImpl;

impl CommissionRepositoryImpl {
    /// `commission_active_consumer_uidx` makes the insert fail with a unique
    /// violation when the consumer already has a non-cancelled commission.
    pub(super) async fn create_active_commission_impl(
        repo: &CommissionRepositoryImpl,
        mut item: CommissionModel,
    ) -> RepositoryResult<CommissionModel> {
        item.version = 1;
        let proof = item.payment_proof.as_ref();
        sqlx::query(
            r#"
            INSERT INTO commission
            (id, representative_id, consumer_id, kwh, kwh_price, commission_value, status,
             payment_proof_url, payment_proof_file_name, payment_proof_uploaded_at,
             created_at, updated_at, paid_at, version)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
        )
        .bind(item.id)
        .bind(item.representative_id)
        .bind(item.consumer_id)
        .bind(item.kwh)
        .bind(item.kwh_price)
        .bind(item.commission_value)
        .bind(item.status)
        .bind(proof.map(|p| p.url.as_str()))
        .bind(proof.map(|p| p.file_name.as_str()))
        .bind(proof.map(|p| p.uploaded_at))
        .bind(item.created_at)
        .bind(item.updated_at)
        .bind(item.paid_at)
        .bind(item.version)
        .execute(&*repo.pool)
        .await?;

        Ok(item)
    }
}

#[async_trait]
impl CreateActiveCommission for CommissionRepositoryImpl {
    async fn create_active_commission(&self, commission: CommissionModel) -> RepositoryResult<CommissionModel> {
        Self::create_active_commission_impl(self, commission).await
    }
}

#[cfg(test)]
mod tests {
    use crate::repository::consumer_repository::test_utils::test_utils::create_test_consumer;
    use crate::test_helper::setup_test_context;
    use solar_core_api::domain::status::{CommissionStatus, ConsumerStatus};
    use solar_core_db::repository::create_active_commission::CreateActiveCommission;
    use solar_core_db::repository::error::RepositoryError;
    use solar_core_db::repository::update_batch::UpdateBatch;
    use super::super::test_utils::test_utils::create_test_commission;

    #[tokio::test]
    #[ignore = "requires PostgreSQL"]
    #[serial_test::serial]
    async fn test_one_active_commission_per_consumer() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let ctx = setup_test_context().await?;
        let repos = &ctx.repositories;

        let consumer = repos
            .consumers
            .create_batch(vec![create_test_consumer(ConsumerStatus::Available)])
            .await?
            .remove(0);

        let first = repos.commissions.create_active_commission(create_test_commission(consumer.id)).await?;
        assert_eq!(first.version, 1);

        let duplicate = repos.commissions.create_active_commission(create_test_commission(consumer.id)).await;
        assert!(matches!(duplicate, Err(RepositoryError::UniqueViolation(_))));

        let mut cancelled = first.clone();
        cancelled.status = CommissionStatus::Cancelled;
        repos.commissions.update_batch(vec![cancelled]).await?;

        let replacement = repos.commissions.create_active_commission(create_test_commission(consumer.id)).await?;
        assert_eq!(replacement.status, CommissionStatus::Calculated);

        Ok(())
    }
}
