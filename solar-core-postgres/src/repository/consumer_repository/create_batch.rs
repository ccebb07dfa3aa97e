use async_trait::async_trait;
use solar_core_db::models::consumer::ConsumerModel;
use solar_core_db::repository::create_batch::CreateBatch;
use solar_core_db::repository::error::RepositoryResult;

use super::repo_impl::ConsumerRepositoryImpl;

impl ConsumerRepositoryImpl {
    pub(super) async fn create_batch_impl(
        repo: &ConsumerRepositoryImpl,
        items: Vec<ConsumerModel>,
    ) -> RepositoryResult<Vec<ConsumerModel>> {
        if items.is_empty() {
            return Ok(Vec::new());
        }

        let mut tx = repo.pool.begin().await?;
        let mut saved_items = Vec::with_capacity(items.len());
        for mut item in items {
            item.version = 1;
            sqlx::query(
                r#"
                INSERT INTO consumer
                (id, name, email, phone, document, consumer_unit, address, city, state,
                 average_monthly_consumption, status, generator_id, allocated_percentage,
                 representative_id, discount_offered, created_at, updated_at, approved_at,
                 rejected_at, rejection_reason, version)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19, $20, $21)
                "#,
            )
            .bind(item.id)
            .bind(item.name.as_str())
            .bind(item.email.as_deref())
            .bind(item.phone.as_deref())
            .bind(item.document.as_deref())
            .bind(item.consumer_unit.as_deref())
            .bind(item.address.as_deref())
            .bind(item.city.as_deref())
            .bind(item.state.as_deref())
            .bind(item.average_monthly_consumption)
            .bind(item.status)
            .bind(item.generator_id)
            .bind(item.allocated_percentage)
            .bind(item.representative_id)
            .bind(item.discount_offered)
            .bind(item.created_at)
            .bind(item.updated_at)
            .bind(item.approved_at)
            .bind(item.rejected_at)
            .bind(item.rejection_reason.as_deref())
            .bind(item.version)
            .execute(&mut *tx)
            .await?;
            saved_items.push(item);
        }
        tx.commit().await?;

        Ok(saved_items)
    }
}

#[async_trait]
impl CreateBatch<ConsumerModel> for ConsumerRepositoryImpl {
    async fn create_batch(&self, items: Vec<ConsumerModel>) -> RepositoryResult<Vec<ConsumerModel>> {
        Self::create_batch_impl(self, items).await
    }
}

#[cfg(test)]
mod tests {
    use crate::test_helper::setup_test_context;
    use solar_core_api::domain::status::ConsumerStatus;
    use solar_core_api::error::ApiError;
    use solar_core_db::repository::create_batch::CreateBatch;
    use solar_core_db::repository::error::RepositoryError;
    use solar_core_db::repository::load_batch::LoadBatch;
    use rust_decimal::Decimal;
    use uuid::Uuid;
    use super::super::test_utils::test_utils::create_test_consumer;

    #[tokio::test]
    #[ignore = "requires PostgreSQL"]
    #[serial_test::serial]
    async fn test_create_batch_round_trips_optional_fields() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let ctx = setup_test_context().await?;
        let consumer_repo = &ctx.repositories.consumers;

        let consumer = create_test_consumer(ConsumerStatus::PendingApproval);
        consumer_repo.create_batch(vec![consumer.clone()]).await?;

        let loaded = consumer_repo.load(consumer.id).await?;
        assert_eq!(loaded.email, consumer.email);
        assert_eq!(loaded.document, None);
        assert_eq!(loaded.state.as_deref(), Some("SC"));
        assert_eq!(loaded.status, ConsumerStatus::PendingApproval);
        assert_eq!(loaded.version, 1);

        Ok(())
    }

    #[tokio::test]
    #[ignore = "requires PostgreSQL"]
    #[serial_test::serial]
    async fn test_create_batch_rejects_unknown_generator() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let ctx = setup_test_context().await?;
        let consumer_repo = &ctx.repositories.consumers;

        let mut consumer = create_test_consumer(ConsumerStatus::Allocated);
        consumer.generator_id = Some(Uuid::new_v4());
        consumer.allocated_percentage = Some(Decimal::from(10));

        let result = consumer_repo.create_batch(vec![consumer]).await;
        assert!(matches!(result, Err(RepositoryError::Rejected(ApiError::InvalidState(_)))));

        Ok(())
    }
}
