use async_trait::async_trait;
use solar_core_db::models::consumer::ConsumerModel;
use solar_core_db::repository::error::RepositoryResult;
use solar_core_db::repository::update_batch::UpdateBatch;
use sqlx::PgConnection;
use crate::utils::stale_write_error;

use super::repo_impl::ConsumerRepositoryImpl;

/// Writes every column of `item` if the stored version still matches.
///
/// Shared by the plain update, the allocation transaction and change-request
/// resolution so all three go through the same version check.
pub(crate) async fn update_consumer_row(
    conn: &mut PgConnection,
    mut item: ConsumerModel,
) -> RepositoryResult<ConsumerModel> {
    let new_version: Option<i32> = sqlx::query_scalar(
        r#"
        UPDATE consumer SET
            name = $2, email = $3, phone = $4, document = $5, consumer_unit = $6,
            address = $7, city = $8, state = $9, average_monthly_consumption = $10,
            status = $11, generator_id = $12, allocated_percentage = $13,
            representative_id = $14, discount_offered = $15, updated_at = $16,
            approved_at = $17, rejected_at = $18, rejection_reason = $19,
            version = version + 1
        WHERE id = $1 AND version = $20
        RETURNING version
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
    .bind(item.updated_at)
    .bind(item.approved_at)
    .bind(item.rejected_at)
    .bind(item.rejection_reason.as_deref())
    .bind(item.version)
    .fetch_optional(&mut *conn)
    .await?;

    match new_version {
        Some(version) => {
            item.version = version;
            Ok(item)
        }
        None => Err(stale_write_error(conn, "consumer", item.id).await),
    }
}

impl ConsumerRepositoryImpl {
    pub(super) async fn update_batch_impl(
        repo: &ConsumerRepositoryImpl,
        items: Vec<ConsumerModel>,
    ) -> RepositoryResult<Vec<ConsumerModel>> {
        if items.is_empty() {
            return Ok(Vec::new());
        }

        let mut tx = repo.pool.begin().await?;
        let mut updated_items = Vec::with_capacity(items.len());
        for item in items {
            updated_items.push(update_consumer_row(&mut *tx, item).await?);
        }
        tx.commit().await?;

        Ok(updated_items)
    }
}

#[async_trait]
impl UpdateBatch<ConsumerModel> for ConsumerRepositoryImpl {
    async fn update_batch(&self, items: Vec<ConsumerModel>) -> RepositoryResult<Vec<ConsumerModel>> {
        Self::update_batch_impl(self, items).await
    }
}

#[cfg(test)]
mod tests {
    use crate::test_helper::setup_test_context;
    use chrono::{SubsecRound, Utc};
    use solar_core_api::domain::status::ConsumerStatus;
    use solar_core_db::repository::create_batch::CreateBatch;
    use solar_core_db::repository::error::RepositoryError;
    use solar_core_db::repository::load_batch::LoadBatch;
    use solar_core_db::repository::update_batch::UpdateBatch;
    use super::super::test_utils::test_utils::create_test_consumer;

    #[tokio::test]
    #[ignore = "requires PostgreSQL"]
    #[serial_test::serial]
    async fn test_update_batch_is_all_or_nothing() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let ctx = setup_test_context().await?;
        let consumer_repo = &ctx.repositories.consumers;

        let saved = consumer_repo
            .create_batch(vec![
                create_test_consumer(ConsumerStatus::PendingApproval),
                create_test_consumer(ConsumerStatus::PendingApproval),
            ])
            .await?;

        let mut approved = saved[0].clone();
        approved.status = ConsumerStatus::Available;
        approved.approved_at = Some(Utc::now().trunc_subsecs(6));
        let mut stale = saved[1].clone();
        stale.version = 7;

        let result = consumer_repo.update_batch(vec![approved.clone(), stale]).await;
        assert!(matches!(result, Err(RepositoryError::ConcurrentModification { .. })));

        let unchanged = consumer_repo.load(approved.id).await?;
        assert_eq!(unchanged.status, ConsumerStatus::PendingApproval);
        assert_eq!(unchanged.version, 1);

        Ok(())
    }
}
