use async_trait::async_trait;
use solar_core_db::models::change_request::ChangeRequestModel;
use solar_core_db::repository::create_batch::CreateBatch;
use solar_core_db::repository::error::RepositoryResult;
use sqlx::types::Json;

use super::repo_impl::ChangeRequestRepositoryImpl;

impl ChangeRequestRepositoryImpl {
    /// `change_request_pending_consumer_uidx` refuses a second PENDING
    /// request for the same consumer.
    pub(super) async fn create_batch_impl(
        repo: &ChangeRequestRepositoryImpl,
        items: Vec<ChangeRequestModel>,
    ) -> RepositoryResult<Vec<ChangeRequestModel>> {
        if items.is_empty() {
            return Ok(Vec::new());
        }

        let mut tx = repo.pool.begin().await?;
        let mut saved_items = Vec::with_capacity(items.len());
        for mut item in items {
            item.version = 1;
            sqlx::query(
                r#"
                INSERT INTO change_request
                (id, consumer_id, representative_id, old_values, new_values, changed_fields,
                 status, requested_at, reviewed_at, rejection_reason, version)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
                "#,
            )
            .bind(item.id)
            .bind(item.consumer_id)
            .bind(item.representative_id)
            .bind(Json(&item.old_values))
            .bind(Json(&item.new_values))
            .bind(item.changed_fields.as_slice())
            .bind(item.status)
            .bind(item.requested_at)
            .bind(item.reviewed_at)
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
impl CreateBatch<ChangeRequestModel> for ChangeRequestRepositoryImpl {
    async fn create_batch(&self, items: Vec<ChangeRequestModel>) -> RepositoryResult<Vec<ChangeRequestModel>> {
        Self::create_batch_impl(self, items).await
    }
}
