use async_trait::async_trait;
use solar_core_db::models::consumer::ConsumerModel;
use solar_core_db::repository::delete_batch::DeleteBatch;
use solar_core_db::repository::error::RepositoryResult;
use uuid::Uuid;

use super::repo_impl::ConsumerRepositoryImpl;

impl ConsumerRepositoryImpl {
    /// Commissions and change requests reference consumers with
    /// `ON DELETE RESTRICT`; nothing is removed on their behalf.
    pub(super) async fn delete_batch_impl(
        repo: &ConsumerRepositoryImpl,
        ids: &[Uuid],
    ) -> RepositoryResult<usize> {
        if ids.is_empty() {
            return Ok(0);
        }

        let result = sqlx::query(r#"DELETE FROM consumer WHERE id = ANY($1)"#)
            .bind(ids)
            .execute(&*repo.pool)
            .await?;
        Ok(result.rows_affected() as usize)
    }
}

#[async_trait]
impl DeleteBatch<ConsumerModel> for ConsumerRepositoryImpl {
    async fn delete_batch(&self, ids: &[Uuid]) -> RepositoryResult<usize> {
        Self::delete_batch_impl(self, ids).await
    }
}
