use async_trait::async_trait;
use solar_core_db::models::generator::GeneratorModel;
use solar_core_db::repository::delete_batch::DeleteBatch;
use solar_core_db::repository::error::RepositoryResult;
use uuid::Uuid;

use super::repo_impl::GeneratorRepositoryImpl;

impl GeneratorRepositoryImpl {
    /// Consumers reference generators with `ON DELETE RESTRICT`; deleting a
    /// referenced generator fails as an invalid state.
    pub(super) async fn delete_batch_impl(
        repo: &GeneratorRepositoryImpl,
        ids: &[Uuid],
    ) -> RepositoryResult<usize> {
        if ids.is_empty() {
            return Ok(0);
        }

        let result = sqlx::query(r#"DELETE FROM generator WHERE id = ANY($1)"#)
            .bind(ids)
            .execute(&*repo.pool)
            .await?;
        Ok(result.rows_affected() as usize)
    }
}

#[async_trait]
impl DeleteBatch<GeneratorModel> for GeneratorRepositoryImpl {
    async fn delete_batch(&self, ids: &[Uuid]) -> RepositoryResult<usize> {
        Self::delete_batch_impl(self, ids).await
    }
}
