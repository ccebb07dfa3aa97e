use async_trait::async_trait;
use solar_core_db::models::consumer::ConsumerModel;
use solar_core_db::repository::error::{RepositoryError, RepositoryResult};
use solar_core_db::repository::find_by_generator_id::FindByGeneratorId;
use crate::utils::rows_into;
use uuid::Uuid;

use super::repo_impl::ConsumerRepositoryImpl;

impl ConsumerRepositoryImpl {
    pub(super) async fn find_by_generator_id_impl(
        repo: &ConsumerRepositoryImpl,
        generator_id: Uuid,
    ) -> RepositoryResult<Vec<ConsumerModel>> {
        let rows = sqlx::query(
            r#"SELECT * FROM consumer WHERE generator_id = $1 ORDER BY created_at, id"#,
        )
        .bind(generator_id)
        .fetch_all(&*repo.pool)
        .await?;
        rows_into(&rows).map_err(RepositoryError::Storage)
    }
}

#[async_trait]
impl FindByGeneratorId<ConsumerModel> for ConsumerRepositoryImpl {
    async fn find_by_generator_id(&self, generator_id: Uuid) -> RepositoryResult<Vec<ConsumerModel>> {
        Self::find_by_generator_id_impl(self, generator_id).await
    }
}
