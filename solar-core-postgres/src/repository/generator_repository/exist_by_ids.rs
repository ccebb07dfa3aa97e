use async_trait::async_trait;
use solar_core_db::models::generator::GeneratorModel;
use solar_core_db::repository::error::RepositoryResult;
use solar_core_db::repository::exist_by_ids::ExistByIds;
use std::collections::HashSet;
use uuid::Uuid;

use super::repo_impl::GeneratorRepositoryImpl;

impl GeneratorRepositoryImpl {
    pub(super) async fn exist_by_ids_impl(
        repo: &GeneratorRepositoryImpl,
        ids: &[Uuid],
    ) -> RepositoryResult<Vec<(Uuid, bool)>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let found: Vec<Uuid> = sqlx::query_scalar(r#"SELECT id FROM generator WHERE id = ANY($1)"#)
            .bind(ids)
            .fetch_all(&*repo.pool)
            .await?;
        let found: HashSet<Uuid> = found.into_iter().collect();

        Ok(ids.iter().map(|id| (*id, found.contains(id))).collect())
    }
}

#[async_trait]
impl ExistByIds<GeneratorModel> for GeneratorRepositoryImpl {
    async fn exist_by_ids(&self, ids: &[Uuid]) -> RepositoryResult<Vec<(Uuid, bool)>> {
        Self::exist_by_ids_impl(self, ids).await
    }
}
