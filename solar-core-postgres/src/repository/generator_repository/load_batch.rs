use async_trait::async_trait;
use solar_core_db::models::generator::GeneratorModel;
use solar_core_db::repository::error::{RepositoryError, RepositoryResult};
use solar_core_db::repository::load_batch::LoadBatch;
use crate::utils::TryFromRow;
use std::collections::HashMap;
use uuid::Uuid;

use super::repo_impl::GeneratorRepositoryImpl;

impl GeneratorRepositoryImpl {
    pub(super) async fn load_batch_impl(
        repo: &GeneratorRepositoryImpl,
        ids: &[Uuid],
    ) -> RepositoryResult<Vec<Option<GeneratorModel>>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query(r#"SELECT * FROM generator WHERE id = ANY($1)"#)
            .bind(ids)
            .fetch_all(&*repo.pool)
            .await?;

        let mut item_map = HashMap::with_capacity(rows.len());
        for row in rows {
            let item = GeneratorModel::try_from_row(&row).map_err(RepositoryError::Storage)?;
            item_map.insert(item.id, item);
        }

        Ok(ids.iter().map(|id| item_map.get(id).cloned()).collect())
    }
}

#[async_trait]
impl LoadBatch<GeneratorModel> for GeneratorRepositoryImpl {
    async fn load_batch(&self, ids: &[Uuid]) -> RepositoryResult<Vec<Option<GeneratorModel>>> {
        Self::load_batch_impl(self, ids).await
    }
}

#[cfg(test)]
mod tests {
    use crate::test_helper::setup_test_context;
    use solar_core_db::repository::create_batch::CreateBatch;
    use solar_core_db::repository::error::RepositoryError;
    use solar_core_db::repository::load_batch::LoadBatch;
    use uuid::Uuid;
    use super::super::test_utils::test_utils::create_test_generator;

    #[tokio::test]
    #[ignore = "requires PostgreSQL"]
    #[serial_test::serial]
    async fn test_load_batch_with_non_existing() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let ctx = setup_test_context().await?;
        let generator_repo = &ctx.repositories.generators;

        let saved = generator_repo.create_batch(vec![create_test_generator(80)]).await?;

        let ids = vec![saved[0].id, Uuid::new_v4()];
        let loaded = generator_repo.load_batch(&ids).await?;

        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].as_ref().map(|g| g.id), Some(saved[0].id));
        assert!(loaded[1].is_none());

        let missing = Uuid::new_v4();
        assert!(matches!(generator_repo.load(missing).await, Err(RepositoryError::NotFound(id)) if id == missing));

        Ok(())
    }
}
