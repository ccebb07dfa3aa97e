use async_trait::async_trait;
use solar_core_db::models::generator::GeneratorModel;
use solar_core_db::repository::error::RepositoryResult;
use solar_core_db::repository::update_batch::UpdateBatch;
use crate::utils::stale_write_error;

use super::repo_impl::GeneratorRepositoryImpl;

impl GeneratorRepositoryImpl {
    pub(super) async fn update_batch_impl(
        repo: &GeneratorRepositoryImpl,
        items: Vec<GeneratorModel>,
    ) -> RepositoryResult<Vec<GeneratorModel>> {
        if items.is_empty() {
            return Ok(Vec::new());
        }

        let mut tx = repo.pool.begin().await?;
        let mut updated_items = Vec::with_capacity(items.len());
        for mut item in items {
            let new_version: Option<i32> = sqlx::query_scalar(
                r#"
                UPDATE generator SET
                    owner_name = $2, installed_power = $3, source_type = $4,
                    manually_set_status = $5, updated_at = $6, version = version + 1
                WHERE id = $1 AND version = $7
                RETURNING version
                "#,
            )
            .bind(item.id)
            .bind(item.owner_name.as_str())
            .bind(item.installed_power)
            .bind(item.source_type.as_str())
            .bind(item.manually_set_status)
            .bind(item.updated_at)
            .bind(item.version)
            .fetch_optional(&mut *tx)
            .await?;

            match new_version {
                Some(version) => item.version = version,
                None => return Err(stale_write_error(&mut *tx, "generator", item.id).await),
            }
            updated_items.push(item);
        }
        tx.commit().await?;

        Ok(updated_items)
    }
}

#[async_trait]
impl UpdateBatch<GeneratorModel> for GeneratorRepositoryImpl {
    async fn update_batch(&self, items: Vec<GeneratorModel>) -> RepositoryResult<Vec<GeneratorModel>> {
        Self::update_batch_impl(self, items).await
    }
}

#[cfg(test)]
mod tests {
    use crate::test_helper::setup_test_context;
    use solar_core_api::domain::status::GeneratorStatus;
    use solar_core_db::repository::create_batch::CreateBatch;
    use solar_core_db::repository::error::RepositoryError;
    use solar_core_db::repository::load_batch::LoadBatch;
    use solar_core_db::repository::update_batch::UpdateBatch;
    use super::super::test_utils::test_utils::create_test_generator;

    #[tokio::test]
    #[ignore = "requires PostgreSQL"]
    #[serial_test::serial]
    async fn test_update_batch_bumps_version() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let ctx = setup_test_context().await?;
        let generator_repo = &ctx.repositories.generators;

        let mut generator = generator_repo.create_batch(vec![create_test_generator(100)]).await?.remove(0);
        generator.manually_set_status = GeneratorStatus::UnderAnalysis;

        let updated = generator_repo.update_batch(vec![generator.clone()]).await?.remove(0);
        assert_eq!(updated.version, 2);

        let loaded = generator_repo.load(generator.id).await?;
        assert_eq!(loaded.manually_set_status, GeneratorStatus::UnderAnalysis);
        assert_eq!(loaded.version, 2);

        Ok(())
    }

    #[tokio::test]
    #[ignore = "requires PostgreSQL"]
    #[serial_test::serial]
    async fn test_update_batch_with_stale_version() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let ctx = setup_test_context().await?;
        let generator_repo = &ctx.repositories.generators;

        let generator = generator_repo.create_batch(vec![create_test_generator(100)]).await?.remove(0);
        generator_repo.update_batch(vec![generator.clone()]).await?;

        let result = generator_repo.update_batch(vec![generator.clone()]).await;
        assert!(matches!(
            result,
            Err(RepositoryError::ConcurrentModification { id, .. }) if id == generator.id
        ));

        Ok(())
    }
}
