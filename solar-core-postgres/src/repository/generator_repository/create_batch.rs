use async_trait::async_trait;
use solar_core_db::models::generator::GeneratorModel;
use solar_core_db::repository::create_batch::CreateBatch;
use solar_core_db::repository::error::RepositoryResult;

use super::repo_impl::GeneratorRepositoryImpl;

impl GeneratorRepositoryImpl {
    pub(super) async fn create_batch_impl(
        repo: &GeneratorRepositoryImpl,
        items: Vec<GeneratorModel>,
    ) -> RepositoryResult<Vec<GeneratorModel>> {
        if items.is_empty() {
            return Ok(Vec::new());
        }

        let mut tx = repo.pool.begin().await?;
        let mut saved_items = Vec::with_capacity(items.len());
        for mut item in items {
            item.version = 1;
            sqlx::query(
                r#"
                INSERT INTO generator
                (id, owner_name, installed_power, source_type, manually_set_status, created_at, updated_at, version)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                "#,
            )
            .bind(item.id)
            .bind(item.owner_name.as_str())
            .bind(item.installed_power)
            .bind(item.source_type.as_str())
            .bind(item.manually_set_status)
            .bind(item.created_at)
            .bind(item.updated_at)
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
impl CreateBatch<GeneratorModel> for GeneratorRepositoryImpl {
    async fn create_batch(&self, items: Vec<GeneratorModel>) -> RepositoryResult<Vec<GeneratorModel>> {
        Self::create_batch_impl(self, items).await
    }
}
