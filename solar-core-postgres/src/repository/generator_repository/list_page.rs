use async_trait::async_trait;
use solar_core_db::models::generator::GeneratorModel;
use solar_core_db::repository::error::{RepositoryError, RepositoryResult};
use solar_core_db::repository::list_page::ListPage;
use solar_core_db::repository::pagination::{Page, PageRequest};
use crate::utils::rows_into;

use super::repo_impl::GeneratorRepositoryImpl;

impl GeneratorRepositoryImpl {
    pub(super) async fn list_page_impl(
        repo: &GeneratorRepositoryImpl,
        request: PageRequest,
    ) -> RepositoryResult<Page<GeneratorModel>> {
        let total: i64 = sqlx::query_scalar(r#"SELECT COUNT(*) FROM generator"#)
            .fetch_one(&*repo.pool)
            .await?;

        let rows = sqlx::query(
            r#"SELECT * FROM generator ORDER BY created_at, id LIMIT $1 OFFSET $2"#,
        )
        .bind(request.limit as i64)
        .bind(request.offset as i64)
        .fetch_all(&*repo.pool)
        .await?;
        let items = rows_into(&rows).map_err(RepositoryError::Storage)?;

        Ok(Page::new(items, total as usize, request.limit, request.offset))
    }
}

#[async_trait]
impl ListPage<GeneratorModel> for GeneratorRepositoryImpl {
    async fn list_page(&self, request: PageRequest) -> RepositoryResult<Page<GeneratorModel>> {
        Self::list_page_impl(self, request).await
    }
}

#[cfg(test)]
mod tests {
    use crate::test_helper::setup_test_context;
    use solar_core_db::repository::create_batch::CreateBatch;
    use solar_core_db::repository::list_page::ListPage;
    use solar_core_db::repository::pagination::PageRequest;
    use super::super::test_utils::test_utils::create_test_generator;

    #[tokio::test]
    #[ignore = "requires PostgreSQL"]
    #[serial_test::serial]
    async fn test_list_page_reports_total() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let ctx = setup_test_context().await?;
        let generator_repo = &ctx.repositories.generators;

        generator_repo
            .create_batch(vec![create_test_generator(10), create_test_generator(20), create_test_generator(30)])
            .await?;

        let page = generator_repo.list_page(PageRequest::new(2, 0)).await?;
        assert_eq!(page.items.len(), 2);
        assert!(page.total >= 3);
        assert!(page.has_more());

        Ok(())
    }
}
