use async_trait::async_trait;
use solar_core_api::domain::status::ConsumerStatus;
use solar_core_db::models::consumer::ConsumerModel;
use solar_core_db::repository::error::{RepositoryError, RepositoryResult};
use solar_core_db::repository::find_by_status::FindByStatus;
use crate::utils::rows_into;

use super::repo_impl::ConsumerRepositoryImpl;

impl ConsumerRepositoryImpl {
    pub(super) async fn find_by_status_impl(
        repo: &ConsumerRepositoryImpl,
        statuses: &[ConsumerStatus],
    ) -> RepositoryResult<Vec<ConsumerModel>> {
        if statuses.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query(
            r#"SELECT * FROM consumer WHERE status = ANY($1) ORDER BY created_at, id"#,
        )
        .bind(statuses)
        .fetch_all(&*repo.pool)
        .await?;
        rows_into(&rows).map_err(RepositoryError::Storage)
    }
}

#[async_trait]
impl FindByStatus<ConsumerModel, ConsumerStatus> for ConsumerRepositoryImpl {
    async fn find_by_status(&self, statuses: &[ConsumerStatus]) -> RepositoryResult<Vec<ConsumerModel>> {
        Self::find_by_status_impl(self, statuses).await
    }
}
