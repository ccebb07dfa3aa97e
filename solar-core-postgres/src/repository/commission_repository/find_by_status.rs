use async_trait::async_trait;
use solar_core_api::domain::status::CommissionStatus;
use solar_core_db::models::commission::CommissionModel;
use solar_core_db::repository::error::{RepositoryError, RepositoryResult};
use solar_core_db::repository::find_by_status::FindByStatus;
use crate::utils::rows_into;

use super::repo_impl::CommissionRepositoryImpl;

impl CommissionRepositoryImpl {
    pub(super) async fn find_by_status_impl(
        repo: &CommissionRepositoryImpl,
        statuses: &[CommissionStatus],
    ) -> RepositoryResult<Vec<CommissionModel>> {
        if statuses.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query(
            r#"SELECT * FROM commission WHERE status = ANY($1) ORDER BY created_at, id"#,
        )
        .bind(statuses)
        .fetch_all(&*repo.pool)
        .await?;
        rows_into(&rows).map_err(RepositoryError::Storage)
    }
}

#[async_trait]
impl FindByStatus<CommissionModel, CommissionStatus> for CommissionRepositoryImpl {
    async fn find_by_status(&self, statuses: &[CommissionStatus]) -> RepositoryResult<Vec<CommissionModel>> {
        Self::find_by_status_impl(self, statuses).await
    }
}
