use async_trait::async_trait;
use solar_core_api::domain::status::ChangeRequestStatus;
use solar_core_db::models::change_request::ChangeRequestModel;
use solar_core_db::repository::error::{RepositoryError, RepositoryResult};
use solar_core_db::repository::find_by_status::FindByStatus;
use crate::utils::rows_into;

use super::repo_impl::ChangeRequestRepositoryImpl;

impl ChangeRequestRepositoryImpl {
    pub(super) async fn find_by_status_impl(
        repo: &ChangeRequestRepositoryImpl,
        statuses: &[ChangeRequestStatus],
    ) -> RepositoryResult<Vec<ChangeRequestModel>> {
        if statuses.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query(
            r#"SELECT * FROM change_request WHERE status = ANY($1) ORDER BY requested_at, id"#,
        )
        .bind(statuses)
        .fetch_all(&*repo.pool)
        .await?;
        rows_into(&rows).map_err(RepositoryError::Storage)
    }
}

#[async_trait]
impl FindByStatus<ChangeRequestModel, ChangeRequestStatus> for ChangeRequestRepositoryImpl {
    async fn find_by_status(&self, statuses: &[ChangeRequestStatus]) -> RepositoryResult<Vec<ChangeRequestModel>> {
        Self::find_by_status_impl(self, statuses).await
    }
}
