use async_trait::async_trait;
use solar_core_db::models::change_request::ChangeRequestModel;
use solar_core_db::repository::error::{RepositoryError, RepositoryResult};
use solar_core_db::repository::find_by_consumer_id::FindByConsumerId;
use crate::utils::rows_into;
use uuid::Uuid;

use super::repo_impl::ChangeRequestRepositoryImpl;

impl ChangeRequestRepositoryImpl {
    pub(super) async fn find_by_consumer_id_impl(
        repo: &ChangeRequestRepositoryImpl,
        consumer_id: Uuid,
    ) -> RepositoryResult<Vec<ChangeRequestModel>> {
        let rows = sqlx::query(
            r#"SELECT * FROM change_request WHERE consumer_id = $1 ORDER BY requested_at, id"#,
        )
        .bind(consumer_id)
        .fetch_all(&*repo.pool)
        .await?;
        rows_into(&rows).map_err(RepositoryError::Storage)
    }
}

#[async_trait]
impl FindByConsumerId<ChangeRequestModel> for ChangeRequestRepositoryImpl {
    async fn find_by_consumer_id(&self, consumer_id: Uuid) -> RepositoryResult<Vec<ChangeRequestModel>> {
        Self::find_by_consumer_id_impl(self, consumer_id).await
    }
}
