use async_trait::async_trait;
use solar_core_db::models::commission::CommissionModel;
use solar_core_db::repository::error::{RepositoryError, RepositoryResult};
use solar_core_db::repository::find_by_consumer_id::FindByConsumerId;
use crate::utils::rows_into;
use uuid::Uuid;

use super::repo_impl::CommissionRepositoryImpl;

impl CommissionRepositoryImpl {
    pub(super) async fn find_by_consumer_id_impl(
        repo: &CommissionRepositoryImpl,
        consumer_id: Uuid,
    ) -> RepositoryResult<Vec<CommissionModel>> {
        let rows = sqlx::query(
            r#"SELECT * FROM commission WHERE consumer_id = $1 ORDER BY created_at, id"#,
        )
        .bind(consumer_id)
        .fetch_all(&*repo.pool)
        .await?;
        rows_into(&rows).map_err(RepositoryError::Storage)
    }
}

#[async_trait]
impl FindByConsumerId<CommissionModel> for CommissionRepositoryImpl {
    async fn find_by_consumer_id(&self, consumer_id: Uuid) -> RepositoryResult<Vec<CommissionModel>> {
        Self::find_by_consumer_id_impl(self, consumer_id).await
    }
}
