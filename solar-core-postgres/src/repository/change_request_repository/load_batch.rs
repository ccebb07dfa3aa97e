use async_trait::async_trait;
use solar_core_db::models::change_request::ChangeRequestModel;
use solar_core_db::repository::error::{RepositoryError, RepositoryResult};
use solar_core_db::repository::load_batch::LoadBatch;
use crate::utils::TryFromRow;
use std::collections::HashMap;
use uuid::Uuid;

use super::repo_impl::ChangeRequestRepositoryImpl;

impl ChangeRequestRepositoryImpl {
    pub(super) async fn load_batch_impl(
        repo: &ChangeRequestRepositoryImpl,
        ids: &[Uuid],
    ) -> RepositoryResult<Vec<Option<ChangeRequestModel>>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query(r#"SELECT * FROM change_request WHERE id = ANY($1)"#)
            .bind(ids)
            .fetch_all(&*repo.pool)
            .await?;

        let mut item_map = HashMap::with_capacity(rows.len());
        for row in rows {
            let item = ChangeRequestModel::try_from_row(&row).map_err(RepositoryError::Storage)?;
            item_map.insert(item.id, item);
        }

        Ok(ids.iter().map(|id| item_map.get(id).cloned()).collect())
    }
}

#[async_trait]
impl LoadBatch<ChangeRequestModel> for ChangeRequestRepositoryImpl {
    async fn load_batch(&self, ids: &[Uuid]) -> RepositoryResult<Vec<Option<ChangeRequestModel>>> {
        Self::load_batch_impl(self, ids).await
    }
}
