use async_trait::async_trait;
use solar_core_db::models::commission::CommissionModel;
use solar_core_db::repository::error::{RepositoryError, RepositoryResult};
use solar_core_db::repository::load_batch::LoadBatch;
use crate::utils::TryFromRow;
use std::collections::HashMap;
use uuid::Uuid;

use super::repo_impl::CommissionRepositoryImpl;

impl CommissionRepositoryImpl {
    pub(super) async fn load_batch_impl(
        repo: &CommissionRepositoryImpl,
        ids: &[Uuid],
    ) -> RepositoryResult<Vec<Option<CommissionModel>>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query(r#"SELECT * FROM commission WHERE id = ANY($1)"#)
            .bind(ids)
            .fetch_all(&*repo.pool)
            .await?;

        let mut item_map = HashMap::with_capacity(rows.len());
        for row in rows {
            let item = CommissionModel::try_from_row(&row).map_err(RepositoryError::Storage)?;
            item_map.insert(item.id, item);
        }

        Ok(ids.iter().map(|id| item_map.get(id).cloned()).collect())
    }
}

#[async_trait]
impl LoadBatch<CommissionModel> for CommissionRepositoryImpl {
    async fn load_batch(&self, ids: &[Uuid]) -> RepositoryResult<Vec<Option<CommissionModel>>> {
        Self::load_batch_impl(self, ids).await
    }
}
