use async_trait::async_trait;
use solar_core_db::models::consumer::ConsumerModel;
use solar_core_db::repository::error::{RepositoryError, RepositoryResult};
use solar_core_db::repository::load_batch::LoadBatch;
use crate::utils::TryFromRow;
use std::collections::HashMap;
use uuid::Uuid;

use super::repo_impl::ConsumerRepositoryImpl;

impl ConsumerRepositoryImpl {
    pub(super) async fn load_batch_impl(
        repo: &ConsumerRepositoryImpl,
        ids: &[Uuid],
    ) -> RepositoryResult<Vec<Option<ConsumerModel>>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query(r#"SELECT * FROM consumer WHERE id = ANY($1)"#)
            .bind(ids)
            .fetch_all(&*repo.pool)
            .await?;

        let mut item_map = HashMap::with_capacity(rows.len());
        for row in rows {
            let item = ConsumerModel::try_from_row(&row).map_err(RepositoryError::Storage)?;
            item_map.insert(item.id, item);
        }

        Ok(ids.iter().map(|id| item_map.get(id).cloned()).collect())
    }
}

#[async_trait]
impl LoadBatch<ConsumerModel> for ConsumerRepositoryImpl {
    async fn load_batch(&self, ids: &[Uuid]) -> RepositoryResult<Vec<Option<ConsumerModel>>> {
        Self::load_batch_impl(self, ids).await
    }
}
