use async_trait::async_trait;

use crate::repository::error::RepositoryResult;

/// Loads every entity whose status is one of `statuses`, ordered by creation time.
#[async_trait]
pub trait FindByStatus<T: Send + 'static, S: Copy + Send + Sync + 'static>: Send + Sync {
    async fn find_by_status(&self, statuses: &[S]) -> RepositoryResult<Vec<T>>;
}
