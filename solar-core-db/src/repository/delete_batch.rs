use async_trait::async_trait;
use uuid::Uuid;

use crate::models::identifiable::Identifiable;
use crate::repository::error::RepositoryResult;

/// Generic repository trait for deleting multiple entities in a batch
///
/// All deletes are performed within a single transaction.
/// Returns the number of items actually deleted.
#[async_trait]
pub trait DeleteBatch<T: Identifiable + Send + 'static>: Send + Sync {
    async fn delete_batch(&self, ids: &[Uuid]) -> RepositoryResult<usize>;
}
