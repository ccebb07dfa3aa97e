use async_trait::async_trait;
use uuid::Uuid;

use crate::models::identifiable::Identifiable;
use crate::repository::error::{RepositoryError, RepositoryResult};

/// Generic repository trait for loading multiple entities by their IDs
///
/// Returns items in the same order as the provided IDs.
/// Missing items are represented as None in the result.
#[async_trait]
pub trait LoadBatch<T: Identifiable + Send + 'static>: Send + Sync {
    /// Load multiple entities by their unique identifiers
    ///
    /// # Returns
    /// * `Ok(Vec<Option<T>>)` - One slot per requested id
    ///   - `Some(T)` for entities that exist
    ///   - `None` for entities that do not exist
    async fn load_batch(&self, ids: &[Uuid]) -> RepositoryResult<Vec<Option<T>>>;

    /// Load a single entity, failing with `RepositoryError::NotFound` when absent.
    async fn load(&self, id: Uuid) -> RepositoryResult<T> {
        self.load_batch(&[id])
            .await?
            .into_iter()
            .next()
            .flatten()
            .ok_or(RepositoryError::NotFound(id))
    }
}
