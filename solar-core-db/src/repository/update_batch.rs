use async_trait::async_trait;

use crate::models::versioned::Versioned;
use crate::repository::error::RepositoryResult;

/// Generic repository trait for updating multiple entities in a batch
///
/// Each item carries the version it was loaded with. The write succeeds only
/// while the stored version still matches; the stored version is then bumped
/// by one. A mismatch on any item fails the whole batch with
/// `RepositoryError::ConcurrentModification` and nothing is written.
#[async_trait]
pub trait UpdateBatch<T: Versioned + Send + 'static>: Send + Sync {
    /// Update multiple items in a single transaction
    ///
    /// # Returns
    /// * `Ok(Vec<T>)` - The updated entities with their new versions
    async fn update_batch(&self, items: Vec<T>) -> RepositoryResult<Vec<T>>;
}
