use async_trait::async_trait;

use crate::models::identifiable::Identifiable;
use crate::repository::error::RepositoryResult;

/// Generic repository trait for creating multiple entities in a batch
///
/// All creates are performed within a single transaction. Returned items
/// carry their first stored version (1).
///
/// # Example
/// ```ignore
/// impl CreateBatch<GeneratorModel> for GeneratorRepositoryImpl {
///     async fn create_batch(&self, items: Vec<GeneratorModel>) -> RepositoryResult<Vec<GeneratorModel>> {
///         // Implementation
///     }
/// }
/// ```
#[async_trait]
pub trait CreateBatch<T: Identifiable + Send + 'static>: Send + Sync {
    /// Save multiple items in a single transaction
    ///
    /// # Returns
    /// * `Ok(Vec<T>)` - The created entities, in input order
    /// * `Err(RepositoryError::UniqueViolation)` - An id or unique key already exists
    async fn create_batch(&self, items: Vec<T>) -> RepositoryResult<Vec<T>>;
}
