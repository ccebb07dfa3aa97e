use async_trait::async_trait;
use uuid::Uuid;

use crate::repository::error::RepositoryResult;

/// Loads the entities attached to one generator.
#[async_trait]
pub trait FindByGeneratorId<T: Send + 'static>: Send + Sync {
    async fn find_by_generator_id(&self, generator_id: Uuid) -> RepositoryResult<Vec<T>>;
}
