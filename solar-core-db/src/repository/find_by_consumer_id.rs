use async_trait::async_trait;
use uuid::Uuid;

use crate::repository::error::RepositoryResult;

/// Loads the entities that belong to one consumer, oldest first.
#[async_trait]
pub trait FindByConsumerId<T: Send + 'static>: Send + Sync {
    async fn find_by_consumer_id(&self, consumer_id: Uuid) -> RepositoryResult<Vec<T>>;
}
