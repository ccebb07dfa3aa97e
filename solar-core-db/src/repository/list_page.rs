use async_trait::async_trait;

use crate::repository::error::RepositoryResult;
use crate::repository::pagination::{Page, PageRequest};

/// Lists entities page by page, ordered by creation time then id.
#[async_trait]
pub trait ListPage<T: Send + 'static>: Send + Sync {
    async fn list_page(&self, request: PageRequest) -> RepositoryResult<Page<T>>;
}
