use async_trait::async_trait;

use crate::models::change_request::ChangeRequestModel;
use crate::models::consumer::ConsumerModel;
use crate::repository::error::RepositoryResult;

/// Writes a resolved change request and, when approved, the edited consumer
/// in one unit of work. Both writes are version-checked.
#[async_trait]
pub trait ResolveChangeRequest: Send + Sync {
    async fn resolve_change_request(
        &self,
        request: ChangeRequestModel,
        consumer: Option<ConsumerModel>,
    ) -> RepositoryResult<(ChangeRequestModel, Option<ConsumerModel>)>;
}
