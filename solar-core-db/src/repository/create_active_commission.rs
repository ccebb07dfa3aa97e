use async_trait::async_trait;

use crate::models::commission::CommissionModel;
use crate::repository::error::RepositoryResult;

/// Inserts a commission unless the consumer already has an active one.
///
/// The check and the insert are one atomic step at the storage level; the
/// loser of a race gets `RepositoryError::UniqueViolation`.
#[async_trait]
pub trait CreateActiveCommission: Send + Sync {
    async fn create_active_commission(&self, commission: CommissionModel) -> RepositoryResult<CommissionModel>;
}
