use async_trait::async_trait;
use uuid::Uuid;

use solar_core_api::error::ApiResult;

use crate::models::consumer::ConsumerModel;
use crate::models::generator::GeneratorModel;
use crate::repository::error::RepositoryResult;

/// State an allocation plan is evaluated against.
///
/// Implementations build the snapshot while holding the locks of every
/// generator involved, so no other allocation can change it until the plan's
/// result is written.
#[derive(Debug, Clone)]
pub struct AllocationSnapshot {
    pub consumer: ConsumerModel,
    /// The generator the consumer ends up on, if any.
    pub target_generator: Option<GeneratorModel>,
    /// ALLOCATED consumers of the target generator, excluding `consumer`.
    pub target_allocations: Vec<ConsumerModel>,
}

impl AllocationSnapshot {
    pub fn target_allocated_percentages(&self) -> impl Iterator<Item = rust_decimal::Decimal> + '_ {
        self.target_allocations
            .iter()
            .filter_map(|c| c.allocated_percentage)
    }
}

/// Evaluates the business rules and returns the consumer as it must be written.
pub type AllocationPlan = dyn Fn(&AllocationSnapshot) -> ApiResult<ConsumerModel> + Send + Sync;

/// Serialized read-check-write of a consumer's allocation.
///
/// Locks the consumer's current generator and `target_generator_id`
/// (ascending id order), then the consumer, builds an [`AllocationSnapshot`],
/// runs `plan` and writes its result in the same unit of work. A plan error is
/// returned as `RepositoryError::Rejected` and nothing is written.
#[async_trait]
pub trait ApplyAllocation: Send + Sync {
    async fn apply_allocation(
        &self,
        consumer_id: Uuid,
        target_generator_id: Option<Uuid>,
        plan: &AllocationPlan,
    ) -> RepositoryResult<ConsumerModel>;
}
