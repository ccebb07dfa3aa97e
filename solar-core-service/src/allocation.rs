use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::info;
use uuid::Uuid;

use solar_core_api::domain::capacity::CapacitySnapshot;
use solar_core_api::domain::percentage::{auto_percentage, validate_percentage};
use solar_core_api::domain::status::ConsumerStatus;
use solar_core_api::error::{ApiError, ApiResult};
use solar_core_db::models::consumer::ConsumerModel;
use solar_core_db::repository::{AllocationSnapshot, ConsumerRepository, Repositories};

/// Moves consumers on and off generators without ever exceeding 100%.
///
/// The capacity check runs inside the repository's allocation unit of work,
/// so concurrent allocations against one generator are evaluated one after
/// the other against fresh state.
#[derive(Clone)]
pub struct AllocationManager {
    consumers: Arc<dyn ConsumerRepository>,
}

impl AllocationManager {
    pub fn new(repositories: &Repositories) -> Self {
        Self {
            consumers: repositories.consumers.clone(),
        }
    }

    /// Allocates an AVAILABLE consumer. Without `percentage` the share is
    /// derived from consumption and installed power.
    pub async fn allocate(
        &self,
        consumer_id: Uuid,
        generator_id: Uuid,
        percentage: Option<Decimal>,
    ) -> ApiResult<ConsumerModel> {
        let plan = move |snapshot: &AllocationSnapshot| {
            plan_allocation(snapshot, percentage, ConsumerStatus::Available, Utc::now())
        };
        let consumer = self
            .consumers
            .apply_allocation(consumer_id, Some(generator_id), &plan)
            .await?;

        info!(
            consumer_id = %consumer_id,
            generator_id = %generator_id,
            allocated_percentage = ?consumer.allocated_percentage,
            "consumer allocated"
        );
        Ok(consumer)
    }

    pub async fn deallocate(&self, consumer_id: Uuid) -> ApiResult<ConsumerModel> {
        let plan = |snapshot: &AllocationSnapshot| plan_deallocation(snapshot, Utc::now());
        let consumer = self.consumers.apply_allocation(consumer_id, None, &plan).await?;

        info!(consumer_id = %consumer_id, "consumer deallocated");
        Ok(consumer)
    }

    /// Moves an ALLOCATED consumer to `new_generator_id` in one step. The
    /// consumer is never observable as AVAILABLE, and on failure it stays on
    /// its current generator.
    pub async fn reallocate(
        &self,
        consumer_id: Uuid,
        new_generator_id: Uuid,
        percentage: Option<Decimal>,
    ) -> ApiResult<ConsumerModel> {
        let plan = move |snapshot: &AllocationSnapshot| {
            plan_allocation(snapshot, percentage, ConsumerStatus::Allocated, Utc::now())
        };
        let consumer = self
            .consumers
            .apply_allocation(consumer_id, Some(new_generator_id), &plan)
            .await?;

        info!(
            consumer_id = %consumer_id,
            generator_id = %new_generator_id,
            allocated_percentage = ?consumer.allocated_percentage,
            "consumer reallocated"
        );
        Ok(consumer)
    }
}

/// Places `snapshot.consumer` on the target generator.
///
/// `expected` is AVAILABLE for a first allocation and ALLOCATED for a move.
pub fn plan_allocation(
    snapshot: &AllocationSnapshot,
    requested: Option<Decimal>,
    expected: ConsumerStatus,
    now: DateTime<Utc>,
) -> ApiResult<ConsumerModel> {
    let consumer = &snapshot.consumer;
    if consumer.status != expected || !consumer.status.can_transition_to(ConsumerStatus::Allocated) {
        return Err(ApiError::InvalidState(format!(
            "Consumer {} is {} and must be {} for this operation",
            consumer.id,
            consumer.status.as_str(),
            expected.as_str()
        )));
    }
    let generator = snapshot
        .target_generator
        .as_ref()
        .ok_or_else(|| ApiError::InternalError("Allocation target was not loaded".to_string()))?;

    let percentage = match requested {
        Some(percentage) => validate_percentage(percentage)?,
        None => {
            let auto = auto_percentage(consumer.average_monthly_consumption, generator.installed_power)
                .ok_or_else(|| {
                    ApiError::ValidationError(format!(
                        "Generator {} has no installed power; an explicit percentage is required",
                        generator.id
                    ))
                })?;
            validate_percentage(auto)?
        }
    };

    let capacity = CapacitySnapshot::from_allocations(generator.id, snapshot.target_allocated_percentages());
    if !capacity.can_accommodate(percentage) {
        return Err(ApiError::CapacityExceeded {
            generator_id: generator.id,
            allocated: capacity.allocated_percentage,
            available: capacity.available_percentage,
            requested: percentage,
        });
    }

    let mut allocated = consumer.clone();
    allocated.status = ConsumerStatus::Allocated;
    allocated.generator_id = Some(generator.id);
    allocated.allocated_percentage = Some(percentage);
    allocated.updated_at = now;
    Ok(allocated)
}

pub fn plan_deallocation(snapshot: &AllocationSnapshot, now: DateTime<Utc>) -> ApiResult<ConsumerModel> {
    let consumer = &snapshot.consumer;
    if !consumer.status.can_transition_to(ConsumerStatus::Available) || consumer.status != ConsumerStatus::Allocated {
        return Err(ApiError::InvalidState(format!(
            "Consumer {} is {} and cannot be deallocated",
            consumer.id,
            consumer.status.as_str()
        )));
    }

    let mut released = consumer.clone();
    released.status = ConsumerStatus::Available;
    released.generator_id = None;
    released.allocated_percentage = None;
    released.updated_at = now;
    Ok(released)
}

#[cfg(test)]
mod tests {
    use tokio_test::assert_ok;

    use solar_core_api::domain::status::GeneratorDisplayStatus;

    use super::*;
    use crate::test_support::{dec, Fixture, TestResult};

    #[tokio::test]
    async fn test_auto_percentage_from_consumption() -> TestResult {
        let fx = Fixture::new();
        let generator = fx.generator("1000").await?;
        let consumer = fx.available_consumer("300", None).await?;

        let allocated = fx.services.allocation.allocate(consumer.id, generator.id, None).await?;
        assert_eq!(allocated.allocated_percentage, Some(dec("30.00")));
        assert_eq!(allocated.generator_id, Some(generator.id));
        assert_eq!(allocated.status, ConsumerStatus::Allocated);
        Ok(())
    }

    #[tokio::test]
    async fn test_allocate_then_deallocate_round_trip() -> TestResult {
        let fx = Fixture::new();
        let generator = fx.generator("1000").await?;
        let consumer = fx.available_consumer("300", None).await?;

        fx.services.allocation.allocate(consumer.id, generator.id, Some(dec("40"))).await?;
        assert_eq!(fx.services.capacity.capacity_of(generator.id).await?.allocated_percentage, dec("40"));

        let released = fx.services.allocation.deallocate(consumer.id).await?;
        assert_eq!(released.status, ConsumerStatus::Available);
        assert_eq!(released.generator_id, None);
        assert_eq!(released.allocated_percentage, None);
        assert!(released.has_consistent_allocation());

        let capacity = fx.services.capacity.capacity_of(generator.id).await?;
        assert_eq!(capacity.allocated_percentage, Decimal::ZERO);
        assert_eq!(capacity.consumer_count, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_capacity_boundary() -> TestResult {
        let fx = Fixture::new();
        let generator = fx.generator("100").await?;
        for _ in 0..2 {
            let c = fx.available_consumer("10", None).await?;
            fx.services.allocation.allocate(c.id, generator.id, Some(dec("40"))).await?;
        }
        let newcomer = fx.available_consumer("10", None).await?;

        let refused = fx
            .services
            .allocation
            .allocate(newcomer.id, generator.id, Some(dec("21")))
            .await;
        match refused {
            Err(ApiError::CapacityExceeded {
                allocated,
                available,
                requested,
                ..
            }) => {
                assert_eq!(allocated, dec("80"));
                assert_eq!(available, dec("20"));
                assert_eq!(requested, dec("21"));
            }
            other => panic!("expected CapacityExceeded, got {other:?}"),
        }
        let unchanged = fx.repositories.consumers.load(newcomer.id).await?;
        assert_eq!(unchanged.status, ConsumerStatus::Available);

        assert_ok!(
            fx.services
                .allocation
                .allocate(newcomer.id, generator.id, Some(dec("20")))
                .await
        );
        let view = fx.services.generators.generator_view(generator.id).await?;
        assert_eq!(view.status, GeneratorDisplayStatus::FullyAllocated);
        assert_eq!(view.capacity.available_percentage, Decimal::ZERO);
        assert_eq!(view.capacity.consumer_count, 3);
        Ok(())
    }

    #[tokio::test]
    async fn test_state_preconditions() -> TestResult {
        let fx = Fixture::new();
        let generator = fx.generator("1000").await?;
        let consumer = fx.available_consumer("300", None).await?;

        let result = fx.services.allocation.deallocate(consumer.id).await;
        assert!(matches!(result, Err(ApiError::InvalidState(_))));
        let result = fx.services.allocation.reallocate(consumer.id, generator.id, None).await;
        assert!(matches!(result, Err(ApiError::InvalidState(_))));

        for bad in ["0", "-5", "100.01"] {
            let result = fx.services.allocation.allocate(consumer.id, generator.id, Some(dec(bad))).await;
            assert!(matches!(result, Err(ApiError::ValidationError(_))), "{bad} accepted");
        }

        fx.services.allocation.allocate(consumer.id, generator.id, Some(dec("10"))).await?;
        let result = fx.services.allocation.allocate(consumer.id, generator.id, Some(dec("10"))).await;
        assert!(matches!(result, Err(ApiError::InvalidState(_))));

        let pending = fx.pending_consumer("300", Uuid::new_v4()).await?;
        let result = fx.services.allocation.allocate(pending.id, generator.id, None).await;
        assert!(matches!(result, Err(ApiError::InvalidState(_))));

        let result = fx.services.allocation.allocate(Uuid::new_v4(), generator.id, None).await;
        assert!(matches!(result, Err(ApiError::NotFound(_))));
        Ok(())
    }

    #[tokio::test]
    async fn test_reallocate_moves_in_one_step() -> TestResult {
        let fx = Fixture::new();
        let origin = fx.generator("1000").await?;
        let target = fx.generator("1000").await?;
        let consumer = fx.available_consumer("300", None).await?;
        fx.services.allocation.allocate(consumer.id, origin.id, Some(dec("50"))).await?;

        let moved = fx.services.allocation.reallocate(consumer.id, target.id, None).await?;
        assert_eq!(moved.status, ConsumerStatus::Allocated);
        assert_eq!(moved.generator_id, Some(target.id));
        assert_eq!(moved.allocated_percentage, Some(dec("30.00")));

        assert_eq!(fx.services.capacity.capacity_of(origin.id).await?.consumer_count, 0);
        assert_eq!(fx.services.capacity.capacity_of(target.id).await?.allocated_percentage, dec("30.00"));
        Ok(())
    }

    #[tokio::test]
    async fn test_failed_reallocate_keeps_current_allocation() -> TestResult {
        let fx = Fixture::new();
        let origin = fx.generator("1000").await?;
        let full = fx.generator("1000").await?;
        let blocker = fx.available_consumer("100", None).await?;
        fx.services.allocation.allocate(blocker.id, full.id, Some(dec("95"))).await?;

        let consumer = fx.available_consumer("300", None).await?;
        fx.services.allocation.allocate(consumer.id, origin.id, Some(dec("50"))).await?;

        let result = fx.services.allocation.reallocate(consumer.id, full.id, Some(dec("10"))).await;
        assert!(matches!(result, Err(ApiError::CapacityExceeded { .. })));

        let after = fx.repositories.consumers.load(consumer.id).await?;
        assert_eq!(after.status, ConsumerStatus::Allocated);
        assert_eq!(after.generator_id, Some(origin.id));
        assert_eq!(after.allocated_percentage, Some(dec("50")));
        Ok(())
    }

    #[tokio::test]
    async fn test_reallocate_on_same_generator_ignores_own_share() -> TestResult {
        let fx = Fixture::new();
        let generator = fx.generator("100").await?;
        let consumer = fx.available_consumer("10", None).await?;
        fx.services.allocation.allocate(consumer.id, generator.id, Some(dec("70"))).await?;

        let resized = fx
            .services
            .allocation
            .reallocate(consumer.id, generator.id, Some(dec("100")))
            .await?;
        assert_eq!(resized.allocated_percentage, Some(dec("100")));
        assert_eq!(fx.services.capacity.capacity_of(generator.id).await?.allocated_percentage, dec("100"));
        Ok(())
    }

    #[tokio::test]
    async fn test_explicit_percentage_required_without_installed_power() -> TestResult {
        let fx = Fixture::new();
        let mut generator = fx.generator("1000").await?;
        generator.installed_power = Decimal::ZERO;
        let generator = fx.repositories.generators.update_batch(vec![generator]).await?.remove(0);
        let consumer = fx.available_consumer("300", None).await?;

        let result = fx.services.allocation.allocate(consumer.id, generator.id, None).await;
        assert!(matches!(result, Err(ApiError::ValidationError(_))));
        assert_ok!(fx.services.allocation.allocate(consumer.id, generator.id, Some(dec("25"))).await);
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_allocations_never_exceed_capacity() -> TestResult {
        let fx = Fixture::new();
        let generator = fx.generator("100").await?;
        let mut consumers = Vec::new();
        for _ in 0..10 {
            consumers.push(fx.available_consumer("10", None).await?);
        }

        let mut handles = Vec::new();
        for consumer in consumers {
            let allocation = fx.services.allocation.clone();
            let generator_id = generator.id;
            handles.push(tokio::spawn(async move {
                allocation.allocate(consumer.id, generator_id, Some(dec("20"))).await
            }));
        }

        let mut succeeded = 0;
        for handle in handles {
            match handle.await? {
                Ok(_) => succeeded += 1,
                Err(ApiError::CapacityExceeded { .. }) => {}
                Err(other) => return Err(other.into()),
            }
        }
        assert_eq!(succeeded, 5);

        let capacity = fx.services.capacity.capacity_of(generator.id).await?;
        assert_eq!(capacity.allocated_percentage, dec("100"));
        assert_eq!(capacity.consumer_count, 5);
        Ok(())
    }
}
