use async_trait::async_trait;
use rand::Rng;
use solar_core_api::domain::status::ConsumerStatus;
use solar_core_api::error::ApiError;
use solar_core_db::models::consumer::ConsumerModel;
use solar_core_db::models::generator::GeneratorModel;
use solar_core_db::repository::apply_allocation::{AllocationPlan, AllocationSnapshot, ApplyAllocation};
use solar_core_db::repository::error::{RepositoryError, RepositoryResult};
use crate::utils::{rows_into, TryFromRow};
use std::time::Duration;
use tracing::{debug, warn};
use uuid::Uuid;

use super::repo_impl::ConsumerRepositoryImpl;
use super::update_batch::update_consumer_row;

const RETRY_BASE_DELAY_MS: u64 = 10;

enum AllocationAttempt {
    Applied(ConsumerModel),
    /// The consumer changed generator between the unlocked read and the lock.
    Moved,
}

fn retry_delay(attempt: u32) -> Duration {
    let jitter = rand::thread_rng().gen_range(0..=RETRY_BASE_DELAY_MS);
    Duration::from_millis(RETRY_BASE_DELAY_MS * u64::from(attempt) + jitter)
}

impl ConsumerRepositoryImpl {
    pub(super) async fn apply_allocation_impl(
        repo: &ConsumerRepositoryImpl,
        consumer_id: Uuid,
        target_generator_id: Option<Uuid>,
        plan: &AllocationPlan,
    ) -> RepositoryResult<ConsumerModel> {
        for attempt in 1..=repo.allocation_retry_attempts {
            match Self::try_apply_allocation(repo, consumer_id, target_generator_id, plan).await? {
                AllocationAttempt::Applied(consumer) => return Ok(consumer),
                AllocationAttempt::Moved => {
                    warn!(consumer_id = %consumer_id, attempt, "consumer moved while locking generators, retrying");
                    tokio::time::sleep(retry_delay(attempt)).await;
                }
            }
        }

        Err(RepositoryError::Rejected(ApiError::Conflict(format!(
            "Consumer {consumer_id} kept changing generator; allocation abandoned after {} attempts",
            repo.allocation_retry_attempts
        ))))
    }

    /// One locked read-check-write. Generators are locked in ascending id
    /// order before the consumer row, the same order every allocation uses.
    async fn try_apply_allocation(
        repo: &ConsumerRepositoryImpl,
        consumer_id: Uuid,
        target_generator_id: Option<Uuid>,
        plan: &AllocationPlan,
    ) -> RepositoryResult<AllocationAttempt> {
        let current_generator_id: Option<Option<Uuid>> =
            sqlx::query_scalar(r#"SELECT generator_id FROM consumer WHERE id = $1"#)
                .bind(consumer_id)
                .fetch_optional(&*repo.pool)
                .await?;
        let current_generator_id = current_generator_id.ok_or(RepositoryError::NotFound(consumer_id))?;

        let mut generator_ids: Vec<Uuid> = current_generator_id.into_iter().chain(target_generator_id).collect();
        generator_ids.sort();
        generator_ids.dedup();

        let mut tx = repo.pool.begin().await?;

        let generator_rows = sqlx::query(r#"SELECT * FROM generator WHERE id = ANY($1) ORDER BY id FOR UPDATE"#)
            .bind(generator_ids.as_slice())
            .fetch_all(&mut *tx)
            .await?;
        let locked_generators: Vec<GeneratorModel> = rows_into(&generator_rows).map_err(RepositoryError::Storage)?;

        let consumer_row = sqlx::query(r#"SELECT * FROM consumer WHERE id = $1 FOR UPDATE"#)
            .bind(consumer_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(RepositoryError::NotFound(consumer_id))?;
        let consumer = ConsumerModel::try_from_row(&consumer_row).map_err(RepositoryError::Storage)?;
        if consumer.generator_id != current_generator_id {
            return Ok(AllocationAttempt::Moved);
        }

        let target_generator = match target_generator_id {
            Some(id) => Some(
                locked_generators
                    .iter()
                    .find(|g| g.id == id)
                    .cloned()
                    .ok_or(RepositoryError::NotFound(id))?,
            ),
            None => None,
        };
        let target_allocations: Vec<ConsumerModel> = match target_generator_id {
            Some(id) => {
                let rows = sqlx::query(
                    r#"
                    SELECT * FROM consumer
                    WHERE generator_id = $1 AND status = $2 AND id <> $3
                    ORDER BY created_at, id
                    "#,
                )
                .bind(id)
                .bind(ConsumerStatus::Allocated)
                .bind(consumer_id)
                .fetch_all(&mut *tx)
                .await?;
                rows_into(&rows).map_err(RepositoryError::Storage)?
            }
            None => Vec::new(),
        };

        let snapshot = AllocationSnapshot {
            consumer,
            target_generator,
            target_allocations,
        };
        let planned = plan(&snapshot)?;
        if planned.id != consumer_id || planned.version != snapshot.consumer.version {
            return Err(RepositoryError::Rejected(ApiError::InternalError(
                "Allocation plan returned a different consumer".to_string(),
            )));
        }
        if !planned.has_consistent_allocation() {
            return Err(RepositoryError::Rejected(ApiError::InternalError(
                "Allocation plan produced an inconsistent consumer".to_string(),
            )));
        }

        let saved = update_consumer_row(&mut *tx, planned).await?;
        tx.commit().await?;

        debug!(
            consumer_id = %consumer_id,
            generator_id = ?saved.generator_id,
            allocated_percentage = ?saved.allocated_percentage,
            "allocation applied"
        );
        Ok(AllocationAttempt::Applied(saved))
    }
}

#[async_trait]
impl ApplyAllocation for ConsumerRepositoryImpl {
    async fn apply_allocation(
        &self,
        consumer_id: Uuid,
        target_generator_id: Option<Uuid>,
        plan: &AllocationPlan,
    ) -> RepositoryResult<ConsumerModel> {
        Self::apply_allocation_impl(self, consumer_id, target_generator_id, plan).await
    }
}

#[cfg(test)]
mod tests {
    use crate::repository::generator_repository::test_utils::test_utils::create_test_generator;
    use crate::test_helper::setup_test_context;
    use rust_decimal::Decimal;
    use solar_core_api::domain::status::ConsumerStatus;
    use solar_core_api::error::ApiError;
    use solar_core_db::repository::create_batch::CreateBatch;
    use solar_core_db::repository::find_by_generator_id::FindByGeneratorId;
    use solar_core_db::repository::load_batch::LoadBatch;
    use solar_core_service::AllocationManager;
    use super::super::test_utils::test_utils::create_test_consumer;

    #[tokio::test]
    #[ignore = "requires PostgreSQL"]
    #[serial_test::serial]
    async fn test_allocate_and_reallocate() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let ctx = setup_test_context().await?;
        let repos = &ctx.repositories;
        let manager = AllocationManager::new(repos);

        let generators = repos
            .generators
            .create_batch(vec![create_test_generator(100), create_test_generator(100)])
            .await?;
        let consumer = repos
            .consumers
            .create_batch(vec![create_test_consumer(ConsumerStatus::Available)])
            .await?
            .remove(0);

        let allocated = manager.allocate(consumer.id, generators[0].id, Some(Decimal::from(40))).await?;
        assert_eq!(allocated.status, ConsumerStatus::Allocated);
        assert_eq!(allocated.generator_id, Some(generators[0].id));
        assert_eq!(allocated.version, 2);

        let moved = manager.reallocate(consumer.id, generators[1].id, Some(Decimal::from(25))).await?;
        assert_eq!(moved.generator_id, Some(generators[1].id));
        assert_eq!(moved.allocated_percentage, Some(Decimal::from(25)));
        assert!(repos.consumers.find_by_generator_id(generators[0].id).await?.is_empty());

        Ok(())
    }

    #[tokio::test]
    #[ignore = "requires PostgreSQL"]
    #[serial_test::serial]
    async fn test_rejected_plan_writes_nothing() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let ctx = setup_test_context().await?;
        let repos = &ctx.repositories;
        let manager = AllocationManager::new(repos);

        let generator = repos.generators.create_batch(vec![create_test_generator(100)]).await?.remove(0);
        let saved = repos
            .consumers
            .create_batch(vec![
                create_test_consumer(ConsumerStatus::Available),
                create_test_consumer(ConsumerStatus::Available),
            ])
            .await?;

        manager.allocate(saved[0].id, generator.id, Some(Decimal::from(70))).await?;
        let result = manager.allocate(saved[1].id, generator.id, Some(Decimal::from(31))).await;
        assert!(matches!(result, Err(ApiError::CapacityExceeded { .. })));

        let untouched = repos.consumers.load(saved[1].id).await?;
        assert_eq!(untouched.status, ConsumerStatus::Available);
        assert_eq!(untouched.generator_id, None);
        assert_eq!(untouched.version, 1);

        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    #[ignore = "requires PostgreSQL"]
    #[serial_test::serial]
    async fn test_concurrent_allocations_respect_capacity() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let ctx = setup_test_context().await?;
        let repos = ctx.repositories.clone();

        let generator = repos.generators.create_batch(vec![create_test_generator(100)]).await?.remove(0);
        let consumers = repos
            .consumers
            .create_batch((0..6).map(|_| create_test_consumer(ConsumerStatus::Available)).collect())
            .await?;

        let mut handles = Vec::new();
        for consumer in consumers {
            let manager = AllocationManager::new(&repos);
            let generator_id = generator.id;
            handles.push(tokio::spawn(async move {
                manager.allocate(consumer.id, generator_id, Some(Decimal::from(30))).await
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
        assert_eq!(succeeded, 3);

        let total: Decimal = repos
            .consumers
            .find_by_generator_id(generator.id)
            .await?
            .iter()
            .filter_map(|c| c.allocated_percentage)
            .sum();
        assert_eq!(total, Decimal::from(90));

        Ok(())
    }
}
