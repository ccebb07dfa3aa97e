use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::debug;
use uuid::Uuid;

use solar_core_api::error::ApiError;

use crate::memory::records::{
    check_replace, insert_new, replace, sort_by_creation, MemoryRecord, OwnedByConsumer, WithStatus,
};
use crate::memory::MemoryRepositories;
use crate::models::change_request::ChangeRequestModel;
use crate::models::commission::CommissionModel;
use crate::models::consumer::ConsumerModel;
use crate::models::kwh_price::KwhPriceModel;
use crate::repository::{
    AllocationPlan, AllocationSnapshot, ApplyAllocation, CreateActiveCommission, CreateBatch,
    DeleteBatch, ExistByIds, FindByConsumerId, FindByGeneratorId, FindByStatus, KwhPriceSettings,
    ListPage, LoadBatch, Page, PageRequest, RepositoryError, RepositoryResult,
    ResolveChangeRequest, UpdateBatch,
};

#[async_trait]
impl<T: MemoryRecord> CreateBatch<T> for MemoryRepositories {
    async fn create_batch(&self, items: Vec<T>) -> RepositoryResult<Vec<T>> {
        let mut state = self.state.lock();
        let mut created = Vec::with_capacity(items.len());
        for item in items {
            match insert_new(&mut state, item) {
                Ok(saved) => created.push(saved),
                Err(e) => {
                    for saved in &created {
                        T::table_mut(&mut state).remove(&saved.get_id());
                    }
                    return Err(e);
                }
            }
        }
        Ok(created)
    }
}

#[async_trait]
impl<T: MemoryRecord> LoadBatch<T> for MemoryRepositories {
    async fn load_batch(&self, ids: &[Uuid]) -> RepositoryResult<Vec<Option<T>>> {
        let state = self.state.lock();
        let table = T::table(&state);
        Ok(ids.iter().map(|id| table.get(id).cloned()).collect())
    }
}

#[async_trait]
impl<T: MemoryRecord> UpdateBatch<T> for MemoryRepositories {
    async fn update_batch(&self, items: Vec<T>) -> RepositoryResult<Vec<T>> {
        let mut state = self.state.lock();
        for item in &items {
            check_replace(&state, item)?;
        }
        Ok(items.into_iter().map(|item| replace(&mut state, item)).collect())
    }
}

#[async_trait]
impl<T: MemoryRecord> DeleteBatch<T> for MemoryRepositories {
    async fn delete_batch(&self, ids: &[Uuid]) -> RepositoryResult<usize> {
        let mut state = self.state.lock();
        let mut deleted = 0;
        for id in ids {
            if T::table(&state).contains_key(id) {
                T::on_delete(*id, &mut state)?;
                T::table_mut(&mut state).remove(id);
                deleted += 1;
            }
        }
        Ok(deleted)
    }
}

#[async_trait]
impl<T: MemoryRecord> ExistByIds<T> for MemoryRepositories {
    async fn exist_by_ids(&self, ids: &[Uuid]) -> RepositoryResult<Vec<(Uuid, bool)>> {
        let state = self.state.lock();
        let table = T::table(&state);
        Ok(ids.iter().map(|id| (*id, table.contains_key(id))).collect())
    }
}

#[async_trait]
impl<T: MemoryRecord> ListPage<T> for MemoryRepositories {
    async fn list_page(&self, request: PageRequest) -> RepositoryResult<Page<T>> {
        let mut all: Vec<T> = T::table(&self.state.lock()).values().cloned().collect();
        sort_by_creation(&mut all);
        Ok(request.slice(&all))
    }
}

#[async_trait]
impl<T: MemoryRecord + WithStatus> FindByStatus<T, T::Status> for MemoryRepositories {
    async fn find_by_status(&self, statuses: &[T::Status]) -> RepositoryResult<Vec<T>> {
        let mut found: Vec<T> = T::table(&self.state.lock())
            .values()
            .filter(|item| statuses.contains(&item.status()))
            .cloned()
            .collect();
        sort_by_creation(&mut found);
        Ok(found)
    }
}

#[async_trait]
impl<T: MemoryRecord + OwnedByConsumer> FindByConsumerId<T> for MemoryRepositories {
    async fn find_by_consumer_id(&self, consumer_id: Uuid) -> RepositoryResult<Vec<T>> {
        let mut found: Vec<T> = T::table(&self.state.lock())
            .values()
            .filter(|item| item.consumer_id() == consumer_id)
            .cloned()
            .collect();
        sort_by_creation(&mut found);
        Ok(found)
    }
}

#[async_trait]
impl FindByGeneratorId<ConsumerModel> for MemoryRepositories {
    async fn find_by_generator_id(&self, generator_id: Uuid) -> RepositoryResult<Vec<ConsumerModel>> {
        let mut found: Vec<ConsumerModel> = self
            .state
            .lock()
            .consumers
            .values()
            .filter(|c| c.generator_id == Some(generator_id))
            .cloned()
            .collect();
        sort_by_creation(&mut found);
        Ok(found)
    }
}

#[async_trait]
impl ApplyAllocation for MemoryRepositories {
    async fn apply_allocation(
        &self,
        consumer_id: Uuid,
        target_generator_id: Option<Uuid>,
        plan: &AllocationPlan,
    ) -> RepositoryResult<ConsumerModel> {
        let mut state = self.state.lock();

        let consumer = state
            .consumers
            .get(&consumer_id)
            .cloned()
            .ok_or(RepositoryError::NotFound(consumer_id))?;
        let target_generator = match target_generator_id {
            Some(id) => Some(
                state
                    .generators
                    .get(&id)
                    .cloned()
                    .ok_or(RepositoryError::NotFound(id))?,
            ),
            None => None,
        };
        let mut target_allocations: Vec<ConsumerModel> = match target_generator_id {
            Some(generator_id) => state
                .consumers
                .values()
                .filter(|c| c.id != consumer_id && c.allocation_on(generator_id).is_some())
                .cloned()
                .collect(),
            None => Vec::new(),
        };
        sort_by_creation(&mut target_allocations);

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
        check_replace(&state, &planned)?;

        debug!(
            consumer_id = %consumer_id,
            generator_id = ?planned.generator_id,
            allocated_percentage = ?planned.allocated_percentage,
            "allocation applied"
        );
        Ok(replace(&mut state, planned))
    }
}

#[async_trait]
impl CreateActiveCommission for MemoryRepositories {
    async fn create_active_commission(&self, commission: CommissionModel) -> RepositoryResult<CommissionModel> {
        insert_new(&mut self.state.lock(), commission)
    }
}

#[async_trait]
impl ResolveChangeRequest for MemoryRepositories {
    async fn resolve_change_request(
        &self,
        request: ChangeRequestModel,
        consumer: Option<ConsumerModel>,
    ) -> RepositoryResult<(ChangeRequestModel, Option<ConsumerModel>)> {
        let mut state = self.state.lock();
        check_replace(&state, &request)?;
        if let Some(consumer) = &consumer {
            if consumer.id != request.consumer_id {
                return Err(RepositoryError::Rejected(ApiError::InternalError(
                    "Change request resolved against another consumer".to_string(),
                )));
            }
            check_replace(&state, consumer)?;
        }
        let request = replace(&mut state, request);
        let consumer = consumer.map(|c| replace(&mut state, c));
        Ok((request, consumer))
    }
}

#[async_trait]
impl KwhPriceSettings for MemoryRepositories {
    async fn current_kwh_price(&self) -> RepositoryResult<Option<Decimal>> {
        Ok(self
            .state
            .lock()
            .kwh_prices
            .iter()
            .max_by_key(|entry| entry.effective_from)
            .map(|entry| entry.price))
    }

    async fn set_kwh_price(&self, price: Decimal, effective_from: DateTime<Utc>) -> RepositoryResult<KwhPriceModel> {
        let entry = KwhPriceModel {
            id: Uuid::new_v4(),
            price,
            effective_from,
        };
        self.state.lock().kwh_prices.push(entry.clone());
        Ok(entry)
    }

    async fn kwh_price_history(&self, limit: usize) -> RepositoryResult<Vec<KwhPriceModel>> {
        let mut history = self.state.lock().kwh_prices.clone();
        history.reverse();
        history.sort_by(|a, b| b.effective_from.cmp(&a.effective_from));
        history.truncate(limit);
        Ok(history)
    }
}
