use std::collections::HashMap;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use solar_core_api::domain::status::{ChangeRequestStatus, CommissionStatus, ConsumerStatus};
use solar_core_api::error::ApiError;

use crate::memory::MemoryState;
use crate::models::change_request::ChangeRequestModel;
use crate::models::commission::CommissionModel;
use crate::models::consumer::ConsumerModel;
use crate::models::generator::GeneratorModel;
use crate::models::versioned::Versioned;
use crate::repository::error::{RepositoryError, RepositoryResult};

/// A model stored in one of the [`MemoryState`] tables.
pub trait MemoryRecord: Versioned + Clone + Send + Sync + 'static {
    const ENTITY: &'static str;

    fn table(state: &MemoryState) -> &HashMap<Uuid, Self>;
    fn table_mut(state: &mut MemoryState) -> &mut HashMap<Uuid, Self>;
    fn set_version(&mut self, version: i32);
    fn created_at(&self) -> DateTime<Utc>;

    /// Unique keys beyond the primary key.
    fn check_unique(&self, _state: &MemoryState) -> RepositoryResult<()> {
        Ok(())
    }

    /// Foreign keys checked before deletion.
    fn on_delete(_id: Uuid, _state: &mut MemoryState) -> RepositoryResult<()> {
        Ok(())
    }
}

pub trait WithStatus {
    type Status: PartialEq + Copy + Send + Sync + 'static;

    fn status(&self) -> Self::Status;
}

pub trait OwnedByConsumer {
    fn consumer_id(&self) -> Uuid;
}

impl MemoryRecord for GeneratorModel {
    const ENTITY: &'static str = "generator";

    fn table(state: &MemoryState) -> &HashMap<Uuid, Self> {
        &state.generators
    }

    fn table_mut(state: &mut MemoryState) -> &mut HashMap<Uuid, Self> {
        &mut state.generators
    }

    fn set_version(&mut self, version: i32) {
        self.version = version;
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn on_delete(id: Uuid, state: &mut MemoryState) -> RepositoryResult<()> {
        if state.consumers.values().any(|c| c.generator_id == Some(id)) {
            return Err(RepositoryError::Rejected(ApiError::InvalidState(format!(
                "Generator {id} is still referenced by consumers"
            ))));
        }
        Ok(())
    }
}

impl MemoryRecord for ConsumerModel {
    const ENTITY: &'static str = "consumer";

    fn table(state: &MemoryState) -> &HashMap<Uuid, Self> {
        &state.consumers
    }

    fn table_mut(state: &mut MemoryState) -> &mut HashMap<Uuid, Self> {
        &mut state.consumers
    }

    fn set_version(&mut self, version: i32) {
        self.version = version;
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn check_unique(&self, state: &MemoryState) -> RepositoryResult<()> {
        if let Some(generator_id) = self.generator_id {
            if !state.generators.contains_key(&generator_id) {
                return Err(RepositoryError::Rejected(ApiError::not_found("Generator", generator_id)));
            }
        }
        Ok(())
    }

    fn on_delete(id: Uuid, state: &mut MemoryState) -> RepositoryResult<()> {
        let referenced = state.commissions.values().any(|c| c.consumer_id == id)
            || state.change_requests.values().any(|r| r.consumer_id == id);
        if referenced {
            return Err(RepositoryError::Rejected(ApiError::InvalidState(format!(
                "Consumer {id} is still referenced by commissions or change requests"
            ))));
        }
        Ok(())
    }
}

impl MemoryRecord for CommissionModel {
    const ENTITY: &'static str = "commission";

    fn table(state: &MemoryState) -> &HashMap<Uuid, Self> {
        &state.commissions
    }

    fn table_mut(state: &mut MemoryState) -> &mut HashMap<Uuid, Self> {
        &mut state.commissions
    }

    fn set_version(&mut self, version: i32) {
        self.version = version;
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn check_unique(&self, state: &MemoryState) -> RepositoryResult<()> {
        if !state.consumers.contains_key(&self.consumer_id) {
            return Err(RepositoryError::Rejected(ApiError::not_found("Consumer", self.consumer_id)));
        }
        let duplicate = self.is_active()
            && state
                .commissions
                .values()
                .any(|c| c.id != self.id && c.consumer_id == self.consumer_id && c.is_active());
        if duplicate {
            return Err(RepositoryError::UniqueViolation(format!(
                "Consumer {} already has an active commission",
                self.consumer_id
            )));
        }
        Ok(())
    }
}

impl MemoryRecord for ChangeRequestModel {
    const ENTITY: &'static str = "change request";

    fn table(state: &MemoryState) -> &HashMap<Uuid, Self> {
        &state.change_requests
    }

    fn table_mut(state: &mut MemoryState) -> &mut HashMap<Uuid, Self> {
        &mut state.change_requests
    }

    fn set_version(&mut self, version: i32) {
        self.version = version;
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.requested_at
    }

    fn check_unique(&self, state: &MemoryState) -> RepositoryResult<()> {
        if !state.consumers.contains_key(&self.consumer_id) {
            return Err(RepositoryError::Rejected(ApiError::not_found("Consumer", self.consumer_id)));
        }
        let duplicate = self.status == ChangeRequestStatus::Pending
            && state.change_requests.values().any(|r| {
                r.id != self.id && r.consumer_id == self.consumer_id && r.status == ChangeRequestStatus::Pending
            });
        if duplicate {
            return Err(RepositoryError::UniqueViolation(format!(
                "Consumer {} already has a pending change request",
                self.consumer_id
            )));
        }
        Ok(())
    }
}

impl WithStatus for ConsumerModel {
    type Status = ConsumerStatus;

    fn status(&self) -> ConsumerStatus {
        self.status
    }
}

impl WithStatus for CommissionModel {
    type Status = CommissionStatus;

    fn status(&self) -> CommissionStatus {
        self.status
    }
}

impl WithStatus for ChangeRequestModel {
    type Status = ChangeRequestStatus;

    fn status(&self) -> ChangeRequestStatus {
        self.status
    }
}

impl OwnedByConsumer for CommissionModel {
    fn consumer_id(&self) -> Uuid {
        self.consumer_id
    }
}

impl OwnedByConsumer for ChangeRequestModel {
    fn consumer_id(&self) -> Uuid {
        self.consumer_id
    }
}

/// Sorts by creation time, then id.
pub(crate) fn sort_by_creation<T: MemoryRecord>(items: &mut [T]) {
    items.sort_by(|a, b| {
        a.created_at()
            .cmp(&b.created_at())
            .then_with(|| a.get_id().cmp(&b.get_id()))
    });
}

pub(crate) fn insert_new<T: MemoryRecord>(state: &mut MemoryState, mut item: T) -> RepositoryResult<T> {
    let id = item.get_id();
    if T::table(state).contains_key(&id) {
        return Err(RepositoryError::UniqueViolation(format!("{} {id} already exists", T::ENTITY)));
    }
    item.check_unique(state)?;
    item.set_version(1);
    T::table_mut(state).insert(id, item.clone());
    Ok(item)
}

/// Checks that `item` may replace the stored row. Does not write.
pub(crate) fn check_replace<T: MemoryRecord>(state: &MemoryState, item: &T) -> RepositoryResult<()> {
    let id = item.get_id();
    let stored = T::table(state).get(&id).ok_or(RepositoryError::NotFound(id))?;
    if stored.get_version() != item.get_version() {
        return Err(RepositoryError::ConcurrentModification { entity: T::ENTITY, id });
    }
    item.check_unique(state)
}

pub(crate) fn replace<T: MemoryRecord>(state: &mut MemoryState, mut item: T) -> T {
    item.set_version(item.get_version() + 1);
    T::table_mut(state).insert(item.get_id(), item.clone());
    item
}
