//! In-memory repositories.
//!
//! Every operation runs under one mutex, which gives the same guarantees the
//! Postgres implementation gets from row locks and unique indexes: allocation
//! changes are serialized, at most one active commission and one pending
//! change request exist per consumer, and stale versions are refused.

mod records;
mod store;

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use uuid::Uuid;

use crate::models::change_request::ChangeRequestModel;
use crate::models::commission::CommissionModel;
use crate::models::consumer::ConsumerModel;
use crate::models::generator::GeneratorModel;
use crate::models::kwh_price::KwhPriceModel;
use crate::repository::Repositories;

/// Tables behind [`MemoryRepositories`].
#[derive(Debug, Default)]
pub struct MemoryState {
    generators: HashMap<Uuid, GeneratorModel>,
    consumers: HashMap<Uuid, ConsumerModel>,
    commissions: HashMap<Uuid, CommissionModel>,
    change_requests: HashMap<Uuid, ChangeRequestModel>,
    kwh_prices: Vec<KwhPriceModel>,
}

#[derive(Debug, Default)]
pub struct MemoryRepositories {
    state: Mutex<MemoryState>,
}

impl MemoryRepositories {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps the store in a [`Repositories`] bundle; every handle shares it.
    pub fn into_repositories(self) -> Repositories {
        let shared = Arc::new(self);
        Repositories {
            generators: shared.clone(),
            consumers: shared.clone(),
            commissions: shared.clone(),
            change_requests: shared.clone(),
            settings: shared,
        }
    }
}
