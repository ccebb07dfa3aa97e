use solar_core_db::repository::Repositories;
use sqlx::PgPool;
use std::sync::Arc;

use crate::config::{DatabaseConfig, DEFAULT_ALLOCATION_RETRY_ATTEMPTS};
use crate::repository::{
    ChangeRequestRepositoryImpl, CommissionRepositoryImpl, ConsumerRepositoryImpl,
    GeneratorRepositoryImpl, SettingsRepositoryImpl,
};

/// Builds the PostgreSQL repositories over one shared pool.
///
/// Each repository call runs in its own transaction; operations that must be
/// atomic across tables (allocation, change-request resolution, price
/// updates) open a single transaction inside the repository.
pub struct PostgresRepositories {
    pool: Arc<PgPool>,
    allocation_retry_attempts: u32,
}

impl PostgresRepositories {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self {
            pool,
            allocation_retry_attempts: DEFAULT_ALLOCATION_RETRY_ATTEMPTS,
        }
    }

    pub fn from_config(pool: Arc<PgPool>, config: &DatabaseConfig) -> Self {
        Self::new(pool).with_allocation_retry_attempts(config.allocation_retry_attempts)
    }

    pub fn with_allocation_retry_attempts(mut self, attempts: u32) -> Self {
        self.allocation_retry_attempts = attempts;
        self
    }

    pub fn create_generator_repository(&self) -> Arc<GeneratorRepositoryImpl> {
        Arc::new(GeneratorRepositoryImpl::new(self.pool.clone()))
    }

    pub fn create_consumer_repository(&self) -> Arc<ConsumerRepositoryImpl> {
        Arc::new(ConsumerRepositoryImpl::new(self.pool.clone(), self.allocation_retry_attempts))
    }

    pub fn create_commission_repository(&self) -> Arc<CommissionRepositoryImpl> {
        Arc::new(CommissionRepositoryImpl::new(self.pool.clone()))
    }

    pub fn create_change_request_repository(&self) -> Arc<ChangeRequestRepositoryImpl> {
        Arc::new(ChangeRequestRepositoryImpl::new(self.pool.clone()))
    }

    pub fn create_settings_repository(&self) -> Arc<SettingsRepositoryImpl> {
        Arc::new(SettingsRepositoryImpl::new(self.pool.clone()))
    }

    /// Applies pending migrations from `migrations/`.
    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!().run(&*self.pool).await
    }

    /// Create all repositories sharing the pool
    pub fn create_all_repositories(&self) -> Repositories {
        Repositories {
            generators: self.create_generator_repository(),
            consumers: self.create_consumer_repository(),
            commissions: self.create_commission_repository(),
            change_requests: self.create_change_request_repository(),
            settings: self.create_settings_repository(),
        }
    }
}
