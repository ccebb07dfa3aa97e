pub mod repo_impl;
pub mod create_active_commission;
pub mod load_batch;
pub mod update_batch;
pub mod find_by_consumer_id;
pub mod find_by_status;

pub use repo_impl::CommissionRepositoryImpl;
