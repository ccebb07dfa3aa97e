pub mod repo_impl;
pub mod create_batch;
pub mod load_batch;
pub mod find_by_consumer_id;
pub mod find_by_status;
pub mod resolve_change_request;

pub use repo_impl::ChangeRequestRepositoryImpl;
