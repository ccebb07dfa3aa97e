pub mod repo_impl;
pub mod create_batch;
pub mod load_batch;
pub mod update_batch;
pub mod delete_batch;
pub mod find_by_generator_id;
pub mod find_by_status;
pub mod apply_allocation;

pub use repo_impl::ConsumerRepositoryImpl;
