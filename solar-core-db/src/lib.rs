pub mod memory;
pub mod models;
pub mod repository;

pub use memory::MemoryRepositories;
pub use models::*;
pub use repository::*;
