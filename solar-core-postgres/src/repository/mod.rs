pub mod change_request_repository;
pub mod commission_repository;
pub mod consumer_repository;
pub mod generator_repository;
pub mod settings_repository;

pub use change_request_repository::ChangeRequestRepositoryImpl;
pub use commission_repository::CommissionRepositoryImpl;
pub use consumer_repository::ConsumerRepositoryImpl;
pub use generator_repository::GeneratorRepositoryImpl;
pub use settings_repository::SettingsRepositoryImpl;
