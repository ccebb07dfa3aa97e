pub mod repo_impl;
pub mod kwh_price_settings;

pub use repo_impl::SettingsRepositoryImpl;
