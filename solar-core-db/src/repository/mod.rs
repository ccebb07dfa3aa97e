pub mod apply_allocation;
pub mod create_active_commission;
pub mod create_batch;
pub mod delete_batch;
pub mod error;
pub mod exist_by_ids;
pub mod find_by_consumer_id;
pub mod find_by_generator_id;
pub mod find_by_status;
pub mod kwh_price_settings;
pub mod list_page;
pub mod load_batch;
pub mod pagination;
pub mod repositories;
pub mod resolve_change_request;
pub mod update_batch;

pub use apply_allocation::*;
pub use create_active_commission::*;
pub use create_batch::*;
pub use delete_batch::*;
pub use error::*;
pub use exist_by_ids::*;
pub use find_by_consumer_id::*;
pub use find_by_generator_id::*;
pub use find_by_status::*;
pub use kwh_price_settings::*;
pub use list_page::*;
pub use load_batch::*;
pub use pagination::*;
pub use repositories::*;
pub use resolve_change_request::*;
pub use update_batch::*;
