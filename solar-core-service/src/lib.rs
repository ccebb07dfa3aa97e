pub mod allocation;
pub mod approval;
pub mod capacity;
pub mod change_request;
pub mod commission;
pub mod commission_lifecycle;
pub mod consumer;
mod fields;
pub mod generator;
pub mod services;
pub mod settings;

#[cfg(test)]
mod test_support;

pub use allocation::AllocationManager;
pub use approval::{ApprovalOutcome, ApprovalWorkflow};
pub use capacity::CapacityLedger;
pub use change_request::ChangeRequestWorkflow;
pub use commission::{
    BatchGenerationReport, BatchItemResult, CommissionAttempt, CommissionCalculator, CommissionGeneration,
    NotGeneratedReason,
};
pub use commission_lifecycle::CommissionLifecycle;
pub use consumer::{ConsumerService, NewConsumer};
pub use generator::{GeneratorService, GeneratorView, NewGenerator};
pub use services::SolarServices;
pub use settings::{CachedKwhPriceProvider, DEFAULT_PRICE_CACHE_TTL};
