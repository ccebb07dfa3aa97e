pub mod identifiable;
pub mod versioned;
pub mod generator;
pub mod consumer;
pub mod commission;
pub mod change_request;
pub mod kwh_price;

// Re-exports
pub use identifiable::*;
pub use versioned::*;
pub use generator::*;
pub use consumer::*;
pub use commission::*;
pub use change_request::*;
pub use kwh_price::*;
