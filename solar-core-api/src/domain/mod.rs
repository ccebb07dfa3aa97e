pub mod capacity;
pub mod change_set;
pub mod commission;
pub mod payment_proof;
pub mod percentage;
pub mod status;

pub use capacity::*;
pub use change_set::*;
pub use commission::*;
pub use payment_proof::*;
pub use percentage::*;
pub use status::*;
