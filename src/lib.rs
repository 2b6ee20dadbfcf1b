pub mod address;
pub mod chain;
pub mod config;
pub mod digest;
pub mod distribute;
pub mod error;
pub mod eth;
pub mod outcome;
pub mod payout;
pub mod settlement;
pub mod store;
pub mod types;

pub use error::{BatchError, SettlementError};
pub use outcome::SettlementOutcome;
pub use settlement::{BatchReport, Settler};
