//! Job payments and capped deposits.

pub mod engine;
pub mod receipt;

pub use engine::SettlementEngine;
pub use receipt::{PaymentOutcome, SettlementReceipt};
