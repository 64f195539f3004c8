//! # marketplace-settlement
//!
//! Settlement and reporting engine for a client/contractor job marketplace.
//!
//! Clients fund balances, contractors are paid when jobs are settled, and
//! administrators rank earnings over time windows. Money only moves inside
//! all-or-nothing units of work, a job is paid at most once, and deposits
//! are capped by what the client currently owes.
//!
//! ## Architecture
//!
//! - **core** — Records (profiles, contracts, jobs), errors, configuration
//! - **store** — Entity store interface, units of work, in-memory store
//! - **settlement** — Job payments and capped deposits
//! - **reporting** — Best profession and best clients over a date window
//! - **facade** — Boundary operations for an authenticated caller
//! - **simulation** — Random marketplace generation

pub mod core;
pub mod facade;
pub mod reporting;
pub mod settlement;
pub mod simulation;
pub mod store;

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::core::config::SettlementConfig;
    pub use crate::core::contract::{Contract, ContractId, ContractStatus};
    pub use crate::core::error::SettlementError;
    pub use crate::core::job::{Job, JobId};
    pub use crate::core::profile::{Profile, ProfileId, ProfileKind};
    pub use crate::facade::{AccessFacade, Rejection, RejectionKind};
    pub use crate::reporting::{ClientSpend, DateWindow, ProfessionEarnings, ReportingAggregator};
    pub use crate::settlement::{PaymentOutcome, SettlementEngine, SettlementReceipt};
    pub use crate::store::{EntityStore, InMemoryStore, MarketplaceSnapshot, StoreView};
}
