//! Entity store: record lookups, filtered queries, and all-or-nothing
//! units of work over profiles, contracts and jobs.
//!
//! Engines never hold a global handle to the store. They receive an
//! [`EntityStore`] at construction and go through [`EntityStore::read`]
//! for consistent snapshots and [`EntityStore::transact`] for mutations.

pub mod filter;
pub mod memory;
pub mod tables;
pub mod unit_of_work;

use crate::core::contract::{Contract, ContractId};
use crate::core::error::Result;
use crate::core::job::{Job, JobId};
use crate::core::profile::{Profile, ProfileId};

pub use filter::{ContractFilter, JobFilter, Party};
pub use memory::InMemoryStore;
pub use tables::{MarketplaceSnapshot, Tables};
pub use unit_of_work::{Changeset, UnitOfWork};

/// Read access to the store's records.
///
/// Every query returns owned records in ascending id order.
pub trait StoreView {
    fn find_profile(&self, id: ProfileId) -> Result<Profile>;

    fn find_contract(&self, id: ContractId) -> Result<Contract>;

    fn find_job(&self, id: JobId) -> Result<Job>;

    fn find_contracts(&self, filter: &ContractFilter) -> Vec<Contract>;

    fn find_jobs(&self, filter: &JobFilter) -> Vec<Job>;
}

/// A transactional store of marketplace records.
pub trait EntityStore: Send + Sync {
    /// Run `f` against a consistent snapshot. No mutation is observed
    /// while `f` runs.
    fn read<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&dyn StoreView) -> Result<T>;

    /// Run `f` as a single unit of work.
    ///
    /// Mutations staged on the [`UnitOfWork`] are committed together if
    /// `f` returns `Ok`, and discarded if it returns `Err`. Units of work
    /// are serialized against each other and against readers.
    fn transact<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut UnitOfWork<'_>) -> Result<T>;
}
