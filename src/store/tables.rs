use crate::core::contract::{Contract, ContractId};
use crate::core::error::{Entity, Result, SettlementError};
use crate::core::job::{Job, JobId};
use crate::core::profile::{Profile, ProfileId, ProfileKind};
use crate::store::filter::{ContractFilter, JobFilter};
use crate::store::unit_of_work::Changeset;
use crate::store::StoreView;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The full contents of a marketplace, as loaded from or saved to JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketplaceSnapshot {
    #[serde(default)]
    pub profiles: Vec<Profile>,
    #[serde(default)]
    pub contracts: Vec<Contract>,
    #[serde(default)]
    pub jobs: Vec<Job>,
}

impl MarketplaceSnapshot {
    /// Sum of every profile balance.
    pub fn total_balance(&self) -> Decimal {
        self.profiles.iter().map(|p| p.balance()).sum()
    }
}

/// Committed records, keyed by id.
///
/// `BTreeMap` keeps every scan in ascending id order, which the reports
/// depend on for deterministic tie-breaking.
#[derive(Debug, Clone, Default)]
pub struct Tables {
    profiles: BTreeMap<ProfileId, Profile>,
    contracts: BTreeMap<ContractId, Contract>,
    jobs: BTreeMap<JobId, Job>,
}

impl Tables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build tables from a snapshot, checking every record on the way in.
    pub fn from_snapshot(snapshot: MarketplaceSnapshot) -> Result<Self> {
        let mut tables = Self::new();
        for profile in snapshot.profiles {
            tables.insert_profile(profile)?;
        }
        for contract in snapshot.contracts {
            tables.insert_contract(contract)?;
        }
        for job in snapshot.jobs {
            tables.insert_job(job)?;
        }
        Ok(tables)
    }

    pub fn to_snapshot(&self) -> MarketplaceSnapshot {
        MarketplaceSnapshot {
            profiles: self.profiles.values().cloned().collect(),
            contracts: self.contracts.values().cloned().collect(),
            jobs: self.jobs.values().cloned().collect(),
        }
    }

    pub fn insert_profile(&mut self, profile: Profile) -> Result<()> {
        let id = profile.id();
        if self.profiles.contains_key(&id) {
            return Err(invalid(Entity::Profile, id.get(), "duplicate id"));
        }
        if profile.balance() < Decimal::ZERO {
            return Err(invalid(Entity::Profile, id.get(), "negative balance"));
        }
        self.profiles.insert(id, profile);
        Ok(())
    }

    pub fn insert_contract(&mut self, contract: Contract) -> Result<()> {
        let id = contract.id();
        if self.contracts.contains_key(&id) {
            return Err(invalid(Entity::Contract, id.get(), "duplicate id"));
        }
        self.expect_kind(contract.client_id(), ProfileKind::Client, id)?;
        self.expect_kind(contract.contractor_id(), ProfileKind::Contractor, id)?;
        self.contracts.insert(id, contract);
        Ok(())
    }

    pub fn insert_job(&mut self, job: Job) -> Result<()> {
        let id = job.id();
        if self.jobs.contains_key(&id) {
            return Err(invalid(Entity::Job, id.get(), "duplicate id"));
        }
        if job.price() <= Decimal::ZERO {
            return Err(invalid(Entity::Job, id.get(), "price must be positive"));
        }
        match (job.is_paid(), job.payment_date()) {
            (true, None) => return Err(invalid(Entity::Job, id.get(), "paid without a payment date")),
            (false, Some(_)) => {
                return Err(invalid(Entity::Job, id.get(), "payment date set on an unpaid job"))
            }
            _ => {}
        }
        if !self.contracts.contains_key(&job.contract_id()) {
            return Err(invalid(
                Entity::Job,
                id.get(),
                &format!("unknown contract {}", job.contract_id()),
            ));
        }
        self.jobs.insert(id, job);
        Ok(())
    }

    /// Apply a validated changeset. Cannot fail part-way.
    pub(crate) fn apply(&mut self, changes: Changeset) {
        for (id, balance) in changes.balances {
            if let Some(profile) = self.profiles.get_mut(&id) {
                profile.set_balance(balance);
            }
        }
        for (id, date) in changes.payments {
            if let Some(job) = self.jobs.get_mut(&id) {
                job.mark_paid(date);
            }
        }
    }

    fn expect_kind(&self, profile: ProfileId, kind: ProfileKind, contract: ContractId) -> Result<()> {
        match self.profiles.get(&profile) {
            Some(p) if p.kind() == kind => Ok(()),
            Some(p) => Err(invalid(
                Entity::Contract,
                contract.get(),
                &format!("profile {} is a {}, expected a {}", profile, p.kind(), kind),
            )),
            None => Err(invalid(
                Entity::Contract,
                contract.get(),
                &format!("unknown profile {}", profile),
            )),
        }
    }
}

fn invalid(entity: Entity, id: u64, reason: &str) -> SettlementError {
    SettlementError::InvalidRecord {
        entity,
        id,
        reason: reason.to_string(),
    }
}

impl StoreView for Tables {
    fn find_profile(&self, id: ProfileId) -> Result<Profile> {
        self.profiles
            .get(&id)
            .cloned()
            .ok_or_else(|| SettlementError::profile_not_found(id))
    }

    fn find_contract(&self, id: ContractId) -> Result<Contract> {
        self.contracts
            .get(&id)
            .cloned()
            .ok_or_else(|| SettlementError::contract_not_found(id))
    }

    fn find_job(&self, id: JobId) -> Result<Job> {
        self.jobs
            .get(&id)
            .cloned()
            .ok_or_else(|| SettlementError::job_not_found(id))
    }

    fn find_contracts(&self, filter: &ContractFilter) -> Vec<Contract> {
        self.contracts
            .values()
            .filter(|c| filter.matches(c))
            .cloned()
            .collect()
    }

    fn find_jobs(&self, filter: &JobFilter) -> Vec<Job> {
        self.jobs
            .values()
            .filter(|job| {
                self.contracts
                    .get(&job.contract_id())
                    .map(|contract| filter.matches(job, contract))
                    .unwrap_or(false)
            })
            .cloned()
            .collect()
    }
}
