use crate::core::contract::{Contract, ContractId};
use crate::core::error::{Result, SettlementError};
use crate::core::job::{Job, JobId};
use crate::core::profile::{Profile, ProfileId};
use crate::store::filter::{ContractFilter, JobFilter};
use crate::store::StoreView;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// Mutations staged by a unit of work, ready to be committed together.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Changeset {
    /// Profile -> balance after the unit of work.
    pub(crate) balances: BTreeMap<ProfileId, Decimal>,
    /// Job -> payment date.
    pub(crate) payments: BTreeMap<JobId, DateTime<Utc>>,
}

impl Changeset {
    pub fn is_empty(&self) -> bool {
        self.balances.is_empty() && self.payments.is_empty()
    }

    pub fn balance(&self, profile: ProfileId) -> Option<Decimal> {
        self.balances.get(&profile).copied()
    }

    pub fn payment(&self, job: JobId) -> Option<DateTime<Utc>> {
        self.payments.get(&job).copied()
    }
}

/// A request-scoped transaction over the entity store.
///
/// Reads see committed records with this unit's own staged mutations
/// applied on top. Every mutation primitive validates before staging, so
/// committing the resulting [`Changeset`] cannot fail part-way.
pub struct UnitOfWork<'a> {
    base: &'a dyn StoreView,
    changes: Changeset,
}

impl<'a> UnitOfWork<'a> {
    pub fn new(base: &'a dyn StoreView) -> Self {
        Self {
            base,
            changes: Changeset::default(),
        }
    }

    /// Add `delta` (which may be negative) to a profile's balance.
    ///
    /// Returns the staged balance. Fails with `NegativeBalance` rather than
    /// stage a balance below zero.
    pub fn adjust_balance(&mut self, profile: ProfileId, delta: Decimal) -> Result<Decimal> {
        let current = self.find_profile(profile)?.balance();
        let updated = current.checked_add(delta).ok_or_else(|| {
            SettlementError::Overflow(format!("balance {} of profile {} plus {}", current, profile, delta))
        })?;
        if updated < Decimal::ZERO {
            return Err(SettlementError::NegativeBalance {
                profile,
                balance: updated,
            });
        }
        self.changes.balances.insert(profile, updated);
        Ok(updated)
    }

    /// Flip a job to paid. Fails with `Conflict` if it is already paid.
    pub fn mark_job_paid(&mut self, job: JobId, payment_date: DateTime<Utc>) -> Result<()> {
        if self.find_job(job)?.is_paid() {
            return Err(SettlementError::Conflict(job));
        }
        self.changes.payments.insert(job, payment_date);
        Ok(())
    }

    pub fn changes(&self) -> &Changeset {
        &self.changes
    }

    pub fn into_changes(self) -> Changeset {
        self.changes
    }

    fn overlay_job(&self, mut job: Job) -> Job {
        if let Some(date) = self.changes.payment(job.id()) {
            job.mark_paid(date);
        }
        job
    }
}

impl StoreView for UnitOfWork<'_> {
    fn find_profile(&self, id: ProfileId) -> Result<Profile> {
        let mut profile = self.base.find_profile(id)?;
        if let Some(balance) = self.changes.balance(id) {
            profile.set_balance(balance);
        }
        Ok(profile)
    }

    fn find_contract(&self, id: ContractId) -> Result<Contract> {
        self.base.find_contract(id)
    }

    fn find_job(&self, id: JobId) -> Result<Job> {
        self.base.find_job(id).map(|job| self.overlay_job(job))
    }

    fn find_contracts(&self, filter: &ContractFilter) -> Vec<Contract> {
        self.base.find_contracts(filter)
    }

    fn find_jobs(&self, filter: &JobFilter) -> Vec<Job> {
        self.base
            .find_jobs(&filter.contract_only())
            .into_iter()
            .map(|job| self.overlay_job(job))
            .filter(|job| filter.matches_job(job))
            .collect()
    }
}
