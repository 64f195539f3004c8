//! The operations exposed to the request layer.
//!
//! Callers arrive already authenticated: every operation takes the
//! resolved caller [`Profile`]. Domain errors leave as [`Rejection`]s.

pub mod rejection;

use crate::core::config::SettlementConfig;
use crate::core::contract::{Contract, ContractId, ContractStatus};
use crate::core::error::{Entity, SettlementError};
use crate::core::job::{Job, JobId};
use crate::core::profile::{Profile, ProfileId};
use crate::reporting::{ClientSpend, DateWindow, ProfessionEarnings, ReportingAggregator};
use crate::settlement::SettlementEngine;
use crate::store::{ContractFilter, EntityStore, JobFilter, Party};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::sync::Arc;

pub use rejection::{Rejection, RejectionKind};

pub type FacadeResult<T> = Result<T, Rejection>;

/// Dispatches boundary operations to the store, the settlement engine and
/// the reports.
pub struct AccessFacade<S> {
    store: Arc<S>,
    settlement: SettlementEngine<S>,
    reports: ReportingAggregator<S>,
}

impl<S: EntityStore> AccessFacade<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self::with_config(store, SettlementConfig::default())
    }

    pub fn with_config(store: Arc<S>, config: SettlementConfig) -> Self {
        Self {
            settlement: SettlementEngine::with_config(store.clone(), config.clone()),
            reports: ReportingAggregator::with_config(store.clone(), config),
            store,
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// A contract the caller is party to, as client or contractor.
    pub fn get_contract(&self, caller: &Profile, id: ContractId) -> FacadeResult<Contract> {
        let contract = self.store.read(|view| view.find_contract(id))?;
        if !contract.involves(caller.id()) {
            return Err(SettlementError::Forbidden {
                caller: caller.id(),
                entity: Entity::Contract,
                id: id.get(),
            }
            .into());
        }
        Ok(contract)
    }

    /// The caller's contracts that are not terminated.
    pub fn list_active_contracts(&self, caller: &Profile) -> FacadeResult<Vec<Contract>> {
        let filter = ContractFilter::new()
            .party(Party::Any(caller.id()))
            .excluding(ContractStatus::Terminated);
        Ok(self.store.read(|view| Ok(view.find_contracts(&filter)))?)
    }

    /// Unpaid jobs on the caller's `in_progress` contracts.
    pub fn list_unpaid_jobs(&self, caller: &Profile) -> FacadeResult<Vec<Job>> {
        let filter = JobFilter::new()
            .contract(
                ContractFilter::new()
                    .party(Party::Any(caller.id()))
                    .status(ContractStatus::InProgress),
            )
            .paid(false);
        Ok(self.store.read(|view| Ok(view.find_jobs(&filter)))?)
    }

    pub fn pay_job(&self, caller: &Profile, job: JobId) -> FacadeResult<bool> {
        Ok(self.settlement.pay_job(caller.id(), job)?)
    }

    pub fn deposit(&self, caller: &Profile, target: ProfileId, amount: Decimal) -> FacadeResult<Decimal> {
        Ok(self.settlement.deposit(caller.id(), target, amount)?)
    }

    pub fn best_profession(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> FacadeResult<ProfessionEarnings> {
        let window = DateWindow::new(start, end)?;
        Ok(self.reports.best_profession(&window)?)
    }

    /// `limit` falls back to the configured default when absent.
    pub fn best_clients(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        limit: Option<usize>,
    ) -> FacadeResult<Vec<ClientSpend>> {
        let window = DateWindow::new(start, end)?;
        Ok(self.reports.best_clients(&window, limit)?)
    }

    pub fn settlement(&self) -> &SettlementEngine<S> {
        &self.settlement
    }

    pub fn reports(&self) -> &ReportingAggregator<S> {
        &self.reports
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::profile::ProfileKind;
    use crate::store::InMemoryStore;
    use rust_decimal_macros::dec;

    fn profile(id: u64, kind: ProfileKind) -> Profile {
        Profile::new(ProfileId::new(id), "First", "Last", "Trade", kind).with_balance(dec!(500))
    }

    fn facade() -> AccessFacade<InMemoryStore> {
        let store = InMemoryStore::new();
        for id in [1, 2] {
            store.insert_profile(profile(id, ProfileKind::Client)).unwrap();
        }
        store.insert_profile(profile(5, ProfileKind::Contractor)).unwrap();
        for (id, client, status) in [
            (1, 1, ContractStatus::Terminated),
            (2, 1, ContractStatus::InProgress),
            (3, 2, ContractStatus::New),
        ] {
            store
                .insert_contract(Contract::new(
                    ContractId::new(id),
                    ProfileId::new(client),
                    ProfileId::new(5),
                    status,
                ))
                .unwrap();
        }
        for (id, contract) in [(1, 1), (2, 2), (3, 2), (4, 3)] {
            store
                .insert_job(Job::new(JobId::new(id), ContractId::new(contract), dec!(100)))
                .unwrap();
        }
        AccessFacade::new(Arc::new(store))
    }

    #[test]
    fn test_get_contract_ownership() {
        let facade = facade();
        let client = profile(1, ProfileKind::Client);
        let contractor = profile(5, ProfileKind::Contractor);
        let stranger = profile(2, ProfileKind::Client);

        assert!(facade.get_contract(&client, ContractId::new(1)).is_ok());
        assert!(facade.get_contract(&contractor, ContractId::new(1)).is_ok());
        assert_eq!(
            facade.get_contract(&stranger, ContractId::new(1)).unwrap_err().status,
            403
        );
        assert_eq!(
            facade.get_contract(&client, ContractId::new(9)).unwrap_err().kind,
            RejectionKind::NotFound
        );
    }

    #[test]
    fn test_active_contracts_exclude_terminated() {
        let facade = facade();
        let ids: Vec<_> = facade
            .list_active_contracts(&profile(1, ProfileKind::Client))
            .unwrap()
            .iter()
            .map(|c| c.id())
            .collect();
        assert_eq!(ids, vec![ContractId::new(2)]);

        let contractor_view = facade
            .list_active_contracts(&profile(5, ProfileKind::Contractor))
            .unwrap();
        assert_eq!(contractor_view.len(), 2);
    }

    #[test]
    fn test_unpaid_jobs_only_on_in_progress() {
        let facade = facade();
        let client = profile(1, ProfileKind::Client);
        let first = facade.list_unpaid_jobs(&client).unwrap();
        let ids: Vec<_> = first.iter().map(|j| j.id()).collect();
        assert_eq!(ids, vec![JobId::new(2), JobId::new(3)]);
        assert_eq!(facade.list_unpaid_jobs(&client).unwrap(), first);

        assert!(facade.pay_job(&client, JobId::new(2)).unwrap());
        let ids: Vec<_> = facade
            .list_unpaid_jobs(&client)
            .unwrap()
            .iter()
            .map(|j| j.id())
            .collect();
        assert_eq!(ids, vec![JobId::new(3)]);
    }

    #[test]
    fn test_errors_become_rejections() {
        let facade = facade();
        let client = profile(1, ProfileKind::Client);
        assert_eq!(facade.pay_job(&client, JobId::new(1)).unwrap_err().status, 409);
        assert_eq!(facade.pay_job(&client, JobId::new(4)).unwrap_err().status, 403);
        assert_eq!(
            facade
                .deposit(&client, ProfileId::new(1), dec!(1000))
                .unwrap_err()
                .kind,
            RejectionKind::DepositExceedsCap
        );
        let now = Utc::now();
        assert_eq!(
            facade.best_profession(now, now - chrono::Duration::days(1)).unwrap_err().status,
            400
        );
        assert_eq!(facade.best_clients(now, now, Some(1)).unwrap_err().kind, RejectionKind::NoData);
    }

    #[test]
    fn test_deposit_within_cap() {
        let facade = facade();
        let client = profile(1, ProfileKind::Client);
        // outstanding 200 on contract 2
        assert_eq!(
            facade.deposit(&client, ProfileId::new(1), dec!(50)).unwrap(),
            dec!(550)
        );
    }
}
