use crate::core::contract::Contract;
use crate::core::error::{Result, SettlementError};
use crate::core::job::Job;
use crate::core::profile::Profile;
use crate::store::tables::{MarketplaceSnapshot, Tables};
use crate::store::unit_of_work::UnitOfWork;
use crate::store::{EntityStore, StoreView};
use std::sync::RwLock;

/// In-memory entity store guarded by a reader/writer lock.
///
/// Readers share the lock, so reports see a consistent snapshot. Units
/// of work take the write lock for their whole duration, which makes two
/// settlements of the same job strictly sequential: the second one sees
/// the first one's committed payment.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: MarketplaceSnapshot) -> Result<Self> {
        Ok(Self {
            tables: RwLock::new(Tables::from_snapshot(snapshot)?),
        })
    }

    pub fn snapshot(&self) -> Result<MarketplaceSnapshot> {
        let tables = self.tables.read().map_err(|_| poisoned())?;
        Ok(tables.to_snapshot())
    }

    pub fn insert_profile(&self, profile: Profile) -> Result<()> {
        self.tables.write().map_err(|_| poisoned())?.insert_profile(profile)
    }

    pub fn insert_contract(&self, contract: Contract) -> Result<()> {
        self.tables.write().map_err(|_| poisoned())?.insert_contract(contract)
    }

    pub fn insert_job(&self, job: Job) -> Result<()> {
        self.tables.write().map_err(|_| poisoned())?.insert_job(job)
    }
}

fn poisoned() -> SettlementError {
    log::warn!("entity store lock poisoned");
    SettlementError::StoreUnavailable("lock poisoned".to_string())
}

impl EntityStore for InMemoryStore {
    fn read<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&dyn StoreView) -> Result<T>,
    {
        let tables = self.tables.read().map_err(|_| poisoned())?;
        f(&*tables)
    }

    fn transact<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut UnitOfWork<'_>) -> Result<T>,
    {
        let mut tables = self.tables.write().map_err(|_| poisoned())?;
        let (value, changes) = {
            let mut uow = UnitOfWork::new(&*tables);
            let value = f(&mut uow)?;
            (value, uow.into_changes())
        };
        if !changes.is_empty() {
            log::debug!(
                "committing {} balance update(s), {} payment(s)",
                changes.balances.len(),
                changes.payments.len()
            );
        }
        tables.apply(changes);
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::contract::{ContractId, ContractStatus};
    use crate::core::job::JobId;
    use crate::core::profile::{ProfileId, ProfileKind};
    use rust_decimal_macros::dec;

    fn store() -> InMemoryStore {
        let store = InMemoryStore::new();
        store
            .insert_profile(
                Profile::new(ProfileId::new(1), "Mr", "Robot", "Hacker", ProfileKind::Client)
                    .with_balance(dec!(231.11)),
            )
            .unwrap();
        store
            .insert_profile(Profile::new(ProfileId::new(7), "Alan", "Turing", "Programmer", ProfileKind::Contractor))
            .unwrap();
        store
            .insert_contract(Contract::new(ContractId::new(1), ProfileId::new(1), ProfileId::new(7), ContractStatus::InProgress))
            .unwrap();
        store
            .insert_job(Job::new(JobId::new(1), ContractId::new(1), dec!(200)))
            .unwrap();
        store
    }

    #[test]
    fn test_commit_on_ok() {
        let store = store();
        store
            .transact(|uow| {
                uow.adjust_balance(ProfileId::new(1), dec!(-200))?;
                uow.adjust_balance(ProfileId::new(7), dec!(200))?;
                uow.mark_job_paid(JobId::new(1), chrono::Utc::now())
            })
            .unwrap();

        let snapshot = store.snapshot().unwrap();
        assert_eq!(snapshot.profiles[0].balance(), dec!(31.11));
        assert_eq!(snapshot.profiles[1].balance(), dec!(200));
        assert!(snapshot.jobs[0].is_paid());
    }

    #[test]
    fn test_discard_on_err() {
        let store = store();
        let result: Result<()> = store.transact(|uow| {
            uow.adjust_balance(ProfileId::new(7), dec!(500))?;
            uow.mark_job_paid(JobId::new(1), chrono::Utc::now())?;
            // fails after two staged mutations
            uow.adjust_balance(ProfileId::new(1), dec!(-500))?;
            Ok(())
        });
        assert!(result.is_err());

        let snapshot = store.snapshot().unwrap();
        assert_eq!(snapshot.profiles[0].balance(), dec!(231.11));
        assert_eq!(snapshot.profiles[1].balance(), dec!(0));
        assert!(!snapshot.jobs[0].is_paid());
    }

    #[test]
    fn test_read_sees_committed_state() {
        let store = store();
        let balance = store
            .read(|view| Ok(view.find_profile(ProfileId::new(1))?.balance()))
            .unwrap();
        assert_eq!(balance, dec!(231.11));
    }
}
