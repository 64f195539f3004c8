use crate::core::config::SettlementConfig;
use crate::core::contract::ContractStatus;
use crate::core::error::{Entity, Result, SettlementError};
use crate::core::job::JobId;
use crate::core::profile::ProfileId;
use crate::settlement::receipt::{PaymentOutcome, SettlementReceipt};
use crate::store::{ContractFilter, EntityStore, JobFilter, Party, StoreView};
use chrono::Utc;
use log::{debug, info};
use rust_decimal::Decimal;
use std::sync::Arc;
use uuid::Uuid;

/// Moves money between profiles.
///
/// Every operation runs as one unit of work on the injected store: either
/// all of its balance updates and payment marks commit, or none do.
pub struct SettlementEngine<S> {
    store: Arc<S>,
    config: SettlementConfig,
}

impl<S: EntityStore> SettlementEngine<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self::with_config(store, SettlementConfig::default())
    }

    pub fn with_config(store: Arc<S>, config: SettlementConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &SettlementConfig {
        &self.config
    }

    /// Pay for a job on behalf of `caller`.
    ///
    /// Returns `true` if funds moved. Returns `false` without touching any
    /// balance when the job is already paid or the caller cannot cover the
    /// price.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the job (or a record it points to) does not exist.
    /// - `Forbidden` if `caller` is not the client on the job's contract.
    /// - `ContractNotActive` if the contract is not `in_progress`.
    pub fn pay_job(&self, caller: ProfileId, job: JobId) -> Result<bool> {
        Ok(self.settle_job(caller, job)?.is_settled())
    }

    /// Same as [`pay_job`](Self::pay_job), reporting the full outcome.
    pub fn settle_job(&self, caller: ProfileId, job_id: JobId) -> Result<PaymentOutcome> {
        let settled_at = Utc::now();

        let outcome = self.store.transact(|uow| {
            let job = uow.find_job(job_id)?;
            let contract = uow.find_contract(job.contract_id())?;

            if contract.client_id() != caller {
                return Err(SettlementError::Forbidden {
                    caller,
                    entity: Entity::Job,
                    id: job_id.get(),
                });
            }
            if job.is_paid() {
                return Ok(PaymentOutcome::AlreadyPaid);
            }
            if !contract.status().is_active() {
                return Err(SettlementError::ContractNotActive {
                    id: contract.id(),
                    status: contract.status(),
                });
            }

            let balance = uow.find_profile(caller)?.balance();
            let price = job.price();
            if balance < price {
                return Ok(PaymentOutcome::InsufficientFunds { balance, price });
            }

            let client_balance = uow.adjust_balance(caller, -price)?;
            let contractor_balance = uow.adjust_balance(contract.contractor_id(), price)?;
            uow.mark_job_paid(job_id, settled_at)?;

            Ok(PaymentOutcome::Settled(SettlementReceipt {
                id: Uuid::new_v4(),
                job_id,
                contract_id: contract.id(),
                client_id: caller,
                contractor_id: contract.contractor_id(),
                amount: price,
                settled_at,
                client_balance,
                contractor_balance,
            }))
        })?;

        match &outcome {
            PaymentOutcome::Settled(receipt) => info!(
                "settled job {} for {}: profile {} -> profile {} (receipt {})",
                receipt.job_id, receipt.amount, receipt.client_id, receipt.contractor_id, receipt.id
            ),
            PaymentOutcome::AlreadyPaid => info!("job {} already paid, nothing to do", job_id),
            PaymentOutcome::InsufficientFunds { balance, price } => debug!(
                "profile {} cannot pay job {}: balance {} < price {}",
                caller, job_id, balance, price
            ),
        }
        Ok(outcome)
    }

    /// Credit `amount` to a client's balance, bounded by the deposit cap.
    ///
    /// The cap is `deposit_cap_ratio` times the client's outstanding
    /// obligations, computed in the same unit of work as the credit so two
    /// concurrent deposits cannot both pass against a stale total.
    ///
    /// Returns the new balance.
    pub fn deposit(&self, caller: ProfileId, target: ProfileId, amount: Decimal) -> Result<Decimal> {
        if amount <= Decimal::ZERO {
            return Err(SettlementError::InvalidAmount(amount));
        }
        let ratio = self.config.deposit_cap_ratio;

        let balance = self.store.transact(|uow| {
            let outstanding = outstanding_for_client(&*uow, target)?;
            let cap = cap_for(outstanding, ratio)?;
            if amount > cap {
                return Err(SettlementError::DepositExceedsCap {
                    requested: amount,
                    cap,
                    outstanding,
                });
            }
            uow.adjust_balance(target, amount)
        })?;

        info!(
            "profile {} deposited {} to client {}, balance now {}",
            caller, amount, target, balance
        );
        Ok(balance)
    }

    /// Sum of prices of the client's unpaid jobs on `in_progress` contracts.
    pub fn outstanding_obligation(&self, client: ProfileId) -> Result<Decimal> {
        self.store.read(|view| outstanding_for_client(view, client))
    }

    /// Largest amount a single deposit to `client` may currently be.
    pub fn deposit_cap(&self, client: ProfileId) -> Result<Decimal> {
        cap_for(self.outstanding_obligation(client)?, self.config.deposit_cap_ratio)
    }
}

fn outstanding_for_client(view: &dyn StoreView, client: ProfileId) -> Result<Decimal> {
    let profile = view.find_profile(client)?;
    if !profile.is_client() {
        return Err(SettlementError::NotAClient(client));
    }
    let filter = JobFilter::new()
        .contract(
            ContractFilter::new()
                .party(Party::Client(client))
                .status(ContractStatus::InProgress),
        )
        .paid(false);
    view.find_jobs(&filter)
        .iter()
        .try_fold(Decimal::ZERO, |total, job| total.checked_add(job.price()))
        .ok_or_else(|| {
            SettlementError::Overflow(format!("outstanding obligations of client {}", client))
        })
}

fn cap_for(outstanding: Decimal, ratio: Decimal) -> Result<Decimal> {
    outstanding
        .checked_mul(ratio)
        .ok_or_else(|| SettlementError::Overflow(format!("deposit cap {} x {}", outstanding, ratio)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::contract::{Contract, ContractId};
    use crate::core::job::Job;
    use crate::core::profile::{Profile, ProfileKind};
    use crate::store::InMemoryStore;
    use rust_decimal_macros::dec;

    const CLIENT: ProfileId = ProfileId::new(1);
    const OTHER_CLIENT: ProfileId = ProfileId::new(2);
    const CONTRACTOR: ProfileId = ProfileId::new(5);

    /// Client 1 (balance 150) has an in_progress contract 1 with unpaid jobs
    /// of 100 and 100, a terminated contract 2 with an unpaid job of 300,
    /// and a new contract 3 with an unpaid job of 50.
    fn marketplace() -> Arc<InMemoryStore> {
        let store = InMemoryStore::new();
        store
            .insert_profile(
                Profile::new(CLIENT, "Harry", "Potter", "Wizard", ProfileKind::Client)
                    .with_balance(dec!(150)),
            )
            .unwrap();
        store
            .insert_profile(
                Profile::new(OTHER_CLIENT, "Mr", "Robot", "Hacker", ProfileKind::Client)
                    .with_balance(dec!(1000)),
            )
            .unwrap();
        store
            .insert_profile(
                Profile::new(CONTRACTOR, "John", "Lenon", "Musician", ProfileKind::Contractor)
                    .with_balance(dec!(64)),
            )
            .unwrap();
        for (id, status) in [
            (1, ContractStatus::InProgress),
            (2, ContractStatus::Terminated),
            (3, ContractStatus::New),
        ] {
            store
                .insert_contract(Contract::new(ContractId::new(id), CLIENT, CONTRACTOR, status))
                .unwrap();
        }
        for (id, contract, price) in [(1, 1, dec!(100)), (2, 1, dec!(100)), (3, 2, dec!(300)), (4, 3, dec!(50))] {
            store
                .insert_job(Job::new(JobId::new(id), ContractId::new(contract), price))
                .unwrap();
        }
        Arc::new(store)
    }

    fn balance(store: &InMemoryStore, id: ProfileId) -> Decimal {
        store.read(|v| Ok(v.find_profile(id)?.balance())).unwrap()
    }

    #[test]
    fn test_pay_job_moves_money() {
        let store = marketplace();
        let engine = SettlementEngine::new(store.clone());

        let outcome = engine.settle_job(CLIENT, JobId::new(1)).unwrap();
        let receipt = outcome.receipt().unwrap();
        assert_eq!(receipt.amount, dec!(100));
        assert_eq!(receipt.client_balance, dec!(50));
        assert_eq!(receipt.contractor_balance, dec!(164));

        assert_eq!(balance(&store, CLIENT), dec!(50));
        assert_eq!(balance(&store, CONTRACTOR), dec!(164));
        let job = store.read(|v| v.find_job(JobId::new(1))).unwrap();
        assert!(job.is_paid());
        assert_eq!(job.payment_date(), Some(receipt.settled_at));
    }

    #[test]
    fn test_pay_job_twice_pays_once() {
        let store = marketplace();
        let engine = SettlementEngine::new(store.clone());

        assert!(engine.pay_job(CLIENT, JobId::new(1)).unwrap());
        assert!(!engine.pay_job(CLIENT, JobId::new(1)).unwrap());
        assert_eq!(
            engine.settle_job(CLIENT, JobId::new(1)).unwrap(),
            PaymentOutcome::AlreadyPaid
        );
        assert_eq!(balance(&store, CLIENT), dec!(50));
        assert_eq!(balance(&store, CONTRACTOR), dec!(164));
    }

    #[test]
    fn test_insufficient_funds_changes_nothing() {
        let store = marketplace();
        let engine = SettlementEngine::new(store.clone());

        assert!(engine.pay_job(CLIENT, JobId::new(1)).unwrap());
        // 50 left, job 2 costs 100
        let outcome = engine.settle_job(CLIENT, JobId::new(2)).unwrap();
        assert_eq!(
            outcome,
            PaymentOutcome::InsufficientFunds {
                balance: dec!(50),
                price: dec!(100)
            }
        );
        assert_eq!(balance(&store, CLIENT), dec!(50));
        let job = store.read(|v| v.find_job(JobId::new(2))).unwrap();
        assert!(!job.is_paid());
    }

    #[test]
    fn test_exact_balance_is_enough() {
        let store = marketplace();
        store
            .transact(|uow| uow.adjust_balance(CLIENT, dec!(-50)).map(|_| ()))
            .unwrap();
        let engine = SettlementEngine::new(store.clone());
        assert!(engine.pay_job(CLIENT, JobId::new(1)).unwrap());
        assert_eq!(balance(&store, CLIENT), Decimal::ZERO);
    }

    #[test]
    fn test_only_the_client_may_pay() {
        let engine = SettlementEngine::new(marketplace());
        for caller in [OTHER_CLIENT, CONTRACTOR] {
            assert!(matches!(
                engine.pay_job(caller, JobId::new(1)),
                Err(SettlementError::Forbidden { .. })
            ));
        }
    }

    #[test]
    fn test_unknown_job() {
        let engine = SettlementEngine::new(marketplace());
        assert_eq!(
            engine.pay_job(CLIENT, JobId::new(99)),
            Err(SettlementError::job_not_found(JobId::new(99)))
        );
    }

    #[test]
    fn test_inactive_contract_not_payable() {
        let store = marketplace();
        let engine = SettlementEngine::new(store.clone());
        for job in [3, 4] {
            assert!(matches!(
                engine.pay_job(CLIENT, JobId::new(job)),
                Err(SettlementError::ContractNotActive { .. })
            ));
        }
        assert_eq!(balance(&store, CLIENT), dec!(150));
    }

    #[test]
    fn test_outstanding_counts_active_unpaid_only() {
        let engine = SettlementEngine::new(marketplace());
        assert_eq!(engine.outstanding_obligation(CLIENT).unwrap(), dec!(200));
        assert_eq!(engine.deposit_cap(CLIENT).unwrap(), dec!(50));

        engine.pay_job(CLIENT, JobId::new(1)).unwrap();
        assert_eq!(engine.outstanding_obligation(CLIENT).unwrap(), dec!(100));
    }

    #[test]
    fn test_deposit_cap_boundary() {
        let store = marketplace();
        let engine = SettlementEngine::new(store.clone());

        let err = engine.deposit(CLIENT, CLIENT, dec!(51)).unwrap_err();
        assert_eq!(
            err,
            SettlementError::DepositExceedsCap {
                requested: dec!(51),
                cap: dec!(50),
                outstanding: dec!(200),
            }
        );
        assert_eq!(balance(&store, CLIENT), dec!(150));

        assert_eq!(engine.deposit(CLIENT, CLIENT, dec!(50)).unwrap(), dec!(200));
        assert_eq!(balance(&store, CLIENT), dec!(200));
    }

    #[test]
    fn test_deposit_without_obligations_rejected() {
        let engine = SettlementEngine::new(marketplace());
        assert!(matches!(
            engine.deposit(OTHER_CLIENT, OTHER_CLIENT, dec!(0.01)),
            Err(SettlementError::DepositExceedsCap { .. })
        ));
    }

    #[test]
    fn test_deposit_rejects_bad_targets_and_amounts() {
        let engine = SettlementEngine::new(marketplace());
        assert_eq!(
            engine.deposit(CLIENT, CONTRACTOR, dec!(1)),
            Err(SettlementError::NotAClient(CONTRACTOR))
        );
        assert_eq!(
            engine.deposit(CLIENT, ProfileId::new(42), dec!(1)),
            Err(SettlementError::profile_not_found(ProfileId::new(42)))
        );
        assert_eq!(
            engine.deposit(CLIENT, CLIENT, dec!(0)),
            Err(SettlementError::InvalidAmount(dec!(0)))
        );
    }

    #[test]
    fn test_configured_ratio() {
        let config = SettlementConfig {
            deposit_cap_ratio: dec!(0.5),
            ..Default::default()
        };
        let engine = SettlementEngine::with_config(marketplace(), config);
        assert_eq!(engine.deposit(CLIENT, CLIENT, dec!(100)).unwrap(), dec!(250));
    }

    #[test]
    fn test_credit_overflow_is_rejected_and_store_survives() {
        let store = marketplace();
        let rich = ProfileId::new(6);
        store
            .insert_profile(
                Profile::new(rich, "Scrooge", "McDuck", "Banker", ProfileKind::Contractor)
                    .with_balance(Decimal::MAX),
            )
            .unwrap();
        store
            .insert_contract(Contract::new(ContractId::new(4), CLIENT, rich, ContractStatus::InProgress))
            .unwrap();
        store
            .insert_job(Job::new(JobId::new(5), ContractId::new(4), dec!(5)))
            .unwrap();
        let engine = SettlementEngine::new(store.clone());

        assert!(matches!(
            engine.pay_job(CLIENT, JobId::new(5)),
            Err(SettlementError::Overflow(_))
        ));
        // nothing committed, and the store is still usable
        assert_eq!(balance(&store, CLIENT), dec!(150));
        assert_eq!(balance(&store, rich), Decimal::MAX);
        assert!(!store.read(|v| v.find_job(JobId::new(5))).unwrap().is_paid());
        assert_eq!(engine.outstanding_obligation(CLIENT).unwrap(), dec!(205));
        assert!(engine.pay_job(CLIENT, JobId::new(1)).unwrap());
    }

    #[test]
    fn test_outstanding_overflow_is_rejected() {
        let store = marketplace();
        for id in [5, 6] {
            store
                .insert_job(Job::new(JobId::new(id), ContractId::new(1), Decimal::MAX))
                .unwrap();
        }
        let engine = SettlementEngine::new(store.clone());

        assert!(matches!(
            engine.outstanding_obligation(CLIENT),
            Err(SettlementError::Overflow(_))
        ));
        assert!(matches!(
            engine.deposit(CLIENT, CLIENT, dec!(1)),
            Err(SettlementError::Overflow(_))
        ));
        assert!(matches!(
            engine.deposit_cap(CLIENT),
            Err(SettlementError::Overflow(_))
        ));
        assert_eq!(balance(&store, CLIENT), dec!(150));
        assert!(engine.pay_job(CLIENT, JobId::new(1)).unwrap());
    }
}
