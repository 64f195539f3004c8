use crate::core::config::SettlementConfig;
use crate::core::contract::{Contract, ContractId};
use crate::core::error::{Result, SettlementError};
use crate::core::job::Job;
use crate::core::profile::{Profile, ProfileId};
use crate::reporting::grouping::GroupTotals;
use crate::reporting::window::DateWindow;
use crate::store::{EntityStore, JobFilter, StoreView};
use log::debug;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// Earnings of one contractor profession over a window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfessionEarnings {
    pub profession: String,
    pub total: Decimal,
}

impl ProfessionEarnings {
    /// The leading profession of a breakdown taken over `window`.
    pub fn top(breakdown: &GroupTotals<String>, window: &DateWindow) -> Result<Self> {
        let (profession, total) = breakdown.max().ok_or_else(|| no_data(window))?;
        Ok(Self {
            profession: profession.clone(),
            total,
        })
    }
}

/// Amount one client paid for jobs over a window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientSpend {
    pub client_id: ProfileId,
    pub full_name: String,
    pub total_paid: Decimal,
}

/// Ranked financial reports over paid jobs.
///
/// Every report reads a single consistent snapshot of the store, so a
/// settlement committing mid-report is either fully visible or not at all.
pub struct ReportingAggregator<S> {
    store: Arc<S>,
    config: SettlementConfig,
}

impl<S: EntityStore> ReportingAggregator<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self::with_config(store, SettlementConfig::default())
    }

    pub fn with_config(store: Arc<S>, config: SettlementConfig) -> Self {
        Self { store, config }
    }

    /// The contractor profession that earned the most in `window`.
    ///
    /// Jobs are grouped in ascending contract-id order; on equal totals the
    /// profession reached first wins.
    ///
    /// # Errors
    ///
    /// `NoData` if no job was paid in the window.
    pub fn best_profession(&self, window: &DateWindow) -> Result<ProfessionEarnings> {
        let breakdown = self.profession_breakdown(window)?;
        let best = ProfessionEarnings::top(&breakdown, window)?;
        debug!(
            "best profession in {}: {} with {} ({} profession(s) earned)",
            window,
            best.profession,
            best.total,
            breakdown.len()
        );
        Ok(best)
    }

    /// Earnings per profession in `window`, in first-seen order.
    pub fn profession_breakdown(&self, window: &DateWindow) -> Result<GroupTotals<String>> {
        self.store.read(|view| {
            let mut totals = GroupTotals::new();
            let mut contractors = ProfileCache::default();
            for (job, contract) in paid_jobs(view, window)? {
                let contractor = contractors.get(view, contract.contractor_id())?;
                totals.add(contractor.profession().to_string(), job.price())?;
            }
            Ok(totals)
        })
    }

    /// Clients who paid the most in `window`, largest first.
    ///
    /// Returns at most `max(limit, min_best_clients)` entries; `None` uses
    /// the configured default limit. Equal totals are ordered by ascending
    /// client id.
    ///
    /// # Errors
    ///
    /// `NoData` if no job was paid in the window.
    pub fn best_clients(&self, window: &DateWindow, limit: Option<usize>) -> Result<Vec<ClientSpend>> {
        let limit = self.config.effective_client_limit(limit);

        let mut ranked = self.store.read(|view| {
            let mut totals: GroupTotals<ProfileId> = GroupTotals::new();
            for (job, contract) in paid_jobs(view, window)? {
                totals.add(contract.client_id(), job.price())?;
            }
            let mut clients = ProfileCache::default();
            totals
                .iter()
                .map(|(id, total)| {
                    Ok(ClientSpend {
                        client_id: *id,
                        full_name: clients.get(view, *id)?.full_name(),
                        total_paid: total,
                    })
                })
                .collect::<Result<Vec<_>>>()
        })?;

        if ranked.is_empty() {
            return Err(no_data(window));
        }
        ranked.sort_by(|a, b| {
            b.total_paid
                .cmp(&a.total_paid)
                .then_with(|| a.client_id.cmp(&b.client_id))
        });
        ranked.truncate(limit);
        Ok(ranked)
    }
}

fn no_data(window: &DateWindow) -> SettlementError {
    SettlementError::NoData {
        start: window.start(),
        end: window.end(),
    }
}

/// Jobs paid inside `window` with their contracts, in ascending
/// (contract id, job id) order.
fn paid_jobs(view: &dyn StoreView, window: &DateWindow) -> Result<Vec<(Job, Contract)>> {
    let mut jobs = view.find_jobs(&JobFilter::new().paid_between(window.start(), window.end()));
    jobs.sort_by_key(|job| (job.contract_id(), job.id()));

    let mut contracts: HashMap<ContractId, Contract> = HashMap::new();
    let mut rows = Vec::with_capacity(jobs.len());
    for job in jobs {
        let contract = match contracts.get(&job.contract_id()) {
            Some(contract) => contract.clone(),
            None => {
                let contract = view.find_contract(job.contract_id())?;
                contracts.insert(contract.id(), contract.clone());
                contract
            }
        };
        rows.push((job, contract));
    }
    Ok(rows)
}

#[derive(Default)]
struct ProfileCache {
    profiles: HashMap<ProfileId, Profile>,
}

impl ProfileCache {
    fn get(&mut self, view: &dyn StoreView, id: ProfileId) -> Result<&Profile> {
        if !self.profiles.contains_key(&id) {
            let profile = view.find_profile(id)?;
            self.profiles.insert(id, profile);
        }
        self.profiles
            .get(&id)
            .ok_or_else(|| SettlementError::profile_not_found(id))
    }
}
