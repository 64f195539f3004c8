//! Random marketplace generation for demos, benchmarks and tests.

use crate::core::contract::{Contract, ContractId, ContractStatus};
use crate::core::job::{Job, JobId};
use crate::core::profile::{Profile, ProfileId, ProfileKind};
use crate::store::MarketplaceSnapshot;
use chrono::{DateTime, Duration, TimeZone, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

const FIRST_NAMES: &[&str] = &["Harry", "Ash", "John", "Linus", "Alan", "Ada", "Grace", "Mr"];
const LAST_NAMES: &[&str] = &["Potter", "Kethcum", "Snow", "Torvalds", "Turing", "Lovelace", "Hopper", "Robot"];

/// Configuration for generating a random marketplace.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketplaceConfig {
    pub client_count: usize,
    pub contractor_count: usize,
    /// Contracts opened by each client.
    pub contracts_per_client: usize,
    pub jobs_per_contract: usize,
    /// Professions handed out to contractors round-robin.
    pub professions: Vec<String>,
    /// Probability that a generated job is already paid.
    pub paid_ratio: f64,
    /// Price range in whole units.
    pub min_price: u64,
    pub max_price: u64,
    /// Opening client balance range in whole units.
    pub min_balance: u64,
    pub max_balance: u64,
    /// Payment dates of paid jobs fall in this range.
    pub history_start: DateTime<Utc>,
    pub history_days: i64,
}

impl Default for MarketplaceConfig {
    fn default() -> Self {
        Self {
            client_count: 4,
            contractor_count: 4,
            contracts_per_client: 2,
            jobs_per_contract: 3,
            professions: ["Programmer", "Musician", "Fighter", "Wizard"]
                .iter()
                .map(|p| p.to_string())
                .collect(),
            paid_ratio: 0.5,
            min_price: 20,
            max_price: 2_000,
            min_balance: 0,
            max_balance: 2_000,
            history_start: Utc
                .with_ymd_and_hms(2020, 8, 1, 0, 0, 0)
                .single()
                .unwrap_or_default(),
            history_days: 30,
        }
    }
}

/// Generate a random, internally consistent marketplace.
///
/// Profile ids are `1..=clients` for clients followed by contractors;
/// contract and job ids are sequential from 1.
pub fn generate_marketplace(config: &MarketplaceConfig) -> MarketplaceSnapshot {
    let mut rng = rand::thread_rng();
    let mut snapshot = MarketplaceSnapshot::default();

    let min_price = config.min_price.max(1);
    let max_price = config.max_price.max(min_price);
    let max_balance = config.max_balance.max(config.min_balance);

    let mut next_profile = 1u64;
    let mut clients = Vec::with_capacity(config.client_count);
    for _ in 0..config.client_count {
        let id = ProfileId::new(next_profile);
        next_profile += 1;
        let balance = Decimal::from(rng.gen_range(config.min_balance..=max_balance));
        snapshot.profiles.push(
            Profile::new(id, pick(&mut rng, FIRST_NAMES), pick(&mut rng, LAST_NAMES), "Client", ProfileKind::Client)
                .with_balance(balance),
        );
        clients.push(id);
    }

    let mut contractors = Vec::with_capacity(config.contractor_count);
    for i in 0..config.contractor_count {
        let id = ProfileId::new(next_profile);
        next_profile += 1;
        let profession = config
            .professions
            .get(i % config.professions.len().max(1))
            .cloned()
            .unwrap_or_else(|| "Contractor".to_string());
        snapshot.profiles.push(Profile::new(
            id,
            pick(&mut rng, FIRST_NAMES),
            pick(&mut rng, LAST_NAMES),
            profession,
            ProfileKind::Contractor,
        ));
        contractors.push(id);
    }

    if contractors.is_empty() {
        return snapshot;
    }

    let statuses = [
        ContractStatus::InProgress,
        ContractStatus::InProgress,
        ContractStatus::New,
        ContractStatus::Terminated,
    ];
    let mut next_contract = 1u64;
    let mut next_job = 1u64;
    for client in &clients {
        for _ in 0..config.contracts_per_client {
            let contract_id = ContractId::new(next_contract);
            next_contract += 1;
            let contractor = contractors[rng.gen_range(0..contractors.len())];
            let status = *statuses.choose(&mut rng).unwrap_or(&ContractStatus::InProgress);
            snapshot.contracts.push(
                Contract::new(contract_id, *client, contractor, status)
                    .with_terms(format!("contract {} terms", contract_id)),
            );

            for _ in 0..config.jobs_per_contract {
                let price = Decimal::from(rng.gen_range(min_price..=max_price));
                let mut job = Job::new(JobId::new(next_job), contract_id, price)
                    .with_description("work");
                next_job += 1;
                if rng.gen_bool(config.paid_ratio.clamp(0.0, 1.0)) {
                    let offset = rng.gen_range(0..config.history_days.max(1) * 86_400);
                    job = job.paid_at(config.history_start + Duration::seconds(offset));
                }
                snapshot.jobs.push(job);
            }
        }
    }

    snapshot
}

fn pick<R: Rng>(rng: &mut R, pool: &[&str]) -> String {
    pool.choose(rng).copied().unwrap_or("Anonymous").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Tables;

    #[test]
    fn test_generated_marketplace_is_consistent() {
        let config = MarketplaceConfig {
            client_count: 5,
            contractor_count: 3,
            contracts_per_client: 2,
            jobs_per_contract: 4,
            ..Default::default()
        };

        let snapshot = generate_marketplace(&config);
        assert_eq!(snapshot.profiles.len(), 8);
        assert_eq!(snapshot.contracts.len(), 10);
        assert_eq!(snapshot.jobs.len(), 40);
        // passes every referential check
        assert!(Tables::from_snapshot(snapshot).is_ok());
    }

    #[test]
    fn test_paid_jobs_inside_history() {
        let config = MarketplaceConfig {
            paid_ratio: 1.0,
            ..Default::default()
        };
        let end = config.history_start + Duration::days(config.history_days);
        let snapshot = generate_marketplace(&config);
        for job in &snapshot.jobs {
            let date = job.payment_date().unwrap();
            assert!(date >= config.history_start && date < end);
        }
    }

    #[test]
    fn test_no_contractors_means_no_contracts() {
        let config = MarketplaceConfig {
            contractor_count: 0,
            ..Default::default()
        };
        let snapshot = generate_marketplace(&config);
        assert!(snapshot.contracts.is_empty());
        assert!(snapshot.jobs.is_empty());
    }
}
