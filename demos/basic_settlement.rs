//! Basic settlement and reporting example.
//!
//! Walks a tiny marketplace through a deposit, a job payment and the two
//! admin reports.

use chrono::{Duration, Utc};
use marketplace_settlement::prelude::*;
use rust_decimal_macros::dec;
use std::sync::Arc;

fn main() {
    println!("╔════════════════════════════════════════════════╗");
    println!("║  marketplace-settlement: Basic Settlement Demo  ║");
    println!("╚════════════════════════════════════════════════╝\n");

    let store = InMemoryStore::new();
    let ada = Profile::new(ProfileId::new(1), "Ada", "Lovelace", "Mathematician", ProfileKind::Client)
        .with_balance(dec!(100));
    let linus = Profile::new(ProfileId::new(2), "Linus", "Torvalds", "Programmer", ProfileKind::Contractor);
    let grace = Profile::new(ProfileId::new(3), "Grace", "Hopper", "Admiral", ProfileKind::Contractor);
    for profile in [ada.clone(), linus, grace] {
        store.insert_profile(profile).unwrap();
    }
    store
        .insert_contract(
            Contract::new(ContractId::new(1), ProfileId::new(1), ProfileId::new(2), ContractStatus::InProgress)
                .with_terms("kernel work"),
        )
        .unwrap();
    store
        .insert_contract(Contract::new(
            ContractId::new(2),
            ProfileId::new(1),
            ProfileId::new(3),
            ContractStatus::InProgress,
        ))
        .unwrap();
    store.insert_job(Job::new(JobId::new(1), ContractId::new(1), dec!(120)).with_description("scheduler")).unwrap();
    store.insert_job(Job::new(JobId::new(2), ContractId::new(1), dec!(40)).with_description("docs")).unwrap();
    store.insert_job(Job::new(JobId::new(3), ContractId::new(2), dec!(80)).with_description("compiler")).unwrap();

    let facade = AccessFacade::new(Arc::new(store));

    // --- Scenario 1: Unpaid work ---
    println!("━━━ Scenario 1: Unpaid Jobs ━━━\n");
    for job in facade.list_unpaid_jobs(&ada).unwrap() {
        println!("  job {:<3} {:<10} {:>8}", job.id(), job.description(), job.price());
    }
    println!();

    // --- Scenario 2: Capped deposit ---
    println!("━━━ Scenario 2: Capped Deposit ━━━\n");
    let cap = facade.settlement().deposit_cap(ada.id()).unwrap();
    println!("Outstanding:  {}", facade.settlement().outstanding_obligation(ada.id()).unwrap());
    println!("Deposit cap:  {}", cap);
    match facade.deposit(&ada, ada.id(), dec!(100)) {
        Ok(balance) => println!("Deposit 100 accepted, balance {}", balance),
        Err(rejection) => println!("Deposit 100 rejected: {}", rejection),
    }
    let balance = facade.deposit(&ada, ada.id(), cap).unwrap();
    println!("Deposit {} accepted, balance {}\n", cap, balance);

    // --- Scenario 3: Paying jobs ---
    println!("━━━ Scenario 3: Paying Jobs ━━━\n");
    match facade.settlement().settle_job(ada.id(), JobId::new(1)).unwrap() {
        PaymentOutcome::Settled(receipt) => println!("{}", receipt),
        other => println!("job 1 not settled: {:?}\n", other),
    }
    println!("Pay job 1 again: {}", facade.pay_job(&ada, JobId::new(1)).unwrap());
    println!("Pay job 3:       {}\n", facade.pay_job(&ada, JobId::new(3)).unwrap());

    // --- Scenario 4: Reports ---
    println!("━━━ Scenario 4: Reports ━━━\n");
    let now = Utc::now();
    let (start, end) = (now - Duration::days(1), now + Duration::days(1));
    let best = facade.best_profession(start, end).unwrap();
    println!("Best profession: {} ({})", best.profession, best.total);
    for client in facade.best_clients(start, end, None).unwrap() {
        println!("  {:<3} {:<20} {:>8}", client.client_id, client.full_name, client.total_paid);
    }
}
