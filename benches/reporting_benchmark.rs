use chrono::Duration;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use marketplace_settlement::core::profile::ProfileId;
use marketplace_settlement::reporting::{DateWindow, ReportingAggregator};
use marketplace_settlement::settlement::SettlementEngine;
use marketplace_settlement::simulation::{generate_marketplace, MarketplaceConfig};
use marketplace_settlement::store::InMemoryStore;
use std::sync::Arc;

fn marketplace(clients: usize, contractors: usize) -> (Arc<InMemoryStore>, DateWindow) {
    let config = MarketplaceConfig {
        client_count: clients,
        contractor_count: contractors,
        contracts_per_client: 4,
        jobs_per_contract: 5,
        ..Default::default()
    };
    let window = DateWindow::new(
        config.history_start,
        config.history_start + Duration::days(config.history_days),
    )
    .unwrap();
    let store = InMemoryStore::from_snapshot(generate_marketplace(&config)).unwrap();
    (Arc::new(store), window)
}

fn bench_best_profession_100_clients(c: &mut Criterion) {
    let (store, window) = marketplace(100, 20);
    let reports = ReportingAggregator::new(store);

    c.bench_function("best_profession_100_clients", |b| {
        b.iter(|| reports.best_profession(black_box(&window)))
    });
}

fn bench_best_clients_1000_clients(c: &mut Criterion) {
    let (store, window) = marketplace(1000, 100);
    let reports = ReportingAggregator::new(store);

    c.bench_function("best_clients_1000_clients", |b| {
        b.iter(|| reports.best_clients(black_box(&window), Some(10)))
    });
}

fn bench_outstanding_obligation(c: &mut Criterion) {
    let (store, _) = marketplace(1000, 100);
    let engine = SettlementEngine::new(store);
    let client = ProfileId::new(1);

    c.bench_function("outstanding_obligation_1000_clients", |b| {
        b.iter(|| engine.outstanding_obligation(black_box(client)))
    });
}

criterion_group!(
    benches,
    bench_best_profession_100_clients,
    bench_best_clients_1000_clients,
    bench_outstanding_obligation
);
criterion_main!(benches);
