//! marketplace-settlement CLI
//!
//! Run marketplace operations against a JSON snapshot.
//!
//! # Usage
//!
//! ```bash
//! # Generate a random marketplace
//! marketplace-settlement generate --clients 5 --contractors 4 --output market.json
//!
//! # Pay for a job as profile 1 and save the result
//! marketplace-settlement pay --input market.json --caller 1 --id 3 --output market.json
//!
//! # Rank clients over August 2020
//! marketplace-settlement best-clients --input market.json --start 2020-08-01 --end 2020-08-31 --limit 3
//! ```

use log::{error, info};
use marketplace_settlement::core::config::SettlementConfig;
use marketplace_settlement::core::contract::ContractId;
use marketplace_settlement::core::job::JobId;
use marketplace_settlement::core::profile::{Profile, ProfileId};
use marketplace_settlement::facade::{AccessFacade, Rejection};
use marketplace_settlement::reporting::{DateWindow, ProfessionEarnings};
use marketplace_settlement::simulation::{generate_marketplace, MarketplaceConfig};
use marketplace_settlement::store::{EntityStore, InMemoryStore, MarketplaceSnapshot};
use rust_decimal::Decimal;
use serde::Serialize;
use std::fs;
use std::process;
use std::sync::Arc;

fn print_usage() {
    eprintln!(
        r#"marketplace-settlement — job marketplace settlement and reporting

USAGE:
    marketplace-settlement <COMMAND> [OPTIONS]

COMMANDS:
    contract          Show a contract the caller is party to
    contracts         List the caller's contracts that are not terminated
    unpaid            List unpaid jobs on the caller's in-progress contracts
    pay               Pay for a job
    deposit           Deposit into a client's balance (capped)
    best-profession   Profession that earned the most in a date window
    best-clients      Clients that paid the most in a date window
    generate          Generate a random marketplace snapshot
    help              Show this message

OPTIONS:
    --input <FILE>      Marketplace snapshot (JSON)
    --config <FILE>     Settlement configuration (JSON)
    --format <FORMAT>   Output format: text (default) or json
    --output <FILE>     Write the resulting snapshot (pay, deposit, generate)
    --caller <ID>       Authenticated profile id
    --id <N>            Contract id (contract) or job id (pay)
    --to <ID>           Deposit target profile id
    --amount <AMOUNT>   Deposit amount
    --start <DATE>      Window start (YYYY-MM-DD or RFC 3339)
    --end <DATE>        Window end, inclusive
    --limit <N>         Number of clients to list (at least 2)

OPTIONS (generate):
    --clients <N>       Number of clients (default: 4)
    --contractors <N>   Number of contractors (default: 4)
    --contracts <N>     Contracts per client (default: 2)
    --jobs <N>          Jobs per contract (default: 3)

ENVIRONMENT:
    RUST_LOG            Log filter, e.g. RUST_LOG=info

EXAMPLES:
    marketplace-settlement contracts --input market.json --caller 1
    marketplace-settlement pay --input market.json --caller 1 --id 2 --output market.json
    marketplace-settlement deposit --input market.json --caller 1 --to 1 --amount 50
    marketplace-settlement best-profession --input market.json --start 2020-08-10 --end 2020-08-15
    marketplace-settlement best-clients --input market.json --start 2020-08-10 --end 2020-08-15 --limit 4"#
    );
}

#[derive(Default)]
struct Options {
    input: Option<String>,
    config: Option<String>,
    format: Format,
    output: Option<String>,
    caller: Option<u64>,
    id: Option<u64>,
    to: Option<u64>,
    amount: Option<Decimal>,
    start: Option<String>,
    end: Option<String>,
    limit: Option<usize>,
    clients: Option<usize>,
    contractors: Option<usize>,
    contracts: Option<usize>,
    jobs: Option<usize>,
}

#[derive(Default, PartialEq)]
enum Format {
    #[default]
    Text,
    Json,
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("Error: {}", message);
    process::exit(1);
}

fn value<'a>(args: &'a [String], i: usize, flag: &str) -> &'a str {
    args.get(i)
        .map(|s| s.as_str())
        .unwrap_or_else(|| fail(format!("{} requires a value", flag)))
}

fn number<T: std::str::FromStr>(args: &[String], i: usize, flag: &str) -> T {
    value(args, i, flag)
        .parse()
        .unwrap_or_else(|_| fail(format!("{} requires a number", flag)))
}

fn parse_options(args: &[String]) -> Options {
    let mut opts = Options::default();
    let mut i = 0;
    while i < args.len() {
        let flag = args[i].as_str();
        i += 1;
        match flag {
            "--input" => opts.input = Some(value(args, i, flag).to_string()),
            "--config" => opts.config = Some(value(args, i, flag).to_string()),
            "--output" => opts.output = Some(value(args, i, flag).to_string()),
            "--format" => {
                opts.format = match value(args, i, flag) {
                    "text" => Format::Text,
                    "json" => Format::Json,
                    other => fail(format!("--format requires 'text' or 'json', got '{}'", other)),
                }
            }
            "--caller" => opts.caller = Some(number(args, i, flag)),
            "--id" => opts.id = Some(number(args, i, flag)),
            "--to" => opts.to = Some(number(args, i, flag)),
            "--amount" => {
                let raw = value(args, i, flag);
                opts.amount = Some(
                    raw.parse()
                        .unwrap_or_else(|e| fail(format!("invalid amount '{}': {}", raw, e))),
                );
            }
            "--start" => opts.start = Some(value(args, i, flag).to_string()),
            "--end" => opts.end = Some(value(args, i, flag).to_string()),
            "--limit" => opts.limit = Some(number(args, i, flag)),
            "--clients" => opts.clients = Some(number(args, i, flag)),
            "--contractors" => opts.contractors = Some(number(args, i, flag)),
            "--contracts" => opts.contracts = Some(number(args, i, flag)),
            "--jobs" => opts.jobs = Some(number(args, i, flag)),
            _ => fail(format!("unknown option: {}", flag)),
        }
        i += 1;
    }
    opts
}

fn required<T: Clone>(value: &Option<T>, flag: &str) -> T {
    value
        .clone()
        .unwrap_or_else(|| fail(format!("{} is required", flag)))
}

fn load_facade(opts: &Options) -> AccessFacade<InMemoryStore> {
    let path = required(&opts.input, "--input <FILE>");
    let content = fs::read_to_string(&path)
        .unwrap_or_else(|e| fail(format!("cannot read '{}': {}", path, e)));
    let snapshot: MarketplaceSnapshot = serde_json::from_str(&content).unwrap_or_else(|e| {
        eprintln!("Expected format:");
        eprintln!(
            r#"{{
  "profiles":  [{{ "id": 1, "firstName": "Harry", "lastName": "Potter", "profession": "Wizard", "kind": "client", "balance": "1150" }}],
  "contracts": [{{ "id": 1, "clientId": 1, "contractorId": 5, "status": "in_progress" }}],
  "jobs":      [{{ "id": 1, "contractId": 1, "price": "200", "paid": false }}]
}}"#
        );
        fail(format!("cannot parse '{}': {}", path, e))
    });
    let store = InMemoryStore::from_snapshot(snapshot)
        .unwrap_or_else(|e| fail(format!("invalid snapshot '{}': {}", path, e)));

    let config = match &opts.config {
        Some(path) => {
            let content = fs::read_to_string(path)
                .unwrap_or_else(|e| fail(format!("cannot read '{}': {}", path, e)));
            SettlementConfig::from_json(&content)
                .unwrap_or_else(|e| fail(format!("cannot parse config '{}': {}", path, e)))
        }
        None => SettlementConfig::default(),
    };
    info!("loaded marketplace from {}", path);
    AccessFacade::with_config(Arc::new(store), config)
}

/// Stands in for the authentication layer: the caller id is trusted and
/// resolved straight from the store.
fn resolve_caller(facade: &AccessFacade<InMemoryStore>, opts: &Options) -> Profile {
    let id = ProfileId::new(required(&opts.caller, "--caller <ID>"));
    facade
        .store()
        .read(|view| view.find_profile(id))
        .unwrap_or_else(|e| fail(format!("unauthorized: {}", e)))
}

fn window(opts: &Options) -> DateWindow {
    let start = required(&opts.start, "--start <DATE>");
    let end = required(&opts.end, "--end <DATE>");
    DateWindow::parse(&start, &end).unwrap_or_else(|e| fail(e))
}

fn save_snapshot(facade: &AccessFacade<InMemoryStore>, opts: &Options) {
    if let Some(path) = &opts.output {
        let snapshot = facade
            .store()
            .snapshot()
            .unwrap_or_else(|e| fail(format!("cannot snapshot store: {}", e)));
        write_json(path, &snapshot);
        eprintln!("Saved marketplace → {}", path);
    }
}

fn write_json<T: Serialize>(path: &str, value: &T) {
    let json = serde_json::to_string_pretty(value)
        .unwrap_or_else(|e| fail(format!("cannot serialize: {}", e)));
    fs::write(path, json).unwrap_or_else(|e| fail(format!("cannot write '{}': {}", path, e)));
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => fail(format!("cannot serialize: {}", e)),
    }
}

/// Print a rejection and exit with a non-zero status.
fn reject(opts: &Options, rejection: Rejection) -> ! {
    error!("request rejected: {}", rejection);
    if opts.format == Format::Json {
        print_json(&rejection);
    } else {
        eprintln!("Rejected: {}", rejection);
    }
    process::exit(2);
}

fn cmd_contract(opts: &Options) {
    let facade = load_facade(opts);
    let caller = resolve_caller(&facade, opts);
    let id = ContractId::new(required(&opts.id, "--id <N>"));
    let contract = facade
        .get_contract(&caller, id)
        .unwrap_or_else(|r| reject(opts, r));
    if opts.format == Format::Json {
        print_json(&contract);
    } else {
        println!("Contract {}", contract.id());
        println!("  Status:      {}", contract.status());
        println!("  Client:      {}", contract.client_id());
        println!("  Contractor:  {}", contract.contractor_id());
        println!("  Terms:       {}", contract.terms());
    }
}

fn cmd_contracts(opts: &Options) {
    let facade = load_facade(opts);
    let caller = resolve_caller(&facade, opts);
    let contracts = facade
        .list_active_contracts(&caller)
        .unwrap_or_else(|r| reject(opts, r));
    if opts.format == Format::Json {
        print_json(&contracts);
    } else if contracts.is_empty() {
        println!("No active contracts.");
    } else {
        for c in &contracts {
            println!(
                "  #{:<5} {:<12} client {:<5} contractor {}",
                c.id(),
                c.status().to_string(),
                c.client_id(),
                c.contractor_id()
            );
        }
    }
}

fn cmd_unpaid(opts: &Options) {
    let facade = load_facade(opts);
    let caller = resolve_caller(&facade, opts);
    let jobs = facade
        .list_unpaid_jobs(&caller)
        .unwrap_or_else(|r| reject(opts, r));
    if opts.format == Format::Json {
        print_json(&jobs);
    } else if jobs.is_empty() {
        println!("No unpaid jobs.");
    } else {
        let total: Decimal = jobs.iter().map(|j| j.price()).sum();
        for j in &jobs {
            println!("  job #{:<5} contract #{:<5} {}", j.id(), j.contract_id(), j.price());
        }
        println!("\nTotal outstanding: {}", total);
    }
}

fn cmd_pay(opts: &Options) {
    let facade = load_facade(opts);
    let caller = resolve_caller(&facade, opts);
    let job = JobId::new(required(&opts.id, "--id <N>"));
    let outcome = facade
        .settlement()
        .settle_job(caller.id(), job)
        .unwrap_or_else(|e| reject(opts, e.into()));

    if opts.format == Format::Json {
        #[derive(Serialize)]
        struct PayOutput<'a> {
            settled: bool,
            receipt: Option<&'a marketplace_settlement::settlement::SettlementReceipt>,
        }
        print_json(&PayOutput {
            settled: outcome.is_settled(),
            receipt: outcome.receipt(),
        });
    } else {
        match outcome.receipt() {
            Some(receipt) => println!("{}", receipt),
            None => println!("Not settled: {:?}", outcome),
        }
    }
    save_snapshot(&facade, opts);
}

fn cmd_deposit(opts: &Options) {
    let facade = load_facade(opts);
    let caller = resolve_caller(&facade, opts);
    let target = ProfileId::new(required(&opts.to, "--to <ID>"));
    let amount = required(&opts.amount, "--amount <AMOUNT>");
    let balance = facade
        .deposit(&caller, target, amount)
        .unwrap_or_else(|r| reject(opts, r));

    if opts.format == Format::Json {
        print_json(&serde_json::json!({
            "profile": target,
            "deposited": amount,
            "balance": balance,
        }));
    } else {
        println!("Deposited {} to profile {}; balance is now {}", amount, target, balance);
    }
    save_snapshot(&facade, opts);
}

fn cmd_best_profession(opts: &Options) {
    let facade = load_facade(opts);
    let window = window(opts);
    // one snapshot for both the winner and the table
    let breakdown = facade
        .reports()
        .profession_breakdown(&window)
        .unwrap_or_else(|e| reject(opts, e.into()));
    let best = ProfessionEarnings::top(&breakdown, &window).unwrap_or_else(|e| reject(opts, e.into()));
    if opts.format == Format::Json {
        print_json(&best);
    } else {
        println!("Best profession {}: {} ({})", window, best.profession, best.total);
        for (profession, total) in breakdown.ranked() {
            println!("  {:<20} {}", profession, total);
        }
    }
}

fn cmd_best_clients(opts: &Options) {
    let facade = load_facade(opts);
    let window = window(opts);
    let clients = facade
        .best_clients(window.start(), window.end(), opts.limit)
        .unwrap_or_else(|r| reject(opts, r));
    if opts.format == Format::Json {
        print_json(&clients);
    } else {
        println!("Best clients {}:", window);
        for (rank, c) in clients.iter().enumerate() {
            println!("  {}. {:<24} {}", rank + 1, c.full_name, c.total_paid);
        }
    }
}

fn cmd_generate(opts: &Options) {
    let defaults = MarketplaceConfig::default();
    let config = MarketplaceConfig {
        client_count: opts.clients.unwrap_or(defaults.client_count),
        contractor_count: opts.contractors.unwrap_or(defaults.contractor_count),
        contracts_per_client: opts.contracts.unwrap_or(defaults.contracts_per_client),
        jobs_per_contract: opts.jobs.unwrap_or(defaults.jobs_per_contract),
        ..defaults
    };
    let snapshot = generate_marketplace(&config);

    match &opts.output {
        Some(path) => {
            write_json(path, &snapshot);
            eprintln!(
                "Generated {} profiles, {} contracts, {} jobs → {}",
                snapshot.profiles.len(),
                snapshot.contracts.len(),
                snapshot.jobs.len(),
                path
            );
        }
        None => print_json(&snapshot),
    }
}

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let command = args[1].as_str();
    if matches!(command, "help" | "--help" | "-h") {
        print_usage();
        return;
    }
    let opts = parse_options(&args[2..]);

    match command {
        "contract" => cmd_contract(&opts),
        "contracts" => cmd_contracts(&opts),
        "unpaid" => cmd_unpaid(&opts),
        "pay" => cmd_pay(&opts),
        "deposit" => cmd_deposit(&opts),
        "best-profession" => cmd_best_profession(&opts),
        "best-clients" => cmd_best_clients(&opts),
        "generate" => cmd_generate(&opts),
        _ => {
            eprintln!("Unknown command: {}", command);
            print_usage();
            process::exit(1);
        }
    }
}
