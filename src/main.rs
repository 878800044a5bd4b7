use chain_core::Network;
use chain_shared::NetworkConfig;
use clap::Parser;
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// A teaching-grade UTXO blockchain: proof-of-work mining, SPV
/// verification, and a randomized transaction producer, all running
/// in-process on a handful of accounts.
#[derive(Parser)]
#[command(name = "minichain")]
#[command(about = "UTXO blockchain demo with PoW mining and SPV verification")]
#[command(version)]
struct Cli {
    /// Number of accounts (and SPV peers) created at bootstrap.
    #[arg(long, default_value_t = 4)]
    account_number: usize,

    /// Amount minted per account in the genesis transaction.
    #[arg(long, default_value_t = 1000)]
    init_amount: u64,

    /// Transaction pool capacity; also the number of transactions per
    /// mined block.
    #[arg(long, default_value_t = 2)]
    max_transaction_count: usize,

    /// Number of leading hex zeros a block hash must have.
    #[arg(long, default_value_t = 2)]
    difficulty: u32,

    /// Log level (trace, debug, info, warn, error). Overridden by
    /// `RUST_LOG` when set.
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Print the final summary as JSON instead of plain text.
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct BalanceRow {
    address: String,
    balance: u64,
}

#[derive(Serialize)]
struct Summary {
    chain_height: usize,
    total_supply: u64,
    balances: Vec<BalanceRow>,
}

fn main() {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_level.clone()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = NetworkConfig::new(cli.account_number, cli.init_amount, cli.max_transaction_count, cli.difficulty)
        .unwrap_or_else(|e| {
            eprintln!("invalid configuration: {e}");
            std::process::exit(1);
        });

    let network = Network::new(&config);
    network.start();

    info!("mining run finished, printing final summary");

    let balances: Vec<BalanceRow> = network
        .accounts()
        .iter()
        .map(|account| {
            let balance: u64 = network
                .ledger()
                .active_utxos(account.address())
                .into_iter()
                .map(|(_, utxo)| utxo.amount)
                .sum();
            BalanceRow {
                address: account.address().to_string(),
                balance,
            }
        })
        .collect();

    let summary = Summary {
        chain_height: network.ledger().height(),
        total_supply: network.ledger().total_amount(),
        balances,
    };

    if cli.json {
        match serde_json::to_string_pretty(&summary) {
            Ok(rendered) => println!("{rendered}"),
            Err(e) => {
                eprintln!("failed to render summary as JSON: {e}");
                std::process::exit(1);
            }
        }
    } else {
        println!("Chain height: {}", summary.chain_height);
        println!("Total supply: {}", summary.total_supply);
        println!("Balances:");
        for row in &summary.balances {
            println!("  {} -> {}", row.address, row.balance);
        }
    }
}
