//! Coin Ledger CLI
//!
//! Replays shop operations from a CSV file and prints one summary per
//! account to stdout.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- operations.csv > balances.csv
//! cargo run -- --strategy async --max-concurrent 8 operations.csv
//! cargo run -- --catalog merch.csv --output json operations.csv
//! RUST_LOG=debug cargo run -- --json-logs operations.csv
//! ```
//!
//! # Exit Codes
//!
//! - 0: Success
//! - 1: Error (missing arguments, unreadable input or catalog, write failure)

use coin_ledger::core::{CoinEngine, MemoryStore};
use coin_ledger::io::load_catalog;
use coin_ledger::{cli, strategy, telemetry};
use std::process;
use tracing::error;

fn run(args: &cli::CliArgs) -> Result<(), String> {
    let store = MemoryStore::with_default_catalog();
    if let Some(path) = &args.catalog {
        load_catalog(&store, path)
            .map_err(|e| format!("Failed to load catalog '{}': {}", path.display(), e))?;
    }
    let engine = CoinEngine::new(store, args.to_engine_config());

    let strategy = {
        let config = if matches!(args.strategy, cli::StrategyType::Async) {
            Some(args.to_batch_config())
        } else {
            None
        };
        strategy::create_strategy(args.strategy, config, args.to_retry_policy())
    };
    strategy.process(&engine, &args.input_file)?;

    let mut output = std::io::stdout().lock();
    strategy::write_report(&engine, args.output, &mut output)
}

fn main() {
    let args = cli::parse_args();
    telemetry::init(args.json_logs);

    if let Err(e) = run(&args) {
        error!(error = %e, "replay failed");
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
