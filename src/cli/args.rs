use crate::core::EngineConfig;
use crate::strategy::{BackoffStrategy, BatchConfig, RetryPolicy};
use crate::types::{Coins, STARTING_BALANCE};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;
use tracing::warn;

/// Replay shop operations against the coin ledger and report balances
#[derive(Parser, Debug)]
#[command(name = "coin-ledger")]
#[command(
    about = "Replay coin shop operations and report per-account balances",
    long_about = None
)]
pub struct CliArgs {
    /// Operation CSV with columns op,account,target,amount
    #[arg(value_name = "INPUT", help = "Path to the operation CSV file")]
    pub input_file: PathBuf,

    #[arg(
        long = "strategy",
        value_name = "STRATEGY",
        default_value = "sync",
        help = "Replay strategy: 'sync' for sequential or 'async' for concurrent"
    )]
    pub strategy: StrategyType,

    /// Operations per batch (async mode only)
    #[arg(
        long = "batch-size",
        value_name = "SIZE",
        help = "Operations per batch (default: 1000)"
    )]
    pub batch_size: Option<usize>,

    /// Operations in flight at once (async mode only)
    #[arg(
        long = "max-concurrent",
        value_name = "COUNT",
        help = "Maximum operations in flight (default: CPU cores)"
    )]
    pub max_concurrent: Option<usize>,

    #[arg(
        long = "max-retries",
        value_name = "COUNT",
        default_value_t = 5,
        help = "Retries of an operation that found an account busy (async mode only)"
    )]
    pub max_retries: u32,

    #[arg(
        long = "retry-delay-ms",
        value_name = "MILLIS",
        default_value_t = 2,
        help = "Base delay between retries in milliseconds"
    )]
    pub retry_delay_ms: u64,

    #[arg(
        long = "backoff",
        value_name = "BACKOFF",
        default_value = "exponential",
        help = "Delay growth between retries"
    )]
    pub backoff: BackoffStrategy,

    /// Catalog CSV with columns name,price, merged over the default catalog
    #[arg(long = "catalog", value_name = "FILE")]
    pub catalog: Option<PathBuf>,

    #[arg(
        long = "starting-balance",
        value_name = "COINS",
        default_value_t = STARTING_BALANCE,
        help = "Balance granted to an account on first sight"
    )]
    pub starting_balance: Coins,

    #[arg(long = "output", value_name = "FORMAT", default_value = "csv")]
    pub output: OutputFormat,

    /// Emit logs as JSON lines on stderr
    #[arg(long = "json-logs")]
    pub json_logs: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum StrategyType {
    Sync,
    Async,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// account,coins,inventory,received,sent
    Csv,
    /// One summary object per line
    Json,
}

/// Cap on any single retry delay
const MAX_RETRY_DELAY: Duration = Duration::from_millis(250);

impl CliArgs {
    pub fn to_batch_config(&self) -> BatchConfig {
        if self.batch_size.is_some() || self.max_concurrent.is_some() {
            let default = BatchConfig::default();
            BatchConfig::new(
                self.batch_size.unwrap_or(default.batch_size),
                self.max_concurrent.unwrap_or(default.max_concurrent),
            )
        } else {
            BatchConfig::default()
        }
    }

    pub fn to_retry_policy(&self) -> RetryPolicy {
        let base = Duration::from_millis(self.retry_delay_ms);
        match self.backoff {
            BackoffStrategy::Fixed => RetryPolicy::fixed(self.max_retries, base),
            BackoffStrategy::Linear => {
                RetryPolicy::linear(self.max_retries, base, MAX_RETRY_DELAY.max(base))
            }
            BackoffStrategy::Exponential => {
                RetryPolicy::exponential(self.max_retries, base, MAX_RETRY_DELAY.max(base))
            }
        }
    }

    /// Negative starting balances fall back to the default with a warning
    pub fn to_engine_config(&self) -> EngineConfig {
        let starting_balance = if self.starting_balance < 0 {
            warn!(
                requested = self.starting_balance,
                fallback = STARTING_BALANCE,
                "invalid starting balance, using default"
            );
            STARTING_BALANCE
        } else {
            self.starting_balance
        };
        EngineConfig { starting_balance }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::default_strategy(&["program", "input.csv"], StrategyType::Sync)]
    #[case::explicit_sync(&["program", "--strategy", "sync", "input.csv"], StrategyType::Sync)]
    #[case::explicit_async(&["program", "--strategy", "async", "input.csv"], StrategyType::Async)]
    fn test_strategy_parsing(#[case] args: &[&str], #[case] expected: StrategyType) {
        let parsed = CliArgs::try_parse_from(args).unwrap();
        assert_eq!(parsed.strategy, expected);
    }

    #[rstest]
    #[case::all_defaults(&["program", "input.csv"], 1000, num_cpus::get())]
    #[case::custom_batch_size(
        &["program", "--batch-size", "200", "input.csv"],
        200,
        num_cpus::get()
    )]
    #[case::custom_max_concurrent(&["program", "--max-concurrent", "8", "input.csv"], 1000, 8)]
    #[case::zero_batch_size(&["program", "--batch-size", "0", "input.csv"], 1000, num_cpus::get())]
    #[case::zero_max_concurrent(
        &["program", "--max-concurrent", "0", "input.csv"],
        1000,
        num_cpus::get()
    )]
    fn test_batch_config_conversion(
        #[case] args: &[&str],
        #[case] expected_batch_size: usize,
        #[case] expected_max_concurrent: usize,
    ) {
        let config = CliArgs::try_parse_from(args).unwrap().to_batch_config();
        assert_eq!(config.batch_size, expected_batch_size);
        assert_eq!(config.max_concurrent, expected_max_concurrent);
    }

    #[rstest]
    #[case::defaults(
        &["program", "input.csv"],
        RetryPolicy::exponential(5, Duration::from_millis(2), MAX_RETRY_DELAY)
    )]
    #[case::fixed(
        &[
            "program",
            "--backoff",
            "fixed",
            "--max-retries",
            "9",
            "--retry-delay-ms",
            "4",
            "input.csv",
        ],
        RetryPolicy::fixed(9, Duration::from_millis(4))
    )]
    #[case::linear_with_large_base(
        &["program", "--backoff", "linear", "--retry-delay-ms", "500", "input.csv"],
        RetryPolicy::linear(5, Duration::from_millis(500), Duration::from_millis(500))
    )]
    #[case::no_retries(
        &["program", "--max-retries", "0", "input.csv"],
        RetryPolicy::exponential(0, Duration::from_millis(2), MAX_RETRY_DELAY)
    )]
    fn test_retry_policy_conversion(#[case] args: &[&str], #[case] expected: RetryPolicy) {
        let policy = CliArgs::try_parse_from(args).unwrap().to_retry_policy();
        assert_eq!(policy, expected);
    }

    #[rstest]
    #[case::default(&["program", "input.csv"], STARTING_BALANCE)]
    #[case::custom(&["program", "--starting-balance", "250", "input.csv"], 250)]
    #[case::negative(&["program", "--starting-balance=-5", "input.csv"], STARTING_BALANCE)]
    fn test_engine_config_conversion(#[case] args: &[&str], #[case] expected: Coins) {
        let config = CliArgs::try_parse_from(args).unwrap().to_engine_config();
        assert_eq!(config.starting_balance, expected);
    }

    #[rstest]
    #[case::csv(&["program", "input.csv"], OutputFormat::Csv, false)]
    #[case::json(
        &["program", "--output", "json", "--json-logs", "input.csv"],
        OutputFormat::Json,
        true
    )]
    fn test_output_options(
        #[case] args: &[&str],
        #[case] format: OutputFormat,
        #[case] json_logs: bool,
    ) {
        let parsed = CliArgs::try_parse_from(args).unwrap();
        assert_eq!(parsed.output, format);
        assert_eq!(parsed.json_logs, json_logs);
    }

    #[test]
    fn test_catalog_option() {
        let parsed =
            CliArgs::try_parse_from(["program", "--catalog", "merch.csv", "input.csv"]).unwrap();
        assert_eq!(parsed.catalog, Some(PathBuf::from("merch.csv")));
    }

    #[rstest]
    #[case::missing_input(&["program"])]
    #[case::invalid_strategy(&["program", "--strategy", "invalid", "input.csv"])]
    #[case::invalid_output(&["program", "--output", "xml", "input.csv"])]
    #[case::invalid_backoff(&["program", "--backoff", "random", "input.csv"])]
    fn test_parsing_errors(#[case] args: &[&str]) {
        assert!(CliArgs::try_parse_from(args).is_err());
    }
}
