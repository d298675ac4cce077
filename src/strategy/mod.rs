//! Replay strategies
//!
//! A strategy reads operation records from a CSV file and applies them to a
//! `CoinEngine`. Strategies differ only in how operations are scheduled;
//! the engine and its guarantees are the same for all of them.

use crate::cli::{OutputFormat, StrategyType};
use crate::core::CoinEngine;
use crate::io::{write_summaries_csv, write_summaries_json};
use crate::types::CoinError;
use std::io::Write;
use std::path::Path;

pub mod r#async;
pub mod retry;
pub mod sync;

pub use self::r#async::{AsyncProcessingStrategy, BatchConfig};
pub use retry::{BackoffStrategy, RetryPolicy};
pub use sync::SyncProcessingStrategy;

/// Counters for one replay
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplayStats {
    /// Operations the engine accepted
    pub applied: usize,
    /// Operations the engine rejected, including exhausted retries
    pub rejected: usize,
    /// Rejections that were still `Busy` after the last retry
    pub exhausted: usize,
    /// Retries performed across all operations
    pub retries: u64,
    /// Input rows that did not parse
    pub skipped: usize,
}

impl ReplayStats {
    pub(crate) fn record(&mut self, result: &Result<(), CoinError>, retries: u32) {
        self.retries += u64::from(retries);
        match result {
            Ok(()) => self.applied += 1,
            Err(e) => {
                self.rejected += 1;
                if e.is_retryable() {
                    self.exhausted += 1;
                }
            }
        }
    }

    /// Operations that reached the engine
    pub fn total(&self) -> usize {
        self.applied + self.rejected
    }
}

pub trait ProcessingStrategy: Send + Sync {
    /// Replay every operation in `input_path` against `engine`
    ///
    /// Rejected operations and malformed rows are logged and counted; only
    /// failures to read the input are returned as errors.
    fn process(&self, engine: &CoinEngine, input_path: &Path) -> Result<ReplayStats, String>;
}

pub fn create_strategy(
    strategy_type: StrategyType,
    config: Option<BatchConfig>,
    retry: RetryPolicy,
) -> Box<dyn ProcessingStrategy> {
    match strategy_type {
        StrategyType::Sync => Box::new(SyncProcessingStrategy),
        StrategyType::Async => Box::new(AsyncProcessingStrategy::new(
            config.unwrap_or_default(),
            retry,
        )),
    }
}

/// Write the summary of every account, sorted by identity
pub fn write_report(
    engine: &CoinEngine,
    format: OutputFormat,
    output: &mut dyn Write,
) -> Result<(), String> {
    let summaries = engine
        .summaries()
        .map_err(|e| format!("Failed to build summaries: {}", e))?;

    match format {
        OutputFormat::Csv => write_summaries_csv(&summaries, output),
        OutputFormat::Json => write_summaries_json(&summaries, output),
    }
}
