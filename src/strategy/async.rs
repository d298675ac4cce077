//! Concurrent batch replay
//!
//! ```text
//! AsyncProcessingStrategy
//!     ├── BatchConfig (batch_size, max_concurrent)
//!     ├── RetryPolicy (backoff on Busy)
//!     ├── AsyncReader (batch CSV reading)
//!     └── CoinEngine (shared by every task)
//! ```
//!
//! Batches are processed one after another. Within a batch the `auth` rows
//! run first, so receivers registered in the batch exist before any send
//! names them. The mutating rows then run as tokio tasks, at most
//! `max_concurrent` at a time, and race for row locks. A task that gets
//! `Busy` backs off and retries according to the `RetryPolicy`.
//!
//! Concurrent operations on the same account may commit in any order, so
//! the per-account outcome can differ from a sequential replay. Totals are
//! conserved regardless.

use crate::core::CoinEngine;
use crate::io::async_reader::AsyncReader;
use crate::strategy::{ProcessingStrategy, ReplayStats, RetryPolicy};
use crate::types::{CoinError, OperationRecord};
use futures::stream::{self, StreamExt};
use std::path::Path;
use tokio_util::compat::TokioAsyncReadCompatExt;
use tracing::{debug, info, warn};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BatchConfig {
    /// Operations read per batch
    pub batch_size: usize,
    /// Upper bound on operations in flight, also the runtime's worker count
    pub max_concurrent: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: 1000,
            max_concurrent: num_cpus::get(),
        }
    }
}

impl BatchConfig {
    /// Zero values fall back to the defaults with a warning
    pub fn new(batch_size: usize, max_concurrent: usize) -> Self {
        let default = Self::default();

        let batch_size = if batch_size == 0 {
            warn!(
                requested = batch_size,
                fallback = default.batch_size,
                "invalid batch size, using default"
            );
            default.batch_size
        } else {
            batch_size
        };

        let max_concurrent = if max_concurrent == 0 {
            warn!(
                requested = max_concurrent,
                fallback = default.max_concurrent,
                "invalid concurrency limit, using default"
            );
            default.max_concurrent
        } else {
            max_concurrent
        };

        Self {
            batch_size,
            max_concurrent,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AsyncProcessingStrategy {
    config: BatchConfig,
    retry: RetryPolicy,
}

impl AsyncProcessingStrategy {
    pub fn new(config: BatchConfig, retry: RetryPolicy) -> Self {
        Self { config, retry }
    }

    async fn replay(&self, engine: &CoinEngine, input_path: &Path) -> Result<ReplayStats, String> {
        let file = tokio::fs::File::open(input_path)
            .await
            .map_err(|e| format!("Failed to open file '{}': {}", input_path.display(), e))?;
        let mut reader = AsyncReader::new(file.compat());
        let mut stats = ReplayStats::default();

        loop {
            let batch = reader.read_batch(self.config.batch_size).await;
            if batch.is_empty() {
                break;
            }

            let (auths, mutations): (Vec<_>, Vec<_>) = batch
                .into_iter()
                .partition(|operation| !operation.kind().is_mutating());

            for operation in &auths {
                let outcome = engine.process_operation(operation);
                log_rejection(operation, &outcome);
                stats.record(&outcome, 0);
            }

            let outcomes: Vec<_> = stream::iter(mutations.into_iter().map(|operation| {
                let engine = engine.clone();
                let retry = self.retry.clone();
                tokio::spawn(async move {
                    let (outcome, retries) = apply_with_retry(&engine, &operation, &retry).await;
                    log_rejection(&operation, &outcome);
                    (outcome, retries)
                })
            }))
            .buffer_unordered(self.config.max_concurrent)
            .collect()
            .await;

            for joined in outcomes {
                let (outcome, retries) =
                    joined.map_err(|e| format!("Operation task failed: {}", e))?;
                stats.record(&outcome, retries);
            }
        }

        stats.skipped = reader.skipped();
        Ok(stats)
    }
}

/// Apply `operation`, retrying while it is `Busy` and the policy allows
///
/// Returns the final result and the number of retries performed.
pub async fn apply_with_retry(
    engine: &CoinEngine,
    operation: &OperationRecord,
    policy: &RetryPolicy,
) -> (Result<(), CoinError>, u32) {
    let mut retries = 0;
    loop {
        match engine.process_operation(operation) {
            Err(e) if e.is_retryable() && policy.should_retry(retries) => {
                retries += 1;
                let delay = policy.delay_for_retry(retries);
                debug!(
                    identity = operation.identity(),
                    retry = retries,
                    delay_ms = delay.as_millis() as u64,
                    "operation busy, backing off"
                );
                tokio::time::sleep(delay).await;
            }
            result => return (result, retries),
        }
    }
}

fn log_rejection(operation: &OperationRecord, outcome: &Result<(), CoinError>) {
    if let Err(e) = outcome {
        debug!(
            op = ?operation.kind(),
            identity = operation.identity(),
            error = %e,
            "operation rejected"
        );
    }
}

impl ProcessingStrategy for AsyncProcessingStrategy {
    fn process(&self, engine: &CoinEngine, input_path: &Path) -> Result<ReplayStats, String> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(self.config.max_concurrent)
            .enable_time()
            .build()
            .map_err(|e| format!("Failed to create tokio runtime: {}", e))?;

        let stats = runtime.block_on(self.replay(engine, input_path))?;

        info!(
            strategy = "async",
            applied = stats.applied,
            rejected = stats.rejected,
            exhausted = stats.exhausted,
            retries = stats.retries,
            skipped = stats.skipped,
            "replay finished"
        );
        Ok(stats)
    }
}
