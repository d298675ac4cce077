//! Sequential replay
//!
//! Streams operations one row at a time through `SyncReader` and applies
//! each to the engine in file order. With a single caller no row lock is
//! ever contended, so the outcome is fully determined by the input.

use crate::core::CoinEngine;
use crate::io::sync_reader::SyncReader;
use crate::strategy::{ProcessingStrategy, ReplayStats};
use std::path::Path;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy)]
pub struct SyncProcessingStrategy;

impl ProcessingStrategy for SyncProcessingStrategy {
    fn process(&self, engine: &CoinEngine, input_path: &Path) -> Result<ReplayStats, String> {
        let reader = SyncReader::new(input_path)?;
        let mut stats = ReplayStats::default();

        for result in reader {
            match result {
                Ok(operation) => {
                    let outcome = engine.process_operation(&operation);
                    if let Err(e) = &outcome {
                        debug!(
                            op = ?operation.kind(),
                            identity = operation.identity(),
                            error = %e,
                            "operation rejected"
                        );
                    }
                    stats.record(&outcome, 0);
                }
                Err(e) => {
                    stats.skipped += 1;
                    warn!(error = %e, "skipping malformed operation");
                }
            }
        }

        info!(
            strategy = "sync",
            applied = stats.applied,
            rejected = stats.rejected,
            skipped = stats.skipped,
            "replay finished"
        );
        Ok(stats)
    }
}
