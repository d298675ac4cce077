//! Progress of a mutating operation through its unit of work
//!
//! ```text
//! Idle -> LockAcquired -> Validated -> Mutated -> Committed
//!   \__________\______________\___________\_____> Aborted
//! ```
//!
//! `Aborted` is terminal and leaves no visible side effect.

use crate::types::CoinError;
use std::fmt;
use std::mem;
use tracing::{error, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitStage {
    Idle,
    LockAcquired,
    Validated,
    Mutated,
    Committed,
    Aborted,
}

impl UnitStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitStage::Idle => "idle",
            UnitStage::LockAcquired => "lock_acquired",
            UnitStage::Validated => "validated",
            UnitStage::Mutated => "mutated",
            UnitStage::Committed => "committed",
            UnitStage::Aborted => "aborted",
        }
    }
}

impl fmt::Display for UnitStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Move `stage` to `Aborted` and log the stage it had reached
///
/// Business rejections and contention are expected traffic; anything else
/// means persistence misbehaved after validation.
pub(crate) fn log_abort(operation: &'static str, stage: &mut UnitStage, error: &CoinError) {
    let reached = mem::replace(stage, UnitStage::Aborted);
    match error {
        CoinError::Internal { .. } | CoinError::ArithmeticOverflow { .. } => {
            error!(operation, %reached, stage = %stage, %error, "unit aborted")
        }
        _ => warn!(operation, %reached, stage = %stage, %error, "unit aborted"),
    }
}
