//! Operation records replayed against the engine
//!
//! An operation stands in for one authenticated request: the transport,
//! token validation and payload validation happen upstream, and what reaches
//! the engine is an identity plus an already-shaped payload.

use super::account::Coins;
use serde::{Deserialize, Serialize};

/// Kinds of request the engine understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    /// Resolve the identity to an account, creating it on first sight
    Auth,

    /// Buy one catalog item by name
    Buy,

    /// Send coins to another identity
    Send,
}

impl OperationKind {
    /// Whether the operation mutates balances
    pub fn is_mutating(&self) -> bool {
        matches!(self, OperationKind::Buy | OperationKind::Send)
    }
}

/// One validated operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationRecord {
    Auth { identity: String },
    Buy { identity: String, item: String },
    Send { identity: String, receiver: String, amount: Coins },
}

impl OperationRecord {
    pub fn kind(&self) -> OperationKind {
        match self {
            OperationRecord::Auth { .. } => OperationKind::Auth,
            OperationRecord::Buy { .. } => OperationKind::Buy,
            OperationRecord::Send { .. } => OperationKind::Send,
        }
    }

    /// Identity of the authenticated caller
    pub fn identity(&self) -> &str {
        match self {
            OperationRecord::Auth { identity }
            | OperationRecord::Buy { identity, .. }
            | OperationRecord::Send { identity, .. } => identity,
        }
    }
}
