//! Account-related types for the coin ledger
//!
//! This module defines the Account structure and the identifiers and
//! amount type shared by every balance-mutating operation.

use serde::{Deserialize, Serialize};

/// Account identifier, assigned by the store on creation
pub type AccountId = i64;

/// Coin amount
///
/// Signed so that arithmetic on balances can be checked for both overflow
/// and going below zero; stored balances are never negative.
pub type Coins = i64;

/// Balance granted to an account the first time its identity authenticates
pub const STARTING_BALANCE: Coins = 1000;

/// A user account holding a single coin balance
///
/// Accounts are created on first authentication and are never deleted.
/// The balance only changes inside a committed unit of work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Store-assigned identifier
    pub id: AccountId,

    /// Unique, email-like identity string
    pub identity: String,

    /// Current committed balance (always >= 0)
    pub balance: Coins,
}

impl Account {
    /// Create an account value with the given balance
    pub fn new(id: AccountId, identity: impl Into<String>, balance: Coins) -> Self {
        Account {
            id,
            identity: identity.into(),
            balance,
        }
    }

    /// Whether the balance covers `amount`
    pub fn can_afford(&self, amount: Coins) -> bool {
        self.balance >= amount
    }
}
