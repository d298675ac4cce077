//! Error types for the coin ledger
//!
//! Every error is fatal to the current call only. Errors raised inside a
//! unit of work abort the unit before they reach the caller, so an `Err`
//! never comes back alongside a partially applied mutation.
//!
//! # Error Categories
//!
//! - **Lookup Errors**: unknown account, identity, receiver or item
//! - **Business Rejections**: insufficient funds, invalid amount, self transfer
//! - **Contention**: `Busy`, the only retryable error
//! - **Internal Errors**: persistence failures after validation passed
//! - **Input Errors**: I/O and CSV problems at the replay boundary

use super::account::{AccountId, Coins};
use thiserror::Error;

/// Main error type for the coin ledger
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoinError {
    /// No account with this id
    #[error("Account {account} not found")]
    AccountNotFound {
        /// The account id that was looked up
        account: AccountId,
    },

    /// No account with this identity
    #[error("Account '{identity}' not found")]
    IdentityNotFound {
        /// The identity that was looked up
        identity: String,
    },

    /// Transfer receiver does not exist
    #[error("Receiver '{identity}' not found")]
    ReceiverNotFound {
        /// Receiver identity from the request
        identity: String,
    },

    /// Catalog has no item with this name
    #[error("Item '{item}' not found")]
    ItemNotFound {
        /// Requested item name
        item: String,
    },

    /// Identity collision on account creation
    #[error("Account '{identity}' already exists")]
    AlreadyExists {
        /// The identity that is taken
        identity: String,
    },

    /// Balance below the amount the operation needs
    ///
    /// The unit of work is aborted and the balance is left unchanged.
    #[error("Insufficient funds for account {account}: balance {balance}, required {required}")]
    InsufficientFunds {
        /// Account id
        account: AccountId,
        /// Balance at the time of the check
        balance: Coins,
        /// Coins the operation needed
        required: Coins,
    },

    /// Non-positive transfer amount or negative starting balance
    #[error("Invalid amount {amount}")]
    InvalidAmount {
        /// The rejected amount
        amount: Coins,
    },

    /// Catalog prices must be positive
    #[error("Invalid price {price} for item '{item}'")]
    InvalidPrice {
        /// Item name
        item: String,
        /// The rejected price
        price: Coins,
    },

    /// Sender and receiver are the same account
    #[error("Account {account} cannot transfer coins to itself")]
    SelfTransferRejected {
        /// Account id
        account: AccountId,
    },

    /// Row lock held by another unit of work
    ///
    /// Retryable: the unit was aborted immediately and nothing changed.
    #[error("Account {account} is busy, please try again")]
    Busy {
        /// Account whose lock could not be taken
        account: AccountId,
    },

    /// Arithmetic overflow would occur
    #[error("Arithmetic overflow in {operation} for account {account}")]
    ArithmeticOverflow {
        /// Operation that would overflow
        operation: String,
        /// Account id
        account: AccountId,
    },

    /// Persistence or ledger failure after validation passed
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the failure
        message: String,
    },

    /// I/O error occurred while reading or writing files
    #[error("I/O error: {message}")]
    IoError {
        /// Description of the I/O error
        message: String,
    },

    /// CSV parsing error occurred
    ///
    /// Recoverable during replay: the malformed row is skipped.
    #[error(
        "CSV parse error{}: {message}",
        line.map(|l| format!(" at line {}", l)).unwrap_or_default()
    )]
    ParseError {
        /// Line number where the error occurred (if available)
        line: Option<u64>,
        /// Description of the parsing error
        message: String,
    },
}

impl From<std::io::Error> for CoinError {
    fn from(error: std::io::Error) -> Self {
        CoinError::IoError {
            message: error.to_string(),
        }
    }
}

impl From<csv::Error> for CoinError {
    fn from(error: csv::Error) -> Self {
        let line = error.position().map(|pos| pos.line());

        CoinError::ParseError {
            line,
            message: error.to_string(),
        }
    }
}

// Helper functions for creating common errors

impl CoinError {
    pub fn account_not_found(account: AccountId) -> Self {
        CoinError::AccountNotFound { account }
    }

    pub fn identity_not_found(identity: &str) -> Self {
        CoinError::IdentityNotFound {
            identity: identity.to_string(),
        }
    }

    pub fn receiver_not_found(identity: &str) -> Self {
        CoinError::ReceiverNotFound {
            identity: identity.to_string(),
        }
    }

    pub fn item_not_found(item: &str) -> Self {
        CoinError::ItemNotFound {
            item: item.to_string(),
        }
    }

    pub fn already_exists(identity: &str) -> Self {
        CoinError::AlreadyExists {
            identity: identity.to_string(),
        }
    }

    pub fn insufficient_funds(account: AccountId, balance: Coins, required: Coins) -> Self {
        CoinError::InsufficientFunds {
            account,
            balance,
            required,
        }
    }

    pub fn invalid_amount(amount: Coins) -> Self {
        CoinError::InvalidAmount { amount }
    }

    pub fn invalid_price(item: &str, price: Coins) -> Self {
        CoinError::InvalidPrice {
            item: item.to_string(),
            price,
        }
    }

    pub fn self_transfer(account: AccountId) -> Self {
        CoinError::SelfTransferRejected { account }
    }

    pub fn busy(account: AccountId) -> Self {
        CoinError::Busy { account }
    }

    pub fn arithmetic_overflow(operation: &str, account: AccountId) -> Self {
        CoinError::ArithmeticOverflow {
            operation: operation.to_string(),
            account,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        CoinError::Internal {
            message: message.into(),
        }
    }

    /// Whether the caller may retry the same call unchanged
    pub fn is_retryable(&self) -> bool {
        matches!(self, CoinError::Busy { .. })
    }

    /// Whether the error is a lookup miss of any kind
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            CoinError::AccountNotFound { .. }
                | CoinError::IdentityNotFound { .. }
                | CoinError::ReceiverNotFound { .. }
                | CoinError::ItemNotFound { .. }
        )
    }
}
