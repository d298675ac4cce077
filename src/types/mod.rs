//! Types module
//!
//! Contains core data structures used throughout the application.
//! This module organizes types into logical submodules:
//! - `account`: Accounts, identifiers and the coin amount type
//! - `catalog`: Purchasable items and the default merch catalog
//! - `ledger`: Orders and transfer entries
//! - `operation`: Operation records replayed against the engine
//! - `summary`: Display-ready balance and history
//! - `error`: Error types for the coin ledger

pub mod account;
pub mod catalog;
pub mod error;
pub mod ledger;
pub mod operation;
pub mod summary;

pub use account::{Account, AccountId, Coins, STARTING_BALANCE};
pub use catalog::{CatalogItem, ItemId, DEFAULT_CATALOG};
pub use error::CoinError;
pub use ledger::{EntryId, EntryKind, LedgerEntry, Order, OrderId};
pub use operation::{OperationKind, OperationRecord};
pub use summary::{CoinHistory, InventoryItem, ReceivedCoins, SentCoins, Summary};
