//! Coin Ledger Library
//! # Overview
//!
//! Transactional core of a merch shop paid for in internal coins. Accounts
//! start with a coin balance, buy catalog items, and send coins to each
//! other. Every mutation runs in a unit of work that locks the touched
//! account rows without waiting and commits all of its writes at once, so
//! balances never go negative and no coins are created or lost, even under
//! concurrent requests.
//!
//! # Architecture
//!
//! - [`types`] - Plain data (accounts, catalog items, orders, ledger entries,
//!   summaries) and the [`CoinError`] taxonomy
//! - [`core`] - Business logic:
//!   - [`core::traits`] - Storage capabilities and the unit of work
//!   - [`core::memory`] - In-memory backend with non-blocking row locks
//!   - [`core::purchase`] - Buying an item
//!   - [`core::transfer`] - Sending coins
//!   - [`core::history`] - Account summaries
//!   - [`core::engine`] - Facade used by request handlers and replay
//! - [`io`] - Operation, catalog and summary formats
//! - [`strategy`] - Sequential and concurrent replay of operation files
//! - [`cli`] - Command-line arguments
//! - [`telemetry`] - Logging setup
//!
//! # Operations
//!
//! - **Buy**: Debit an item's price and record one order
//! - **SendCoin**: Move coins to another identity, recording both sides
//! - **Summarize**: Balance, inventory and transfer history of an account
//!
//! A contended account yields [`CoinError::Busy`]; the caller decides
//! whether to retry.

pub mod cli;
pub mod core;
pub mod io;
pub mod strategy;
pub mod telemetry;
pub mod types;

pub use core::{CoinEngine, EngineConfig, MemoryStore};
pub use io::{write_summaries_csv, write_summaries_json};
pub use types::{
    Account, AccountId, CatalogItem, CoinError, Coins, LedgerEntry, OperationRecord, Order,
    Summary,
};
