//! Coin engine facade
//!
//! `CoinEngine` wires the purchase, transfer and history components over one
//! storage backend and exposes the operations a request handler needs:
//! authenticate, buy, send, summarize. It also replays [`OperationRecord`]s,
//! which is how the processing strategies drive it.
//!
//! The engine holds no mutable state of its own. Every method takes `&self`
//! and clones share the same store, so one engine can serve many tasks.

use crate::core::history::HistoryAssembler;
use crate::core::memory::MemoryStore;
use crate::core::purchase::PurchaseCoordinator;
use crate::core::registry::resolve_or_create;
use crate::core::traits::{AccountStore, Storage};
use crate::core::transfer::TransferCoordinator;
use crate::types::{
    Account, AccountId, CoinError, Coins, OperationRecord, Summary, STARTING_BALANCE,
};
use std::sync::Arc;

/// Engine settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Balance granted to an account on first authentication
    pub starting_balance: Coins,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            starting_balance: STARTING_BALANCE,
        }
    }
}

/// Coin balance engine over a storage backend
pub struct CoinEngine<S: Storage = MemoryStore> {
    store: Arc<S>,
    config: EngineConfig,
    purchases: PurchaseCoordinator<S, S, S>,
    transfers: TransferCoordinator<S, S>,
    history: HistoryAssembler<S, S>,
}

impl<S: Storage> Clone for CoinEngine<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            config: self.config,
            purchases: self.purchases.clone(),
            transfers: self.transfers.clone(),
            history: self.history.clone(),
        }
    }
}

impl CoinEngine<MemoryStore> {
    /// In-memory engine with the default catalog
    pub fn in_memory(config: EngineConfig) -> Self {
        Self::new(MemoryStore::with_default_catalog(), config)
    }
}

impl Default for CoinEngine<MemoryStore> {
    fn default() -> Self {
        Self::in_memory(EngineConfig::default())
    }
}

impl<S: Storage> CoinEngine<S> {
    pub fn new(store: S, config: EngineConfig) -> Self {
        let store = Arc::new(store);
        Self {
            purchases: PurchaseCoordinator::new(
                Arc::clone(&store),
                Arc::clone(&store),
                Arc::clone(&store),
            ),
            transfers: TransferCoordinator::new(Arc::clone(&store), Arc::clone(&store)),
            history: HistoryAssembler::new(Arc::clone(&store), Arc::clone(&store)),
            store,
            config,
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Resolve `identity` to its account, creating it on first sight
    pub fn authenticate(&self, identity: &str) -> Result<Account, CoinError> {
        resolve_or_create(self.store.as_ref(), identity, self.config.starting_balance)
    }

    /// Buy one `item` for `account`
    pub fn buy(&self, account: AccountId, item: &str) -> Result<(), CoinError> {
        self.purchases.buy(account, item)
    }

    /// Send `amount` coins from `from` to the account of `to_identity`
    pub fn send_coin(
        &self,
        from: AccountId,
        to_identity: &str,
        amount: Coins,
    ) -> Result<(), CoinError> {
        self.transfers.send_coin(from, to_identity, amount)
    }

    pub fn summarize(&self, account: AccountId) -> Result<Summary, CoinError> {
        self.history.summarize(account)
    }

    /// Summaries of every account, sorted by identity
    pub fn summaries(&self) -> Result<Vec<Summary>, CoinError> {
        let mut summaries = self
            .store
            .list()?
            .into_iter()
            .map(|account| self.summarize(account.id))
            .collect::<Result<Vec<_>, _>>()?;
        summaries.sort_by(|a, b| a.identity.cmp(&b.identity));
        Ok(summaries)
    }

    /// Apply one operation on behalf of its identity
    ///
    /// The caller is authenticated first, so an identity's first operation
    /// of any kind creates its account. Receivers are never created here.
    pub fn process_operation(&self, operation: &OperationRecord) -> Result<(), CoinError> {
        let caller = self.authenticate(operation.identity())?;
        match operation {
            OperationRecord::Auth { .. } => Ok(()),
            OperationRecord::Buy { item, .. } => self.buy(caller.id, item),
            OperationRecord::Send {
                receiver, amount, ..
            } => self.send_coin(caller.id, receiver, *amount),
        }
    }
}
