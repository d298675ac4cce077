//! In-memory storage backend
//!
//! `MemoryStore` implements every storage capability over one set of
//! `DashMap` tables, so operations on different accounts never contend on a
//! global lock.
//!
//! # Architecture
//!
//! ```text
//! MemoryStore (cheap to clone)
//!     └── Arc<Tables>
//!         ├── accounts / identities     (AccountStore)
//!         ├── items / item_names        (CatalogLookup)
//!         ├── orders / entries          (LedgerRecorder)
//!         ├── row_locks                 (account id -> owning unit)
//!         └── commit_gate               (publishes a unit's writes at once)
//! ```
//!
//! # Units of work
//!
//! A [`MemoryUnit`] stages balance writes and ledger records privately.
//! Nothing staged is visible to other callers until commit, which applies
//! the whole unit under the write side of the commit gate. Readers take the
//! read side, so they observe either none or all of a unit's effects.

mod accounts;
mod catalog;
mod ledger;
mod unit;

pub use unit::{LockOutcome, MemoryUnit};

use crate::core::traits::UnitId;
use crate::types::{
    Account, AccountId, CatalogItem, CoinError, ItemId, LedgerEntry, Order, DEFAULT_CATALOG,
};
use dashmap::DashMap;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Shared tables behind every clone of a `MemoryStore`
#[derive(Debug, Default)]
pub(crate) struct Tables {
    pub(crate) accounts: DashMap<AccountId, Account>,
    pub(crate) identities: DashMap<String, AccountId>,
    pub(crate) row_locks: DashMap<AccountId, UnitId>,
    pub(crate) items: DashMap<String, CatalogItem>,
    pub(crate) item_names: DashMap<ItemId, String>,
    pub(crate) orders: DashMap<AccountId, Vec<Order>>,
    pub(crate) entries: DashMap<AccountId, Vec<LedgerEntry>>,
    commit_gate: RwLock<()>,
    next_account: AtomicI64,
    next_item: AtomicI64,
    next_order: AtomicI64,
    next_entry: AtomicI64,
    next_unit: AtomicU64,
}

impl Tables {
    // The gate guards no data of its own, so a poisoned gate is still usable.
    pub(crate) fn read_gate(&self) -> RwLockReadGuard<'_, ()> {
        self.commit_gate
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn write_gate(&self) -> RwLockWriteGuard<'_, ()> {
        self.commit_gate
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn next_account_id(&self) -> AccountId {
        self.next_account.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub(crate) fn next_item_id(&self) -> ItemId {
        self.next_item.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub(crate) fn next_order_id(&self) -> i64 {
        self.next_order.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub(crate) fn next_entry_id(&self) -> i64 {
        self.next_entry.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub(crate) fn next_unit_id(&self) -> UnitId {
        self.next_unit.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Committed account row, cloned
    pub(crate) fn account(&self, id: AccountId) -> Result<Account, CoinError> {
        self.accounts
            .get(&id)
            .map(|row| row.value().clone())
            .ok_or_else(|| CoinError::account_not_found(id))
    }
}

/// Thread-safe in-memory implementation of every storage capability
///
/// Clones share the same tables.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Tables>,
}

impl MemoryStore {
    /// Create an empty store with an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store whose catalog holds the default merch
    pub fn with_default_catalog() -> Self {
        let store = Self::new();
        for (name, price) in DEFAULT_CATALOG {
            store.put_item(name, *price);
        }
        store
    }

    /// Whether some unit currently holds the row lock on `account`
    pub fn is_locked(&self, account: AccountId) -> bool {
        self.tables.row_locks.contains_key(&account)
    }

    pub(crate) fn tables(&self) -> &Arc<Tables> {
        &self.tables
    }
}
