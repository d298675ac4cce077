//! Units of work and row locks for the in-memory backend

use super::Tables;
use crate::core::traits::{UnitId, UnitOfWork};
use crate::types::{AccountId, CoinError, Coins, LedgerEntry, Order};
use std::collections::BTreeMap;
use std::mem;
use std::sync::Arc;
use tracing::debug;

/// Result of a non-blocking row lock attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockOutcome {
    /// The lock was free and now belongs to the unit
    Acquired,
    /// The unit already held the lock
    AlreadyHeld,
    /// Another unit holds the lock
    Busy { holder: UnitId },
}

/// An open unit of work against a `MemoryStore`
///
/// Holds its row locks and its staged writes. Dropping an open unit aborts
/// it.
#[derive(Debug)]
pub struct MemoryUnit {
    id: UnitId,
    tables: Arc<Tables>,
    locked: Vec<AccountId>,
    balances: BTreeMap<AccountId, Coins>,
    orders: Vec<Order>,
    entries: Vec<LedgerEntry>,
    finished: bool,
}

impl MemoryUnit {
    pub(crate) fn open(tables: Arc<Tables>) -> Self {
        let id = tables.next_unit_id();
        debug!(unit = id, "unit opened");
        Self {
            id,
            tables,
            locked: Vec::new(),
            balances: BTreeMap::new(),
            orders: Vec::new(),
            entries: Vec::new(),
            finished: false,
        }
    }

    pub(crate) fn belongs_to(&self, tables: &Arc<Tables>) -> bool {
        Arc::ptr_eq(&self.tables, tables)
    }

    /// Try to take the row lock on `account` without waiting
    pub fn try_lock(&mut self, account: AccountId) -> LockOutcome {
        let holder = *self.tables.row_locks.entry(account).or_insert(self.id);

        if holder != self.id {
            LockOutcome::Busy { holder }
        } else if self.locked.contains(&account) {
            LockOutcome::AlreadyHeld
        } else {
            self.locked.push(account);
            LockOutcome::Acquired
        }
    }

    /// Whether this unit holds the row lock on `account`
    pub fn holds(&self, account: AccountId) -> bool {
        self.locked.contains(&account)
    }

    /// Accounts locked by this unit, in acquisition order
    pub fn locked_accounts(&self) -> &[AccountId] {
        &self.locked
    }

    pub(crate) fn staged_balance(&self, account: AccountId) -> Option<Coins> {
        self.balances.get(&account).copied()
    }

    pub(crate) fn stage_balance(&mut self, account: AccountId, balance: Coins) {
        self.balances.insert(account, balance);
    }

    pub(crate) fn stage_order(&mut self, order: Order) {
        self.orders.push(order);
    }

    pub(crate) fn stage_entry(&mut self, entry: LedgerEntry) {
        self.entries.push(entry);
    }

    fn release_locks(&mut self) {
        let id = self.id;
        for account in mem::take(&mut self.locked) {
            self.tables
                .row_locks
                .remove_if(&account, |_, holder| *holder == id);
        }
    }

    fn rollback(&mut self) {
        self.balances.clear();
        self.orders.clear();
        self.entries.clear();
        self.release_locks();
        self.finished = true;
    }

    fn publish(&mut self) -> Result<(), CoinError> {
        if let Some(account) = self.balances.keys().find(|account| !self.holds(**account)) {
            return Err(CoinError::internal(format!(
                "unit {} staged a balance for account {} without holding its lock",
                self.id, account
            )));
        }

        let tables = Arc::clone(&self.tables);
        let _gate = tables.write_gate();

        // Validate everything before the first write so a failure publishes nothing
        if let Some(account) = self
            .balances
            .keys()
            .find(|account| !tables.accounts.contains_key(*account))
        {
            return Err(CoinError::account_not_found(*account));
        }

        for (account, balance) in mem::take(&mut self.balances) {
            if let Some(mut row) = tables.accounts.get_mut(&account) {
                row.balance = balance;
            }
        }
        for order in mem::take(&mut self.orders) {
            tables.orders.entry(order.account).or_default().push(order);
        }
        for entry in mem::take(&mut self.entries) {
            tables.entries.entry(entry.account).or_default().push(entry);
        }

        Ok(())
    }
}

impl UnitOfWork for MemoryUnit {
    fn id(&self) -> UnitId {
        self.id
    }

    fn commit(mut self) -> Result<(), CoinError> {
        let result = self.publish();
        self.rollback();
        match &result {
            Ok(()) => debug!(unit = self.id, "unit committed"),
            Err(e) => debug!(unit = self.id, error = %e, "unit commit failed"),
        }
        result
    }

    fn abort(mut self) {
        self.rollback();
        debug!(unit = self.id, "unit aborted");
    }
}

impl Drop for MemoryUnit {
    fn drop(&mut self) {
        if !self.finished {
            self.rollback();
            debug!(unit = self.id, "unit dropped before commit, aborted");
        }
    }
}
