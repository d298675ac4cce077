//! Storage capability traits
//!
//! Coordinators depend only on these traits. A storage backend provides a
//! unit-of-work type plus the three capabilities: account storage with
//! non-blocking row locks, catalog lookup, and the append-only ledger.

use crate::types::{
    Account, AccountId, CatalogItem, CoinError, Coins, ItemId, LedgerEntry, Order,
};

/// Unit of work identifier
pub type UnitId = u64;

/// An atomic scope for mutations
///
/// Everything staged through a unit becomes visible together on
/// [`commit`](UnitOfWork::commit) or not at all. Dropping a unit that was
/// neither committed nor aborted aborts it, releasing its row locks.
pub trait UnitOfWork: Send {
    /// Identifier used as the owner of the unit's row locks
    fn id(&self) -> UnitId;

    /// Publish all staged mutations and release the unit's locks
    ///
    /// On error nothing was published.
    fn commit(self) -> Result<(), CoinError>;

    /// Discard all staged mutations and release the unit's locks
    fn abort(self);
}

/// Durable keyed storage of accounts
pub trait AccountStore: Send + Sync {
    type Unit: UnitOfWork;

    /// Open a new unit of work
    fn begin(&self) -> Self::Unit;

    /// Unlocked read by identity
    fn get_by_identity(&self, identity: &str) -> Result<Account, CoinError>;

    /// Unlocked read by id
    fn get_by_id(&self, id: AccountId) -> Result<Account, CoinError>;

    /// Create an account
    ///
    /// Identity collisions are detected at insert time and reported as
    /// `AlreadyExists`.
    fn create(&self, identity: &str, initial_balance: Coins) -> Result<Account, CoinError>;

    /// Take the exclusive row lock on `id` for `unit` and read the row
    ///
    /// Never waits: if another unit holds the lock this fails with `Busy`.
    /// Locking a row the unit already holds succeeds and returns the row as
    /// the unit currently sees it.
    fn lock_for_update(&self, unit: &mut Self::Unit, id: AccountId) -> Result<Account, CoinError>;

    /// Stage a new balance for a row locked by `unit`
    fn update_balance(
        &self,
        unit: &mut Self::Unit,
        id: AccountId,
        new_balance: Coins,
    ) -> Result<(), CoinError>;

    /// Snapshot of all committed accounts
    fn list(&self) -> Result<Vec<Account>, CoinError>;
}

/// Read-only catalog
pub trait CatalogLookup: Send + Sync {
    fn get_by_name(&self, name: &str) -> Result<CatalogItem, CoinError>;
}

/// Append-only store of orders and transfer entries
pub trait LedgerRecorder<U: UnitOfWork>: Send + Sync {
    /// Stage one order in `unit`
    fn record_order(
        &self,
        unit: &mut U,
        account: AccountId,
        item: ItemId,
        quantity: u32,
        total_price: Coins,
    ) -> Result<(), CoinError>;

    /// Stage the sent/received entry pair of one transfer in `unit`
    fn record_transfer_pair(
        &self,
        unit: &mut U,
        from: AccountId,
        to: AccountId,
        amount: Coins,
    ) -> Result<(), CoinError>;

    /// Committed orders of an account, most recent first
    fn list_orders_by_account(&self, account: AccountId) -> Result<Vec<Order>, CoinError>;

    /// Committed ledger entries of an account, most recent first
    fn list_entries_by_account(&self, account: AccountId) -> Result<Vec<LedgerEntry>, CoinError>;
}

/// A backend providing every capability over one unit-of-work type
pub trait Storage:
    AccountStore + CatalogLookup + LedgerRecorder<<Self as AccountStore>::Unit>
{
}

impl<T> Storage for T where
    T: AccountStore + CatalogLookup + LedgerRecorder<<T as AccountStore>::Unit>
{
}
