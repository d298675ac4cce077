//! Purchase orchestration
//!
//! `PurchaseCoordinator` buys one catalog item with coins. The debit and the
//! order row are staged in one unit of work and become visible together;
//! any failure aborts the unit and leaves the account untouched.
//!
//! # Algorithm
//!
//! 1. Resolve the item by name (`ItemNotFound`)
//! 2. Open a unit and lock the account row (`AccountNotFound`, `Busy`)
//! 3. Re-read the item under the lock; its current price is what gets charged
//! 4. Reject if the balance is below the price (`InsufficientFunds`)
//! 5. Stage the new balance and an order of quantity 1
//! 6. Commit

use crate::core::stage::{log_abort, UnitStage};
use crate::core::traits::{AccountStore, CatalogLookup, LedgerRecorder, UnitOfWork};
use crate::types::{AccountId, CatalogItem, CoinError, Coins};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Quantity of every order created by a purchase
pub const ORDER_QUANTITY: u32 = 1;

/// Buys catalog items on behalf of authenticated accounts
///
/// Cloning is cheap; clones share the same stores.
pub struct PurchaseCoordinator<A, C, L> {
    accounts: Arc<A>,
    catalog: Arc<C>,
    ledger: Arc<L>,
}

impl<A, C, L> Clone for PurchaseCoordinator<A, C, L> {
    fn clone(&self) -> Self {
        Self {
            accounts: Arc::clone(&self.accounts),
            catalog: Arc::clone(&self.catalog),
            ledger: Arc::clone(&self.ledger),
        }
    }
}

impl<A, C, L> PurchaseCoordinator<A, C, L>
where
    A: AccountStore,
    C: CatalogLookup,
    L: LedgerRecorder<A::Unit>,
{
    pub fn new(accounts: Arc<A>, catalog: Arc<C>, ledger: Arc<L>) -> Self {
        Self {
            accounts,
            catalog,
            ledger,
        }
    }

    /// Buy one `item_name` for `account`
    ///
    /// # Returns
    ///
    /// * `Ok(())` - The balance was debited and one order recorded
    /// * `Err(CoinError::ItemNotFound)` - No such catalog item
    /// * `Err(CoinError::AccountNotFound)` - No such account
    /// * `Err(CoinError::Busy)` - Another unit holds the account; retry
    /// * `Err(CoinError::InsufficientFunds)` - Balance below the price
    /// * `Err(CoinError::Internal)` - Persistence failed; nothing changed
    pub fn buy(&self, account: AccountId, item_name: &str) -> Result<(), CoinError> {
        let item = self.catalog.get_by_name(item_name).inspect_err(|e| {
            warn!(account, item = item_name, error = %e, "purchase rejected");
        })?;

        let mut unit = self.accounts.begin();
        let mut stage = UnitStage::Idle;

        match self.debit_in_unit(&mut unit, &mut stage, account, &item) {
            Ok((price, balance)) => {
                unit.commit().inspect_err(|e| log_abort("purchase", &mut stage, e))?;
                stage = UnitStage::Committed;
                info!(
                    account,
                    item = item_name,
                    price,
                    balance,
                    stage = %stage,
                    "purchase committed"
                );
                Ok(())
            }
            Err(e) => {
                unit.abort();
                log_abort("purchase", &mut stage, &e);
                Err(e)
            }
        }
    }

    /// Everything between opening and committing the unit
    ///
    /// Returns the price charged and the staged balance.
    fn debit_in_unit(
        &self,
        unit: &mut A::Unit,
        stage: &mut UnitStage,
        account: AccountId,
        item: &CatalogItem,
    ) -> Result<(Coins, Coins), CoinError> {
        let buyer = self.accounts.lock_for_update(unit, account)?;
        *stage = UnitStage::LockAcquired;

        // The price is charged as it stands once the account is locked
        let current = self.catalog.get_by_name(&item.name)?;
        if current.price != item.price {
            debug!(
                item = %item.name,
                quoted = item.price,
                current = current.price,
                "price changed during purchase"
            );
        }

        if !buyer.can_afford(current.price) {
            return Err(CoinError::insufficient_funds(
                account,
                buyer.balance,
                current.price,
            ));
        }
        *stage = UnitStage::Validated;

        let new_balance = buyer
            .balance
            .checked_sub(current.price)
            .ok_or_else(|| CoinError::arithmetic_overflow("purchase", account))?;

        self.accounts.update_balance(unit, account, new_balance)?;
        self.ledger
            .record_order(unit, account, current.id, ORDER_QUANTITY, current.price)?;
        *stage = UnitStage::Mutated;

        Ok((current.price, new_balance))
    }
}
